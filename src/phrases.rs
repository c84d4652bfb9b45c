//! Canned phrasing for the response composer, plus the seeded picker that
//! chooses between variants.
//!
//! Every pool is a plain `&'static` table so tests can assert membership
//! instead of exact strings.

use crate::sentiment::SentimentLabel;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// ============ Phrase Picker ============

/// Pseudo-random choice between phrase variants. One per session; a fixed
/// seed makes a whole conversation reproducible.
#[derive(Debug, Clone)]
pub struct PhrasePicker {
    rng: StdRng,
}

impl PhrasePicker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Pick one item, `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..items.len());
        items.get(index)
    }

    /// Pick one phrase, empty string for an empty pool.
    pub fn phrase(&mut self, items: &[&'static str]) -> &'static str {
        self.pick(items).copied().unwrap_or("")
    }

    /// True with probability 1/n.
    pub fn one_in(&mut self, n: u32) -> bool {
        n > 0 && self.rng.random_range(0..n) == 0
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

// ============ Greetings ============

pub const GREETINGS_FIRST_TIME: &[&str] = &[
    "Hello! I'm excited to help you learn about cybersecurity.",
    "Welcome! I'm here to make cybersecurity easy to understand.",
    "Hi there! Let's explore cybersecurity together.",
    "Hello! I'm your friendly cybersecurity guide.",
];

/// `{topic}` is replaced with the favorite topic; entries with the
/// placeholder are skipped when no favorite is known.
pub const GREETINGS_RETURNING: &[&str] = &[
    "Welcome back! I remember we talked about {topic} before.",
    "Good to see you again! How are things going with {topic}?",
    "Hello again! Ready to continue learning about cybersecurity?",
    "Nice to have you back! Any new security questions today?",
];

pub const GREETINGS_TOPIC_EXPERT: &[&str] = &[
    "Hi there! I see you're really interested in {topic}.",
    "Hello! You've been asking great questions about {topic}.",
    "Welcome! Ready for more {topic} insights?",
    "Hi! I love your enthusiasm for {topic}.",
];

pub const FAREWELLS: &[&str] = &[
    "Take care and stay secure online!",
    "Goodbye! Keep practicing good cybersecurity habits.",
    "Until next time! Remember what we discussed about staying safe.",
    "Bye for now! Feel free to come back anytime with security questions.",
];

// ============ Tone ============

pub const SUPPORTIVE_PHRASES: &[&str] = &[
    "You're asking great questions - that's how you stay secure!",
    "Don't worry, everyone starts somewhere with cybersecurity.",
    "It's totally normal to feel overwhelmed by security topics at first.",
    "You're being smart by learning about this stuff!",
    "Every small step you take makes you more secure online.",
    "There's no such thing as a dumb security question!",
    "You're doing exactly the right thing by asking about this.",
];

pub const EMPATHY_PHRASES: &[&str] = &[
    "I completely understand how you feel about this.",
    "Your concerns are totally valid.",
    "Many people feel the same way about this topic.",
    "It's natural to feel that way.",
    "I can see why this would be important to you.",
    "Your experience sounds really frustrating.",
    "That must be concerning for you.",
    "I hear what you're saying.",
    "Your feelings about this make perfect sense.",
];

pub const ENCOURAGEMENT_PHRASES: &[&str] = &[
    "You're asking all the right questions!",
    "That's exactly the kind of thinking that keeps you secure!",
    "You're really getting the hang of this!",
    "Your security awareness is improving!",
    "Keep up that careful approach!",
    "You're becoming quite the security expert!",
    "That's a smart way to think about it!",
    "You're on the right track!",
    "Great question - that shows you're thinking like a security pro!",
];

pub const CONNECTORS_CONTINUATION: &[&str] = &[
    "Also,",
    "Additionally,",
    "Furthermore,",
    "Another thing to consider is,",
    "It's also worth noting that,",
];

pub const CONNECTORS_TOPIC_SWITCH: &[&str] = &[
    "Speaking of that,",
    "That reminds me,",
    "On a related note,",
    "Building on that,",
    "Similarly,",
    "Along those lines,",
];

/// Glue placed between an answer and its follow-up question.
pub const FOLLOW_UP_JOINERS: &[&str] = &[" ", " Also, ", " By the way, "];

pub const QUICK_HELP: &[&str] = &[
    "I can help you with: passwords, phishing, malware, privacy, and ransomware. Just ask me about any of these!",
    "Need help? Try asking: 'How do I create a strong password?' or 'What is phishing?'",
    "I'm here to make cybersecurity simple! Ask me about any security topic you're curious about.",
];

pub const QUICK_HELP_EXAMPLES: &[&str] = &[
    "Try asking: 'How do I spot a phishing email?' or 'What makes a password strong?'",
    "Example questions: 'Is my password secure?' or 'How do I protect my privacy online?'",
    "Sample topics: 'Explain malware' or 'How does ransomware work?'",
];

/// Closing line appended after the sentiment-adjusted answer.
pub fn encouragement_for(sentiment: SentimentLabel) -> Option<&'static str> {
    match sentiment {
        SentimentLabel::Confused => Some("Feel free to ask if you need me to explain any part differently!"),
        SentimentLabel::Frustrated => Some("Hopefully this helps clear things up for you."),
        SentimentLabel::Anxious => Some("Remember, you're taking the right steps by learning about this."),
        _ => None,
    }
}

// ============ Topic Material ============

pub const TOPIC_DEFINITIONS: &[(&str, &str)] = &[
    ("phishing", "Phishing is when criminals send fake emails or messages to trick you into giving away personal information like passwords or credit card numbers."),
    ("malware", "Malware is malicious software - basically bad programs that can harm your computer, steal your information, or cause other problems."),
    ("ransomware", "Ransomware is a type of malware that locks your files and demands payment to unlock them - like digital kidnapping of your data."),
    ("vpn", "A VPN (Virtual Private Network) creates a secure, private connection when you're online - like a secure tunnel for your internet traffic."),
    ("2fa", "Two-factor authentication (2FA) adds an extra security step when logging in - like needing both your password AND a code from your phone."),
    ("firewall", "A firewall is like a security guard for your computer - it monitors and controls what information can come in and go out."),
];

pub const SIMPLIFIED_EXPLANATIONS: &[(&str, &[&str])] = &[
    (
        "password",
        &[
            "Think of a password like a key to your house - you want it to be unique and hard for others to guess.",
            "A strong password is like a really complicated lock - it should be long, mix different types of characters, and be unique for each account.",
            "Password tips made simple: Make it long (12+ characters), mix letters/numbers/symbols, and don't reuse it anywhere else.",
        ],
    ),
    (
        "phishing",
        &[
            "Phishing is like someone pretending to be your friend to get your house key - they pretend to be a trusted company to steal your login info.",
            "Think of phishing emails like fake letters from your bank - they look real but are trying to trick you into giving away your personal info.",
            "Phishing simplified: If an email asks for passwords or personal info, it's probably fake - real companies don't ask for this via email.",
        ],
    ),
    (
        "malware",
        &[
            "Malware is like germs for your computer - it's bad software that can make your device 'sick' or steal your information.",
            "Think of malware as digital pests - like viruses, they can spread, cause damage, and are hard to get rid of without the right tools.",
            "Malware simplified: It's bad software that sneaks onto your device to cause problems or steal your stuff.",
        ],
    ),
];

pub const TOPIC_TRANSITIONS: &[(&str, &str)] = &[
    ("phishing", "Speaking of phishing, having strong passwords is another important defense against unauthorized access to your accounts."),
    ("pharming", "Pharming is a cyberattack that redirects users from legitimate websites to fraudulent ones to steal sensitive information. Using secure DNS services and keeping your devices updated can help protect you from pharming."),
    ("password", "Beyond strong passwords, enabling two-factor authentication adds an extra layer of security to your accounts."),
    ("malware", "To protect against malware effectively, keeping your software and operating system updated is essential."),
    ("ransomware", "The best defense against ransomware is having regular, secure backups of your important data."),
    ("privacy", "For enhanced privacy, especially on public networks, a VPN can encrypt your connection and protect your data."),
    ("firewall", "While firewalls are important, they work best as part of a comprehensive security strategy including strong passwords and updated software."),
    ("antivirus", "Antivirus software is crucial, but remember to keep it updated regularly to protect against the latest threats."),
    ("vpn", "VPNs provide excellent privacy protection, but you should still be cautious about the websites you visit and the information you share."),
    ("2fa", "Two-factor authentication significantly improves account security, especially when combined with strong, unique passwords."),
];

pub const FOLLOW_UP_QUESTIONS: &[(&str, &[&str])] = &[
    (
        "phishing",
        &[
            "Have you encountered suspicious emails recently that might be phishing attempts?",
            "Would you like to know specific warning signs to identify phishing emails?",
            "Are you familiar with how to verify if an email sender is legitimate?",
        ],
    ),
    (
        "password",
        &[
            "Do you currently use different passwords for each of your important accounts?",
            "Have you considered using a password manager to help maintain secure passwords?",
            "Would you like specific tips on creating strong yet memorable passwords?",
        ],
    ),
    (
        "malware",
        &[
            "Do you have reliable antivirus software installed on all your devices?",
            "Are you keeping your operating system and applications updated regularly?",
            "Would you like to learn about common warning signs that your device might be infected?",
        ],
    ),
    (
        "privacy",
        &[
            "Have you reviewed your social media privacy settings recently?",
            "Would you like to learn about tools that can enhance your online privacy?",
            "Are there specific privacy concerns you're worried about online?",
        ],
    ),
    (
        "ransomware",
        &[
            "Do you currently have a backup strategy for your important files?",
            "Would you like to know the immediate steps to take if you suspect a ransomware infection?",
            "Are you familiar with how ransomware typically infiltrates systems?",
        ],
    ),
];

pub const ADDITIONAL_INFO: &[(&str, &str)] = &[
    ("password", "Pro tip: Consider using a passphrase with a mix of unrelated words - it's both secure and memorable!"),
    ("phishing", "Here's an insider trick: legitimate companies will never ask for passwords via email, even in 'urgent' situations."),
    ("malware", "Advanced tip: Enable real-time protection in your antivirus and keep your browser updated for the best defense."),
    ("privacy", "Did you know? Using different email addresses for different types of accounts can really boost your privacy game!"),
    ("ransomware", "Expert advice: The 3-2-1 backup rule (3 copies, 2 different media, 1 offsite) is your best ransomware insurance."),
];

/// Look up a topic in one of the `(topic, value)` tables above.
pub fn for_topic<T: Copy>(table: &[(&str, T)], topic: &str) -> Option<T> {
    table.iter().find(|(t, _)| *t == topic).map(|(_, v)| *v)
}

// ============ Follow-ups ============

/// Lead-ins that soften a topic follow-up question.
pub fn follow_up_starters(sentiment: SentimentLabel) -> &'static [&'static str] {
    match sentiment {
        SentimentLabel::Positive => &["Since you're interested, ", "I'm curious - ", "You might also wonder: "],
        SentimentLabel::Anxious => &["To help ease your mind, ", "Something that might help: ", "Let me ask - "],
        SentimentLabel::Confused => &["To make this clearer, ", "Let me check - ", "This might help: "],
        _ => &["By the way, ", "I'm wondering - ", "Quick question: "],
    }
}

/// Follow-up questions for answers with no topic-specific pool.
pub fn generic_follow_ups(sentiment: SentimentLabel) -> &'static [&'static str] {
    match sentiment {
        SentimentLabel::Positive => &[
            "What else are you curious about in cybersecurity?",
            "Is there another security topic you'd like to dive into?",
            "Any other cybersecurity questions on your mind?",
        ],
        SentimentLabel::Anxious => &[
            "What's your biggest security worry right now?",
            "Is there a specific threat that's been concerning you?",
            "What would help you feel more secure online?",
        ],
        SentimentLabel::Confused => &[
            "What part would be most helpful for me to explain differently?",
            "Which aspect of this is trickiest to understand?",
            "What would make this clearer for you?",
        ],
        SentimentLabel::Frustrated => &[
            "What specific problem can I help you solve right now?",
            "What's the most urgent security issue you're facing?",
            "How can I make this easier for you?",
        ],
        _ => &["What would you like to know more about?"],
    }
}

// ============ Yes / No ============

pub const NEXT_STEP_DECLINED: &str = "No problem! What other cybersecurity topic would you like to explore?";

/// Practical next step offered when the user answers "yes" to a follow-up.
pub fn next_step_accepted(topic: &str) -> String {
    let canned = match topic {
        "phishing" => "Great! Here are key warning signs to watch for: unexpected urgent requests, suspicious sender addresses, and links that don't match the claimed destination.",
        "password" => "Excellent! I recommend using a password manager and creating passwords with at least 12 characters, mixing letters, numbers, and symbols.",
        "malware" => "Perfect! Make sure to keep your antivirus updated, avoid suspicious downloads, and regularly scan your system.",
        "privacy" => "Awesome! Consider using a VPN, adjusting your social media privacy settings, and being cautious about sharing personal information online.",
        "ransomware" => "Fantastic! Regularly back up your data, keep your software updated, and be cautious with email attachments and links.",
        "social engineering" => "Great! Be aware of tactics like pretexting, baiting, and tailgating. Always verify identities before sharing sensitive information.",
        "network security" => "Excellent! Ensure your Wi-Fi is secured with WPA3 encryption, change default router passwords, and regularly update firmware.",
        "pharming" => "Awesome! Always check URLs carefully, use HTTPS, and consider using browser extensions that warn about suspicious sites.",
        "firewall" => "Great! Make sure your firewall is enabled, configure it to block unwanted traffic, and regularly review its settings.",
        "antivirus" => "Excellent! Keep your antivirus software updated, run regular scans, and be cautious about downloading files from untrusted sources.",
        "vpn" => "Awesome! A VPN can help protect your privacy online. Make sure to choose a reputable provider and connect whenever using public Wi-Fi.",
        "2fa" => "Great! Enabling two-factor authentication adds an extra layer of security. Use an authenticator app or SMS codes for verification.",
        _ => return format!("Wonderful! Feel free to ask me any specific questions about {}.", topic),
    };
    canned.to_string()
}

// ============ Unrecognized Input ============

pub fn unrecognized_openers(sentiment: SentimentLabel) -> &'static [&'static str] {
    match sentiment {
        SentimentLabel::Frustrated => &[
            "I can tell you're frustrated. Let me try to help in a different way.",
            "I understand this is annoying. What specific cybersecurity issue can I help you tackle?",
        ],
        SentimentLabel::Confused => &[
            "I can see you might be confused. Let me try a simpler approach.",
            "No worries if that didn't come across clearly. What cybersecurity topic interests you?",
        ],
        SentimentLabel::Anxious => &[
            "I understand you might be worried. I'm here to help ease those security concerns.",
            "Don't worry - we can work through any cybersecurity questions you have.",
        ],
        _ => &[
            "I'm not quite sure I caught that, but I'm here to help with cybersecurity questions.",
            "Could you tell me what cybersecurity topic you'd like to explore?",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_choices() {
        let mut a = PhrasePicker::seeded(42);
        let mut b = PhrasePicker::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.phrase(ENCOURAGEMENT_PHRASES), b.phrase(ENCOURAGEMENT_PHRASES));
            assert_eq!(a.one_in(3), b.one_in(3));
        }
    }

    #[test]
    fn pick_handles_empty_pools() {
        let mut picker = PhrasePicker::seeded(1);
        let empty: [&str; 0] = [];
        assert_eq!(picker.pick(&empty), None);
        assert_eq!(picker.phrase(&empty), "");
        assert!(!picker.one_in(0));
    }

    #[test]
    fn picked_phrase_comes_from_pool() {
        let mut picker = PhrasePicker::seeded(7);
        for _ in 0..10 {
            assert!(FAREWELLS.contains(&picker.phrase(FAREWELLS)));
        }
    }

    #[test]
    fn shuffle_keeps_elements() {
        let mut picker = PhrasePicker::seeded(3);
        let mut items: Vec<u32> = (0..10).collect();
        picker.shuffle(&mut items);
        items.sort();
        assert_eq!(items, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn topic_tables_resolve() {
        assert!(for_topic(TOPIC_TRANSITIONS, "vpn").is_some());
        assert!(for_topic(FOLLOW_UP_QUESTIONS, "password").is_some());
        assert!(for_topic(ADDITIONAL_INFO, "firewall").is_none());
        assert!(next_step_accepted("phishing").starts_with("Great! Here are key warning signs"));
        assert_eq!(
            next_step_accepted("spoofing"),
            "Wonderful! Feel free to ask me any specific questions about spoofing."
        );
    }
}
