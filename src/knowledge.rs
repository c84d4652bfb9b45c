//! Static cybersecurity knowledge base.
//!
//! Lookup is substring containment over the lowercased message, so
//! "password" also matches inside "passwordless". Overlapping keys resolve
//! longest-first ("password tips" beats "tips"), ties in table order.

use once_cell::sync::Lazy;

/// Reply used when neither a knowledge key nor small talk matches.
pub const FALLBACK: &str = "I didn't quite understand that. Could you please rephrase that question.";

/// Reply for blank input reaching the knowledge base directly.
pub const EMPTY_INPUT: &str = "I didn't receive any valid input. Please try again.";

// ============ Knowledge Table ============

const KNOWLEDGE_TABLE: &[(&str, &str)] = &[
    // Threats and terms
    (
        "pharming",
        "Pharming is online fraud that involves the use of malicious code to direct victims to spoofed websites in an attempt to steal their credentials and data.",
    ),
    (
        "phishing",
        "Phishing is a cyber attack where scammers trick you into revealing personal information through fake emails, websites, or messages. Always verify the sender before clicking links or providing information.",
    ),
    (
        "ransomware",
        "Ransomware is a type of malware that encrypts a victim's files and demands payment in exchange for the decryption key. Regular backups and updated security software are your best defense.",
    ),
    (
        "social engineering",
        "Social engineering is a tactic used by cybercriminals to manipulate individuals into divulging confidential information through psychological manipulation rather than technical hacking.",
    ),
    (
        "spoofing",
        "Spoofing is a technique used by cybercriminals to deceive users into thinking they are interacting with a legitimate entity by falsifying data or identities.",
    ),
    (
        "virus",
        "A virus is a type of malware that is designed to replicate itself and spread to other devices, often causing damage to files and systems.",
    ),
    (
        "worm",
        "A worm is a type of malware that is designed to spread across networks and infect multiple devices without requiring user interaction.",
    ),
    (
        "trojan",
        "A trojan is a type of malware that disguises itself as a legitimate file or program to trick users into downloading and executing it.",
    ),
    (
        "botnet",
        "A botnet is a network of infected devices that are controlled by a cybercriminal to carry out malicious activities like DDoS attacks or cryptocurrency mining.",
    ),
    (
        "ddos",
        "DDoS (Distributed Denial of Service) is a type of cyber attack that floods a network or server with traffic to disrupt its normal operation.",
    ),
    (
        "firewall",
        "A firewall is a security system that monitors and controls incoming and outgoing network traffic based on predetermined security rules to protect your network.",
    ),
    (
        "antivirus",
        "Antivirus is a software program designed to detect, prevent, and remove malware from a computer or network. Keep it updated for best protection.",
    ),
    (
        "vpn",
        "A VPN (Virtual Private Network) encrypts internet traffic and masks the user's IP address to protect their privacy and security, especially on public networks.",
    ),
    (
        "2fa",
        "2FA (Two-Factor Authentication) is a security process that requires users to provide two forms of identification to access an account or service, significantly improving security.",
    ),
    (
        "password tips",
        "Use a strong, unique password for each account, include letters, numbers, and symbols, avoid personal information, and enable two-factor authentication (2FA).",
    ),
    (
        "zero-day",
        "A zero-day vulnerability is a security flaw that is exploited by attackers before the software developer has released a patch to fix it.",
    ),
    (
        "mfa",
        "MFA (Multi-Factor Authentication) is an enhanced security measure that requires multiple forms of verification before granting access to accounts or systems.",
    ),
    (
        "spyware",
        "Spyware is malicious software designed to gather information about a person or organization without their knowledge, often stealing personal data.",
    ),
    (
        "keylogger",
        "A keylogger is a type of monitoring software or hardware that records keystrokes made by a user, often used to steal passwords and sensitive data.",
    ),
    (
        "adware",
        "Adware is software that automatically displays or downloads advertisements when a user is online, sometimes containing malicious components.",
    ),
    (
        "encryption",
        "Encryption is the process of converting information into a code to prevent unauthorized access, protecting your data even if intercepted.",
    ),
    (
        "sql injection",
        "SQL injection is an attack that inserts malicious SQL code into a database query, potentially giving attackers access to sensitive data.",
    ),
    (
        "xss",
        "XSS (Cross-Site Scripting) is a web security vulnerability that allows attackers to inject malicious scripts into websites viewed by other users.",
    ),
    (
        "csrf",
        "CSRF (Cross-Site Request Forgery) is an attack that forces authenticated users to execute unwanted actions on a web application.",
    ),
    (
        "mitm",
        "MITM (Man-in-the-Middle) attack occurs when attackers secretly relay and possibly alter communications between two parties.",
    ),
    (
        "brute force",
        "Brute force is an attack method that uses trial and error to crack passwords, encryption keys, or find hidden web pages through systematic attempts.",
    ),
    (
        "rootkit",
        "A rootkit is a collection of software tools that enable unauthorized access to areas of a computer while actively hiding its presence from detection.",
    ),
    (
        "malware",
        "Malware is malicious software designed to disrupt, damage, or gain unauthorized access to computer systems. Keep your antivirus updated to protect against it.",
    ),
    (
        "patch",
        "A patch is a software update designed to address security vulnerabilities and bugs in a program or operating system. Install patches promptly.",
    ),
    (
        "sandbox",
        "A sandbox is a security mechanism that provides a separate environment for running untested or untrusted programs safely.",
    ),
    // Everyday tips
    (
        "email tips",
        "Never click on suspicious links or download attachments from unknown senders. Verify the sender's email address carefully and be wary of urgent requests for personal information.",
    ),
    (
        "browsing tips",
        "Use HTTPS websites, keep your browser updated, and consider using ad blockers and privacy extensions. Be cautious about what you download and which website permissions you grant.",
    ),
    (
        "device tips",
        "Keep your operating system and applications updated, use antivirus software, and regularly back up your data to an external drive or secure cloud service.",
    ),
    (
        "wifi tips",
        "Use WPA3 encryption for your home network, create a strong router password, change the default SSID name, and consider setting up a guest network for visitors.",
    ),
    (
        "social media tips",
        "Review privacy settings regularly, limit the personal information you share, be selective about friend/connection requests, and be wary of suspicious messages even from known contacts.",
    ),
    (
        "data backup",
        "Regularly save copies of your important files to a separate storage location to protect against data loss from ransomware or hardware failure.",
    ),
    (
        "update software",
        "Always install security patches and updates for your operating system and applications as soon as they're available to protect against known vulnerabilities.",
    ),
    (
        "tips",
        "Watch for poor spelling/grammar, unusual sender addresses, requests for sensitive information, unexpected attachments, and suspicious links that don't match legitimate URLs.",
    ),
    (
        "public wifi safety",
        "Avoid accessing sensitive accounts or conducting financial transactions on public networks; use a VPN when connecting to public wifi.",
    ),
    // Passwords
    (
        "password safety",
        "Use a strong, unique password for each account and enable two-factor authentication (2FA). Consider using a password manager for better security.",
    ),
    (
        "password safety tips",
        "Use a mix of letters, numbers, and symbols; avoid using easily guessable information like birthdays or names; and change your passwords regularly.",
    ),
    (
        "password strength",
        "A strong password is at least 12 characters long and includes a mix of uppercase letters, lowercase letters, numbers, and special characters.",
    ),
    (
        "password reset",
        "If you forget your password, use the 'forgot password' feature on the login page to reset it. Always choose a new password that is different from the old one.",
    ),
    (
        "password sharing",
        "Never share your passwords with anyone. If you must share access, consider using a password manager that allows for secure sharing.",
    ),
    (
        "password expiration",
        "Some organizations require regular password changes. If prompted, create a new password that meets the security requirements.",
    ),
    (
        "password hints",
        "Avoid using obvious hints like 'my pet's name.' Instead, use a hint that only you would understand.",
    ),
    (
        "password recovery",
        "Set up recovery options like security questions or backup email addresses to help regain access if you forget your password.",
    ),
    (
        "password manager",
        "A password manager securely stores and encrypts your passwords, making it easier to use strong, unique passwords for each account without having to remember them all.",
    ),
    (
        "password reuse",
        "Avoid reusing passwords across multiple accounts. If one account is compromised, others using the same password are at risk.",
    ),
    // Broader topics
    (
        "privacy",
        "Online privacy means controlling who can see and use your personal information. Review app permissions and social media privacy settings, limit what you share publicly, and use private browsing or a VPN on untrusted networks.",
    ),
    (
        "identity theft",
        "Identity theft happens when someone uses your personal details to open accounts or make purchases in your name. Shred sensitive documents, monitor your bank statements, and freeze your credit if your data is exposed in a breach.",
    ),
    (
        "smishing",
        "Smishing is phishing by SMS. Texts claiming a parcel is held or an account is locked often carry malicious links. Never tap links in unexpected texts; contact the company through its official app or website instead.",
    ),
    (
        "vishing",
        "Vishing is voice phishing: scammers phone you pretending to be your bank, IT support, or a government office. Hang up and call back on a number you looked up yourself before sharing anything.",
    ),
    (
        "scam",
        "Online scams rely on urgency and too-good-to-be-true offers. Slow down, verify the sender through an independent channel, and never pay with gift cards or cryptocurrency on request.",
    ),
    (
        "data breach",
        "A data breach exposes stored information to unauthorized people. If a service you use is breached, change that password immediately, change it anywhere you reused it, and turn on two-factor authentication.",
    ),
    (
        "password",
        "Passwords are the front door to your accounts. Use a long, unique password for every account, store them in a password manager, and turn on two-factor authentication wherever it is offered.",
    ),
    (
        "backup",
        "Backups are copies of your files kept somewhere separate from the originals. Follow the 3-2-1 rule: three copies, on two different media, with one stored offsite or in the cloud.",
    ),
    (
        "wifi",
        "Secure your Wi-Fi with WPA3 or WPA2 encryption, a strong router password, and up-to-date router firmware. On public Wi-Fi, avoid sensitive logins unless you are connected through a VPN.",
    ),
    (
        "hacker",
        "Hackers usually go after the easiest targets: reused passwords, unpatched software, and people who click before they think. Strong unique passwords, prompt updates, and a healthy suspicion of unexpected messages stop most attacks.",
    ),
    // Guides
    (
        "cybersecurity guide",
        "COMPREHENSIVE CYBERSECURITY GUIDE

PASSWORD SECURITY:
    • Use unique, strong passwords (12+ characters with mix of letters, numbers, symbols)
    • Enable two-factor authentication (2FA) on all important accounts
    • Use a reputable password manager to generate and store passwords
    • Never reuse passwords across multiple accounts

EMAIL SAFETY:
    • Verify sender addresses carefully before clicking links or attachments
    • Look for spelling errors, urgent language, and suspicious requests
    • Never provide personal information via email
    • Use official websites instead of email links for sensitive transactions

BROWSING SAFELY:
    • Only visit HTTPS websites (look for the lock icon)
    • Keep browsers updated with latest security patches
    • Use ad blockers and privacy extensions
    • Be cautious with downloads from unknown sources

DEVICE PROTECTION:
    • Install reputable antivirus software and keep it updated
    • Enable automatic security updates for your operating system
    • Use device lock screens with PINs, passwords, or biometrics
    • Regularly backup important data to secure locations

NETWORK SECURITY:
    • Use WPA3 encryption on home Wi-Fi networks
    • Avoid public Wi-Fi for sensitive activities
    • Consider using a VPN for additional privacy protection
    • Change default router passwords and settings

SOCIAL MEDIA SAFETY:
    • Review and adjust privacy settings regularly
    • Be selective about what personal information you share
    • Verify friend/connection requests from unknown people
    • Be cautious of suspicious messages, even from known contacts

INCIDENT RESPONSE:
    • If compromised, immediately change passwords and enable 2FA
    • Scan devices with updated antivirus software
    • Monitor financial accounts for suspicious activity
    • Report incidents to relevant authorities or organizations

Remember: Cybersecurity is an ongoing process, not a one-time setup. Stay informed about new threats and regularly review your security practices.",
    ),
    (
        "cybersecurity terms",
        "CYBERSECURITY TERMS SUMMARY

MALWARE TYPES:
    • Virus - Self-replicating malware that spreads to other devices
    • Worm - Network-spreading malware that doesn't require user interaction
    • Trojan - Malware disguised as legitimate software
    • Ransomware - Encrypts files and demands payment for decryption
    • Spyware - Secretly gathers information without user knowledge
    • Keylogger - Records keystrokes to steal passwords and data
    • Adware - Automatically displays unwanted advertisements
    • Rootkit - Hides malicious activity from detection systems

ATTACK METHODS:
    • Phishing - Fake communications to steal personal information
    • Pharming - Redirects users to spoofed websites
    • Social Engineering - Psychological manipulation for information theft
    • Spoofing - Falsifying data or identities to deceive users
    • Brute Force - Systematic password cracking attempts
    • SQL Injection - Malicious database queries to access data
    • XSS (Cross-Site Scripting) - Injecting malicious scripts into websites
    • CSRF (Cross-Site Request Forgery) - Forcing unwanted user actions
    • MITM (Man-in-the-Middle) - Intercepting communications between parties
    • DDoS - Overwhelming networks with traffic to disrupt services
    • Zero-day - Exploiting unknown software vulnerabilities

SECURITY MEASURES:
    • Firewall - Network traffic monitoring and control system
    • Antivirus - Software to detect and remove malware
    • VPN - Encrypts internet traffic and masks IP addresses
    • 2FA/MFA - Multi-factor authentication for enhanced security
    • Encryption - Converting data into unreadable code
    • Patch - Software updates to fix security vulnerabilities
    • Sandbox - Isolated environment for testing suspicious programs

SECURITY TIPS AVAILABLE:
    • Password Safety & Tips, Email Tips, Browsing Tips, Device Tips
    • WiFi Tips, Social Media Tips, Public WiFi Safety, Data Backup

Type 'cybersecurity guide' for a complete overview, or 'summary' for detailed explanations. Ask me about any of these terms for practical advice!",
    ),
    (
        "summary",
        "DETAILED CYBERSECURITY SUMMARY

MALWARE:
    • Virus - Attaches to legitimate programs and spreads when they run, corrupting files and stealing data.
    • Worm - Spreads across networks on its own, eating bandwidth and opening backdoors for other attacks.
    • Trojan - Poses as a useful application; once installed it steals data or gives attackers remote access.
    • Ransomware - Encrypts your files and demands payment, often threatening to leak stolen data too.
    • Spyware and keyloggers - Quietly record your activity and keystrokes to capture passwords and card numbers.
    • Rootkit - Hides deep in the system to keep attackers' access invisible to security tools.

ATTACKS:
    • Phishing and pharming - Fake messages or silently redirected websites that harvest your credentials.
    • Social engineering - Manipulates people rather than machines, exploiting trust, fear, and urgency.
    • Brute force - Automated guessing of passwords; long passwords and account lockouts defeat it.
    • SQL injection, XSS, and CSRF - Web application attacks that abuse how sites handle input and sessions.
    • MITM - Intercepts traffic between two parties, most often on unsecured networks.
    • DDoS - Floods a service with traffic from many infected devices until it stops responding.
    • Zero-day - Exploits a flaw before the vendor has shipped a patch.

DEFENCES:
    • Firewall - Filters network traffic against a set of rules.
    • Antivirus - Detects and removes malware using signatures and behaviour analysis.
    • VPN - Encrypts your traffic and masks your IP address, especially useful on public networks.
    • 2FA/MFA - Requires something you know plus something you have or are.
    • Encryption - Keeps data unreadable without the key, both in transit and at rest.
    • Patches - Close known holes; apply them promptly.
    • Sandbox - Runs untrusted programs in isolation.

For practical advice on any of these, just ask about the term by name!",
    ),
];

/// Table indices sorted longest key first; stable, so equal lengths keep table order.
static LOOKUP_ORDER: Lazy<Vec<usize>> = Lazy::new(|| {
    let mut order: Vec<usize> = (0..KNOWLEDGE_TABLE.len()).collect();
    order.sort_by(|a, b| KNOWLEDGE_TABLE[*b].0.len().cmp(&KNOWLEDGE_TABLE[*a].0.len()));
    order
});

/// Number of knowledge keys.
pub fn key_count() -> usize {
    KNOWLEDGE_TABLE.len()
}

/// Find the knowledge entry whose key occurs in `text`.
pub fn lookup(text: &str) -> Option<&'static str> {
    lookup_entry(text).map(|(_, answer)| answer)
}

/// Like `lookup`, but also returns the matched key.
pub fn lookup_entry(text: &str) -> Option<(&'static str, &'static str)> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    LOOKUP_ORDER
        .iter()
        .map(|i| KNOWLEDGE_TABLE[*i])
        .find(|(key, _)| lower.contains(key))
}

// ============ Small Talk ============

/// Whole-word match; apostrophes stay inside words ("don't").
pub fn contains_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|w| w == word)
}

/// Conversational replies for messages with no cybersecurity keyword.
pub fn small_talk(text: &str) -> Option<&'static str> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    if lower.contains("how are you") {
        Some("I'm doing well thanks, please feel free to ask me anything cybersecurity related!")
    } else if lower.contains("what's your purpose") || lower.contains("what is your purpose") {
        Some("I help educate users on cybersecurity best practices and answer questions about online threats.")
    } else if lower.contains("what can i ask") || lower.contains("help") || lower.contains("commands") {
        Some("You can ask about password safety, phishing scams, ransomware, viruses, and other cybersecurity topics. Try asking for a 'cybersecurity guide' for comprehensive information!")
    } else if lower.contains("hello") || contains_word(&lower, "hi") {
        Some("Hello! How can I help with your cybersecurity questions today?")
    } else if lower.contains("thank you") || lower.contains("thanks") {
        Some("You are welcome! Is there anything else you would like help with?")
    } else if lower.contains("goodbye") || contains_word(&lower, "bye") {
        Some("Goodbye! Stay safe online and remember to keep your security practices up to date.")
    } else {
        None
    }
}

/// Full knowledge reply: a keyed answer, else small talk, else `FALLBACK`.
pub fn respond(text: &str) -> &'static str {
    if text.trim().is_empty() {
        return EMPTY_INPUT;
    }
    lookup(text).or_else(|| small_talk(text)).unwrap_or(FALLBACK)
}

// ============ Topic Detection ============

/// Topic synonyms, scanned in declaration order; the first hit names the topic.
/// Broader than the lookup keys so that follow-ups and engagement tracking can
/// recognise a topic even when the answer came from a narrower key.
pub const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "phishing",
        &[
            "phishing", "scam", "fake email", "suspicious email", "email scam", "click link",
            "verify account", "urgent action", "pharming", "spoofed", "fraudulent", "smishing",
            "vishing", "fake website", "deceptive", "impersonation", "credential harvesting",
            "account locked", "security alert", "bank scam", "lottery scam", "prize scam",
            "social engineering",
        ],
    ),
    (
        "password",
        &[
            "password", "strong password", "password manager", "authentication", "credentials",
            "login", "secure password", "password security", "password tips", "password strength",
            "weak password", "passphrase", "password reuse", "password reset", "password policy",
            "password breach", "password leak", "password vault", "password generator",
            "password protection",
        ],
    ),
    (
        "malware",
        &[
            "malware", "virus", "trojan", "spyware", "antivirus", "infection", "malicious software",
            "computer virus", "worm", "adware", "rootkit", "keylogger", "botnet", "payload",
            "exploit", "backdoor", "malicious attachment", "malicious link", "malicious code",
            "malicious file",
        ],
    ),
    (
        "privacy",
        &[
            "privacy", "personal data", "tracking", "surveillance", "data collection",
            "personal information", "data protection", "online privacy", "data breach",
            "data leak", "privacy settings", "incognito", "private browsing", "cookie",
            "tracking cookie", "browser fingerprinting", "anonymity", "gdpr", "ccpa",
            "identity theft",
        ],
    ),
    (
        "ransomware",
        &[
            "ransomware", "ransom", "encrypt", "locked files", "bitcoin demand", "files encrypted",
            "pay ransom", "crypto locker", "decrypt", "decryption key", "ransom note", "extortion",
            "data hostage", "double extortion", "crypto virus", "backup",
        ],
    ),
    (
        "network security",
        &[
            "network security", "wifi", "router", "firewall", "vpn", "encryption", "ssid", "wpa2",
            "wpa3", "network breach", "packet sniffing", "man in the middle", "mitm",
            "public wifi", "secure connection", "network monitoring", "intrusion detection",
        ],
    ),
    (
        "social engineering",
        &[
            "social engineering", "pretexting", "baiting", "tailgating", "impersonation",
            "manipulation", "psychological attack", "con artist", "confidence trick",
            "shoulder surfing", "dumpster diving", "reverse social engineering",
        ],
    ),
    (
        "pharming",
        &[
            "pharming", "dns hijacking", "dns poisoning", "redirect", "fake site",
            "spoofed website", "malicious redirect", "dns attack", "dns spoofing",
        ],
    ),
    (
        "firewall",
        &[
            "firewall", "network filter", "packet filter", "port blocking", "application firewall",
            "windows firewall", "mac firewall", "linux firewall", "block traffic", "allow traffic",
        ],
    ),
    (
        "antivirus",
        &[
            "antivirus", "virus scanner", "malware scanner", "real-time protection",
            "virus definition", "malware removal", "security suite", "threat detection",
        ],
    ),
    (
        "vpn",
        &[
            "vpn", "virtual private network", "secure tunnel", "encrypted connection", "hide ip",
            "anonymize", "remote access", "vpn service", "vpn provider",
        ],
    ),
    (
        "2fa",
        &[
            "2fa", "two-factor authentication", "multi-factor authentication", "mfa",
            "authenticator app", "sms code", "security code", "verification code",
            "one-time password", "otp",
        ],
    ),
];

/// Name the topic a message is about, if any.
pub fn detect_topic(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| *topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_lookup_finds_phishing() {
        let answer = lookup("Tell me about phishing scams").unwrap();
        assert!(answer.starts_with("Phishing is a cyber attack"));
    }

    #[test]
    fn longest_key_wins_on_overlap() {
        let (key, _) = lookup_entry("any password tips for me?").unwrap();
        assert_eq!(key, "password tips");
        let (key, _) = lookup_entry("password safety tips please").unwrap();
        assert_eq!(key, "password safety tips");
        let (key, _) = lookup_entry("ransomware vs malware").unwrap();
        assert_eq!(key, "ransomware");
    }

    #[test]
    fn matching_is_substring_not_token() {
        let (key, _) = lookup_entry("is passwordless login safe").unwrap();
        assert_eq!(key, "password");
    }

    #[test]
    fn unknown_text_falls_back() {
        assert_eq!(lookup("what's the weather"), None);
        assert_eq!(respond("what's the weather"), FALLBACK);
        assert_eq!(respond("   "), EMPTY_INPUT);
    }

    #[test]
    fn small_talk_matches_whole_word_greetings() {
        assert!(respond("hi there").starts_with("Hello!"));
        assert!(respond("how are you?").starts_with("I'm doing well"));
        // "this" must not count as "hi"
        assert_eq!(small_talk("this thing"), None);
    }

    #[test]
    fn topic_detection_uses_declared_order() {
        assert_eq!(detect_topic("I got a fake email"), Some("phishing"));
        // pharming is a phishing synonym and phishing is declared first
        assert_eq!(detect_topic("what is pharming"), Some("phishing"));
        assert_eq!(detect_topic("set up my VPN"), Some("network security"));
        assert_eq!(detect_topic("enable 2fa"), Some("2fa"));
        assert_eq!(detect_topic("the sky is blue"), None);
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        let mut keys: Vec<&str> = KNOWLEDGE_TABLE.iter().map(|(k, _)| *k).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(key_count(), total);
    }
}
