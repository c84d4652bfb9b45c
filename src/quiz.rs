//! Multiple-choice cybersecurity quiz.
//!
//! - `QuestionBank`: the fixed question set, with random and per-topic draws
//! - `QuizScoreManager`: running score, per-topic results, banded feedback
//! - `QuizGameController`: one quiz session; every call returns the
//!   `QuizEvent`s it produced instead of firing callbacks

use crate::error::{CoreError, Result};
use crate::logging;
use crate::memory::UserProfile;
use crate::phrases::PhrasePicker;
use crate::sentiment::SentimentLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of correct answers below which a topic needs more work.
const WEAK_TOPIC_THRESHOLD: f64 = 70.0;

// ============ Questions ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub topic: String,
    pub explanation: String,
    pub feedback: String,
}

impl QuizQuestion {
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() >= 2
            && self.correct_index < self.options.len()
            && !self.topic.trim().is_empty()
    }

    pub fn correct_answer(&self) -> &str {
        self.options.get(self.correct_index).map(String::as_str).unwrap_or("")
    }

    pub fn correct_letter(&self) -> char {
        option_letter(self.correct_index)
    }

    /// "A) ...", "B) ..." lines.
    pub fn formatted_options(&self) -> Vec<String> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}) {}", option_letter(i), option))
            .collect()
    }
}

fn option_letter(index: usize) -> char {
    (b'A' + (index as u8 % 26)) as char
}

/// Map a one-letter answer ("b", "C") to an option index.
pub fn answer_index(text: &str) -> Option<usize> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let letter = chars.next()?;
    if chars.next().is_some() || !letter.is_ascii_alphabetic() {
        return None;
    }
    Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
}

struct QuestionSeed {
    question: &'static str,
    options: [&'static str; 4],
    correct: usize,
    topic: &'static str,
    explanation: &'static str,
    feedback: &'static str,
}

impl QuestionSeed {
    fn to_question(&self) -> QuizQuestion {
        QuizQuestion {
            question: self.question.to_string(),
            options: self.options.iter().map(|o| o.to_string()).collect(),
            correct_index: self.correct,
            topic: self.topic.to_string(),
            explanation: self.explanation.to_string(),
            feedback: self.feedback.to_string(),
        }
    }
}

const QUESTION_SEEDS: &[QuestionSeed] = &[
    QuestionSeed {
        question: "What should you do if you receive an email asking for your password?",
        options: ["Reply with your password", "Delete the email", "Report the email as phishing", "Ignore it"],
        correct: 2,
        topic: "phishing",
        explanation: "Reporting phishing emails helps prevent scams and protects others.",
        feedback: "Correct! Reporting phishing emails helps prevent scams.",
    },
    QuestionSeed {
        question: "Which of the following is a common sign of a phishing email?",
        options: ["Professional formatting", "Urgent language and threats", "Correct spelling", "Valid sender address"],
        correct: 1,
        topic: "phishing",
        explanation: "Phishing emails often use urgency and fear tactics to pressure victims.",
        feedback: "Great job! You're learning to stay safe online!",
    },
    QuestionSeed {
        question: "What is a common characteristic of phishing websites?",
        options: ["They have HTTPS certificates", "They mimic legitimate websites", "They load very slowly", "They have no images"],
        correct: 1,
        topic: "phishing",
        explanation: "Phishing websites often look like legitimate sites to trick users into entering credentials.",
        feedback: "Excellent! Always verify website authenticity.",
    },
    QuestionSeed {
        question: "What makes a strong password?",
        options: ["Your birthday", "At least 12 characters with mixed case, numbers, and symbols", "Your pet's name", "123456789"],
        correct: 1,
        topic: "password security",
        explanation: "Strong passwords are long and complex, making them harder to crack.",
        feedback: "Excellent! You understand password security principles.",
    },
    QuestionSeed {
        question: "How often should you change your passwords?",
        options: ["Never", "Every day", "When there's a security breach or concern", "Every hour"],
        correct: 2,
        topic: "password security",
        explanation: "Regular password changes aren't always necessary, but should be done when security is compromised.",
        feedback: "Keep learning to stay safe online!",
    },
    QuestionSeed {
        question: "What is the best practice for managing multiple passwords?",
        options: ["Use the same password everywhere", "Write them on paper", "Use a password manager", "Memorize them all"],
        correct: 2,
        topic: "password security",
        explanation: "Password managers securely store and generate unique passwords for each account.",
        feedback: "Smart choice! Password managers are essential security tools.",
    },
    QuestionSeed {
        question: "What is social engineering in cybersecurity?",
        options: ["Building social networks", "Manipulating people to reveal confidential information", "Engineering social media", "Creating user profiles"],
        correct: 1,
        topic: "social engineering",
        explanation: "Social engineering exploits human psychology rather than technical vulnerabilities.",
        feedback: "Great job! You're becoming a cybersecurity pro!",
    },
    QuestionSeed {
        question: "A stranger calls claiming to be from IT support and asks for your login credentials. What should you do?",
        options: ["Provide the information immediately", "Hang up and verify through official channels", "Ask for their employee ID", "Give them a fake password"],
        correct: 1,
        topic: "social engineering",
        explanation: "Always verify the identity of anyone requesting sensitive information through official channels.",
        feedback: "Perfect! Never trust unsolicited requests for credentials.",
    },
    QuestionSeed {
        question: "What should you look for to verify a website is secure?",
        options: ["Colorful design", "HTTPS in the URL and a padlock icon", "Lots of advertisements", "Pop-up windows"],
        correct: 1,
        topic: "safe browsing",
        explanation: "HTTPS encrypts data between your browser and the website.",
        feedback: "Excellent! You know how to browse safely.",
    },
    QuestionSeed {
        question: "What should you do if you accidentally visit a suspicious website?",
        options: ["Continue browsing", "Close the browser immediately", "Enter your personal information", "Download files from the site"],
        correct: 1,
        topic: "safe browsing",
        explanation: "Closing suspicious websites immediately prevents potential malware downloads.",
        feedback: "Smart thinking! Quick action prevents security risks.",
    },
    QuestionSeed {
        question: "What is malware?",
        options: ["Good software", "Malicious software designed to harm computers", "Email attachments", "Web browsers"],
        correct: 1,
        topic: "malware",
        explanation: "Malware includes viruses, trojans, ransomware, and other harmful software.",
        feedback: "Correct! Understanding malware helps you stay protected.",
    },
    QuestionSeed {
        question: "What is ransomware?",
        options: ["Free software", "Malware that encrypts files and demands payment", "A type of antivirus", "A web browser"],
        correct: 1,
        topic: "malware",
        explanation: "Ransomware locks your files and demands payment for the decryption key.",
        feedback: "Correct! Ransomware is a serious threat to be aware of.",
    },
    QuestionSeed {
        question: "Is it safe to use public WiFi for online banking?",
        options: ["Yes, always", "No, never without a VPN", "Only on weekends", "Only during business hours"],
        correct: 1,
        topic: "wifi security",
        explanation: "Public WiFi can be monitored by attackers, making sensitive activities risky.",
        feedback: "Great! You understand WiFi security risks.",
    },
    QuestionSeed {
        question: "What is the most secure type of WiFi encryption?",
        options: ["WEP", "WPA", "WPA2", "WPA3"],
        correct: 3,
        topic: "wifi security",
        explanation: "WPA3 is the latest and most secure WiFi encryption standard.",
        feedback: "Excellent! Always use the strongest encryption available.",
    },
    QuestionSeed {
        question: "What is the best way to protect sensitive data?",
        options: ["Share it with everyone", "Store it in plain text", "Encrypt it and use strong access controls", "Post it online"],
        correct: 2,
        topic: "data protection",
        explanation: "Encryption and access controls are fundamental data protection measures.",
        feedback: "Excellent! You're a cybersecurity champion!",
    },
    QuestionSeed {
        question: "What is two-factor authentication (2FA)?",
        options: ["Using two passwords", "An additional security layer requiring a second form of verification", "Two different browsers", "Two email accounts"],
        correct: 1,
        topic: "two-factor authentication",
        explanation: "2FA adds an extra security layer beyond just passwords.",
        feedback: "Perfect! 2FA significantly improves account security.",
    },
    QuestionSeed {
        question: "Why are software updates important for security?",
        options: ["They make software slower", "They fix security vulnerabilities", "They add advertisements", "They use more storage"],
        correct: 1,
        topic: "software updates",
        explanation: "Updates often include critical security patches that fix known vulnerabilities.",
        feedback: "Great understanding! Keep your software updated.",
    },
    QuestionSeed {
        question: "If a link in an email looks suspicious, what should you do before clicking?",
        options: ["Click it to see where it goes", "Hover over the link to check the URL", "Forward it to friends", "Ignore the email"],
        correct: 1,
        topic: "phishing",
        explanation: "Hovering over links lets you see the real destination before clicking.",
        feedback: "Good job! Always check links before clicking.",
    },
    QuestionSeed {
        question: "Which of the following is NOT a good password practice?",
        options: ["Using unique passwords for each account", "Sharing your password with a trusted friend", "Enabling two-factor authentication", "Using a password manager"],
        correct: 1,
        topic: "password security",
        explanation: "You should never share your password, even with trusted friends.",
        feedback: "Correct! Passwords should always be kept private.",
    },
    QuestionSeed {
        question: "Which is an example of social engineering?",
        options: ["A hacker guessing your password", "A fake IT person calling to ask for your credentials", "A virus infecting your computer", "A firewall blocking traffic"],
        correct: 1,
        topic: "social engineering",
        explanation: "Social engineering manipulates people, not technology.",
        feedback: "Well done! Recognizing social engineering is key.",
    },
    QuestionSeed {
        question: "What should you do before entering personal information on a website?",
        options: ["Check for HTTPS and a padlock icon", "Check if the site looks colorful", "See if there are pop-ups", "Nothing, just enter it"],
        correct: 0,
        topic: "safe browsing",
        explanation: "HTTPS and a padlock icon indicate a secure connection.",
        feedback: "Great! Always check for secure connections.",
    },
    QuestionSeed {
        question: "Which action can help prevent malware infections?",
        options: ["Opening email attachments from unknown senders", "Keeping your software updated", "Clicking on pop-up ads", "Disabling your antivirus"],
        correct: 1,
        topic: "malware",
        explanation: "Software updates often patch vulnerabilities that malware exploits.",
        feedback: "Correct! Updates are important for security.",
    },
    QuestionSeed {
        question: "Which of the following is a safe way to dispose of sensitive documents?",
        options: ["Throw them in the trash", "Shred them", "Leave them on your desk", "Give them to a friend"],
        correct: 1,
        topic: "data protection",
        explanation: "Shredding ensures sensitive information cannot be reconstructed.",
        feedback: "Excellent! Shredding protects your data.",
    },
    QuestionSeed {
        question: "What is 'spear phishing'?",
        options: ["A phishing attack targeting a specific individual or organization", "A phishing attack using phone calls", "A phishing attack using social media", "A phishing attack with malware attachments"],
        correct: 0,
        topic: "phishing",
        explanation: "Spear phishing is a targeted phishing attack aimed at a specific person or organization.",
        feedback: "Correct! Spear phishing is highly targeted and dangerous.",
    },
    QuestionSeed {
        question: "Why should you avoid using personal information in your passwords?",
        options: ["It's hard to remember", "It makes passwords easier to guess", "Websites don't allow it", "It takes too long to type"],
        correct: 1,
        topic: "password security",
        explanation: "Personal information can be easily found or guessed by attackers.",
        feedback: "Good! Avoiding personal info makes your passwords stronger.",
    },
    QuestionSeed {
        question: "Which of the following is a common social engineering tactic?",
        options: ["Offering free gifts", "Using technical jargon", "Sending encrypted emails", "Ignoring security policies"],
        correct: 0,
        topic: "social engineering",
        explanation: "Social engineers often offer free gifts to lure victims.",
        feedback: "Correct! Be wary of offers that seem too good to be true.",
    },
    QuestionSeed {
        question: "What is a browser extension?",
        options: ["A type of malware", "A small software add-on that adds features to your browser", "A new browser window", "A pop-up ad"],
        correct: 1,
        topic: "safe browsing",
        explanation: "Browser extensions add functionality but can also pose security risks if not trusted.",
        feedback: "Great! Only install extensions from trusted sources.",
    },
    QuestionSeed {
        question: "What should you do if your computer is infected with malware?",
        options: ["Ignore it", "Run a reputable antivirus scan", "Unplug your monitor", "Delete random files"],
        correct: 1,
        topic: "malware",
        explanation: "Running a reputable antivirus scan is the best first step.",
        feedback: "Correct! Antivirus software can help remove malware.",
    },
    QuestionSeed {
        question: "What is data encryption?",
        options: ["Deleting data", "Converting data into a coded form to prevent unauthorized access", "Backing up data", "Sharing data online"],
        correct: 1,
        topic: "data protection",
        explanation: "Encryption protects data by making it unreadable without the correct key.",
        feedback: "Excellent! Encryption is vital for data security.",
    },
];

// ============ Question Bank ============

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionBank {
    pub fn new() -> Self {
        let questions = QUESTION_SEEDS
            .iter()
            .map(QuestionSeed::to_question)
            .filter(QuizQuestion::is_valid)
            .collect();
        Self { questions }
    }

    pub fn random_questions(&self, count: usize, picker: &mut PhrasePicker) -> Vec<QuizQuestion> {
        let mut drawn = self.questions.clone();
        picker.shuffle(&mut drawn);
        drawn.truncate(count);
        drawn
    }

    pub fn questions_by_topic(&self, topic: &str) -> Vec<QuizQuestion> {
        let topic = topic.trim().to_lowercase();
        self.questions
            .iter()
            .filter(|q| q.topic.to_lowercase() == topic)
            .cloned()
            .collect()
    }

    /// Distinct topics, sorted.
    pub fn topics(&self) -> Vec<String> {
        self.topic_question_counts().into_keys().collect()
    }

    pub fn total_count(&self) -> usize {
        self.questions.len()
    }

    pub fn topic_question_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for question in &self.questions {
            *counts.entry(question.topic.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Resolve loose user wording ("passwords", "WiFi") to a known topic.
    pub fn resolve_topic(&self, query: &str) -> Option<String> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let topics = self.topics();
        if let Some(exact) = topics.iter().find(|t| **t == query) {
            return Some(exact.clone());
        }
        topics.into_iter().find(|topic| {
            topic
                .split_whitespace()
                .filter(|word| word.len() > 3)
                .any(|word| query.contains(word))
        })
    }
}

// ============ Score Manager ============

#[derive(Debug, Clone)]
struct AnswerRecord {
    topic: String,
    correct: bool,
}

#[derive(Debug, Clone, Default)]
pub struct QuizScoreManager {
    results: Vec<AnswerRecord>,
    score: usize,
    answered: usize,
}

impl QuizScoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_answer(&mut self, question: &QuizQuestion, correct: bool) {
        self.results.push(AnswerRecord { topic: question.topic.clone(), correct });
        if correct {
            self.score += 1;
        }
        self.answered += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn percentage(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.score as f64 / self.answered as f64 * 100.0
        }
    }

    pub fn performance_feedback(&self) -> &'static str {
        match self.percentage() {
            p if p >= 90.0 => "Outstanding! You're a cybersecurity expert! 🏆",
            p if p >= 80.0 => "Excellent work! You have strong cybersecurity knowledge. 🌟",
            p if p >= 70.0 => "Good job! You're on the right track to staying safe online. 👍",
            p if p >= 60.0 => "Not bad! Keep learning to improve your cybersecurity awareness. 📚",
            p if p >= 50.0 => "You're getting there! Review the topics and try again. 💪",
            _ => "Keep practicing! Cybersecurity knowledge is crucial for staying safe online. 🔒",
        }
    }

    /// (correct, answered) per topic.
    pub fn topic_performance(&self) -> BTreeMap<String, (usize, usize)> {
        let mut performance = BTreeMap::new();
        for record in &self.results {
            let entry = performance.entry(record.topic.clone()).or_insert((0, 0));
            if record.correct {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
        performance
    }

    pub fn topics_needing_improvement(&self) -> Vec<String> {
        self.topic_performance()
            .into_iter()
            .filter(|(_, (correct, total))| (*correct as f64 / *total as f64) * 100.0 < WEAK_TOPIC_THRESHOLD)
            .map(|(topic, _)| topic)
            .collect()
    }
}

// ============ Events ============

#[derive(Debug, Clone)]
pub enum QuizEvent {
    Started {
        total: usize,
        topic: Option<String>,
    },
    QuestionAsked {
        question: QuizQuestion,
        number: usize,
        total: usize,
    },
    AnswerResult {
        question: QuizQuestion,
        correct: bool,
        score: usize,
        answered: usize,
        feedback: String,
    },
    Completed {
        score: usize,
        total: usize,
        percentage: f64,
        feedback: String,
        weak_topics: Vec<String>,
    },
    Reset,
}

// ============ Controller ============

#[derive(Debug, Clone)]
pub struct QuizGameController {
    bank: QuestionBank,
    scores: QuizScoreManager,
    questions: Vec<QuizQuestion>,
    index: usize,
    in_progress: bool,
    default_count: usize,
}

impl QuizGameController {
    pub fn new(default_count: usize) -> Self {
        Self {
            bank: QuestionBank::new(),
            scores: QuizScoreManager::new(),
            questions: Vec::new(),
            index: 0,
            in_progress: false,
            default_count: default_count.max(1),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.in_progress {
            self.questions.get(self.index)
        } else {
            None
        }
    }

    /// 1-based.
    pub fn current_question_number(&self) -> usize {
        self.index + 1
    }

    pub fn current_score(&self) -> usize {
        self.scores.score()
    }

    pub fn total_questions(&self) -> usize {
        self.scores.answered()
    }

    pub fn quiz_length(&self) -> usize {
        self.questions.len()
    }

    pub fn current_percentage(&self) -> f64 {
        self.scores.percentage()
    }

    pub fn scores(&self) -> &QuizScoreManager {
        &self.scores
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn available_topics(&self) -> Vec<String> {
        self.bank.topics()
    }

    pub fn topic_question_count(&self, topic: &str) -> usize {
        self.bank.questions_by_topic(topic).len()
    }

    pub fn start_quiz(&mut self, picker: &mut PhrasePicker, count: Option<usize>) -> Result<Vec<QuizEvent>> {
        self.ensure_idle()?;
        let questions = self.bank.random_questions(count.unwrap_or(self.default_count), picker);
        Ok(self.begin(questions, None))
    }

    pub fn start_topic_quiz(
        &mut self,
        topic: &str,
        picker: &mut PhrasePicker,
        count: Option<usize>,
    ) -> Result<Vec<QuizEvent>> {
        self.ensure_idle()?;
        let mut questions = self.bank.questions_by_topic(topic);
        if questions.is_empty() {
            return Err(CoreError::Quiz(format!("No questions found for topic: {}", topic)));
        }
        picker.shuffle(&mut questions);
        questions.truncate(count.unwrap_or(self.default_count));
        Ok(self.begin(questions, Some(topic.to_string())))
    }

    pub fn submit_answer(&mut self, option_index: usize) -> Result<Vec<QuizEvent>> {
        let question = self
            .current_question()
            .cloned()
            .ok_or_else(|| CoreError::Quiz("No quiz in progress or no current question.".into()))?;
        if option_index >= question.options.len() {
            return Err(CoreError::Quiz("Invalid option index.".into()));
        }

        let correct = option_index == question.correct_index;
        self.scores.record_answer(&question, correct);
        logging::log_quiz(None, &format!("Answered '{}' {}", question.topic, if correct { "correctly" } else { "incorrectly" }));

        let feedback = if correct {
            question.feedback.clone()
        } else {
            format!(
                "Incorrect. The correct answer is {}) {}",
                question.correct_letter(),
                question.correct_answer()
            )
        };

        let mut events = vec![QuizEvent::AnswerResult {
            question,
            correct,
            score: self.scores.score(),
            answered: self.scores.answered(),
            feedback,
        }];

        self.index += 1;
        if self.index >= self.questions.len() {
            events.push(self.complete());
        } else if let Some(event) = self.ask_current() {
            events.push(event);
        }
        Ok(events)
    }

    pub fn reset(&mut self) -> Vec<QuizEvent> {
        self.scores.reset();
        self.questions.clear();
        self.index = 0;
        self.in_progress = false;
        vec![QuizEvent::Reset]
    }

    /// Study suggestions from the profile and this quiz's weak topics.
    pub fn recommendations(&self, profile: &UserProfile) -> Vec<String> {
        let mut tips = Vec::new();
        if let Some(favorite) = profile.favorite_topic() {
            tips.push(format!(
                "Since you're interested in {}, consider taking advanced courses in this area.",
                favorite
            ));
        }

        let weak = self.scores.topics_needing_improvement();
        if !weak.is_empty() {
            tips.push(format!("Focus on improving your knowledge in: {}", weak.join(", ")));
        }

        match profile.recent_sentiment() {
            SentimentLabel::Frustrated | SentimentLabel::Anxious => {
                tips.push("Don't worry if some questions were challenging - cybersecurity is complex!".into());
                tips.push("Practice makes perfect. Try taking the quiz again later.".into());
            }
            SentimentLabel::Positive => {
                tips.push("Great job! You're building strong cybersecurity habits.".into());
                tips.push("Consider sharing your knowledge with friends and family.".into());
            }
            _ => {}
        }

        tips.push("Remember: Cybersecurity is everyone's responsibility!".into());
        tips.push("Keep learning and stay updated on the latest security threats.".into());
        tips
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.in_progress {
            return Err(CoreError::Quiz("Quiz is already in progress. Reset the quiz first.".into()));
        }
        Ok(())
    }

    fn begin(&mut self, questions: Vec<QuizQuestion>, topic: Option<String>) -> Vec<QuizEvent> {
        self.scores.reset();
        self.questions = questions;
        self.index = 0;
        self.in_progress = true;
        logging::log_quiz(None, &format!("Quiz started with {} questions", self.questions.len()));

        let mut events = vec![QuizEvent::Started { total: self.questions.len(), topic }];
        events.extend(self.ask_current());
        events
    }

    fn ask_current(&self) -> Option<QuizEvent> {
        self.current_question().map(|question| QuizEvent::QuestionAsked {
            question: question.clone(),
            number: self.index + 1,
            total: self.questions.len(),
        })
    }

    fn complete(&mut self) -> QuizEvent {
        self.in_progress = false;
        logging::log_quiz(
            None,
            &format!("Quiz completed: {}/{}", self.scores.score(), self.scores.answered()),
        );
        QuizEvent::Completed {
            score: self.scores.score(),
            total: self.scores.answered(),
            percentage: self.scores.percentage(),
            feedback: self.scores.performance_feedback().to_string(),
            weak_topics: self.scores.topics_needing_improvement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_all(controller: &mut QuizGameController, right: bool) -> Vec<QuizEvent> {
        let mut last = Vec::new();
        while let Some(question) = controller.current_question().cloned() {
            let pick = if right {
                question.correct_index
            } else {
                (question.correct_index + 1) % question.options.len()
            };
            last = controller.submit_answer(pick).unwrap();
        }
        last
    }

    #[test]
    fn bank_has_every_question_and_sorted_topics() {
        let bank = QuestionBank::new();
        assert_eq!(bank.total_count(), 29);
        let topics = bank.topics();
        assert_eq!(topics.first().map(String::as_str), Some("data protection"));
        assert!(topics.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(bank.topic_question_counts().get("phishing"), Some(&5));
    }

    #[test]
    fn loose_topic_names_resolve() {
        let bank = QuestionBank::new();
        assert_eq!(bank.resolve_topic("Phishing").as_deref(), Some("phishing"));
        assert_eq!(bank.resolve_topic("passwords").as_deref(), Some("password security"));
        assert_eq!(bank.resolve_topic("wifi").as_deref(), Some("wifi security"));
        assert_eq!(bank.resolve_topic("cooking"), None);
    }

    #[test]
    fn letters_map_to_indices() {
        assert_eq!(answer_index("a"), Some(0));
        assert_eq!(answer_index(" D "), Some(3));
        assert_eq!(answer_index("ab"), None);
        assert_eq!(answer_index("1"), None);
    }

    #[test]
    fn start_asks_first_question_and_blocks_restart() {
        let mut picker = PhrasePicker::seeded(5);
        let mut controller = QuizGameController::new(10);
        let events = controller.start_quiz(&mut picker, None).unwrap();
        assert!(matches!(events[0], QuizEvent::Started { total: 10, .. }));
        assert!(matches!(events[1], QuizEvent::QuestionAsked { number: 1, total: 10, .. }));

        let err = controller.start_quiz(&mut picker, None).unwrap_err();
        assert_eq!(err.to_string(), "Quiz is already in progress. Reset the quiz first.");
    }

    #[test]
    fn wrong_answer_names_the_right_one() {
        let mut picker = PhrasePicker::seeded(5);
        let mut controller = QuizGameController::new(3);
        controller.start_topic_quiz("phishing", &mut picker, None).unwrap();
        let question = controller.current_question().cloned().unwrap();
        let wrong = (question.correct_index + 1) % 4;
        let events = controller.submit_answer(wrong).unwrap();
        match &events[0] {
            QuizEvent::AnswerResult { correct, feedback, .. } => {
                assert!(!correct);
                assert_eq!(
                    *feedback,
                    format!("Incorrect. The correct answer is {}) {}", question.correct_letter(), question.correct_answer())
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[1], QuizEvent::QuestionAsked { number: 2, .. }));
    }

    #[test]
    fn perfect_run_completes_with_top_band() {
        let mut picker = PhrasePicker::seeded(9);
        let mut controller = QuizGameController::new(4);
        controller.start_quiz(&mut picker, None).unwrap();
        let events = answer_all(&mut controller, true);
        match events.last() {
            Some(QuizEvent::Completed { score, total, feedback, weak_topics, .. }) => {
                assert_eq!((*score, *total), (4, 4));
                assert!(feedback.starts_with("Outstanding!"));
                assert!(weak_topics.is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!controller.is_in_progress());
        assert!(controller.submit_answer(0).is_err());
    }

    #[test]
    fn failed_topics_need_improvement() {
        let mut picker = PhrasePicker::seeded(2);
        let mut controller = QuizGameController::new(10);
        controller.start_topic_quiz("malware", &mut picker, None).unwrap();
        assert_eq!(controller.quiz_length(), 4);
        answer_all(&mut controller, false);
        assert_eq!(controller.scores().topics_needing_improvement(), vec!["malware"]);
        assert!(controller.scores().performance_feedback().starts_with("Keep practicing!"));
    }

    #[test]
    fn unknown_topic_and_bad_index_are_errors() {
        let mut picker = PhrasePicker::seeded(1);
        let mut controller = QuizGameController::new(5);
        let err = controller.start_topic_quiz("cooking", &mut picker, None).unwrap_err();
        assert_eq!(err.to_string(), "No questions found for topic: cooking");

        controller.start_quiz(&mut picker, Some(2)).unwrap();
        let err = controller.submit_answer(7).unwrap_err();
        assert_eq!(err.to_string(), "Invalid option index.");

        assert!(matches!(controller.reset().as_slice(), [QuizEvent::Reset]));
        assert!(!controller.is_in_progress());
        assert_eq!(controller.current_score(), 0);
    }

    #[test]
    fn score_bands() {
        let question = QuestionBank::new().questions_by_topic("phishing").remove(0);
        let mut scores = QuizScoreManager::new();
        for correct in [true, true, true, false, false] {
            scores.record_answer(&question, correct);
        }
        assert!((scores.percentage() - 60.0).abs() < 1e-9);
        assert!(scores.performance_feedback().starts_with("Not bad!"));
        assert_eq!(scores.topic_performance().get("phishing"), Some(&(3, 5)));
    }

    #[test]
    fn recommendations_reflect_profile() {
        let controller = QuizGameController::new(5);
        let mut profile = UserProfile::new();
        profile.record_topic_discussed("vpn");
        profile.record_sentiment(SentimentLabel::Positive);
        let tips = controller.recommendations(&profile);
        assert!(tips[0].contains("interested in vpn"));
        assert!(tips.contains(&"Great job! You're building strong cybersecurity habits.".to_string()));
        assert_eq!(tips.last().map(String::as_str), Some("Keep learning and stay updated on the latest security threats."));
    }
}
