//! Response composition for free-form chat.
//!
//! `ResponseComposer` turns one message into one reply:
//! greeting/farewell short-circuit, sentiment tagging, fact extraction,
//! yes/no follow-up handling, knowledge lookup, then sentiment-aware
//! rewriting and a throttled follow-up question.
//!
//! All per-user state lives in `SessionState`, passed in by the caller. The
//! composer itself only carries timing configuration.

use crate::config::{CyberGuardConfig, MAX_TIMER_SECS};
use crate::knowledge::{self, contains_word};
use crate::logging;
use crate::memory::UserProfile;
use crate::phrases::{self, PhrasePicker};
use crate::sentiment::{self, SentimentLabel};
use chrono::{DateTime, Duration, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use uuid::Uuid;

const RECENT_TOPIC_RING: usize = 3;
const BREAK_OFFER_AFTER_TURNS: u32 = 10;
const SUMMARY_OFFER_AFTER_QUESTIONS: u32 = 5;
const POSITIVE_DETAIL_MAX_CHARS: usize = 200;

const QUESTION_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "which", "can", "could", "would", "should",
    "is", "are", "do", "does", "did",
];

/// Words that follow "i'm"/"i am" without being a name.
const NOT_A_NAME: &[&str] = &[
    "a", "an", "the", "not", "so", "very", "really", "just", "still", "also", "too", "here",
    "new", "fine", "ok", "okay", "good", "great", "sure", "glad", "sorry", "back", "done",
    "curious", "interested", "wondering", "trying", "looking", "going", "having", "getting",
    "feeling", "tired", "sick", "fed", "on", "in", "at", "with", "from", "about", "ready",
];

static NAME_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(my name is|i'm|i am)\s+(\w+)").ok());
static INTEREST_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?:interested in|like to know about)\s+(\w+)").ok());

// ============ Session State ============

/// Short-term conversational context. Reset after an idle gap.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub current_topic: Option<String>,
    /// Most recent first, at most three entries.
    pub recent_topics: VecDeque<String>,
    pub follow_up_asked: bool,
    pub last_follow_up_at: Option<DateTime<Local>>,
    pub last_follow_up: Option<String>,
    pub last_response_at: Option<DateTime<Local>>,
    pub last_sentiment: SentimentLabel,
    pub consecutive_questions: u32,
    pub previous_input: String,
    pub turn_count: u32,
    pub break_offered: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            current_topic: None,
            recent_topics: VecDeque::new(),
            follow_up_asked: false,
            last_follow_up_at: None,
            last_follow_up: None,
            last_response_at: None,
            last_sentiment: SentimentLabel::Neutral,
            consecutive_questions: 0,
            previous_input: String::new(),
            turn_count: 0,
            break_offered: false,
        }
    }
}

impl ConversationState {
    /// Forget the running conversation but keep the idle clock.
    pub fn reset(&mut self) {
        let last_response_at = self.last_response_at;
        *self = Self::default();
        self.last_response_at = last_response_at;
    }

    /// Move the current topic to the front of the recent ring.
    fn remember_current_topic(&mut self) {
        if let Some(topic) = self.current_topic.clone() {
            self.recent_topics.retain(|t| *t != topic);
            self.recent_topics.push_front(topic);
            self.recent_topics.truncate(RECENT_TOPIC_RING);
        }
    }
}

/// Everything one chat session owns.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub profile: UserProfile,
    pub conversation: ConversationState,
    pub picker: PhrasePicker,
}

impl SessionState {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            profile: UserProfile::new(),
            conversation: ConversationState::default(),
            picker: PhrasePicker::new(seed),
        }
    }
}

// ============ Text Heuristics ============

/// Ends with '?' or opens with a question word.
pub fn is_question(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.ends_with('?')
        || QUESTION_WORDS
            .iter()
            .any(|w| lower.starts_with(&format!("{} ", w)))
}

fn is_greeting(lower: &str) -> bool {
    lower.contains("hello")
        || contains_word(lower, "hi")
        || contains_word(lower, "hey")
        || lower.contains("greetings")
}

fn is_farewell(lower: &str) -> bool {
    lower.contains("goodbye")
        || contains_word(lower, "bye")
        || lower.contains("see you")
        || lower.contains("farewell")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pull a name out of "my name is X" / "I'm X" / "I am X".
pub fn extract_name(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let caps = NAME_PATTERN.as_ref()?.captures(&lower)?;
    let lead = caps.get(1)?.as_str();
    let word = caps.get(2)?.as_str();

    let explicit = lead == "my name is";
    if !explicit {
        let looks_like_state = NOT_A_NAME.contains(&word)
            || word.ends_with("ing")
            || sentiment::classify(word) != SentimentLabel::Neutral;
        if looks_like_state {
            return None;
        }
    }
    if word.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(capitalize(word))
}

/// Pull an interest out of "interested in X" / "like to know about X".
pub fn extract_interest(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let caps = INTEREST_PATTERN.as_ref()?.captures(&lower)?;
    caps.get(1).map(|m| m.as_str().to_string())
}

// ============ Response Composer ============

/// Unvalidated configs can carry out-of-range timers; those use the default.
fn timer(secs: i64, default_secs: i64) -> Duration {
    let secs = if (0..=MAX_TIMER_SECS).contains(&secs) { secs } else { default_secs };
    Duration::seconds(secs)
}

#[derive(Debug, Clone)]
pub struct ResponseComposer {
    idle_reset: Duration,
    follow_up_debounce: Duration,
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new(&CyberGuardConfig::default())
    }
}

impl ResponseComposer {
    pub fn new(config: &CyberGuardConfig) -> Self {
        let defaults = CyberGuardConfig::default();
        Self {
            idle_reset: timer(config.idle_reset_secs, defaults.idle_reset_secs),
            follow_up_debounce: timer(config.follow_up_debounce_secs, defaults.follow_up_debounce_secs),
        }
    }

    pub fn respond(&self, session: &mut SessionState, input: &str) -> String {
        self.respond_at(session, input, Local::now())
    }

    /// Compose the reply to one message at wall-clock time `now`.
    pub fn respond_at(&self, session: &mut SessionState, input: &str, now: DateTime<Local>) -> String {
        let lower = input.trim().to_lowercase();

        self.check_idle_reset(session, now);
        session.conversation.remember_current_topic();

        if is_greeting(&lower) {
            return self.personalized_greeting(session, now);
        }
        if is_farewell(&lower) {
            return self.personalized_farewell(session, now);
        }
        self.extract_facts(session, input);

        let sentiment = sentiment::classify(input);
        session.profile.record_sentiment(sentiment);
        session.conversation.last_sentiment = sentiment;

        let asked = is_question(input);
        if asked {
            session.conversation.consecutive_questions += 1;
        } else {
            session.conversation.consecutive_questions = 0;
        }

        if (lower == "yes" || lower == "no") && session.conversation.current_topic.is_some() {
            let topic = session.conversation.current_topic.clone().unwrap_or_default();
            session.conversation.follow_up_asked = false;
            session.conversation.previous_input = input.to_string();
            return if lower == "yes" {
                phrases::next_step_accepted(&topic)
            } else {
                phrases::NEXT_STEP_DECLINED.to_string()
            };
        }

        let base = knowledge::respond(input);
        if base == knowledge::FALLBACK || base == knowledge::EMPTY_INPUT {
            let reply = self.unrecognized(session, sentiment, now);
            session.conversation.previous_input = input.to_string();
            return reply;
        }

        let mut body = base.to_string();
        if let Some(topic) = knowledge::detect_topic(input) {
            let previous = session.conversation.recent_topics.front().cloned();
            if previous.as_deref() == Some(topic) {
                return format!(
                    "We just talked about {}. Is there something specific you'd like to dive deeper into?",
                    topic
                );
            }

            if let Some(prev) = previous.as_deref() {
                session.profile.record_topic_time_spent_at(prev, now);
            }

            session.conversation.current_topic = Some(topic.to_string());
            session.profile.record_topic_discussed_at(topic, now);
            if asked {
                session.profile.record_topic_question_at(topic, now);
            }
            if sentiment == SentimentLabel::Positive {
                session.profile.record_positive_interaction_at(topic, now);
            }
            logging::log_memory(
                Some(&session.id),
                &format!("Topic '{}' recorded (question: {}, sentiment: {})", topic, asked, sentiment.as_str()),
            );

            if previous.is_some() {
                let transition = phrases::for_topic(phrases::TOPIC_TRANSITIONS, topic)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Let's talk a bit more about {}.", topic));
                body = format!("{} {}", transition, body);
            }
        }

        let adjusted = self.adjust_for_sentiment(session, &body, sentiment, now);
        let reply = self.append_follow_up(session, adjusted, sentiment, now);
        session.conversation.previous_input = input.to_string();
        reply
    }

    /// "We've covered ..." summary of discussed topics.
    pub fn learning_progress(&self, session: &mut SessionState) -> String {
        let topics = session.profile.discussed_topics();
        if topics.is_empty() {
            return "We're just getting started! What cybersecurity topic interests you most?".to_string();
        }
        let covered = topics.join(", ");
        let cheer = session.picker.phrase(phrases::ENCOURAGEMENT_PHRASES);
        format!("Great job! We've covered: {}. {}", covered, cheer)
    }

    fn check_idle_reset(&self, session: &mut SessionState, now: DateTime<Local>) {
        let conversation = &mut session.conversation;
        if let Some(last) = conversation.last_response_at {
            if now - last > self.idle_reset {
                conversation.reset();
                logging::log_conversation(Some(&session.id), "Idle gap exceeded, conversation context reset");
            }
        }
        session.conversation.last_response_at = Some(now);
    }

    fn extract_facts(&self, session: &mut SessionState, input: &str) {
        if let Some(name) = extract_name(input) {
            logging::log_memory(Some(&session.id), &format!("Learned name: {}", name));
            session.profile.store_fact("name", &name);
        }
        if let Some(interest) = extract_interest(input) {
            logging::log_memory(Some(&session.id), &format!("Learned interest: {}", interest));
            session.profile.store_fact("interest", &interest);
        }
    }

    // ----- Greetings -----

    fn personalized_greeting(&self, session: &mut SessionState, now: DateTime<Local>) -> String {
        let profile = &session.profile;
        let favorite = profile.favorite_topic_at(now);
        let returning = profile.discussed_topics().len() > 2;
        let strong = favorite
            .as_deref()
            .map(|t| profile.has_strong_interest(t))
            .unwrap_or(false);

        let options: Vec<String> = match favorite.as_deref() {
            Some(topic) if returning && strong => phrases::GREETINGS_TOPIC_EXPERT
                .iter()
                .map(|g| g.replace("{topic}", topic))
                .collect(),
            _ if returning => phrases::GREETINGS_RETURNING
                .iter()
                .filter_map(|g| match (&favorite, g.contains("{topic}")) {
                    (Some(topic), true) => Some(g.replace("{topic}", topic)),
                    (None, true) => None,
                    (_, false) => Some(g.to_string()),
                })
                .collect(),
            _ => phrases::GREETINGS_FIRST_TIME.iter().map(|g| g.to_string()).collect(),
        };

        let greeting = session.picker.pick(&options).cloned().unwrap_or_default();
        match session.profile.name() {
            Some(name) => {
                let rest = greeting.split_once(' ').map(|(_, rest)| rest).unwrap_or(&greeting);
                format!("Hi {}! {}", name, rest)
            }
            None => greeting,
        }
    }

    fn personalized_farewell(&self, session: &mut SessionState, now: DateTime<Local>) -> String {
        let mut options: Vec<String> = phrases::FAREWELLS.iter().map(|f| f.to_string()).collect();
        if let Some(topic) = session.profile.favorite_topic_at(now) {
            options.push(format!(
                "Goodbye! Keep exploring {} - you're really getting good at it!",
                topic
            ));
        }

        let farewell = session.picker.pick(&options).cloned().unwrap_or_default();
        match session.profile.name() {
            Some(name) => farewell.replacen('!', &format!(", {}!", name), 1),
            None => farewell,
        }
    }

    // ----- Sentiment shaping -----

    fn adjust_for_sentiment(
        &self,
        session: &mut SessionState,
        body: &str,
        sentiment: SentimentLabel,
        now: DateTime<Local>,
    ) -> String {
        let just_said_yes = contains_word(&session.conversation.previous_input.to_lowercase(), "yes");
        let mut out = String::new();

        if matches!(sentiment, SentimentLabel::Confused | SentimentLabel::Frustrated) {
            out.push_str(session.picker.phrase(phrases::SUPPORTIVE_PHRASES));
            out.push(' ');
        }

        if !just_said_yes {
            out.push_str(&self.personalized_prefix(session, sentiment, now));
        }

        if let Some(connector) = self.conversation_connector(session) {
            out.push_str(connector);
            out.push(' ');
        }

        out.push_str(&self.modify_for_sentiment(session, body, sentiment));

        let encouragement = match sentiment {
            SentimentLabel::Positive => Some(session.picker.phrase(phrases::ENCOURAGEMENT_PHRASES)),
            other => phrases::encouragement_for(other),
        };
        if let Some(line) = encouragement {
            out.push(' ');
            out.push_str(line);
        }

        if let Some(nudge) = self.flow_nudge(session) {
            out.push(' ');
            out.push_str(nudge);
        }

        out
    }

    fn personalized_prefix(&self, session: &mut SessionState, sentiment: SentimentLabel, now: DateTime<Local>) -> String {
        let favorite = session.profile.favorite_topic_at(now);
        let returning = session.profile.discussed_topics().len() > 3;
        let strong = favorite
            .as_deref()
            .map(|t| session.profile.has_strong_interest(t))
            .unwrap_or(false);

        let acknowledgment: Option<String> = match sentiment {
            SentimentLabel::Positive if strong => favorite
                .as_deref()
                .map(|t| format!("I love your enthusiasm for {}!", t)),
            SentimentLabel::Positive if returning => {
                Some("Great to see your continued interest in cybersecurity!".to_string())
            }
            SentimentLabel::Frustrated if session.conversation.consecutive_questions > 2 => {
                Some("I can see you're working through a lot of security concerns.".to_string())
            }
            SentimentLabel::Frustrated => Some(session.picker.phrase(phrases::EMPATHY_PHRASES).to_string()),
            SentimentLabel::Anxious => Some("Take a deep breath - we'll work through this together.".to_string()),
            SentimentLabel::Confused if returning => {
                Some("Let me try a different approach to explain this.".to_string())
            }
            SentimentLabel::Confused => Some("No worries - let me break this down step by step.".to_string()),
            _ => None,
        };

        match (session.profile.name(), acknowledgment) {
            (Some(name), Some(ack)) => format!("{}, {} ", name, ack),
            (Some(name), None) => format!("{}, ", name),
            (None, Some(ack)) => format!("{} ", ack),
            (None, None) => String::new(),
        }
    }

    fn conversation_connector(&self, session: &mut SessionState) -> Option<&'static str> {
        let conversation = &session.conversation;
        let current = conversation.current_topic.as_ref()?;
        if conversation.recent_topics.contains(current) {
            Some(session.picker.phrase(phrases::CONNECTORS_CONTINUATION))
        } else if !conversation.recent_topics.is_empty() {
            Some(session.picker.phrase(phrases::CONNECTORS_TOPIC_SWITCH))
        } else {
            None
        }
    }

    fn modify_for_sentiment(&self, session: &mut SessionState, body: &str, sentiment: SentimentLabel) -> String {
        let topic = session.conversation.current_topic.clone().unwrap_or_default();
        match sentiment {
            SentimentLabel::Confused => {
                if let Some(pool) = phrases::for_topic(phrases::SIMPLIFIED_EXPLANATIONS, &topic) {
                    return session.picker.phrase(pool).to_string();
                }
                body.replace("It's important", "The key thing to remember is")
                    .replace("You should", "I'd recommend")
            }
            SentimentLabel::Frustrated => {
                body.replace("Here's what you need to know", "Here's a quick solution")
            }
            SentimentLabel::Anxious => {
                body.replace("This is a serious threat", "While this is something to be aware of")
            }
            SentimentLabel::Positive if body.chars().count() < POSITIVE_DETAIL_MAX_CHARS => {
                match phrases::for_topic(phrases::ADDITIONAL_INFO, &topic) {
                    Some(extra) => format!("{} {}", body, extra),
                    None => body.to_string(),
                }
            }
            _ => body.to_string(),
        }
    }

    fn flow_nudge(&self, session: &mut SessionState) -> Option<&'static str> {
        let conversation = &mut session.conversation;
        conversation.turn_count += 1;

        if conversation.turn_count > BREAK_OFFER_AFTER_TURNS && !conversation.break_offered {
            conversation.break_offered = true;
            return Some("We've covered a lot! Would you like to take a break, or shall we continue with another topic?");
        }
        if conversation.consecutive_questions > SUMMARY_OFFER_AFTER_QUESTIONS {
            return Some("You're asking lots of great questions! Would you like me to summarize what we've discussed so far?");
        }
        None
    }

    // ----- Follow-ups -----

    fn append_follow_up(
        &self,
        session: &mut SessionState,
        reply: String,
        sentiment: SentimentLabel,
        now: DateTime<Local>,
    ) -> String {
        let conversation = &session.conversation;
        if conversation.follow_up_asked {
            if let Some(at) = conversation.last_follow_up_at {
                if now - at < self.follow_up_debounce {
                    return reply;
                }
            }
        }

        let topic = session.conversation.current_topic.clone();
        let last = session.conversation.last_follow_up.clone();
        let pool: &[&str] = topic
            .as_deref()
            .and_then(|t| phrases::for_topic(phrases::FOLLOW_UP_QUESTIONS, t))
            .unwrap_or_else(|| phrases::generic_follow_ups(sentiment));

        let fresh: Vec<&str> = pool
            .iter()
            .copied()
            .filter(|q| last.as_deref() != Some(*q))
            .collect();
        let candidates: &[&str] = if fresh.is_empty() { pool } else { &fresh };
        let question = session.picker.phrase(candidates);
        if question.is_empty() {
            return reply;
        }

        let has_topic_pool = topic
            .as_deref()
            .map(|t| phrases::for_topic(phrases::FOLLOW_UP_QUESTIONS, t).is_some())
            .unwrap_or(false);
        let follow_up = if has_topic_pool {
            self.soften_question(session, question, sentiment)
        } else {
            question.to_string()
        };

        let conversation = &mut session.conversation;
        conversation.follow_up_asked = true;
        conversation.last_follow_up_at = Some(now);
        conversation.last_follow_up = Some(question.to_string());

        let joiner = session.picker.phrase(phrases::FOLLOW_UP_JOINERS);
        format!("{}{}{}", reply, joiner, follow_up)
    }

    fn soften_question(&self, session: &mut SessionState, question: &str, sentiment: SentimentLabel) -> String {
        let starter = session.picker.phrase(phrases::follow_up_starters(sentiment));
        let lowered = question.to_lowercase();
        let use_name = session.picker.one_in(3);
        match session.profile.name() {
            Some(name) if use_name => format!("{}{}, {}", starter, name, lowered),
            _ => format!("{}{}", starter, lowered),
        }
    }

    // ----- Unrecognized input -----

    fn unrecognized(&self, session: &mut SessionState, sentiment: SentimentLabel, now: DateTime<Local>) -> String {
        if sentiment == SentimentLabel::Confused {
            if let Some(help) = self.contextual_help(session) {
                return help;
            }
        }

        let opener = session.picker.phrase(phrases::unrecognized_openers(sentiment));
        let mut reply = match session.profile.name() {
            Some(name) => format!("{}, {}", name, opener.to_lowercase()),
            None => opener.to_string(),
        };

        match session.profile.favorite_topic_at(now) {
            Some(topic) => reply.push_str(&format!(" Would you like to continue learning about {}?", topic)),
            None => reply.push_str(" What would you like to know about?"),
        }
        reply
    }

    /// Plain-language definition of the current topic for a confused user.
    fn contextual_help(&self, session: &mut SessionState) -> Option<String> {
        match session.conversation.current_topic.clone() {
            None => {
                let help = session.picker.phrase(phrases::QUICK_HELP);
                let example = session.picker.phrase(phrases::QUICK_HELP_EXAMPLES);
                Some(format!("{} {}", help, example))
            }
            Some(topic) => {
                let definition = phrases::for_topic(phrases::TOPIC_DEFINITIONS, &topic)?;
                let support = session.picker.phrase(phrases::SUPPORTIVE_PHRASES);
                Some(format!("{} Let me explain {} simply: {}", support, topic, definition))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionState {
        SessionState::new(Some(11))
    }

    #[test]
    fn out_of_range_timers_use_defaults() {
        let config = CyberGuardConfig {
            idle_reset_secs: i64::MAX,
            follow_up_debounce_secs: -5,
            ..CyberGuardConfig::default()
        };
        let composer = ResponseComposer::new(&config);
        assert_eq!(composer.idle_reset, Duration::seconds(300));
        assert_eq!(composer.follow_up_debounce, Duration::seconds(30));

        let config = CyberGuardConfig { idle_reset_secs: 60, ..CyberGuardConfig::default() };
        assert_eq!(ResponseComposer::new(&config).idle_reset, Duration::seconds(60));
    }

    #[test]
    fn question_heuristic() {
        assert!(is_question("What is a VPN"));
        assert!(is_question("tell me about vpns?"));
        assert!(is_question("  does 2fa help "));
        assert!(!is_question("whatever works"));
        assert!(!is_question("tell me about firewalls"));
    }

    #[test]
    fn name_extraction_skips_states() {
        assert_eq!(extract_name("My name is alice"), Some("Alice".to_string()));
        assert_eq!(extract_name("Hi, I'm Bob"), Some("Bob".to_string()));
        assert_eq!(extract_name("I am worried about hackers"), None);
        assert_eq!(extract_name("i'm not sure"), None);
        assert_eq!(extract_name("I am looking for tips"), None);
        assert_eq!(extract_interest("I'm interested in encryption"), Some("encryption".to_string()));
    }

    #[test]
    fn greetings_and_farewells_do_not_learn_facts() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let reply = composer.respond(&mut s, "Hi, I'm Bob");
        assert_eq!(s.profile.name(), None);
        assert!(phrases::GREETINGS_FIRST_TIME.contains(&reply.as_str()));

        composer.respond(&mut s, "bye, I'm interested in malware");
        assert_eq!(s.profile.get_fact("interest"), None);

        composer.respond(&mut s, "I'm Bob");
        assert_eq!(s.profile.name(), Some("Bob"));
        assert!(composer.respond(&mut s, "Hello").starts_with("Hi Bob! "));
    }

    #[test]
    fn first_greeting_is_first_time_variant() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let reply = composer.respond(&mut s, "Hi");
        assert!(phrases::GREETINGS_FIRST_TIME.contains(&reply.as_str()));
    }

    #[test]
    fn greeting_uses_name_when_known() {
        let composer = ResponseComposer::default();
        let mut s = session();
        s.profile.store_fact("name", "Alex");
        let reply = composer.respond(&mut s, "hello");
        assert!(reply.starts_with("Hi Alex! "));
    }

    #[test]
    fn farewell_inserts_name_once() {
        let composer = ResponseComposer::default();
        let mut s = session();
        s.profile.store_fact("name", "Alex");
        let reply = composer.respond(&mut s, "see you later");
        assert_eq!(reply.matches("Alex").count(), 1);
        assert!(reply.contains(", Alex!"));
    }

    #[test]
    fn knowledge_answer_records_topic() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let reply = composer.respond(&mut s, "What is phishing?");
        assert!(reply.contains("Phishing is a cyber attack"));
        assert_eq!(s.conversation.current_topic.as_deref(), Some("phishing"));
        let data = s.profile.engagement("phishing").unwrap();
        assert_eq!(data.discussion_count, 1);
        assert_eq!(data.questions_asked, 1);
        assert!(s.conversation.follow_up_asked);
    }

    #[test]
    fn same_topic_twice_short_circuits() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let now = Local::now();
        composer.respond_at(&mut s, "tell me about phishing", now);
        let reply = composer.respond_at(&mut s, "more about phishing", now + Duration::seconds(5));
        assert_eq!(
            reply,
            "We just talked about phishing. Is there something specific you'd like to dive deeper into?"
        );
    }

    #[test]
    fn topic_change_prepends_transition() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let now = Local::now();
        composer.respond_at(&mut s, "tell me about phishing", now);
        let reply = composer.respond_at(&mut s, "tell me about ransomware", now + Duration::seconds(5));
        assert!(reply.contains("The best defense against ransomware is having regular, secure backups"));
        assert_eq!(s.conversation.recent_topics.front().map(String::as_str), Some("phishing"));
    }

    #[test]
    fn follow_up_is_debounced() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let now = Local::now();
        composer.respond_at(&mut s, "tell me about phishing", now);
        let first_at = s.conversation.last_follow_up_at;
        composer.respond_at(&mut s, "tell me about malware", now + Duration::seconds(10));
        assert_eq!(s.conversation.last_follow_up_at, first_at);
        composer.respond_at(&mut s, "what about ransomware", now + Duration::seconds(45));
        assert_eq!(s.conversation.last_follow_up_at, Some(now + Duration::seconds(45)));
    }

    #[test]
    fn yes_after_topic_gives_next_step() {
        let composer = ResponseComposer::default();
        let mut s = session();
        composer.respond(&mut s, "tell me about phishing");
        let reply = composer.respond(&mut s, "yes");
        assert!(reply.starts_with("Great! Here are key warning signs"));
        assert!(!s.conversation.follow_up_asked);
        assert_eq!(composer.respond(&mut s, "no"), phrases::NEXT_STEP_DECLINED);
    }

    #[test]
    fn yes_without_topic_is_not_next_step() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let reply = composer.respond(&mut s, "yes");
        assert!(reply.ends_with("What would you like to know about?"));
    }

    #[test]
    fn idle_gap_resets_conversation() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let now = Local::now();
        composer.respond_at(&mut s, "tell me about phishing", now);
        // after six idle minutes the same topic is explained again
        let reply = composer.respond_at(&mut s, "tell me about phishing", now + Duration::minutes(6));
        assert!(reply.contains("Phishing is a cyber attack"));
    }

    #[test]
    fn unrecognized_mentions_name_and_favorite() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let now = Local::now();
        s.profile.store_fact("name", "Kim");
        s.profile.record_topic_discussed_at("vpn", now);
        let reply = composer.respond_at(&mut s, "qwerty zxcv", now);
        assert!(reply.starts_with("Kim, "));
        assert!(reply.ends_with("Would you like to continue learning about vpn?"));
    }

    #[test]
    fn anxious_user_gets_reassurance() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let reply = composer.respond(&mut s, "I'm worried about ransomware");
        assert!(reply.starts_with("Take a deep breath - we'll work through this together."));
        assert!(reply.contains("Remember, you're taking the right steps by learning about this."));
    }

    #[test]
    fn confused_user_gets_simplified_explanation() {
        let composer = ResponseComposer::default();
        let mut s = session();
        let reply = composer.respond(&mut s, "I'm confused about malware");
        let pool = phrases::for_topic(phrases::SIMPLIFIED_EXPLANATIONS, "malware").unwrap();
        assert!(pool.iter().any(|p| reply.contains(p)));
    }

    #[test]
    fn learning_progress_lists_topics() {
        let composer = ResponseComposer::default();
        let mut s = session();
        assert!(composer.learning_progress(&mut s).starts_with("We're just getting started!"));
        composer.respond(&mut s, "tell me about phishing");
        assert!(composer.learning_progress(&mut s).starts_with("Great job! We've covered: phishing."));
    }
}
