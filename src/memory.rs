//! Per-session user memory
//!
//! This module handles:
//! - Free-form facts about the user (name, interests)
//! - Recency-ordered discussed topics and per-topic engagement statistics
//! - A short window of recent sentiment labels
//! - Deriving a "favorite topic" from weighted engagement
//!
//! Nothing here outlives the process.

use crate::sentiment::SentimentLabel;
use chrono::{DateTime, Duration, Local};
use std::collections::{BTreeMap, HashMap, VecDeque};

const MAX_DISCUSSED_TOPICS: usize = 20;
const SENTIMENT_WINDOW: usize = 5;

/// Candidate order used to break `dominant_sentiment` ties.
const SENTIMENT_ORDER: [SentimentLabel; 6] = [
    SentimentLabel::Positive,
    SentimentLabel::Negative,
    SentimentLabel::Neutral,
    SentimentLabel::Anxious,
    SentimentLabel::Confused,
    SentimentLabel::Frustrated,
];

// ============ Topic Engagement ============

#[derive(Debug, Clone)]
pub struct TopicEngagement {
    pub discussion_count: u32,
    pub positive_interactions: u32,
    pub questions_asked: u32,
    pub last_discussed_at: DateTime<Local>,
    pub total_time_spent: Duration,
    pub session_started_at: DateTime<Local>,
}

impl TopicEngagement {
    fn new(now: DateTime<Local>) -> Self {
        Self {
            discussion_count: 0,
            positive_interactions: 0,
            questions_asked: 0,
            last_discussed_at: now,
            total_time_spent: Duration::zero(),
            session_started_at: now,
        }
    }

    /// Weighted interest score used to rank topics.
    pub fn score_at(&self, now: DateTime<Local>) -> f64 {
        let days_since = (now - self.last_discussed_at).num_seconds() as f64 / 86_400.0;
        let recency_bonus = ((7.0 - days_since) / 7.0).max(0.0);
        let minutes = self.total_time_spent.num_seconds() as f64 / 60.0;
        let time_bonus = (minutes / 60.0).min(2.0) * 0.05;

        0.4 * self.discussion_count as f64
            + 0.3 * self.positive_interactions as f64
            + 0.2 * self.questions_asked as f64
            + 0.1 * recency_bonus
            + time_bonus
    }
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

// ============ User Profile ============

#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    facts: HashMap<String, String>,
    discussed_topics: Vec<String>,
    // BTreeMap keeps iteration lexical, which is the tie-break for rankings
    engagement: BTreeMap<String, TopicEngagement>,
    sentiment_history: VecDeque<SentimentLabel>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Facts -----

    /// Store a fact. Keys are case-insensitive; blank keys or values are ignored.
    pub fn store_fact(&mut self, key: &str, value: &str) {
        let Some(key) = normalize(key) else { return };
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.facts.insert(key, value.to_string());
    }

    pub fn get_fact(&self, key: &str) -> Option<&str> {
        let key = normalize(key)?;
        self.facts.get(&key).map(|v| v.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.get_fact("name")
    }

    // ----- Topics -----

    pub fn record_topic_discussed(&mut self, topic: &str) {
        self.record_topic_discussed_at(topic, Local::now());
    }

    /// Put the topic at the front of the recency list (unless already listed)
    /// and bump its discussion count.
    pub fn record_topic_discussed_at(&mut self, topic: &str, now: DateTime<Local>) {
        let Some(topic) = normalize(topic) else { return };

        if !self.discussed_topics.contains(&topic) {
            self.discussed_topics.insert(0, topic.clone());
            self.discussed_topics.truncate(MAX_DISCUSSED_TOPICS);
        }

        let entry = self
            .engagement
            .entry(topic)
            .or_insert_with(|| TopicEngagement::new(now));
        entry.discussion_count += 1;
        entry.last_discussed_at = now;
        entry.session_started_at = now;
    }

    pub fn record_topic_question(&mut self, topic: &str) {
        self.record_topic_question_at(topic, Local::now());
    }

    /// An unseen topic gets its engagement record stamped with `now`.
    pub fn record_topic_question_at(&mut self, topic: &str, now: DateTime<Local>) {
        if let Some(entry) = self.engagement_entry(topic, now) {
            entry.questions_asked += 1;
        }
    }

    pub fn record_positive_interaction(&mut self, topic: &str) {
        self.record_positive_interaction_at(topic, Local::now());
    }

    pub fn record_positive_interaction_at(&mut self, topic: &str, now: DateTime<Local>) {
        if let Some(entry) = self.engagement_entry(topic, now) {
            entry.positive_interactions += 1;
        }
    }

    pub fn record_topic_time_spent(&mut self, topic: &str) {
        self.record_topic_time_spent_at(topic, Local::now());
    }

    /// Add the time since the topic's session started to its running total.
    pub fn record_topic_time_spent_at(&mut self, topic: &str, now: DateTime<Local>) {
        let Some(topic) = normalize(topic) else { return };
        if let Some(entry) = self.engagement.get_mut(&topic) {
            let spent = now - entry.session_started_at;
            if spent > Duration::zero() {
                entry.total_time_spent = entry.total_time_spent + spent;
            }
        }
    }

    fn engagement_entry(&mut self, topic: &str, now: DateTime<Local>) -> Option<&mut TopicEngagement> {
        let topic = normalize(topic)?;
        Some(
            self.engagement
                .entry(topic)
                .or_insert_with(|| TopicEngagement::new(now)),
        )
    }

    pub fn engagement(&self, topic: &str) -> Option<&TopicEngagement> {
        let topic = normalize(topic)?;
        self.engagement.get(&topic)
    }

    /// Most recent first.
    pub fn discussed_topics(&self) -> &[String] {
        &self.discussed_topics
    }

    pub fn has_discussed_topic(&self, topic: &str) -> bool {
        normalize(topic)
            .map(|t| self.discussed_topics.contains(&t))
            .unwrap_or(false)
    }

    pub fn favorite_topic(&self) -> Option<String> {
        self.favorite_topic_at(Local::now())
    }

    /// Highest weighted score; ties go to the lexically first topic.
    pub fn favorite_topic_at(&self, now: DateTime<Local>) -> Option<String> {
        let mut best: Option<(&String, f64)> = None;
        for (topic, data) in &self.engagement {
            let score = data.score_at(now);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((topic, score)),
            }
        }
        best.map(|(topic, _)| topic.clone())
    }

    pub fn top_favorite_topics(&self, count: usize) -> Vec<String> {
        self.top_favorite_topics_at(count, Local::now())
    }

    pub fn top_favorite_topics_at(&self, count: usize, now: DateTime<Local>) -> Vec<String> {
        let mut scored: Vec<(&String, f64)> = self
            .engagement
            .iter()
            .map(|(topic, data)| (topic, data.score_at(now)))
            .collect();
        // stable sort keeps lexical order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(count)
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    pub fn most_discussed_topic(&self) -> Option<String> {
        let mut best: Option<(&String, u32)> = None;
        for (topic, data) in &self.engagement {
            match best {
                Some((_, count)) if data.discussion_count <= count => {}
                _ => best = Some((topic, data.discussion_count)),
            }
        }
        best.map(|(topic, _)| topic.clone())
    }

    pub fn has_strong_interest(&self, topic: &str) -> bool {
        self.engagement(topic)
            .map(|d| d.discussion_count >= 3 || d.questions_asked >= 2 || d.positive_interactions >= 3)
            .unwrap_or(false)
    }

    // ----- Sentiment -----

    pub fn record_sentiment(&mut self, label: SentimentLabel) {
        self.sentiment_history.push_back(label);
        while self.sentiment_history.len() > SENTIMENT_WINDOW {
            self.sentiment_history.pop_front();
        }
    }

    /// Most frequent label in the window; `Neutral` when empty.
    pub fn dominant_sentiment(&self) -> SentimentLabel {
        let mut best = SentimentLabel::Neutral;
        let mut best_count = 0;
        for label in SENTIMENT_ORDER {
            let count = self.sentiment_history.iter().filter(|l| **l == label).count();
            if count > best_count {
                best = label;
                best_count = count;
            }
        }
        best
    }

    pub fn recent_sentiment(&self) -> SentimentLabel {
        self.sentiment_history
            .back()
            .copied()
            .unwrap_or(SentimentLabel::Neutral)
    }

    pub fn sentiment_history(&self) -> impl Iterator<Item = &SentimentLabel> {
        self.sentiment_history.iter()
    }

    // ----- Quiz results -----

    pub fn record_quiz_result(&mut self, score: usize, total: usize, percentage: f64) {
        self.store_fact("last_quiz_score", &format!("{}/{}", score, total));
        self.store_fact("last_quiz_percentage", &format!("{:.0}", percentage));
    }

    // ----- Housekeeping -----

    pub fn clear(&mut self) {
        self.facts.clear();
        self.discussed_topics.clear();
        self.engagement.clear();
        self.sentiment_history.clear();
    }

    /// Flat key/value view of the profile, facts included.
    pub fn summary(&self) -> BTreeMap<String, String> {
        let mut summary: BTreeMap<String, String> = self
            .facts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        summary.insert("topics_discussed_count".into(), self.discussed_topics.len().to_string());
        summary.insert("dominant_sentiment".into(), self.dominant_sentiment().as_str().into());
        summary.insert("recent_sentiment".into(), self.recent_sentiment().as_str().into());

        if let Some(recent) = self.discussed_topics.first() {
            summary.insert("most_recent_topic".into(), recent.clone());
        }

        if let Some(favorite) = self.favorite_topic() {
            if let Some(data) = self.engagement.get(&favorite) {
                summary.insert("favorite_topic_discussions".into(), data.discussion_count.to_string());
            }
            summary.insert("favorite_topic".into(), favorite);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_are_case_insensitive_and_ignore_blanks() {
        let mut profile = UserProfile::new();
        profile.store_fact("Name", "Alice");
        assert_eq!(profile.get_fact("NAME"), Some("Alice"));
        profile.store_fact("  ", "x");
        profile.store_fact("interest", "   ");
        assert_eq!(profile.get_fact("interest"), None);
        assert_eq!(profile.get_fact(""), None);
    }

    #[test]
    fn favorite_topic_is_none_without_history() {
        assert_eq!(UserProfile::new().favorite_topic(), None);
    }

    #[test]
    fn favorite_topic_follows_weighted_score() {
        let now = Local::now();
        let mut profile = UserProfile::new();
        for _ in 0..5 {
            profile.record_topic_discussed_at("phishing", now);
        }
        profile.record_topic_discussed_at("malware", now);
        for _ in 0..3 {
            profile.record_positive_interaction("malware");
        }
        // phishing: 0.4*5 + 0.1 = 2.1, malware: 0.4 + 0.9 + 0.1 = 1.4
        assert_eq!(profile.favorite_topic_at(now), Some("phishing".to_string()));

        for _ in 0..4 {
            profile.record_topic_question("malware");
        }
        // malware: 1.4 + 0.8 = 2.2
        assert_eq!(profile.favorite_topic_at(now), Some("malware".to_string()));
    }

    #[test]
    fn favorite_topic_ties_break_lexically() {
        let now = Local::now();
        let mut profile = UserProfile::new();
        profile.record_topic_discussed_at("vpn", now);
        profile.record_topic_discussed_at("firewall", now);
        assert_eq!(profile.favorite_topic_at(now), Some("firewall".to_string()));
        assert_eq!(profile.top_favorite_topics_at(2, now), vec!["firewall", "vpn"]);
    }

    #[test]
    fn old_topics_lose_recency_bonus() {
        let now = Local::now();
        let mut profile = UserProfile::new();
        profile.record_topic_discussed_at("phishing", now - Duration::days(10));
        profile.record_topic_discussed_at("malware", now);
        assert_eq!(profile.favorite_topic_at(now), Some("malware".to_string()));
    }

    #[test]
    fn unseen_topic_records_take_the_supplied_time() {
        let then = Local::now() - Duration::days(30);
        let mut profile = UserProfile::new();
        profile.record_topic_question_at("Malware", then);
        profile.record_positive_interaction_at("backups", then);

        let malware = profile.engagement("malware").unwrap();
        assert_eq!(malware.questions_asked, 1);
        assert_eq!(malware.last_discussed_at, then);
        assert_eq!(malware.session_started_at, then);
        let backups = profile.engagement("backups").unwrap();
        assert_eq!(backups.positive_interactions, 1);
        assert_eq!(backups.last_discussed_at, then);
    }

    #[test]
    fn repeated_topic_is_listed_once_but_counted_twice() {
        let mut profile = UserProfile::new();
        profile.record_topic_discussed("phishing");
        profile.record_topic_discussed("Phishing ");
        assert_eq!(profile.discussed_topics(), &["phishing".to_string()]);
        assert_eq!(profile.engagement("phishing").unwrap().discussion_count, 2);
    }

    #[test]
    fn recency_list_is_capped_and_most_recent_first() {
        let mut profile = UserProfile::new();
        for i in 0..25 {
            profile.record_topic_discussed(&format!("topic{}", i));
        }
        assert_eq!(profile.discussed_topics().len(), MAX_DISCUSSED_TOPICS);
        assert_eq!(profile.discussed_topics()[0], "topic24");
        assert!(!profile.has_discussed_topic("topic0"));
        assert!(profile.has_discussed_topic("TOPIC5"));
    }

    #[test]
    fn strong_interest_thresholds() {
        let mut profile = UserProfile::new();
        assert!(!profile.has_strong_interest("vpn"));
        profile.record_topic_question("vpn");
        assert!(!profile.has_strong_interest("vpn"));
        profile.record_topic_question("vpn");
        assert!(profile.has_strong_interest("vpn"));

        for _ in 0..3 {
            profile.record_topic_discussed("2fa");
        }
        assert!(profile.has_strong_interest("2fa"));
    }

    #[test]
    fn sentiment_window_keeps_last_five() {
        let mut profile = UserProfile::new();
        assert_eq!(profile.dominant_sentiment(), SentimentLabel::Neutral);
        assert_eq!(profile.recent_sentiment(), SentimentLabel::Neutral);

        for _ in 0..3 {
            profile.record_sentiment(SentimentLabel::Anxious);
        }
        for _ in 0..3 {
            profile.record_sentiment(SentimentLabel::Positive);
        }
        // window: anxious x2, positive x3
        assert_eq!(profile.sentiment_history().count(), 5);
        assert_eq!(profile.dominant_sentiment(), SentimentLabel::Positive);
        assert_eq!(profile.recent_sentiment(), SentimentLabel::Positive);
    }

    #[test]
    fn dominant_sentiment_ties_use_fixed_order() {
        let mut profile = UserProfile::new();
        profile.record_sentiment(SentimentLabel::Frustrated);
        profile.record_sentiment(SentimentLabel::Negative);
        assert_eq!(profile.dominant_sentiment(), SentimentLabel::Negative);
    }

    #[test]
    fn time_spent_accumulates_from_session_start() {
        let start = Local::now();
        let mut profile = UserProfile::new();
        profile.record_topic_discussed_at("vpn", start);
        profile.record_topic_time_spent_at("vpn", start + Duration::minutes(30));
        let data = profile.engagement("vpn").unwrap();
        assert_eq!(data.total_time_spent, Duration::minutes(30));
    }

    #[test]
    fn summary_and_clear() {
        let mut profile = UserProfile::new();
        profile.store_fact("name", "Sam");
        profile.record_topic_discussed("phishing");
        let summary = profile.summary();
        assert_eq!(summary.get("name").map(String::as_str), Some("Sam"));
        assert_eq!(summary.get("favorite_topic").map(String::as_str), Some("phishing"));
        assert_eq!(summary.get("most_recent_topic").map(String::as_str), Some("phishing"));

        profile.clear();
        assert!(profile.discussed_topics().is_empty());
        assert_eq!(profile.name(), None);
        assert_eq!(profile.most_discussed_topic(), None);
    }
}
