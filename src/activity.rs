//! Append-only chat and activity history.
//!
//! Both logs are capped (oldest entries drop first) and guarded by a single
//! mutex, so one `ActivityLog` can be shared between sessions behind an `Arc`.
//! Nothing is persisted; `export_json` is the only way out.

use crate::error::Result;
use crate::router::ChatResponseType;
use crate::tasks::{describe_offset, Task};
use chrono::{DateTime, Datelike, Local, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub const DEFAULT_DISPLAY_COUNT: usize = 10;
const ANONYMOUS: &str = "Anonymous";

const IMPORTANT_KEYWORDS: &[&str] = &[
    "password", "security", "firewall", "backup", "malware", "virus", "phishing", "encryption",
    "2fa", "two-factor", "vpn", "antivirus", "audit", "compliance", "task", "reminder", "due",
    "priority", "urgent", "complete", "deadline", "quiz", "question", "answer", "score", "test",
    "learning",
];

// ============ Entries ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivityType {
    ChatInteraction,
    TaskManagement,
    QuizActivity,
    SystemAction,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::ChatInteraction => "chat_interaction",
            ActivityType::TaskManagement => "task_management",
            ActivityType::QuizActivity => "quiz_activity",
            ActivityType::SystemAction => "system_action",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityType::TaskManagement => "📋",
            ActivityType::QuizActivity => "🎯",
            ActivityType::ChatInteraction => "💬",
            ActivityType::SystemAction => "⚙️",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub id: String,
    pub timestamp: DateTime<Local>,
    pub user_name: String,
    pub user_input: String,
    pub bot_response: String,
    pub response_type: ChatResponseType,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Local>,
    pub activity_type: ActivityType,
    pub description: String,
    pub user_name: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityStatistics {
    pub total_activities: usize,
    pub total_chat_interactions: usize,
    pub tasks_created: usize,
    pub quizzes_taken: usize,
    pub most_active_day: Option<Weekday>,
    pub last_activity: Option<DateTime<Local>>,
    pub top_keywords: Vec<String>,
    pub activity_by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Default)]
struct LogState {
    chats: VecDeque<ChatEntry>,
    activities: VecDeque<ActivityEntry>,
}

// ============ Activity Log ============

pub type SharedActivityLog = Arc<ActivityLog>;

#[derive(Debug)]
pub struct ActivityLog {
    state: Mutex<LogState>,
    max_chat_entries: usize,
    max_activity_entries: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(500, 1000)
    }
}

impl ActivityLog {
    pub fn new(max_chat_entries: usize, max_activity_entries: usize) -> Self {
        Self {
            state: Mutex::new(LogState::default()),
            max_chat_entries: max_chat_entries.max(1),
            max_activity_entries: max_activity_entries.max(1),
        }
    }

    pub fn shared(max_chat_entries: usize, max_activity_entries: usize) -> SharedActivityLog {
        Arc::new(Self::new(max_chat_entries, max_activity_entries))
    }

    // History is best-effort; a panic elsewhere must not lose it.
    fn state(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ----- Recording -----

    /// Store one chat turn and a matching `ChatInteraction` activity.
    pub fn log_chat_interaction(
        &self,
        user_input: &str,
        bot_response: &str,
        response_type: ChatResponseType,
        user_name: Option<&str>,
    ) {
        let user = user_name.unwrap_or(ANONYMOUS).to_string();
        let entry = ChatEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Local::now(),
            user_name: user.clone(),
            user_input: user_input.trim().to_string(),
            bot_response: bot_response.trim().to_string(),
            response_type,
            keywords: extract_keywords(user_input),
        };

        {
            let mut state = self.state();
            state.chats.push_back(entry);
            while state.chats.len() > self.max_chat_entries {
                state.chats.pop_front();
            }
        }

        self.log_activity(
            ActivityType::ChatInteraction,
            &format!("Chat: {}", truncate(user_input, 50)),
            Some(&user),
            BTreeMap::new(),
        );
    }

    pub fn log_activity(
        &self,
        activity_type: ActivityType,
        description: &str,
        user_name: Option<&str>,
        metadata: BTreeMap<String, String>,
    ) {
        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Local::now(),
            activity_type,
            description: description.to_string(),
            user_name: user_name.unwrap_or(ANONYMOUS).to_string(),
            metadata,
        };

        let mut state = self.state();
        state.activities.push_back(entry);
        while state.activities.len() > self.max_activity_entries {
            state.activities.pop_front();
        }
    }

    pub fn log_task_activity(&self, task: &Task, action: &str, user_name: Option<&str>) {
        let mut metadata = BTreeMap::new();
        metadata.insert("TaskId".to_string(), task.id.clone());
        metadata.insert("TaskTitle".to_string(), task.title.clone());
        metadata.insert("TaskPriority".to_string(), task.priority.as_str().to_string());
        metadata.insert("TaskCategory".to_string(), task.category.clone());
        metadata.insert("Action".to_string(), action.to_string());
        if let Some(offset) = task.reminder_offset() {
            metadata.insert("ReminderTime".to_string(), format!("{} before due", describe_offset(offset)));
        }

        self.log_activity(
            ActivityType::TaskManagement,
            &format!("Task {}: {}", action, task.title),
            user_name,
            metadata,
        );
    }

    pub fn log_quiz_activity(&self, action: &str, details: Option<&str>, user_name: Option<&str>) {
        let details = details.unwrap_or("");
        let mut metadata = BTreeMap::new();
        metadata.insert("Action".to_string(), action.to_string());
        metadata.insert("Details".to_string(), details.to_string());

        let description = if details.is_empty() {
            format!("Quiz {}", action)
        } else {
            format!("Quiz {}: {}", action, details)
        };
        self.log_activity(ActivityType::QuizActivity, &description, user_name, metadata);
    }

    pub fn log_system_action(&self, description: &str, user_name: Option<&str>) {
        self.log_activity(ActivityType::SystemAction, description, user_name, BTreeMap::new());
    }

    // ----- Queries -----

    /// Newest first, optionally for one user (case-insensitive).
    pub fn chat_history(&self, count: usize, user_name: Option<&str>) -> Vec<ChatEntry> {
        self.state()
            .chats
            .iter()
            .rev()
            .filter(|c| user_name.map_or(true, |u| c.user_name.eq_ignore_ascii_case(u)))
            .take(count)
            .cloned()
            .collect()
    }

    /// Newest first, optionally filtered by type and user.
    pub fn activities(
        &self,
        count: usize,
        activity_type: Option<ActivityType>,
        user_name: Option<&str>,
    ) -> Vec<ActivityEntry> {
        self.state()
            .activities
            .iter()
            .rev()
            .filter(|a| activity_type.map_or(true, |t| a.activity_type == t))
            .filter(|a| user_name.map_or(true, |u| a.user_name.eq_ignore_ascii_case(u)))
            .take(count)
            .cloned()
            .collect()
    }

    pub fn chat_count(&self) -> usize {
        self.state().chats.len()
    }

    pub fn activity_count(&self) -> usize {
        self.state().activities.len()
    }

    // ----- Formatting -----

    pub fn formatted_chat_history(&self, count: usize) -> String {
        self.formatted_chat_history_at(count, Local::now())
    }

    pub fn formatted_chat_history_at(&self, count: usize, now: DateTime<Local>) -> String {
        let entries = self.chat_history(count, None);
        if entries.is_empty() {
            return "📝 No chat history available.".to_string();
        }

        let mut out = format!("💬 CHAT HISTORY (Last {} interactions):\n\n", entries.len());
        for entry in entries.iter().rev() {
            out.push_str(&format!("🕒 {}\n", relative_time(entry.timestamp, now)));
            out.push_str(&format!("👤 You: {}\n", truncate(&entry.user_input, 80)));
            out.push_str(&format!("{} Bot: {}\n", entry.response_type.icon(), truncate(&entry.bot_response, 80)));
            if !entry.keywords.is_empty() {
                let shown: Vec<&str> = entry.keywords.iter().take(3).map(String::as_str).collect();
                out.push_str(&format!("🏷️ Keywords: {}\n", shown.join(", ")));
            }
            out.push('\n');
        }
        out
    }

    pub fn formatted_activity_log(&self, count: usize) -> String {
        self.formatted_activity_log_at(count, Local::now())
    }

    pub fn formatted_activity_log_at(&self, count: usize, now: DateTime<Local>) -> String {
        let entries = self.activities(count, None, None);
        if entries.is_empty() {
            return "📊 No activity recorded.".to_string();
        }

        let mut out = format!("📊 ACTIVITY LOG (Last {} activities):\n\n", entries.len());
        for entry in entries.iter().rev() {
            out.push_str(&format!(
                "{} {} - {}\n",
                entry.activity_type.icon(),
                relative_time(entry.timestamp, now),
                entry.description
            ));
            match entry.activity_type {
                ActivityType::TaskManagement => {
                    if let Some(priority) = entry.metadata.get("TaskPriority") {
                        out.push_str(&format!("   🔥 Priority: {}\n", priority));
                    }
                }
                ActivityType::QuizActivity => {
                    if let Some(details) = entry.metadata.get("Details").filter(|d| !d.is_empty()) {
                        out.push_str(&format!("   📋 {}\n", details));
                    }
                }
                _ => {}
            }
            out.push('\n');
        }
        out
    }

    /// Numbered one-liners, newest first. Chat turns are left out.
    pub fn concise_summary(&self, count: usize) -> String {
        let entries: Vec<ActivityEntry> = self
            .state()
            .activities
            .iter()
            .rev()
            .filter(|a| a.activity_type != ActivityType::ChatInteraction)
            .take(count)
            .cloned()
            .collect();
        if entries.is_empty() {
            return "No recent activities found.".to_string();
        }

        let mut out = String::from("Here’s a summary of recent actions:\n");
        for (i, entry) in entries.iter().enumerate() {
            let line = match entry.activity_type {
                ActivityType::TaskManagement => {
                    let title = entry.metadata.get("TaskTitle").map(String::as_str).unwrap_or("Unnamed task");
                    let verb = match entry.metadata.get("Action").map(String::as_str) {
                        Some("created") | None => "added".to_string(),
                        Some(other) => other.to_string(),
                    };
                    let mut line = format!("Task {}: '{}'", verb, title);
                    if let Some(reminder) = entry.metadata.get("ReminderTime") {
                        line.push_str(&format!(" (Reminder set for {})", reminder));
                    }
                    line
                }
                ActivityType::QuizActivity => {
                    let action = entry.metadata.get("Action").map(String::as_str).unwrap_or("quiz");
                    let mut line = format!("Quiz {}", action.to_lowercase());
                    if let Some(details) = entry.metadata.get("Details").filter(|d| !d.is_empty()) {
                        line.push_str(&format!(" - {}", details));
                    }
                    line
                }
                ActivityType::SystemAction => format!("System event: {}", entry.description),
                ActivityType::ChatInteraction => entry.description.clone(),
            };
            out.push_str(&format!("{}. {}\n", i + 1, line));
        }
        out
    }

    // ----- Analysis -----

    pub fn statistics(&self, user_name: Option<&str>) -> ActivityStatistics {
        let state = self.state();
        let matches_user = |name: &str| user_name.map_or(true, |u| name.eq_ignore_ascii_case(u));
        let activities: Vec<&ActivityEntry> = state.activities.iter().filter(|a| matches_user(&a.user_name)).collect();
        let chats: Vec<&ChatEntry> = state.chats.iter().filter(|c| matches_user(&c.user_name)).collect();

        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_day: HashMap<Weekday, usize> = HashMap::new();
        for activity in &activities {
            *by_type.entry(activity.activity_type.as_str().to_string()).or_insert(0) += 1;
            *by_day.entry(activity.timestamp.weekday()).or_insert(0) += 1;
        }
        let most_active_day = by_day
            .into_iter()
            .max_by_key(|(day, count)| (*count, std::cmp::Reverse(day.num_days_from_monday())))
            .map(|(day, _)| day);

        ActivityStatistics {
            total_activities: activities.len(),
            total_chat_interactions: chats.len(),
            tasks_created: activities
                .iter()
                .filter(|a| a.activity_type == ActivityType::TaskManagement && action_contains(a, "created"))
                .count(),
            quizzes_taken: activities
                .iter()
                .filter(|a| a.activity_type == ActivityType::QuizActivity && action_contains(a, "started"))
                .count(),
            most_active_day,
            last_activity: activities.last().map(|a| a.timestamp),
            top_keywords: rank_keywords(chats.iter().copied(), 5),
            activity_by_type: by_type,
        }
    }

    /// Most frequent chat keywords.
    pub fn conversation_topics(&self, count: usize) -> Vec<String> {
        let state = self.state();
        rank_keywords(state.chats.iter(), count)
    }

    /// Case-insensitive match on input, response or keywords; newest first.
    pub fn search_chat_history(&self, term: &str, max_results: usize) -> Vec<ChatEntry> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        self.state()
            .chats
            .iter()
            .rev()
            .filter(|c| {
                c.user_input.to_lowercase().contains(&term)
                    || c.bot_response.to_lowercase().contains(&term)
                    || c.keywords.iter().any(|k| k.contains(&term))
            })
            .take(max_results)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.chats.clear();
        state.activities.clear();
    }

    /// Both logs as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Export<'a> {
            chat_history: Vec<&'a ChatEntry>,
            activities: Vec<&'a ActivityEntry>,
        }

        let state = self.state();
        let export = Export {
            chat_history: state.chats.iter().collect(),
            activities: state.activities.iter().collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

// ============ Helpers ============

/// Known security/task/quiz words in the input, deduplicated, in order.
pub fn extract_keywords(input: &str) -> Vec<String> {
    let lower = input.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for word in lower.split(|c: char| matches!(c, ' ' | ',' | '.' | '!' | '?')) {
        if word.chars().count() > 2 && IMPORTANT_KEYWORDS.contains(&word) && !found.iter().any(|f| f == word) {
            found.push(word.to_string());
        }
    }
    found
}

fn action_contains(entry: &ActivityEntry, word: &str) -> bool {
    entry.metadata.get("Action").map_or(false, |action| action.contains(word))
}

fn rank_keywords<'a>(chats: impl Iterator<Item = &'a ChatEntry>, count: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for chat in chats {
        for keyword in &chat.keywords {
            *counts.entry(keyword.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // stable: equal counts stay alphabetical
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(count).map(|(k, _)| k.to_string()).collect()
}

/// Shorten to `max` characters, ending in "..." when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn relative_time(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let diff = now - timestamp;
    if diff.num_minutes() < 1 {
        "Just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 7 {
        format!("{}d ago", diff.num_days())
    } else {
        timestamp.format("%b %d, %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskManager, TaskPriority};
    use chrono::Duration;

    #[test]
    fn keywords_are_filtered_and_deduplicated() {
        assert_eq!(
            extract_keywords("Is my password safe? My PASSWORD, and a vpn!"),
            vec!["password", "vpn"]
        );
        assert!(extract_keywords("hello there").is_empty());
    }

    #[test]
    fn truncation_and_relative_times() {
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");

        let now = Local::now();
        assert_eq!(relative_time(now, now), "Just now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2d ago");
        let old = now - Duration::days(30);
        assert_eq!(relative_time(old, now), old.format("%b %d, %H:%M").to_string());
    }

    #[test]
    fn chat_log_caps_and_orders_newest_first() {
        let log = ActivityLog::new(3, 100);
        for i in 0..5 {
            log.log_chat_interaction(&format!("msg {}", i), "ok", ChatResponseType::Regular, None);
        }
        let history = log.chat_history(10, None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].user_input, "msg 4");
        assert_eq!(history[2].user_input, "msg 2");
        assert_eq!(history[0].user_name, "Anonymous");
        // every chat turn also lands in the activity log
        assert_eq!(log.activity_count(), 5);
    }

    #[test]
    fn formatted_history_shows_icons_and_keywords() {
        let log = ActivityLog::default();
        assert_eq!(log.formatted_chat_history(10), "📝 No chat history available.");
        log.log_chat_interaction("start quiz", "Question 1 ...", ChatResponseType::Quiz, Some("Ann"));
        let text = log.formatted_chat_history(10);
        assert!(text.starts_with("💬 CHAT HISTORY (Last 1 interactions):"));
        assert!(text.contains("👤 You: start quiz"));
        assert!(text.contains("🎯 Bot: Question 1 ..."));
        assert!(text.contains("🏷️ Keywords: quiz"));
    }

    #[test]
    fn summary_describes_tasks_quizzes_and_system_events() {
        let log = ActivityLog::default();
        assert_eq!(log.concise_summary(10), "No recent activities found.");

        let mut manager = TaskManager::new();
        let task = manager
            .add_task("Enable 2FA", "", Local::now(), TaskPriority::High, "Security", Some(Duration::days(2)))
            .unwrap();
        log.log_task_activity(&task, "created", Some("Ann"));
        log.log_quiz_activity("Completed", Some("Score: 8/10"), Some("Ann"));
        log.log_system_action("User signed in", Some("Ann"));
        log.log_chat_interaction("hi", "hello", ChatResponseType::Regular, Some("Ann"));

        let summary = log.concise_summary(10);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Here’s a summary of recent actions:");
        assert_eq!(lines[1], "1. System event: User signed in");
        assert_eq!(lines[2], "2. Quiz completed - Score: 8/10");
        assert_eq!(lines[3], "3. Task added: 'Enable 2FA' (Reminder set for 2 days before due)");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn activity_log_format_includes_details() {
        let log = ActivityLog::default();
        assert_eq!(log.formatted_activity_log(10), "📊 No activity recorded.");
        let mut manager = TaskManager::new();
        let task = manager
            .add_task("Audit", "", Local::now(), TaskPriority::Critical, "Cybersecurity", None)
            .unwrap();
        log.log_task_activity(&task, "created", None);
        log.log_quiz_activity("started", Some("10 questions"), None);
        let text = log.formatted_activity_log(10);
        assert!(text.starts_with("📊 ACTIVITY LOG (Last 2 activities):"));
        assert!(text.contains("📋 Just now - Task created: Audit\n   🔥 Priority: Critical"));
        assert!(text.contains("🎯 Just now - Quiz started: 10 questions\n   📋 10 questions"));
    }

    #[test]
    fn statistics_search_and_export() {
        let log = ActivityLog::default();
        log.log_chat_interaction("what is a vpn", "A VPN ...", ChatResponseType::Regular, Some("Ann"));
        log.log_chat_interaction("vpn and password tips", "Use ...", ChatResponseType::Regular, Some("Bob"));
        log.log_quiz_activity("started", None, Some("Ann"));

        let stats = log.statistics(None);
        assert_eq!(stats.total_chat_interactions, 2);
        assert_eq!(stats.quizzes_taken, 1);
        assert_eq!(stats.top_keywords, vec!["vpn", "password"]);
        assert_eq!(stats.activity_by_type.get("chat_interaction"), Some(&2));
        assert!(stats.most_active_day.is_some());

        assert_eq!(log.statistics(Some("bob")).total_chat_interactions, 1);
        assert_eq!(log.conversation_topics(1), vec!["vpn"]);
        assert_eq!(log.search_chat_history("PASSWORD", 10).len(), 1);
        assert!(log.search_chat_history("  ", 10).is_empty());

        let json = log.export_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["chat_history"].as_array().map(Vec::len), Some(2));

        log.clear();
        assert_eq!(log.chat_count(), 0);
    }
}
