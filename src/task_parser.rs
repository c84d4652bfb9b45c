//! Free-text task command parsing.
//!
//! Pure functions only: nothing here touches the task list. The router
//! decides what to do with the parsed result.

use crate::tasks::{CybersecurityTaskType, TaskPriority, TaskStatus};
use chrono::{DateTime, Duration, Local, Months, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// Words that end a title inside a creation command.
const TITLE_END: &str = r"(?:\s*,|\s+(?:by|due|priority|today|tomorrow|next\s+(?:week|month)|in\s+\d+|remind)\b|[.!]?\s*$)";

static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i)\b(?:create|add|new)\s+(?:a\s+)?task\s*[:\-]?\s*(.+?){}", TITLE_END),
        format!(r"(?i)\btask\s*[:\-]?\s*(.+?){}", TITLE_END),
        format!(r"(?i)\b(?:remind me to|need to|should)\s+(.+?){}", TITLE_END),
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static IN_N_UNITS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d+)\s+(day|week|month)s?\b").ok());
static EXPLICIT_DATE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b(?:by|due|on)\s+(\d{1,2})/(\d{1,2})/(\d{4})\b").ok());
static OFFSET_BEFORE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(hour|day)s?\s+before").ok());
static ACCEPT_OFFSET: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d+)\s*(minute|hour|day|week)s?\b").ok());

// ============ Command Detection ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Overdue,
    Upcoming,
    Completed,
    Pending,
    HighPriority,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCommand {
    Create,
    List(ListFilter),
    UpdateStatus(TaskStatus),
    Delete,
    Shortcut(CybersecurityTaskType),
}

const CREATE_TRIGGERS: &[&str] = &[
    "add task", "create task", "new task", "add a task", "create a task", "add a new task",
    "remind me to", "task:",
];
const STATUS_VERBS: &[&str] = &["mark", "complete", "finish", "start", "cancel", "reopen", "i finished", "i completed", "i started"];
const STATUS_PHRASES: &[&str] = &[" as done", " as complete", " as in progress", " as pending", " is done", " is complete"];
const LIST_TRIGGERS: &[&str] = &["show", "list", "view", "display", "what are", "see"];
const SHORTCUT_TRIGGERS: &[&str] = &["schedule", "plan", "set up a", "security task"];

/// Classify a message as a task command. Order: delete, explicit creation,
/// status update, listing, template shortcut, implicit creation.
pub fn detect_command(text: &str) -> Option<TaskCommand> {
    let lower = text.trim().to_lowercase();
    let mentions_task = lower.contains("task");

    if mentions_task && (lower.contains("delete") || lower.contains("remove")) {
        return Some(TaskCommand::Delete);
    }
    if CREATE_TRIGGERS.iter().any(|t| lower.starts_with(t)) {
        return Some(TaskCommand::Create);
    }
    let status_update = STATUS_VERBS.iter().any(|v| lower.starts_with(v))
        || STATUS_PHRASES.iter().any(|p| lower.contains(p));
    if mentions_task && status_update {
        return Some(TaskCommand::UpdateStatus(parse_status(&lower)));
    }
    if (mentions_task && LIST_TRIGGERS.iter().any(|t| lower.contains(t))) || lower == "tasks" || lower == "my tasks" {
        return Some(TaskCommand::List(parse_list_filter(&lower)));
    }
    if SHORTCUT_TRIGGERS.iter().any(|t| lower.contains(t)) {
        if let Some(kind) = parse_shortcut(&lower) {
            return Some(TaskCommand::Shortcut(kind));
        }
    }
    if CREATE_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Some(TaskCommand::Create);
    }
    None
}

fn parse_status(lower: &str) -> TaskStatus {
    if lower.contains("cancel") {
        TaskStatus::Cancelled
    } else if lower.contains("in progress") || lower.contains("start") {
        TaskStatus::InProgress
    } else if lower.contains("pending") || lower.contains("reopen") {
        TaskStatus::Pending
    } else {
        TaskStatus::Completed
    }
}

pub fn parse_list_filter(lower: &str) -> ListFilter {
    if lower.contains("overdue") {
        ListFilter::Overdue
    } else if lower.contains("upcoming") {
        ListFilter::Upcoming
    } else if lower.contains("completed") {
        ListFilter::Completed
    } else if lower.contains("pending") {
        ListFilter::Pending
    } else if lower.contains("high priority") || lower.contains("urgent") {
        ListFilter::HighPriority
    } else if lower.contains("critical") {
        ListFilter::Critical
    } else {
        ListFilter::All
    }
}

fn parse_shortcut(lower: &str) -> Option<CybersecurityTaskType> {
    if lower.contains("password") {
        Some(CybersecurityTaskType::PasswordUpdate)
    } else if lower.contains("software update") || lower.contains("security update") {
        Some(CybersecurityTaskType::SoftwareUpdate)
    } else if lower.contains("backup") {
        Some(CybersecurityTaskType::BackupVerification)
    } else if lower.contains("audit") {
        Some(CybersecurityTaskType::SecurityAudit)
    } else if lower.contains("two-factor") || lower.contains("2fa") {
        Some(CybersecurityTaskType::TwoFactorSetup)
    } else {
        None
    }
}

// ============ Field Extraction ============

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Local>,
    pub priority: TaskPriority,
    pub category: String,
    pub reminder: Option<Duration>,
}

/// Parse a creation command. `None` when no title can be found.
pub fn parse_task(text: &str, now: DateTime<Local>) -> Option<ParsedTask> {
    let title = extract_title(text);
    if title.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    Some(ParsedTask {
        description: describe(&title),
        due_date: parse_due_date(&lower, now),
        priority: parse_priority(&lower),
        category: parse_category(&lower).to_string(),
        reminder: parse_reminder_offset(&lower),
        title,
    })
}

/// Task title from the first matching pattern, or empty.
pub fn extract_title(text: &str) -> String {
    TITLE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text.trim()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches(['.', '!', ',']).trim().to_string())
        .unwrap_or_default()
}

/// Canned description keyed on the title's subject.
pub fn describe(title: &str) -> String {
    let lower = title.to_lowercase();
    let canned = if lower.contains("password") {
        "Review and update your passwords. Use strong, unique passwords for each account and consider a password manager."
    } else if lower.contains("privacy") {
        "Review the privacy settings on your accounts and limit what personal information is shared publicly."
    } else if lower.contains("backup") {
        "Back up your important files and confirm that the backups can actually be restored."
    } else if lower.contains("update") {
        "Install the latest security updates for your operating system and applications."
    } else if lower.contains("2fa") || lower.contains("two-factor") {
        "Enable two-factor authentication on your important accounts."
    } else if lower.contains("antivirus") || lower.contains("scan") {
        "Run a full antivirus scan and make sure your virus definitions are current."
    } else {
        return format!("Task: {}. Be sure to complete it on time.", title);
    };
    canned.to_string()
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(23, 59, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

/// Due date from relative words, "in N units" or an explicit MM/DD/YYYY.
/// Defaults to this time tomorrow.
pub fn parse_due_date(lower: &str, now: DateTime<Local>) -> DateTime<Local> {
    let tomorrow = shift(now, Duration::try_days(1)).unwrap_or(now);

    if lower.contains("today") {
        return end_of_day(now.date_naive()).unwrap_or(now);
    }
    if lower.contains("tomorrow") {
        return tomorrow;
    }
    if lower.contains("next week") {
        return shift(now, Duration::try_weeks(1)).unwrap_or(tomorrow);
    }
    if lower.contains("next month") {
        return now.checked_add_months(Months::new(1)).unwrap_or(tomorrow);
    }

    if let Some(caps) = IN_N_UNITS.as_ref().and_then(|re| re.captures(lower)) {
        // Out-of-range amounts fall through to the default
        let due = match &caps[2] {
            "day" => caps[1].parse().ok().and_then(|n| shift(now, Duration::try_days(n))),
            "week" => caps[1].parse().ok().and_then(|n| shift(now, Duration::try_weeks(n))),
            _ => caps[1].parse().ok().and_then(|n| now.checked_add_months(Months::new(n))),
        };
        if let Some(due) = due {
            return due;
        }
    }

    if let Some(caps) = EXPLICIT_DATE.as_ref().and_then(|re| re.captures(lower)) {
        let month = caps[1].parse().unwrap_or(0);
        let day = caps[2].parse().unwrap_or(0);
        let year = caps[3].parse().unwrap_or(0);
        if let Some(due) = NaiveDate::from_ymd_opt(year, month, day).and_then(end_of_day) {
            return due;
        }
    }

    tomorrow
}

fn shift(now: DateTime<Local>, offset: Option<Duration>) -> Option<DateTime<Local>> {
    now.checked_add_signed(offset?)
}

pub fn parse_priority(lower: &str) -> TaskPriority {
    if lower.contains("critical") || lower.contains("urgent") {
        TaskPriority::Critical
    } else if lower.contains("high priority") || lower.contains("important") {
        TaskPriority::High
    } else if lower.contains("low priority") {
        TaskPriority::Low
    } else {
        TaskPriority::Medium
    }
}

pub fn parse_category(lower: &str) -> &'static str {
    if lower.contains("security") || lower.contains("cyber") {
        "Cybersecurity"
    } else if lower.contains("password") {
        "Security"
    } else if lower.contains("backup") {
        "Data Management"
    } else if lower.contains("update") {
        "Maintenance"
    } else {
        "General"
    }
}

/// "N hours/days before", only when the text asks for a reminder.
pub fn parse_reminder_offset(lower: &str) -> Option<Duration> {
    if !lower.contains("remind me") {
        return None;
    }
    let parsed = OFFSET_BEFORE.as_ref().and_then(|re| re.captures(lower)).and_then(|caps| {
        let n: i64 = caps[1].parse().ok()?;
        if &caps[2] == "day" {
            Duration::try_days(n)
        } else {
            Duration::try_hours(n)
        }
    });
    Some(parsed.unwrap_or_else(|| Duration::hours(1)))
}

// ============ Reminder Confirmation ============

/// Reply to "would you like a reminder?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAnswer {
    Accept(Duration),
    /// Agreed, but no usable time given.
    AcceptWithoutTime,
    Decline,
    Unclear,
}

pub fn parse_reminder_answer(text: &str) -> ReminderAnswer {
    let lower = text.trim().to_lowercase();

    let declined = lower == "no" || lower.starts_with("no ") || lower.starts_with("no,")
        || lower.contains("no thanks") || lower.contains("don't need") || lower.contains("dont need");
    if declined {
        return ReminderAnswer::Decline;
    }

    let accepted = lower == "yes" || lower.starts_with("yes") || lower.contains("remind me")
        || lower.contains("in ") || lower.contains("reminder") || lower.contains("tomorrow")
        || lower.contains("today");
    if !accepted {
        return ReminderAnswer::Unclear;
    }

    match parse_acceptance_offset(&lower) {
        Some(offset) => ReminderAnswer::Accept(offset),
        None => ReminderAnswer::AcceptWithoutTime,
    }
}

fn parse_acceptance_offset(lower: &str) -> Option<Duration> {
    if let Some(caps) = ACCEPT_OFFSET.as_ref().and_then(|re| re.captures(lower)) {
        let n: i64 = caps[1].parse().ok()?;
        return match &caps[2] {
            "minute" => Duration::try_minutes(n),
            "hour" => Duration::try_hours(n),
            "week" => Duration::try_weeks(n),
            _ => Duration::try_days(n),
        };
    }
    if lower.contains("tomorrow") {
        return Some(Duration::days(1));
    }
    if lower.contains("today") {
        return Some(Duration::hours(1));
    }
    None
}
