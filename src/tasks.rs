//! In-memory task list with due dates and reminders.
//!
//! Mutating calls queue `TaskEvent`s in an outbox that the router drains
//! after each turn. Reminder scanning is separate: `due_reminders_at` hands
//! back `ReminderDue` events directly, and `spawn_reminder_ticker` runs that
//! scan on a tokio interval for front-ends that want push notifications.

use crate::error::{CoreError, Result};
use crate::logging;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Days ahead that still count as "upcoming".
const UPCOMING_WINDOW_DAYS: i64 = 3;

// ============ Task Model ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Critical => "Critical",
        }
    }

    pub fn from_str(s: &str) -> Option<TaskPriority> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "critical" => Some(TaskPriority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Local>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: String,
    /// Minutes before `due_date` at which the reminder fires.
    pub reminder_minutes: Option<i64>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Local>,
}

impl Task {
    pub fn reminder_offset(&self) -> Option<Duration> {
        self.reminder_minutes.and_then(Duration::try_minutes)
    }

    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    pub fn is_overdue_at(&self, now: DateTime<Local>) -> bool {
        self.is_open() && self.due_date < now
    }

    pub fn is_upcoming_at(&self, now: DateTime<Local>) -> bool {
        let window_end = Duration::try_days(UPCOMING_WINDOW_DAYS).and_then(|d| now.checked_add_signed(d));
        self.is_open() && self.due_date > now && window_end.map_or(true, |end| self.due_date <= end)
    }

    /// Instant the reminder should fire, if one is set.
    pub fn reminder_at(&self) -> Option<DateTime<Local>> {
        self.reminder_offset()
            .and_then(|offset| self.due_date.checked_sub_signed(offset))
    }

    pub fn reminder_message(&self) -> String {
        format!("Reminder: {} is due {}", self.title, self.due_date.format("%b %d, %Y %H:%M"))
    }
}

/// Human form of a reminder offset: "2 days", "1 hour", "30 minutes".
pub fn describe_offset(offset: Duration) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };
    let minutes = offset.num_minutes();
    if minutes > 0 && minutes % (24 * 60) == 0 {
        plural(minutes / (24 * 60), "day")
    } else if minutes > 0 && minutes % 60 == 0 {
        plural(minutes / 60, "hour")
    } else {
        plural(minutes, "minute")
    }
}

// ============ Events ============

#[derive(Debug, Clone)]
pub enum TaskEvent {
    Added(Task),
    Updated(Task),
    Completed(Task),
    ReminderDue { task: Task, message: String },
}

// ============ Cybersecurity Templates ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CybersecurityTaskType {
    PasswordUpdate,
    SoftwareUpdate,
    BackupVerification,
    SecurityAudit,
    TwoFactorSetup,
}

impl CybersecurityTaskType {
    pub const ALL: [CybersecurityTaskType; 5] = [
        CybersecurityTaskType::PasswordUpdate,
        CybersecurityTaskType::SoftwareUpdate,
        CybersecurityTaskType::BackupVerification,
        CybersecurityTaskType::SecurityAudit,
        CybersecurityTaskType::TwoFactorSetup,
    ];

    /// Title, description and priority of the template.
    pub fn template(&self) -> (&'static str, &'static str, TaskPriority) {
        match self {
            CybersecurityTaskType::PasswordUpdate => (
                "Update Passwords",
                "Review and update all critical passwords. Use strong, unique passwords for each account.",
                TaskPriority::High,
            ),
            CybersecurityTaskType::SoftwareUpdate => (
                "Software Security Update",
                "Check for and install critical security updates for all systems and applications.",
                TaskPriority::High,
            ),
            CybersecurityTaskType::BackupVerification => (
                "Backup Verification",
                "Verify that all critical data backups are working correctly and test restore procedures.",
                TaskPriority::Medium,
            ),
            CybersecurityTaskType::SecurityAudit => (
                "Security Audit",
                "Conduct comprehensive security audit of systems, networks, and access controls.",
                TaskPriority::Critical,
            ),
            CybersecurityTaskType::TwoFactorSetup => (
                "Two-Factor Authentication Setup",
                "Enable two-factor authentication on all critical accounts and services.",
                TaskPriority::High,
            ),
        }
    }
}

// ============ Task Manager ============

pub type SharedTaskManager = Arc<Mutex<TaskManager>>;

#[derive(Debug, Default)]
pub struct TaskManager {
    tasks: Vec<Task>,
    outbox: Vec<TaskEvent>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTaskManager {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        due_date: DateTime<Local>,
        priority: TaskPriority,
        category: &str,
        reminder: Option<Duration>,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("Task title cannot be empty.".into()));
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.trim().to_string(),
            due_date,
            priority,
            status: TaskStatus::Pending,
            category: if category.trim().is_empty() { "General".into() } else { category.trim().to_string() },
            reminder_minutes: reminder.map(|d| d.num_minutes()),
            reminder_sent: false,
            created_at: Local::now(),
        };

        logging::log_task(None, &format!("Added task '{}' due {}", task.title, task.due_date.format("%Y-%m-%d %H:%M")));
        self.tasks.push(task.clone());
        self.outbox.push(TaskEvent::Added(task.clone()));
        Ok(task)
    }

    pub fn update_task_status(&mut self, task_id: &str, status: TaskStatus) -> Result<Task> {
        let task = self.task_mut(task_id)?;
        task.status = status;
        let task = task.clone();

        logging::log_task(None, &format!("Task '{}' is now {}", task.title, status.as_str()));
        if status == TaskStatus::Completed {
            self.outbox.push(TaskEvent::Completed(task.clone()));
        }
        self.outbox.push(TaskEvent::Updated(task.clone()));
        Ok(task)
    }

    /// Set or replace the reminder offset. A replaced reminder may fire again.
    pub fn update_task_reminder(&mut self, task_id: &str, offset: Duration) -> Result<Task> {
        let task = self.task_mut(task_id)?;
        task.reminder_minutes = Some(offset.num_minutes());
        task.reminder_sent = false;
        let task = task.clone();

        logging::log_task(None, &format!("Reminder for '{}' set {} before due", task.title, describe_offset(offset)));
        self.outbox.push(TaskEvent::Updated(task.clone()));
        Ok(task)
    }

    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        let removed = self.tasks.len() < before;
        if removed {
            logging::log_task(None, &format!("Deleted task {}", task_id));
        }
        removed
    }

    pub fn add_cybersecurity_task(
        &mut self,
        kind: CybersecurityTaskType,
        due_date: DateTime<Local>,
        notes: &str,
    ) -> Result<Task> {
        let (title, description, priority) = kind.template();
        let description = if notes.trim().is_empty() {
            description.to_string()
        } else {
            format!("{}\n{}", description, notes.trim())
        };
        self.add_task(title, &description, due_date, priority, "Cybersecurity", Some(Duration::hours(1)))
    }

    // ----- Queries -----

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.status == status).cloned().collect()
    }

    /// Open tasks of one priority, soonest first.
    pub fn tasks_by_priority(&self, priority: TaskPriority) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.priority == priority && t.is_open())
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.due_date);
        tasks
    }

    pub fn overdue_tasks_at(&self, now: DateTime<Local>) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_overdue_at(now)).cloned().collect()
    }

    pub fn upcoming_tasks_at(&self, now: DateTime<Local>) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_upcoming_at(now)).cloned().collect()
    }

    /// First task whose title occurs, case-insensitively, inside `text`.
    pub fn find_by_title_in(&self, text: &str) -> Option<&Task> {
        let lower = text.to_lowercase();
        self.tasks
            .iter()
            .find(|t| !t.title.is_empty() && lower.contains(&t.title.to_lowercase()))
    }

    pub fn first_pending(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.status == TaskStatus::Pending)
    }

    // ----- Reminders -----

    /// Reminders whose fire time lies in `[now - 1 min, now]`. Each task fires
    /// at most once per reminder setting.
    pub fn due_reminders_at(&mut self, now: DateTime<Local>) -> Vec<TaskEvent> {
        let window_start = now - Duration::minutes(1);
        let mut due = Vec::new();
        for task in self.tasks.iter_mut() {
            if !task.is_open() || task.reminder_sent {
                continue;
            }
            let Some(fire_at) = task.reminder_at() else { continue };
            if fire_at >= window_start && fire_at <= now {
                task.reminder_sent = true;
                let message = task.reminder_message();
                logging::log_task(None, &message);
                due.push(TaskEvent::ReminderDue { task: task.clone(), message });
            }
        }
        due
    }

    pub fn drain_events(&mut self) -> Vec<TaskEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))
    }
}

/// Scan for due reminders every `period` and forward them over a channel.
/// The task ends when the receiver is dropped.
pub fn spawn_reminder_ticker(
    manager: SharedTaskManager,
    period: std::time::Duration,
) -> (JoinHandle<()>, mpsc::UnboundedReceiver<TaskEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;

            let due = match manager.lock() {
                Ok(mut tasks) => tasks.due_reminders_at(Local::now()),
                Err(_) => {
                    logging::log_error(None, "Task list lock poisoned, stopping reminder ticker");
                    return;
                }
            };

            for event in due {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    });

    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(manager: &mut TaskManager, title: &str, due: DateTime<Local>) -> Task {
        manager
            .add_task(title, "", due, TaskPriority::Medium, "General", None)
            .unwrap()
    }

    #[test]
    fn add_emits_event_and_rejects_blank_title() {
        let mut manager = TaskManager::new();
        let task = add(&mut manager, "Review privacy settings", Local::now());
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(matches!(manager.drain_events().as_slice(), [TaskEvent::Added(t)] if t.id == task.id));
        assert!(manager.drain_events().is_empty());

        let err = manager
            .add_task("  ", "", Local::now(), TaskPriority::Low, "General", None)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn completing_a_task_emits_completed_then_updated() {
        let mut manager = TaskManager::new();
        let task = add(&mut manager, "Backup", Local::now());
        manager.drain_events();
        manager.update_task_status(&task.id, TaskStatus::Completed).unwrap();
        let events = manager.drain_events();
        assert!(matches!(events.as_slice(), [TaskEvent::Completed(_), TaskEvent::Updated(_)]));
    }

    #[test]
    fn unknown_id_is_task_not_found() {
        let mut manager = TaskManager::new();
        let err = manager.update_task_reminder("nope", Duration::hours(1)).unwrap_err();
        assert_eq!(err.to_string(), "Task with ID nope not found.");
        assert!(!manager.delete_task("nope"));
    }

    #[test]
    fn queries_filter_and_sort() {
        let now = Local::now();
        let mut manager = TaskManager::new();
        let late = add(&mut manager, "Late", now - Duration::hours(2));
        add(&mut manager, "Soon", now + Duration::days(1));
        add(&mut manager, "Far", now + Duration::days(10));
        manager
            .add_task("Urgent later", "", now + Duration::days(2), TaskPriority::Critical, "General", None)
            .unwrap();
        manager
            .add_task("Urgent first", "", now + Duration::hours(1), TaskPriority::Critical, "General", None)
            .unwrap();

        assert_eq!(manager.overdue_tasks_at(now).len(), 1);
        let upcoming: Vec<String> = manager.upcoming_tasks_at(now).into_iter().map(|t| t.title).collect();
        assert_eq!(upcoming, vec!["Soon", "Urgent later", "Urgent first"]);
        let critical: Vec<String> = manager
            .tasks_by_priority(TaskPriority::Critical)
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(critical, vec!["Urgent first", "Urgent later"]);

        manager.update_task_status(&late.id, TaskStatus::Completed).unwrap();
        assert!(manager.overdue_tasks_at(now).is_empty());
        assert_eq!(manager.tasks_by_status(TaskStatus::Completed).len(), 1);
    }

    #[test]
    fn title_lookup_is_case_insensitive_substring() {
        let mut manager = TaskManager::new();
        add(&mut manager, "Update Passwords", Local::now());
        assert!(manager.find_by_title_in("mark update passwords as done").is_some());
        assert!(manager.find_by_title_in("delete the audit task").is_none());
    }

    #[test]
    fn cybersecurity_template_sets_category_and_reminder() {
        let mut manager = TaskManager::new();
        let task = manager
            .add_cybersecurity_task(CybersecurityTaskType::SecurityAudit, Local::now(), "")
            .unwrap();
        assert_eq!(task.title, "Security Audit");
        assert_eq!(task.priority, TaskPriority::Critical);
        assert_eq!(task.category, "Cybersecurity");
        assert_eq!(task.reminder_offset(), Some(Duration::hours(1)));
    }

    #[test]
    fn reminder_fires_once_inside_window() {
        let now = Local::now();
        let mut manager = TaskManager::new();
        let task = manager
            .add_task("Rotate keys", "", now + Duration::hours(1), TaskPriority::High, "Security", Some(Duration::hours(1)))
            .unwrap();

        assert!(manager.due_reminders_at(now - Duration::minutes(5)).is_empty());
        let due = manager.due_reminders_at(now + Duration::seconds(30));
        match due.as_slice() {
            [TaskEvent::ReminderDue { task: t, message }] => {
                assert_eq!(t.id, task.id);
                assert!(message.starts_with("Reminder: Rotate keys is due "));
            }
            other => panic!("unexpected events: {:?}", other),
        }
        assert!(manager.due_reminders_at(now + Duration::seconds(40)).is_empty());

        // resetting the offset re-arms it
        manager.update_task_reminder(&task.id, Duration::minutes(30)).unwrap();
        assert_eq!(manager.due_reminders_at(now + Duration::minutes(30)).len(), 1);
    }

    #[test]
    fn offsets_read_naturally() {
        assert_eq!(describe_offset(Duration::days(2)), "2 days");
        assert_eq!(describe_offset(Duration::hours(1)), "1 hour");
        assert_eq!(describe_offset(Duration::minutes(90)), "90 minutes");
    }

    #[tokio::test]
    async fn ticker_forwards_due_reminders() {
        let manager = TaskManager::shared();
        {
            let mut tasks = manager.lock().unwrap();
            tasks
                .add_task("Patch router", "", Local::now() + Duration::minutes(60), TaskPriority::High, "Maintenance", Some(Duration::minutes(60)))
                .unwrap();
        }

        let (handle, mut rx) = spawn_reminder_ticker(manager.clone(), std::time::Duration::from_millis(10));
        let event = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, TaskEvent::ReminderDue { .. }));

        drop(rx);
        handle.abort();
    }
}
