//! Structured logging module for CyberGuard
//!
//! Writes logs to `<log dir>/cyberguard-YYYY-MM-DD.log` with categories:
//! - ROUTING: Which intent handler answered a message
//! - TASK: Task creation, updates and reminders
//! - QUIZ: Quiz lifecycle and answers
//! - MEMORY: Facts and topics learned about the user
//! - CONVERSATION: Session lifecycle (start, idle reset, exit)
//! - ERROR: Errors surfaced to the user
//!
//! Until `init_logging` runs, lines only go to the console.

use chrono::{Local, Utc};
use once_cell::sync::Lazy;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Log categories for structured logging
#[derive(Debug, Clone, Copy)]
pub enum LogCategory {
    Routing,      // Intent dispatch decisions
    Task,         // Task manager activity
    Quiz,         // Quiz sessions
    Memory,       // Profile facts and topic engagement
    Conversation, // Session lifecycle
    Error,        // Errors
}

impl LogCategory {
    fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Routing => "ROUTING",
            LogCategory::Task => "TASK",
            LogCategory::Quiz => "QUIZ",
            LogCategory::Memory => "MEMORY",
            LogCategory::Conversation => "CONVERSATION",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Active log directory, `None` until initialized
static LOG_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Whether log lines are echoed to stdout
static CONSOLE_ECHO: AtomicBool = AtomicBool::new(true);

/// Turn console echo on or off (the chat front-end owns stdout)
pub fn set_console_echo(enabled: bool) {
    CONSOLE_ECHO.store(enabled, Ordering::Relaxed);
}

/// Default log directory when none is configured
pub fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".cyberguard/logs")
}

fn log_file_path(dir: &Path) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("cyberguard-{}.log", today))
}

fn current_dir() -> Option<PathBuf> {
    LOG_DIR.lock().ok().and_then(|guard| guard.clone())
}

/// Initialize file logging - creates the log directory if needed
pub fn init_logging(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    if let Ok(mut guard) = LOG_DIR.lock() {
        *guard = Some(dir.to_path_buf());
    }

    log(LogCategory::Conversation, None, "CyberGuard logging initialized");

    Ok(())
}

/// Log a message with category and optional session context
pub fn log(category: LogCategory, session_id: Option<&str>, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let session_context = session_id
        .map(|id| format!("session={} | ", &id[..8.min(id.len())]))
        .unwrap_or_default();

    let log_line = format!(
        "[{}] [{}] {}{}\n",
        timestamp,
        category.as_str(),
        session_context,
        message
    );

    if CONSOLE_ECHO.load(Ordering::Relaxed) {
        print!("{}", log_line);
    }

    if let Some(dir) = current_dir() {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path(&dir))
        {
            let _ = file.write_all(log_line.as_bytes());
        }
    }
}

/// Log a routing decision (which handler, why)
pub fn log_routing(session_id: Option<&str>, message: &str) {
    log(LogCategory::Routing, session_id, message);
}

/// Log a task manager event
pub fn log_task(session_id: Option<&str>, message: &str) {
    log(LogCategory::Task, session_id, message);
}

/// Log a quiz event
pub fn log_quiz(session_id: Option<&str>, message: &str) {
    log(LogCategory::Quiz, session_id, message);
}

/// Log a memory event (fact learned, topic recorded)
pub fn log_memory(session_id: Option<&str>, message: &str) {
    log(LogCategory::Memory, session_id, message);
}

/// Log a conversation lifecycle event
pub fn log_conversation(session_id: Option<&str>, message: &str) {
    log(LogCategory::Conversation, session_id, message);
}

/// Log an error
pub fn log_error(session_id: Option<&str>, message: &str) {
    log(LogCategory::Error, session_id, message);
}

/// Clean up log files older than `retention_days`
pub fn cleanup_old_logs(retention_days: i64) -> Result<usize, Box<dyn std::error::Error>> {
    let log_dir = match current_dir() {
        Some(dir) => dir,
        None => return Ok(0),
    };
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days);

    for entry in fs::read_dir(&log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                let modified_time: chrono::DateTime<Utc> = modified.into();
                if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                    deleted += 1;
                }
            }
        }
    }

    Ok(deleted)
}
