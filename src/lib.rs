pub mod activity;
pub mod composer;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod memory;
pub mod phrases;
pub mod quiz;
pub mod router;
pub mod sentiment;
pub mod task_parser;
pub mod tasks;

pub use activity::{ActivityLog, ActivityType, SharedActivityLog};
pub use composer::{ResponseComposer, SessionState};
pub use config::CyberGuardConfig;
pub use error::{CoreError, Result};
pub use router::{ChatEvent, ChatResponse, ChatResponseType, IntentRouter};
pub use sentiment::SentimentLabel;
pub use tasks::{SharedTaskManager, Task, TaskManager, TaskPriority, TaskStatus};

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_CONFIG_FILE: &str = "cyberguard.json";
const LOG_RETENTION_DAYS: i64 = 7;

// ============ App Initialization ============

/// Load configuration (path from the first CLI argument) and set up file logging.
fn init_app() -> CyberGuardConfig {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let config = match CyberGuardConfig::load_from_path(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring {}: {}", path.display(), e);
            CyberGuardConfig::default()
        }
    };

    // The chat owns stdout; log lines go to file only
    logging::set_console_echo(false);
    let log_dir = config.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    if let Err(e) = logging::init_logging(&log_dir) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    let _ = logging::cleanup_old_logs(LOG_RETENTION_DAYS);

    logging::log_conversation(None, "App initialized");
    config
}

// ============ Console Chat ============

fn print_response(response: &ChatResponse) {
    println!("{} {}\n", response.response_type.icon(), response.message);
}

fn prompt(label: &str) {
    print!("{}", label);
    let _ = std::io::stdout().flush();
}

async fn chat_loop(config: CyberGuardConfig) -> Result<()> {
    let task_manager = TaskManager::shared();
    let activity = ActivityLog::shared(config.max_chat_entries, config.max_activity_entries);
    let (ticker, mut reminders) = tasks::spawn_reminder_ticker(
        Arc::clone(&task_manager),
        std::time::Duration::from_secs(config.reminder_poll_secs),
    );
    let mut router = IntentRouter::with_shared(config, task_manager, activity);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", router.initial_welcome());
    loop {
        prompt("Name: ");
        let Some(name) = lines.next_line().await? else {
            ticker.abort();
            return Ok(());
        };
        match router.set_current_user(&name) {
            Ok(welcome) => {
                print_response(&ChatResponse::new(ChatResponseType::Welcome, welcome));
                break;
            }
            Err(e) => print_response(&ChatResponse::new(ChatResponseType::Error, e.to_string())),
        }
    }

    prompt("You: ");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let response = router.process(&line);
                // The console renders responses directly; UI events are not needed
                router.drain_events();
                print_response(&response);
                if response.response_type == ChatResponseType::Exit {
                    break;
                }
                prompt("You: ");
            }
            Some(event) = reminders.recv() => {
                if let Some(notice) = router.reminder_notice(event) {
                    println!();
                    print_response(&notice);
                    prompt("You: ");
                }
            }
        }
    }

    ticker.abort();
    logging::log_conversation(Some(&router.session().id), "Chat loop finished");
    Ok(())
}

pub fn run() {
    let config = init_app();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return;
        }
    };

    if let Err(e) = runtime.block_on(chat_loop(config)) {
        logging::log_error(None, &format!("Chat loop failed: {}", e));
        eprintln!("CyberGuard stopped: {}", e);
    }
}
