//! Intent routing: the single entry point for chat input.
//!
//! `IntentRouter::process` validates a message, then tries each handler in a
//! fixed priority order (pending reminder, exit, quiz, history, progress,
//! help, tasks) before handing free-form text to the `ResponseComposer`.
//! Every turn produces exactly one `ChatResponse`; failures inside a handler
//! are turned into an `Error` response instead of escaping.
//!
//! Side effects the UI may care about (task changes, quiz progress, message
//! kinds) are queued as `ChatEvent`s and collected with `drain_events`.

use crate::activity::{ActivityLog, SharedActivityLog, DEFAULT_DISPLAY_COUNT};
use crate::composer::{ResponseComposer, SessionState};
use crate::config::CyberGuardConfig;
use crate::error::{CoreError, Result};
use crate::logging;
use crate::quiz::{answer_index, QuizEvent, QuizGameController};
use crate::sentiment::SentimentLabel;
use crate::task_parser::{self, ListFilter, ReminderAnswer, TaskCommand};
use crate::tasks::{
    describe_offset, CybersecurityTaskType, SharedTaskManager, Task, TaskEvent, TaskManager, TaskPriority, TaskStatus,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, MutexGuard};

const EXIT_WORDS: &[&str] = &["exit", "goodbye", "bye"];
const START_QUIZ: &[&str] = &["start quiz", "start a quiz", "take quiz", "take a quiz", "quiz me", "quiz"];
const TOPIC_QUIZ_PREFIXES: &[&str] = &["start quiz on ", "start a quiz on ", "quiz on ", "quiz about ", "quiz me on "];
const QUIT_QUIZ: &[&str] = &["quit quiz", "stop quiz", "end quiz", "exit quiz"];
const SEARCH_PREFIXES: &[&str] = &["search chat for ", "search history for ", "search chat history for "];

const HELP_TEXT: &str = "Here's what I can do:\n\n\
🔐 CYBERSECURITY TOPICS\n\
Ask about passwords, phishing, malware, ransomware, safe browsing, VPNs, Wi-Fi security, \
two-factor authentication, social engineering and more. Try 'cybersecurity guide' or \
'cybersecurity terms' for an overview.\n\n\
📋 TASKS\n\
• 'Add task - Review privacy settings' or 'Remind me to update my password tomorrow'\n\
• 'Show my tasks', 'show overdue tasks', 'list high priority tasks'\n\
• 'Mark <task> as done', 'delete task <task>'\n\
• 'Schedule a security audit' for ready-made cybersecurity tasks\n\n\
🎯 QUIZ\n\
• 'Start quiz' or 'quiz on phishing', then answer with A, B, C or D\n\
• 'Quiz topics', 'restart quiz', 'quit quiz'\n\n\
📊 HISTORY\n\
• 'Show activity', 'show chat history', 'search chat for <word>', 'my progress'\n\n\
Type 'exit' to quit.";

// ============ Responses ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatResponseType {
    Regular,
    Help,
    Exit,
    Error,
    Welcome,
    Task,
    Quiz,
}

impl ChatResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatResponseType::Regular => "regular",
            ChatResponseType::Help => "help",
            ChatResponseType::Exit => "exit",
            ChatResponseType::Error => "error",
            ChatResponseType::Welcome => "welcome",
            ChatResponseType::Task => "task",
            ChatResponseType::Quiz => "quiz",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ChatResponseType::Task => "📋",
            ChatResponseType::Quiz => "🎯",
            ChatResponseType::Help => "❓",
            ChatResponseType::Error => "❌",
            ChatResponseType::Exit => "👋",
            _ => "🤖",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response_type: ChatResponseType,
    pub message: String,
}

impl ChatResponse {
    pub fn new(response_type: ChatResponseType, message: impl Into<String>) -> Self {
        Self { response_type, message: message.into() }
    }

    fn regular(message: impl Into<String>) -> Self {
        Self::new(ChatResponseType::Regular, message)
    }

    fn task(message: impl Into<String>) -> Self {
        Self::new(ChatResponseType::Task, message)
    }

    fn quiz(message: impl Into<String>) -> Self {
        Self::new(ChatResponseType::Quiz, message)
    }
}

/// Notifications for the UI, in the order they happened.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    BotMessage(String),
    ErrorMessage(String),
    WelcomeMessage(String),
    ExitMessage(String),
    HelpMessage(String),
    TaskResponse(String),
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskCompleted(Task),
    ReminderTriggered { task: Task, message: String },
    Quiz(QuizEvent),
}

// ============ Router ============

pub struct IntentRouter {
    config: CyberGuardConfig,
    session: SessionState,
    composer: ResponseComposer,
    quiz: QuizGameController,
    tasks: SharedTaskManager,
    activity: SharedActivityLog,
    user_name: Option<String>,
    pending_reminder: Option<String>,
    events: Vec<ChatEvent>,
}

impl IntentRouter {
    /// Router with its own task list and activity log.
    pub fn new(config: CyberGuardConfig) -> Self {
        let tasks = TaskManager::shared();
        let activity = ActivityLog::shared(config.max_chat_entries, config.max_activity_entries);
        Self::with_shared(config, tasks, activity)
    }

    /// Router over a task list and activity log shared with others
    /// (the reminder ticker, other sessions).
    pub fn with_shared(config: CyberGuardConfig, tasks: SharedTaskManager, activity: SharedActivityLog) -> Self {
        let session = SessionState::new(config.rng_seed);
        logging::log_conversation(Some(&session.id), "Session started");
        Self {
            composer: ResponseComposer::new(&config),
            quiz: QuizGameController::new(config.quiz_question_count),
            session,
            tasks,
            activity,
            user_name: None,
            pending_reminder: None,
            events: Vec::new(),
            config,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn quiz(&self) -> &QuizGameController {
        &self.quiz
    }

    pub fn task_manager(&self) -> SharedTaskManager {
        Arc::clone(&self.tasks)
    }

    pub fn activity_log(&self) -> SharedActivityLog {
        Arc::clone(&self.activity)
    }

    /// Id of the task waiting for a reminder answer.
    pub fn pending_reminder_task(&self) -> Option<&str> {
        self.pending_reminder.as_deref()
    }

    pub fn initial_welcome(&self) -> &'static str {
        "Welcome to CyberGuard AI! Please enter your name to get started."
    }

    pub fn current_user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Validate and store the user's name. Returns the welcome message.
    pub fn set_current_user(&mut self, name: &str) -> Result<String> {
        if let Err(e) = validate_name(name) {
            self.events.push(ChatEvent::ErrorMessage(e.to_string()));
            return Err(e);
        }

        let name = name.trim().to_string();
        self.session.profile.store_fact("name", &name);
        logging::log_conversation(Some(&self.session.id), &format!("User set to {}", name));
        self.activity.log_system_action(&format!("User signed in as {}", name), Some(&name));

        let welcome = format!(
            "Hello {}, how may I help you today? Type 'help' to see what I can do or 'exit' to quit.",
            name
        );
        self.user_name = Some(name);
        self.events.push(ChatEvent::WelcomeMessage(welcome.clone()));
        Ok(welcome)
    }

    pub fn drain_events(&mut self) -> Vec<ChatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn process(&mut self, input: &str) -> ChatResponse {
        self.process_at(input, Local::now())
    }

    /// Route one message at wall-clock time `now`.
    pub fn process_at(&mut self, input: &str, now: DateTime<Local>) -> ChatResponse {
        let input = input.trim();

        let response = match validate_input(input, self.config.max_input_chars) {
            Err(e) => ChatResponse::new(ChatResponseType::Error, e.to_string()),
            Ok(()) => match self.route(input, now) {
                Ok(response) => response,
                Err(e) => {
                    logging::log_error(Some(&self.session.id), &format!("Handler failed for '{}': {}", input, e));
                    ChatResponse::new(
                        ChatResponseType::Error,
                        format!("An error occurred while processing your request: {}", e),
                    )
                }
            },
        };

        if self.config.activity_logging {
            self.activity.log_chat_interaction(
                input,
                &response.message,
                response.response_type,
                self.user_name.as_deref(),
            );
        }
        self.collect_task_events();
        self.events.push(message_event(&response));
        response
    }

    /// Render a reminder raised by the background ticker.
    pub fn reminder_notice(&mut self, event: TaskEvent) -> Option<ChatResponse> {
        let TaskEvent::ReminderDue { task, message } = event else { return None };
        self.activity
            .log_task_activity(&task, "reminder triggered", self.user_name.as_deref());
        self.events.push(ChatEvent::ReminderTriggered { task, message: message.clone() });
        Some(ChatResponse::task(format!("⏰ {}", message)))
    }

    fn route(&mut self, input: &str, now: DateTime<Local>) -> Result<ChatResponse> {
        let lower = input.to_lowercase();

        if self.pending_reminder.is_some() {
            if let Some(response) = self.handle_pending_reminder(input)? {
                return Ok(response);
            }
        }

        if EXIT_WORDS.contains(&lower.as_str()) {
            self.log_route("exit");
            return Ok(self.farewell());
        }

        if let Some(response) = self.handle_quiz(&lower, now)? {
            self.log_route("quiz");
            return Ok(response);
        }

        if let Some(response) = self.handle_history(&lower) {
            self.log_route("history");
            return Ok(response);
        }

        if lower == "my progress" || lower == "learning progress" || lower == "show progress" {
            self.log_route("progress");
            return Ok(self.progress());
        }

        if lower == "help" {
            self.log_route("help");
            return Ok(ChatResponse::new(ChatResponseType::Help, HELP_TEXT));
        }

        if let Some(command) = task_parser::detect_command(input) {
            self.log_route("task");
            return self.handle_task(command, input, now);
        }

        self.log_route("composer");
        let reply = self.composer.respond_at(&mut self.session, input, now);
        Ok(ChatResponse::regular(reply))
    }

    fn log_route(&self, handler: &str) {
        logging::log_routing(Some(&self.session.id), &format!("Handled by {}", handler));
    }

    fn farewell(&self) -> ChatResponse {
        let name = self.user_name.as_deref().or_else(|| self.session.profile.name());
        let message = match name {
            Some(name) => format!(
                "Remember to ask me anything as I am always available.\nGoodbye, have a great day {}!",
                name
            ),
            None => "Goodbye, have a great day!".to_string(),
        };
        logging::log_conversation(Some(&self.session.id), "Session ended by user");
        ChatResponse::new(ChatResponseType::Exit, message)
    }

    fn lock_tasks(&self) -> Result<MutexGuard<'_, TaskManager>> {
        self.tasks.lock().map_err(|_| CoreError::StatePoisoned("task manager"))
    }

    fn collect_task_events(&mut self) {
        let drained = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain_events(),
            Err(_) => return,
        };
        self.events.extend(drained.into_iter().map(|event| match event {
            TaskEvent::Added(task) => ChatEvent::TaskCreated(task),
            TaskEvent::Updated(task) => ChatEvent::TaskUpdated(task),
            TaskEvent::Completed(task) => ChatEvent::TaskCompleted(task),
            TaskEvent::ReminderDue { task, message } => ChatEvent::ReminderTriggered { task, message },
        }));
    }

    // ============ Reminder Confirmation ============

    /// `None` lets the message through to normal routing (a new task
    /// request replaces the pending one).
    fn handle_pending_reminder(&mut self, input: &str) -> Result<Option<ChatResponse>> {
        let Some(task_id) = self.pending_reminder.clone() else { return Ok(None) };
        let title = self
            .lock_tasks()?
            .get(&task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| "your task".to_string());

        match task_parser::parse_reminder_answer(input) {
            ReminderAnswer::Accept(offset) => {
                self.pending_reminder = None;
                let task = self.lock_tasks()?.update_task_reminder(&task_id, offset)?;
                self.activity
                    .log_task_activity(&task, "reminder set", self.user_name.as_deref());
                Ok(Some(ChatResponse::task(format!(
                    "Got it! I'll remind you about '{}' {} before it's due.",
                    task.title,
                    describe_offset(offset)
                ))))
            }
            ReminderAnswer::Decline => {
                self.pending_reminder = None;
                logging::log_task(Some(&self.session.id), &format!("Reminder declined for '{}'", title));
                Ok(Some(ChatResponse::task(format!(
                    "No problem! '{}' is saved without a reminder.",
                    title
                ))))
            }
            ReminderAnswer::AcceptWithoutTime => Ok(Some(ChatResponse::task(format!(
                "When should I remind you about '{}'? Try something like 'in 2 days' or 'in 3 hours'.",
                title
            )))),
            ReminderAnswer::Unclear => {
                if task_parser::detect_command(input) == Some(TaskCommand::Create) {
                    return Ok(None);
                }
                Ok(Some(ChatResponse::task(format!(
                    "Would you like a reminder for '{}'? Say something like 'yes, remind me in 2 days' or 'no thanks'.",
                    title
                ))))
            }
        }
    }

    // ============ Quiz ============

    fn handle_quiz(&mut self, lower: &str, now: DateTime<Local>) -> Result<Option<ChatResponse>> {
        if lower == "quiz topics" || lower == "list quiz topics" {
            let lines: Vec<String> = self
                .quiz
                .bank()
                .topic_question_counts()
                .into_iter()
                .map(|(topic, count)| format!("• {} ({} questions)", topic, count))
                .collect();
            return Ok(Some(ChatResponse::quiz(format!(
                "Available quiz topics:\n{}\n\nSay 'quiz on <topic>' to start.",
                lines.join("\n")
            ))));
        }

        if QUIT_QUIZ.contains(&lower) {
            if !self.quiz.is_in_progress() {
                return Ok(Some(ChatResponse::quiz("There's no quiz in progress. Say 'start quiz' to begin one.")));
            }
            let score = self.quiz.current_score();
            let answered = self.quiz.total_questions();
            let details = format!("Score: {}/{}", score, answered);
            self.activity.log_quiz_activity("quit", Some(&details), self.user_name.as_deref());
            let events = self.quiz.reset();
            self.push_quiz_events(events);
            return Ok(Some(ChatResponse::quiz(format!(
                "Quiz ended. Final score: {}/{}. Say 'start quiz' whenever you want to try again.",
                score, answered
            ))));
        }

        if lower == "restart quiz" {
            let events = self.quiz.reset();
            self.push_quiz_events(events);
            self.activity.log_quiz_activity("restarted", None, self.user_name.as_deref());
            let events = self.quiz.start_quiz(&mut self.session.picker, None)?;
            return Ok(Some(self.render_quiz_events(events, now)));
        }

        let topic_query = TOPIC_QUIZ_PREFIXES.iter().find_map(|p| lower.strip_prefix(p));
        if topic_query.is_some() || START_QUIZ.contains(&lower) {
            if self.quiz.is_in_progress() {
                return Ok(Some(ChatResponse::quiz(
                    "A quiz is already in progress. Answer with A, B, C or D, or type 'quit quiz' to stop.",
                )));
            }
            let events = match topic_query {
                Some(query) => {
                    let Some(topic) = self.quiz.bank().resolve_topic(query) else {
                        return Ok(Some(ChatResponse::quiz(format!(
                            "I don't have questions about '{}'. Available topics: {}.",
                            query.trim(),
                            self.quiz.available_topics().join(", ")
                        ))));
                    };
                    self.quiz.start_topic_quiz(&topic, &mut self.session.picker, None)?
                }
                None => self.quiz.start_quiz(&mut self.session.picker, None)?,
            };
            return Ok(Some(self.render_quiz_events(events, now)));
        }

        if self.quiz.is_in_progress() {
            if let Some(index) = answer_index(lower) {
                let options = self.quiz.current_question().map(|q| q.options.len()).unwrap_or(0);
                if index >= options {
                    let letters: Vec<String> = (0..options).map(|i| ((b'A' + i as u8) as char).to_string()).collect();
                    return Ok(Some(ChatResponse::quiz(format!(
                        "Please answer with one of: {}.",
                        letters.join(", ")
                    ))));
                }
                let events = self.quiz.submit_answer(index)?;
                return Ok(Some(self.render_quiz_events(events, now)));
            }
        }

        Ok(None)
    }

    fn push_quiz_events(&mut self, events: Vec<QuizEvent>) {
        self.events.extend(events.into_iter().map(ChatEvent::Quiz));
    }

    /// Turn controller events into one reply, updating the profile on the way.
    fn render_quiz_events(&mut self, events: Vec<QuizEvent>, now: DateTime<Local>) -> ChatResponse {
        let user = self.user_name.clone();
        let mut parts = Vec::new();

        for event in &events {
            match event {
                QuizEvent::Started { total, topic } => {
                    let details = match topic {
                        Some(topic) => format!("{} questions on {}", total, topic),
                        None => format!("{} questions", total),
                    };
                    self.activity.log_quiz_activity("started", Some(&details), user.as_deref());
                    parts.push(format!(
                        "🎯 Starting a quiz with {}! Answer with the letter of your choice, or type 'quit quiz' to stop.",
                        details
                    ));
                }
                QuizEvent::QuestionAsked { question, number, total } => {
                    parts.push(format!(
                        "Question {}/{}: {}\n{}",
                        number,
                        total,
                        question.question,
                        question.formatted_options().join("\n")
                    ));
                }
                QuizEvent::AnswerResult { question, correct, score, answered, feedback } => {
                    let profile = &mut self.session.profile;
                    profile.record_topic_discussed_at(&question.topic, now);
                    profile.record_topic_question_at(&question.topic, now);
                    if *correct {
                        profile.record_positive_interaction_at(&question.topic, now);
                        profile.record_sentiment(SentimentLabel::Positive);
                        parts.push(format!("✅ Correct! {} (Score: {}/{})", feedback, score, answered));
                    } else {
                        profile.record_sentiment(SentimentLabel::Frustrated);
                        parts.push(format!("❌ {} (Score: {}/{})", feedback, score, answered));
                    }
                }
                QuizEvent::Completed { score, total, percentage, feedback, weak_topics } => {
                    self.session.profile.record_quiz_result(*score, *total, *percentage);
                    let details = format!("Score: {}/{} ({:.0}%)", score, total, percentage);
                    self.activity.log_quiz_activity("completed", Some(&details), user.as_deref());

                    let mut summary = format!(
                        "🏁 Quiz complete! You scored {}/{} ({:.0}%). {}",
                        score, total, percentage, feedback
                    );
                    if !weak_topics.is_empty() {
                        summary.push_str(&format!("\nTopics to review: {}", weak_topics.join(", ")));
                    }
                    summary.push_str("\nSay 'restart quiz' to play again or 'my progress' for study tips.");
                    parts.push(summary);
                }
                QuizEvent::Reset => {}
            }
        }

        self.push_quiz_events(events);
        ChatResponse::quiz(parts.join("\n\n"))
    }

    // ============ History & Progress ============

    fn handle_history(&self, lower: &str) -> Option<ChatResponse> {
        let message = match lower {
            "show activity" | "activity log" | "show activity log" | "what have you done for me" => {
                self.activity.concise_summary(DEFAULT_DISPLAY_COUNT)
            }
            "show chat history" | "chat history" => self.activity.formatted_chat_history(DEFAULT_DISPLAY_COUNT),
            "activity details" | "show activity details" => self.activity.formatted_activity_log(DEFAULT_DISPLAY_COUNT),
            _ => {
                let term = SEARCH_PREFIXES.iter().find_map(|p| lower.strip_prefix(p))?;
                let hits = self.activity.search_chat_history(term, 20);
                if hits.is_empty() {
                    format!("No chat messages mention '{}'.", term.trim())
                } else {
                    let lines: Vec<String> = hits
                        .iter()
                        .map(|c| format!("• {} - {}", c.timestamp.format("%b %d, %H:%M"), c.user_input))
                        .collect();
                    format!("Found {} message(s) mentioning '{}':\n{}", hits.len(), term.trim(), lines.join("\n"))
                }
            }
        };
        Some(ChatResponse::regular(message))
    }

    fn progress(&mut self) -> ChatResponse {
        let mut message = self.composer.learning_progress(&mut self.session);
        if self.quiz.total_questions() > 0 {
            message.push_str(&format!(
                "\n\nQuiz score so far: {}/{} ({:.0}%).",
                self.quiz.current_score(),
                self.quiz.total_questions(),
                self.quiz.current_percentage()
            ));
            let tips = self.quiz.recommendations(&self.session.profile);
            let lines: Vec<String> = tips.iter().map(|t| format!("• {}", t)).collect();
            message.push_str(&format!("\n\nRecommendations:\n{}", lines.join("\n")));
        }
        ChatResponse::regular(message)
    }

    // ============ Tasks ============

    fn handle_task(&mut self, command: TaskCommand, input: &str, now: DateTime<Local>) -> Result<ChatResponse> {
        match command {
            TaskCommand::Create => self.create_task(input, now),
            TaskCommand::List(filter) => self.list_tasks(filter, now),
            TaskCommand::UpdateStatus(status) => self.update_status(input, status),
            TaskCommand::Delete => self.delete_task(input),
            TaskCommand::Shortcut(kind) => self.create_security_task(kind, input, now),
        }
    }

    fn create_task(&mut self, input: &str, now: DateTime<Local>) -> Result<ChatResponse> {
        let Some(parsed) = task_parser::parse_task(input, now) else {
            return Ok(ChatResponse::task(
                "I couldn't identify the task title. Try something like 'Add task - Review privacy settings'.",
            ));
        };

        let task = self.lock_tasks()?.add_task(
            &parsed.title,
            &parsed.description,
            parsed.due_date,
            parsed.priority,
            &parsed.category,
            parsed.reminder,
        )?;
        self.activity.log_task_activity(&task, "created", self.user_name.as_deref());

        let mut message = format!(
            "Task added: '{}' ({} priority, due {}).\n{}",
            task.title,
            task.priority.as_str(),
            task.due_date.format("%b %d, %Y %H:%M"),
            task.description
        );

        match parsed.reminder {
            Some(offset) => {
                message.push_str(&format!("\nI'll remind you {} before it's due.", describe_offset(offset)));
            }
            None => {
                if let Some(previous) = self.pending_reminder.replace(task.id.clone()) {
                    logging::log_task(
                        Some(&self.session.id),
                        &format!("Dropped pending reminder request for task {}", previous),
                    );
                }
                message.push_str("\nWould you like me to set a reminder for this task?");
            }
        }
        Ok(ChatResponse::task(message))
    }

    fn create_security_task(
        &mut self,
        kind: CybersecurityTaskType,
        input: &str,
        now: DateTime<Local>,
    ) -> Result<ChatResponse> {
        let due = task_parser::parse_due_date(&input.to_lowercase(), now);
        let task = self.lock_tasks()?.add_cybersecurity_task(kind, due, "")?;
        self.activity.log_task_activity(&task, "created", self.user_name.as_deref());

        let reminder = task.reminder_offset().map(describe_offset).unwrap_or_default();
        Ok(ChatResponse::task(format!(
            "Cybersecurity task added: '{}' ({} priority, due {}).\n{}\nI'll remind you {} before it's due.",
            task.title,
            task.priority.as_str(),
            task.due_date.format("%b %d, %Y %H:%M"),
            task.description,
            reminder
        )))
    }

    fn list_tasks(&self, filter: ListFilter, now: DateTime<Local>) -> Result<ChatResponse> {
        let tasks = self.lock_tasks()?;
        let (label, list) = match filter {
            ListFilter::All => ("", tasks.all_tasks()),
            ListFilter::Overdue => ("overdue ", tasks.overdue_tasks_at(now)),
            ListFilter::Upcoming => ("upcoming ", tasks.upcoming_tasks_at(now)),
            ListFilter::Completed => ("completed ", tasks.tasks_by_status(TaskStatus::Completed)),
            ListFilter::Pending => ("pending ", tasks.tasks_by_status(TaskStatus::Pending)),
            ListFilter::HighPriority => ("high priority ", tasks.tasks_by_priority(TaskPriority::High)),
            ListFilter::Critical => ("critical ", tasks.tasks_by_priority(TaskPriority::Critical)),
        };
        drop(tasks);

        if list.is_empty() {
            return Ok(ChatResponse::task(format!("You don't have any {}tasks.", label)));
        }

        let lines: Vec<String> = list
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let overdue = if task.is_overdue_at(now) { " ⚠️ overdue" } else { "" };
                format!(
                    "{}. {} - due {} [{}] ({}){}",
                    i + 1,
                    task.title,
                    task.due_date.format("%b %d, %Y %H:%M"),
                    task.priority.as_str(),
                    task.status.as_str(),
                    overdue
                )
            })
            .collect();
        Ok(ChatResponse::task(format!(
            "Your {}tasks ({}):\n{}",
            label,
            list.len(),
            lines.join("\n")
        )))
    }

    fn update_status(&mut self, input: &str, status: TaskStatus) -> Result<ChatResponse> {
        let task = {
            let mut tasks = self.lock_tasks()?;
            let target = tasks
                .find_by_title_in(input)
                .or_else(|| tasks.first_pending())
                .map(|t| t.id.clone());
            match target {
                Some(id) => tasks.update_task_status(&id, status)?,
                None => return Ok(ChatResponse::task("I couldn't find a task to update. Say 'show my tasks' to see them.")),
            }
        };

        let action = status.as_str().to_lowercase();
        self.activity.log_task_activity(&task, &action, self.user_name.as_deref());
        let cheer = if status == TaskStatus::Completed { " Great work staying on top of your security!" } else { "" };
        Ok(ChatResponse::task(format!("Task '{}' marked as {}.{}", task.title, status.as_str(), cheer)))
    }

    fn delete_task(&mut self, input: &str) -> Result<ChatResponse> {
        let removed = {
            let mut tasks = self.lock_tasks()?;
            let Some(task) = tasks.find_by_title_in(input).cloned() else {
                return Ok(ChatResponse::task(
                    "I couldn't find a task matching that description to delete.",
                ));
            };
            if !tasks.delete_task(&task.id) {
                return Err(CoreError::TaskNotFound(task.id));
            }
            task
        };

        if self.pending_reminder.as_deref() == Some(removed.id.as_str()) {
            self.pending_reminder = None;
        }
        self.activity.log_task_activity(&removed, "deleted", self.user_name.as_deref());
        Ok(ChatResponse::task(format!("Task '{}' deleted.", removed.title)))
    }
}

// ============ Validation ============

fn validate_input(input: &str, max_chars: usize) -> Result<()> {
    if input.trim().is_empty() {
        return Err(CoreError::Validation("Input cannot be empty. Please try again.".into()));
    }
    if input.chars().count() > max_chars {
        return Err(CoreError::Validation(format!(
            "Input is too long. Please keep it under {} characters.",
            max_chars
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name cannot be empty. Please try again.".into()));
    }
    if !name.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(CoreError::Validation("Name should only contain letters. Please try again.".into()));
    }
    Ok(())
}

fn message_event(response: &ChatResponse) -> ChatEvent {
    let message = response.message.clone();
    match response.response_type {
        ChatResponseType::Error => ChatEvent::ErrorMessage(message),
        ChatResponseType::Exit => ChatEvent::ExitMessage(message),
        ChatResponseType::Help => ChatEvent::HelpMessage(message),
        ChatResponseType::Welcome => ChatEvent::WelcomeMessage(message),
        ChatResponseType::Task => ChatEvent::TaskResponse(message),
        ChatResponseType::Regular | ChatResponseType::Quiz => ChatEvent::BotMessage(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn router() -> IntentRouter {
        IntentRouter::new(CyberGuardConfig::default().with_seed(7))
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 12, hour, minute, 0).unwrap()
    }

    #[test]
    fn blank_and_oversized_input_are_rejected() {
        let mut r = router();
        for input in ["", "   ", "\t\n"] {
            let response = r.process(input);
            assert_eq!(response.response_type, ChatResponseType::Error);
            assert_eq!(response.message, "Input cannot be empty. Please try again.");
        }

        let long = "a".repeat(501);
        let response = r.process(&long);
        assert_eq!(response.response_type, ChatResponseType::Error);
        assert!(response.message.starts_with("Input is too long"));

        // the composer never saw any of it
        assert_eq!(r.session().conversation.turn_count, 0);
        assert!(r.session().conversation.last_response_at.is_none());
    }

    #[test]
    fn first_greeting_is_plain() {
        let mut r = router();
        let response = r.process_at("Hi", at(9, 0));
        assert_eq!(response.response_type, ChatResponseType::Regular);
        let lower = response.message.to_lowercase();
        assert!(!lower.is_empty());
        assert!(!lower.contains("task"));
        assert!(!lower.contains("quiz"));
        assert!(!r.quiz().is_in_progress());
    }

    #[test]
    fn task_creation_then_reminder_confirmation() {
        let mut r = router();
        let response = r.process_at("Add task - Review privacy settings", at(9, 0));
        assert_eq!(response.response_type, ChatResponseType::Task);
        assert!(response.message.contains("Review privacy settings"));
        assert!(response.message.ends_with('?'));

        let pending = r.pending_reminder_task().map(str::to_string).unwrap();
        {
            let manager = r.task_manager();
            let tasks = manager.lock().unwrap();
            let task = tasks.get(&pending).unwrap();
            assert_eq!(task.status, TaskStatus::Pending);
            assert!(task.reminder_offset().is_none());
        }

        let response = r.process_at("yes, remind me in 2 days", at(9, 1));
        assert_eq!(response.response_type, ChatResponseType::Task);
        assert!(response.message.contains("2 days"));
        assert!(r.pending_reminder_task().is_none());

        let manager = r.task_manager();
        let tasks = manager.lock().unwrap();
        assert_eq!(tasks.get(&pending).unwrap().reminder_offset(), Some(Duration::days(2)));
    }

    #[test]
    fn bare_yes_keeps_the_reminder_pending() {
        let mut r = router();
        r.process_at("Add task - Back up photos", at(9, 0));
        let response = r.process_at("yes", at(9, 1));
        assert!(response.message.contains("When should I remind you"));
        assert!(r.pending_reminder_task().is_some());

        let response = r.process_at("no thanks", at(9, 2));
        assert!(response.message.contains("without a reminder"));
        assert!(r.pending_reminder_task().is_none());
    }

    #[test]
    fn oversized_amounts_fall_back_instead_of_failing() {
        let mut r = router();
        r.process_at("Add task - Review privacy settings", at(9, 0));
        let response = r.process_at("yes, remind me in 9999999999999 days", at(9, 1));
        assert_eq!(response.response_type, ChatResponseType::Task);
        assert!(response.message.contains("When should I remind you"));
        assert!(r.pending_reminder_task().is_some());
        r.process_at("no thanks", at(9, 2));

        let response = r.process_at("Add task - Patch laptop in 100000000 days", at(9, 3));
        assert_eq!(response.response_type, ChatResponseType::Task);
        r.process_at("no", at(9, 4));

        let response = r.process_at("Add task - Patch router, remind me 99999999999999 hours before", at(9, 5));
        assert_eq!(response.response_type, ChatResponseType::Task);
        assert!(r.pending_reminder_task().is_none());

        let manager = r.task_manager();
        let tasks = manager.lock().unwrap().all_tasks();
        assert_eq!(tasks.len(), 3);
        let far = tasks.iter().find(|t| t.title.starts_with("Patch laptop")).unwrap();
        assert_eq!(far.due_date, at(9, 3) + Duration::days(1));
        let reminded = tasks.iter().find(|t| t.title.starts_with("Patch router")).unwrap();
        assert_eq!(reminded.reminder_offset(), Some(Duration::hours(1)));
    }

    #[test]
    fn poisoned_task_state_surfaces_as_an_error_response() {
        let mut r = router();
        let manager = r.task_manager();
        let _ = std::thread::spawn(move || {
            let _guard = manager.lock().unwrap();
            panic!("task thread died while holding the lock");
        })
        .join();

        let response = r.process_at("show my tasks", at(9, 0));
        assert_eq!(response.response_type, ChatResponseType::Error);
        assert!(response.message.starts_with("An error occurred while processing your request"));
        assert!(response.message.contains("internal state unavailable"));
    }

    #[test]
    fn newer_task_replaces_pending_reminder() {
        let mut r = router();
        r.process_at("Add task - First thing", at(9, 0));
        let first = r.pending_reminder_task().map(str::to_string);
        r.process_at("Add task - Second thing", at(9, 1));
        let second = r.pending_reminder_task().map(str::to_string);
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn letter_is_only_an_answer_during_a_quiz() {
        let mut r = router();
        let before = r.process_at("B", at(10, 0));
        assert_eq!(before.response_type, ChatResponseType::Regular);
        assert_eq!(r.quiz().total_questions(), 0);

        let started = r.process_at("start quiz", at(10, 1));
        assert_eq!(started.response_type, ChatResponseType::Quiz);
        assert!(started.message.contains("Question 1/"));
        assert!(r.quiz().is_in_progress());

        let answered = r.process_at("B", at(10, 2));
        assert_eq!(answered.response_type, ChatResponseType::Quiz);
        assert_eq!(r.quiz().total_questions(), 1);
        assert!(!r.session().profile.discussed_topics().is_empty());

        let quit = r.process_at("quit quiz", at(10, 3));
        assert!(quit.message.starts_with("Quiz ended. Final score:"));
        assert!(!r.quiz().is_in_progress());
    }

    #[test]
    fn topic_quiz_and_unknown_topic() {
        let mut r = router();
        let response = r.process_at("quiz on phishing", at(11, 0));
        assert!(response.message.contains("on phishing"));
        assert!(r.quiz().is_in_progress());
        assert_eq!(r.quiz().current_question().unwrap().topic, "phishing");
        r.process_at("quit quiz", at(11, 1));

        let response = r.process_at("quiz on astronomy", at(11, 2));
        assert!(response.message.starts_with("I don't have questions about 'astronomy'"));
        assert!(!r.quiz().is_in_progress());
    }

    #[test]
    fn repeated_topic_is_short_circuited() {
        let mut r = router();
        let first = r.process_at("Tell me about phishing", at(12, 0));
        assert!(first.message.to_lowercase().contains("phishing"));
        let second = r.process_at("Tell me about phishing", at(12, 1));
        assert!(second.message.starts_with("We just talked about phishing."));
    }

    #[test]
    fn exit_and_help() {
        let mut r = router();
        assert!(r.set_current_user("Jane 2").is_err());
        let welcome = r.set_current_user("Jane").unwrap();
        assert!(welcome.starts_with("Hello Jane,"));
        assert_eq!(r.current_user_name(), Some("Jane"));

        let help = r.process("help");
        assert_eq!(help.response_type, ChatResponseType::Help);
        assert!(help.message.contains("QUIZ"));

        let bye = r.process("bye");
        assert_eq!(bye.response_type, ChatResponseType::Exit);
        assert!(bye.message.ends_with("Goodbye, have a great day Jane!"));
    }

    #[test]
    fn task_list_status_and_delete() {
        let mut r = router();
        r.process_at("Add task - Update router firmware", at(9, 0));
        r.process_at("no", at(9, 1));

        let list = r.process_at("show my tasks", at(9, 2));
        assert!(list.message.contains("1. Update router firmware"));

        let done = r.process_at("mark task update router firmware as done", at(9, 3));
        assert_eq!(done.message, "Task 'Update router firmware' marked as Completed. Great work staying on top of your security!");

        let missing = r.process_at("delete task water plants", at(9, 4));
        assert!(missing.message.starts_with("I couldn't find a task"));
        let deleted = r.process_at("delete task update router firmware", at(9, 5));
        assert_eq!(deleted.message, "Task 'Update router firmware' deleted.");
        assert!(r.task_manager().lock().unwrap().is_empty());

        let events = r.drain_events();
        assert!(events.iter().any(|e| matches!(e, ChatEvent::TaskCreated(_))));
        assert!(events.iter().any(|e| matches!(e, ChatEvent::TaskCompleted(_))));
    }

    #[test]
    fn turns_are_written_to_the_activity_log() {
        let mut r = router();
        r.set_current_user("Sam").unwrap();
        r.process_at("what is a vpn?", at(8, 0));
        r.process_at("Add task - Enable 2FA", at(8, 1));
        r.process_at("no", at(8, 2));

        let log = r.activity_log();
        let history = log.chat_history(10, None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].response_type, ChatResponseType::Task);
        assert_eq!(history[2].user_name, "Sam");

        let summary = r.process_at("show activity", at(8, 3));
        assert!(summary.message.contains("Task added: 'Enable 2FA'"));
    }

    #[test]
    fn reminder_notice_renders_ticker_events() {
        let mut r = router();
        r.process_at("Add task - Patch laptop, remind me 1 hour before", at(9, 0));
        let task = r.task_manager().lock().unwrap().all_tasks().remove(0);
        let fire_at = task.reminder_at().unwrap();

        let due = r.task_manager().lock().unwrap().due_reminders_at(fire_at);
        assert_eq!(due.len(), 1);
        let notice = r.reminder_notice(due.into_iter().next().unwrap()).unwrap();
        assert!(notice.message.starts_with("⏰ Reminder: Patch laptop is due"));
    }
}
