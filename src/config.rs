//! Runtime configuration for the chat core.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a working setup.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest accepted conversation timer (one week).
pub const MAX_TIMER_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CyberGuardConfig {
    /// Longest accepted chat message, in characters.
    pub max_input_chars: usize,
    /// Idle gap after which conversational state resets.
    pub idle_reset_secs: i64,
    /// Minimum gap between two appended follow-up questions.
    pub follow_up_debounce_secs: i64,
    /// Period of the background reminder scan.
    pub reminder_poll_secs: u64,
    /// Questions per random quiz.
    pub quiz_question_count: usize,
    /// Cap on stored chat turns.
    pub max_chat_entries: usize,
    /// Cap on stored activity entries.
    pub max_activity_entries: usize,
    /// Write every routed turn to the activity log.
    pub activity_logging: bool,
    /// Fixed seed for phrase selection; OS entropy when absent.
    pub rng_seed: Option<u64>,
    /// Directory for file logs; console only when absent.
    pub log_dir: Option<PathBuf>,
}

impl Default for CyberGuardConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 500,
            idle_reset_secs: 300,
            follow_up_debounce_secs: 30,
            reminder_poll_secs: 60,
            quiz_question_count: 10,
            max_chat_entries: 500,
            max_activity_entries: 1000,
            activity_logging: true,
            rng_seed: None,
            log_dir: None,
        }
    }
}

impl CyberGuardConfig {
    /// Parse a config from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: CyberGuardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A missing file gives the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Copy with a fixed RNG seed, for deterministic sessions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_input_chars == 0 {
            return Err(CoreError::Config("max_input_chars must be positive".into()));
        }
        if self.idle_reset_secs <= 0 || self.follow_up_debounce_secs < 0 {
            return Err(CoreError::Config("conversation timers must be positive".into()));
        }
        if self.idle_reset_secs > MAX_TIMER_SECS || self.follow_up_debounce_secs > MAX_TIMER_SECS {
            return Err(CoreError::Config(format!(
                "conversation timers must not exceed {} seconds",
                MAX_TIMER_SECS
            )));
        }
        if self.reminder_poll_secs == 0 {
            return Err(CoreError::Config("reminder_poll_secs must be positive".into()));
        }
        if self.quiz_question_count == 0 {
            return Err(CoreError::Config("quiz_question_count must be positive".into()));
        }
        if self.max_chat_entries == 0 || self.max_activity_entries == 0 {
            return Err(CoreError::Config("activity log caps must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = CyberGuardConfig::from_json("{}").unwrap();
        assert_eq!(config.max_input_chars, 500);
        assert_eq!(config.idle_reset_secs, 300);
        assert_eq!(config.follow_up_debounce_secs, 30);
        assert_eq!(config.quiz_question_count, 10);
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = CyberGuardConfig::from_json(r#"{"rng_seed": 7, "max_chat_entries": 20}"#).unwrap();
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.max_chat_entries, 20);
        assert_eq!(config.max_activity_entries, 1000);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = CyberGuardConfig::from_json(r#"{"max_input_chars": 0}"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn oversized_timers_are_rejected() {
        for json in [
            r#"{"idle_reset_secs": 9223372036854775807}"#,
            r#"{"follow_up_debounce_secs": 9223372036854775807}"#,
            r#"{"idle_reset_secs": 604801}"#,
        ] {
            let err = CyberGuardConfig::from_json(json).unwrap_err();
            assert!(matches!(err, CoreError::Config(_)), "{}", json);
        }
        let week = CyberGuardConfig::from_json(r#"{"idle_reset_secs": 604800}"#).unwrap();
        assert_eq!(week.idle_reset_secs, MAX_TIMER_SECS);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = CyberGuardConfig::load_from_path(Path::new("/nonexistent/cyberguard.json")).unwrap();
        assert_eq!(config.reminder_poll_secs, 60);
    }
}
