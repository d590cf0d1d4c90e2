//! TOML-based application configuration.
//!
//! Stores the question quota plan, tick notification tunables, the session
//! staleness threshold, and the scorer pass mark.
//!
//! Configuration is stored at `~/.config/intervue/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::engine::EngineOptions;
use crate::error::ConfigError;
use crate::question::QuestionPlan;
use crate::scoring::DEFAULT_PASS_MARK;
use crate::session::DEFAULT_STALENESS_HOURS;

/// Question quota per difficulty level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsConfig {
    #[serde(default = "default_two")]
    pub easy: usize,
    #[serde(default = "default_two")]
    pub medium: usize,
    #[serde(default = "default_two")]
    pub hard: usize,
}

/// Tick notification tunables. The countdown itself is always
/// second-accurate; these only throttle observer events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_granularity")]
    pub notify_granularity_secs: u64,
    #[serde(default = "default_low_threshold")]
    pub low_time_threshold_secs: u64,
}

/// Session restore policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Persisted sessions older than this are discarded, not resumed.
    #[serde(default = "default_staleness")]
    pub staleness_hours: i64,
}

/// Scoring policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_pass_mark")]
    pub pass_mark: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/intervue/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub questions: QuestionsConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

// Default functions
fn default_two() -> usize {
    2
}
fn default_granularity() -> u64 {
    5
}
fn default_low_threshold() -> u64 {
    10
}
fn default_staleness() -> i64 {
    DEFAULT_STALENESS_HOURS
}
fn default_pass_mark() -> u32 {
    DEFAULT_PASS_MARK
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            easy: 2,
            medium: 2,
            hard: 2,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            notify_granularity_secs: default_granularity(),
            low_time_threshold_secs: default_low_threshold(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            staleness_hours: default_staleness(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_mark: default_pass_mark(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions: QuestionsConfig::default(),
            timer: TimerConfig::default(),
            session: SessionConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write out and return the default.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Look up a value by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "questions.easy" => self.questions.easy.to_string(),
            "questions.medium" => self.questions.medium.to_string(),
            "questions.hard" => self.questions.hard.to_string(),
            "timer.notify_granularity_secs" => self.timer.notify_granularity_secs.to_string(),
            "timer.low_time_threshold_secs" => self.timer.low_time_threshold_secs.to_string(),
            "session.staleness_hours" => self.session.staleness_hours.to_string(),
            "scoring.pass_mark" => self.scoring.pass_mark.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a value by dotted key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        }

        match key {
            "questions.easy" => self.questions.easy = parse(key, value)?,
            "questions.medium" => self.questions.medium = parse(key, value)?,
            "questions.hard" => self.questions.hard = parse(key, value)?,
            "timer.notify_granularity_secs" => {
                self.timer.notify_granularity_secs = parse(key, value)?
            }
            "timer.low_time_threshold_secs" => {
                self.timer.low_time_threshold_secs = parse(key, value)?
            }
            "session.staleness_hours" => self.session.staleness_hours = parse(key, value)?,
            "scoring.pass_mark" => self.scoring.pass_mark = parse(key, value)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        self.save()
    }

    pub fn plan(&self) -> QuestionPlan {
        QuestionPlan {
            easy: self.questions.easy,
            medium: self.questions.medium,
            hard: self.questions.hard,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            notify_granularity_secs: self.timer.notify_granularity_secs,
            low_time_threshold_secs: self.timer.low_time_threshold_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.questions.easy, 2);
        assert_eq!(parsed.timer.notify_granularity_secs, 5);
        assert_eq!(parsed.session.staleness_hours, 24);
        assert_eq!(parsed.scoring.pass_mark, 60);
    }

    #[test]
    fn empty_toml_fills_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.plan(), QuestionPlan::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let parsed: Config = toml::from_str("[timer]\nnotify_granularity_secs = 1\n").unwrap();
        assert_eq!(parsed.timer.notify_granularity_secs, 1);
        assert_eq!(parsed.timer.low_time_threshold_secs, 10);
        assert_eq!(parsed.session.staleness_hours, 24);
    }

    #[test]
    fn get_supports_known_dotted_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("questions.hard").as_deref(), Some("2"));
        assert_eq!(cfg.get("session.staleness_hours").as_deref(), Some("24"));
        assert!(cfg.get("questions.impossible").is_none());
    }
}
