//! # Intervue Core Library
//!
//! Core business logic for Intervue, an interview assistant: a candidate
//! answers a fixed sequence of timed questions, and the results are scored
//! and stored for review. All operations are available via a standalone CLI
//! binary; any GUI is a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Interview engine**: a wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()` for countdown progress
//! - **Question bank**: difficulty-quota draws with fixed per-difficulty
//!   time budgets (easy=20s, medium=60s, hard=120s)
//! - **Storage**: SQLite-based session persistence (validated on restore)
//!   and TOML-based configuration
//! - **Scoring**: rule-based sink consuming the completed answer list
//!
//! ## Key Components
//!
//! - [`InterviewEngine`]: the progression/timer state machine
//! - [`QuestionBank`]: built-in question source
//! - [`Database`]: session persistence, records, and statistics
//! - [`Config`]: application configuration management

pub mod candidate;
pub mod engine;
pub mod error;
pub mod events;
pub mod question;
pub mod scoring;
pub mod session;
pub mod storage;

pub use candidate::CandidateProfile;
pub use engine::{EngineOptions, InterviewEngine};
pub use error::{ConfigError, CoreError, DatabaseError, RestoreError, SessionError};
pub use events::Event;
pub use question::{Difficulty, Question, QuestionBank, QuestionPlan, QuestionSource};
pub use scoring::{AnswerSink, HeuristicScorer, QuestionScore, ScoreReport};
pub use session::{Answer, InterviewSession, SessionStatus, TimerState};
pub use storage::{Config, Database, InterviewRecord, Stats};
