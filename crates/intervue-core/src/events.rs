//! Events emitted by the interview engine.
//!
//! Every state change produces an [`Event`]; presentation layers poll or
//! print them, persistence subscribes to them. `TimerTick` is throttled
//! (see [`crate::engine::EngineOptions`]) while the internal countdown stays
//! second-accurate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    InterviewStarted {
        session_id: String,
        candidate_id: String,
        total_questions: usize,
        first_time_limit_secs: u64,
        at: DateTime<Utc>,
    },
    AnswerSubmitted {
        question_index: usize,
        question_id: String,
        time_spent_secs: u64,
        /// Full budget of the question now on the clock.
        next_time_limit_secs: u64,
        at: DateTime<Utc>,
    },
    /// Forced empty answer: the question's budget ran out.
    QuestionTimedOut {
        question_index: usize,
        question_id: String,
        time_limit_secs: u64,
        next_time_limit_secs: u64,
        at: DateTime<Utc>,
    },
    /// Throttled countdown notification.
    TimerTick {
        question_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    InterviewPaused {
        question_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    InterviewResumed {
        question_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The last answer (submitted or forced) was recorded.
    InterviewCompleted {
        session_id: String,
        total_questions: usize,
        timed_out_answers: usize,
        duration_secs: i64,
        at: DateTime<Utc>,
    },
    InterviewReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: SessionStatus,
        question_index: usize,
        total_questions: usize,
        answered: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
}
