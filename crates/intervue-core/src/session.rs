//! Interview session data model.
//!
//! An [`InterviewSession`] is one candidate's single attempt at the full
//! question sequence. The session owns its [`TimerState`]; exactly one engine
//! instance mutates a session at a time.
//!
//! ## Invariants
//!
//! - `answers.len() == current_index` while the interview is in progress
//! - `answers.len() == questions.len()` iff the interview is completed
//! - `current_index <= questions.len()` always
//! - `total_paused_ms` never decreases

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RestoreError, SessionError};
use crate::question::Question;

/// Default staleness threshold for persisted sessions, in hours.
pub const DEFAULT_STALENESS_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
    /// Completed and handed off to a scoring sink; progression is over.
    AwaitingEvaluation,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not-started",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::AwaitingEvaluation => "awaiting-evaluation",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded answer. Created exactly once per question, in order, and
/// never mutated afterwards. An empty `text` is a timeout, distinguishable
/// from "not yet answered" only by its presence in the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub text: String,
    /// Seconds of active time spent on the question, clamped to the budget.
    pub time_spent_secs: u64,
    pub timestamp: DateTime<Utc>,
}

impl Answer {
    pub fn is_timeout(&self) -> bool {
        self.text.is_empty()
    }
}

/// Countdown state for the current question.
///
/// `remaining_ms` is the authoritative in-memory countdown; on restore it is
/// always re-derived from the timestamps below rather than trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    pub is_active: bool,
    /// Remaining time for the current question, in milliseconds. Clamped at 0.
    pub remaining_ms: u64,
    /// When the current question's countdown started.
    pub question_started_at: DateTime<Utc>,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Milliseconds spent paused within the current question.
    #[serde(default)]
    pub question_paused_ms: u64,
    /// Cumulative milliseconds spent paused across the session. Monotone.
    #[serde(default)]
    pub total_paused_ms: u64,
}

impl TimerState {
    /// Fresh full-budget countdown for `question`, starting at `now`.
    pub fn for_question(question: &Question, now: DateTime<Utc>) -> Self {
        Self {
            is_active: true,
            remaining_ms: question.time_limit_ms(),
            question_started_at: now,
            paused_at: None,
            question_paused_ms: 0,
            total_paused_ms: 0,
        }
    }

    /// Remaining whole seconds, rounded up so a partially elapsed second
    /// still counts.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    /// Active (non-paused) milliseconds elapsed on the current question.
    ///
    /// While paused the clock is frozen at `paused_at`.
    pub fn active_elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        let effective_now = self.paused_at.unwrap_or(now);
        let elapsed = (effective_now - self.question_started_at)
            .num_milliseconds()
            .max(0) as u64;
        elapsed.saturating_sub(self.question_paused_ms)
    }
}

/// One candidate's single attempt at the full question sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: String,
    pub candidate_id: String,
    /// Fixed at session start. Immutable.
    pub questions: Vec<Question>,
    /// Grows monotonically, parallel to a prefix of `questions`.
    pub answers: Vec<Answer>,
    /// 0-based cursor into `questions`.
    pub current_index: usize,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub timer: TimerState,
    pub status: SessionStatus,
}

impl InterviewSession {
    /// Create a session at the first question with a full countdown.
    pub fn new(
        candidate_id: &str,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let first = questions.first().ok_or(SessionError::EmptyQuestionList)?;
        let timer = TimerState::for_question(first, now);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            candidate_id: candidate_id.to_string(),
            questions,
            answers: Vec::new(),
            current_index: 0,
            start_time: now,
            end_time: None,
            timer,
            status: SessionStatus::InProgress,
        })
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Completed | SessionStatus::AwaitingEvaluation
        )
    }

    /// Number of forced empty answers.
    pub fn timed_out_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_timeout()).count()
    }

    /// Wall-clock duration from start to end (or `now` if still running).
    pub fn duration_secs(&self, now: DateTime<Utc>) -> i64 {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).num_seconds().max(0)
    }

    /// Re-derive the countdown from timestamps.
    ///
    /// Used on every tick and on restore, so a stale serialized
    /// `remaining_ms` can never resurrect a dead countdown.
    pub fn refresh_remaining(&mut self, now: DateTime<Utc>) {
        let Some(question) = self.questions.get(self.current_index) else {
            self.timer.remaining_ms = 0;
            return;
        };
        let active = self.timer.active_elapsed_ms(now);
        self.timer.remaining_ms = question.time_limit_ms().saturating_sub(active);
    }

    /// Record an answer for the current question and advance the cursor.
    ///
    /// This is the single mutation point for the answer list, so a
    /// tick-triggered timeout and a user submission racing for the same
    /// question index cannot both land. Also rejects a time-spent value
    /// beyond the question's budget; the engine clamps before calling, so
    /// hitting that here means a caller bypassed the clamp.
    pub fn push_answer(&mut self, answer: Answer) -> Result<(), SessionError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                command: "push_answer",
                status: self.status,
            });
        }
        let question = self
            .current_question()
            .ok_or(SessionError::NoActiveSession {
                command: "push_answer",
            })?;
        let limit = question.time_limit_secs();
        if answer.time_spent_secs > limit {
            return Err(SessionError::TimeBudget {
                question_id: question.id.clone(),
                spent: answer.time_spent_secs,
                limit,
            });
        }
        // answers stays parallel to a prefix of questions: at most one
        // answer per index, appended in order.
        debug_assert_eq!(self.answers.len(), self.current_index);
        self.answers.push(answer);
        self.current_index += 1;
        Ok(())
    }

    /// Restoration validity rule for persisted sessions.
    ///
    /// Resumable iff status is in-progress or paused, the cursor is inside
    /// the question list, the list is non-empty, and the session started
    /// within the staleness window. Structural invariants are also checked
    /// because persisted data crosses a trust boundary.
    pub fn validate_restorable(
        &self,
        now: DateTime<Utc>,
        staleness_hours: i64,
    ) -> Result<(), RestoreError> {
        match self.status {
            SessionStatus::InProgress | SessionStatus::Paused => {}
            status => {
                return Err(RestoreError::NotResumable {
                    id: self.id.clone(),
                    status,
                })
            }
        }

        if self.questions.is_empty() {
            return Err(RestoreError::Malformed {
                id: self.id.clone(),
                reason: "question list is empty".into(),
            });
        }
        if self.current_index >= self.questions.len() {
            return Err(RestoreError::Malformed {
                id: self.id.clone(),
                reason: format!(
                    "cursor {} is outside the {}-question list",
                    self.current_index,
                    self.questions.len()
                ),
            });
        }
        if self.answers.len() != self.current_index {
            return Err(RestoreError::Malformed {
                id: self.id.clone(),
                reason: format!(
                    "{} answers recorded but cursor is at {}",
                    self.answers.len(),
                    self.current_index
                ),
            });
        }
        for (answer, question) in self.answers.iter().zip(&self.questions) {
            let limit = question.time_limit_secs();
            if answer.time_spent_secs > limit {
                return Err(RestoreError::Malformed {
                    id: self.id.clone(),
                    reason: format!(
                        "answer to {} spent {}s against a {}s budget",
                        question.id, answer.time_spent_secs, limit
                    ),
                });
            }
        }

        let age = now - self.start_time;
        if age > Duration::hours(staleness_hours) {
            return Err(RestoreError::Stale {
                id: self.id.clone(),
                age_hours: age.num_hours(),
                limit_hours: staleness_hours,
            });
        }

        Ok(())
    }
}
