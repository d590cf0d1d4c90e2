//! Interview timer & progression engine.
//!
//! A wall-clock-based state machine with no internal threads -- the caller
//! invokes `tick()` periodically (typically a scheduled callback re-armed
//! every second, serialized with user commands on one event loop).
//!
//! ## State transitions
//!
//! ```text
//! NotStarted -> InProgress(0) -> ... -> InProgress(n-1) -> Completed
//!                   |  ^
//!                   v  |
//!                  Paused(i)
//! ```
//!
//! Progression is strictly forward: every question receives exactly one
//! answer (possibly empty, on timeout) before the session can complete.
//! Commands issued in a forbidden state return [`SessionError`] rather than
//! being silently ignored.
//!
//! Every command has an `*_at(now)` form so tests drive the clock
//! explicitly; the plain forms use `Utc::now()`.

use chrono::{DateTime, Utc};

use crate::error::SessionError;
use crate::events::Event;
use crate::question::Question;
use crate::scoring::{AnswerSink, ScoreReport};
use crate::session::{Answer, InterviewSession, SessionStatus, TimerState};

/// Tunables for tick notification throttling.
///
/// The internal countdown is always second-accurate; these only govern how
/// often a `TimerTick` event is surfaced to observers. Observable granularity
/// is a tunable, not a contract.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Emit a tick event every N remaining seconds.
    pub notify_granularity_secs: u64,
    /// At or below this many remaining seconds, emit every second.
    pub low_time_threshold_secs: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            notify_granularity_secs: 5,
            low_time_threshold_secs: 10,
        }
    }
}

/// Core interview engine. Owns at most one [`InterviewSession`] at a time.
#[derive(Debug)]
pub struct InterviewEngine {
    session: Option<InterviewSession>,
    options: EngineOptions,
    /// Remaining-seconds value at the last emitted tick, so repeated ticks
    /// within one second don't re-notify.
    last_notified_secs: Option<u64>,
}

impl Default for InterviewEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl InterviewEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            session: None,
            options,
            last_notified_secs: None,
        }
    }

    /// Adopt a restored session. The persistence layer has already applied
    /// the restoration validity rule and re-derived the countdown.
    pub fn with_session(session: InterviewSession, options: EngineOptions) -> Self {
        Self {
            session: Some(session),
            options,
            last_notified_secs: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Option<&InterviewSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(SessionStatus::NotStarted)
    }

    /// Build a full state snapshot event. Does not mutate.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        match &self.session {
            None => Event::StateSnapshot {
                status: SessionStatus::NotStarted,
                question_index: 0,
                total_questions: 0,
                answered: 0,
                remaining_secs: 0,
                at: now,
            },
            Some(session) => {
                let remaining_secs = match session.status {
                    SessionStatus::InProgress | SessionStatus::Paused => {
                        let limit = session
                            .current_question()
                            .map(|q| q.time_limit_ms())
                            .unwrap_or(0);
                        limit
                            .saturating_sub(session.timer.active_elapsed_ms(now))
                            .div_ceil(1000)
                    }
                    _ => 0,
                };
                Event::StateSnapshot {
                    status: session.status,
                    question_index: session.current_index,
                    total_questions: session.questions.len(),
                    answered: session.answers.len(),
                    remaining_secs,
                    at: now,
                }
            }
        }
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(Utc::now())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// `NotStarted -> InProgress(0)`. Requires a non-empty question list.
    pub fn start_at(
        &mut self,
        candidate_id: &str,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<Event, SessionError> {
        if let Some(session) = &self.session {
            return Err(SessionError::InvalidTransition {
                command: "start",
                status: session.status,
            });
        }
        let session = InterviewSession::new(candidate_id, questions, now)?;
        let event = Event::InterviewStarted {
            session_id: session.id.clone(),
            candidate_id: session.candidate_id.clone(),
            total_questions: session.questions.len(),
            first_time_limit_secs: session.questions[0].time_limit_secs(),
            at: now,
        };
        self.session = Some(session);
        self.last_notified_secs = None;
        Ok(event)
    }

    pub fn start(
        &mut self,
        candidate_id: &str,
        questions: Vec<Question>,
    ) -> Result<Event, SessionError> {
        self.start_at(candidate_id, questions, Utc::now())
    }

    /// Record the candidate's answer for the current question and advance.
    ///
    /// `time_spent` is elapsed active wall-clock time since the question's
    /// countdown started, defensively clamped to `[0, time_limit]`.
    pub fn submit_answer_at(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Event, SessionError> {
        let session = self
            .session
            .as_ref()
            .ok_or(SessionError::NoActiveSession {
                command: "submit_answer",
            })?;
        if session.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                command: "submit_answer",
                status: session.status,
            });
        }
        let limit = session
            .current_question()
            .map(|q| q.time_limit_secs())
            .unwrap_or(0);
        let time_spent = (session.timer.active_elapsed_ms(now) / 1000).min(limit);
        self.record_answer(text.to_string(), time_spent, false, now)
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<Event, SessionError> {
        self.submit_answer_at(text, Utc::now())
    }

    /// Forced empty answer once the budget is exhausted.
    ///
    /// Idempotent at the state level: the first call advances the cursor (or
    /// completes the session), so a second call finds either a fresh
    /// countdown (`TimeNotUp`) or a finished session (`InvalidTransition`)
    /// and cannot double-submit.
    pub fn time_up_at(&mut self, now: DateTime<Utc>) -> Result<Event, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NoActiveSession { command: "time_up" })?;
        if session.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                command: "time_up",
                status: session.status,
            });
        }
        session.refresh_remaining(now);
        if session.timer.remaining_ms > 0 {
            return Err(SessionError::TimeNotUp {
                remaining: session.timer.remaining_secs(),
            });
        }
        let limit = session
            .current_question()
            .map(|q| q.time_limit_secs())
            .unwrap_or(0);
        self.record_answer(String::new(), limit, true, now)
    }

    pub fn time_up(&mut self) -> Result<Event, SessionError> {
        self.time_up_at(Utc::now())
    }

    /// `InProgress(i) -> Paused(i)`. The countdown freezes; `remaining` is
    /// untouched.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Result<Event, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NoActiveSession { command: "pause" })?;
        if session.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                command: "pause",
                status: session.status,
            });
        }
        session.refresh_remaining(now);
        session.status = SessionStatus::Paused;
        session.timer.paused_at = Some(now);
        session.timer.is_active = false;
        Ok(Event::InterviewPaused {
            question_index: session.current_index,
            remaining_secs: session.timer.remaining_secs(),
            at: now,
        })
    }

    pub fn pause(&mut self) -> Result<Event, SessionError> {
        self.pause_at(Utc::now())
    }

    /// `Paused(i) -> InProgress(i)`. The paused gap is added to the
    /// (monotone) total and the countdown resumes from the same remaining.
    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Result<Event, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NoActiveSession { command: "resume" })?;
        if session.status != SessionStatus::Paused {
            return Err(SessionError::InvalidTransition {
                command: "resume",
                status: session.status,
            });
        }
        if let Some(paused_at) = session.timer.paused_at.take() {
            let gap = (now - paused_at).num_milliseconds().max(0) as u64;
            session.timer.question_paused_ms += gap;
            session.timer.total_paused_ms += gap;
        }
        session.status = SessionStatus::InProgress;
        session.timer.is_active = true;
        session.refresh_remaining(now);
        Ok(Event::InterviewResumed {
            question_index: session.current_index,
            remaining_secs: session.timer.remaining_secs(),
            at: now,
        })
    }

    pub fn resume(&mut self) -> Result<Event, SessionError> {
        self.resume_at(Utc::now())
    }

    /// Discard the session and timer entirely, from any state.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Event {
        self.session = None;
        self.last_notified_secs = None;
        Event::InterviewReset { at: now }
    }

    pub fn reset(&mut self) -> Event {
        self.reset_at(Utc::now())
    }

    /// Periodic pulse. No-op unless a countdown is running.
    ///
    /// Fires the timeout transition exactly once when the budget is
    /// exhausted; otherwise emits a throttled `TimerTick` at the configured
    /// granularity (and every second near zero).
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let session = self.session.as_mut()?;
        if session.status != SessionStatus::InProgress || !session.timer.is_active {
            return None;
        }
        session.refresh_remaining(now);
        if session.timer.remaining_ms == 0 {
            let limit = session
                .current_question()
                .map(|q| q.time_limit_secs())
                .unwrap_or(0);
            return self.record_answer(String::new(), limit, true, now).ok();
        }

        let secs = session.timer.remaining_secs();
        let due = secs % self.options.notify_granularity_secs.max(1) == 0
            || secs <= self.options.low_time_threshold_secs;
        if due && self.last_notified_secs != Some(secs) {
            self.last_notified_secs = Some(secs);
            return Some(Event::TimerTick {
                question_index: session.current_index,
                remaining_secs: secs,
                at: now,
            });
        }
        None
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    /// Hand a completed session to a scoring sink.
    ///
    /// `Completed -> AwaitingEvaluation`. The engine guarantees the answer
    /// list is complete and ordered; it does not wait on scoring beyond the
    /// synchronous sink call.
    pub fn hand_off_at(
        &mut self,
        sink: &dyn AnswerSink,
        now: DateTime<Utc>,
    ) -> Result<ScoreReport, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NoActiveSession { command: "hand_off" })?;
        if session.status != SessionStatus::Completed {
            return Err(SessionError::InvalidTransition {
                command: "hand_off",
                status: session.status,
            });
        }
        session.status = SessionStatus::AwaitingEvaluation;
        Ok(sink.deliver(session, now))
    }

    pub fn hand_off(&mut self, sink: &dyn AnswerSink) -> Result<ScoreReport, SessionError> {
        self.hand_off_at(sink, Utc::now())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Single answer-recording path shared by submit, time-up, and tick.
    fn record_answer(
        &mut self,
        text: String,
        time_spent_secs: u64,
        timed_out: bool,
        now: DateTime<Utc>,
    ) -> Result<Event, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NoActiveSession {
                command: "record_answer",
            })?;
        let question_index = session.current_index;
        let question_id = session
            .current_question()
            .map(|q| q.id.clone())
            .unwrap_or_default();
        let time_limit_secs = session
            .current_question()
            .map(|q| q.time_limit_secs())
            .unwrap_or(0);

        session.push_answer(Answer {
            question_id: question_id.clone(),
            text,
            time_spent_secs,
            timestamp: now,
        })?;
        self.last_notified_secs = None;

        if let Some(next) = session.questions.get(session.current_index).cloned() {
            // Fresh full countdown; the pause total carries across questions.
            let total_paused_ms = session.timer.total_paused_ms;
            session.timer = TimerState::for_question(&next, now);
            session.timer.total_paused_ms = total_paused_ms;

            let event = if timed_out {
                Event::QuestionTimedOut {
                    question_index,
                    question_id,
                    time_limit_secs,
                    next_time_limit_secs: next.time_limit_secs(),
                    at: now,
                }
            } else {
                Event::AnswerSubmitted {
                    question_index,
                    question_id,
                    time_spent_secs,
                    next_time_limit_secs: next.time_limit_secs(),
                    at: now,
                }
            };
            return Ok(event);
        }

        session.status = SessionStatus::Completed;
        session.end_time = Some(now);
        session.timer.is_active = false;
        session.timer.remaining_ms = 0;
        Ok(Event::InterviewCompleted {
            session_id: session.id.clone(),
            total_questions: session.questions.len(),
            timed_out_answers: session.timed_out_count(),
            duration_secs: session.duration_secs(now),
            at: now,
        })
    }
}
