//! Rule-based answer scoring.
//!
//! The engine hands a completed session to an [`AnswerSink`] and never waits
//! on the result. The built-in [`HeuristicScorer`] is deliberately simple
//! arithmetic -- answer-length tiers plus keyword hits per category --
//! because evaluation quality is out of scope; the progression engine only
//! guarantees the answer list it delivers is complete and ordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::InterviewSession;

/// Default pass mark on the 0-100 weighted total.
pub const DEFAULT_PASS_MARK: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: String,
    /// 0-100.
    pub score: u32,
    pub keyword_hits: u32,
    pub timed_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub session_id: String,
    pub candidate_id: String,
    pub per_question: Vec<QuestionScore>,
    /// Difficulty-weighted 0-100 total.
    pub total: u32,
    pub passed: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// Receives a completed, ordered answer list and produces a score.
pub trait AnswerSink {
    fn deliver(&self, session: &InterviewSession, now: DateTime<Utc>) -> ScoreReport;
}

/// Keyword/length heuristic scorer.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    pass_mark: u32,
}

/// (category, keywords)
const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "javascript",
        &["scope", "hoisting", "block", "reassign", "immutable"],
    ),
    (
        "react",
        &["state", "props", "render", "hook", "component", "effect"],
    ),
    (
        "node",
        &["event loop", "callback", "async", "non-blocking", "dependencies", "module"],
    ),
    ("http", &["client", "server", "not found", "status"]),
    (
        "api-design",
        &["endpoint", "schema", "query", "overfetch", "versioning", "cache"],
    ),
    (
        "database",
        &["b-tree", "lookup", "write", "storage", "query plan"],
    ),
    (
        "system-design",
        &["scale", "shard", "replica", "throughput", "latency", "failover", "token bucket"],
    ),
];

impl HeuristicScorer {
    pub fn new(pass_mark: u32) -> Self {
        Self { pass_mark }
    }

    fn keyword_hits(category: &str, answer: &str) -> u32 {
        let answer = answer.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, words)| words.iter().filter(|w| answer.contains(**w)).count() as u32)
            .unwrap_or(0)
    }

    fn length_base(answer: &str) -> u32 {
        let len = answer.trim().chars().count();
        match len {
            0 => 0,
            1..=19 => 20,
            20..=79 => 45,
            80..=199 => 70,
            _ => 80,
        }
    }

    fn score_answer(category: &str, answer: &str) -> (u32, u32) {
        if answer.trim().is_empty() {
            return (0, 0);
        }
        let hits = Self::keyword_hits(category, answer);
        let score = (Self::length_base(answer) + hits * 5).min(100);
        (score, hits)
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_MARK)
    }
}

impl AnswerSink for HeuristicScorer {
    fn deliver(&self, session: &InterviewSession, now: DateTime<Utc>) -> ScoreReport {
        let mut per_question = Vec::with_capacity(session.answers.len());
        let mut weighted_sum = 0u64;
        let mut weight_total = 0u64;

        for (question, answer) in session.questions.iter().zip(&session.answers) {
            let (score, keyword_hits) = Self::score_answer(&question.category, &answer.text);
            let weight = question.difficulty.weight() as u64;
            weighted_sum += score as u64 * weight;
            weight_total += weight;
            per_question.push(QuestionScore {
                question_id: question.id.clone(),
                score,
                keyword_hits,
                timed_out: answer.is_timeout(),
            });
        }

        let total = if weight_total == 0 {
            0
        } else {
            (weighted_sum / weight_total) as u32
        };

        ScoreReport {
            session_id: session.id.clone(),
            candidate_id: session.candidate_id.clone(),
            per_question,
            total,
            passed: total >= self.pass_mark,
            evaluated_at: now,
        }
    }
}
