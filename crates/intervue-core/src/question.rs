//! Questions, difficulty levels, and the built-in question bank.
//!
//! A question's time budget is derived from its difficulty through a fixed
//! lookup (easy=20s, medium=60s, hard=120s). The bank draws a fixed quota per
//! difficulty with a seedable PCG generator so draws are reproducible.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidate::CandidateProfile;
use crate::error::CoreError;

/// Question difficulty. Closed set -- anything else is rejected at the
/// deserialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Time budget in seconds: easy=20, medium=60, hard=120.
    pub fn time_limit_secs(self) -> u64 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 60,
            Difficulty::Hard => 120,
        }
    }

    /// Time budget in milliseconds.
    pub fn time_limit_ms(self) -> u64 {
        self.time_limit_secs() * 1000
    }

    /// Weight used when aggregating per-question scores.
    pub fn weight(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// One interview question. Immutable once drawn; owned by the session that
/// requested it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub difficulty: Difficulty,
    pub category: String,
    /// 1-based position within the drawn sequence.
    pub order: u32,
}

impl Question {
    pub fn time_limit_secs(&self) -> u64 {
        self.difficulty.time_limit_secs()
    }

    pub fn time_limit_ms(&self) -> u64 {
        self.difficulty.time_limit_ms()
    }
}

/// How many questions to draw per difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPlan {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl QuestionPlan {
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }

    fn quota(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for QuestionPlan {
    fn default() -> Self {
        Self {
            easy: 2,
            medium: 2,
            hard: 2,
        }
    }
}

/// Supplies an ordered question sequence for one candidate.
///
/// Implementations must return a non-empty list with `order` numbered 1..=n.
pub trait QuestionSource {
    fn draw(&self, profile: &CandidateProfile) -> Result<Vec<Question>, CoreError>;
}

/// Built-in full-stack question bank.
///
/// Draws easy questions first, then medium, then hard, so the interview ramps
/// up in difficulty the way the candidate expects.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    plan: QuestionPlan,
    seed: Option<u64>,
}

/// (text, difficulty, category)
const BANK: &[(&str, Difficulty, &str)] = &[
    (
        "What is the difference between `let` and `const` in JavaScript?",
        Difficulty::Easy,
        "javascript",
    ),
    (
        "Explain what a React component is and how props flow between components.",
        Difficulty::Easy,
        "react",
    ),
    (
        "What does the HTTP status code 404 mean, and how does it differ from 500?",
        Difficulty::Easy,
        "http",
    ),
    (
        "What is the purpose of a package.json file in a Node.js project?",
        Difficulty::Easy,
        "node",
    ),
    (
        "Describe how React's useState and useEffect hooks work and when you would reach for each.",
        Difficulty::Medium,
        "react",
    ),
    (
        "How does the Node.js event loop handle asynchronous I/O? Walk through what happens when a request arrives.",
        Difficulty::Medium,
        "node",
    ),
    (
        "Compare REST and GraphQL APIs. When would you choose one over the other?",
        Difficulty::Medium,
        "api-design",
    ),
    (
        "What is a database index, and what trade-offs does adding one involve?",
        Difficulty::Medium,
        "database",
    ),
    (
        "Design a rate limiter for a public API. Discuss the algorithm, storage, and failure modes.",
        Difficulty::Hard,
        "system-design",
    ),
    (
        "How would you diagnose and fix a memory leak in a long-running Node.js service?",
        Difficulty::Hard,
        "node",
    ),
    (
        "Explain how you would structure state management in a large React application, and how you would keep renders cheap.",
        Difficulty::Hard,
        "react",
    ),
    (
        "Walk through designing a URL shortener that must survive a single-region outage.",
        Difficulty::Hard,
        "system-design",
    ),
];

impl QuestionBank {
    pub fn new(plan: QuestionPlan) -> Self {
        Self { plan, seed: None }
    }

    /// Deterministic draws for tests and reproducible interviews.
    pub fn with_seed(plan: QuestionPlan, seed: u64) -> Self {
        Self {
            plan,
            seed: Some(seed),
        }
    }

    fn rng(&self) -> Pcg64 {
        match self.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        }
    }

    fn pool(difficulty: Difficulty) -> Vec<(&'static str, Difficulty, &'static str)> {
        BANK.iter()
            .filter(|(_, d, _)| *d == difficulty)
            .copied()
            .collect()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(QuestionPlan::default())
    }
}

impl QuestionSource for QuestionBank {
    fn draw(&self, _profile: &CandidateProfile) -> Result<Vec<Question>, CoreError> {
        if self.plan.total() == 0 {
            return Err(crate::error::SessionError::EmptyQuestionList.into());
        }

        let mut rng = self.rng();
        let mut questions = Vec::with_capacity(self.plan.total());
        let mut order = 1u32;

        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let quota = self.plan.quota(difficulty);
            if quota == 0 {
                continue;
            }
            let pool = Self::pool(difficulty);
            if pool.len() < quota {
                return Err(CoreError::Custom(format!(
                    "question bank has only {} {difficulty} questions, plan needs {quota}",
                    pool.len()
                )));
            }
            for &(text, difficulty, category) in pool.choose_multiple(&mut rng, quota) {
                questions.push(Question {
                    id: Uuid::new_v4().to_string(),
                    text: text.to_string(),
                    difficulty,
                    category: category.to_string(),
                    order,
                });
                order += 1;
            }
        }

        Ok(questions)
    }
}
