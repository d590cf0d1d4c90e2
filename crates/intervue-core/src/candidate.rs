//! Candidate profile extraction from pasted resume text.
//!
//! Heuristics only: a regex pass for email and phone, and a
//! first-plausible-line scan for the name. Extraction accuracy is out of
//! scope; whatever is missing gets collected interactively before the
//! interview starts.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";
const PHONE_PATTERN: &str = r"(?:\+?\d{1,3}[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4}";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).unwrap())
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).unwrap())
}

/// Contact fields pulled out of resume text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CandidateProfile {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Best-effort extraction from plain resume text.
    pub fn from_resume_text(text: &str) -> Self {
        Self {
            name: extract_name(text),
            email: email_re().find(text).map(|m| m.as_str().to_string()),
            phone: phone_re().find(text).map(|m| m.as_str().to_string()),
        }
    }

    /// Fields still needed before an interview can start.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.phone.is_none() {
            missing.push("phone");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Stable identifier for session records: email first, then name.
    pub fn display_id(&self) -> String {
        self.email
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// First non-empty line that looks like a person's name: a few words, no
/// digits, no email.
fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(5)
        .find(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            (1..=4).contains(&words.len())
                && !line.contains('@')
                && !line.chars().any(|c| c.is_ascii_digit())
                && words
                    .iter()
                    .all(|w| w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '-'))
        })
        .map(str::to_string)
}
