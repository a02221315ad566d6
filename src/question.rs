//! The question-grading collaborator boundary.
//!
//! The engine never inspects response payloads itself; completeness,
//! gradability, correctness and the fraction→state banding all belong to
//! the [`Question`] implementation. Two concrete implementations are
//! provided for the CLI, scenarios and tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attempt::AttemptState;

/// Tolerance for full/zero credit in the default banding, matching the
/// near-0/near-1 convention of automatic graders.
const FULL_CREDIT_EPSILON: f64 = 1e-7;

/// The raw per-question response payload: named form fields and their
/// values. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response(BTreeMap<String, String>);

impl Response {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

/// What the engine needs from a question implementation.
pub trait Question {
    /// Whether the response is complete enough to be submitted for
    /// grading. Incomplete submits become `Invalid` steps.
    fn is_complete_response(&self, response: &Response) -> bool;

    /// Whether the response can be graded at all. A finish action on an
    /// ungradable response gives up instead of grading.
    fn is_gradable_response(&self, response: &Response) -> bool {
        self.is_complete_response(response)
    }

    /// Grade the response, returning the raw correctness fraction in
    /// `[0, 1]` and the corresponding graded state.
    fn grade_response(&self, response: &Response) -> (f64, AttemptState);

    /// A short human-readable rendering of the response for the audit
    /// trail.
    fn summarise_response(&self, response: &Response) -> String;

    /// The fraction→state banding. Owned by the question implementation;
    /// the engine never invents its own thresholds.
    fn state_for_fraction(&self, fraction: f64) -> AttemptState {
        if fraction > 1.0 - FULL_CREDIT_EPSILON {
            AttemptState::GradedRight
        } else if fraction < FULL_CREDIT_EPSILON {
            AttemptState::GradedWrong
        } else {
            AttemptState::GradedPartial
        }
    }

    /// Whether the question supports the inline multiple-tries style.
    /// When true the engine runs the inline retry policy, otherwise the
    /// gated one.
    fn supports_inline_retries(&self) -> bool {
        false
    }
}

/// All-or-nothing question graded by trimmed string equality against a
/// single expected answer in the `answer` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactMatchQuestion {
    pub answer: String,
    #[serde(default)]
    pub inline_retries: bool,
}

impl ExactMatchQuestion {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            inline_retries: false,
        }
    }
}

impl Question for ExactMatchQuestion {
    fn is_complete_response(&self, response: &Response) -> bool {
        response.get("answer").is_some_and(|a| !a.trim().is_empty())
    }

    fn grade_response(&self, response: &Response) -> (f64, AttemptState) {
        let given = response.get("answer").unwrap_or_default();
        let fraction = if given.trim() == self.answer.trim() {
            1.0
        } else {
            0.0
        };
        (fraction, self.state_for_fraction(fraction))
    }

    fn summarise_response(&self, response: &Response) -> String {
        response.get("answer").unwrap_or_default().trim().to_string()
    }

    fn supports_inline_retries(&self) -> bool {
        self.inline_retries
    }
}

/// Partial-credit question: the fraction is the share of expected
/// keywords present in the `answer` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordQuestion {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub inline_retries: bool,
}

impl Question for KeywordQuestion {
    fn is_complete_response(&self, response: &Response) -> bool {
        response.get("answer").is_some_and(|a| !a.trim().is_empty())
    }

    fn grade_response(&self, response: &Response) -> (f64, AttemptState) {
        let given = response.get("answer").unwrap_or_default().to_lowercase();
        if self.keywords.is_empty() {
            return (0.0, self.state_for_fraction(0.0));
        }
        let hits = self
            .keywords
            .iter()
            .filter(|k| given.contains(&k.to_lowercase()))
            .count();
        let fraction = hits as f64 / self.keywords.len() as f64;
        (fraction, self.state_for_fraction(fraction))
    }

    fn summarise_response(&self, response: &Response) -> String {
        response.get("answer").unwrap_or_default().trim().to_string()
    }

    fn supports_inline_retries(&self) -> bool {
        self.inline_retries
    }
}
