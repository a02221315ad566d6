//! Question configuration, set by exam authoring and read-only to the
//! engine.
//!
//! A [`QuizBank`] file maps quiz and question identifiers to their
//! [`QuestionConfig`]. Values not present use defaults; a lookup miss is
//! a fatal error for that question attempt, never silently defaulted.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Per-question grading parameters. Immutable per question instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionConfig {
    /// Total submits allowed before the question is force-graded.
    #[serde(default = "default_total_tries")]
    pub total_tries: u32,

    /// Fractional deduction per try already consumed, in `[0, 1]`.
    #[serde(default)]
    pub penalty_per_try: f64,

    /// The mark a fully correct first-try answer earns.
    #[serde(default = "default_max_mark")]
    pub max_mark: f64,
}

// Default total tries: 1 (a single submit, no retry machinery).
fn default_total_tries() -> u32 {
    1
}

// Default maximum mark: 1.0.
fn default_max_mark() -> f64 {
    1.0
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            total_tries: default_total_tries(),
            penalty_per_try: 0.0,
            max_mark: default_max_mark(),
        }
    }
}

impl QuestionConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.total_tries < 1 {
            return Err(EngineError::InvalidConfig(
                "total_tries must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.penalty_per_try) {
            return Err(EngineError::InvalidConfig(format!(
                "penalty_per_try must be in [0, 1], got {}",
                self.penalty_per_try
            )));
        }
        if !self.max_mark.is_finite() || self.max_mark < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "max_mark must be a non-negative number, got {}",
                self.max_mark
            )));
        }
        Ok(())
    }
}

/// Authoring-side registry of question configurations, keyed by quiz id
/// then question id, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizBank {
    #[serde(default)]
    quiz: Vec<QuizEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuizEntry {
    id: String,
    #[serde(default)]
    question: Vec<QuestionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionEntry {
    id: String,
    #[serde(flatten)]
    config: QuestionConfig,
}

impl QuizBank {
    /// Parse a bank from TOML text, validating every question entry.
    pub fn parse(contents: &str) -> Result<Self, EngineError> {
        let bank: QuizBank = toml::from_str(contents)?;
        for quiz in &bank.quiz {
            for question in &quiz.question {
                question.config.validate()?;
            }
        }
        Ok(bank)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Look up the configuration for a question inside a quiz. A miss
    /// indicates data corruption or misconfiguration and is fatal.
    pub fn question_config(
        &self,
        quiz_id: &str,
        question_id: &str,
    ) -> Result<&QuestionConfig, EngineError> {
        self.quiz
            .iter()
            .find(|q| q.id == quiz_id)
            .and_then(|quiz| quiz.question.iter().find(|q| q.id == question_id))
            .map(|q| &q.config)
            .ok_or_else(|| EngineError::QuestionNotFound {
                quiz_id: quiz_id.to_string(),
                question_id: question_id.to_string(),
            })
    }
}
