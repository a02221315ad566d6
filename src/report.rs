//! Presentation-ready mark snapshots derived from the step history.
//!
//! The reporter only reads committed steps; it never mutates the attempt
//! and its output is recomputed on demand, never stored.

use serde::{Deserialize, Serialize};

use crate::attempt::{Attempt, AttemptState};
use crate::config::QuestionConfig;
use crate::question::Question;

/// Derived mark snapshot for one question attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDetails {
    /// Displayed state: the commented state when a grader overrode the
    /// attempt, otherwise the banding of the last graded raw fraction.
    pub state: AttemptState,
    pub max_mark: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_penalty: Option<f64>,
    /// Whether the learner can still improve the mark (the overall state
    /// is the re-attemptable one).
    pub improvable: bool,
}

impl MarkDetails {
    fn not_yet_graded(max_mark: f64, improvable: bool) -> Self {
        Self {
            state: AttemptState::ToDo,
            max_mark,
            actual_mark: None,
            raw_mark: None,
            current_penalty: None,
            total_penalty: None,
            improvable,
        }
    }
}

/// Summarize the attempt's marks from its most recent graded step.
pub fn mark_details<Q: Question + ?Sized>(
    question: &Q,
    config: &QuestionConfig,
    attempt: &Attempt,
) -> MarkDetails {
    let overall = attempt.state();
    let improvable = overall == AttemptState::ToDo;

    let Some(graded) = attempt.last_graded_step() else {
        return MarkDetails::not_yet_graded(config.max_mark, improvable);
    };
    if config.max_mark <= 0.0 {
        return MarkDetails::not_yet_graded(config.max_mark, improvable);
    }

    let raw = graded.raw_fraction().unwrap_or(0.0);
    let tries_left = graded.tries_left().unwrap_or(config.total_tries);

    // A manual comment is authoritative for both the displayed state and
    // the awarded fraction; otherwise the display state is the banding
    // of the raw fraction and the fraction comes from the graded step.
    let (state, fraction) = if overall.is_commented() {
        let overridden = attempt
            .steps()
            .iter()
            .rev()
            .find_map(|s| s.fraction)
            .unwrap_or(0.0);
        (overall, overridden)
    } else {
        (
            question.state_for_fraction(raw),
            graded.fraction.unwrap_or(0.0),
        )
    };

    let current_penalty = config.penalty_per_try * config.max_mark;
    let tries_used = config.total_tries.saturating_sub(tries_left);

    MarkDetails {
        state,
        max_mark: config.max_mark,
        actual_mark: Some(fraction * config.max_mark),
        raw_mark: Some(raw * config.max_mark),
        current_penalty: Some(current_penalty),
        total_penalty: Some(current_penalty * tries_used as f64),
        improvable,
    }
}
