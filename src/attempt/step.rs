use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::AttemptState;
use crate::question::Response;

/// Behaviour variable marking a step as a submit.
pub const VAR_SUBMIT: &str = "submit";
/// Behaviour variable holding the tries-left counter at grading time.
pub const VAR_TRIES_LEFT: &str = "_triesleft";
/// Behaviour variable holding the raw (pre-penalty) fraction.
pub const VAR_RAW_FRACTION: &str = "_rawfraction";
/// Behaviour variable holding a manual grader comment.
pub const VAR_COMMENT: &str = "comment";

/// How wrong-but-not-final submissions re-open the question for the
/// next try. The two modes are mutually exclusive per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// The question freezes after a wrong try; only an explicit
    /// try-again action re-opens it for editing.
    Gated,
    /// The question stays immediately editable after a wrong try.
    Inline,
}

/// An incoming action against one question attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Store the current (possibly incomplete) response without grading.
    Save { response: Response },
    /// Grade the response, consuming a try if it is wrong and not final.
    Submit { response: Response },
    /// Re-open a gated question for the next try.
    TryAgain,
    /// Force the terminal grading (time expired, exam submitted).
    Finish,
    /// Manual grader override; authoritative and terminal.
    Comment { text: String, mark: Option<f64> },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Save { .. } => ActionKind::Save,
            Action::Submit { .. } => ActionKind::Submit,
            Action::TryAgain => ActionKind::TryAgain,
            Action::Finish => ActionKind::Finish,
            Action::Comment { .. } => ActionKind::Comment,
        }
    }
}

/// The action label recorded on each committed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Save,
    Submit,
    TryAgain,
    Finish,
    Comment,
}

/// Whether an action was committed to the history or rejected.
///
/// Discards are expected control flow (submit after finish, anything but
/// try-again while gated), never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    Kept,
    Discarded,
}

impl Disposition {
    pub fn is_kept(self) -> bool {
        self == Disposition::Kept
    }
}

/// One immutable record in an attempt's audit trail.
///
/// Steps are append-only; later code only ever reads the latest relevant
/// step and never mutates past ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    pub action: ActionKind,
    pub state: AttemptState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub behaviour_vars: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Response::is_empty")]
    pub response: Response,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Step {
    /// Build an unindexed step; `Attempt::push` assigns the index.
    pub(crate) fn new(action: ActionKind, state: AttemptState) -> Self {
        Self {
            index: 0,
            action,
            state,
            fraction: None,
            behaviour_vars: BTreeMap::new(),
            response: Response::default(),
            response_summary: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn with_response(mut self, response: Response) -> Self {
        self.response = response;
        self
    }

    pub(crate) fn set_var(&mut self, name: &str, value: impl ToString) {
        self.behaviour_vars.insert(name.to_string(), value.to_string());
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.behaviour_vars.contains_key(name)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.behaviour_vars.get(name).map(String::as_str)
    }

    /// Parses the tries-left marker, if this step carries one.
    pub fn tries_left(&self) -> Option<u32> {
        self.var(VAR_TRIES_LEFT).and_then(|v| v.parse().ok())
    }

    /// Parses the raw fraction marker, if this step carries one.
    pub fn raw_fraction(&self) -> Option<f64> {
        self.var(VAR_RAW_FRACTION).and_then(|v| v.parse().ok())
    }
}

/// The full history of one learner's work on one question inside an
/// exam attempt. The ordered step sequence is the audit trail; the
/// current state is always the last step's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub question_id: String,
    pub policy: RetryPolicy,
    steps: Vec<Step>,
}

impl Attempt {
    pub fn new(question_id: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question_id: question_id.into(),
            policy,
            steps: Vec::new(),
        }
    }

    pub fn state(&self) -> AttemptState {
        self.steps
            .last()
            .map(|s| s.state)
            .unwrap_or(AttemptState::NotStarted)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The most recent response the learner entered, across all steps.
    pub fn last_response(&self) -> Response {
        self.steps
            .iter()
            .rev()
            .find(|s| !s.response.is_empty())
            .map(|s| s.response.clone())
            .unwrap_or_default()
    }

    /// The most recent step carrying a tries-left marker, i.e. the last
    /// time the response was actually graded.
    pub fn last_graded_step(&self) -> Option<&Step> {
        self.steps.iter().rev().find(|s| s.has_var(VAR_TRIES_LEFT))
    }

    pub fn has_been_graded(&self) -> bool {
        self.last_graded_step().is_some()
    }

    /// The gated sub-state: a wrong submit froze the question and only
    /// a try-again action is accepted. Holds only under the gated
    /// policy, while the state is re-attemptable, the last step was a
    /// submit, and a try remains.
    pub fn is_gated(&self, remaining: u32) -> bool {
        self.policy == RetryPolicy::Gated
            && self.state() == AttemptState::ToDo
            && self.last_step().is_some_and(|s| s.has_var(VAR_SUBMIT))
            && remaining >= 1
    }

    pub(crate) fn push(&mut self, mut step: Step) {
        step.index = self.steps.len();
        self.steps.push(step);
    }
}
