use std::fmt;

use serde::{Deserialize, Serialize};

/// The states a question attempt moves through while being graded.
///
/// An attempt starts in `NotStarted`, becomes active (`ToDo`, `Invalid`,
/// `Complete`) while the learner is working, and ends in one of the
/// finished states: the automatically graded family (`GradedRight`,
/// `GradedPartial`, `GradedWrong`), `GaveUp`, or the manually commented
/// family set by a grader override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptState {
    NotStarted,
    /// The last submitted response was incomplete and could not be graded.
    Invalid,
    /// Editable; the learner still has (or regained) the ability to answer.
    ToDo,
    /// A complete response has been saved but not yet graded.
    Complete,
    GradedRight,
    GradedPartial,
    GradedWrong,
    /// Finished without a gradable response.
    GaveUp,
    CommentedRight,
    CommentedPartial,
    CommentedWrong,
}

impl AttemptState {
    /// Whether the learner can still interact with the question.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            AttemptState::Invalid | AttemptState::ToDo | AttemptState::Complete
        )
    }

    /// Whether this is a terminal grading outcome. Once finished, no
    /// submit, save or try-again action may mutate the mark.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            AttemptState::GradedRight
                | AttemptState::GradedPartial
                | AttemptState::GradedWrong
                | AttemptState::GaveUp
                | AttemptState::CommentedRight
                | AttemptState::CommentedPartial
                | AttemptState::CommentedWrong
        )
    }

    /// Whether a grader set this state through a manual comment override.
    pub fn is_commented(self) -> bool {
        matches!(
            self,
            AttemptState::CommentedRight
                | AttemptState::CommentedPartial
                | AttemptState::CommentedWrong
        )
    }

    /// The commented counterpart of a graded state, used when a manual
    /// comment carries a mark.
    pub fn commented(self) -> AttemptState {
        match self {
            AttemptState::GradedRight => AttemptState::CommentedRight,
            AttemptState::GradedPartial => AttemptState::CommentedPartial,
            AttemptState::GradedWrong => AttemptState::CommentedWrong,
            other => other,
        }
    }

    /// Default human-readable description, with correctness optionally
    /// hidden (hosts hide it while an exam is still running).
    pub fn describe(self, show_correctness: bool) -> &'static str {
        if !show_correctness && self.is_finished() {
            return "Answer saved";
        }
        match self {
            AttemptState::NotStarted => "Not yet answered",
            AttemptState::Invalid => "Incomplete answer",
            AttemptState::ToDo => "Not complete",
            AttemptState::Complete => "Answer saved",
            AttemptState::GradedRight | AttemptState::CommentedRight => "Correct",
            AttemptState::GradedPartial | AttemptState::CommentedPartial => "Partially correct",
            AttemptState::GradedWrong | AttemptState::CommentedWrong => "Incorrect",
            AttemptState::GaveUp => "Not answered",
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttemptState::NotStarted => "notstarted",
            AttemptState::Invalid => "invalid",
            AttemptState::ToDo => "todo",
            AttemptState::Complete => "complete",
            AttemptState::GradedRight => "gradedright",
            AttemptState::GradedPartial => "gradedpartial",
            AttemptState::GradedWrong => "gradedwrong",
            AttemptState::GaveUp => "gaveup",
            AttemptState::CommentedRight => "commentedright",
            AttemptState::CommentedPartial => "commentedpartial",
            AttemptState::CommentedWrong => "commentedwrong",
        };
        write!(f, "{name}")
    }
}
