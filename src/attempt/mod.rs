mod state;
mod step;

pub use state::AttemptState;
pub use step::{
    Action, ActionKind, Attempt, Disposition, RetryPolicy, Step, VAR_COMMENT, VAR_RAW_FRACTION,
    VAR_SUBMIT, VAR_TRIES_LEFT,
};
