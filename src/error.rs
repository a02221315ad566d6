use thiserror::Error;

/// Fatal failures of the grading engine.
///
/// Expected rejections (submit after finish, anything but try-again while
/// gated) are not errors; they surface as
/// [`Disposition::Discarded`](crate::attempt::Disposition).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("question {question_id} not found in quiz {quiz_id}")]
    QuestionNotFound {
        quiz_id: String,
        question_id: String,
    },

    #[error("invalid question configuration: {0}")]
    InvalidConfig(String),

    #[error("tries store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failures of a `TriesStore` adapter. A write failure aborts the action
/// that triggered it; no step is committed on top of a failed write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read tries record: {0}")]
    Read(String),

    #[error("failed to write tries record: {0}")]
    Write(String),
}
