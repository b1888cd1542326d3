use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotesError>;

/// Failures the panel can observe. None of them are fatal: the panel keeps
/// running in memory and reports them through the status bar and the log.
#[derive(Debug, Error)]
pub enum NotesError {
    #[error("storage unavailable for '{key}': {reason}")]
    StoreUnavailable { key: String, reason: String },

    #[error("could not decode image: {0}")]
    ImageDecodeFailed(String),

    #[error("'{0}' is not in the note palette")]
    InvalidColor(String),

    #[error("no note with id '{0}'")]
    UnknownId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NotesError {
    pub fn store(key: &str, reason: impl ToString) -> Self {
        Self::StoreUnavailable {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
