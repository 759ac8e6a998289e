use thiserror::Error;

pub const USAGE: &str = "Usage: fimg [-y|--skip] [--dry-run] [LIST] [to] <targets> : <message>";

#[derive(Debug, Error)]
pub enum FimgError {
    #[error("{USAGE}")]
    Usage,

    #[error("terminal I/O failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("no recipients resolved")]
    NoRecipients,
}

impl FimgError {
    /// Process exit status for errors that end the run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage => 2,
            Self::NoRecipients => 3,
            Self::Terminal(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FimgError>;
