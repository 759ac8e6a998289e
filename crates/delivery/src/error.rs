use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("AppleScript missing: {path}")]
    ScriptMissing { path: PathBuf },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("delivery to {handle} timed out after {timeout_secs}s")]
    TimedOut { handle: String, timeout_secs: u64 },

    #[error("delivery to {handle} was rejected ({status}): {detail}")]
    Rejected {
        handle: String,
        status: String,
        detail: String,
    },
}

impl DeliveryError {
    #[must_use]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    #[must_use]
    pub fn wait(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Wait {
            program: program.into(),
            source,
        }
    }

    /// Short status text shown next to a failed recipient.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Rejected { detail, .. } if !detail.is_empty() => detail.clone(),
            Self::Rejected { status, .. } if status == "exit_code=0" => "no status reported".to_string(),
            Self::Rejected { status, .. } => status.clone(),
            Self::TimedOut { timeout_secs, .. } => format!("timeout after {timeout_secs}s"),
            other => other.to_string(),
        }
    }
}
