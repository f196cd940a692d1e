//! Remote processor errors

use thiserror::Error;

/// Failures reported by, or while talking to, the remote processor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteProcessorError {
    /// The processor answered with an error body
    #[error("{message}")]
    Rejected {
        /// Processor error code
        code: i64,
        /// Processor error category (1 = declined, 2 = bad request, 3 = auth, 4 = system)
        category: i64,
        message: String,
        http_status: u16,
    },

    /// The request never produced a processor answer
    #[error("Transport error: {0}")]
    Transport(String),

    /// The processor answered with something unparseable
    #[error("Unexpected processor response: {0}")]
    Decode(String),

    /// Client construction failed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RemoteProcessorError {
    /// Returns the processor's message text
    pub fn message(&self) -> String {
        match self {
            RemoteProcessorError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the processor's error code, when it sent one
    pub fn code(&self) -> Option<String> {
        match self {
            RemoteProcessorError::Rejected { code, .. } => Some(code.to_string()),
            _ => None,
        }
    }

    /// Returns true when the processor declined the card itself
    pub fn is_decline(&self) -> bool {
        matches!(self, RemoteProcessorError::Rejected { category: 1, .. })
    }

    pub fn is_transient(&self) -> bool {
        match self {
            RemoteProcessorError::Transport(_) => true,
            RemoteProcessorError::Rejected { http_status, .. } => *http_status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RemoteProcessorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteProcessorError::Decode(err.to_string())
        } else {
            RemoteProcessorError::Transport(err.to_string())
        }
    }
}
