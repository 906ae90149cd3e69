use thiserror::Error;

// Terminal for the turn that produced it; never retried
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API Error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Parse(String),
}

impl CompletionError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Transport(err.to_string())
        }
    }

    // Text stored as the assistant reply
    pub fn reply(&self) -> String {
        match self {
            CompletionError::Http { .. } => format!("Sorry, I encountered an error: {}", self),
            CompletionError::Timeout => "Sorry, the request timed out. Please try again.".to_string(),
            CompletionError::Transport(cause) => {
                format!("Sorry, I encountered a network error: {}", cause)
            }
            CompletionError::Parse(detail) => {
                format!("Sorry, I encountered an unexpected error: {}", detail)
            }
        }
    }
}
