use thiserror::Error;

/// Failure of a call to the LlamaStack server.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StackError {
    /// Connection refused, DNS failure, malformed URL, ...
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl StackError {
    /// Registration conflicts are only reported as text by the server.
    pub fn is_already_exists(&self) -> bool {
        self.to_string().to_lowercase().contains("already exists")
    }
}

impl From<reqwest::Error> for StackError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StackError::Decode(err.to_string())
        } else {
            StackError::Transport(err.to_string())
        }
    }
}
