// murmelbot-common/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed rule or bad settings detected at boot. Fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// A chat transport call failed (send, join, part).
    #[error("Platform error: {0}")]
    Platform(String),

    /// A state/repository collaborator call failed.
    #[error("State error: {0}")]
    State(String),

    /// A rule handler's business logic failed.
    #[error("Handler error: {0}")]
    Handler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Handler(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Handler(s.to_string())
    }
}
