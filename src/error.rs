use std::io;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Malformed or truncated pkt-line header or payload.
    #[error("ERR - Framing: {0}")]
    Framing(String),

    /// The advertisement has nothing usable in it.
    #[error("ERR - Protocol: {0}")]
    Protocol(String),

    /// A commit-ish matched no advertised ref.
    #[error("ERR - NotFound: {0}")]
    NotFound(String),

    #[error("ERR - Io: {0}")]
    Io(#[from] io::Error),

    #[error("ERR - Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("ERR - Template: {0}")]
    Template(#[from] askama::Error),

    #[error("ERR - Http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ERR - Other: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Self::Other(anyhow::anyhow!("{value}"))
    }
}
