use std::path::PathBuf;

/// Convenient result alias for fixture server operations.
pub type Result<T> = std::result::Result<T, FixtureServerError>;

/// Errors surfaced to the code driving the fixture server.
#[derive(thiserror::Error, Debug)]
pub enum FixtureServerError {
    /// The deadline passed before the awaited event arrived.
    #[error("timed out waiting for {waiting_for}")]
    TimedOut {
        /// What the caller was waiting for.
        waiting_for: &'static str,
    },
    /// The server was stopped while a caller was waiting.
    #[error("server killed while waiting for {waiting_for}")]
    ServerStopped {
        /// What the caller was waiting for.
        waiting_for: &'static str,
    },
    /// The signing key could not be read from disk.
    #[error("failed to read private key at {path:?}: {source}")]
    KeyRead {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The signing key was not a PEM encoded RSA private key.
    #[error("invalid RSA private key: {0}")]
    KeyParse(String),
    /// RSA signing failed.
    #[error("signing failed: {0}")]
    Signing(#[from] rsa::Error),
    /// A payload could not be rendered to JSON.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    /// A dictionary member cannot be expressed as an RFC 8941 structured field.
    #[error("invalid structured field: {0}")]
    StructuredField(String),
    /// The listener could not be bound.
    #[error("failed to bind fixture server on port {port}: {source}")]
    Bind {
        /// Requested port.
        port: u16,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Failed to perform an I/O operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixtureServerError {
    /// Whether a wait ended because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FixtureServerError::TimedOut { .. })
    }

    /// Whether a wait ended because the server was stopped.
    pub fn is_stopped(&self) -> bool {
        matches!(self, FixtureServerError::ServerStopped { .. })
    }
}
