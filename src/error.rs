//! # error
//!
//! Session error type

use std::io;

use remotefs::RemoteError;
use thiserror::Error;

/// Result returned by session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the session facade and the location parser
#[derive(Debug, Error)]
pub enum SessionError {
    /// The `smb://` URI doesn't match the location grammar
    #[error("malformed smb location: {0}")]
    MalformedLocation(String),
    /// An operation required a path or a share, but none was given nor configured
    #[error("missing destination: {0}")]
    MissingDestination(&'static str),
    /// The collaborator failed to open a session with the server
    #[error("could not connect to {host}:{port}: {source}")]
    ConnectionFailure {
        host: String,
        port: u16,
        #[source]
        source: RemoteError,
    },
    /// Every store attempt failed; `source` is the error of the last one
    #[error("transfer failed after {attempts} attempt(s): {source}")]
    TransferFailed {
        attempts: u32,
        #[source]
        source: RemoteError,
    },
    /// Strict existence check: the configured share is not advertised
    #[error("share {0} does not exist on the server")]
    ShareNotFound(String),
    /// Strict existence check: the configured file is not on the server
    #[error("file {0} does not exist on the server")]
    FileNotFound(String),
    /// Error reported by the SMB collaborator
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// Local I/O error
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    /// Returns the collaborator error carried by this error, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::ConnectionFailure { source, .. } | Self::TransferFailed { source, .. } => {
                Some(source)
            }
            Self::Remote(err) => Some(err),
            _ => None,
        }
    }
}
