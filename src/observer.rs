//! # observer
//!
//! Session diagnostics. Every session reports what it does to a `SessionObserver`;
//! `LogObserver` forwards these events to the `log` facade.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Something that happened during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected {
        host: String,
        netbios_name: String,
        port: u16,
    },
    /// The configured share isn't advertised by the server
    ShareMissing { share: String },
    /// The configured file isn't in its directory
    FileMissing { path: String },
    /// An existence check could not be performed
    CheckFailed { reason: String },
    Listing { share: String, path: String },
    DirectoryCreated { share: String, path: String },
    StoreAttemptFailed {
        attempt: u32,
        retries: u32,
        error: String,
    },
    Stored {
        share: String,
        path: String,
        bytes: u64,
        attempts: u32,
    },
    Retrieved {
        share: String,
        path: String,
        bytes: u64,
    },
    BackingUp {
        share: String,
        path: String,
        backup_share: String,
        backup_path: String,
    },
    /// A backup copy was staged in a local temporary file
    BackupStaged { local: PathBuf },
    Removed { share: String, pattern: String },
    Closed,
}

impl SessionEvent {
    /// Whether the event needs the user's attention
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::ShareMissing { .. }
                | Self::FileMissing { .. }
                | Self::CheckFailed { .. }
                | Self::StoreAttemptFailed { .. }
        )
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected {
                host,
                netbios_name,
                port,
            } => write!(f, "connected to {} ({}) on port {}", host, netbios_name, port),
            Self::ShareMissing { share } => {
                write!(f, "share {} does not exist on the server", share)
            }
            Self::FileMissing { path } => write!(f, "file {} does not exist on the server", path),
            Self::CheckFailed { reason } => write!(f, "existence check failed: {}", reason),
            Self::Listing { share, path } => write!(f, "list files in {}:{}", share, path),
            Self::DirectoryCreated { share, path } => {
                write!(f, "created directory {}:{}", share, path)
            }
            Self::StoreAttemptFailed {
                attempt,
                retries,
                error,
            } => write!(
                f,
                "attempt {}/{} to store file on SMB share failed: {}",
                attempt, retries, error
            ),
            Self::Stored {
                share,
                path,
                bytes,
                attempts,
            } => write!(
                f,
                "stored {} bytes at {}:{} ({} attempt(s))",
                bytes, share, path, attempts
            ),
            Self::Retrieved { share, path, bytes } => {
                write!(f, "transferred {} bytes from {}:{}", bytes, share, path)
            }
            Self::BackingUp {
                share,
                path,
                backup_share,
                backup_path,
            } => write!(
                f,
                "back up file {}:{} to {}:{}",
                share, path, backup_share, backup_path
            ),
            Self::BackupStaged { local } => write!(f, "staged backup at {}", local.display()),
            Self::Removed { share, pattern } => write!(f, "removed {}:{}", share, pattern),
            Self::Closed => write!(f, "session closed"),
        }
    }
}

/// Receives the events of a session
pub trait SessionObserver {
    fn notify(&self, event: &SessionEvent);
}

impl<T: SessionObserver + ?Sized> SessionObserver for Arc<T> {
    fn notify(&self, event: &SessionEvent) {
        (**self).notify(event)
    }
}

/// Observer writing events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn notify(&self, event: &SessionEvent) {
        match event {
            SessionEvent::StoreAttemptFailed { .. } => error!("{}", event),
            event if event.is_warning() => warn!("{}", event),
            SessionEvent::Listing { .. } | SessionEvent::BackupStaged { .. } => debug!("{}", event),
            event => info!("{}", event),
        }
    }
}
