//! # transfer
//!
//! Local sources and sinks of file transfers, and the store retry loop

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::client::SmbConnection;
use crate::observer::{SessionEvent, SessionObserver};
use crate::{SessionError, SessionResult};

/// A readable and seekable stream
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Local data to upload
pub enum Source {
    /// File at this path, opened for reading
    LocalPath(PathBuf),
    /// An already opened stream; uploaded from its current position
    Handle(Box<dyn ReadSeek>),
}

impl Source {
    pub fn handle<R: ReadSeek + 'static>(reader: R) -> Self {
        Self::Handle(Box::new(reader))
    }

    fn open(self) -> SessionResult<Box<dyn ReadSeek>> {
        match self {
            Self::LocalPath(path) => {
                trace!("opening {} for upload", path.display());
                Ok(Box::new(File::open(path)?))
            }
            Self::Handle(reader) => Ok(reader),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalPath(path) => f.debug_tuple("LocalPath").field(path).finish(),
            Self::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Self::LocalPath(PathBuf::from(path))
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::LocalPath(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::LocalPath(path)
    }
}

impl From<File> for Source {
    fn from(file: File) -> Self {
        Self::handle(file)
    }
}

/// Where a retrieved file is written
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Sink {
    /// A file named after the remote file, inside the session scratch directory
    #[default]
    Scratch,
    /// This local path; created or truncated
    LocalPath(PathBuf),
}

/// Result of a successful store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    pub bytes: u64,
    /// Attempts it took, including the successful one
    pub attempts: u32,
}

/// A downloaded file, reopened read-only
#[derive(Debug)]
pub struct RetrievedFile {
    pub file: File,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Store `source` at `share`/`path`, making up to `retries` attempts (at least one).
///
/// The source is rewound to its initial position before each attempt.
pub(crate) fn store_with_retries<C: SmbConnection + ?Sized>(
    conn: &mut C,
    share: &str,
    path: &str,
    source: Source,
    retries: u32,
    observer: &dyn SessionObserver,
) -> SessionResult<StoreOutcome> {
    let retries = retries.max(1);
    let mut reader = source.open()?;
    let start = reader.stream_position()?;
    let mut attempt = 0;
    loop {
        attempt += 1;
        reader.seek(SeekFrom::Start(start))?;
        match conn.store_file(share, path, &mut reader) {
            Ok(bytes) => {
                observer.notify(&SessionEvent::Stored {
                    share: share.to_string(),
                    path: path.to_string(),
                    bytes,
                    attempts: attempt,
                });
                return Ok(StoreOutcome {
                    bytes,
                    attempts: attempt,
                });
            }
            Err(err) => {
                observer.notify(&SessionEvent::StoreAttemptFailed {
                    attempt,
                    retries,
                    error: err.to_string(),
                });
                if attempt >= retries {
                    return Err(SessionError::TransferFailed {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}
