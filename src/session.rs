//! # session
//!
//! Smb session facade: resolves destinations and forwards operations to the smb connection

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use remotefs::RemoteError;

use crate::client::{ConnectTarget, DirEntry, HostnameResolver, NameResolver, SmbConnection};
use crate::observer::{LogObserver, SessionEvent, SessionObserver};
use crate::options::{ExistenceCheck, SessionOptions};
use crate::resolver::{self, ResolvedLocation};
use crate::transfer::{self, RetrievedFile, Sink, Source, StoreOutcome};
use crate::utils::path as path_utils;
use crate::{SessionError, SessionResult};

/// A connected smb session.
///
/// Operations take bare paths; the share is resolved against the shares advertised by the
/// server and the default share of the session. The session is not meant to be shared between
/// threads: open one session per concurrent caller.
pub struct SmbSession<C: SmbConnection> {
    conn: C,
    options: SessionOptions,
    netbios_name: String,
    scratch_dir: PathBuf,
    observer: Box<dyn SessionObserver>,
}

impl<C: SmbConnection> SmbSession<C> {
    /// Connect to the server described by `options`, using the host as NetBIOS name and
    /// reporting events to the `log` facade
    pub fn connect(options: SessionOptions, conn: C) -> SessionResult<Self> {
        Self::connect_with(options, conn, &mut HostnameResolver, Box::new(LogObserver))
    }

    /// Connect to the server described by `options`.
    ///
    /// Fails if the connection can't be established. When a default share or path is
    /// configured, their existence is checked according to `options.existence_check`.
    pub fn connect_with<R: NameResolver + ?Sized>(
        options: SessionOptions,
        mut conn: C,
        name_service: &mut R,
        observer: Box<dyn SessionObserver>,
    ) -> SessionResult<Self> {
        if options.host.is_empty() {
            return Err(SessionError::MalformedLocation(
                "no host configured".to_string(),
            ));
        }
        let connection_failure = |source: RemoteError| SessionError::ConnectionFailure {
            host: options.host.clone(),
            port: options.port,
            source,
        };
        let netbios_name =
            resolver::netbios_name(name_service, &options.host).map_err(connection_failure)?;
        let target = ConnectTarget {
            host: options.host.clone(),
            port: options.port,
            netbios_name: netbios_name.clone(),
            client_name: options.client_name.clone(),
            domain: options.domain.clone(),
            username: options.username.clone(),
            password: options.password.clone(),
        };
        conn.connect(&target).map_err(connection_failure)?;
        observer.notify(&SessionEvent::Connected {
            host: options.host.clone(),
            netbios_name: netbios_name.clone(),
            port: options.port,
        });
        let mut session = Self {
            conn,
            options,
            netbios_name,
            scratch_dir: PathBuf::new(),
            observer,
        };
        session.check_share_exists()?;
        session.check_file_exists()?;
        session.scratch_dir = tempfile::Builder::new()
            .prefix(session.options.scratch_prefix.as_str())
            .tempdir()?
            .keep();
        debug!("scratch directory: {}", session.scratch_dir.display());
        Ok(session)
    }

    /// Names of the shares advertised by the server
    pub fn list_shares(&mut self) -> SessionResult<Vec<String>> {
        Ok(self.conn.list_shares()?)
    }

    /// List the directory at `path`.
    ///
    /// Without explicit share, the default share is used; if none is configured, the first
    /// segment of `path` is taken as the share.
    pub fn ls(&mut self, path: &str, share: Option<&str>) -> SessionResult<Vec<DirEntry>> {
        let location = resolver::resolve_direct(path, share, self.options.get_share());
        let share = location.require_share()?;
        self.observer.notify(&SessionEvent::Listing {
            share: share.to_string(),
            path: location.path.clone(),
        });
        Ok(self.conn.list_path(share, &location.path)?)
    }

    /// Create the directory at `path` and all its missing parents.
    ///
    /// Returns the directories which have been created.
    pub fn mkdir(&mut self, path: &str, share: Option<&str>) -> SessionResult<Vec<String>> {
        let location = self.guess_share(path, share)?;
        let share = location.require_share()?;
        let mut current = String::new();
        let mut created = Vec::new();
        for segment in path_utils::segments(&location.path) {
            let exists = self
                .conn
                .list_path(share, &current)?
                .iter()
                .any(|e| e.is_directory && e.name == segment);
            current = format!("{}/{}", current, segment);
            if exists {
                trace!("directory {} already exists", current);
                continue;
            }
            self.conn.create_directory(share, &current)?;
            self.observer.notify(&SessionEvent::DirectoryCreated {
                share: share.to_string(),
                path: current.clone(),
            });
            created.push(current.clone());
        }
        Ok(created)
    }

    /// Upload `source` to `dest_path`, with the configured number of retries
    pub fn store_file<S: Into<Source>>(
        &mut self,
        source: S,
        dest_path: &str,
        share: Option<&str>,
    ) -> SessionResult<StoreOutcome> {
        let retries = self.options.retries;
        self.store_file_with_retries(source, dest_path, share, retries)
    }

    /// Upload `source` to `dest_path`, making up to `retries` attempts.
    ///
    /// If every attempt fails, returns `TransferFailed` with the error of the last attempt.
    pub fn store_file_with_retries<S: Into<Source>>(
        &mut self,
        source: S,
        dest_path: &str,
        share: Option<&str>,
        retries: u32,
    ) -> SessionResult<StoreOutcome> {
        let location = self.guess_share(dest_path, share)?;
        let share = location.require_share()?;
        if location.path.is_empty() {
            return Err(SessionError::MissingDestination("destination path is unset"));
        }
        transfer::store_with_retries(
            &mut self.conn,
            share,
            &location.path,
            source.into(),
            retries,
            self.observer.as_ref(),
        )
    }

    /// Download `remote_path` (or the default path) into `sink`, and return the written file
    /// reopened read-only.
    ///
    /// On failure the local file is removed only if this call created it.
    pub fn retrieve_file(
        &mut self,
        remote_path: Option<&str>,
        sink: Sink,
        share: Option<&str>,
    ) -> SessionResult<RetrievedFile> {
        let remote_path = self.remote_path(remote_path)?;
        let location = self.guess_share(&remote_path, share)?;
        location.require_share()?;
        let local = match sink {
            Sink::Scratch => match path_utils::basename(&location.path) {
                "" => return Err(SessionError::MissingDestination("destination path is unset")),
                name => self.scratch_dir.join(name),
            },
            Sink::LocalPath(path) => path,
        };
        trace!("retrieving {:?} into {}", location, local.display());
        let created = !local.exists();
        let mut file = File::create(&local)?;
        let bytes = match self.retrieve_resolved(&location, &mut file) {
            Ok(bytes) => bytes,
            Err(err) => {
                drop(file);
                if created {
                    let _ = fs::remove_file(&local);
                }
                return Err(err);
            }
        };
        file.flush()?;
        drop(file);
        Ok(RetrievedFile {
            file: File::open(&local)?,
            path: local,
            bytes,
        })
    }

    /// Download `remote_path` (or the default path) into `sink`. Returns the amount of bytes read
    pub fn retrieve_into(
        &mut self,
        remote_path: Option<&str>,
        sink: &mut dyn Write,
        share: Option<&str>,
    ) -> SessionResult<u64> {
        let remote_path = self.remote_path(remote_path)?;
        let location = self.guess_share(&remote_path, share)?;
        self.retrieve_resolved(&location, sink)
    }

    /// Copy `file_path` (or the default path) to `backup_path` through a local temporary file.
    ///
    /// The temporary file is removed whatever the outcome of the store.
    pub fn backup_file(
        &mut self,
        backup_path: &str,
        file_path: Option<&str>,
        share: Option<&str>,
        backup_share: Option<&str>,
    ) -> SessionResult<StoreOutcome> {
        let file_path = self.remote_path(file_path)?;
        let source = self.guess_share(&file_path, share)?;
        let destination = self.guess_share(backup_path, backup_share)?;
        source.require_share()?;
        let backup_share = destination.require_share()?;
        self.observer.notify(&SessionEvent::BackingUp {
            share: source.share.clone(),
            path: source.path.clone(),
            backup_share: backup_share.to_string(),
            backup_path: destination.path.clone(),
        });
        let mut staged = tempfile::Builder::new()
            .prefix(self.options.scratch_prefix.as_str())
            .suffix(path_utils::extension(&source.path).unwrap_or_default())
            .tempfile()?;
        let staged_path = staged.path().to_path_buf();
        self.observer.notify(&SessionEvent::BackupStaged {
            local: staged_path.clone(),
        });
        self.retrieve_resolved(&source, staged.as_file_mut())?;
        let result = staged.reopen().map_err(SessionError::from).and_then(|reader| {
            transfer::store_with_retries(
                &mut self.conn,
                backup_share,
                &destination.path,
                Source::from(reader),
                self.options.retries,
                self.observer.as_ref(),
            )
        });
        if let Err(err) = staged.close() {
            warn!("could not remove {}: {}", staged_path.display(), err);
        }
        result
    }

    /// Delete the files matching `path`; wildcards are allowed in the last segment.
    ///
    /// The share is resolved like `ls` does.
    pub fn rm(&mut self, path: &str, share: Option<&str>) -> SessionResult<()> {
        let location = resolver::resolve_direct(path, share, self.options.get_share());
        let share = location.require_share()?;
        self.conn.delete_files(share, &location.path)?;
        self.observer.notify(&SessionEvent::Removed {
            share: share.to_string(),
            pattern: location.path.clone(),
        });
        Ok(())
    }

    /// Close the connection. The scratch directory is left in place
    pub fn close(&mut self) -> SessionResult<()> {
        self.conn.close()?;
        self.observer.notify(&SessionEvent::Closed);
        Ok(())
    }

    // -- getters

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// NetBIOS name of the server
    pub fn netbios_name(&self) -> &str {
        &self.netbios_name
    }

    /// Directory holding retrieved files. It is never removed by the session
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    // -- private

    fn guess_share(&mut self, path: &str, share: Option<&str>) -> SessionResult<ResolvedLocation> {
        let conn = &mut self.conn;
        resolver::guess_share(path, share, self.options.share.as_deref(), || {
            conn.list_shares()
        })
    }

    fn remote_path(&self, path: Option<&str>) -> SessionResult<String> {
        path.or(self.options.get_path())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .ok_or(SessionError::MissingDestination("destination path is unset"))
    }

    fn retrieve_resolved(
        &mut self,
        location: &ResolvedLocation,
        sink: &mut dyn Write,
    ) -> SessionResult<u64> {
        let share = location.require_share()?;
        let bytes = self.conn.retrieve_file(share, &location.path, sink)?;
        self.observer.notify(&SessionEvent::Retrieved {
            share: share.to_string(),
            path: location.path.clone(),
            bytes,
        });
        Ok(bytes)
    }

    fn check_share_exists(&mut self) -> SessionResult<()> {
        let share = match self.options.share.clone() {
            Some(share) => share,
            None => return Ok(()),
        };
        match self.conn.list_shares() {
            Ok(shares) if shares.iter().any(|s| s.eq_ignore_ascii_case(&share)) => Ok(()),
            Ok(_) => self.existence_miss(
                SessionEvent::ShareMissing {
                    share: share.clone(),
                },
                SessionError::ShareNotFound(share),
            ),
            Err(err) => self.existence_check_failed(err),
        }
    }

    fn check_file_exists(&mut self) -> SessionResult<()> {
        let path = match self.options.path.clone() {
            Some(path) => path,
            None => return Ok(()),
        };
        let parent = resolver::resolve_direct(
            path_utils::dirname(&path),
            None,
            self.options.get_share(),
        );
        if parent.share.is_empty() {
            return self.existence_check_failed(RemoteError::new_ex(
                remotefs::RemoteErrorType::BadFile,
                format!("cannot resolve the share of {}", path),
            ));
        }
        let name = path_utils::basename(&path);
        match self.conn.list_path(&parent.share, &parent.path) {
            Ok(entries) if entries.iter().any(|e| e.name == name) => Ok(()),
            Ok(_) => self.existence_miss(
                SessionEvent::FileMissing { path: path.clone() },
                SessionError::FileNotFound(path),
            ),
            Err(err) => self.existence_check_failed(err),
        }
    }

    fn existence_miss(&self, event: SessionEvent, err: SessionError) -> SessionResult<()> {
        match self.options.existence_check {
            ExistenceCheck::Strict => Err(err),
            ExistenceCheck::Lenient => {
                self.observer.notify(&event);
                Ok(())
            }
        }
    }

    fn existence_check_failed(&self, err: RemoteError) -> SessionResult<()> {
        match self.options.existence_check {
            ExistenceCheck::Strict => Err(SessionError::Remote(err)),
            ExistenceCheck::Lenient => {
                self.observer.notify(&SessionEvent::CheckFailed {
                    reason: err.to_string(),
                });
                Ok(())
            }
        }
    }
}
