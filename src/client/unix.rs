//! # UNIX client
//!
//! libsmbclient implementation of the smb connection, through pavao

use std::io::{self, Read, Write};

use libc::mode_t;
use pavao::{SmbClient, SmbCredentials, SmbMode, SmbOpenOptions, SmbOptions};
use remotefs::{RemoteError, RemoteErrorType, RemoteResult};

use super::{ConnectTarget, DirEntry, SmbConnection};
use crate::utils::{path as path_utils, smb as smb_utils};

/// SMB connection backed by `pavao::SmbClient`
pub struct PavaoConnection {
    client: Option<SmbClient>,
    options: fn() -> SmbOptions,
}

impl Default for PavaoConnection {
    fn default() -> Self {
        Self::new(SmbOptions::default)
    }
}

impl PavaoConnection {
    /// Create a new connection; `options` builds the `SmbOptions` used when connecting
    pub fn new(options: fn() -> SmbOptions) -> Self {
        Self {
            client: None,
            options,
        }
    }

    /// Return a reference to the inner `pavao::SmbClient`, if connected
    pub fn client(&self) -> Option<&SmbClient> {
        self.client.as_ref()
    }

    // -- private

    fn client_mut(&mut self) -> RemoteResult<&mut SmbClient> {
        self.client
            .as_mut()
            .ok_or_else(|| RemoteError::new(RemoteErrorType::NotConnected))
    }

    fn check_connection(client: &SmbClient) -> RemoteResult<()> {
        trace!("checking connection...");
        match client.get_user() {
            Err(e) => {
                error!("connection ERROR: {}", e);
                Err(RemoteError::new_ex(RemoteErrorType::ConnectionError, e))
            }
            Ok(_) => {
                trace!("connection OK");
                Ok(())
            }
        }
    }

    fn list_uri(&mut self, uri: &str) -> RemoteResult<Vec<pavao::SmbDirent>> {
        trace!("listing {}", uri);
        self.client_mut()?
            .list_dir(uri)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))
    }

    fn unlink(&mut self, uri: String) -> RemoteResult<()> {
        trace!("removing file {}", uri);
        self.client_mut()?
            .unlink(uri)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotRemoveFile, e))
    }
}

impl SmbConnection for PavaoConnection {
    fn connect(&mut self, target: &ConnectTarget) -> RemoteResult<()> {
        debug!(
            "connecting to {} ({}) on port {} as {}",
            target.host, target.netbios_name, target.port, target.username
        );
        let mut credentials = SmbCredentials::default()
            .server(format!("smb://{}:{}", target.host, target.port))
            .share("")
            .username(target.username.as_str())
            .password(target.password.as_str());
        if !target.domain.is_empty() {
            credentials = credentials.workgroup(target.domain.as_str());
        }
        let client = SmbClient::new(credentials, (self.options)())
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::BadAddress, e))?;
        Self::check_connection(&client)?;
        self.client = Some(client);
        Ok(())
    }

    fn list_shares(&mut self) -> RemoteResult<Vec<String>> {
        Ok(self
            .list_uri("/")?
            .iter()
            .filter(|d| smb_utils::is_file_share(d))
            .map(|d| d.name().to_string())
            .collect())
    }

    fn list_path(&mut self, share: &str, path: &str) -> RemoteResult<Vec<DirEntry>> {
        let uri = smb_utils::share_path(share, path);
        Ok(self
            .list_uri(&uri)?
            .iter()
            .filter_map(smb_utils::dirent_to_entry)
            .collect())
    }

    fn store_file(&mut self, share: &str, path: &str, source: &mut dyn Read) -> RemoteResult<u64> {
        let uri = smb_utils::share_path(share, path);
        trace!("creating file at {}", uri);
        let mut file = self
            .client_mut()?
            .open_with(
                uri,
                SmbOpenOptions::default()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .mode(0o644 as mode_t),
            )
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(source, &mut file).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn retrieve_file(
        &mut self,
        share: &str,
        path: &str,
        sink: &mut dyn Write,
    ) -> RemoteResult<u64> {
        let uri = smb_utils::share_path(share, path);
        trace!("opening file at {} for read", uri);
        let mut file = self
            .client_mut()?
            .open_with(uri, SmbOpenOptions::default().read(true))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(&mut file, sink).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn create_directory(&mut self, share: &str, path: &str) -> RemoteResult<()> {
        let uri = smb_utils::share_path(share, path);
        trace!("making directory at {}", uri);
        self.client_mut()?
            .mkdir(uri, SmbMode::from(0o755 as mode_t))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::FileCreateDenied, e))
    }

    fn delete_files(&mut self, share: &str, pattern: &str) -> RemoteResult<()> {
        if !path_utils::has_wildcards(pattern) {
            return self.unlink(smb_utils::share_path(share, pattern));
        }
        let parent = path_utils::dirname(pattern);
        let name_pattern = path_utils::basename(pattern);
        let matching: Vec<String> = self
            .list_path(share, parent)?
            .into_iter()
            .filter(|e| !e.is_directory && path_utils::matches_pattern(name_pattern, &e.name))
            .map(|e| e.name)
            .collect();
        debug!("{} file(s) match {}", matching.len(), pattern);
        for name in matching {
            self.unlink(smb_utils::share_path(share, &format!("{}/{}", parent, name)))?;
        }
        Ok(())
    }

    fn close(&mut self) -> RemoteResult<()> {
        match self.client.take() {
            Some(client) => {
                trace!("closing smb context");
                drop(client);
                Ok(())
            }
            None => Err(RemoteError::new(RemoteErrorType::NotConnected)),
        }
    }
}
