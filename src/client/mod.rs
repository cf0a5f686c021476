//! # client
//!
//! Smb client collaborators: the connection used to talk to the server and the NetBIOS name service

use std::io::{Read, Write};

use remotefs::RemoteResult;

// -- unix client

#[cfg(target_family = "unix")]
mod unix;
#[cfg(target_family = "unix")]
pub use unix::PavaoConnection;

/// Everything a connection needs to open an authenticated session with a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    pub host: String,
    pub port: u16,
    /// NetBIOS name of the server
    pub netbios_name: String,
    /// Name this client presents to the server
    pub client_name: String,
    pub domain: String,
    pub username: String,
    pub password: String,
}

/// An entry returned by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

impl DirEntry {
    pub fn file<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_string(),
            is_directory: false,
        }
    }

    pub fn directory<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_string(),
            is_directory: true,
        }
    }
}

/// SMB client the session delegates every protocol operation to.
///
/// Paths are relative to `share`; an empty path is the share root.
pub trait SmbConnection {
    /// Open an authenticated session with the server
    fn connect(&mut self, target: &ConnectTarget) -> RemoteResult<()>;

    /// Names of the shares advertised by the server
    fn list_shares(&mut self) -> RemoteResult<Vec<String>>;

    /// List the directory at `path` inside `share`
    fn list_path(&mut self, share: &str, path: &str) -> RemoteResult<Vec<DirEntry>>;

    /// Write `source` to `path`, replacing any existing file. Returns bytes written
    fn store_file(&mut self, share: &str, path: &str, source: &mut dyn Read) -> RemoteResult<u64>;

    /// Copy the file at `path` into `sink`. Returns bytes read
    fn retrieve_file(&mut self, share: &str, path: &str, sink: &mut dyn Write)
        -> RemoteResult<u64>;

    /// Create a single directory; parent must exist
    fn create_directory(&mut self, share: &str, path: &str) -> RemoteResult<()>;

    /// Delete every file matching `pattern`. Wildcards are allowed in the last segment
    fn delete_files(&mut self, share: &str, pattern: &str) -> RemoteResult<()>;

    /// Close the session
    fn close(&mut self) -> RemoteResult<()>;
}

/// NetBIOS name service
pub trait NameResolver {
    /// Query the NetBIOS name of `host` (ip address or hostname)
    fn query_host_for_name(&mut self, host: &str) -> RemoteResult<String>;
}

impl<F> NameResolver for F
where
    F: FnMut(&str) -> RemoteResult<String>,
{
    fn query_host_for_name(&mut self, host: &str) -> RemoteResult<String> {
        self(host)
    }
}

/// Resolver which uses the host itself as NetBIOS name.
///
/// libsmbclient performs its own NetBIOS lookups, so this is what `PavaoConnection` wants.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostnameResolver;

impl NameResolver for HostnameResolver {
    fn query_host_for_name(&mut self, host: &str) -> RemoteResult<String> {
        Ok(host.to_string())
    }
}
