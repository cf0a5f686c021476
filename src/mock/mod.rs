//! ## Mock
//!
//! Contains mock for test units

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Mutex;

use remotefs::{RemoteError, RemoteErrorType, RemoteResult};

use crate::client::{ConnectTarget, DirEntry, SmbConnection};
use crate::observer::{SessionEvent, SessionObserver};
use crate::utils::path as path_utils;

// -- logger

#[allow(dead_code)]
pub fn logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// -- connection

/// A call received by `MockConnection`, with the arguments as given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(ConnectTarget),
    ListShares,
    ListPath(String, String),
    StoreFile(String, String),
    RetrieveFile(String, String),
    CreateDirectory(String, String),
    DeleteFiles(String, String),
    Close,
}

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// In-memory smb server
#[derive(Debug, Default)]
pub struct MockConnection {
    shares: Vec<String>,
    /// (lowercase share, normalized path) -> node
    nodes: BTreeMap<(String, String), Node>,
    calls: Vec<Call>,
    failing_stores: u32,
    refuse_connection: bool,
    closed: bool,
}

impl MockConnection {
    pub fn with_shares(shares: &[&str]) -> Self {
        Self {
            shares: shares.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Make the next `n` stores fail
    pub fn fail_stores(mut self, n: u32) -> Self {
        self.failing_stores = n;
        self
    }

    pub fn refuse_connection(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    /// Add a directory, creating its parents
    pub fn with_dir(mut self, share: &str, path: &str) -> Self {
        let mut current = String::new();
        for segment in path_utils::segments(path) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            self.nodes.insert(key(share, &current), Node::Dir);
        }
        self
    }

    /// Add a file, creating its parents
    pub fn with_file(self, share: &str, path: &str, data: &[u8]) -> Self {
        let mut this = self.with_dir(share, path_utils::dirname(path));
        this.nodes
            .insert(key(share, path), Node::File(data.to_vec()));
        this
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn store_attempts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::StoreFile(..)))
            .count()
    }

    pub fn file(&self, share: &str, path: &str) -> Option<Vec<u8>> {
        match self.nodes.get(&key(share, path)) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, share: &str, path: &str) -> bool {
        matches!(self.nodes.get(&key(share, path)), Some(Node::Dir))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // -- private

    fn check_open(&self) -> RemoteResult<()> {
        if self.closed {
            Err(RemoteError::new(RemoteErrorType::NotConnected))
        } else {
            Ok(())
        }
    }

    fn check_share(&self, share: &str) -> RemoteResult<()> {
        if self.shares.iter().any(|s| s.eq_ignore_ascii_case(share)) {
            Ok(())
        } else {
            Err(RemoteError::new_ex(
                RemoteErrorType::StatFailed,
                format!("no such share: {}", share),
            ))
        }
    }

    fn is_container(&self, share: &str, path: &str) -> bool {
        normalize(path).is_empty() || self.is_dir(share, path)
    }

    fn children(&self, share: &str, path: &str) -> Vec<DirEntry> {
        let share = share.to_lowercase();
        let parent = normalize(path);
        self.nodes
            .iter()
            .filter(|((s, p), _)| *s == share && path_utils::dirname(p) == parent && !p.is_empty())
            .map(|((_, p), node)| DirEntry {
                name: path_utils::basename(p).to_string(),
                is_directory: matches!(node, Node::Dir),
            })
            .collect()
    }
}

fn normalize(path: &str) -> String {
    path_utils::segments(path).collect::<Vec<_>>().join("/")
}

fn key(share: &str, path: &str) -> (String, String) {
    (share.to_lowercase(), normalize(path))
}

impl SmbConnection for MockConnection {
    fn connect(&mut self, target: &ConnectTarget) -> RemoteResult<()> {
        self.calls.push(Call::Connect(target.clone()));
        if self.refuse_connection {
            return Err(RemoteError::new_ex(
                RemoteErrorType::ConnectionError,
                "connection refused",
            ));
        }
        self.closed = false;
        Ok(())
    }

    fn list_shares(&mut self) -> RemoteResult<Vec<String>> {
        self.calls.push(Call::ListShares);
        self.check_open()?;
        Ok(self.shares.clone())
    }

    fn list_path(&mut self, share: &str, path: &str) -> RemoteResult<Vec<DirEntry>> {
        self.calls
            .push(Call::ListPath(share.to_string(), path.to_string()));
        self.check_open()?;
        self.check_share(share)?;
        if !self.is_container(share, path) {
            return Err(RemoteError::new_ex(
                RemoteErrorType::StatFailed,
                format!("no such directory: {}", path),
            ));
        }
        Ok(self.children(share, path))
    }

    fn store_file(&mut self, share: &str, path: &str, source: &mut dyn Read) -> RemoteResult<u64> {
        self.calls
            .push(Call::StoreFile(share.to_string(), path.to_string()));
        self.check_open()?;
        self.check_share(share)?;
        if !self.is_container(share, path_utils::dirname(&normalize(path))) {
            return Err(RemoteError::new(RemoteErrorType::CouldNotOpenFile));
        }
        let mut data = Vec::new();
        source
            .read_to_end(&mut data)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))?;
        if self.failing_stores > 0 {
            self.failing_stores -= 1;
            return Err(RemoteError::new_ex(
                RemoteErrorType::IoError,
                "connection reset by peer",
            ));
        }
        let bytes = data.len() as u64;
        self.nodes.insert(key(share, path), Node::File(data));
        Ok(bytes)
    }

    fn retrieve_file(
        &mut self,
        share: &str,
        path: &str,
        sink: &mut dyn Write,
    ) -> RemoteResult<u64> {
        self.calls
            .push(Call::RetrieveFile(share.to_string(), path.to_string()));
        self.check_open()?;
        self.check_share(share)?;
        let data = self
            .file(share, path)
            .ok_or_else(|| RemoteError::new(RemoteErrorType::CouldNotOpenFile))?;
        sink.write_all(&data)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))?;
        Ok(data.len() as u64)
    }

    fn create_directory(&mut self, share: &str, path: &str) -> RemoteResult<()> {
        self.calls
            .push(Call::CreateDirectory(share.to_string(), path.to_string()));
        self.check_open()?;
        self.check_share(share)?;
        if self.nodes.contains_key(&key(share, path)) {
            return Err(RemoteError::new(RemoteErrorType::DirectoryAlreadyExists));
        }
        if !self.is_container(share, path_utils::dirname(&normalize(path))) {
            return Err(RemoteError::new(RemoteErrorType::FileCreateDenied));
        }
        self.nodes.insert(key(share, path), Node::Dir);
        Ok(())
    }

    fn delete_files(&mut self, share: &str, pattern: &str) -> RemoteResult<()> {
        self.calls
            .push(Call::DeleteFiles(share.to_string(), pattern.to_string()));
        self.check_open()?;
        self.check_share(share)?;
        let pattern = normalize(pattern);
        let parent = path_utils::dirname(&pattern).to_string();
        let name_pattern = path_utils::basename(&pattern);
        let matching: Vec<String> = self
            .children(share, &parent)
            .into_iter()
            .filter(|e| !e.is_directory && path_utils::matches_pattern(name_pattern, &e.name))
            .map(|e| e.name)
            .collect();
        if matching.is_empty() {
            return Err(RemoteError::new(RemoteErrorType::CouldNotRemoveFile));
        }
        for name in matching {
            self.nodes.remove(&key(share, &format!("{}/{}", parent, name)));
        }
        Ok(())
    }

    fn close(&mut self) -> RemoteResult<()> {
        self.calls.push(Call::Close);
        self.check_open()?;
        self.closed = true;
        Ok(())
    }
}

// -- observer

/// Observer keeping every event it receives
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> usize {
        self.events().iter().filter(|e| e.is_warning()).count()
    }
}

impl SessionObserver for RecordingObserver {
    fn notify(&self, event: &SessionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
