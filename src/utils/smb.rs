//! # smb utils
//!
//! libsmbclient helpers for the pavao connection

use pavao::{SmbDirent, SmbDirentType};

use crate::DirEntry;

/// Build the path of `path` inside `share`, relative to the server uri
pub fn share_path(share: &str, path: &str) -> String {
    let mut uri = format!("/{}", share.trim_matches('/'));
    for segment in super::path::segments(path) {
        uri.push('/');
        uri.push_str(segment);
    }
    uri
}

/// Convert a `SmbDirent` into a `DirEntry`, keeping only files and directories
pub fn dirent_to_entry(dirent: &SmbDirent) -> Option<DirEntry> {
    match dirent.get_type() {
        _ if matches!(dirent.name(), "." | "..") => None,
        SmbDirentType::Dir => Some(DirEntry::directory(dirent.name())),
        SmbDirentType::File => Some(DirEntry::file(dirent.name())),
        _ => None,
    }
}

/// Whether the dirent is a disk share
pub fn is_file_share(dirent: &SmbDirent) -> bool {
    dirent.get_type() == SmbDirentType::FileShare
}
