//! # resolver
//!
//! Turns bare paths into (share, path) pairs and hosts into NetBIOS names.
//!
//! SMB paths are ambiguous: `public/dir/file.txt` may name the `public` share or a `public`
//! directory inside the default share. Two strategies exist:
//!
//! - [`guess_share`] checks the first segment against the shares advertised by the server and
//!   otherwise falls back to the default share, leaving the share empty when none is configured;
//! - [`resolve_direct`] never queries the server: it uses the default share when configured,
//!   otherwise it always takes the first segment as the share.

use remotefs::RemoteResult;

use crate::client::NameResolver;
use crate::utils::path as path_utils;
use crate::{SessionError, SessionResult};

/// NetBIOS name used for the local machine
pub const LOCALHOST: &str = "localhost";

/// A share and a path inside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Share name; empty when it couldn't be resolved
    pub share: String,
    pub path: String,
}

impl ResolvedLocation {
    pub fn new<S: AsRef<str>, P: AsRef<str>>(share: S, path: P) -> Self {
        Self {
            share: share.as_ref().to_string(),
            path: path.as_ref().to_string(),
        }
    }

    /// Fails with `MissingDestination` if the share is unresolved
    pub fn require_share(&self) -> SessionResult<&str> {
        if self.share.is_empty() {
            Err(SessionError::MissingDestination(
                "no share given and no default share configured",
            ))
        } else {
            Ok(self.share.as_str())
        }
    }
}

/// Resolve `path` by matching its first segment against `available` shares.
///
/// `available` is only called when no explicit share is given.
pub fn guess_share<F>(
    path: &str,
    share: Option<&str>,
    default_share: Option<&str>,
    available: F,
) -> SessionResult<ResolvedLocation>
where
    F: FnOnce() -> RemoteResult<Vec<String>>,
{
    if let Some(share) = share {
        return Ok(ResolvedLocation::new(share, path));
    }
    let (first, rest) = path_utils::split_first_segment(path);
    let shares = available()?;
    if let Some(matched) = shares.iter().find(|s| s.eq_ignore_ascii_case(first)) {
        debug!("path {} matches share name {}", path, matched);
        return Ok(ResolvedLocation::new(matched, rest));
    }
    match default_share {
        Some(default_share) => Ok(ResolvedLocation::new(default_share, path)),
        None => {
            debug!("could not guess the share of {}", path);
            Ok(ResolvedLocation::new("", path))
        }
    }
}

/// Resolve `path` without asking the server which shares exist
pub fn resolve_direct(
    path: &str,
    share: Option<&str>,
    default_share: Option<&str>,
) -> ResolvedLocation {
    match share.or(default_share) {
        Some(share) => ResolvedLocation::new(share, path),
        None => {
            let (share, rest) = path_utils::split_first_segment(path);
            ResolvedLocation::new(share, rest)
        }
    }
}

/// Whether `host` designates the local machine
pub fn is_localhost(host: &str) -> bool {
    host == "127.0.0.1" || host.eq_ignore_ascii_case(LOCALHOST)
}

/// Resolve the NetBIOS name of `host`; the local machine is never queried
pub fn netbios_name<R: NameResolver + ?Sized>(resolver: &mut R, host: &str) -> RemoteResult<String> {
    if is_localhost(host) {
        return Ok(LOCALHOST.to_string());
    }
    let name = resolver.query_host_for_name(host)?;
    debug!("NetBIOS name of {} is {}", host, name);
    Ok(name)
}
