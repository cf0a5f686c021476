//! # location
//!
//! Parser for `smb://[domain;][user[:password]@]host[:port][/share[/path]]` locations

use std::fmt;
use std::str::FromStr;

use crate::{SessionError, SessionResult};

/// Scheme every location must start with
pub const SMB_SCHEME: &str = "smb://";
/// User used when the location carries no credentials
pub const GUEST_USER: &str = "GUEST";

/// A decomposed `smb://` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbLocation {
    pub domain: String,
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: Option<u16>,
    pub share: Option<String>,
    /// Path inside `share`, without the leading slash
    pub path: Option<String>,
}

impl SmbLocation {
    /// Parse a location string
    pub fn parse(uri: &str) -> SessionResult<Self> {
        let rest = uri
            .strip_prefix(SMB_SCHEME)
            .ok_or_else(|| malformed(uri, "missing smb:// scheme"))?;
        let (authority, tail) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        let (userinfo, hostport) = match authority.rsplit_once('@') {
            Some((userinfo, hostport)) => (Some(userinfo), hostport),
            None => (None, authority),
        };
        let (domain, username, password, hostport) = match userinfo {
            Some(userinfo) => {
                let (domain, username, password) = parse_userinfo(uri, userinfo)?;
                (domain, username, password, hostport)
            }
            None => {
                let (domain, hostport) = parse_bare_domain(uri, hostport)?;
                (domain, GUEST_USER.to_string(), String::new(), hostport)
            }
        };
        let (host, port) = parse_hostport(uri, hostport)?;
        let (share, path) = parse_tail(tail);
        trace!(
            "decomposed {}: domain={} user={} host={} port={:?} share={:?} path={:?}",
            uri,
            domain,
            username,
            host,
            port,
            share,
            path
        );
        Ok(Self {
            domain,
            username,
            password,
            host,
            port,
            share,
            path,
        })
    }
}

impl FromStr for SmbLocation {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SmbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SMB_SCHEME)?;
        if !self.domain.is_empty() {
            write!(f, "{};", self.domain)?;
        }
        write!(f, "{}", self.username)?;
        if !self.password.is_empty() {
            write!(f, ":{}", self.password)?;
        }
        write!(f, "@{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        if let Some(share) = self.share.as_deref() {
            write!(f, "/{}", share)?;
            if let Some(path) = self.path.as_deref() {
                write!(f, "/{}", path)?;
            }
        }
        Ok(())
    }
}

fn malformed(uri: &str, reason: &str) -> SessionError {
    SessionError::MalformedLocation(format!("{} ({})", uri, reason))
}

fn parse_userinfo(uri: &str, userinfo: &str) -> SessionResult<(String, String, String)> {
    let (domain, credentials) = match userinfo.split_once(';') {
        Some(("", _)) => return Err(malformed(uri, "empty domain")),
        Some((domain, credentials)) => (domain, credentials),
        None => ("", userinfo),
    };
    let (username, password) = credentials.split_once(':').unwrap_or((credentials, ""));
    if username.is_empty() {
        return Err(malformed(uri, "empty username"));
    }
    Ok((
        domain.to_string(),
        username.to_string(),
        password.to_string(),
    ))
}

/// `domain;host` without credentials
fn parse_bare_domain<'a>(uri: &str, authority: &'a str) -> SessionResult<(String, &'a str)> {
    match authority.split_once(';') {
        Some(("", _)) => Err(malformed(uri, "empty domain")),
        Some((domain, hostport)) => Ok((domain.to_string(), hostport)),
        None => Ok((String::new(), authority)),
    }
}

/// Split `host[:port]`; IPv6 hosts are bracketed (`[::1]:445`) and keep their brackets
fn parse_hostport(uri: &str, hostport: &str) -> SessionResult<(String, Option<u16>)> {
    let (host, port) = if hostport.starts_with('[') {
        let end = hostport
            .find(']')
            .ok_or_else(|| malformed(uri, "unterminated ipv6 host"))?;
        let (host, rest) = hostport.split_at(end + 1);
        match rest {
            "" => (host, None),
            rest => match rest.strip_prefix(':') {
                Some(port) => (host, Some(parse_port(uri, port)?)),
                None => return Err(malformed(uri, "unexpected text after ipv6 host")),
            },
        }
    } else {
        match hostport.rsplit_once(':') {
            Some((host, port)) => (host, Some(parse_port(uri, port)?)),
            None => (hostport, None),
        }
    };
    if host.is_empty() || host == "[]" {
        return Err(malformed(uri, "missing host"));
    }
    if host.contains(';') {
        return Err(malformed(uri, "bad host"));
    }
    Ok((host.to_string(), port))
}

fn parse_port(uri: &str, port: &str) -> SessionResult<u16> {
    port.parse::<u16>().map_err(|_| malformed(uri, "bad port"))
}

fn parse_tail(tail: &str) -> (Option<String>, Option<String>) {
    let tail = tail.strip_prefix('/').unwrap_or(tail);
    let (share, path) = match tail.split_once('/') {
        Some((share, path)) => (share, path),
        None => (tail, ""),
    };
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    match non_empty(share) {
        Some(share) => (Some(share), non_empty(path)),
        None => (None, None),
    }
}
