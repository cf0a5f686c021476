//! # options
//!
//! Session configuration

use crate::location::{SmbLocation, GUEST_USER};
use crate::SessionResult;

/// Default NetBIOS session service port
pub const DEFAULT_PORT: u16 = 139;
/// Default number of store attempts
pub const DEFAULT_RETRIES: u32 = 3;

/// What to do when the configured share or file is not found on the server at connection time
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceCheck {
    /// Report a warning to the observer and go on
    #[default]
    Lenient,
    /// Fail the connection
    Strict,
}

/// Options used to open a `SmbSession`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) domain: String,
    pub(crate) client_name: String,
    pub(crate) share: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) retries: u32,
    pub(crate) existence_check: ExistenceCheck,
    pub(crate) scratch_prefix: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: GUEST_USER.to_string(),
            password: String::new(),
            domain: String::new(),
            client_name: env!("CARGO_PKG_NAME").to_string(),
            share: None,
            path: None,
            retries: DEFAULT_RETRIES,
            existence_check: ExistenceCheck::default(),
            scratch_prefix: format!("{}_", env!("CARGO_PKG_NAME")),
        }
    }
}

impl SessionOptions {
    /// Build options from a `smb://` uri
    pub fn from_uri<S: AsRef<str>>(uri: S) -> SessionResult<Self> {
        Ok(Self::default().location(SmbLocation::parse(uri.as_ref())?))
    }

    /// Apply a parsed location. Every field it carries overrides the current one;
    /// the port and default share/path are only overridden when present in the location
    pub fn location(mut self, location: SmbLocation) -> Self {
        self.domain = location.domain;
        self.username = location.username;
        self.password = location.password;
        self.host = location.host;
        if let Some(port) = location.port {
            self.port = port;
        }
        if location.share.is_some() {
            self.share = location.share;
            self.path = location.path;
        }
        self
    }

    /// Construct SessionOptions with the provided host
    pub fn host<S: AsRef<str>>(mut self, host: S) -> Self {
        self.host = host.as_ref().to_string();
        self
    }

    /// Construct SessionOptions with the provided port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Construct SessionOptions with the provided username
    pub fn username<S: AsRef<str>>(mut self, username: S) -> Self {
        self.username = username.as_ref().to_string();
        self
    }

    /// Construct SessionOptions with the provided password
    pub fn password<S: AsRef<str>>(mut self, password: S) -> Self {
        self.password = password.as_ref().to_string();
        self
    }

    /// Construct SessionOptions with the provided domain
    pub fn domain<S: AsRef<str>>(mut self, domain: S) -> Self {
        self.domain = domain.as_ref().to_string();
        self
    }

    /// Construct SessionOptions with the name this client presents to the server
    pub fn client_name<S: AsRef<str>>(mut self, client_name: S) -> Self {
        self.client_name = client_name.as_ref().to_string();
        self
    }

    /// Construct SessionOptions with the provided default share
    pub fn share<S: AsRef<str>>(mut self, share: S) -> Self {
        self.share = Some(share.as_ref().to_string());
        self
    }

    /// Construct SessionOptions with the provided default path
    pub fn path<S: AsRef<str>>(mut self, path: S) -> Self {
        self.path = Some(path.as_ref().to_string());
        self
    }

    /// Number of attempts made by `store_file`. Zero is treated as one
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Construct SessionOptions with the behaviour applied when the default share or path
    /// is missing at connection time
    pub fn existence_check(mut self, check: ExistenceCheck) -> Self {
        self.existence_check = check;
        self
    }

    /// Prefix of the scratch directory name
    pub fn scratch_prefix<S: AsRef<str>>(mut self, prefix: S) -> Self {
        self.scratch_prefix = prefix.as_ref().to_string();
        self
    }

    // -- getters

    /// Host of the server
    pub fn get_host(&self) -> &str {
        &self.host
    }

    /// Port of the server
    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// User to authenticate as
    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Domain (workgroup) of the user; empty if unset
    pub fn get_domain(&self) -> &str {
        &self.domain
    }

    /// Default share, if any
    pub fn get_share(&self) -> Option<&str> {
        self.share.as_deref()
    }

    /// Default path inside the default share, if any
    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Number of attempts made by `store_file`
    pub fn get_retries(&self) -> u32 {
        self.retries
    }
}
