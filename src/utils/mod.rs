//! # utils
//!
//! Path and protocol utilities

pub mod path;
#[cfg(target_family = "unix")]
pub mod smb;
