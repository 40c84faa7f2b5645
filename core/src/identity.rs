//! Client identifier sent as the `key` form field.
//!
//! AtD does not issue credentials; it expects a stable per-client string.
//! The identifier is the hex SHA-1 of the host name, so every process on a
//! machine presents the same key.

use sha1::{Digest, Sha1};

/// Source of the host name the identifier is derived from.
pub trait HostSource: Send + Sync {
    fn host_name(&self) -> String;
}

/// Reads the machine's network name. An unreadable name hashes as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostSource for SystemHost {
    fn host_name(&self) -> String {
        sysinfo::System::host_name().unwrap_or_default()
    }
}

/// A fixed host name, for tests and for callers that want to pin the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHost(pub String);

impl HostSource for FixedHost {
    fn host_name(&self) -> String {
        self.0.clone()
    }
}

/// Hex-encoded SHA-1 of `host_name`.
pub fn derive_identifier(host_name: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(host_name.as_bytes());
    hex::encode(hasher.finalize())
}
