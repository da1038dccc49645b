//! Protocol version.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of a protocol as declared during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Incompatible wire changes.
    pub major: i32,
    /// Compatible additions.
    pub minor: i32,
    /// Defaults to 0 when absent.
    #[serde(default)]
    pub revision: i32,
    /// Defaults to 0 when absent.
    #[serde(default)]
    pub patch: i32,
}

impl Version {
    /// Create a version.
    pub const fn new(major: i32, minor: i32, revision: i32, patch: i32) -> Self {
        Self {
            major,
            minor,
            revision,
            patch,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        PROTOCOL_VERSION
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.patch
        )
    }
}

/// Protocol version implemented by this crate.
pub const PROTOCOL_VERSION: Version = Version::new(1, 2, 0, 0);
