//! Protocol roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EtpError;

/// Role an endpoint plays in one protocol.
///
/// Every role has exactly one complement, and the complement of the
/// complement is the role itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Opens the session. Complement of [`Role::Server`].
    Client,
    /// Accepts the session. Complement of [`Role::Client`].
    Server,
    /// Holds data objects. Complement of [`Role::Customer`].
    Store,
    /// Reads and writes data objects in a store. Complement of [`Role::Store`].
    Customer,
    /// Streams channel data. Complement of [`Role::Consumer`].
    Producer,
    /// Receives channel data. Complement of [`Role::Producer`].
    Consumer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Client,
        Role::Server,
        Role::Store,
        Role::Customer,
        Role::Producer,
        Role::Consumer,
    ];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Server => "server",
            Role::Store => "store",
            Role::Customer => "customer",
            Role::Producer => "producer",
            Role::Consumer => "consumer",
        }
    }

    /// The role the other side of the protocol plays.
    pub fn complement(&self) -> Role {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
            Role::Store => Role::Customer,
            Role::Customer => Role::Store,
            Role::Producer => Role::Consumer,
            Role::Consumer => Role::Producer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = EtpError;

    /// Parse a wire role name (ASCII case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EtpError::UnsupportedRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_complement_pairs() {
        assert_eq!(Role::Client.complement(), Role::Server);
        assert_eq!(Role::Store.complement(), Role::Customer);
        assert_eq!(Role::Producer.complement(), Role::Consumer);
    }

    #[test]
    fn test_parse_wire_names() {
        assert_eq!("store".parse::<Role>().unwrap(), Role::Store);
        assert_eq!("Customer".parse::<Role>().unwrap(), Role::Customer);
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_parse_unknown_role() {
        let err = "observer".parse::<Role>().unwrap_err();
        assert!(matches!(err, EtpError::UnsupportedRole(ref r) if r == "observer"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Producer).unwrap(), "\"producer\"");
    }

    proptest! {
        #[test]
        fn complement_is_an_involution(index in 0usize..Role::ALL.len()) {
            let role = Role::ALL[index];
            prop_assert_eq!(role.complement().complement(), role);
            prop_assert_ne!(role.complement(), role);
        }
    }
}
