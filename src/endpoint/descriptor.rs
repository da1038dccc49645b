//! Protocol declarations and the per-protocol endpoint descriptors built from them.
//!
//! One [`SupportedProtocol`] declaration yields two views:
//! - `use_own_role = true`: what the declaring endpoint advertises
//! - `use_own_role = false`: what it requires of its counterpart
//!
//! # Example
//!
//! ```
//! use etpwire::endpoint::{build_endpoint_protocol, Role, SupportedProtocol};
//! use etpwire::protocol::protocols;
//!
//! let declaration = SupportedProtocol::new(protocols::STORE, Role::Store);
//!
//! let own = build_endpoint_protocol(&declaration, true).unwrap();
//! assert_eq!(own.role(), Role::Store);
//! assert_eq!(own.counterpart_role(), Role::Customer);
//!
//! let other = build_endpoint_protocol(&declaration, false).unwrap();
//! assert_eq!(other.role(), Role::Customer);
//! assert_eq!(other.counterpart_role(), Role::Store);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::capability::{CapabilityBag, ProtocolCapabilities};
use crate::error::{EtpError, Result};
use crate::protocol::{Version, PROTOCOL_VERSION};

/// One protocol an endpoint declares support for, as sent on the wire.
///
/// The role stays a string so that an unknown role is reported when the
/// descriptor is built, not when the handshake message is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedProtocol {
    /// Protocol number.
    pub protocol: u16,
    /// Declared protocol version.
    #[serde(default)]
    pub protocol_version: Version,
    /// Role the declaring endpoint plays.
    pub role: String,
    /// Capabilities for this protocol.
    #[serde(default)]
    pub protocol_capabilities: CapabilityBag,
}

impl SupportedProtocol {
    /// Declare a protocol at the current version with no capabilities.
    pub fn new(protocol: u16, role: Role) -> Self {
        Self {
            protocol,
            protocol_version: PROTOCOL_VERSION,
            role: role.as_str().to_string(),
            protocol_capabilities: CapabilityBag::new(),
        }
    }

    /// Set the declared version.
    pub fn with_version(mut self, version: Version) -> Self {
        self.protocol_version = version;
        self
    }

    /// Set the declared capabilities.
    pub fn with_capabilities(mut self, capabilities: &ProtocolCapabilities) -> Self {
        self.protocol_capabilities = capabilities.clone_capabilities();
        self
    }

    /// Parsed role.
    ///
    /// # Errors
    ///
    /// Returns [`EtpError::UnsupportedRole`] for a role outside the vocabulary.
    pub fn parsed_role(&self) -> Result<Role> {
        self.role.parse()
    }

    /// Check if `other` declares the same protocol and version with the complementary role.
    ///
    /// An unparseable role on either side never matches.
    pub fn is_complement_of(&self, other: &SupportedProtocol) -> bool {
        match (self.parsed_role(), other.parsed_role()) {
            (Ok(mine), Ok(theirs)) => {
                self.protocol == other.protocol
                    && self.protocol_version == other.protocol_version
                    && mine.complement() == theirs
            }
            _ => false,
        }
    }

    /// Local declarations the counterpart can serve.
    ///
    /// Keeps each local declaration for which the counterpart declared the
    /// same protocol and version with the complementary role. Counterpart
    /// declarations with unknown roles are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EtpError::UnsupportedRole`] if a local declaration has an
    /// unknown role.
    pub fn negotiate(
        local: &[SupportedProtocol],
        counterpart: &[SupportedProtocol],
    ) -> Result<Vec<SupportedProtocol>> {
        let mut negotiated = Vec::new();
        for declaration in local {
            declaration.parsed_role()?;
            if counterpart.iter().any(|c| declaration.is_complement_of(c)) {
                negotiated.push(declaration.clone());
            } else {
                tracing::debug!(
                    "Protocol {} ({}) not offered by counterpart",
                    declaration.protocol,
                    declaration.role
                );
            }
        }
        Ok(negotiated)
    }
}

/// Frozen per-protocol view: role, counterpart role, and capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointProtocolDescriptor {
    version: Version,
    protocol: u16,
    role: Role,
    counterpart_role: Role,
    capabilities: ProtocolCapabilities,
}

impl EndpointProtocolDescriptor {
    /// Declared protocol version.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Protocol number.
    #[inline]
    pub fn protocol(&self) -> u16 {
        self.protocol
    }

    /// Role of the endpoint this view describes.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Role of the other side.
    #[inline]
    pub fn counterpart_role(&self) -> Role {
        self.counterpart_role
    }

    /// Protocol capabilities (a private copy of the declaration's bag).
    #[inline]
    pub fn capabilities(&self) -> &ProtocolCapabilities {
        &self.capabilities
    }
}

/// Build the descriptor for one declared protocol.
///
/// With `use_own_role` the descriptor describes the declaring endpoint;
/// without it, the roles are swapped and it describes the counterpart the
/// declaration expects.
///
/// # Errors
///
/// Returns [`EtpError::UnsupportedRole`] if the declared role is unknown.
pub fn build_endpoint_protocol(
    declaration: &SupportedProtocol,
    use_own_role: bool,
) -> Result<EndpointProtocolDescriptor> {
    let declared = declaration.parsed_role()?;
    let (role, counterpart_role) = if use_own_role {
        (declared, declared.complement())
    } else {
        (declared.complement(), declared)
    };

    Ok(EndpointProtocolDescriptor {
        version: declaration.protocol_version,
        protocol: declaration.protocol,
        role,
        counterpart_role,
        capabilities: ProtocolCapabilities::from_bag(&declaration.protocol_capabilities),
    })
}

/// Descriptors for all declared protocols of one endpoint, from one perspective.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointProtocols {
    descriptors: Vec<EndpointProtocolDescriptor>,
    by_protocol: HashMap<u16, usize>,
}

impl EndpointProtocols {
    /// Build one descriptor per declaration, in declaration order.
    ///
    /// # Errors
    ///
    /// - [`EtpError::UnsupportedRole`] for an unknown role.
    /// - [`EtpError::Conflict`] if a protocol number is declared twice.
    pub fn build(declarations: &[SupportedProtocol], use_own_role: bool) -> Result<Self> {
        let mut protocols = EndpointProtocols::default();
        for declaration in declarations {
            let descriptor = build_endpoint_protocol(declaration, use_own_role)?;
            if protocols.by_protocol.contains_key(&descriptor.protocol) {
                return Err(EtpError::Conflict(format!(
                    "protocol {} declared more than once",
                    descriptor.protocol
                )));
            }
            protocols
                .by_protocol
                .insert(descriptor.protocol, protocols.descriptors.len());
            protocols.descriptors.push(descriptor);
        }
        Ok(protocols)
    }

    /// Descriptor for a protocol number.
    pub fn get(&self, protocol: u16) -> Option<&EndpointProtocolDescriptor> {
        self.by_protocol
            .get(&protocol)
            .map(|&index| &self.descriptors[index])
    }

    /// Check if a protocol is present.
    pub fn contains(&self, protocol: u16) -> bool {
        self.by_protocol.contains_key(&protocol)
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointProtocolDescriptor> {
        self.descriptors.iter()
    }

    /// Number of protocols.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if no protocol is present.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
