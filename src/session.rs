//! Negotiated session view.
//!
//! Combines two [`EndpointDeclaration`]s into the frozen descriptors a
//! session consults while handling traffic.
//!
//! # Example
//!
//! ```
//! use etpwire::capability::{DataObjectCapabilities, ProtocolCapabilities};
//! use etpwire::endpoint::{EndpointDeclaration, Role};
//! use etpwire::protocol::protocols;
//! use etpwire::NegotiatedSession;
//!
//! let server = EndpointDeclaration::builder("server", "1.0")
//!     .protocol(protocols::STORE, Role::Store, ProtocolCapabilities::new())
//!     .data_object("witsml20.*", DataObjectCapabilities::new())
//!     .build();
//! let client = EndpointDeclaration::builder("client", "1.0")
//!     .protocol(protocols::STORE, Role::Customer, ProtocolCapabilities::new())
//!     .build();
//!
//! let session = NegotiatedSession::negotiate(&server, &client).unwrap();
//! let store = session.local_protocols().get(protocols::STORE).unwrap();
//! assert_eq!(store.counterpart_role(), Role::Customer);
//! assert!(session.data_objects().is_supported_str("witsml20.Well").unwrap());
//! ```

use crate::capability::EndpointCapabilities;
use crate::data_object::SupportedDataObjectCollection;
use crate::endpoint::{EndpointDeclaration, EndpointProtocols, SupportedProtocol};
use crate::error::Result;

/// Frozen result of negotiating a local declaration against the counterpart's.
#[derive(Debug, Clone)]
pub struct NegotiatedSession {
    local_protocols: EndpointProtocols,
    counterpart_protocols: EndpointProtocols,
    data_objects: SupportedDataObjectCollection,
    local_capabilities: EndpointCapabilities,
    counterpart_capabilities: EndpointCapabilities,
}

impl NegotiatedSession {
    /// Negotiate protocols, data objects and endpoint capabilities.
    ///
    /// Only protocols both sides declared with complementary roles and the
    /// same version survive. Data object entries come from the local side.
    ///
    /// # Errors
    ///
    /// - [`crate::EtpError::UnsupportedRole`] if a local protocol has an unknown role.
    /// - [`crate::EtpError::Conflict`] if a protocol is declared twice.
    /// - [`crate::EtpError::InvalidDataObjectType`] for a malformed local data object.
    pub fn negotiate(
        local: &EndpointDeclaration,
        counterpart: &EndpointDeclaration,
    ) -> Result<Self> {
        let negotiated = SupportedProtocol::negotiate(
            &local.supported_protocols,
            &counterpart.supported_protocols,
        )?;
        let local_protocols = EndpointProtocols::build(&negotiated, true)?;

        let matched: Vec<SupportedProtocol> = counterpart
            .supported_protocols
            .iter()
            .filter(|theirs| negotiated.iter().any(|mine| mine.is_complement_of(theirs)))
            .cloned()
            .collect();
        let counterpart_protocols = EndpointProtocols::build(&matched, true)?;

        let data_objects = SupportedDataObjectCollection::new(
            &local.supported_data_objects,
            &counterpart.supported_data_objects,
        )?;

        tracing::debug!(
            "Negotiated session with {} {}: {} protocols, {} data objects",
            counterpart.application_name,
            counterpart.application_version,
            local_protocols.len(),
            data_objects.len()
        );

        Ok(Self {
            local_protocols,
            counterpart_protocols,
            data_objects,
            local_capabilities: local.endpoint_capabilities.clone(),
            counterpart_capabilities: counterpart.endpoint_capabilities.clone(),
        })
    }

    /// Negotiated protocols from the local endpoint's perspective.
    pub fn local_protocols(&self) -> &EndpointProtocols {
        &self.local_protocols
    }

    /// Negotiated protocols as the counterpart declared them.
    pub fn counterpart_protocols(&self) -> &EndpointProtocols {
        &self.counterpart_protocols
    }

    /// Supported data objects, with counterpart capabilities attached.
    pub fn data_objects(&self) -> &SupportedDataObjectCollection {
        &self.data_objects
    }

    /// Endpoint capabilities the local side declared.
    pub fn local_capabilities(&self) -> &EndpointCapabilities {
        &self.local_capabilities
    }

    /// Endpoint capabilities the counterpart declared.
    pub fn counterpart_capabilities(&self) -> &EndpointCapabilities {
        &self.counterpart_capabilities
    }

    /// Check if a protocol survived negotiation.
    pub fn supports_protocol(&self, protocol: u16) -> bool {
        self.local_protocols.contains(protocol)
    }

    /// Header extensions may be sent only when both sides declared support.
    pub fn supports_message_header_extensions(&self) -> bool {
        self.local_capabilities.supports_message_header_extensions() == Some(true)
            && self.counterpart_capabilities.supports_message_header_extensions() == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DataObjectCapabilities, ProtocolCapabilities};
    use crate::endpoint::Role;
    use crate::error::EtpError;
    use crate::protocol::protocols;

    fn server() -> EndpointDeclaration {
        let mut caps = EndpointCapabilities::new();
        caps.set_supports_message_header_extensions(Some(true));
        let mut store = ProtocolCapabilities::new();
        store.set_max_response_count(Some(1000));

        EndpointDeclaration::builder("server", "1.0")
            .protocol(protocols::CORE, Role::Server, ProtocolCapabilities::new())
            .protocol(protocols::STORE, Role::Store, store)
            .protocol(protocols::DISCOVERY, Role::Store, ProtocolCapabilities::new())
            .data_object("witsml20.Well", DataObjectCapabilities::new())
            .endpoint_capabilities(caps)
            .build()
    }

    fn client() -> EndpointDeclaration {
        let mut customer = ProtocolCapabilities::new();
        customer.set_max_response_count(Some(50));

        EndpointDeclaration::builder("client", "2.0")
            .protocol(protocols::CORE, Role::Client, ProtocolCapabilities::new())
            .protocol(protocols::STORE, Role::Customer, customer)
            .build()
    }

    #[test]
    fn test_negotiate_keeps_shared_protocols() {
        let session = NegotiatedSession::negotiate(&server(), &client()).unwrap();

        assert!(session.supports_protocol(protocols::CORE));
        assert!(session.supports_protocol(protocols::STORE));
        assert!(!session.supports_protocol(protocols::DISCOVERY));

        let local = session.local_protocols().get(protocols::STORE).unwrap();
        assert_eq!(local.role(), Role::Store);
        assert_eq!(local.capabilities().max_response_count(), Some(1000));

        let theirs = session.counterpart_protocols().get(protocols::STORE).unwrap();
        assert_eq!(theirs.role(), Role::Customer);
        assert_eq!(theirs.counterpart_role(), Role::Store);
        assert_eq!(theirs.capabilities().max_response_count(), Some(50));
    }

    #[test]
    fn test_header_extensions_need_both_sides() {
        let session = NegotiatedSession::negotiate(&server(), &client()).unwrap();
        assert!(!session.supports_message_header_extensions());

        let mut client = client();
        client
            .endpoint_capabilities
            .set_supports_message_header_extensions(Some(true));
        let session = NegotiatedSession::negotiate(&server(), &client).unwrap();
        assert!(session.supports_message_header_extensions());
    }

    #[test]
    fn test_local_errors_propagate() {
        let mut bad = server();
        bad.supported_protocols[1].role = "overseer".to_string();
        let err = NegotiatedSession::negotiate(&bad, &client()).unwrap_err();
        assert!(matches!(err, EtpError::UnsupportedRole(_)));

        let bad = EndpointDeclaration::builder("server", "1.0")
            .data_object("Well", DataObjectCapabilities::new())
            .build();
        let err = NegotiatedSession::negotiate(&bad, &client()).unwrap_err();
        assert!(matches!(err, EtpError::InvalidDataObjectType(_)));
    }
}
