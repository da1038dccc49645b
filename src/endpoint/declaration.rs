//! Endpoint declarations: everything one side states during the handshake.
//!
//! A declaration is either built in code with [`EndpointDeclaration::builder`],
//! loaded from JSON, or taken from a received `RequestSession` / `OpenSession`.

use serde::{Deserialize, Serialize};

use super::descriptor::SupportedProtocol;
use super::role::Role;
use crate::capability::{DataObjectCapabilities, EndpointCapabilities, ProtocolCapabilities};
use crate::data_object::SupportedDataObject;
use crate::error::Result;
use crate::message::{OpenSession, RequestSession};
use crate::protocol::Version;

/// Protocols, data objects and capabilities declared by one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDeclaration {
    /// Application name.
    pub application_name: String,
    /// Application version.
    pub application_version: String,
    /// Protocols with the declaring endpoint's own roles.
    #[serde(default)]
    pub supported_protocols: Vec<SupportedProtocol>,
    /// Supported data object types and families.
    #[serde(default)]
    pub supported_data_objects: Vec<SupportedDataObject>,
    /// Session-wide capabilities.
    #[serde(default)]
    pub endpoint_capabilities: EndpointCapabilities,
}

impl EndpointDeclaration {
    /// Start building a declaration.
    pub fn builder(
        application_name: impl Into<String>,
        application_version: impl Into<String>,
    ) -> EndpointDeclarationBuilder {
        EndpointDeclarationBuilder::new(application_name, application_version)
    }

    /// Load a declaration from JSON text.
    ///
    /// ```
    /// use etpwire::endpoint::EndpointDeclaration;
    ///
    /// let declaration = EndpointDeclaration::from_json(r#"{
    ///     "applicationName": "store",
    ///     "applicationVersion": "2.1",
    ///     "supportedProtocols": [
    ///         { "protocol": 4, "role": "store" }
    ///     ],
    ///     "supportedDataObjects": [
    ///         { "qualifiedType": "witsml20.*" }
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert_eq!(declaration.supported_protocols[0].protocol, 4);
    /// assert!(declaration.endpoint_capabilities.is_empty());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<RequestSession> for EndpointDeclaration {
    /// Requested protocols name the role the server should play; the
    /// declaration carries the client's own role instead. Unknown roles are
    /// kept as sent and rejected at negotiation.
    fn from(request: RequestSession) -> Self {
        let supported_protocols = request
            .requested_protocols
            .into_iter()
            .map(|mut protocol| {
                if let Ok(role) = protocol.parsed_role() {
                    protocol.role = role.complement().as_str().to_string();
                }
                protocol
            })
            .collect();

        Self {
            application_name: request.application_name,
            application_version: request.application_version,
            supported_protocols,
            supported_data_objects: request.supported_data_objects,
            endpoint_capabilities: request.endpoint_capabilities,
        }
    }
}

impl From<OpenSession> for EndpointDeclaration {
    fn from(open: OpenSession) -> Self {
        Self {
            application_name: open.application_name,
            application_version: open.application_version,
            supported_protocols: open.supported_protocols,
            supported_data_objects: open.supported_data_objects,
            endpoint_capabilities: open.endpoint_capabilities,
        }
    }
}

/// Builder for [`EndpointDeclaration`].
///
/// # Example
///
/// ```
/// use etpwire::capability::{DataObjectCapabilities, ProtocolCapabilities};
/// use etpwire::endpoint::{EndpointDeclaration, Role};
/// use etpwire::protocol::protocols;
///
/// let mut get_only = DataObjectCapabilities::new();
/// get_only.set_supports_get(Some(true));
///
/// let declaration = EndpointDeclaration::builder("reader", "1.0")
///     .protocol(protocols::DISCOVERY, Role::Store, ProtocolCapabilities::new())
///     .protocol(protocols::STORE, Role::Store, ProtocolCapabilities::new())
///     .data_object("witsml20.Well", get_only)
///     .build();
///
/// assert_eq!(declaration.supported_protocols.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EndpointDeclarationBuilder {
    declaration: EndpointDeclaration,
}

impl EndpointDeclarationBuilder {
    /// Create a builder with no protocols, data objects or capabilities.
    pub fn new(
        application_name: impl Into<String>,
        application_version: impl Into<String>,
    ) -> Self {
        Self {
            declaration: EndpointDeclaration {
                application_name: application_name.into(),
                application_version: application_version.into(),
                ..Default::default()
            },
        }
    }

    /// Declare a protocol at the current protocol version.
    pub fn protocol(self, protocol: u16, role: Role, capabilities: ProtocolCapabilities) -> Self {
        self.supported_protocol(
            SupportedProtocol::new(protocol, role).with_capabilities(&capabilities),
        )
    }

    /// Declare a protocol at a specific version.
    pub fn protocol_with_version(
        self,
        protocol: u16,
        version: Version,
        role: Role,
        capabilities: ProtocolCapabilities,
    ) -> Self {
        self.supported_protocol(
            SupportedProtocol::new(protocol, role)
                .with_version(version)
                .with_capabilities(&capabilities),
        )
    }

    /// Declare a protocol from a ready-made wire declaration.
    pub fn supported_protocol(mut self, protocol: SupportedProtocol) -> Self {
        self.declaration.supported_protocols.push(protocol);
        self
    }

    /// Declare a supported data object type or family wildcard.
    pub fn data_object(
        mut self,
        qualified_type: impl Into<String>,
        capabilities: DataObjectCapabilities,
    ) -> Self {
        self.declaration
            .supported_data_objects
            .push(SupportedDataObject::new(qualified_type, &capabilities));
        self
    }

    /// Set endpoint-wide capabilities (default: none declared).
    pub fn endpoint_capabilities(mut self, capabilities: EndpointCapabilities) -> Self {
        self.declaration.endpoint_capabilities = capabilities;
        self
    }

    /// Finish the declaration.
    ///
    /// Nothing is validated here; roles and qualified types are checked
    /// when the declaration is negotiated.
    pub fn build(self) -> EndpointDeclaration {
        self.declaration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{protocols, PROTOCOL_VERSION};

    #[test]
    fn test_builder_defaults() {
        let declaration = EndpointDeclaration::builder("app", "0.1").build();
        assert_eq!(declaration.application_name, "app");
        assert!(declaration.supported_protocols.is_empty());
        assert!(declaration.supported_data_objects.is_empty());
        assert!(declaration.endpoint_capabilities.is_empty());
    }

    #[test]
    fn test_builder_protocols() {
        let mut caps = ProtocolCapabilities::new();
        caps.set_max_response_count(Some(500));

        let declaration = EndpointDeclaration::builder("app", "0.1")
            .protocol(protocols::STORE, Role::Store, caps)
            .protocol_with_version(
                protocols::CHANNEL_STREAMING,
                Version::new(1, 1, 0, 0),
                Role::Producer,
                ProtocolCapabilities::new(),
            )
            .build();

        let store = &declaration.supported_protocols[0];
        assert_eq!(store.protocol_version, PROTOCOL_VERSION);
        assert_eq!(store.role, "store");
        assert_eq!(
            ProtocolCapabilities::from_bag(&store.protocol_capabilities).max_response_count(),
            Some(500)
        );
        assert_eq!(
            declaration.supported_protocols[1].protocol_version,
            Version::new(1, 1, 0, 0)
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(EndpointDeclaration::from_json("{").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut endpoint = EndpointCapabilities::new();
        endpoint.set_max_part_size(Some(65_536));
        let declaration = EndpointDeclaration::builder("app", "0.1")
            .protocol(protocols::DISCOVERY, Role::Customer, ProtocolCapabilities::new())
            .data_object("eml23.*", DataObjectCapabilities::new())
            .endpoint_capabilities(endpoint)
            .build();

        let json = serde_json::to_string(&declaration).unwrap();
        let back = EndpointDeclaration::from_json(&json).unwrap();
        assert_eq!(back.supported_protocols, declaration.supported_protocols);
        assert_eq!(back.supported_data_objects[0].qualified_type, "eml23.*");
        assert_eq!(back.endpoint_capabilities.max_part_size(), Some(65_536));
    }

    #[test]
    fn test_from_handshake_messages() {
        let request = RequestSession {
            application_name: "client".to_string(),
            application_version: "3".to_string(),
            requested_protocols: vec![SupportedProtocol::new(protocols::STORE, Role::Store)],
            ..Default::default()
        };
        let declaration = EndpointDeclaration::from(request);
        assert_eq!(declaration.application_name, "client");
        assert_eq!(declaration.supported_protocols[0].role, "customer");

        let open = OpenSession {
            application_name: "server".to_string(),
            session_id: "abc".to_string(),
            ..Default::default()
        };
        let declaration = EndpointDeclaration::from(open);
        assert_eq!(declaration.application_name, "server");
        assert!(declaration.supported_protocols.is_empty());
    }
}
