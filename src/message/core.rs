//! Core protocol (0) message bodies: session handshake, keep-alive, and errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::body::EtpMessage;
use super::registry::MessageDecoderRegistry;
use crate::capability::EndpointCapabilities;
use crate::data_object::SupportedDataObject;
use crate::endpoint::SupportedProtocol;
use crate::error::Result;
use crate::protocol::protocols;

/// Message type numbers of the core protocol.
pub mod message_types {
    /// [`super::RequestSession`]
    pub const REQUEST_SESSION: u16 = 1;
    /// [`super::OpenSession`]
    pub const OPEN_SESSION: u16 = 2;
    /// [`super::CloseSession`]
    pub const CLOSE_SESSION: u16 = 5;
    /// [`super::Ping`]
    pub const PING: u16 = 8;
    /// [`super::Pong`]
    pub const PONG: u16 = 9;
}

/// Sent by the client to open a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSession {
    /// Client application name.
    pub application_name: String,
    /// Client application version.
    pub application_version: String,
    /// Identifier of this client instance.
    #[serde(default)]
    pub client_instance_id: String,
    /// Protocols the client wants, with the role the server should play.
    pub requested_protocols: Vec<SupportedProtocol>,
    /// Data object types and families the client supports.
    #[serde(default)]
    pub supported_data_objects: Vec<SupportedDataObject>,
    /// Compression algorithms the client accepts, in preference order.
    #[serde(default)]
    pub supported_compression: Vec<String>,
    /// Data object formats the client accepts, e.g. `xml`.
    #[serde(default)]
    pub supported_formats: Vec<String>,
    /// Client clock, microseconds since the Unix epoch.
    #[serde(default)]
    pub current_date_time: i64,
    /// Oldest change the client still retains, same unit as `current_date_time`.
    #[serde(default)]
    pub earliest_retained_change_time: i64,
    /// Whether the client requires the server to authorize itself.
    #[serde(default)]
    pub server_authorization_required: bool,
    /// Session-wide client capabilities.
    #[serde(default)]
    pub endpoint_capabilities: EndpointCapabilities,
}

impl EtpMessage for RequestSession {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = message_types::REQUEST_SESSION;
}

/// Server reply accepting a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSession {
    /// Server application name.
    pub application_name: String,
    /// Server application version.
    pub application_version: String,
    /// Identifier of this server instance.
    #[serde(default)]
    pub server_instance_id: String,
    /// Protocols the server accepted, with its own roles.
    pub supported_protocols: Vec<SupportedProtocol>,
    /// Data object types and families the server supports.
    #[serde(default)]
    pub supported_data_objects: Vec<SupportedDataObject>,
    /// Compression algorithm chosen for the session, empty for none.
    #[serde(default)]
    pub supported_compression: String,
    /// Data object formats the server accepts.
    #[serde(default)]
    pub supported_formats: Vec<String>,
    /// Server clock, microseconds since the Unix epoch.
    #[serde(default)]
    pub current_date_time: i64,
    /// Oldest change the server still retains.
    #[serde(default)]
    pub earliest_retained_change_time: i64,
    /// Identifier assigned to the new session.
    #[serde(default)]
    pub session_id: String,
    /// Session-wide server capabilities.
    #[serde(default)]
    pub endpoint_capabilities: EndpointCapabilities,
}

impl EtpMessage for OpenSession {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = message_types::OPEN_SESSION;
}

/// Sent by either side to end the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSession {
    /// Free-text reason, may be empty.
    #[serde(default)]
    pub reason: String,
}

impl EtpMessage for CloseSession {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = message_types::CLOSE_SESSION;
}

/// Keep-alive request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    /// Sender clock, microseconds since the Unix epoch.
    pub current_date_time: i64,
}

impl EtpMessage for Ping {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = message_types::PING;
}

/// Keep-alive reply to [`Ping`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pong {
    /// Responder clock, microseconds since the Unix epoch.
    pub current_date_time: i64,
}

impl EtpMessage for Pong {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = message_types::PONG;
}

/// Error code and text carried by [`ProtocolException`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Human-readable description.
    pub message: String,
    /// Numeric error code.
    pub code: i32,
}

/// Error response. Either a single error or one per request item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolException {
    /// Error for the request as a whole.
    #[serde(default)]
    pub error: Option<ErrorInfo>,
    /// Errors keyed by the request item they refer to.
    #[serde(default)]
    pub errors: BTreeMap<String, ErrorInfo>,
}

impl EtpMessage for ProtocolException {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = protocols::EXCEPTION_MESSAGE_TYPE;
}

/// Receipt for a message that requested acknowledgement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledge {}

impl EtpMessage for Acknowledge {
    const PROTOCOL: u16 = protocols::CORE;
    const MESSAGE_TYPE: u16 = protocols::ACKNOWLEDGE_MESSAGE_TYPE;
}

/// Register every core protocol message with its default decoder.
///
/// Safe to call more than once.
pub fn register_core_messages(registry: &MessageDecoderRegistry) -> Result<()> {
    registry.register_message::<RequestSession>()?;
    registry.register_message::<OpenSession>()?;
    registry.register_message::<CloseSession>()?;
    registry.register_message::<Ping>()?;
    registry.register_message::<Pong>()?;
    registry.register_message::<ProtocolException>()?;
    registry.register_message::<Acknowledge>()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_message;
    use crate::endpoint::Role;
    use crate::protocol::{flags, MessageHeader, MessageTypeKey};

    #[test]
    fn test_register_core_messages() {
        let registry = MessageDecoderRegistry::new();
        register_core_messages(&registry).unwrap();
        register_core_messages(&registry).unwrap();

        assert_eq!(registry.len(), 7);
        assert!(registry.is_registered(0, 1));
        assert!(registry.is_registered(0, 1000));
        assert!(registry.is_registered(0, 1001));
        assert_eq!(registry.try_get_key::<Ping>(), Some(MessageTypeKey::new(0, 8)));
    }

    #[test]
    fn test_request_session_round_trip() {
        let registry = MessageDecoderRegistry::new();
        register_core_messages(&registry).unwrap();

        let mut caps = EndpointCapabilities::new();
        caps.set_supports_message_header_extensions(Some(true));
        let request = RequestSession {
            application_name: "reader".to_string(),
            application_version: "1.0".to_string(),
            requested_protocols: vec![SupportedProtocol::new(protocols::STORE, Role::Store)],
            endpoint_capabilities: caps,
            ..Default::default()
        };

        let header = MessageHeader::new(0, 1, 1, flags::FINAL_PART);
        let bytes = encode_message(&header, None, &request).unwrap();
        let message = registry.decode_bytes(bytes).unwrap();

        let decoded = message.into_body::<RequestSession>().unwrap();
        assert_eq!(decoded.application_name, "reader");
        assert_eq!(decoded.requested_protocols[0].role, "store");
        assert_eq!(
            decoded.endpoint_capabilities.supports_message_header_extensions(),
            Some(true)
        );
    }

    #[test]
    fn test_exception_and_acknowledge() {
        let registry = MessageDecoderRegistry::new();
        register_core_messages(&registry).unwrap();

        let exception = ProtocolException {
            error: Some(ErrorInfo {
                message: "not supported".to_string(),
                code: 7,
            }),
            errors: BTreeMap::new(),
        };
        let header = MessageHeader::new(0, 1000, 5, 0).correlated_with(4);
        let message = registry
            .decode_bytes(encode_message(&header, None, &exception).unwrap())
            .unwrap();
        assert_eq!(message.header().correlation_id, Some(4));
        assert_eq!(message.body::<ProtocolException>(), Some(&exception));

        let header = MessageHeader::new(0, 1001, 6, 0);
        let message = registry
            .decode_bytes(encode_message(&header, None, &Acknowledge {}).unwrap())
            .unwrap();
        assert!(message.is::<Acknowledge>());
    }
}
