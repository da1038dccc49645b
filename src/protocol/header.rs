//! Message header and message identity.
//!
//! Every message on the wire starts with a header:
//! ```text
//! ┌──────────┬──────────────┬───────────────┬────────────┬───────────────┐
//! │ protocol │ messageType  │ correlationId │ messageId  │ messageFlags  │
//! │ u16      │ u16          │ i64 / nil     │ i64        │ u32           │
//! └──────────┴──────────────┴───────────────┴────────────┴───────────────┘
//! ```
//!
//! The byte layout is owned by the structured codec (MsgPack map). This module
//! only cares about the identity fields and the flag bits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityBag;

/// Flag constants for `messageFlags`.
pub mod flags {
    /// Message is one part of a multi-part message.
    pub const MULTI_PART: u32 = 0x01;
    /// Final part of a multi-part message.
    pub const FINAL_PART: u32 = 0x02;
    /// Response carries no data.
    pub const NO_DATA: u32 = 0x04;
    /// Body is compressed.
    pub const COMPRESSED: u32 = 0x08;
    /// Sender requests an acknowledgement.
    pub const ACKNOWLEDGE: u32 = 0x10;
    /// A header extension follows the header.
    pub const HAS_HEADER_EXTENSION: u32 = 0x20;

    /// Final part of a multi-part response: multi_part + final_part = 0x03
    pub const MULTI_PART_AND_FINAL_PART: u32 = MULTI_PART | FINAL_PART;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u32, flag: u32) -> bool {
        flags & flag != 0
    }
}

/// Wire-level identity of a message shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageTypeKey {
    /// Protocol number.
    pub protocol: u16,
    /// Message type number within the protocol.
    pub message_type: u16,
}

impl MessageTypeKey {
    /// Create a new key.
    pub const fn new(protocol: u16, message_type: u16) -> Self {
        Self {
            protocol,
            message_type,
        }
    }
}

impl fmt::Display for MessageTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.protocol, self.message_type)
    }
}

/// Decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    /// Protocol number.
    pub protocol: u16,
    /// Message type number.
    pub message_type: u16,
    /// Message this one responds to, if any.
    #[serde(default)]
    pub correlation_id: Option<i64>,
    /// Sender-assigned message id.
    pub message_id: i64,
    /// Flags (see `flags` module).
    #[serde(default)]
    pub message_flags: u32,
}

impl MessageHeader {
    /// Create a new header for a request or notification.
    pub fn new(protocol: u16, message_type: u16, message_id: i64, message_flags: u32) -> Self {
        Self {
            protocol,
            message_type,
            correlation_id: None,
            message_id,
            message_flags,
        }
    }

    /// Set the correlation id (responses).
    pub fn correlated_with(mut self, correlation_id: i64) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Key used to look up the decoder for this message.
    #[inline]
    pub fn key(&self) -> MessageTypeKey {
        MessageTypeKey::new(self.protocol, self.message_type)
    }

    /// Check if this message is part of a multi-part message.
    #[inline]
    pub fn is_multi_part(&self) -> bool {
        flags::has_flag(self.message_flags, flags::MULTI_PART)
    }

    /// Check if this is the final part.
    #[inline]
    pub fn is_final_part(&self) -> bool {
        flags::has_flag(self.message_flags, flags::FINAL_PART)
    }

    /// Check if the response carries no data.
    #[inline]
    pub fn is_no_data(&self) -> bool {
        flags::has_flag(self.message_flags, flags::NO_DATA)
    }

    /// Check if the body is compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        flags::has_flag(self.message_flags, flags::COMPRESSED)
    }

    /// Check if an acknowledgement was requested.
    #[inline]
    pub fn requests_acknowledge(&self) -> bool {
        flags::has_flag(self.message_flags, flags::ACKNOWLEDGE)
    }

    /// Check if a header extension follows.
    #[inline]
    pub fn has_header_extension(&self) -> bool {
        flags::has_flag(self.message_flags, flags::HAS_HEADER_EXTENSION)
    }
}

/// Optional block of extra named values sent after the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageHeaderExtension {
    /// Extension values by name.
    #[serde(default)]
    pub extension: CapabilityBag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_key() {
        let header = MessageHeader::new(3, 1, 7, 0);
        assert_eq!(header.key(), MessageTypeKey::new(3, 1));
        assert_eq!(header.key().to_string(), "3/1");
    }

    #[test]
    fn test_header_accessors() {
        let header = MessageHeader::new(
            4,
            6,
            10,
            flags::MULTI_PART_AND_FINAL_PART | flags::HAS_HEADER_EXTENSION,
        )
        .correlated_with(9);

        assert!(header.is_multi_part());
        assert!(header.is_final_part());
        assert!(header.has_header_extension());
        assert!(!header.is_no_data());
        assert!(!header.is_compressed());
        assert!(!header.requests_acknowledge());
        assert_eq!(header.correlation_id, Some(9));
    }

    #[test]
    fn test_flag_combinations() {
        assert_eq!(flags::MULTI_PART_AND_FINAL_PART, 0x03);
        assert!(flags::has_flag(0x30, flags::ACKNOWLEDGE));
        assert!(!flags::has_flag(0x30, flags::COMPRESSED));
    }

    #[test]
    fn test_header_serializes_camel_case() {
        let header = MessageHeader::new(0, 8, 2, flags::FINAL_PART);
        let json = serde_json::to_value(header).unwrap();

        assert_eq!(json["messageType"], 8);
        assert_eq!(json["messageId"], 2);
        assert_eq!(json["messageFlags"], 2);
        assert!(json["correlationId"].is_null());
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            MessageTypeKey::new(3, 2),
            MessageTypeKey::new(0, 9),
            MessageTypeKey::new(3, 1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                MessageTypeKey::new(0, 9),
                MessageTypeKey::new(3, 1),
                MessageTypeKey::new(3, 2),
            ]
        );
    }
}
