//! Error types for etpwire.

use thiserror::Error;

/// Main error type for all etpwire operations.
#[derive(Debug, Error)]
pub enum EtpError {
    /// Incompatible duplicate registration (decoder or protocol descriptor).
    #[error("Registration conflict: {0}")]
    Conflict(String),

    /// Header references a (protocol, message type) pair with no decoder.
    #[error("Unknown message type: protocol {protocol}, message type {message_type}")]
    UnknownMessageType {
        /// Protocol number from the header.
        protocol: u16,
        /// Message type number from the header.
        message_type: u16,
    },

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// Malformed payload reported by a decode function.
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON error (schema text and declaration files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Role outside the closed role vocabulary.
    #[error("Unsupported role: {0}")]
    UnsupportedRole(String),

    /// Schema does not describe a field the way its static type expects.
    ///
    /// Never fatal: the field planner falls back to default handling.
    #[error("Schema mismatch for {record}.{field}: {reason}")]
    SchemaMismatch {
        /// Owning record type name.
        record: String,
        /// Field name.
        field: String,
        /// What did not match.
        reason: String,
    },

    /// Schema text that cannot be read into a record schema.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Qualified data object type that does not parse.
    #[error("Invalid data object type: {0}")]
    InvalidDataObjectType(String),
}

/// Result type alias using EtpError.
pub type Result<T> = std::result::Result<T, EtpError>;
