//! Protocol module - message header, flags, and protocol numbers.
//!
//! This module holds the wire-level identity of messages:
//! - [`MessageHeader`] with typed flag accessors
//! - [`MessageTypeKey`] used by the decoder registry
//! - [`Version`] of a declared protocol
//! - well-known protocol numbers

mod header;
mod version;

pub use header::{flags, MessageHeader, MessageHeaderExtension, MessageTypeKey};
pub use version::{Version, PROTOCOL_VERSION};

/// Well-known protocol numbers.
pub mod protocols {
    /// Session management (RequestSession, Ping, ...).
    pub const CORE: u16 = 0;
    /// Channel streaming.
    pub const CHANNEL_STREAMING: u16 = 1;
    /// Channel data frames.
    pub const CHANNEL_DATA_FRAME: u16 = 2;
    /// Discovery of the data object graph.
    pub const DISCOVERY: u16 = 3;
    /// Data object get/put/delete.
    pub const STORE: u16 = 4;
    /// Store change notifications.
    pub const STORE_NOTIFICATION: u16 = 5;
    /// Growing object parts.
    pub const GROWING_OBJECT: u16 = 6;
    /// Dataspace management.
    pub const DATASPACE: u16 = 24;
    /// Queries against the store.
    pub const DISCOVERY_QUERY: u16 = 13;
    /// Store transactions.
    pub const TRANSACTION: u16 = 18;

    /// Reserved for exceptions that span protocols.
    pub const EXCEPTION_MESSAGE_TYPE: u16 = 1000;
    /// Acknowledge message type, valid in every protocol.
    pub const ACKNOWLEDGE_MESSAGE_TYPE: u16 = 1001;
}
