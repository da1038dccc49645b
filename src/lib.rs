//! # etpwire
//!
//! Message typing and capability negotiation for an ETP-style
//! structured-data exchange protocol.
//!
//! This crate sits between a transport that delivers MessagePack buffers
//! and the protocol handlers that act on typed messages. It does no I/O.
//!
//! ## Architecture
//!
//! - **Decoder registry** ([`message`]): (protocol, message type) to body type and back
//! - **Descriptors** ([`endpoint`]): per-protocol role, counterpart role and capabilities
//! - **Capabilities** ([`capability`]): typed, optional views over wire capability bags
//! - **Data objects** ([`data_object`]): supported types and families with fallback lookup
//! - **Field planner** ([`schema`]): per-field serialization decisions from a schema table
//!
//! ## Example
//!
//! ```
//! use etpwire::codec::encode_message;
//! use etpwire::message::{register_core_messages, MessageDecoderRegistry, Ping};
//! use etpwire::protocol::MessageHeader;
//!
//! let registry = MessageDecoderRegistry::new();
//! register_core_messages(&registry).unwrap();
//!
//! let header = MessageHeader::new(0, 8, 1, 0);
//! let bytes = encode_message(&header, None, &Ping { current_date_time: 42 }).unwrap();
//!
//! let message = registry.decode_bytes(bytes).unwrap();
//! assert_eq!(message.body::<Ping>().unwrap().current_date_time, 42);
//! ```

pub mod capability;
pub mod codec;
pub mod data_object;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod protocol;
pub mod schema;

mod session;

pub use error::{EtpError, Result};
pub use message::{Message, MessageDecoderRegistry};
pub use session::NegotiatedSession;
