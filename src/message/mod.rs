//! Message module - typed bodies, the decoder registry, and core protocol messages.
//!
//! - [`MessageDecoderRegistry`] - (protocol, message type) <-> body type
//! - [`Message`] - decoded header, extension and type-erased body
//! - [`core`] - protocol 0 bodies and [`register_core_messages`]

mod body;
pub mod core;
mod registry;

pub use self::core::{
    register_core_messages, Acknowledge, CloseSession, ErrorInfo, OpenSession, Ping, Pong,
    ProtocolException, RequestSession,
};
pub use body::{EtpMessage, Message, MessageBody};
pub use registry::{MessageDecoderEntry, MessageDecoderRegistry};
