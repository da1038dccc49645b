//! Codec module - serialization/deserialization for message bodies.
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (`to_vec_named`)
//! - [`BodyDecoder`] - sequential reader over header, extension and body
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! Decode functions registered with the message registry take a
//! `&mut BodyDecoder` positioned at the body.

mod body;
mod msgpack;

pub use body::{encode_message, read_body, BodyDecoder, EmptyBody};
pub use msgpack::MsgPackCodec;
