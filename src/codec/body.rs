//! Sequential reader over a message buffer.
//!
//! A message is laid out as consecutive MsgPack values:
//! ```text
//! ┌──────────────┬─────────────────────────────┬──────────────┐
//! │ header (map) │ extension (map, if flagged) │ body (map)   │
//! └──────────────┴─────────────────────────────┴──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use etpwire::codec::{encode_message, BodyDecoder};
//! use etpwire::protocol::MessageHeader;
//!
//! let header = MessageHeader::new(0, 8, 1, 0);
//! let bytes = encode_message(&header, None, &"body").unwrap();
//!
//! let mut decoder = BodyDecoder::new(bytes);
//! assert_eq!(decoder.read_header().unwrap(), header);
//! assert!(decoder.read_extension(&header).unwrap().is_none());
//! assert_eq!(decoder.read::<String>().unwrap(), "body");
//! assert!(decoder.is_empty());
//! ```

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::MsgPackCodec;
use crate::error::Result;
use crate::protocol::{flags, MessageHeader, MessageHeaderExtension};

/// Reader positioned inside a message buffer.
///
/// A failed read leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct BodyDecoder {
    buf: Bytes,
    position: usize,
}

impl BodyDecoder {
    /// Create a decoder positioned at the start of `buf`.
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            position: 0,
        }
    }

    /// Current read position in bytes.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    /// Check if everything has been read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unread bytes (zero-copy).
    pub fn remaining_bytes(&self) -> Bytes {
        self.buf.slice(self.position..)
    }

    /// Read the next MsgPack value.
    ///
    /// # Errors
    ///
    /// Returns a MsgPack decode error if the next value is not a `T`.
    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T> {
        let mut rest: &[u8] = &self.buf[self.position..];
        let before = rest.len();
        let value = {
            let mut de = rmp_serde::Deserializer::new(&mut rest);
            T::deserialize(&mut de)?
        };
        self.position += before - rest.len();
        Ok(value)
    }

    /// Read the message header.
    pub fn read_header(&mut self) -> Result<MessageHeader> {
        self.read()
    }

    /// Read the header extension if the header says one follows.
    pub fn read_extension(
        &mut self,
        header: &MessageHeader,
    ) -> Result<Option<MessageHeaderExtension>> {
        if header.has_header_extension() {
            self.read().map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Default decode function: read the body as a MsgPack map.
pub fn read_body<T: DeserializeOwned>(decoder: &mut BodyDecoder) -> Result<T> {
    decoder.read()
}

/// Encode header, optional extension and body into one buffer.
///
/// The `HAS_HEADER_EXTENSION` flag is set or cleared to match `extension`.
pub fn encode_message<T: Serialize>(
    header: &MessageHeader,
    extension: Option<&MessageHeaderExtension>,
    body: &T,
) -> Result<Bytes> {
    let mut header = *header;
    if extension.is_some() {
        header.message_flags |= flags::HAS_HEADER_EXTENSION;
    } else {
        header.message_flags &= !flags::HAS_HEADER_EXTENSION;
    }

    let mut buf = Vec::with_capacity(64);
    MsgPackCodec::encode_into(&mut buf, &header)?;
    if let Some(extension) = extension {
        MsgPackCodec::encode_into(&mut buf, extension)?;
    }
    MsgPackCodec::encode_into(&mut buf, body)?;
    Ok(Bytes::from(buf))
}

/// Empty body for messages that carry no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyBody {}
