//! Decoder registry for dispatching messages by (protocol, message type).
//!
//! The registry maps wire keys to body types and decode functions, and body
//! types back to wire keys. Protocol modules register their messages at
//! start-up; message handling tasks then resolve headers concurrently.
//!
//! # Concurrency
//!
//! Readers load an immutable snapshot through `ArcSwap` and never lock.
//! Writers are serialized by a mutex and publish a new snapshot
//! (copy-on-write), so registration after traffic has started is safe
//! but not cheap.
//!
//! # Example
//!
//! ```
//! use etpwire::codec::{encode_message, read_body, BodyDecoder};
//! use etpwire::message::MessageDecoderRegistry;
//! use etpwire::protocol::MessageHeader;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Ping {
//!     current_date_time: i64,
//! }
//!
//! let registry = MessageDecoderRegistry::new();
//! registry.register(3, 1, read_body::<Ping>).unwrap();
//!
//! let header = MessageHeader::new(3, 1, 1, 0);
//! let bytes = encode_message(&header, None, &Ping { current_date_time: 0 }).unwrap();
//! let message = registry.decode_bytes(bytes).unwrap();
//! assert!(message.is::<Ping>());
//! ```

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use parking_lot::Mutex;

use super::body::{EtpMessage, Message, MessageBody};
use crate::codec::{read_body, BodyDecoder};
use crate::error::{EtpError, Result};
use crate::protocol::{MessageHeader, MessageHeaderExtension, MessageTypeKey};

/// Type-erased decode function stored in the registry.
type ErasedDecodeFn = Arc<dyn Fn(&mut BodyDecoder) -> Result<Box<dyn MessageBody>> + Send + Sync>;

/// Registered decoder for one message type.
#[derive(Clone)]
pub struct MessageDecoderEntry {
    key: MessageTypeKey,
    body_type: TypeId,
    body_type_name: &'static str,
    /// Type of the registered decode function, for identity checks.
    decode_type: TypeId,
    decode: ErasedDecodeFn,
}

impl MessageDecoderEntry {
    fn new<T, F>(key: MessageTypeKey, decode: F) -> Self
    where
        T: MessageBody,
        F: Fn(&mut BodyDecoder) -> Result<T> + Copy + Send + Sync + 'static,
    {
        let erased: ErasedDecodeFn = Arc::new(move |decoder: &mut BodyDecoder| {
            decode(decoder).map(|body| Box::new(body) as Box<dyn MessageBody>)
        });
        Self {
            key,
            body_type: TypeId::of::<T>(),
            body_type_name: type_name::<T>(),
            decode_type: TypeId::of::<F>(),
            decode: erased,
        }
    }

    /// Wire key of this entry.
    #[inline]
    pub fn key(&self) -> MessageTypeKey {
        self.key
    }

    /// Name of the concrete body type.
    #[inline]
    pub fn body_type_name(&self) -> &'static str {
        self.body_type_name
    }

    /// Check if this entry was registered for body type `T`.
    #[inline]
    pub fn is_body_type<T: MessageBody>(&self) -> bool {
        self.body_type == TypeId::of::<T>()
    }

    fn same_registration(&self, other: &MessageDecoderEntry) -> bool {
        self.body_type == other.body_type && self.decode_type == other.decode_type
    }
}

impl std::fmt::Debug for MessageDecoderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDecoderEntry")
            .field("key", &self.key)
            .field("body_type", &self.body_type_name)
            .finish_non_exhaustive()
    }
}

/// Immutable snapshot of the forward and reverse tables.
#[derive(Clone, Default)]
struct DecoderTables {
    /// Decoders by wire key (for dispatch).
    by_key: HashMap<MessageTypeKey, MessageDecoderEntry>,
    /// Wire key by body type (for outbound headers).
    by_type: HashMap<TypeId, MessageTypeKey>,
}

/// Registry mapping wire keys to decoders and body types to wire keys.
///
/// Entries are append-only: nothing is ever removed.
pub struct MessageDecoderRegistry {
    tables: ArcSwap<DecoderTables>,
    writer: Mutex<()>,
}

impl MessageDecoderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tables: ArcSwap::from_pointee(DecoderTables::default()),
            writer: Mutex::new(()),
        }
    }

    /// Register a decode function for body type `T` under a wire key.
    ///
    /// `decode` is called with the decoder positioned at the body.
    /// Registering the same `T` and `decode` under the same key again is a
    /// no-op. Decode functions compare by type, so pass a function item
    /// such as `read_body::<T>` rather than a function pointer.
    ///
    /// # Errors
    ///
    /// Returns [`EtpError::Conflict`] if the key is taken by a different
    /// registration, or if `T` is already registered under another key.
    pub fn register<T, F>(&self, protocol: u16, message_type: u16, decode: F) -> Result<()>
    where
        T: MessageBody,
        F: Fn(&mut BodyDecoder) -> Result<T> + Copy + Send + Sync + 'static,
    {
        let key = MessageTypeKey::new(protocol, message_type);
        let entry = MessageDecoderEntry::new(key, decode);

        let _guard = self.writer.lock();
        let current = self.tables.load();

        if let Some(existing) = current.by_key.get(&key) {
            if existing.same_registration(&entry) {
                tracing::debug!("Message {} already registered as {}", key, entry.body_type_name);
                return Ok(());
            }
            tracing::warn!(
                "Rejected registration of {} for message {}: taken by {}",
                entry.body_type_name,
                key,
                existing.body_type_name
            );
            return Err(EtpError::Conflict(format!(
                "message {} is already registered to {}",
                key, existing.body_type_name
            )));
        }

        if let Some(other_key) = current.by_type.get(&entry.body_type) {
            tracing::warn!(
                "Rejected registration of {} for message {}: already registered as {}",
                entry.body_type_name,
                key,
                other_key
            );
            return Err(EtpError::Conflict(format!(
                "{} is already registered as message {}",
                entry.body_type_name, other_key
            )));
        }

        let mut next = DecoderTables::clone(&current);
        next.by_type.insert(entry.body_type, key);
        tracing::debug!("Registered message {} as {}", key, entry.body_type_name);
        next.by_key.insert(key, entry);
        self.tables.store(Arc::new(next));
        Ok(())
    }

    /// Register a message type under its own wire key with the default
    /// MsgPack decode function.
    pub fn register_message<T: EtpMessage>(&self) -> Result<()> {
        self.register(T::PROTOCOL, T::MESSAGE_TYPE, read_body::<T>)
    }

    /// Check if a wire key has a decoder.
    pub fn is_registered(&self, protocol: u16, message_type: u16) -> bool {
        self.tables
            .load()
            .by_key
            .contains_key(&MessageTypeKey::new(protocol, message_type))
    }

    /// Check if body type `T` is registered.
    pub fn is_type_registered<T: MessageBody>(&self) -> bool {
        self.tables.load().by_type.contains_key(&TypeId::of::<T>())
    }

    /// Wire key registered for body type `T`.
    pub fn try_get_key<T: MessageBody>(&self) -> Option<MessageTypeKey> {
        self.tables.load().by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Protocol number registered for body type `T`, `None` if unregistered.
    pub fn try_get_protocol<T: MessageBody>(&self) -> Option<u16> {
        self.try_get_key::<T>().map(|key| key.protocol)
    }

    /// Message type number registered for body type `T`, `None` if unregistered.
    pub fn try_get_message_type<T: MessageBody>(&self) -> Option<u16> {
        self.try_get_key::<T>().map(|key| key.message_type)
    }

    /// Entry registered under a wire key.
    pub fn entry(&self, key: MessageTypeKey) -> Option<MessageDecoderEntry> {
        self.tables.load().by_key.get(&key).cloned()
    }

    /// Number of registered message types.
    pub fn len(&self) -> usize {
        self.tables.load().by_key.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.load().by_key.is_empty()
    }

    /// All registered wire keys, sorted.
    pub fn keys(&self) -> Vec<MessageTypeKey> {
        let mut keys: Vec<_> = self.tables.load().by_key.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Decode the body of a message whose header has already been read.
    ///
    /// # Errors
    ///
    /// - [`EtpError::UnknownMessageType`] if the header's key has no decoder;
    ///   the decoder is not touched in that case.
    /// - Whatever the registered decode function returns, unchanged.
    pub fn decode_message(
        &self,
        header: &MessageHeader,
        extension: Option<MessageHeaderExtension>,
        decoder: &mut BodyDecoder,
    ) -> Result<Message> {
        let key = header.key();
        let tables = self.tables.load();
        let entry = match tables.by_key.get(&key) {
            Some(entry) => entry,
            None => {
                tracing::warn!(
                    "Unknown message type {} (message id {})",
                    key,
                    header.message_id
                );
                return Err(EtpError::UnknownMessageType {
                    protocol: key.protocol,
                    message_type: key.message_type,
                });
            }
        };

        tracing::trace!("Decoding message {} as {}", key, entry.body_type_name);
        let body = (entry.decode)(decoder)?;
        Ok(Message::new(*header, extension, body, entry.body_type_name))
    }

    /// Decode a complete message buffer: header, extension (if flagged), body.
    pub fn decode_bytes(&self, bytes: impl Into<Bytes>) -> Result<Message> {
        let mut decoder = BodyDecoder::new(bytes);
        let header = decoder.read_header()?;
        let extension = decoder.read_extension(&header)?;
        self.decode_message(&header, extension, &mut decoder)
    }
}

impl Default for MessageDecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageDecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDecoderRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
