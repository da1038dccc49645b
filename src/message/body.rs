//! Typed message bodies and the decoded [`Message`].

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EtpError, Result};
use crate::protocol::{MessageHeader, MessageHeaderExtension, MessageTypeKey};

/// Any value that can be the body of a decoded message.
///
/// Implemented for every `Debug + Send + Sync + 'static` type.
pub trait MessageBody: fmt::Debug + Send + Sync + 'static {
    /// Borrow as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Convert into `Any` for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: fmt::Debug + Send + Sync + 'static> MessageBody for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

/// A message body with a fixed wire identity.
///
/// # Example
///
/// ```
/// use etpwire::message::EtpMessage;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct GetResources {
///     context: String,
/// }
///
/// impl EtpMessage for GetResources {
///     const PROTOCOL: u16 = 3;
///     const MESSAGE_TYPE: u16 = 1;
/// }
///
/// assert_eq!(GetResources::key().to_string(), "3/1");
/// ```
pub trait EtpMessage: MessageBody + Serialize + DeserializeOwned {
    /// Protocol number.
    const PROTOCOL: u16;
    /// Message type number within the protocol.
    const MESSAGE_TYPE: u16;

    /// Wire key of this message type.
    fn key() -> MessageTypeKey {
        MessageTypeKey::new(Self::PROTOCOL, Self::MESSAGE_TYPE)
    }
}

/// A decoded message: header, optional extension, and typed body.
#[derive(Debug)]
pub struct Message {
    header: MessageHeader,
    extension: Option<MessageHeaderExtension>,
    body: Box<dyn MessageBody>,
    body_type: &'static str,
}

impl Message {
    /// Assemble a message from its parts.
    pub fn new(
        header: MessageHeader,
        extension: Option<MessageHeaderExtension>,
        body: Box<dyn MessageBody>,
        body_type: &'static str,
    ) -> Self {
        Self {
            header,
            extension,
            body,
            body_type,
        }
    }

    /// Message header.
    #[inline]
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Header extension, if one was sent.
    #[inline]
    pub fn extension(&self) -> Option<&MessageHeaderExtension> {
        self.extension.as_ref()
    }

    /// Name of the concrete body type.
    #[inline]
    pub fn body_type(&self) -> &'static str {
        self.body_type
    }

    /// Check if the body is a `T`.
    pub fn is<T: MessageBody>(&self) -> bool {
        self.body::<T>().is_some()
    }

    /// Borrow the body as a `T`.
    pub fn body<T: MessageBody>(&self) -> Option<&T> {
        MessageBody::as_any(&*self.body).downcast_ref::<T>()
    }

    /// Take the body as a `T`.
    ///
    /// # Errors
    ///
    /// Returns a decode error naming both types if the body is not a `T`.
    pub fn into_body<T: MessageBody>(self) -> Result<T> {
        let body_type = self.body_type;
        MessageBody::into_any(self.body)
            .downcast::<T>()
            .map(|body| *body)
            .map_err(|_| {
                EtpError::Decode(format!(
                    "message body is {}, not {}",
                    body_type,
                    std::any::type_name::<T>()
                ))
            })
    }
}
