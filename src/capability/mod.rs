//! Capability module - untyped capability bags and typed views over them.
//!
//! Capabilities travel on the wire as a map of name to [`DataValue`].
//! The typed wrappers ([`EndpointCapabilities`], [`ProtocolCapabilities`],
//! [`DataObjectCapabilities`]) expose named, optional accessors over a
//! private copy of that map:
//!
//! - unset reads return `None`, never a default
//! - `clone_capabilities` returns a deep, independent copy
//! - `save_to` writes held values into another bag without clearing it

mod dictionary;
mod kinds;
mod value;

pub use dictionary::CapabilityDictionary;
pub use kinds::{DataObjectCapabilities, EndpointCapabilities, ProtocolCapabilities};
pub use value::{CapabilityBag, DataValue};
