//! Data object module - qualified types and the supported-object collection.
//!
//! - [`DataObjectType`] - parsed `witsml20.Well` / `witsml20.*`
//! - [`SupportedDataObjectCollection`] - concrete and family entries with fallback lookup

mod collection;
mod object_type;

pub use collection::{SupportedDataObjectCollection, SupportedDataObjectEntry};
pub use object_type::{DataObjectType, SupportedDataObject};
