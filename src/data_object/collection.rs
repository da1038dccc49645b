//! Supported data object collection with specific-then-family lookup.
//!
//! # Example
//!
//! ```
//! use etpwire::capability::DataObjectCapabilities;
//! use etpwire::data_object::{SupportedDataObject, SupportedDataObjectCollection};
//!
//! let caps = DataObjectCapabilities::new();
//! let local = vec![
//!     SupportedDataObject::new("witsml20.Well", &caps),
//!     SupportedDataObject::new("witsml20.*", &caps),
//! ];
//! let collection = SupportedDataObjectCollection::from_local(&local).unwrap();
//!
//! let hit = collection.try_get_matching_str("witsml20.Log").unwrap().unwrap();
//! assert!(hit.is_family());
//! assert!(!collection.is_supported_str("prodml22.Report").unwrap());
//! ```

use std::collections::HashMap;

use super::object_type::{DataObjectType, SupportedDataObject};
use crate::capability::DataObjectCapabilities;
use crate::error::{EtpError, Result};

/// One supported type or family, with both sides' declared capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportedDataObjectEntry {
    data_object_type: DataObjectType,
    capabilities: DataObjectCapabilities,
    counterpart_capabilities: Option<DataObjectCapabilities>,
}

impl SupportedDataObjectEntry {
    /// Normalized qualified type, unique within a collection.
    #[inline]
    pub fn key(&self) -> &str {
        self.data_object_type.key()
    }

    /// Parsed type or family of this entry.
    #[inline]
    pub fn data_object_type(&self) -> &DataObjectType {
        &self.data_object_type
    }

    /// Capabilities declared locally.
    #[inline]
    pub fn capabilities(&self) -> &DataObjectCapabilities {
        &self.capabilities
    }

    /// Capabilities of the counterpart entry covering this one, if any.
    #[inline]
    pub fn counterpart_capabilities(&self) -> Option<&DataObjectCapabilities> {
        self.counterpart_capabilities.as_ref()
    }

    /// Check if the entry covers a whole family.
    #[inline]
    pub fn is_family(&self) -> bool {
        self.data_object_type.is_wildcard()
    }

    /// Local capabilities merged with the counterpart's, when present.
    pub fn negotiated_capabilities(&self) -> DataObjectCapabilities {
        match &self.counterpart_capabilities {
            Some(counterpart) => self.capabilities.merge(counterpart),
            None => self.capabilities.clone(),
        }
    }
}

/// Ordered, frozen collection of supported data objects.
///
/// Entries are partitioned by whether their key is a family wildcard.
/// Within each partition, iteration follows declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportedDataObjectCollection {
    entries: Vec<SupportedDataObjectEntry>,
    by_key: HashMap<String, usize>,
}

impl SupportedDataObjectCollection {
    /// Build from local declarations, attaching the capabilities the
    /// counterpart declared for each entry.
    ///
    /// A concrete local type takes the counterpart's exact entry, or else
    /// the counterpart's family wildcard. A local wildcard takes only the
    /// counterpart's wildcard for the same family. A repeated key keeps the
    /// first declaration. A counterpart declaration that does not parse is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EtpError::InvalidDataObjectType`] if a local
    /// declaration does not parse.
    pub fn new(
        local: &[SupportedDataObject],
        counterpart: &[SupportedDataObject],
    ) -> Result<Self> {
        let counterpart = Self::collect(counterpart, |declaration, err| {
            tracing::warn!(
                "Skipping counterpart data object declaration {}: {}",
                declaration.qualified_type,
                err
            );
            Ok(())
        })?;

        let mut collection = Self::collect(local, |_, err| Err(err))?;
        for entry in &mut collection.entries {
            let matched = if entry.is_family() {
                counterpart.get(&entry.data_object_type)
            } else {
                counterpart.try_get_matching_data_object(&entry.data_object_type)
            };
            entry.counterpart_capabilities = matched.map(|theirs| theirs.capabilities.clone());
        }

        tracing::debug!(
            "Built supported data objects: {} types, {} families",
            collection.supported_types().count(),
            collection.supported_families().count()
        );
        Ok(collection)
    }

    /// Build from local declarations alone.
    pub fn from_local(local: &[SupportedDataObject]) -> Result<Self> {
        Self::new(local, &[])
    }

    /// Parse declarations into entries without counterpart capabilities.
    ///
    /// `on_invalid` decides whether a declaration that does not parse is
    /// skipped (`Ok`) or fails the build.
    fn collect<F>(declarations: &[SupportedDataObject], mut on_invalid: F) -> Result<Self>
    where
        F: FnMut(&SupportedDataObject, EtpError) -> Result<()>,
    {
        let mut collection = SupportedDataObjectCollection::default();
        for declaration in declarations {
            let data_object_type = match declaration.data_object_type() {
                Ok(data_object_type) => data_object_type,
                Err(err) => {
                    on_invalid(declaration, err)?;
                    continue;
                }
            };
            let key = data_object_type.key().to_string();
            if collection.by_key.contains_key(&key) {
                tracing::warn!(
                    "Duplicate supported data object {}, keeping first declaration",
                    declaration.qualified_type
                );
                continue;
            }

            collection.by_key.insert(key, collection.entries.len());
            collection.entries.push(SupportedDataObjectEntry {
                data_object_type,
                capabilities: declaration.capabilities(),
                counterpart_capabilities: None,
            });
        }
        Ok(collection)
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[SupportedDataObjectEntry] {
        &self.entries
    }

    /// Concrete (non-wildcard) entries.
    pub fn supported_types(&self) -> impl Iterator<Item = &SupportedDataObjectEntry> {
        self.entries.iter().filter(|entry| !entry.is_family())
    }

    /// Family wildcard entries.
    pub fn supported_families(&self) -> impl Iterator<Item = &SupportedDataObjectEntry> {
        self.entries.iter().filter(|entry| entry.is_family())
    }

    /// Entry with exactly this key.
    pub fn get(&self, data_object_type: &DataObjectType) -> Option<&SupportedDataObjectEntry> {
        self.by_key
            .get(data_object_type.key())
            .map(|&index| &self.entries[index])
    }

    /// Most specific entry covering `data_object_type`.
    ///
    /// An exact concrete entry wins over its family wildcard. A wildcard
    /// query only matches the family entry.
    pub fn try_get_matching_data_object(
        &self,
        data_object_type: &DataObjectType,
    ) -> Option<&SupportedDataObjectEntry> {
        if let Some(entry) = self.get(data_object_type) {
            return Some(entry);
        }
        if data_object_type.is_wildcard() {
            return None;
        }
        self.supported_families()
            .find(|entry| data_object_type.is_in_family(entry.data_object_type.family_key()))
    }

    /// Check if `data_object_type` is covered by a concrete or family entry.
    pub fn is_supported(&self, data_object_type: &DataObjectType) -> bool {
        self.try_get_matching_data_object(data_object_type).is_some()
    }

    /// [`Self::try_get_matching_data_object`] for an unparsed qualified type.
    pub fn try_get_matching_str(
        &self,
        qualified: &str,
    ) -> Result<Option<&SupportedDataObjectEntry>> {
        let data_object_type: DataObjectType = qualified.parse()?;
        Ok(self.try_get_matching_data_object(&data_object_type))
    }

    /// [`Self::is_supported`] for an unparsed qualified type.
    pub fn is_supported_str(&self, qualified: &str) -> Result<bool> {
        Ok(self.try_get_matching_str(qualified)?.is_some())
    }

    /// Number of entries, concrete and family.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is supported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
