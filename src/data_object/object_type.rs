//! Qualified data object types and their wire declarations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityBag, DataObjectCapabilities};
use crate::error::{EtpError, Result};

const WILDCARD: &str = "*";

/// A parsed qualified type: `witsml20.Well`, or the family wildcard `witsml20.*`.
///
/// Comparison and hashing use the normalized key, so `WITSML20.well` and
/// `witsml20.Well` are the same type.
#[derive(Debug, Clone)]
pub struct DataObjectType {
    qualified: String,
    family: String,
    version: String,
    object: String,
    key: String,
}

impl DataObjectType {
    /// Parse `<family><version digits>.<object>` or `<family><version digits>.*`.
    ///
    /// # Errors
    ///
    /// Returns [`EtpError::InvalidDataObjectType`] when the prefix is not
    /// letters followed by digits, or the object name is empty.
    pub fn parse(qualified: &str) -> Result<Self> {
        let invalid = || EtpError::InvalidDataObjectType(qualified.to_string());

        let (prefix, object) = qualified.split_once('.').ok_or_else(invalid)?;
        if object.is_empty() || object.contains('.') || object.contains(char::is_whitespace) {
            return Err(invalid());
        }

        let split = prefix
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (family, version) = prefix.split_at(split);
        if family.is_empty()
            || !family.chars().all(|c| c.is_ascii_alphabetic())
            || !version.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self {
            qualified: qualified.to_string(),
            family: family.to_string(),
            version: version.to_string(),
            object: object.to_string(),
            key: qualified.to_ascii_lowercase(),
        })
    }

    /// The wildcard type for a family prefix such as `witsml20`.
    pub fn family_wildcard(family_key: &str) -> Result<Self> {
        Self::parse(&format!("{family_key}.{WILDCARD}"))
    }

    /// Qualified type as declared.
    #[inline]
    pub fn qualified(&self) -> &str {
        &self.qualified
    }

    /// Family name without version, e.g. `witsml`.
    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Version digits, e.g. `20`.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Object name, or `*` for a wildcard.
    #[inline]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Normalized (lower-cased) qualified type.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Normalized family prefix, e.g. `witsml20`.
    pub fn family_key(&self) -> &str {
        let end = self.family.len() + self.version.len();
        &self.key[..end]
    }

    /// Check if this names a whole family.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.object == WILDCARD
    }

    /// Check if this type belongs to `family_key` (ASCII case-insensitive).
    pub fn is_in_family(&self, family_key: &str) -> bool {
        self.family_key().eq_ignore_ascii_case(family_key)
    }
}

impl PartialEq for DataObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DataObjectType {}

impl std::hash::Hash for DataObjectType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl FromStr for DataObjectType {
    type Err = EtpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DataObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}

/// One supported data object declaration, as sent during the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedDataObject {
    /// Qualified type or family wildcard.
    pub qualified_type: String,
    /// Declared capabilities for this type.
    #[serde(default)]
    pub data_object_capabilities: CapabilityBag,
}

impl SupportedDataObject {
    /// Declare a qualified type or wildcard with a copy of `capabilities`.
    pub fn new(qualified_type: impl Into<String>, capabilities: &DataObjectCapabilities) -> Self {
        Self {
            qualified_type: qualified_type.into(),
            data_object_capabilities: capabilities.clone_capabilities(),
        }
    }

    /// Parsed qualified type.
    pub fn data_object_type(&self) -> Result<DataObjectType> {
        self.qualified_type.parse()
    }

    /// Typed view over the declared capabilities.
    pub fn capabilities(&self) -> DataObjectCapabilities {
        DataObjectCapabilities::from_bag(&self.data_object_capabilities)
    }
}
