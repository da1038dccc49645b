//! Capability dictionary: a typed-access wrapper over an untyped bag.
//!
//! # Example
//!
//! ```
//! use etpwire::capability::{CapabilityBag, CapabilityDictionary};
//!
//! let mut dictionary = CapabilityDictionary::new();
//! dictionary.set("SupportsGet", true);
//!
//! let mut copy = dictionary.clone_capabilities();
//! copy.clear();
//! assert_eq!(dictionary.get_bool("SupportsGet"), Some(true));
//!
//! let mut target = CapabilityBag::new();
//! dictionary.save_to(&mut target);
//! assert_eq!(target.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use super::value::{CapabilityBag, DataValue};

/// Named capability values with optional typed reads.
///
/// Reading a name that was never set returns `None`. Nothing is ever
/// defaulted on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityDictionary {
    values: CapabilityBag,
}

impl CapabilityDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dictionary holding a copy of `bag`.
    pub fn from_bag(bag: &CapabilityBag) -> Self {
        Self {
            values: bag.clone(),
        }
    }

    /// Consume the dictionary and return its bag.
    pub fn into_bag(self) -> CapabilityBag {
        self.values
    }

    /// Deep, independent copy of the held values.
    pub fn clone_capabilities(&self) -> CapabilityBag {
        self.values.clone()
    }

    /// Write every held value into `target`.
    ///
    /// Same-named entries are overwritten; other entries in `target` are kept.
    pub fn save_to(&self, target: &mut CapabilityBag) {
        for (name, value) in &self.values {
            target.insert(name.clone(), value.clone());
        }
    }

    /// Read every value from `source`, overwriting same-named entries.
    pub fn load_from(&mut self, source: &CapabilityBag) {
        for (name, value) in source {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Raw value by name.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.values.get(name)
    }

    /// Boolean value by name. `None` if unset or not a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(DataValue::as_bool)
    }

    /// 32-bit integer value by name. `None` if unset, not an integer, or out of range.
    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(DataValue::as_i32)
    }

    /// 64-bit integer value by name.
    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(DataValue::as_i64)
    }

    /// Text value by name.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(DataValue::as_str)
    }

    /// Set a value.
    pub fn set(&mut self, name: &str, value: impl Into<DataValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Set a value, or clear it when `value` is `None`.
    pub fn set_optional(&mut self, name: &str, value: Option<DataValue>) {
        match value {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.remove(name);
            }
        }
    }

    /// Remove a value, returning it if it was set.
    pub fn remove(&mut self, name: &str) -> Option<DataValue> {
        self.values.remove(name)
    }

    /// Check if a value is set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of set values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over set values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<CapabilityBag> for CapabilityDictionary {
    fn from(values: CapabilityBag) -> Self {
        Self { values }
    }
}

/// Generates a typed capability wrapper with optional accessors.
///
/// Each entry declares the wire name, an associated constant, a getter,
/// a setter and the value kind (`bool`, `int` or `long`).
macro_rules! capability_type {
    (@ty bool) => { bool };
    (@ty int) => { i32 };
    (@ty long) => { i64 };
    (@get $dict:expr, $key:expr, bool) => { $dict.get_bool($key) };
    (@get $dict:expr, $key:expr, int) => { $dict.get_int($key) };
    (@get $dict:expr, $key:expr, long) => { $dict.get_long($key) };
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $konst:ident = $key:literal => $getter:ident, $setter:ident: $kind:tt;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            dictionary: $crate::capability::CapabilityDictionary,
        }

        impl $name {
            $(
                #[doc = concat!("Wire name of `", $key, "`.")]
                pub const $konst: &'static str = $key;
            )*

            /// Create an empty set (nothing declared).
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap a copy of an untyped bag.
            pub fn from_bag(bag: &$crate::capability::CapabilityBag) -> Self {
                Self {
                    dictionary: $crate::capability::CapabilityDictionary::from_bag(bag),
                }
            }

            /// Underlying dictionary.
            pub fn dictionary(&self) -> &$crate::capability::CapabilityDictionary {
                &self.dictionary
            }

            /// Underlying dictionary, mutable (for names without a typed accessor).
            pub fn dictionary_mut(&mut self) -> &mut $crate::capability::CapabilityDictionary {
                &mut self.dictionary
            }

            /// Deep, independent copy of the held values.
            pub fn clone_capabilities(&self) -> $crate::capability::CapabilityBag {
                self.dictionary.clone_capabilities()
            }

            /// Write every held value into `target`, keeping unrelated entries.
            pub fn save_to(&self, target: &mut $crate::capability::CapabilityBag) {
                self.dictionary.save_to(target)
            }

            /// Read every value from `source`, overwriting same-named entries.
            pub fn load_from(&mut self, source: &$crate::capability::CapabilityBag) {
                self.dictionary.load_from(source)
            }

            /// Check if nothing is declared.
            pub fn is_empty(&self) -> bool {
                self.dictionary.is_empty()
            }

            $(
                $(#[$fmeta])*
                pub fn $getter(&self) -> Option<capability_type!(@ty $kind)> {
                    capability_type!(@get self.dictionary, $key, $kind)
                }

                #[doc = concat!("Set `", $key, "`, or clear it with `None`.")]
                pub fn $setter(&mut self, value: Option<capability_type!(@ty $kind)>) {
                    self.dictionary
                        .set_optional($key, value.map($crate::capability::DataValue::from));
                }
            )*
        }

        impl From<$crate::capability::CapabilityBag> for $name {
            fn from(bag: $crate::capability::CapabilityBag) -> Self {
                Self {
                    dictionary: $crate::capability::CapabilityDictionary::from(bag),
                }
            }
        }
    };
}

pub(crate) use capability_type;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_independent() {
        let mut original = CapabilityDictionary::new();
        original.set("MaxDataObjectSize", 4096_i64);

        let mut clone = original.clone_capabilities();
        clone.insert("MaxDataObjectSize".to_string(), DataValue::Long(1));
        clone.insert("Extra".to_string(), DataValue::Boolean(true));

        assert_eq!(original.get_long("MaxDataObjectSize"), Some(4096));
        assert!(!original.contains("Extra"));

        original.set("MaxDataObjectSize", 8192_i64);
        assert_eq!(clone["MaxDataObjectSize"], DataValue::Long(1));
    }

    #[test]
    fn test_save_to_overwrites_and_keeps_unrelated() {
        let mut dictionary = CapabilityDictionary::new();
        dictionary.set("SupportsGet", true);
        dictionary.set("MaxSecondaryIndexCount", 2);

        let mut target = CapabilityBag::new();
        target.insert("SupportsGet".to_string(), DataValue::Boolean(false));
        target.insert("Unrelated".to_string(), DataValue::from("keep"));

        dictionary.save_to(&mut target);

        assert_eq!(target.len(), 3);
        assert_eq!(target["SupportsGet"], DataValue::Boolean(true));
        assert_eq!(target["MaxSecondaryIndexCount"], DataValue::Int(2));
        assert_eq!(target["Unrelated"].as_str(), Some("keep"));
    }

    #[test]
    fn test_load_from() {
        let mut source = CapabilityBag::new();
        source.insert("SupportsPut".to_string(), DataValue::Boolean(true));

        let mut dictionary = CapabilityDictionary::new();
        dictionary.set("SupportsGet", true);
        dictionary.load_from(&source);

        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.get_bool("SupportsPut"), Some(true));
    }

    #[test]
    fn test_unset_reads_are_none() {
        let dictionary = CapabilityDictionary::new();
        assert_eq!(dictionary.get_bool("SupportsGet"), None);
        assert_eq!(dictionary.get_long("MaxDataObjectSize"), None);
        assert_eq!(dictionary.get_string("Name"), None);
    }

    #[test]
    fn test_wrong_kind_reads_are_none() {
        let mut dictionary = CapabilityDictionary::new();
        dictionary.set("SupportsGet", "yes");
        assert_eq!(dictionary.get_bool("SupportsGet"), None);
        assert_eq!(dictionary.get_string("SupportsGet"), Some("yes"));
    }

    #[test]
    fn test_set_optional_none_clears() {
        let mut dictionary = CapabilityDictionary::new();
        dictionary.set("SupportsDelete", false);
        dictionary.set_optional("SupportsDelete", None);
        assert!(dictionary.is_empty());
    }
}
