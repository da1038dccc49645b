//! Untyped capability values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

/// Untyped capability bag as exchanged on the wire.
///
/// Ordered so that negotiation logs print the same way every time.
pub type CapabilityBag = BTreeMap<String, DataValue>;

/// A single capability (or header extension) value.
///
/// Serialized untagged so the wire sees a plain MsgPack/JSON scalar.
/// Small integers decode as [`DataValue::Int`], larger ones as
/// [`DataValue::Long`]; numeric accessors accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Boolean value.
    Boolean(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Floating point value.
    Double(f64),
    /// Text value.
    String(String),
    /// Binary value.
    Bytes(ByteBuf),
}

impl DataValue {
    /// Boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(v) => Some(i64::from(*v)),
            DataValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer content, if it fits in `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// Text content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Name of the value kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Boolean(_) => "boolean",
            DataValue::Int(_) => "int",
            DataValue::Long(_) => "long",
            DataValue::Double(_) => "double",
            DataValue::String(_) => "string",
            DataValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Boolean(b) => write!(f, "{b}"),
            DataValue::Int(v) => write!(f, "{v}"),
            DataValue::Long(v) => write!(f, "{v}"),
            DataValue::Double(v) => write!(f, "{v}"),
            DataValue::String(s) => f.write_str(s),
            DataValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Long(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Double(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<Vec<u8>> for DataValue {
    fn from(value: Vec<u8>) -> Self {
        DataValue::Bytes(ByteBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MsgPackCodec;

    #[test]
    fn test_numeric_accessors_accept_int_and_long() {
        assert_eq!(DataValue::Int(7).as_i64(), Some(7));
        assert_eq!(DataValue::Long(7).as_i32(), Some(7));
        assert_eq!(DataValue::Long(i64::MAX).as_i32(), None);
        assert_eq!(DataValue::Boolean(true).as_i64(), None);
    }

    #[test]
    fn test_untagged_json_shapes() {
        let mut bag = CapabilityBag::new();
        bag.insert("SupportsGet".to_string(), DataValue::from(true));
        bag.insert("MaxDataObjectSize".to_string(), DataValue::from(1_000_000_i64));
        bag.insert("Name".to_string(), DataValue::from("store"));

        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(json["SupportsGet"], true);
        assert_eq!(json["MaxDataObjectSize"], 1_000_000);
        assert_eq!(json["Name"], "store");

        let back: CapabilityBag = serde_json::from_value(json).unwrap();
        assert_eq!(back["SupportsGet"].as_bool(), Some(true));
        assert_eq!(back["MaxDataObjectSize"].as_i64(), Some(1_000_000));
        assert_eq!(back["Name"].as_str(), Some("store"));
    }

    #[test]
    fn test_msgpack_bag_decodes_large_values_as_long() {
        let mut bag = CapabilityBag::new();
        bag.insert("Big".to_string(), DataValue::Long(10_000_000_000));
        bag.insert("Small".to_string(), DataValue::Long(5));

        let encoded = MsgPackCodec::encode(&bag).unwrap();
        let decoded: CapabilityBag = MsgPackCodec::decode(&encoded).unwrap();

        assert_eq!(decoded["Big"], DataValue::Long(10_000_000_000));
        assert_eq!(decoded["Small"].as_i64(), Some(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(DataValue::from(false).to_string(), "false");
        assert_eq!(DataValue::from(vec![1u8, 2, 3]).to_string(), "<3 bytes>");
        assert_eq!(DataValue::from("x").kind(), "string");
    }
}
