//! MsgPack codec using `rmp-serde`.
//!
//! Always `to_vec_named`, never `to_vec`: records travel as maps keyed by
//! field name.
//!
//! # Example
//!
//! ```
//! use etpwire::codec::MsgPackCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Ping {
//!     current_date_time: i64,
//! }
//!
//! let msg = Ping { current_date_time: 42 };
//! let encoded = MsgPackCodec::encode(&msg).unwrap();
//! let decoded: Ping = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use crate::error::Result;

/// MessagePack codec for structured data.
///
/// Uses `rmp_serde::to_vec_named` so structs serialize as maps.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map).
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Append the MsgPack encoding of a value to `buf`.
    ///
    /// Used to lay consecutive values (header, extension, body) in one buffer.
    #[inline]
    pub fn encode_into<T: serde::Serialize>(buf: &mut Vec<u8>, value: &T) -> Result<()> {
        rmp_serde::encode::write_named(buf, value)?;
        Ok(())
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestStruct {
        uri: String,
        count: u32,
        active: bool,
    }

    #[test]
    fn test_encode_decode_struct() {
        let original = TestStruct {
            uri: "eml:///witsml20.Well(1)".to_string(),
            count: 42,
            active: true,
        };

        let encoded = MsgPackCodec::encode(&original).unwrap();
        let decoded: TestStruct = MsgPackCodec::decode(&encoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_to_vec_named_produces_map_format() {
        let test = TestStruct {
            uri: "x".to_string(),
            count: 1,
            active: false,
        };

        let encoded = MsgPackCodec::encode(&test).unwrap();

        // fixmap with 3 elements (0x83), not fixarray (0x93)
        assert_eq!(
            encoded[0] & 0xF0,
            0x80,
            "Expected map format (0x8X), got {:02X}",
            encoded[0]
        );
    }

    #[test]
    fn test_encode_into_appends() {
        let mut buf = Vec::new();
        MsgPackCodec::encode_into(&mut buf, &1u8).unwrap();
        MsgPackCodec::encode_into(&mut buf, &2u8).unwrap();
        assert_eq!(buf, vec![0x01, 0x02]);
    }

    #[test]
    fn test_encode_decode_option() {
        let none_val: Option<String> = None;
        let encoded = MsgPackCodec::encode(&none_val).unwrap();
        assert_eq!(encoded, vec![0xc0], "None should encode as msgpack nil");

        let decoded: Option<String> = MsgPackCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn test_decode_error_on_invalid_data() {
        let invalid = b"not valid msgpack";
        let result: Result<TestStruct> = MsgPackCodec::decode(invalid);
        assert!(result.is_err());
    }
}
