//! Value-type tags and the primitive value codec.
//!
//! Every component of an encoded key starts with a one-byte tag from a
//! single global tag space. The numeric order of the tags is part of the
//! format: it fixes the order between values of different types and keeps
//! the structural markers in the right place relative to data.
//!
//! ```text
//! 0x00 Lowest  < '!' GroupEnd < '#' HybridTime < [primitive tags] < '|' Highest
//!              < '}' UInt16Hash < '~' TableId < 0xFF MaxByte
//! ```
//!
//! `GroupEnd` sorts below every primitive tag so that a shorter component
//! group sorts before a longer one with the same prefix. `HybridTime` sorts
//! below every primitive tag so that a key's versions sort before any key
//! with an additional subkey. `UInt16Hash` and `TableId` sort above every
//! primitive tag, matching "no hash < hash" and "no table id < table id".

pub mod primitive;

use std::fmt;

use crate::error::{Error, Result};
use crate::util::debug_hex;

pub use primitive::PrimitiveValue;

/// One-byte type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// Seek sentinel below every value.
    Lowest = 0x00,
    GroupEnd = b'!',
    HybridTime = b'#',
    Null = b'$',
    Double = b'D',
    False = b'F',
    Int32 = b'H',
    Int64 = b'I',
    SystemColumnId = b'J',
    ColumnId = b'K',
    String = b'S',
    True = b'T',
    UInt32 = b'U',
    Timestamp = b'W',
    Uuid = b'Z',
    ArrayIndex = b'[',
    /// Seek sentinel above every value.
    Highest = b'|',
    UInt16Hash = b'}',
    TableId = b'~',
    /// Appended to seek keys to move past every key sharing a prefix.
    MaxByte = 0xFF,
}

impl ValueType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        let value_type = match byte {
            0x00 => ValueType::Lowest,
            b'!' => ValueType::GroupEnd,
            b'#' => ValueType::HybridTime,
            b'$' => ValueType::Null,
            b'D' => ValueType::Double,
            b'F' => ValueType::False,
            b'H' => ValueType::Int32,
            b'I' => ValueType::Int64,
            b'J' => ValueType::SystemColumnId,
            b'K' => ValueType::ColumnId,
            b'S' => ValueType::String,
            b'T' => ValueType::True,
            b'U' => ValueType::UInt32,
            b'W' => ValueType::Timestamp,
            b'Z' => ValueType::Uuid,
            b'[' => ValueType::ArrayIndex,
            b'|' => ValueType::Highest,
            b'}' => ValueType::UInt16Hash,
            b'~' => ValueType::TableId,
            0xFF => ValueType::MaxByte,
            _ => return None,
        };
        Some(value_type)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tags that start a self-delimiting primitive value.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            ValueType::Null
                | ValueType::Double
                | ValueType::False
                | ValueType::Int32
                | ValueType::Int64
                | ValueType::SystemColumnId
                | ValueType::ColumnId
                | ValueType::String
                | ValueType::True
                | ValueType::UInt32
                | ValueType::Timestamp
                | ValueType::Uuid
                | ValueType::ArrayIndex
        )
    }

    /// Seek-boundary sentinels, only legal when the caller allows them.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            ValueType::Lowest | ValueType::Highest | ValueType::MaxByte
        )
    }

    pub fn is_primitive_or_special(self) -> bool {
        self.is_primitive() || self.is_special()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{self:?}")
    }
}

/// Read the tag at the front of `input` without consuming it.
pub fn decode_value_type(input: &[u8]) -> Result<ValueType> {
    let Some(&first) = input.first() else {
        return Err(Error::Corruption(
            "unexpected end of key while reading a value type".into(),
        ));
    };
    ValueType::from_u8(first).ok_or_else(|| {
        Error::Corruption(format!(
            "unknown value type 0x{first:02x} in {}",
            debug_hex(input)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_roundtrip() {
        for byte in 0..=u8::MAX {
            if let Some(vt) = ValueType::from_u8(byte) {
                assert_eq!(vt.as_u8(), byte);
            }
        }
    }

    #[test]
    fn structural_tags_bracket_primitives() {
        for byte in 0..=u8::MAX {
            let Some(vt) = ValueType::from_u8(byte) else {
                continue;
            };
            if vt.is_primitive() {
                assert!(vt > ValueType::HybridTime, "{vt}");
                assert!(vt < ValueType::Highest, "{vt}");
                assert!(vt < ValueType::UInt16Hash, "{vt}");
                assert!(vt < ValueType::TableId, "{vt}");
            }
        }
        assert!(ValueType::GroupEnd < ValueType::HybridTime);
        assert!(ValueType::UInt16Hash < ValueType::TableId);
        assert!(ValueType::TableId < ValueType::MaxByte);
    }

    #[test]
    fn decode_value_type_errors() {
        assert!(decode_value_type(&[]).unwrap_err().is_corruption());
        assert!(decode_value_type(&[0x01]).unwrap_err().is_corruption());
        assert_eq!(decode_value_type(b"S").unwrap(), ValueType::String);
    }
}
