//! Multi-version timestamps appended to the end of a `SubDocKey`.
//!
//! Versions of the same key must come out newest first when the store is
//! scanned forward, so the encoded form is the bitwise complement of the
//! big-endian value: a larger timestamp encodes to a smaller byte string.

use std::fmt;

use crate::error::{Error, Result};
use crate::key_bytes::KeyBytes;
use crate::util::debug_hex;
use crate::value::ValueType;

/// Number of low bits holding the logical component.
pub const LOGICAL_BITS: u32 = 12;
const LOGICAL_MASK: u64 = (1 << LOGICAL_BITS) - 1;

/// Physical microseconds in the high bits, a logical counter in the low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HybridTime(u64);

impl HybridTime {
    pub const MIN: HybridTime = HybridTime(0);
    pub const MAX: HybridTime = HybridTime(u64::MAX);

    pub const fn from_u64(repr: u64) -> Self {
        HybridTime(repr)
    }

    pub fn from_micros_and_logical(micros: u64, logical: u64) -> Self {
        debug_assert!(logical <= LOGICAL_MASK);
        HybridTime((micros << LOGICAL_BITS) | (logical & LOGICAL_MASK))
    }

    pub fn from_micros(micros: u64) -> Self {
        Self::from_micros_and_logical(micros, 0)
    }

    pub const fn to_u64(self) -> u64 {
        self.0
    }

    pub fn physical_micros(self) -> u64 {
        self.0 >> LOGICAL_BITS
    }

    pub fn logical(self) -> u64 {
        self.0 & LOGICAL_MASK
    }
}

impl fmt::Display for HybridTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HybridTime::MIN => f.write_str("<min>"),
            HybridTime::MAX => f.write_str("<max>"),
            _ if self.logical() == 0 => write!(f, "{{ physical: {} }}", self.physical_micros()),
            _ => write!(
                f,
                "{{ physical: {} logical: {} }}",
                self.physical_micros(),
                self.logical()
            ),
        }
    }
}

/// A hybrid time plus the index of the write within one batch.
///
/// Ordered by hybrid time, then write id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocHybridTime {
    hybrid_time: HybridTime,
    write_id: u32,
}

impl DocHybridTime {
    /// Bytes following the `HybridTime` tag.
    pub const ENCODED_SIZE: usize = 12;

    pub const MIN: DocHybridTime = DocHybridTime {
        hybrid_time: HybridTime::MIN,
        write_id: 0,
    };
    pub const MAX: DocHybridTime = DocHybridTime {
        hybrid_time: HybridTime::MAX,
        write_id: u32::MAX,
    };

    pub const fn new(hybrid_time: HybridTime, write_id: u32) -> Self {
        DocHybridTime {
            hybrid_time,
            write_id,
        }
    }

    pub fn hybrid_time(&self) -> HybridTime {
        self.hybrid_time
    }

    pub fn write_id(&self) -> u32 {
        self.write_id
    }

    /// Append the reverse-ordered payload (no tag).
    pub fn append_encoded(&self, out: &mut KeyBytes) {
        out.append_u64(!self.hybrid_time.to_u64());
        out.append_u32(!self.write_id);
    }

    /// Decode the payload written by [`append_encoded`](Self::append_encoded).
    pub fn decode_from(input: &mut &[u8]) -> Result<Self> {
        if input.len() < Self::ENCODED_SIZE {
            return Err(Error::Corruption(format!(
                "too few bytes for an encoded hybrid time: need {}, have {}: {}",
                Self::ENCODED_SIZE,
                input.len(),
                debug_hex(input)
            )));
        }
        let (head, rest) = input.split_at(Self::ENCODED_SIZE);
        let mut ht = [0u8; 8];
        ht.copy_from_slice(&head[..8]);
        let mut write_id = [0u8; 4];
        write_id.copy_from_slice(&head[8..]);
        *input = rest;
        Ok(DocHybridTime {
            hybrid_time: HybridTime::from_u64(!u64::from_be_bytes(ht)),
            write_id: !u32::from_be_bytes(write_id),
        })
    }
}

impl fmt::Display for DocHybridTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.write_id == 0 {
            write!(f, "HT{}", self.hybrid_time)
        } else {
            write!(f, "HT{} w: {}", self.hybrid_time, self.write_id)
        }
    }
}

/// Append the `HybridTime` tag followed by the reverse-ordered timestamp.
pub fn append_doc_hybrid_time(doc_ht: &DocHybridTime, out: &mut KeyBytes) {
    out.append_value_type(ValueType::HybridTime);
    doc_ht.append_encoded(out);
}

/// Decode a timestamp whose tag has already been consumed, advancing `input`.
pub fn consume_hybrid_time_from_key(input: &mut &[u8]) -> Result<DocHybridTime> {
    DocHybridTime::decode_from(input)
}
