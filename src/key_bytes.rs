use std::fmt;
use std::ops::Deref;

use crate::util::{debug_hex, format_bytes_as_str};
use crate::value::ValueType;

/// Growable buffer holding an encoded key.
///
/// Ordering and equality are byte-lexicographic, which is exactly how the
/// underlying ordered store compares keys.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyBytes {
    data: Vec<u8>,
}

impl KeyBytes {
    pub const fn new() -> Self {
        KeyBytes { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        KeyBytes {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn append_value_type(&mut self, value_type: ValueType) {
        self.data.push(value_type.as_u8());
    }

    pub fn append_raw_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Big-endian, so byte order matches numeric order.
    pub fn append_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    pub fn append_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    pub fn append_u64(&mut self, v: u64) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    /// Zero-escaped string payload: 0x00 becomes 0x00 0x01 and the string
    /// ends with 0x00 0x00. Keeps lexicographic order and is self-delimiting.
    pub fn append_string(&mut self, bytes: &[u8]) {
        self.data.reserve(bytes.len() + 2);
        for &b in bytes {
            if b == 0x00 {
                self.data.extend_from_slice(&[0x00, 0x01]);
            } else {
                self.data.push(b);
            }
        }
        self.data.extend_from_slice(&[0x00, 0x00]);
    }

    /// Drop the last byte if it is `value_type`. Returns whether it was.
    pub fn remove_value_type_suffix(&mut self, value_type: ValueType) -> bool {
        if self.data.last() == Some(&value_type.as_u8()) {
            self.data.pop();
            true
        } else {
            false
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Raw access for in-place edits such as
    /// [`clear_range_components`](crate::doc_key::clear_range_components).
    pub(crate) fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl Deref for KeyBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for KeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for KeyBytes {
    fn from(data: Vec<u8>) -> Self {
        KeyBytes { data }
    }
}

impl From<&[u8]> for KeyBytes {
    fn from(data: &[u8]) -> Self {
        KeyBytes {
            data: data.to_vec(),
        }
    }
}

impl fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBytes({})", debug_hex(&self.data))
    }
}

impl fmt::Display for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_bytes_as_str(&self.data))
    }
}
