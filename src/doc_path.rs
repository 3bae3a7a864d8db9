use std::fmt;

use crate::doc_key::DocKey;
use crate::key_bytes::KeyBytes;
use crate::sub_doc_key::SubDocKey;
use crate::value::PrimitiveValue;

/// An already-encoded doc key plus the subkeys leading into the document.
///
/// This is how the document layer above names a node: it keeps the doc key
/// in encoded form because that is what it seeks with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath {
    encoded_doc_key: KeyBytes,
    subkeys: Vec<PrimitiveValue>,
}

impl DocPath {
    pub fn new(encoded_doc_key: KeyBytes, subkeys: Vec<PrimitiveValue>) -> Self {
        DocPath {
            encoded_doc_key,
            subkeys,
        }
    }

    pub fn from_doc_key(doc_key: &DocKey, subkeys: Vec<PrimitiveValue>) -> Self {
        Self::new(doc_key.encode(), subkeys)
    }

    pub fn encoded_doc_key(&self) -> &KeyBytes {
        &self.encoded_doc_key
    }

    pub fn subkeys(&self) -> &[PrimitiveValue] {
        &self.subkeys
    }

    pub fn num_subkeys(&self) -> usize {
        self.subkeys.len()
    }

    pub fn last_subkey(&self) -> Option<&PrimitiveValue> {
        self.subkeys.last()
    }

    pub fn add_subkey(&mut self, subkey: PrimitiveValue) {
        self.subkeys.push(subkey);
    }
}

impl From<&SubDocKey> for DocPath {
    /// Drops the hybrid time.
    fn from(key: &SubDocKey) -> Self {
        DocPath::from_doc_key(key.doc_key(), key.subkeys().to_vec())
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DocPath({}, [",
            DocKey::debug_slice_to_string(&self.encoded_doc_key)
        )?;
        for (i, subkey) in self.subkeys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{subkey}")?;
        }
        f.write_str("])")
    }
}
