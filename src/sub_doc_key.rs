//! Keys addressing one versioned value inside a document.
//!
//! ```text
//! SubDocKey ::= DocKey SubkeyValue* [HybridTime DocHybridTime(12)]?
//! ```
//!
//! The hybrid time is always the innermost element. It is encoded in
//! reverse, so a forward scan over one path sees the newest version first.

use std::cmp::Ordering;
use std::fmt;

use crate::doc_key::{DocKey, consume_primitive_value_from_key};
use crate::doc_path::DocPath;
use crate::error::{Error, Result};
use crate::hybrid_time::{DocHybridTime, append_doc_hybrid_time, consume_hybrid_time_from_key};
use crate::key_bytes::KeyBytes;
use crate::types::{AllowSpecial, DocKeyPart, HybridTimeRequired, KeySpans, PrefixLengths};
use crate::util::{debug_hex, format_bytes_as_str};
use crate::value::{PrimitiveValue, ValueType};

#[derive(Debug, Clone, Default)]
pub struct SubDocKey {
    doc_key: DocKey,
    subkeys: Vec<PrimitiveValue>,
    doc_ht: Option<DocHybridTime>,
}

/// Where the parts of a decoded `SubDocKey` go.
trait SubDocKeyCallback<'a> {
    fn decode_doc_key(&mut self, input: &mut &'a [u8]) -> Result<()>;

    /// `None` skips the subkey.
    fn add_subkey(&mut self) -> Option<&mut PrimitiveValue>;

    fn set_doc_hybrid_time(&mut self, doc_ht: Option<DocHybridTime>);

    fn doc_hybrid_time_span(&mut self, _span: &'a [u8]) {}
}

struct DecodeIntoSubDocKey<'k> {
    key: &'k mut SubDocKey,
}

impl<'a> SubDocKeyCallback<'a> for DecodeIntoSubDocKey<'_> {
    fn decode_doc_key(&mut self, input: &mut &'a [u8]) -> Result<()> {
        self.key
            .doc_key
            .decode_from(input, DocKeyPart::WholeDocKey, AllowSpecial::No)
    }

    fn add_subkey(&mut self) -> Option<&mut PrimitiveValue> {
        self.key.subkeys.push(PrimitiveValue::Null);
        self.key.subkeys.last_mut()
    }

    fn set_doc_hybrid_time(&mut self, doc_ht: Option<DocHybridTime>) {
        self.key.doc_ht = doc_ht;
    }
}

/// Collects doc key component spans and the hybrid time span; subkeys are
/// skipped.
struct SpansIntoSubDocKey<'s, 'a> {
    out: &'s mut KeySpans<'a>,
}

impl<'a> SubDocKeyCallback<'a> for SpansIntoSubDocKey<'_, 'a> {
    fn decode_doc_key(&mut self, input: &mut &'a [u8]) -> Result<()> {
        DocKey::partially_decode(input, DocKeyPart::WholeDocKey, self.out)
    }

    fn add_subkey(&mut self) -> Option<&mut PrimitiveValue> {
        None
    }

    fn set_doc_hybrid_time(&mut self, _doc_ht: Option<DocHybridTime>) {}

    fn doc_hybrid_time_span(&mut self, span: &'a [u8]) {
        self.out.push(span);
    }
}

/// Anything left that is not the hybrid time is a subkey.
fn at_subkey(input: &[u8]) -> bool {
    input
        .first()
        .is_some_and(|&b| b != ValueType::HybridTime.as_u8())
}

fn do_decode<'a, C: SubDocKeyCallback<'a>>(
    input: &mut &'a [u8],
    require_hybrid_time: HybridTimeRequired,
    callback: &mut C,
) -> Result<()> {
    let original = *input;
    let mut rest = *input;

    callback.decode_doc_key(&mut rest)?;
    while at_subkey(rest) {
        PrimitiveValue::decode_key(&mut rest, callback.add_subkey(), AllowSpecial::No)
            .map_err(|e| e.prepend(format!("while decoding SubDocKey {}", debug_hex(original))))?;
    }

    // Only the hybrid time tag, or nothing, can follow the subkeys.
    let Some((_, ht_bytes)) = rest.split_first() else {
        if require_hybrid_time == HybridTimeRequired::Yes {
            return Err(Error::Corruption(format!(
                "found too few bytes in the end of a SubDocKey for a type-prefixed hybrid_time: {}",
                debug_hex(original)
            )));
        }
        callback.set_doc_hybrid_time(None);
        *input = rest;
        return Ok(());
    };

    let mut ht_input = ht_bytes;
    let doc_ht = consume_hybrid_time_from_key(&mut ht_input)
        .map_err(|e| e.prepend(format!("while decoding SubDocKey {}", debug_hex(original))))?;
    callback.set_doc_hybrid_time(Some(doc_ht));
    callback.doc_hybrid_time_span(&ht_bytes[..ht_bytes.len() - ht_input.len()]);
    *input = ht_input;
    Ok(())
}

impl SubDocKey {
    pub fn new(doc_key: DocKey) -> Self {
        SubDocKey {
            doc_key,
            ..Self::default()
        }
    }

    pub fn with_subkeys(doc_key: DocKey, subkeys: Vec<PrimitiveValue>) -> Self {
        SubDocKey {
            doc_key,
            subkeys,
            doc_ht: None,
        }
    }

    pub fn with_hybrid_time(
        doc_key: DocKey,
        subkeys: Vec<PrimitiveValue>,
        doc_ht: DocHybridTime,
    ) -> Self {
        SubDocKey {
            doc_key,
            subkeys,
            doc_ht: Some(doc_ht),
        }
    }

    pub fn doc_key(&self) -> &DocKey {
        &self.doc_key
    }

    pub fn doc_key_mut(&mut self) -> &mut DocKey {
        &mut self.doc_key
    }

    pub fn into_doc_key(self) -> DocKey {
        self.doc_key
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

    pub fn append_subkeys(&mut self, subkeys: impl IntoIterator<Item = PrimitiveValue>) {
        self.subkeys.extend(subkeys);
    }

    pub fn remove_last_subkey(&mut self) -> Option<PrimitiveValue> {
        self.subkeys.pop()
    }

    pub fn doc_hybrid_time(&self) -> Option<DocHybridTime> {
        self.doc_ht
    }

    pub fn has_hybrid_time(&self) -> bool {
        self.doc_ht.is_some()
    }

    pub fn set_doc_hybrid_time(&mut self, doc_ht: DocHybridTime) {
        self.doc_ht = Some(doc_ht);
    }

    pub fn remove_hybrid_time(&mut self) {
        self.doc_ht = None;
    }

    pub fn clear(&mut self) {
        self.doc_key.clear();
        self.subkeys.clear();
        self.doc_ht = None;
    }

    pub fn encode(&self) -> KeyBytes {
        self.do_encode(true)
    }

    pub fn encode_without_ht(&self) -> KeyBytes {
        self.do_encode(false)
    }

    fn do_encode(&self, include_hybrid_time: bool) -> KeyBytes {
        let mut key_bytes = self.doc_key.encode();
        for subkey in &self.subkeys {
            subkey.append_to_key(&mut key_bytes);
        }
        if let Some(doc_ht) = self.doc_ht.filter(|_| include_hybrid_time) {
            append_doc_hybrid_time(&doc_ht, &mut key_bytes);
        }
        key_bytes
    }

    /// Decode from the front of `input` into `self`, advancing `input` on
    /// success.
    pub fn decode_from(
        &mut self,
        input: &mut &[u8],
        require_hybrid_time: HybridTimeRequired,
    ) -> Result<()> {
        self.clear();
        let result = do_decode(input, require_hybrid_time, &mut DecodeIntoSubDocKey { key: self });
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Decode the whole slice; trailing bytes are an `InvalidArgument` error.
    pub fn fully_decode_from(
        &mut self,
        bytes: &[u8],
        require_hybrid_time: HybridTimeRequired,
    ) -> Result<()> {
        let mut input = bytes;
        self.decode_from(&mut input, require_hybrid_time)?;
        if !input.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "expected all bytes of the slice to be decoded into SubDocKey, found {} extra bytes: {}",
                input.len(),
                debug_hex(input)
            )));
        }
        Ok(())
    }

    pub fn fully_decode(bytes: &[u8], require_hybrid_time: HybridTimeRequired) -> Result<SubDocKey> {
        let mut key = SubDocKey::default();
        key.fully_decode_from(bytes, require_hybrid_time)?;
        Ok(key)
    }

    /// Capture the doc key component spans followed by the hybrid time
    /// span. Subkeys are walked but not captured, and the hybrid time is
    /// required.
    pub fn partially_decode<'a>(input: &mut &'a [u8], out: &mut KeySpans<'a>) -> Result<()> {
        do_decode(input, HybridTimeRequired::Yes, &mut SpansIntoSubDocKey { out })
    }

    /// Skip one subkey. Returns `false` at the end of input or at the
    /// hybrid time.
    pub fn decode_subkey(input: &mut &[u8]) -> Result<bool> {
        if !at_subkey(input) {
            return Ok(false);
        }
        PrimitiveValue::decode_key(input, None, AllowSpecial::No)?;
        Ok(true)
    }

    /// Offsets just past the hashed part (if any), each range component
    /// (the last one including the range group end) and each subkey.
    pub fn decode_prefix_lengths(bytes: &[u8], out: &mut PrefixLengths) -> Result<()> {
        let mut input = bytes;
        let hashed_part_size =
            DocKey::encoded_size(input, DocKeyPart::HashedPartOnly, AllowSpecial::No)?;
        if hashed_part_size != 0 {
            input = &input[hashed_part_size..];
            out.push(hashed_part_size);
        }
        while consume_primitive_value_from_key(&mut input)? {
            out.push(bytes.len() - input.len());
        }
        if let Some(last) = out.last_mut() {
            if bytes.get(*last) != Some(&ValueType::GroupEnd.as_u8()) {
                return Err(Error::Corruption(format!(
                    "range keys group end expected at {} in {}",
                    last,
                    debug_hex(bytes)
                )));
            }
            *last += 1;
        }
        while Self::decode_subkey(&mut input)? {
            out.push(bytes.len() - input.len());
        }
        Ok(())
    }

    /// Offsets past the doc key and past each subkey.
    ///
    /// A non-empty `out` is taken as already holding the prefix up to its
    /// last offset, so decoding resumes from there.
    pub fn decode_doc_key_and_subkey_ends(bytes: &[u8], out: &mut PrefixLengths) -> Result<()> {
        let mut input = bytes;
        match out.last() {
            Some(&end) => {
                input = bytes.get(end..).ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "offset {end} is past the end of a {}-byte key",
                        bytes.len()
                    ))
                })?;
            }
            None => {
                let doc_key_size =
                    DocKey::encoded_size(input, DocKeyPart::WholeDocKey, AllowSpecial::No)?;
                input = &input[doc_key_size..];
                out.push(doc_key_size);
            }
        }
        while Self::decode_subkey(&mut input)? {
            out.push(bytes.len() - input.len());
        }
        Ok(())
    }

    /// Rebuild from a doc path; the hybrid time is cleared.
    pub fn from_doc_path(doc_path: &DocPath) -> Result<SubDocKey> {
        Ok(SubDocKey {
            doc_key: DocKey::fully_decode(doc_path.encoded_doc_key())?,
            subkeys: doc_path.subkeys().to_vec(),
            doc_ht: None,
        })
    }

    /// `true` if `prefix` addresses this key or an ancestor of it.
    ///
    /// A prefix carrying a hybrid time only matches the identical key,
    /// since the hybrid time is the innermost element.
    pub fn starts_with(&self, prefix: &SubDocKey) -> bool {
        self.doc_key == prefix.doc_key
            && (prefix.doc_ht.is_none()
                || (self.doc_ht == prefix.doc_ht && prefix.num_subkeys() == self.num_subkeys()))
            && prefix.num_subkeys() <= self.num_subkeys()
            && self.subkeys[..prefix.num_subkeys()] == prefix.subkeys[..]
    }

    pub fn compare_to_ignore_ht(&self, other: &SubDocKey) -> Ordering {
        self.doc_key
            .cmp(&other.doc_key)
            .then_with(|| self.subkeys.cmp(&other.subkeys))
    }

    /// Seek key past every key under this path: deeper subkeys and all
    /// hybrid times included.
    pub fn advance_out_of_sub_doc(&self) -> KeyBytes {
        let mut key_bytes = self.encode_without_ht();
        key_bytes.append_value_type(ValueType::MaxByte);
        key_bytes
    }

    /// Seek key past this doc key and every doc key extending its range
    /// group.
    ///
    /// The range group end is replaced by `MaxByte`. Keys with the same
    /// hashed part and more range components are skipped too, which is only
    /// harmless when every key of a table has the same number of range
    /// components. Callers must uphold that.
    pub fn advance_out_of_doc_key_prefix(&self) -> KeyBytes {
        let mut key_bytes = self.doc_key.encode();
        key_bytes.remove_value_type_suffix(ValueType::GroupEnd);
        key_bytes.append_value_type(ValueType::MaxByte);
        key_bytes
    }

    pub fn debug_slice_to_string(bytes: &[u8]) -> String {
        match SubDocKey::fully_decode(bytes, HybridTimeRequired::No) {
            Ok(key) => key.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

impl PartialEq for SubDocKey {
    fn eq(&self, other: &Self) -> bool {
        self.doc_key == other.doc_key
            && self.subkeys == other.subkeys
            && self.doc_ht == other.doc_ht
    }
}

impl Eq for SubDocKey {}

impl Ord for SubDocKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to_ignore_ht(other)
            .then_with(|| match (self.doc_ht, other.doc_ht) {
                // Newer versions first.
                (Some(lhs), Some(rhs)) => rhs.cmp(&lhs),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for SubDocKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SubDocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubDocKey({}, [", self.doc_key)?;
        for (i, subkey) in self.subkeys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{subkey}")?;
        }
        if let Some(doc_ht) = self.doc_ht {
            if !self.subkeys.is_empty() {
                f.write_str("; ")?;
            }
            write!(f, "{doc_ht}")?;
        }
        f.write_str("])")
    }
}

/// Render any stored key as readably as possible, for logs.
///
/// Falls back to a plain doc key when there is nothing past it, and to the
/// printable raw bytes when the key does not decode at all.
pub fn best_effort_doc_db_key_to_str(bytes: &[u8]) -> String {
    let mut input = bytes;
    let mut key = SubDocKey::default();
    if let Err(e) = key.decode_from(&mut input, HybridTimeRequired::No) {
        tracing::warn!(error = %e, "could not decode key {}", debug_hex(bytes));
        return format_bytes_as_str(bytes);
    }
    let mut result = if !key.has_hybrid_time() && key.num_subkeys() == 0 {
        key.doc_key.to_string()
    } else {
        key.to_string()
    };
    if !input.is_empty() {
        result.push_str(" followed by raw bytes ");
        result.push_str(&format_bytes_as_str(input));
    }
    result
}
