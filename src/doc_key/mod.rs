//! Document keys: the primary-key identity of a stored row.
//!
//! ```text
//! DocKey ::= [TableId uuid(16)]? [UInt16Hash hash(2, BE) HashedValue* GroupEnd]? RangeValue* GroupEnd
//! ```
//!
//! Groups are terminated by a reserved tag rather than prefixed with a
//! length, so a key whose range group is a prefix of another key's range
//! group sorts first. The derived `Ord` on [`DocKey`] (co-table id, hash
//! presence, hash, hashed group, range group) is the byte order of
//! [`DocKey::encode`] as long as every component is a regular value.
//! Seek sentinels (`Lowest`, `Highest`, `MaxByte`) break this: their tags
//! sit outside the primitive range, so `from_range([MaxByte])` compares
//! less than a hashed key while its bytes compare greater.

pub mod callback;
pub mod decoder;
pub mod encoder;

use std::fmt;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::key_bytes::KeyBytes;
use crate::schema::Schema;
use crate::types::{AllowSpecial, DocKeyHash, DocKeyPart, KeySpans};
use crate::util::debug_hex;
use crate::value::{PrimitiveValue, ValueType};

use callback::{DecodeIntoCallback, DiscardCallback, EncodedSizesCallback, SpansCallback};
pub use decoder::{DocKeyDecoder, has_primitive_value};
use decoder::{consume_primitive_values, do_decode};
pub use encoder::{DocKeyEncoder, append_doc_key_items};

/// Structured primary key: co-table id, optional hash with its hashed
/// group, and the range group.
///
/// `Ord` agrees with the encoded byte order for keys built from regular
/// values only; keys holding seek sentinels must be compared as bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DocKey {
    pub(crate) cotable_id: Uuid,
    pub(crate) hash: Option<DocKeyHash>,
    pub(crate) hashed_group: Vec<PrimitiveValue>,
    pub(crate) range_group: Vec<PrimitiveValue>,
}

impl DocKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// A key with range components only.
    pub fn from_range(range_components: Vec<PrimitiveValue>) -> Self {
        DocKey {
            range_group: range_components,
            ..Self::default()
        }
    }

    /// A hash-partitioned key.
    pub fn hashed(
        hash: DocKeyHash,
        hashed_components: Vec<PrimitiveValue>,
        range_components: Vec<PrimitiveValue>,
    ) -> Self {
        DocKey {
            cotable_id: Uuid::nil(),
            hash: Some(hash),
            hashed_group: hashed_components,
            range_group: range_components,
        }
    }

    /// An empty key inside a colocated table.
    pub fn for_cotable(cotable_id: Uuid) -> Self {
        DocKey {
            cotable_id,
            ..Self::default()
        }
    }

    pub fn for_schema(schema: &Schema) -> Self {
        Self::for_cotable(*schema.cotable_id())
    }

    pub fn for_schema_with_range(schema: &Schema, range_components: Vec<PrimitiveValue>) -> Self {
        DocKey {
            cotable_id: *schema.cotable_id(),
            range_group: range_components,
            ..Self::default()
        }
    }

    pub fn for_schema_hashed(
        schema: &Schema,
        hash: DocKeyHash,
        hashed_components: Vec<PrimitiveValue>,
        range_components: Vec<PrimitiveValue>,
    ) -> Self {
        DocKey {
            cotable_id: *schema.cotable_id(),
            ..Self::hashed(hash, hashed_components, range_components)
        }
    }

    /// Place this key inside a colocated table.
    pub fn with_cotable_id(mut self, cotable_id: Uuid) -> Self {
        self.cotable_id = cotable_id;
        self
    }

    /// The key of a Redis-style entry: a hash and a single string.
    pub fn from_redis_key(hash: DocKeyHash, key: &str) -> Self {
        Self::hashed(hash, vec![PrimitiveValue::from(key)], Vec::new())
    }

    /// Same bytes as `from_redis_key(hash, key).encode()`, written directly.
    pub fn encoded_from_redis_key(hash: DocKeyHash, key: &str) -> KeyBytes {
        let mut result = KeyBytes::with_capacity(key.len() + 8);
        result.append_value_type(ValueType::UInt16Hash);
        result.append_u16(hash);
        result.append_value_type(ValueType::String);
        result.append_string(key.as_bytes());
        result.append_value_type(ValueType::GroupEnd);
        result.append_value_type(ValueType::GroupEnd);
        debug_assert_eq!(result, Self::from_redis_key(hash, key).encode());
        result
    }

    pub fn cotable_id(&self) -> &Uuid {
        &self.cotable_id
    }

    pub fn hash_present(&self) -> bool {
        self.hash.is_some()
    }

    pub fn hash(&self) -> Option<DocKeyHash> {
        self.hash
    }

    pub fn hashed_group(&self) -> &[PrimitiveValue] {
        &self.hashed_group
    }

    pub fn range_group(&self) -> &[PrimitiveValue] {
        &self.range_group
    }

    pub fn is_empty(&self) -> bool {
        self.hash.is_none() && self.range_group.is_empty()
    }

    pub fn encode(&self) -> KeyBytes {
        let mut result = KeyBytes::new();
        self.append_to(&mut result);
        result
    }

    pub fn append_to(&self, out: &mut KeyBytes) {
        DocKeyEncoder::new(out)
            .cotable_id(&self.cotable_id)
            .hash(self.hash, &self.hashed_group)
            .range(&self.range_group);
    }

    /// Encode into a caller-owned scratch buffer, replacing its contents.
    ///
    /// Lets a hot loop (one key per scanned row) reuse one allocation. The
    /// returned slice is only valid until the buffer is touched again.
    pub fn encode_with_buffer<'b>(&self, buffer: &'b mut KeyBytes) -> &'b [u8] {
        buffer.clear();
        self.append_to(buffer);
        buffer.as_slice()
    }

    /// Reset every field, co-table id included.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn clear_range_components(&mut self) {
        self.range_group.clear();
    }

    /// Truncate, or pad with nulls.
    pub fn resize_range_components(&mut self, new_size: usize) {
        self.range_group.resize(new_size, PrimitiveValue::Null);
    }

    pub fn add_range_component(&mut self, value: PrimitiveValue) {
        self.range_group.push(value);
    }

    /// # Panics
    /// Panics if `idx` is out of bounds.
    pub fn set_range_component(&mut self, value: PrimitiveValue, idx: usize) {
        self.range_group[idx] = value;
    }

    /// Same hash presence and, when present, same hash and hashed group.
    pub fn hashed_components_equal(&self, other: &DocKey) -> bool {
        self.hash == other.hash && (self.hash.is_none() || self.hashed_group == other.hashed_group)
    }

    /// Decode from the front of `input` into `self`, advancing `input`.
    ///
    /// On failure `self` is left cleared and `input` untouched.
    pub fn decode_from(
        &mut self,
        input: &mut &[u8],
        part: DocKeyPart,
        allow_special: AllowSpecial,
    ) -> Result<()> {
        self.clear();
        let mut decoder = DocKeyDecoder::new(*input);
        let result = do_decode(
            &mut decoder,
            part,
            allow_special,
            &mut DecodeIntoCallback::new(self),
        );
        if let Err(e) = result {
            self.clear();
            return Err(e);
        }
        *input = decoder.left_input();
        Ok(())
    }

    /// Like [`decode_from`](Self::decode_from) but returns the number of
    /// bytes consumed instead of advancing a slice.
    pub fn decode_from_slice(
        &mut self,
        bytes: &[u8],
        part: DocKeyPart,
        allow_special: AllowSpecial,
    ) -> Result<usize> {
        let mut input = bytes;
        self.decode_from(&mut input, part, allow_special)?;
        Ok(bytes.len() - input.len())
    }

    /// Decode the whole key; trailing bytes are an `InvalidArgument` error.
    pub fn fully_decode_from(&mut self, bytes: &[u8]) -> Result<()> {
        let mut input = bytes;
        self.decode_from(&mut input, DocKeyPart::WholeDocKey, AllowSpecial::No)?;
        if !input.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "expected all bytes of the slice to be decoded into DocKey, found {} extra bytes",
                input.len()
            )));
        }
        Ok(())
    }

    pub fn fully_decode(bytes: &[u8]) -> Result<DocKey> {
        let mut key = DocKey::new();
        key.fully_decode_from(bytes)?;
        Ok(key)
    }

    /// Walk `part` of the key without materializing values, pushing the
    /// encoded bytes of each hashed and range component to `out`.
    pub fn partially_decode<'a>(
        input: &mut &'a [u8],
        part: DocKeyPart,
        out: &mut KeySpans<'a>,
    ) -> Result<()> {
        let mut decoder = DocKeyDecoder::new(*input);
        do_decode(
            &mut decoder,
            part,
            AllowSpecial::No,
            &mut SpansCallback::new(out),
        )?;
        *input = decoder.left_input();
        Ok(())
    }

    /// The hash of an encoded key, if it has one.
    pub fn decode_hash(bytes: &[u8]) -> Result<Option<DocKeyHash>> {
        let mut decoder = DocKeyDecoder::new(bytes);
        decoder.decode_cotable_id(None)?;
        decoder.decode_hash_code(AllowSpecial::No)
    }

    /// Length of `part` of the key at the front of `bytes`.
    pub fn encoded_size(bytes: &[u8], part: DocKeyPart, allow_special: AllowSpecial) -> Result<usize> {
        let mut decoder = DocKeyDecoder::new(bytes);
        do_decode(&mut decoder, part, allow_special, &mut DiscardCallback)?;
        Ok(decoder.consumed_size_from(bytes))
    }

    /// Lengths of the hashed part and of the whole key, in one walk.
    pub fn encoded_hash_part_and_doc_key_sizes(
        bytes: &[u8],
        allow_special: AllowSpecial,
    ) -> Result<(usize, usize)> {
        let mut decoder = DocKeyDecoder::new(bytes);
        let mut callback = EncodedSizesCallback::default();
        do_decode(&mut decoder, DocKeyPart::WholeDocKey, allow_special, &mut callback)?;
        // do_decode always reaches the range group for a whole key.
        let remaining_at_range = callback
            .remaining_at_range_group()
            .unwrap_or(decoder.left_input().len());
        Ok((
            bytes.len() - remaining_at_range,
            decoder.consumed_size_from(bytes),
        ))
    }

    /// Human-readable form of an encoded key, never failing.
    pub fn debug_slice_to_string(bytes: &[u8]) -> String {
        let mut key = DocKey::new();
        match key.decode_from_slice(bytes, DocKeyPart::WholeDocKey, AllowSpecial::Yes) {
            Ok(decoded_size) => {
                let mut result = key.to_string();
                if decoded_size < bytes.len() {
                    result.push_str(" + ");
                    result.push_str(&debug_hex(&bytes[decoded_size..]));
                }
                result
            }
            Err(e) => format!("{e}: {}", debug_hex(bytes)),
        }
    }
}

pub(crate) fn write_components(f: &mut fmt::Formatter<'_>, values: &[PrimitiveValue]) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DocKey(")?;
        if !self.cotable_id.is_nil() {
            write!(f, "CoTableId={}, ", self.cotable_id)?;
        }
        if let Some(hash) = self.hash {
            write!(f, "0x{hash:04x}, ")?;
        }
        write_components(f, &self.hashed_group)?;
        f.write_str(", ")?;
        write_components(f, &self.range_group)?;
        f.write_str(")")
    }
}

/// Consume one primitive value, or the group end (returning `false`).
pub fn consume_primitive_value_from_key(input: &mut &[u8]) -> Result<bool> {
    if !has_primitive_value(input, AllowSpecial::No)? {
        return Ok(false);
    }
    PrimitiveValue::decode_key(input, None, AllowSpecial::No)?;
    Ok(true)
}

/// Decode values up to and including the next group end.
pub fn consume_primitive_values_from_key(
    input: &mut &[u8],
    out: &mut Vec<PrimitiveValue>,
) -> Result<()> {
    consume_primitive_values(input, AllowSpecial::No, callback::GroupSink::Values(out))
}

/// Cut an encoded key back to its hashed part followed by an empty range
/// group, in place.
///
/// This edits raw bytes without decoding the range group: the buffer must
/// start with a valid document key. Returns `false` if the range group was
/// already empty.
pub fn clear_range_components(out: &mut KeyBytes, allow_special: AllowSpecial) -> Result<bool> {
    let prefix_size = DocKey::encoded_size(out.as_slice(), DocKeyPart::HashedPartOnly, allow_special)?;
    let group_end = ValueType::GroupEnd.as_u8();
    let data = out.data_mut();
    if data.len() == prefix_size + 1 && data[prefix_size] == group_end {
        return Ok(false);
    }
    if data.len() > prefix_size {
        data[prefix_size] = group_end;
        data.truncate(prefix_size + 1);
    } else {
        data.push(group_end);
    }
    Ok(true)
}

/// Compare the co-table id, hash and hashed components of two encoded keys
/// byte for byte, one component at a time, without materializing values.
pub fn hashed_components_equal(lhs: &[u8], rhs: &[u8]) -> Result<bool> {
    let mut lhs_decoder = DocKeyDecoder::new(lhs);
    let mut rhs_decoder = DocKeyDecoder::new(rhs);
    lhs_decoder.decode_cotable_id(None)?;
    rhs_decoder.decode_cotable_id(None)?;

    let hash_present = lhs_decoder.decode_hash_code(AllowSpecial::Yes)?.is_some();
    rhs_decoder.decode_hash_code(AllowSpecial::Yes)?;

    let consumed = lhs_decoder.consumed_size_from(lhs);
    if consumed != rhs_decoder.consumed_size_from(rhs) || lhs[..consumed] != rhs[..consumed] {
        return Ok(false);
    }
    if !hash_present {
        return Ok(true);
    }

    while !lhs_decoder.group_ended() {
        let lhs_start = lhs_decoder.left_input();
        let rhs_start = rhs_decoder.left_input();
        let value_type = lhs_start[0];
        if rhs_decoder.group_ended() || rhs_start[0] != value_type {
            return Ok(false);
        }
        if !ValueType::from_u8(value_type).is_some_and(ValueType::is_primitive_or_special) {
            return Ok(false);
        }

        lhs_decoder.decode_primitive_value(None, AllowSpecial::Yes)?;
        rhs_decoder.decode_primitive_value(None, AllowSpecial::Yes)?;
        let consumed = lhs_decoder.consumed_size_from(lhs_start);
        if consumed != rhs_decoder.consumed_size_from(rhs_start)
            || lhs_start[..consumed] != rhs_start[..consumed]
        {
            return Ok(false);
        }
    }

    if !rhs_decoder.group_ended() {
        return Ok(false);
    }
    // A key cut off before its hashed group end is malformed, not equal.
    lhs_decoder.consume_group_end()?;
    rhs_decoder.consume_group_end()?;
    Ok(true)
}

/// Whether an encoded key lives in `schema`'s table: its leading co-table
/// id matches the schema's, or neither has one.
pub fn doc_key_belongs_to(doc_key: &[u8], schema: &Schema) -> bool {
    let has_table_id = doc_key.first() == Some(&ValueType::TableId.as_u8());
    if !schema.has_cotable_id() {
        return !has_table_id;
    }
    has_table_id && doc_key[1..].starts_with(schema.cotable_id().as_bytes())
}
