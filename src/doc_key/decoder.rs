use uuid::Uuid;

use crate::doc_key::callback::{DecodeCallback, GroupSink};
use crate::error::{Error, Result};
use crate::types::{AllowSpecial, DocKeyHash, DocKeyPart};
use crate::util::debug_hex;
use crate::value::{PrimitiveValue, ValueType};

/// Size of the comparable co-table id encoding.
pub const UUID_SIZE: usize = 16;

/// Step-by-step reader over an encoded document key.
///
/// Each step consumes from the front of the remaining input and leaves it
/// untouched on failure.
#[derive(Debug, Clone, Copy)]
pub struct DocKeyDecoder<'a> {
    input: &'a [u8],
}

impl<'a> DocKeyDecoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        DocKeyDecoder { input }
    }

    pub fn left_input(&self) -> &'a [u8] {
        self.input
    }

    pub(crate) fn mutable_input(&mut self) -> &mut &'a [u8] {
        &mut self.input
    }

    /// Bytes consumed since the decoder's input was `start`.
    pub fn consumed_size_from(&self, start: &'a [u8]) -> usize {
        start.len() - self.input.len()
    }

    /// Consume the co-table id if the key has one.
    pub fn decode_cotable_id(&mut self, out: Option<&mut Uuid>) -> Result<bool> {
        if self.input.first() != Some(&ValueType::TableId.as_u8()) {
            return Ok(false);
        }
        let rest = &self.input[1..];
        if rest.len() < UUID_SIZE {
            return Err(Error::Corruption(format!(
                "not enough bytes for cotable id: {}",
                debug_hex(self.input)
            )));
        }
        if let Some(out) = out {
            let mut bytes = [0u8; UUID_SIZE];
            bytes.copy_from_slice(&rest[..UUID_SIZE]);
            *out = Uuid::from_bytes(bytes);
        }
        self.input = &rest[UUID_SIZE..];
        Ok(true)
    }

    /// Consume the 16-bit hash if the key has one.
    pub fn decode_hash_code(&mut self, allow_special: AllowSpecial) -> Result<Option<DocKeyHash>> {
        let Some(&first) = self.input.first() else {
            return Ok(None);
        };
        match ValueType::from_u8(first) {
            Some(ValueType::UInt16Hash) => {}
            Some(ValueType::GroupEnd) => return Ok(None),
            Some(vt) if vt.is_primitive() || (allow_special.allowed() && vt.is_special()) => {
                return Ok(None);
            }
            _ => {
                return Err(Error::Corruption(format!(
                    "expected first value type to be primitive or GroupEnd, got 0x{first:02x} in {}",
                    debug_hex(self.input)
                )));
            }
        }
        if self.input.len() < 1 + std::mem::size_of::<DocKeyHash>() {
            return Err(Error::Corruption(format!(
                "could not decode a 16-bit hash component of a document key: only {} bytes left: {}",
                self.input.len(),
                debug_hex(self.input)
            )));
        }
        let hash = DocKeyHash::from_be_bytes([self.input[1], self.input[2]]);
        self.input = &self.input[3..];
        Ok(Some(hash))
    }

    pub fn decode_primitive_value(
        &mut self,
        out: Option<&mut PrimitiveValue>,
        allow_special: AllowSpecial,
    ) -> Result<()> {
        PrimitiveValue::decode_key(&mut self.input, out, allow_special)
    }

    pub fn consume_group_end(&mut self) -> Result<()> {
        if self.input.first() != Some(&ValueType::GroupEnd.as_u8()) {
            return Err(Error::Corruption(format!(
                "group end expected but {} found",
                debug_hex(self.input)
            )));
        }
        self.input = &self.input[1..];
        Ok(())
    }

    pub fn group_ended(&self) -> bool {
        self.input.is_empty() || self.input[0] == ValueType::GroupEnd.as_u8()
    }

    /// See [`has_primitive_value`].
    pub fn has_primitive_value(&mut self) -> Result<bool> {
        has_primitive_value(&mut self.input, AllowSpecial::No)
    }

    /// Skip the co-table id, the hash and the hashed group.
    pub fn decode_to_range_group(&mut self) -> Result<()> {
        self.decode_cotable_id(None)?;
        if self.decode_hash_code(AllowSpecial::No)?.is_some() {
            while self.has_primitive_value()? {
                self.decode_primitive_value(None, AllowSpecial::No)?;
            }
        }
        Ok(())
    }
}

/// Checks whether `input` starts with a primitive value.
///
/// A group end is consumed and reported as `false`. Anything that is
/// neither a group end nor a value is corruption.
pub fn has_primitive_value(input: &mut &[u8], allow_special: AllowSpecial) -> Result<bool> {
    let Some(&first) = input.first() else {
        return Err(Error::Corruption(
            "unexpected end of key when decoding document key".into(),
        ));
    };
    match ValueType::from_u8(first) {
        Some(ValueType::GroupEnd) => {
            *input = &input[1..];
            Ok(false)
        }
        Some(vt) if vt.is_primitive() => Ok(true),
        Some(vt) if allow_special.allowed() && vt.is_special() => Ok(true),
        _ => Err(Error::Corruption(format!(
            "expected a primitive value type, got 0x{first:02x} in {}",
            debug_hex(input)
        ))),
    }
}

/// Consume values up to and including the group end, feeding each to `sink`.
pub(crate) fn consume_primitive_values<'a>(
    input: &mut &'a [u8],
    allow_special: AllowSpecial,
    mut sink: GroupSink<'_, 'a>,
) -> Result<()> {
    let initial = *input;
    while has_primitive_value(input, allow_special)? {
        let begin = *input;
        let decoded = match &mut sink {
            GroupSink::Skip => PrimitiveValue::decode_key(input, None, allow_special),
            GroupSink::Spans(out) => PrimitiveValue::decode_key(input, None, allow_special)
                .map(|()| out.push(&begin[..begin.len() - input.len()])),
            GroupSink::Values(out) => {
                let mut value = PrimitiveValue::Null;
                PrimitiveValue::decode_key(input, Some(&mut value), allow_special)
                    .map(|()| out.push(value))
            }
        };
        decoded.map_err(|e| {
            e.prepend(format!(
                "while consuming primitive values from {}",
                debug_hex(initial)
            ))
        })?;
    }
    Ok(())
}

/// The single walk over an encoded document key.
///
/// Reads the optional co-table id, the optional hash with its hashed group,
/// and for [`DocKeyPart::WholeDocKey`] the range group, handing each part
/// to `callback`.
pub(crate) fn do_decode<'a, C: DecodeCallback<'a>>(
    decoder: &mut DocKeyDecoder<'a>,
    part: DocKeyPart,
    allow_special: AllowSpecial,
    callback: &mut C,
) -> Result<()> {
    let mut cotable_id = Uuid::nil();
    if decoder.decode_cotable_id(Some(&mut cotable_id))? {
        callback.set_cotable_id(cotable_id);
    }

    let hash = decoder
        .decode_hash_code(allow_special)
        .map_err(|e| e.prepend("error when decoding the hash of a document key"))?;
    callback.set_hash(hash);
    if hash.is_some() {
        consume_primitive_values(decoder.mutable_input(), allow_special, callback.hashed_group())
            .map_err(|e| e.prepend("error when decoding hashed components of a document key"))?;
    }

    match part {
        DocKeyPart::HashedPartOnly => Ok(()),
        DocKeyPart::WholeDocKey => {
            let remaining = decoder.left_input();
            consume_primitive_values(
                decoder.mutable_input(),
                allow_special,
                callback.range_group(remaining),
            )
            .map_err(|e| e.prepend("error when decoding range components of a document key"))
        }
    }
}
