use uuid::Uuid;

use crate::key_bytes::KeyBytes;
use crate::types::DocKeyHash;
use crate::value::{PrimitiveValue, ValueType};

/// Writes a document key part by part. The step types enforce the order
/// co-table id, hash part, range part.
///
/// ```
/// use docdb_keys::doc_key::DocKeyEncoder;
/// use docdb_keys::{KeyBytes, PrimitiveValue};
/// use uuid::Uuid;
///
/// let mut out = KeyBytes::new();
/// DocKeyEncoder::new(&mut out)
///     .cotable_id(&Uuid::nil())
///     .hash(Some(0x1234), &[PrimitiveValue::from("foo")])
///     .range(&[]);
/// assert_eq!(out.as_slice(), b"}\x12\x34Sfoo\x00\x00!!");
/// ```
pub struct DocKeyEncoder<'o> {
    out: &'o mut KeyBytes,
}

impl<'o> DocKeyEncoder<'o> {
    pub fn new(out: &'o mut KeyBytes) -> Self {
        DocKeyEncoder { out }
    }

    /// A nil id writes nothing.
    pub fn cotable_id(self, cotable_id: &Uuid) -> DocKeyEncoderAfterCotableIdStep<'o> {
        if !cotable_id.is_nil() {
            self.out.append_value_type(ValueType::TableId);
            self.out.append_raw_bytes(cotable_id.as_bytes());
        }
        DocKeyEncoderAfterCotableIdStep { out: self.out }
    }
}

pub struct DocKeyEncoderAfterCotableIdStep<'o> {
    out: &'o mut KeyBytes,
}

impl<'o> DocKeyEncoderAfterCotableIdStep<'o> {
    /// Without a hash nothing is written, not even the hashed group end.
    pub fn hash(
        self,
        hash: Option<DocKeyHash>,
        hashed_group: &[PrimitiveValue],
    ) -> DocKeyEncoderAfterHashStep<'o> {
        if let Some(hash) = hash {
            self.out.append_value_type(ValueType::UInt16Hash);
            self.out.append_u16(hash);
            append_doc_key_items(hashed_group, self.out);
        }
        DocKeyEncoderAfterHashStep { out: self.out }
    }
}

pub struct DocKeyEncoderAfterHashStep<'o> {
    out: &'o mut KeyBytes,
}

impl DocKeyEncoderAfterHashStep<'_> {
    pub fn range(self, range_group: &[PrimitiveValue]) {
        append_doc_key_items(range_group, self.out);
    }
}

/// Every item followed by a group end.
pub fn append_doc_key_items(items: &[PrimitiveValue], out: &mut KeyBytes) {
    for item in items {
        item.append_to_key(out);
    }
    out.append_value_type(ValueType::GroupEnd);
}
