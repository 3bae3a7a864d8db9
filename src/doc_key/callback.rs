//! Destinations for decoded document key parts.
//!
//! [`do_decode`](super::decoder::do_decode) walks the bytes once; a
//! [`DecodeCallback`] decides where each part ends up. The same walk serves
//! a full decode, span capture for comparators, a size-only dry run and a
//! dry run that also records where the range group starts.

use uuid::Uuid;

use crate::doc_key::DocKey;
use crate::types::{DocKeyHash, KeySpans};
use crate::value::PrimitiveValue;

/// Where the primitive values of one component group go.
pub enum GroupSink<'s, 'a> {
    /// Walk over the values without keeping anything.
    Skip,
    /// Keep the raw encoded bytes of every value.
    Spans(&'s mut KeySpans<'a>),
    /// Materialize every value.
    Values(&'s mut Vec<PrimitiveValue>),
}

pub trait DecodeCallback<'a> {
    fn set_cotable_id(&mut self, _cotable_id: Uuid) {}

    fn set_hash(&mut self, _hash: Option<DocKeyHash>) {}

    fn hashed_group(&mut self) -> GroupSink<'_, 'a> {
        GroupSink::Skip
    }

    /// `remaining` is the undecoded input at the start of the range group.
    fn range_group(&mut self, _remaining: &'a [u8]) -> GroupSink<'_, 'a> {
        GroupSink::Skip
    }
}

/// Validates and measures, nothing else.
pub struct DiscardCallback;

impl<'a> DecodeCallback<'a> for DiscardCallback {}

/// Collects the encoded bytes of hashed and range components, in order.
pub struct SpansCallback<'s, 'a> {
    out: &'s mut KeySpans<'a>,
}

impl<'s, 'a> SpansCallback<'s, 'a> {
    pub fn new(out: &'s mut KeySpans<'a>) -> Self {
        SpansCallback { out }
    }
}

impl<'a> DecodeCallback<'a> for SpansCallback<'_, 'a> {
    fn hashed_group(&mut self) -> GroupSink<'_, 'a> {
        GroupSink::Spans(&mut *self.out)
    }

    fn range_group(&mut self, _remaining: &'a [u8]) -> GroupSink<'_, 'a> {
        GroupSink::Spans(&mut *self.out)
    }
}

/// Records how much input was left when the range group started.
#[derive(Default)]
pub struct EncodedSizesCallback {
    remaining_at_range_group: Option<usize>,
}

impl EncodedSizesCallback {
    pub fn remaining_at_range_group(&self) -> Option<usize> {
        self.remaining_at_range_group
    }
}

impl<'a> DecodeCallback<'a> for EncodedSizesCallback {
    fn range_group(&mut self, remaining: &'a [u8]) -> GroupSink<'_, 'a> {
        self.remaining_at_range_group = Some(remaining.len());
        GroupSink::Skip
    }
}

/// Fills in an existing key.
pub struct DecodeIntoCallback<'k> {
    key: &'k mut DocKey,
}

impl<'k> DecodeIntoCallback<'k> {
    pub fn new(key: &'k mut DocKey) -> Self {
        DecodeIntoCallback { key }
    }
}

impl<'a> DecodeCallback<'a> for DecodeIntoCallback<'_> {
    fn set_cotable_id(&mut self, cotable_id: Uuid) {
        self.key.cotable_id = cotable_id;
    }

    fn set_hash(&mut self, hash: Option<DocKeyHash>) {
        self.key.hash = hash;
    }

    fn hashed_group(&mut self) -> GroupSink<'_, 'a> {
        GroupSink::Values(&mut self.key.hashed_group)
    }

    fn range_group(&mut self, _remaining: &'a [u8]) -> GroupSink<'_, 'a> {
        GroupSink::Values(&mut self.key.range_group)
    }
}
