//! Reads over a store of encoded keys, driven by the codec's seek keys.

use tracing::trace;

use crate::bounds::KeyBounds;
use crate::doc_key::DocKey;
use crate::error::{Error, Result};
use crate::hybrid_time::DocHybridTime;
use crate::iterator::StorageIterator;
use crate::sub_doc_key::SubDocKey;
use crate::types::{AllowSpecial, DocKeyPart, HybridTimeRequired};
use crate::util::debug_hex;

/// Visits each distinct doc key in `bounds` once.
///
/// After yielding a doc key the scanner seeks with
/// [`SubDocKey::advance_out_of_doc_key_prefix`], jumping over all of its
/// subkeys and versions in one step. That seek also jumps over doc keys
/// that extend this one's range group, so the store must not mix range
/// group lengths within the scanned bounds.
pub struct DocKeyScanner<'b, I> {
    iter: I,
    bounds: &'b KeyBounds,
    started: bool,
}

impl<'b, I: StorageIterator> DocKeyScanner<'b, I> {
    pub fn new(iter: I, bounds: &'b KeyBounds) -> Self {
        DocKeyScanner {
            iter,
            bounds,
            started: false,
        }
    }

    /// The next doc key, or `None` past the end of the bounds.
    pub fn next_doc_key(&mut self) -> Result<Option<DocKey>> {
        if !self.started {
            self.iter.seek(&self.bounds.lower)?;
            self.started = true;
        }
        if !self.iter.is_valid() || !self.bounds.is_within_bounds(self.iter.key()) {
            return Ok(None);
        }

        let mut doc_key = DocKey::new();
        doc_key
            .decode_from_slice(self.iter.key(), DocKeyPart::WholeDocKey, AllowSpecial::No)
            .map_err(|e| e.prepend("while scanning doc keys"))?;

        let sub_doc_key = SubDocKey::new(doc_key);
        let seek_key = sub_doc_key.advance_out_of_doc_key_prefix();
        trace!(doc_key = %sub_doc_key.doc_key(), seek_key = %debug_hex(&seek_key), "skipping past doc key");
        self.iter.seek(&seek_key)?;
        Ok(Some(sub_doc_key.into_doc_key()))
    }

    /// Drain the remaining doc keys.
    pub fn collect_doc_keys(mut self) -> Result<Vec<DocKey>> {
        let mut out = Vec::new();
        while let Some(doc_key) = self.next_doc_key()? {
            out.push(doc_key);
        }
        Ok(out)
    }
}

/// Newest version of exactly `path` visible at `read_time`.
///
/// Seeks to `path` at `read_time`: versions are stored newest first, so the
/// first entry at or after that key is the newest one not after
/// `read_time`, if `path` has one. A tombstone reads as `None`. Any hybrid
/// time already on `path` is ignored.
pub fn read_latest<I: StorageIterator>(
    iter: &mut I,
    path: &SubDocKey,
    read_time: DocHybridTime,
) -> Result<Option<(DocHybridTime, Vec<u8>)>> {
    let mut seek_key = path.clone();
    seek_key.set_doc_hybrid_time(read_time);
    let seek_bytes = seek_key.encode();
    trace!(path = %path, seek_key = %debug_hex(&seek_bytes), "read latest");
    iter.seek(&seek_bytes)?;
    if !iter.is_valid() {
        return Ok(None);
    }

    let found = SubDocKey::fully_decode(iter.key(), HybridTimeRequired::Yes)
        .map_err(|e| e.prepend("while reading latest version"))?;
    if found.compare_to_ignore_ht(path).is_ne() {
        return Ok(None);
    }
    let doc_ht = version_of(&found)?;
    if iter.value().is_empty() {
        return Ok(None);
    }
    Ok(Some((doc_ht, iter.value().to_vec())))
}

/// Every path under `prefix` (itself included) with its newest version
/// visible at `read_time`, in key order. Tombstoned paths are left out.
///
/// The scan stops at [`SubDocKey::advance_out_of_sub_doc`], the first key
/// past everything under `prefix`.
pub fn latest_versions<I: StorageIterator>(
    iter: &mut I,
    prefix: &SubDocKey,
    read_time: DocHybridTime,
) -> Result<Vec<(SubDocKey, Vec<u8>)>> {
    let bounds = KeyBounds::new(prefix.encode_without_ht(), prefix.advance_out_of_sub_doc());
    iter.seek(&bounds.lower)?;

    let mut out = Vec::new();
    let mut last_path: Option<SubDocKey> = None;
    while iter.is_valid() && bounds.is_within_bounds(iter.key()) {
        let mut key = SubDocKey::fully_decode(iter.key(), HybridTimeRequired::Yes)
            .map_err(|e| e.prepend("while scanning versions"))?;
        let doc_ht = version_of(&key)?;
        key.remove_hybrid_time();

        if last_path.as_ref() != Some(&key) && doc_ht <= read_time {
            if !iter.value().is_empty() {
                let mut visible = key.clone();
                visible.set_doc_hybrid_time(doc_ht);
                out.push((visible, iter.value().to_vec()));
            }
            // Older versions of this path are shadowed.
            last_path = Some(key);
        }
        iter.next()?;
    }
    Ok(out)
}

fn version_of(key: &SubDocKey) -> Result<DocHybridTime> {
    key.doc_hybrid_time().ok_or_else(|| {
        Error::Corruption(format!("stored key without a hybrid time: {key}"))
    })
}
