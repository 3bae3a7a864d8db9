use tracing::{debug, warn};

use crate::bloom::BloomFilter;
use crate::bloom::policy::KeyTransformer;
use crate::error::Result;
use crate::util::debug_hex;

/// Collects the keys of one block and builds its filter.
///
/// Usage while writing a block of sorted keys:
/// 1. Create the builder from the filter policy
/// 2. Call add_key() for every key written to the block
/// 3. Call finish() to get the serialized filter
///
/// Keys are transformed before insertion. Sorted input puts all versions of
/// one partition key next to each other, so only consecutive duplicates
/// need to be dropped.
pub struct FilterBlockBuilder {
    transformer: &'static dyn KeyTransformer,
    false_positive_rate: f64,
    entries: Vec<Vec<u8>>,
    num_keys: usize,
}

impl FilterBlockBuilder {
    pub fn new(transformer: &'static dyn KeyTransformer, false_positive_rate: f64) -> Self {
        FilterBlockBuilder {
            transformer,
            false_positive_rate,
            entries: Vec::new(),
            num_keys: 0,
        }
    }

    /// Add a stored key. Fails if the key cannot be transformed.
    pub fn add_key(&mut self, key: &[u8]) -> Result<()> {
        let entry = self.transformer.transform(key)?;
        self.num_keys += 1;
        if self.entries.last().map(Vec::as_slice) != Some(entry) {
            self.entries.push(entry.to_vec());
        }
        Ok(())
    }

    /// Number of distinct filter entries so far.
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finalize and return the serialized filter.
    pub fn finish(self) -> Vec<u8> {
        let mut filter = BloomFilter::new(self.entries.len().max(1), self.false_positive_rate);
        for entry in &self.entries {
            filter.insert(entry);
        }
        debug!(
            keys = self.num_keys,
            entries = self.entries.len(),
            bits = filter.num_bits(),
            hashes = filter.num_hashes(),
            "built filter block"
        );
        filter.serialize()
    }
}

/// Answers "may this block hold the key" from a serialized filter.
pub struct FilterBlockReader {
    transformer: &'static dyn KeyTransformer,
    filter: BloomFilter,
}

impl FilterBlockReader {
    pub fn new(transformer: &'static dyn KeyTransformer, contents: &[u8]) -> Result<Self> {
        Ok(FilterBlockReader {
            transformer,
            filter: BloomFilter::deserialize(contents)?,
        })
    }

    /// A key that cannot be transformed may still be in the block, so it
    /// reports `true`.
    pub fn key_may_match(&self, key: &[u8]) -> bool {
        match self.transformer.transform(key) {
            Ok(entry) => self.filter.may_contain(entry),
            Err(e) => {
                warn!(error = %e, key = %debug_hex(key), "filter probe with undecodable key");
                true
            }
        }
    }
}
