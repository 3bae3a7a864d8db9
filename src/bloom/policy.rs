use crate::bloom::BloomFilter;
use crate::bloom::builder::{FilterBlockBuilder, FilterBlockReader};
use crate::doc_key::DocKey;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::types::{AllowSpecial, DocKeyPart};

/// Maps a stored key to the part of it that goes into a filter.
pub trait KeyTransformer: Send + Sync {
    fn transform<'k>(&self, key: &'k [u8]) -> Result<&'k [u8]>;
}

/// Keeps the co-table id, hash and hashed components of a doc key (with
/// their group end) and drops the rest.
///
/// Every version and every range component of one partition key map to the
/// same filter entry, so a lookup by partition key can never get a false
/// negative from range-key variation.
pub struct HashedComponentsExtractor;

static HASHED_COMPONENTS_EXTRACTOR: HashedComponentsExtractor = HashedComponentsExtractor;

impl HashedComponentsExtractor {
    pub fn instance() -> &'static HashedComponentsExtractor {
        &HASHED_COMPONENTS_EXTRACTOR
    }
}

impl KeyTransformer for HashedComponentsExtractor {
    fn transform<'k>(&self, key: &'k [u8]) -> Result<&'k [u8]> {
        let size = DocKey::encoded_size(key, DocKeyPart::HashedPartOnly, AllowSpecial::No)?;
        Ok(&key[..size])
    }
}

/// Bloom filters over the hashed part of doc keys.
#[derive(Debug, Clone)]
pub struct DocDbAwareFilterPolicy {
    false_positive_rate: f64,
}

impl DocDbAwareFilterPolicy {
    pub const NAME: &'static str = "DocKeyHashedComponentsFilter";

    pub fn new(options: &Options) -> Result<Self> {
        let rate = options.filter_false_positive_rate;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(Error::InvalidArgument(format!(
                "filter false positive rate must be in (0, 1), got {rate}"
            )));
        }
        Ok(DocDbAwareFilterPolicy {
            false_positive_rate: rate,
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    pub fn key_transformer(&self) -> &'static dyn KeyTransformer {
        HashedComponentsExtractor::instance()
    }

    /// Build a serialized filter over keys that were already transformed.
    pub fn create_filter(&self, keys: &[&[u8]]) -> Result<Vec<u8>> {
        if keys.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot create a filter from zero keys".into(),
            ));
        }
        let mut filter = BloomFilter::new(keys.len(), self.false_positive_rate);
        for key in keys {
            filter.insert(key);
        }
        Ok(filter.serialize())
    }

    /// Probe a serialized filter with an already transformed key.
    pub fn key_may_match(&self, key: &[u8], filter: &[u8]) -> Result<bool> {
        Ok(BloomFilter::deserialize(filter)?.may_contain(key))
    }

    pub fn filter_block_builder(&self) -> FilterBlockBuilder {
        FilterBlockBuilder::new(self.key_transformer(), self.false_positive_rate)
    }

    pub fn filter_block_reader(&self, contents: &[u8]) -> Result<FilterBlockReader> {
        FilterBlockReader::new(self.key_transformer(), contents)
    }
}
