pub mod skiplist;

use skiplist::{SkipList, SkipListIterator};

use crate::error::Result;
use crate::iterator::StorageIterator;
use crate::options::Options;
use crate::sub_doc_key::SubDocKey;

/// Ordered in-memory store of encoded keys.
///
/// The memtable knows nothing about doc keys: it sorts raw bytes, and the
/// key codec makes that order the document order. An empty value is a
/// tombstone. Version walkers such as
/// [`read_latest`](crate::iterator::doc_scan::read_latest) rely on seeing
/// it so they stop there instead of reading an older version.
pub struct MemTable {
    entries: SkipList,
    size_limit: usize,
}

impl MemTable {
    pub fn new(size_limit: usize) -> Self {
        MemTable {
            entries: SkipList::new(),
            size_limit,
        }
    }

    pub fn with_options(options: &Options) -> Self {
        MemTable {
            entries: SkipList::with_max_height(options.skiplist_max_height),
            size_limit: options.memtable_size_limit,
        }
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    /// Write `value` under the encoded form of `key`, hybrid time included.
    pub fn put_sub_doc_key(&mut self, key: &SubDocKey, value: Vec<u8>) {
        self.put(key.encode().into_vec(), value);
    }

    /// `None` for absent and deleted keys alike.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).filter(|value| !value.is_empty())
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.entries.insert(key, Vec::new());
    }

    pub fn delete_sub_doc_key(&mut self, key: &SubDocKey) {
        self.delete(key.encode().into_vec());
    }

    /// All entries in key order, tombstones included.
    pub fn iter(&self) -> SkipListIterator<'_> {
        self.entries.iter()
    }

    /// Iterator at the first entry whose key is `>= key`.
    pub fn seek(&self, key: &[u8]) -> Result<SkipListIterator<'_>> {
        let mut iter = self.entries.iter();
        iter.seek(key)?;
        Ok(iter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of keys and values held.
    pub fn size(&self) -> usize {
        self.entries.size_bytes()
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.size_limit
    }
}
