pub mod doc_scan;

use crate::error::Result;

/// Cursor over a sorted source of encoded keys.
///
/// The document scans in [`doc_scan`] only move through this trait, so
/// they run over any source that sorts by raw bytes.
pub trait StorageIterator {
    /// Key at the cursor. Empty when the cursor is exhausted.
    fn key(&self) -> &[u8];

    /// Value at the cursor; empty for a tombstone.
    fn value(&self) -> &[u8];

    fn is_valid(&self) -> bool;

    fn next(&mut self) -> Result<()>;

    /// Move to the first entry whose key is `>= key`, in either direction.
    fn seek(&mut self, key: &[u8]) -> Result<()>;
}
