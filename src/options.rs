/// Tunables for the components that store and filter encoded keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Target false positive rate of the per-block bloom filters.
    pub filter_false_positive_rate: f64,
    /// Memtable size (keys + values) at which `MemTable::is_full` trips.
    pub memtable_size_limit: usize,
    /// Tallest tower the memtable skip list will build. LevelDB uses 12.
    pub skiplist_max_height: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            filter_false_positive_rate: 0.01,
            memtable_size_limit: 4 * 1024 * 1024,
            skiplist_max_height: 12,
        }
    }
}

impl Options {
    pub fn with_filter_false_positive_rate(mut self, rate: f64) -> Self {
        self.filter_false_positive_rate = rate;
        self
    }

    pub fn with_memtable_size_limit(mut self, limit: usize) -> Self {
        self.memtable_size_limit = limit;
        self
    }

    pub fn with_skiplist_max_height(mut self, height: usize) -> Self {
        self.skiplist_max_height = height;
        self
    }
}
