use rand::Rng;

use crate::error::Result;
use crate::iterator::StorageIterator;

/// Default maximum height of the skip list. LevelDB uses 12.
pub const DEFAULT_MAX_HEIGHT: usize = 12;

/// Each level up is reached with probability 1/BRANCHING.
const BRANCHING: u32 = 4;

/// Index of the head sentinel in `SkipList::nodes`.
const HEAD: usize = 0;

/// A single node in the skip list.
///
/// Each node has `height` forward links. Level 0 contains all nodes
/// (a regular linked list). Higher levels skip over nodes, enabling
/// O(log n) average-case search.
///
/// ```text
/// Level 3:  HEAD ──────────────────────────────► 50 ──────────► NIL
/// Level 2:  HEAD ──────────► 20 ────────────────► 50 ──────────► NIL
/// Level 1:  HEAD ──► 10 ──► 20 ────► 35 ────────► 50 ──► 60 ──► NIL
/// Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► 70 ► NIL
/// ```
///
/// Links are indices into the arena (`SkipList::nodes`), so no unsafe code
/// and no reference cycles.
struct SkipNode {
    key: Vec<u8>,
    value: Vec<u8>,
    forward: Vec<Option<usize>>,
}

/// Sorted map from encoded keys to values, ordered by raw bytes.
///
/// Encoded doc keys sort correctly as plain bytes, which is all the store
/// needs to know about them.
///
/// Average case: O(log n) insert, O(log n) lookup, O(n) iteration.
pub struct SkipList {
    nodes: Vec<SkipNode>,
    max_height: usize,
    height: usize,
    len: usize,
    size_bytes: usize,
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl SkipList {
    pub fn new() -> Self {
        Self::with_max_height(DEFAULT_MAX_HEIGHT)
    }

    /// A zero height is treated as one.
    pub fn with_max_height(max_height: usize) -> Self {
        let max_height = max_height.max(1);
        SkipList {
            nodes: vec![SkipNode {
                key: Vec::new(),
                value: Vec::new(),
                forward: vec![None; max_height],
            }],
            max_height,
            height: 1,
            len: 0,
            size_bytes: 0,
        }
    }

    /// Insert a key-value pair. Overwrites if key already exists.
    ///
    /// Algorithm:
    ///   1. Find the insertion point at each level (track predecessors)
    ///   2. Generate a random height for the new node
    ///   3. Splice into the list at each level up to the node's height
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) {
        let mut prev = vec![HEAD; self.max_height];
        if let Some(found) = self.find_greater_or_equal(&key, Some(prev.as_mut_slice())) {
            if self.nodes[found].key == key {
                let node = &mut self.nodes[found];
                self.size_bytes = self.size_bytes - node.value.len() + value.len();
                node.value = value;
                return;
            }
        }

        let height = self.random_height();
        if height > self.height {
            // prev[self.height..height] already points at HEAD.
            self.height = height;
        }

        let idx = self.nodes.len();
        let forward = (0..height).map(|level| self.nodes[prev[level]].forward[level]).collect();
        self.size_bytes += key.len() + value.len();
        self.nodes.push(SkipNode {
            key,
            value,
            forward,
        });
        for (level, &p) in prev.iter().enumerate().take(height) {
            self.nodes[p].forward[level] = Some(idx);
        }
        self.len += 1;
    }

    /// Look up a key. Returns the value if found.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.find_greater_or_equal(key, None)
            .filter(|&idx| self.nodes[idx].key == key)
            .map(|idx| self.nodes[idx].value.as_slice())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes of keys and values held.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Iterator positioned at the first entry.
    pub fn iter(&self) -> SkipListIterator<'_> {
        SkipListIterator {
            list: self,
            current: self.nodes[HEAD].forward[0],
        }
    }

    /// First node with key >= `key`.
    ///
    /// Algorithm:
    ///   1. Start at head, highest level in use
    ///   2. Move forward while next key < target
    ///   3. Drop down one level, recording the predecessor
    ///   4. Repeat until level 0
    fn find_greater_or_equal(&self, key: &[u8], mut prev: Option<&mut [usize]>) -> Option<usize> {
        let mut x = HEAD;
        let mut level = self.height - 1;
        loop {
            let next = self.nodes[x].forward[level];
            match next {
                Some(n) if self.nodes[n].key.as_slice() < key => x = n,
                _ => {
                    if let Some(prev) = prev.as_deref_mut() {
                        prev[level] = x;
                    }
                    if level == 0 {
                        return next;
                    }
                    level -= 1;
                }
            }
        }
    }

    /// Each level has a 1/4 probability (LevelDB uses 1/4, not 1/2).
    fn random_height(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut height = 1;
        while height < self.max_height && rng.gen_ratio(1, BRANCHING) {
            height += 1;
        }
        height
    }
}

/// Follows level 0, which is a sorted linked list of every entry.
pub struct SkipListIterator<'a> {
    list: &'a SkipList,
    current: Option<usize>,
}

impl StorageIterator for SkipListIterator<'_> {
    fn key(&self) -> &[u8] {
        self.current
            .map_or(&[][..], |idx| self.list.nodes[idx].key.as_slice())
    }

    fn value(&self) -> &[u8] {
        self.current
            .map_or(&[][..], |idx| self.list.nodes[idx].value.as_slice())
    }

    fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) -> Result<()> {
        if let Some(idx) = self.current {
            self.current = self.list.nodes[idx].forward[0];
        }
        Ok(())
    }

    fn seek(&mut self, key: &[u8]) -> Result<()> {
        self.current = self.list.find_greater_or_equal(key, None);
        Ok(())
    }
}
