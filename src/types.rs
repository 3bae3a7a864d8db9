use smallvec::SmallVec;

/// 16-bit partition hash stored at the front of hash-partitioned keys.
pub type DocKeyHash = u16;

/// Raw sub-slices of an encoded key, one per decoded component.
pub type KeySpans<'a> = SmallVec<[&'a [u8]; 8]>;

/// Cumulative byte offsets into an encoded key.
pub type PrefixLengths = SmallVec<[usize; 8]>;

/// Which part of a document key a decode should walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKeyPart {
    /// Co-table id, hash and hashed components (with their group end).
    HashedPartOnly,
    /// The complete key, range group included.
    WholeDocKey,
}

/// Whether seek-boundary sentinels (`Lowest`, `Highest`, `MaxByte`) are
/// accepted where a primitive value is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowSpecial {
    No,
    Yes,
}

impl AllowSpecial {
    pub fn allowed(self) -> bool {
        self == AllowSpecial::Yes
    }
}

/// Whether a `SubDocKey` decode must find a trailing hybrid time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridTimeRequired {
    No,
    Yes,
}
