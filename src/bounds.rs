use std::fmt;

use crate::key_bytes::KeyBytes;
use crate::sub_doc_key::best_effort_doc_db_key_to_str;

/// Key range a scan is restricted to: `[lower, upper)` over encoded keys.
///
/// An empty bound is open on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBounds {
    pub lower: KeyBytes,
    pub upper: KeyBytes,
}

/// Bounds that admit every key.
pub static NO_BOUNDS: KeyBounds = KeyBounds {
    lower: KeyBytes::new(),
    upper: KeyBytes::new(),
};

impl KeyBounds {
    pub fn new(lower: KeyBytes, upper: KeyBytes) -> Self {
        KeyBounds { lower, upper }
    }

    pub fn no_bounds() -> &'static KeyBounds {
        &NO_BOUNDS
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_empty() && self.upper.is_empty()
    }

    pub fn is_within_bounds(&self, key: &[u8]) -> bool {
        (self.lower.is_empty() || key >= self.lower.as_slice())
            && (self.upper.is_empty() || key < self.upper.as_slice())
    }
}

impl fmt::Display for KeyBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |bound: &KeyBytes| {
            if bound.is_empty() {
                "<none>".to_string()
            } else {
                best_effort_doc_db_key_to_str(bound)
            }
        };
        write!(f, "{{ lower: {} upper: {} }}", side(&self.lower), side(&self.upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bounds_admits_everything() {
        assert!(NO_BOUNDS.is_unbounded());
        assert!(KeyBounds::no_bounds().is_within_bounds(b""));
        assert!(KeyBounds::no_bounds().is_within_bounds(b"\xff\xff"));
    }

    #[test]
    fn half_open() {
        let bounds = KeyBounds::new(KeyBytes::from(&b"b"[..]), KeyBytes::from(&b"d"[..]));
        assert!(!bounds.is_within_bounds(b"a"));
        assert!(bounds.is_within_bounds(b"b"));
        assert!(bounds.is_within_bounds(b"c\xff"));
        assert!(!bounds.is_within_bounds(b"d"));

        let lower_only = KeyBounds::new(KeyBytes::from(&b"b"[..]), KeyBytes::new());
        assert!(lower_only.is_within_bounds(b"zzz"));
    }
}
