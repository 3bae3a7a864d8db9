pub mod builder;
pub mod policy;

use xxhash_rust::xxh3::xxh3_128;

use crate::error::{Error, Result};
use crate::util::debug_hex;

/// Membership filter over the hashed part of doc keys.
///
/// A miss is definite; a hit may be a false positive. Because keys are
/// added by their hashed part only (see
/// [`policy::HashedComponentsExtractor`]), every row and every version of a
/// partition key maps to the same entry, and a point read can skip a block
/// holding none of its rows.
///
/// For a target rate `p`, each key costs `-1.44 * log2(p)` bits and is
/// probed `bits_per_key * ln 2` times; 1% is about 10 bits and 7 probes.
/// Probe `i` lands at `h1 + i * h2`, the two halves of one 128-bit hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    words: Vec<u64>,
    num_hashes: u32,
    num_bits: u32,
}

/// Serialized layout (little-endian):
///
/// ```text
/// | num_hashes: u32 | num_bits: u32 | words: u64 * ceil(num_bits / 64) | crc32: u32 |
/// ```
const HEADER_SIZE: usize = 8;
const CHECKSUM_SIZE: usize = 4;
const MIN_BITS: u32 = 64;

fn words_for(num_bits: u32) -> usize {
    (num_bits as usize).div_ceil(64)
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

impl BloomFilter {
    /// An empty filter sized for `expected_keys` at `false_positive_rate`.
    ///
    /// # Panics
    /// Panics if `expected_keys` is 0 or the rate is outside (0, 1).
    /// [`policy::DocDbAwareFilterPolicy::new`] validates the rate up front.
    pub fn new(expected_keys: usize, false_positive_rate: f64) -> Self {
        assert!(expected_keys > 0, "expected_keys must be > 0");
        assert!(
            false_positive_rate > 0.0 && false_positive_rate < 1.0,
            "false positive rate must be in (0, 1)"
        );

        let bits_per_key = -1.44 * false_positive_rate.log2();
        let num_bits = ((expected_keys as f64 * bits_per_key).ceil() as u32).max(MIN_BITS);
        let num_hashes = ((bits_per_key * std::f64::consts::LN_2).ceil() as u32).max(1);

        BloomFilter {
            words: vec![0; words_for(num_bits)],
            num_hashes,
            num_bits,
        }
    }

    pub fn insert(&mut self, key: &[u8]) {
        for bit in self.probes(key) {
            self.words[bit / 64] |= 1 << (bit % 64);
        }
    }

    /// `false` means the key was never inserted.
    pub fn may_contain(&self, key: &[u8]) -> bool {
        self.probes(key)
            .all(|bit| self.words[bit / 64] & (1 << (bit % 64)) != 0)
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    fn probes(&self, key: &[u8]) -> impl Iterator<Item = usize> + use<> {
        let hash = xxh3_128(key);
        let (h1, h2) = (hash as u64, (hash >> 64) as u64);
        let num_bits = u64::from(self.num_bits);
        (0..u64::from(self.num_hashes))
            .map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % num_bits) as usize)
    }

    /// Serialize with a CRC32 trailer over everything before it.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.words.len() * 8 + CHECKSUM_SIZE);
        out.extend_from_slice(&self.num_hashes.to_le_bytes());
        out.extend_from_slice(&self.num_bits.to_le_bytes());
        out.extend(self.words.iter().flat_map(|word| word.to_le_bytes()));
        let checksum = crc32fast::hash(&out);
        out.extend_from_slice(&checksum.to_le_bytes());
        out
    }

    /// Rebuild a filter written by [`serialize`](Self::serialize).
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let Some(body_len) = data
            .len()
            .checked_sub(CHECKSUM_SIZE)
            .filter(|&len| len >= HEADER_SIZE)
        else {
            return Err(Error::Corruption(format!(
                "bloom filter too short: {} bytes",
                data.len()
            )));
        };
        let (body, trailer) = data.split_at(body_len);
        let stored = read_u32_le(trailer);
        let computed = crc32fast::hash(body);
        if stored != computed {
            return Err(Error::Corruption(format!(
                "bloom filter checksum mismatch: stored {stored:08x}, computed {computed:08x}"
            )));
        }

        let (header, payload) = body.split_at(HEADER_SIZE);
        let num_hashes = read_u32_le(header);
        let num_bits = read_u32_le(&header[4..]);
        if num_hashes == 0 || num_bits == 0 || payload.len() != words_for(num_bits) * 8 {
            return Err(Error::Corruption(format!(
                "bloom filter header {} does not match a body of {} bytes",
                debug_hex(header),
                payload.len()
            )));
        }

        let words = payload
            .chunks_exact(8)
            .map(|chunk| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                u64::from_le_bytes(raw)
            })
            .collect();
        Ok(BloomFilter {
            words,
            num_hashes,
            num_bits,
        })
    }
}
