use bitvec::prelude::*;
use std::f64::consts::LN_2;
use xxhash_rust::xxh3::xxh3_64_with_seed;

const SEED_PRIMARY: u64 = 0;
const SEED_SECONDARY: u64 = 0x9E37_79B9_7F4A_7C15;
const MIN_BITS: usize = 64;
const MAX_HASHES: u32 = 16;

/// Fixed-size bloom filter over post ids.
///
/// No false negatives. Positions come from double hashing two seeded xxh3
/// digests, so the filter never needs more than two hash calls per id.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: BitVec<u64, Lsb0>,
    num_hashes: u32,
}

impl BloomFilter {
    /// Sizes the filter for `expected_items` at the requested false-positive rate.
    pub fn with_false_positive_rate(expected_items: usize, false_positive_rate: f64) -> Self {
        let n = expected_items.max(1) as f64;
        let bits = (-(n * false_positive_rate.ln()) / (LN_2 * LN_2)).ceil();
        let num_bits = (bits as usize).max(MIN_BITS);
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().clamp(1.0, MAX_HASHES as f64);

        Self {
            bits: bitvec![u64, Lsb0; 0; num_bits],
            num_hashes: num_hashes as u32,
        }
    }

    pub fn insert(&mut self, id: u64) {
        for idx in self.positions(id) {
            self.bits.set(idx, true);
        }
    }

    /// `false` is definite; `true` may be a false positive.
    pub fn may_contain(&self, id: u64) -> bool {
        self.positions(id).all(|idx| self.bits[idx])
    }

    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    fn positions(&self, id: u64) -> impl Iterator<Item = usize> {
        let bytes = id.to_le_bytes();
        let h1 = xxh3_64_with_seed(&bytes, SEED_PRIMARY);
        let h2 = xxh3_64_with_seed(&bytes, SEED_SECONDARY) | 1;
        let m = self.bits.len() as u64;
        (0..self.num_hashes as u64).map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % m) as usize)
    }
}
