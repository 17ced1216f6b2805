use murmur3::murmur3_x64_128;
use std::io::Cursor;

/// Seed keying the 64-bit hash. Changing it reshuffles every register index,
/// so exported registers are only comparable between processes that agree
/// on it. Non-zero, so the empty input does not hash to zero.
pub const HASH_SEED: u32 = 0xdead_beef;

/// Register index and rank derived from a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub index: usize,
    pub rank: u8,
}

pub(crate) fn hash_murmur64(key: &[u8]) -> u64 {
    let mut cursor = Cursor::new(key);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3_x64_128(&mut cursor, HASH_SEED)
        .expect("Failed to compute Murmur3 hash");
    hash as u64
}

/// 64-bit keyed hash of an observation.
pub fn default_hash_function(item: &[u8]) -> u64 {
    hash_murmur64(item)
}

/// Splits a hash into `(index, rank)`.
///
/// `index` is the low `log_size` bits. `rank` is the leading-zero count of
/// the hash shifted right by `log_size`, measured over all 64 bits, so it is
/// never below `log_size`. Exported registers depend on this exact layout.
pub fn project_hash(hash: u64, log_size: u32) -> Projection {
    let mask = (1u64 << log_size) - 1;
    let index = (hash & mask) as usize;
    let remainder = hash >> log_size;
    Projection {
        index,
        rank: remainder.leading_zeros() as u8,
    }
}

/// Projects an observation onto the sketch using the default hash.
pub fn project(item: &[u8], log_size: u32) -> Projection {
    project_hash(default_hash_function(item), log_size)
}
