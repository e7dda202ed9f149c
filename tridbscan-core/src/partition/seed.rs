//! Deterministic per-partition seed derivation.

/// SplitMix64 increment (the 64-bit golden ratio) used for per-partition seed
/// derivation.
const PARTITION_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Seed for the partition at `ordinal`, independent of which thread runs it.
#[inline]
pub(crate) fn mix_partition_seed(base_seed: u64, ordinal: usize) -> u64 {
    splitmix64(base_seed ^ ((ordinal as u64 + 1).wrapping_mul(PARTITION_SEED_SPACING)))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(PARTITION_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}
