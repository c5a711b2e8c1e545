//! Bit-field algebra over sets of bit ranges.
//!
//! Intermediate values are computed in 64 bits so a range covering the full
//! 32-bit word does not overflow the shift.

use crate::types::BitRange;

/// Total number of constrained bits. Used as the specificity score of a shape.
pub fn discriminator_width(ranges: &[BitRange]) -> u32 {
    ranges.iter().map(BitRange::width).sum()
}

/// Mask with every bit of every range set.
pub fn combined_mask(ranges: &[BitRange]) -> u32 {
    ranges.iter().fold(0u32, |mask, range| mask | range_mask(range))
}

/// The bit pattern formed by placing each value at the low bit of its range.
///
/// `values` pairs up with `ranges` by position.
pub fn combined_pattern(ranges: &[BitRange], values: &[u32]) -> u32 {
    ranges
        .iter()
        .zip(values)
        .fold(0u64, |pattern, (range, &value)| {
            pattern | (u64::from(value) << range.low)
        }) as u32
}

fn range_mask(range: &BitRange) -> u32 {
    let ones = (1u64 << range.width()) - 1;
    (ones << range.low) as u32
}
