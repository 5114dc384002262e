//! Per-record shift parameters.
//!
//! One [`RecordRandomness`] is drawn per record, in row order, and reused for every
//! obfuscated field of that record so related fields shift together.

use std::ops::RangeInclusive;

use rand::Rng;

pub const DIGIT_SHIFT_RANGE: RangeInclusive<u8> = 1..=9;
pub const DAY_SHIFT_RANGE: RangeInclusive<u32> = 1..=1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRandomness {
    /// Added (mod 10) to every digit.
    pub digit_shift: u8,
    /// Days moved away from "now" for date-like values.
    pub day_shift: u32,
}

impl RecordRandomness {
    pub fn new(digit_shift: u8, day_shift: u32) -> Self {
        Self {
            digit_shift,
            day_shift,
        }
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            digit_shift: rng.random_range(DIGIT_SHIFT_RANGE),
            day_shift: rng.random_range(DAY_SHIFT_RANGE),
        }
    }
}

/// Draws `count` independent bundles; index `i` belongs to record `i`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<RecordRandomness> {
    (0..count).map(|_| RecordRandomness::draw(rng)).collect()
}
