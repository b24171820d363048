//! Content-addressed pseudo-randomness.
//!
//! There is no generator state. Each draw is a pure function of a seed
//! string; independent draws for one event use the event id plus a distinct
//! suffix (`"side"`, `"repeat"`, a tag name).

pub const LCG_MULTIPLIER: u64 = 1_103_515_245;
pub const LCG_INCREMENT: u64 = 12_345;
pub const LCG_MODULUS: u64 = 2_147_483_647;

/// Seed suffix for the symptomatic-side preference draw.
pub const SIDE_SUFFIX: &str = "side";
/// Seed suffix for the repeat-view preference draw.
pub const REPEAT_SUFFIX: &str = "repeat";

/// Sum of `code_unit * (index + 1)` over the UTF-16 code units of `seed`.
pub fn seed_value(seed: &str) -> u64 {
    seed.encode_utf16()
        .enumerate()
        .fold(0u64, |acc, (i, unit)| {
            acc.wrapping_add(u64::from(unit).wrapping_mul(i as u64 + 1))
        })
}

/// One linear-congruential step over [`seed_value`], scaled into `[0, 1)`.
pub fn sample(seed: &str) -> f64 {
    let seed = u128::from(seed_value(seed));
    let state = (u128::from(LCG_MULTIPLIER) * seed + u128::from(LCG_INCREMENT))
        % u128::from(LCG_MODULUS);
    state as f64 / LCG_MODULUS as f64
}

pub trait Sampler {
    fn sample(&self, seed: &str) -> f64;

    /// `floor(sample * len)`, clamped so boundary rounding can't escape the slice.
    fn pick_index(&self, seed: &str, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index on empty candidate list");
        let index = (self.sample(seed) * len as f64).floor() as usize;
        index.min(len.saturating_sub(1))
    }
}

/// The canonical sampler. Selections made with it are reproducible
/// across processes and platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct LcgSampler;

impl Sampler for LcgSampler {
    fn sample(&self, seed: &str) -> f64 {
        sample(seed)
    }
}
