//! The 4-wide vector power capability.
//!
//! Vector kernels do not compute powers themselves. They hand four
//! non-negative bases at a time to a [`VectorPow`] provider bound at
//! construction. A kernel built without a provider runs the scalar loop
//! over the whole range.

use std::fmt;

use crate::LANE_COUNT;

/// A 4-wide power primitive over non-negative bases.
///
/// Results for negative bases are unspecified; kernels never pass them.
pub trait VectorPow: Send + Sync + fmt::Debug {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Raises each lane of `bases` to `exponent`.
    fn powf4(&self, bases: [f32; LANE_COUNT], exponent: f32) -> [f32; LANE_COUNT];
}

/// Lane-by-lane [`f32::powf`].
///
/// Matches the reference kernel bit-for-bit on non-negative bases.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanewisePow;

impl VectorPow for LanewisePow {
    fn name(&self) -> &'static str {
        "lanewise"
    }

    #[inline(always)]
    fn powf4(&self, bases: [f32; LANE_COUNT], exponent: f32) -> [f32; LANE_COUNT] {
        bases.map(|base| base.powf(exponent))
    }
}
