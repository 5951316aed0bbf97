//! Sign recovery for negative bases.
//!
//! The vector kernels compute `|x|^p` and multiply negative lanes by
//! [`sign_factor`]. The factor is `(-1)^trunc(p)`: `-1` when the integer
//! part of `p` is odd, `+1` otherwise. For integer `p` this equals
//! `powf(-1, p)` exactly, so negative bases come out right. For non-integer
//! `p` a negative base yields `±|x|^p` instead of the NaN that
//! [`f32::powf`] returns.

/// Smallest magnitude from which every `f32` is an even integer (2^24).
const EVEN_INTEGER_THRESHOLD: f32 = 16_777_216.0;

/// Factor applied to lanes whose input was negative.
///
/// Computed once per call; the exponent is shared by every element.
#[inline]
pub fn sign_factor(power: f32) -> f32 {
    if power.is_nan() {
        return f32::NAN;
    }
    // Also covers ±inf: powf(-1, ±inf) == 1
    if power.abs() >= EVEN_INTEGER_THRESHOLD {
        return 1.0;
    }

    // |trunc(power)| < 2^24, exact in i32
    if (power.trunc() as i32) & 1 == 1 {
        -1.0
    } else {
        1.0
    }
}

/// Scalar model of one vector lane: magnitude power with the sign factor
/// reapplied. `pow4` stands in for one lane of the vector power primitive.
#[inline]
pub fn sign_recovered(value: f32, power: f32, pow4: impl Fn(f32, f32) -> f32) -> f32 {
    if value < 0.0 {
        sign_factor(power) * pow4(-value, power)
    } else {
        pow4(value, power)
    }
}
