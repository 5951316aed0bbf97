//! Reference kernel.
//!
//! Plain [`f32::powf`] per element: negative base with a non-integer
//! exponent gives NaN, `x^0 == 1` for every `x`, NaN propagates otherwise.
//! Every other kernel is checked against this one, and the vector kernels
//! use it for their `n mod 4` tail.

use crate::simd::traits::{Alignment, Capability, PowerKernel};

/// Raises `num_points` values from `a` to `power` into `c`.
///
/// # Safety
///
/// `a` must be valid for `num_points` reads and `c` for `num_points`
/// writes. `c` and `a` may be identical; any other overlap is undefined.
#[inline]
pub unsafe fn power_32f_generic(c: *mut f32, a: *const f32, power: f32, num_points: usize) {
    for number in 0..num_points {
        // Read before write keeps the in-place case well defined
        let value = *a.add(number);
        *c.add(number) = value.powf(power);
    }
}

/// The always-available reference kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericKernel;

impl PowerKernel for GenericKernel {
    fn name(&self) -> &'static str {
        Capability::Scalar.kernel_name()
    }

    fn capability(&self) -> Capability {
        Capability::Scalar
    }

    fn alignment(&self) -> Alignment {
        Alignment::None
    }

    fn has_vector_pow(&self) -> bool {
        false
    }

    unsafe fn power_raw(&self, output: *mut f32, input: *const f32, power: f32, num_points: usize) {
        power_32f_generic(output, input, power, num_points);
    }
}
