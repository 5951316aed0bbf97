//! 4-wide power kernels for SSE and SSE4.1.
//!
//! # Algorithm
//!
//! For each aligned group of four inputs:
//!
//! 1. `mask = a < 0`
//! 2. `abs = select(mask, 0 - a, a)`
//! 3. `raw = powf4(abs, power)` through the bound [`VectorPow`]
//! 4. `c = select(mask, sign_factor(power), 1) * raw`
//!
//! The `n mod 4` tail goes through [`power_32f_generic`], as does the whole
//! range when no [`VectorPow`] is bound. The two kernels differ only in
//! their [`MaskSelect`] and therefore agree bit-for-bit.

use std::sync::Arc;

use super::f32x4::{F32x4, LANE_COUNT, SSE_ALIGNMENT};
use super::select::{BitwiseSelect, BlendSelect, MaskSelect};
use crate::simd::generic::power_32f_generic;
use crate::simd::pow4::VectorPow;
use crate::simd::sign::sign_factor;
use crate::simd::traits::{Alignment, Capability, PowerKernel, SimdVec};

/// Processes every complete 4-element group and returns how many elements
/// were written.
#[inline(always)]
unsafe fn power_quarter_points<S, P>(
    c: *mut f32,
    a: *const f32,
    power: f32,
    num_points: usize,
    pow4: &P,
) -> usize
where
    S: MaskSelect,
    P: VectorPow + ?Sized,
{
    let quarter_points = num_points / LANE_COUNT;

    let zero_value = F32x4::zero();
    let ones_mask = F32x4::splat(1.0);
    let negative_one_to_power = F32x4::splat(sign_factor(power));

    for quarter in 0..quarter_points {
        let offset = quarter * LANE_COUNT;

        let a_val = F32x4::load_aligned(a.add(offset));
        let sign_mask = a_val.lt_elements(zero_value);
        let negated_values = zero_value - a_val;
        let magnitudes = S::select(sign_mask, negated_values, a_val);

        // powf4 is only defined for non-negative bases; the sign goes back on below
        let raw = F32x4::from_array(pow4.powf4(magnitudes.to_array(), power));

        let c_val = S::select(sign_mask, negative_one_to_power, ones_mask) * raw;
        c_val.store_at(c.add(offset));
    }

    quarter_points * LANE_COUNT
}

/// Empty ranges may come with dangling pointers and are not checked.
#[inline(always)]
fn debug_assert_aligned(c: *const f32, a: *const f32, num_points: usize) {
    if num_points == 0 {
        return;
    }
    debug_assert!(
        F32x4::is_aligned(c),
        "output pointer {c:p} must be {SSE_ALIGNMENT}-byte aligned"
    );
    debug_assert!(
        F32x4::is_aligned(a),
        "input pointer {a:p} must be {SSE_ALIGNMENT}-byte aligned"
    );
}

/// SSE kernel with AND / AND-NOT / OR selects.
///
/// # Safety
///
/// - `a` valid for `num_points` reads, `c` for `num_points` writes; `c`
///   and `a` identical or disjoint.
/// - Both pointers 16-byte aligned when `num_points > 0` (asserted in
///   debug builds).
/// - The CPU supports SSE.
#[target_feature(enable = "sse")]
pub unsafe fn power_32f_a_sse<P: VectorPow + ?Sized>(
    c: *mut f32,
    a: *const f32,
    power: f32,
    num_points: usize,
    pow4: Option<&P>,
) {
    debug_assert_aligned(c, a, num_points);

    let number = match pow4 {
        Some(pow4) => power_quarter_points::<BitwiseSelect, P>(c, a, power, num_points, pow4),
        None => 0,
    };

    power_32f_generic(c.add(number), a.add(number), power, num_points - number);
}

/// SSE4.1 kernel with `blendv` selects.
///
/// # Safety
///
/// Same as [`power_32f_a_sse`], and the CPU supports SSE4.1.
#[target_feature(enable = "sse4.1")]
pub unsafe fn power_32f_a_sse4_1<P: VectorPow + ?Sized>(
    c: *mut f32,
    a: *const f32,
    power: f32,
    num_points: usize,
    pow4: Option<&P>,
) {
    debug_assert_aligned(c, a, num_points);

    let number = match pow4 {
        Some(pow4) => power_quarter_points::<BlendSelect, P>(c, a, power, num_points, pow4),
        None => 0,
    };

    power_32f_generic(c.add(number), a.add(number), power, num_points - number);
}

/// [`power_32f_a_sse`] bound to an optional vector power provider.
///
/// Only constructible on a CPU that supports SSE.
#[derive(Debug, Clone)]
pub struct SseKernel {
    pow4: Option<Arc<dyn VectorPow>>,
}

impl SseKernel {
    /// Binds `pow4`, or returns `None` when the running CPU lacks the
    /// instructions this kernel is compiled for.
    pub fn new(pow4: Option<Arc<dyn VectorPow>>) -> Option<Self> {
        is_x86_feature_detected!("sse").then(|| Self { pow4 })
    }

    /// Kernel without a vector power provider: scalar loop only.
    pub fn degraded() -> Option<Self> {
        Self::new(None)
    }
}

impl PowerKernel for SseKernel {
    fn name(&self) -> &'static str {
        Capability::Sse.kernel_name()
    }

    fn capability(&self) -> Capability {
        Capability::Sse
    }

    fn alignment(&self) -> Alignment {
        Alignment::Bytes(SSE_ALIGNMENT)
    }

    fn has_vector_pow(&self) -> bool {
        self.pow4.is_some()
    }

    unsafe fn power_raw(&self, output: *mut f32, input: *const f32, power: f32, num_points: usize) {
        power_32f_a_sse(output, input, power, num_points, self.pow4.as_deref());
    }
}

/// [`power_32f_a_sse4_1`] bound to an optional vector power provider.
///
/// Only constructible on a CPU that supports SSE4.1.
#[derive(Debug, Clone)]
pub struct Sse41Kernel {
    pow4: Option<Arc<dyn VectorPow>>,
}

impl Sse41Kernel {
    /// Binds `pow4`, or returns `None` when the running CPU lacks the
    /// instructions this kernel is compiled for.
    pub fn new(pow4: Option<Arc<dyn VectorPow>>) -> Option<Self> {
        is_x86_feature_detected!("sse4.1").then(|| Self { pow4 })
    }

    /// Kernel without a vector power provider: scalar loop only.
    pub fn degraded() -> Option<Self> {
        Self::new(None)
    }
}

impl PowerKernel for Sse41Kernel {
    fn name(&self) -> &'static str {
        Capability::Sse41.kernel_name()
    }

    fn capability(&self) -> Capability {
        Capability::Sse41
    }

    fn alignment(&self) -> Alignment {
        Alignment::Bytes(SSE_ALIGNMENT)
    }

    fn has_vector_pow(&self) -> bool {
        self.pow4.is_some()
    }

    unsafe fn power_raw(&self, output: *mut f32, input: *const f32, power: f32, num_points: usize) {
        power_32f_a_sse4_1(output, input, power, num_points, self.pow4.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::pow4::LanewisePow;
    use crate::utils::AlignedVec;
    use std::hint::black_box;

    fn run_sse(input: &[f32], power: f32) -> Vec<f32> {
        let input = AlignedVec::from_slice(input, SSE_ALIGNMENT).unwrap();
        let mut output = AlignedVec::new_zeroed(input.len(), SSE_ALIGNMENT).unwrap();
        unsafe {
            power_32f_a_sse(
                output.as_mut_ptr(),
                input.as_ptr(),
                power,
                input.len(),
                Some(&LanewisePow),
            )
        };
        output.to_vec()
    }

    #[test]
    fn test_sse_squares() {
        assert_eq!(run_sse(&[0.0, 1.0, 2.0, 3.0], 2.0), vec![0.0, 1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_sse_negative_bases_in_vector_group() {
        let out = run_sse(&[-2.0, -2.0, -2.0, -2.0, -2.0], 3.0);
        assert!(out.iter().all(|&v| v == -8.0), "{out:?}");

        // Vector lanes use sign recovery, the tail follows powf
        let out = run_sse(&[-2.0, 2.0, -3.0, 3.0, -2.0], 2.5);
        let (two, three) = (black_box(2.0f32), black_box(3.0f32));
        assert_eq!(out[0], two.powf(2.5));
        assert_eq!(out[1], two.powf(2.5));
        assert_eq!(out[2], three.powf(2.5));
        assert_eq!(out[3], three.powf(2.5));
        assert!(out[4].is_nan());
    }

    #[test]
    fn test_sse_degraded_matches_generic_bits() {
        let values = [-2.0f32, -1.5, 0.0, 1.5, 2.0, 3.0, 4.0];
        let input = AlignedVec::from_slice(&values, SSE_ALIGNMENT).unwrap();
        let mut output = AlignedVec::new_zeroed(values.len(), SSE_ALIGNMENT).unwrap();
        SseKernel::degraded()
            .unwrap()
            .power(&mut output, &input, 2.5)
            .unwrap();

        for (i, (&got, &x)) in output.iter().zip(values.iter()).enumerate() {
            assert_eq!(got.to_bits(), x.powf(2.5).to_bits(), "index {i}");
        }
    }

    #[test]
    fn test_sse41_matches_sse_bits() {
        if !is_x86_feature_detected!("sse4.1") {
            return;
        }

        let values: Vec<f32> = (0..37).map(|i| (i as f32 - 18.0) * 0.37).collect();
        let input = AlignedVec::from_slice(&values, SSE_ALIGNMENT).unwrap();
        let pow4: Arc<dyn VectorPow> = Arc::new(LanewisePow);

        for power in [-3.0f32, -0.5, 0.0, 1.0, 2.0, 2.5, 7.0] {
            let mut sse = AlignedVec::new_zeroed(values.len(), SSE_ALIGNMENT).unwrap();
            let mut sse41 = AlignedVec::new_zeroed(values.len(), SSE_ALIGNMENT).unwrap();
            SseKernel::new(Some(pow4.clone()))
                .unwrap()
                .power(&mut sse, &input, power)
                .unwrap();
            Sse41Kernel::new(Some(pow4.clone()))
                .unwrap()
                .power(&mut sse41, &input, power)
                .unwrap();

            let sse_bits: Vec<u32> = sse.iter().map(|v| v.to_bits()).collect();
            let sse41_bits: Vec<u32> = sse41.iter().map(|v| v.to_bits()).collect();
            assert_eq!(sse_bits, sse41_bits, "power {power}");
        }
    }

    #[test]
    fn test_constructors_follow_cpu_detection() {
        let pow4: Arc<dyn VectorPow> = Arc::new(LanewisePow);
        assert_eq!(
            SseKernel::new(Some(pow4.clone())).is_some(),
            is_x86_feature_detected!("sse")
        );
        assert_eq!(
            Sse41Kernel::new(Some(pow4)).is_some(),
            is_x86_feature_detected!("sse4.1")
        );
        assert_eq!(
            Sse41Kernel::degraded().is_some(),
            is_x86_feature_detected!("sse4.1")
        );
    }

    #[test]
    fn test_empty_range_accepts_dangling_pointers() {
        let dangling = std::ptr::NonNull::<f32>::dangling().as_ptr();
        unsafe {
            power_32f_a_sse(dangling, dangling, 2.0, 0, Some(&LanewisePow));
        }

        let kernel = SseKernel::new(Some(Arc::new(LanewisePow))).unwrap();
        let mut empty: Vec<f32> = Vec::new();
        assert_eq!(kernel.power(&mut empty, &[], 2.0), Ok(()));
        assert_eq!(kernel.power_in_place(&mut empty, 2.0), Ok(()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "must be 16-byte aligned")]
    fn test_misaligned_pointer_asserts_in_debug() {
        let input = AlignedVec::from_slice(&[1.0; 9], SSE_ALIGNMENT).unwrap();
        let mut output = AlignedVec::new_zeroed(9, SSE_ALIGNMENT).unwrap();
        unsafe {
            power_32f_a_sse(
                output.as_mut_ptr().add(1),
                input.as_ptr().add(1),
                2.0,
                8,
                Some(&LanewisePow),
            )
        };
    }
}
