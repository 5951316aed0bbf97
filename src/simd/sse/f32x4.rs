#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{BitAnd, BitOr, Mul, Sub};

use crate::simd::traits::SimdVec;

pub use crate::{LANE_COUNT, VECTOR_ALIGNMENT as SSE_ALIGNMENT};

/// A SIMD vector of 4 32-bit floating point values
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    elements: __m128,
}

impl F32x4 {
    /// Wraps a raw register.
    #[inline(always)]
    pub fn from_raw(elements: __m128) -> Self {
        Self { elements }
    }

    /// Returns the raw register.
    #[inline(always)]
    pub fn raw(self) -> __m128 {
        self.elements
    }

    #[inline(always)]
    pub unsafe fn zero() -> Self {
        Self {
            elements: _mm_setzero_ps(),
        }
    }

    #[inline(always)]
    pub unsafe fn from_array(values: [f32; LANE_COUNT]) -> Self {
        Self {
            elements: _mm_loadu_ps(values.as_ptr()),
        }
    }

    #[inline(always)]
    pub unsafe fn to_array(self) -> [f32; LANE_COUNT] {
        let mut values = [0.0f32; LANE_COUNT];
        _mm_storeu_ps(values.as_mut_ptr(), self.elements);
        values
    }

    /// `!self & rhs`, lane bits.
    #[inline(always)]
    pub fn and_not(self, rhs: Self) -> Self {
        Self {
            elements: unsafe { _mm_andnot_ps(self.elements, rhs.elements) },
        }
    }

    /// Raw lane bit patterns, mainly for bit-exact comparisons.
    #[inline(always)]
    pub unsafe fn to_bits(self) -> [u32; LANE_COUNT] {
        self.to_array().map(f32::to_bits)
    }
}

impl SimdVec<f32> for F32x4 {
    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: _mm_set1_ps(value),
        }
    }

    /// Checks if the pointer is aligned to 16 bytes.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % SSE_ALIGNMENT == 0
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr), "Pointer must be 16-byte aligned");

        Self {
            elements: _mm_load_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr), "Pointer must be 16-byte aligned");

        _mm_store_ps(ptr, self.elements);
    }

    /// NaN compares false.
    #[inline(always)]
    unsafe fn lt_elements(&self, rhs: Self) -> Self {
        Self {
            elements: _mm_cmplt_ps(self.elements, rhs.elements),
        }
    }
}

impl Sub for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm_sub_ps(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm_mul_ps(self.elements, rhs.elements) },
        }
    }
}

impl BitAnd for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm_and_ps(self.elements, rhs.elements) },
        }
    }
}

impl BitOr for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm_or_ps(self.elements, rhs.elements) },
        }
    }
}
