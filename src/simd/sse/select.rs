//! Lane-wise select by mask.
//!
//! Both vector kernels pick between two vectors per lane with a mask from
//! a comparison (all-ones or all-zeros lanes). The baseline instruction
//! set composes this from AND / AND-NOT / OR, SSE4.1 has `blendv`. For such
//! masks both produce the same bits, so the kernels share everything but
//! the [`MaskSelect`] implementation.

#[cfg(target_arch = "x86")]
use std::arch::x86::_mm_blendv_ps;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::_mm_blendv_ps;

use super::f32x4::F32x4;

/// Choose `if_true` where `mask` is set, `if_false` elsewhere.
pub trait MaskSelect {
    /// # Safety
    ///
    /// The CPU must support the instructions the implementation uses.
    /// `mask` lanes must be all-ones or all-zeros.
    unsafe fn select(mask: F32x4, if_true: F32x4, if_false: F32x4) -> F32x4;
}

/// `(mask & if_true) | (!mask & if_false)`, SSE.
#[derive(Debug, Clone, Copy)]
pub struct BitwiseSelect;

impl MaskSelect for BitwiseSelect {
    #[inline(always)]
    unsafe fn select(mask: F32x4, if_true: F32x4, if_false: F32x4) -> F32x4 {
        mask.and_not(if_false) | (mask & if_true)
    }
}

/// `blendv(if_false, if_true, mask)`, SSE4.1.
#[derive(Debug, Clone, Copy)]
pub struct BlendSelect;

impl MaskSelect for BlendSelect {
    #[inline(always)]
    unsafe fn select(mask: F32x4, if_true: F32x4, if_false: F32x4) -> F32x4 {
        F32x4::from_raw(_mm_blendv_ps(if_false.raw(), if_true.raw(), mask.raw()))
    }
}
