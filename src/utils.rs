use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};

/// An `f32` buffer with a caller-chosen start alignment.
///
/// The vector kernels need 16-byte aligned buffers, which `Vec<f32>` does
/// not guarantee. `AlignedVec` owns such a buffer and derefs to `[f32]`, so
/// it can be handed to any kernel or slice API.
///
/// # Memory Safety
///
/// - Uses `std::alloc::alloc_zeroed()` for allocation and `std::alloc::dealloc()`
///   for cleanup, with the same layout
/// - Conversion to `Vec<f32>` copies (`to_vec`) rather than transferring the
///   allocation, since `Vec` would free it with the wrong layout
///
/// # Example
///
/// ```rust
/// use simdpow::{AlignedVec, VECTOR_ALIGNMENT};
///
/// let data = AlignedVec::from_slice(&[1.0, 2.0, 3.0], VECTOR_ALIGNMENT).unwrap();
/// assert_eq!(data.as_ptr() as usize % VECTOR_ALIGNMENT, 0);
/// assert_eq!(&data[..], &[1.0, 2.0, 3.0]);
/// ```
pub struct AlignedVec {
    ptr: NonNull<f32>,
    len: usize,
    layout: Layout,
}

// SAFETY: AlignedVec uniquely owns its allocation, like Vec<f32>.
unsafe impl Send for AlignedVec {}
unsafe impl Sync for AlignedVec {}

impl AlignedVec {
    /// Allocates `len` zeroed elements aligned to `align` bytes.
    ///
    /// # Errors
    ///
    /// - [`crate::PowerError::Layout`] if `align` is not a power of two, is
    ///   smaller than the alignment of `f32`, or the size overflows
    /// - [`crate::PowerError::Allocation`] if the allocator returns null
    pub fn new_zeroed(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align < mem::align_of::<f32>() {
            return Err(layout_error(
                len,
                align,
                "alignment must be a power of two no smaller than 4",
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<f32>())
            .ok_or_else(|| layout_error(len, align, "size overflows usize"))?;

        let layout = Layout::from_size_align(size, align)
            .map_err(|err| layout_error(size, align, err.to_string()))?;

        if size == 0 {
            // Zero-sized: no allocation, but keep the pointer aligned
            // SAFETY: align is a non-zero power of two
            let ptr = unsafe { NonNull::new_unchecked(align as *mut f32) };
            return Ok(AlignedVec { ptr, len, layout });
        }

        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc_zeroed(layout) };

        let ptr = NonNull::new(raw as *mut f32)
            .ok_or_else(|| allocation_error(size, align, "allocator returned null"))?;

        Ok(AlignedVec { ptr, len, layout })
    }

    /// Copies `values` into a new buffer aligned to `align` bytes.
    pub fn from_slice(values: &[f32], align: usize) -> Result<Self> {
        let mut buffer = Self::new_zeroed(values.len(), align)?;
        buffer.copy_from_slice(values);
        Ok(buffer)
    }

    /// Start alignment of this buffer in bytes.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for AlignedVec {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in new_zeroed with this exact layout
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
            }
        }
    }
}

impl Deref for AlignedVec {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        // SAFETY: ptr is valid (or dangling-aligned for len 0) and initialized
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as in deref, and &mut self guarantees uniqueness
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl fmt::Debug for AlignedVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedVec")
            .field("alignment", &self.alignment())
            .field("data", &&self[..])
            .finish()
    }
}

impl From<AlignedVec> for Vec<f32> {
    fn from(aligned_vec: AlignedVec) -> Self {
        aligned_vec.to_vec()
    }
}
