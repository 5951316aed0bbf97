use std::fmt;
use std::str::FromStr;

use crate::error::{config_error, length_mismatch, misaligned, PowerError, Result};

/// Hardware vector feature a kernel needs in order to run.
///
/// Variants are ordered by preference: a registry binds the greatest
/// capability the CPU supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// No vector unit required.
    Scalar,
    /// Baseline 128-bit vector instruction set (SSE).
    Sse,
    /// Extended 128-bit vector instruction set with `blendv` (SSE4.1).
    Sse41,
}

impl Capability {
    /// All capabilities, fastest first.
    pub const ALL: [Capability; 3] = [Capability::Sse41, Capability::Sse, Capability::Scalar];

    /// Name of the kernel that implements this capability.
    pub fn kernel_name(&self) -> &'static str {
        match self {
            Capability::Scalar => "generic",
            Capability::Sse => "a_sse",
            Capability::Sse41 => "a_sse4_1",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kernel_name())
    }
}

impl FromStr for Capability {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "scalar" => Ok(Capability::Scalar),
            "sse" | "a_sse" => Ok(Capability::Sse),
            "sse4_1" | "sse4.1" | "sse41" | "a_sse4_1" => Ok(Capability::Sse41),
            _ => Err(config_error(
                "kernel",
                s,
                "expected one of generic, sse, sse4_1",
            )),
        }
    }
}

/// Buffer alignment a kernel requires on both its input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Any `f32`-aligned pointer is accepted.
    None,
    /// Both pointers must be aligned to this many bytes.
    Bytes(usize),
}

impl Alignment {
    /// Required alignment in bytes (`1` when unconstrained).
    pub fn bytes(&self) -> usize {
        match self {
            Alignment::None => 1,
            Alignment::Bytes(bytes) => *bytes,
        }
    }

    /// Checks whether `ptr` satisfies this requirement.
    #[inline(always)]
    pub fn is_satisfied_by(&self, ptr: *const f32) -> bool {
        (ptr as usize) % self.bytes() == 0
    }
}

/// Shared surface of the fixed-width lane wrappers used by the vector
/// kernels.
pub trait SimdVec<T> {
    /// Creates a new vector with all lanes set to `value`.
    unsafe fn splat(value: T) -> Self;

    /// Checks if `ptr` meets the alignment of an aligned load or store.
    fn is_aligned(ptr: *const T) -> bool;

    /// Loads one vector from an aligned pointer.
    unsafe fn load_aligned(ptr: *const T) -> Self;

    /// Stores the vector to an aligned pointer.
    unsafe fn store_at(&self, ptr: *mut T);

    /// Lane-wise `self < rhs` as an all-ones / all-zeros mask.
    unsafe fn lt_elements(&self, rhs: Self) -> Self;
}

/// One implementation of the elementwise power contract.
///
/// For every `i < n`, an implementation writes `input[i]` raised to
/// `power` into `output[i]`. Implementations differ only in the hardware
/// they need and in the alignment they require.
///
/// A value of an implementing type must only exist on a CPU that supports
/// its [`PowerKernel::capability`]: the checked entry points call
/// [`PowerKernel::power_raw`] on that basis.
pub trait PowerKernel: Send + Sync + fmt::Debug {
    /// Kernel name, e.g. `"a_sse4_1"`.
    fn name(&self) -> &'static str;

    /// Hardware feature this kernel needs.
    fn capability(&self) -> Capability;

    /// Alignment required on both buffers.
    fn alignment(&self) -> Alignment;

    /// Whether the 4-wide vector power capability is bound. Without it a
    /// vector kernel runs the scalar loop over the whole range.
    fn has_vector_pow(&self) -> bool;

    /// Raises `num_points` elements of `input` to `power` into `output`.
    ///
    /// # Safety
    ///
    /// - `input` must be valid for `num_points` reads and `output` for
    ///   `num_points` writes; both may be dangling when `num_points == 0`.
    /// - `output` and `input` must either be identical or not overlap.
    /// - Both pointers must satisfy [`PowerKernel::alignment`].
    /// - The CPU must support [`PowerKernel::capability`].
    unsafe fn power_raw(&self, output: *mut f32, input: *const f32, power: f32, num_points: usize);

    /// Checked out-of-place entry point. Empty buffers are a no-op
    /// whatever their address.
    fn power(&self, output: &mut [f32], input: &[f32], power: f32) -> Result<()> {
        if output.len() != input.len() {
            return Err(length_mismatch(input.len(), output.len()));
        }
        if input.is_empty() {
            return Ok(());
        }
        self.check_alignment(input.as_ptr())?;
        self.check_alignment(output.as_ptr())?;

        // SAFETY: lengths match, `&mut` excludes overlap, alignment checked,
        // and the kernel's existence implies CPU support.
        unsafe { self.power_raw(output.as_mut_ptr(), input.as_ptr(), power, input.len()) };
        Ok(())
    }

    /// Checked in-place entry point.
    fn power_in_place(&self, data: &mut [f32], power: f32) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.check_alignment(data.as_ptr())?;

        let ptr = data.as_mut_ptr();
        // SAFETY: identical pointers are the one permitted aliasing pattern.
        unsafe { self.power_raw(ptr, ptr, power, data.len()) };
        Ok(())
    }

    /// Returns an error when `ptr` violates [`PowerKernel::alignment`].
    fn check_alignment(&self, ptr: *const f32) -> Result<()> {
        let alignment = self.alignment();
        if alignment.is_satisfied_by(ptr) {
            Ok(())
        } else {
            Err(misaligned(self.name(), alignment.bytes(), ptr))
        }
    }
}
