//! Elementwise `f32` power kernels.
//!
//! `simdpow` raises every element of an `f32` buffer to a scalar exponent.
//! Three interchangeable kernels implement the same contract:
//!
//! - `generic`: element-by-element [`f32::powf`], the reference.
//! - `a_sse`: 4 lanes per iteration on SSE, masked selects built from
//!   AND / AND-NOT / OR.
//! - `a_sse4_1`: the same algorithm with a single `blendv` per select,
//!   bit-identical to `a_sse`.
//!
//! The vector kernels lean on a 4-wide power primitive ([`VectorPow`]) that
//! is only defined for non-negative bases. Negative bases are handled by
//! taking the power of the magnitude and multiplying the sign back in with a
//! precomputed `(-1)^trunc(exponent)` factor (see [`simd::sign`]). This is
//! exact for integer exponents. For a negative base and a non-integer
//! exponent the vector kernels return `sign · |x|^p` where the reference
//! returns NaN.
//!
//! # Usage
//!
//! ```rust
//! use simdpow::SimdPower;
//!
//! let squares = vec![0.0f32, 1.0, 2.0, 3.0].simd_power(2.0);
//! assert_eq!(squares, vec![0.0, 1.0, 4.0, 9.0]);
//!
//! let mut data = vec![-2.0f32; 8];
//! simdpow::power_in_place(&mut data, 3.0).unwrap();
//! assert!(data.iter().all(|&v| v == -8.0));
//! ```
//!
//! Kernel selection happens once per process in [`registry()`]; see
//! [`config`] for the environment variables that influence it.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod simd;
pub mod slice;
pub mod utils;

pub use config::DispatchConfig;
pub use dispatch::{registry, CpuFeatures, KernelRegistry};
pub use error::{PowerError, Result};
pub use simd::pow4::{LanewisePow, VectorPow};
pub use simd::traits::{Alignment, Capability, PowerKernel};
pub use simd::GenericKernel;
#[cfg(sse_kernels)]
pub use simd::sse::{Sse41Kernel, SseKernel};
pub use slice::{par_power, power, power_in_place, SimdPower};
pub use utils::AlignedVec;

/// Number of `f32` lanes processed per vector iteration.
pub const LANE_COUNT: usize = 4;

/// Byte alignment required by the vector kernels on both buffers.
pub const VECTOR_ALIGNMENT: usize = 16;

/// Below this many elements the parallel entry points run single-threaded.
pub const PARALLEL_THRESHOLD: usize = 262_144;

/// Elements per rayon task; a multiple of [`LANE_COUNT`] so that chunk
/// starts keep the alignment of the buffer start.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;

/// Kernel families compiled into this build, as reported by the build script.
pub const COMPILED_FAMILIES: &str = env!("SIMDPOW_COMPILED_FAMILIES");
