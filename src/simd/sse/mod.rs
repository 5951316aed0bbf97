//! SSE and SSE4.1 kernels for 128-bit vectors.
//!
//! This module is only compiled when the build script emits `sse_kernels`
//! (x86 and x86_64 targets, unless `SIMDPOW_SCALAR_ONLY` is set). Whether
//! the running CPU supports each kernel is decided at run time by
//! [`crate::dispatch::CpuFeatures`].
//!
//! - **Vector Width**: 128 bits (4 × f32)
//! - **Memory Alignment**: both buffers 16-byte aligned

pub mod f32x4;

pub mod power;

pub mod select;

pub use power::{power_32f_a_sse, power_32f_a_sse4_1, Sse41Kernel, SseKernel};
