//! Safe slice-level power operations.
//!
//! All functions go through the process-wide [`registry()`], so they pick
//! the fastest kernel the CPU and the buffers' alignment allow.
//!
//! # Available Operations
//!
//! - [`power`]: out-of-place, checked lengths
//! - [`power_in_place`]: input and output are the same buffer
//! - [`par_power`]: out-of-place, split across the rayon thread pool
//! - [`SimdPower`]: allocating variants on `&[f32]` and `Vec<f32>`
//!   - [`SimdPower::scalar_power`]: reference kernel only
//!   - [`SimdPower::simd_power`]: best kernel, single-threaded
//!   - [`SimdPower::par_simd_power`]: best kernel, multi-threaded
//!
//! # Usage
//!
//! ```rust
//! use simdpow::SimdPower;
//!
//! let cubes = [1.0f32, -2.0, 3.0].simd_power(3.0);
//! assert_eq!(cubes, vec![1.0, -8.0, 27.0]);
//! ```

use rayon::prelude::*;

use crate::dispatch::registry;
use crate::error::{length_mismatch, Result};
use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_THRESHOLD};

/// Raises every element of `input` to `exponent` into `output`.
///
/// # Errors
///
/// [`crate::PowerError::LengthMismatch`] if the slices differ in length.
pub fn power(output: &mut [f32], input: &[f32], exponent: f32) -> Result<()> {
    registry().power(output, input, exponent)
}

/// Raises every element of `data` to `exponent` in place.
pub fn power_in_place(data: &mut [f32], exponent: f32) -> Result<()> {
    registry().power_in_place(data, exponent)
}

/// Like [`power`], with the work split into chunks of
/// [`PARALLEL_CHUNK_SIZE`] elements across the rayon thread pool.
///
/// Chunk sizes are a multiple of [`crate::LANE_COUNT`], so every chunk
/// keeps the alignment of the buffer start. Inputs of at most
/// [`PARALLEL_THRESHOLD`] elements run on the calling thread.
pub fn par_power(output: &mut [f32], input: &[f32], exponent: f32) -> Result<()> {
    if output.len() != input.len() {
        return Err(length_mismatch(input.len(), output.len()));
    }

    if input.len() <= PARALLEL_THRESHOLD {
        return power(output, input, exponent);
    }

    output
        .par_chunks_mut(PARALLEL_CHUNK_SIZE)
        .zip(input.par_chunks(PARALLEL_CHUNK_SIZE))
        .try_for_each(|(output_chunk, input_chunk)| power(output_chunk, input_chunk, exponent))
}

/// Elementwise power returning a new vector.
pub trait SimdPower {
    /// Reference kernel only.
    fn scalar_power(&self, exponent: f32) -> Vec<f32>;

    /// Best available kernel on the calling thread.
    fn simd_power(&self, exponent: f32) -> Vec<f32>;

    /// Best available kernel across the rayon thread pool.
    fn par_simd_power(&self, exponent: f32) -> Vec<f32>;
}

impl SimdPower for [f32] {
    fn scalar_power(&self, exponent: f32) -> Vec<f32> {
        self.iter().map(|x| x.powf(exponent)).collect()
    }

    fn simd_power(&self, exponent: f32) -> Vec<f32> {
        let mut output = self.to_vec();
        match power_in_place(&mut output, exponent) {
            Ok(()) => output,
            Err(_) => self.scalar_power(exponent),
        }
    }

    fn par_simd_power(&self, exponent: f32) -> Vec<f32> {
        let mut output = vec![0.0f32; self.len()];
        match par_power(&mut output, self, exponent) {
            Ok(()) => output,
            Err(_) => self.scalar_power(exponent),
        }
    }
}

impl SimdPower for Vec<f32> {
    fn scalar_power(&self, exponent: f32) -> Vec<f32> {
        self.as_slice().scalar_power(exponent)
    }

    fn simd_power(&self, exponent: f32) -> Vec<f32> {
        self.as_slice().simd_power(exponent)
    }

    fn par_simd_power(&self, exponent: f32) -> Vec<f32> {
        self.as_slice().par_simd_power(exponent)
    }
}
