//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use simdpow::{
    AlignedVec, CpuFeatures, KernelRegistry, LanewisePow, PowerKernel, VectorPow,
    VECTOR_ALIGNMENT,
};

/// Relative tolerance every kernel must meet against the reference.
pub const RELATIVE_TOLERANCE: f32 = 1e-5;

/// Routes the crate's `log` output through the test harness; set
/// `RUST_LOG=simdpow=trace` to see dispatch decisions.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// All kernels this machine runs, with the vector power provider bound.
pub fn full_registry() -> KernelRegistry {
    init_logging();
    let pow4: Arc<dyn VectorPow> = Arc::new(LanewisePow);
    KernelRegistry::new(CpuFeatures::detect(), Some(pow4))
}

/// All kernels this machine runs, vector kernels in degraded mode.
pub fn degraded_registry() -> KernelRegistry {
    init_logging();
    KernelRegistry::new(CpuFeatures::detect(), None)
}

/// Runs `kernel` over 16-byte aligned copies of `input`.
pub fn run(kernel: &dyn PowerKernel, input: &[f32], exponent: f32) -> Vec<f32> {
    let input = AlignedVec::from_slice(input, VECTOR_ALIGNMENT).unwrap();
    let mut output = AlignedVec::new_zeroed(input.len(), VECTOR_ALIGNMENT).unwrap();
    kernel
        .power(&mut output, &input, exponent)
        .unwrap_or_else(|err| panic!("{} rejected aligned buffers: {err}", kernel.name()));
    output.to_vec()
}

/// Reference result, computed independently of the crate.
pub fn reference(input: &[f32], exponent: f32) -> Vec<f32> {
    input.iter().map(|x| x.powf(exponent)).collect()
}

/// Asserts `actual` equals `expected` within `RELATIVE_TOLERANCE`; NaN
/// must match NaN, infinities must match exactly.
pub fn assert_close(expected: f32, actual: f32, context: &str) {
    if expected.is_nan() {
        assert!(actual.is_nan(), "{context}: expected NaN, got {actual}");
        return;
    }
    if expected == actual {
        return;
    }
    let error = (expected - actual).abs();
    assert!(
        error <= RELATIVE_TOLERANCE * expected.abs(),
        "{context}: expected {expected}, got {actual} (rel error {:.2e})",
        error / expected.abs()
    );
}

pub fn assert_all_close(expected: &[f32], actual: &[f32], context: &str) {
    assert_eq!(expected.len(), actual.len(), "{context}: length differs");
    for (i, (&e, &a)) in expected.iter().zip(actual.iter()).enumerate() {
        assert_close(e, a, &format!("{context} [index {i}]"));
    }
}

pub fn bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}
