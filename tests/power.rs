//! Behaviour of every kernel on the documented scenarios and edge cases.
//!
//! Each test runs against all kernels the machine supports, once with the
//! vector power provider bound and once in degraded mode.

mod common;

use std::hint::black_box;
use std::ptr::NonNull;

use common::{assert_all_close, bits, degraded_registry, full_registry, reference, run};
use simdpow::{AlignedVec, Capability, KernelRegistry, PowerKernel, VECTOR_ALIGNMENT};

fn for_each_kernel(mut check: impl FnMut(&dyn PowerKernel, &str)) {
    for (label, registry) in [("full", full_registry()), ("degraded", degraded_registry())] {
        for kernel in registry.kernels() {
            check(kernel, &format!("{} ({label})", kernel.name()));
        }
    }
}

fn vector_kernels(registry: &KernelRegistry) -> Vec<&dyn PowerKernel> {
    registry
        .kernels()
        .filter(|k| k.capability() != Capability::Scalar)
        .collect()
}

#[test]
fn test_squares_of_first_integers() {
    for_each_kernel(|kernel, context| {
        assert_eq!(
            run(kernel, &[0.0, 1.0, 2.0, 3.0], 2.0),
            vec![0.0, 1.0, 4.0, 9.0],
            "{context}"
        );
    });
}

#[test]
fn test_negative_base_odd_integer_exponent() {
    for_each_kernel(|kernel, context| {
        // n = 1 runs entirely in the scalar tail
        assert_eq!(run(kernel, &[-2.0], 3.0), vec![-8.0], "{context}");
        // a full vector group exercises sign recovery
        assert_eq!(run(kernel, &[-2.0; 4], 3.0), vec![-8.0; 4], "{context}");
        assert_eq!(
            run(kernel, &[-2.0, 2.0, -3.0, 3.0, -1.0], 3.0),
            vec![-8.0, 8.0, -27.0, 27.0, -1.0],
            "{context}"
        );
    });
}

#[test]
fn test_negative_base_even_integer_exponent() {
    for_each_kernel(|kernel, context| {
        assert_eq!(
            run(kernel, &[-2.0, -3.0, -0.5, -1.0], 2.0),
            vec![4.0, 9.0, 0.25, 1.0],
            "{context}"
        );
        assert_eq!(
            run(kernel, &[-2.0, -4.0, 2.0, 4.0], -2.0),
            vec![0.25, 0.0625, 0.25, 0.0625],
            "{context}"
        );
    });
}

#[test]
fn test_negative_base_fractional_exponent_reference_is_nan() {
    let registry = full_registry();
    let generic = registry.reference();

    let out = run(generic, &[-2.0], 2.5);
    assert!(out[0].is_nan());
    let out = run(generic, &[-2.0; 4], 2.5);
    assert!(out.iter().all(|v| v.is_nan()));
}

#[test]
fn test_negative_base_fractional_exponent_vector_approximation() {
    let registry = full_registry();
    let approximation = black_box(2.0f32).powf(2.5);

    for kernel in vector_kernels(&registry) {
        assert!(kernel.has_vector_pow());

        // Inside a vector group: (-1)^trunc(2.5) = +1 times |x|^2.5, not NaN
        let out = run(kernel, &[-2.0; 4], 2.5);
        assert_eq!(out, vec![approximation; 4], "{}", kernel.name());

        // Odd integer part flips the sign
        let out = run(kernel, &[-2.0; 4], 3.5);
        assert_eq!(out, vec![-black_box(2.0f32).powf(3.5); 4], "{}", kernel.name());

        // The scalar tail follows the reference
        let out = run(kernel, &[-2.0], 2.5);
        assert!(out[0].is_nan(), "{}", kernel.name());
    }
}

#[test]
fn test_degraded_vector_kernels_match_reference_bits() {
    let registry = degraded_registry();
    let input = [-2.0f32, -1.5, -0.0, 0.0, 0.5, 1.0, 2.0, 3.0, f32::NAN, f32::INFINITY, -7.25];

    for kernel in vector_kernels(&registry) {
        assert!(!kernel.has_vector_pow());
        for exponent in [2.5f32, 3.0, -1.0, 0.0, f32::NAN] {
            assert_eq!(
                bits(&run(kernel, &input, exponent)),
                bits(&reference(&input, exponent)),
                "{} exponent {exponent}",
                kernel.name()
            );
        }
    }
}

#[test]
fn test_zero_to_the_zero_is_one() {
    for_each_kernel(|kernel, context| {
        assert_eq!(run(kernel, &[0.0; 9], 0.0), vec![1.0; 9], "{context}");
        assert_eq!(run(kernel, &[-0.0; 4], 0.0), vec![1.0; 4], "{context}");
    });
}

#[test]
fn test_any_base_to_the_zero_is_one() {
    let input = [-3.5f32, 2.0, f32::NAN, f32::INFINITY, -1.0, 1.0e-30, 7.0, 0.0];
    for_each_kernel(|kernel, context| {
        assert_eq!(run(kernel, &input, 0.0), vec![1.0; input.len()], "{context}");
    });
}

#[test]
fn test_zero_base_positive_exponent_is_zero() {
    for_each_kernel(|kernel, context| {
        let out = run(kernel, &[0.0; 5], 1.5);
        assert!(out.iter().all(|&v| v == 0.0), "{context}: {out:?}");
    });
}

#[test]
fn test_nan_propagation() {
    let input = [2.0f32, 3.0, 0.5, 4.0, 5.0];
    for_each_kernel(|kernel, context| {
        let out = run(kernel, &input, f32::NAN);
        assert!(out.iter().all(|v| v.is_nan()), "{context}: NaN exponent gave {out:?}");

        let out = run(kernel, &[f32::NAN, 1.0, f32::NAN, 2.0, f32::NAN], 2.0);
        assert!(out[0].is_nan() && out[2].is_nan() && out[4].is_nan(), "{context}: {out:?}");
        assert_eq!((out[1], out[3]), (1.0, 4.0), "{context}");
    });
}

#[test]
fn test_length_not_multiple_of_lane_count() {
    let input = [0.5f32, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];
    for exponent in [2.0f32, 0.5, -1.5, 3.25] {
        let expected = reference(&input, exponent);
        for_each_kernel(|kernel, context| {
            assert_all_close(&expected, &run(kernel, &input, exponent), context);
        });
    }
}

#[test]
fn test_zero_length_leaves_output_untouched() {
    let sentinel = [42.0f32; 8];
    let input = AlignedVec::from_slice(&[1.0; 8], VECTOR_ALIGNMENT).unwrap();

    for_each_kernel(|kernel, context| {
        let mut output = AlignedVec::from_slice(&sentinel, VECTOR_ALIGNMENT).unwrap();
        kernel.power(&mut output[..0], &input[..0], 2.0).unwrap();
        assert_eq!(&output[..], &sentinel, "{context}");

        unsafe { kernel.power_raw(output.as_mut_ptr(), input.as_ptr(), 2.0, 0) };
        assert_eq!(&output[..], &sentinel, "{context}");
    });
}

#[test]
fn test_empty_buffers_at_any_address_are_accepted() {
    let dangling = NonNull::<f32>::dangling().as_ptr();

    for_each_kernel(|kernel, context| {
        let mut output: Vec<f32> = Vec::new();
        let input: Vec<f32> = Vec::new();
        assert_eq!(kernel.power(&mut output, &input, 2.0), Ok(()), "{context}");
        assert_eq!(kernel.power_in_place(&mut output, 2.0), Ok(()), "{context}");

        unsafe { kernel.power_raw(dangling, dangling, 2.0, 0) };
    });

    let mut empty: Vec<f32> = Vec::new();
    simdpow::power(&mut empty, &[], 2.0).unwrap();
    simdpow::power_in_place(&mut empty, 2.0).unwrap();
}

#[test]
fn test_in_place_matches_out_of_place() {
    let input: Vec<f32> = (0..23).map(|i| (i as f32 - 11.0) * 0.75).collect();

    for exponent in [3.0f32, 2.0, 2.5, -1.0] {
        for_each_kernel(|kernel, context| {
            let expected = run(kernel, &input, exponent);

            let mut data = AlignedVec::from_slice(&input, VECTOR_ALIGNMENT).unwrap();
            kernel.power_in_place(&mut data, exponent).unwrap();
            assert_eq!(bits(&data), bits(&expected), "{context} exponent {exponent}");
        });
    }
}

#[test]
fn test_repeated_calls_are_deterministic() {
    let input: Vec<f32> = (0..64).map(|i| (i as f32 - 32.0) / 3.0).collect();
    for_each_kernel(|kernel, context| {
        let first = run(kernel, &input, 2.75);
        let second = run(kernel, &input, 2.75);
        assert_eq!(bits(&first), bits(&second), "{context}");
    });
}

#[test]
fn test_misaligned_buffers_are_rejected_by_vector_kernels() {
    let registry = full_registry();
    let input = AlignedVec::from_slice(&[1.0; 9], VECTOR_ALIGNMENT).unwrap();
    let mut output = AlignedVec::new_zeroed(9, VECTOR_ALIGNMENT).unwrap();

    for kernel in vector_kernels(&registry) {
        let err = kernel.power(&mut output[1..], &input[1..], 2.0).unwrap_err();
        assert!(
            matches!(err, simdpow::PowerError::Misaligned { required: 16, .. }),
            "{}: {err}",
            kernel.name()
        );
    }

    registry
        .reference()
        .power(&mut output[1..], &input[1..], 2.0)
        .unwrap();
    assert!(output[1..].iter().all(|&v| v == 1.0));
}
