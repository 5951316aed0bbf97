//! Error types for simdpow operations.
//!
//! The kernels themselves have no error channel: domain edge cases follow
//! IEEE 754 conventions. These errors are produced by the checked layer
//! (slice APIs, the registry, aligned allocation and configuration), which
//! validates what the raw kernels take as preconditions.

use thiserror::Error;

/// Errors that can occur in the checked simdpow APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    /// Input and output buffers have different lengths.
    #[error("Length mismatch: input has {input} elements, output has {output}")]
    LengthMismatch {
        /// Number of input elements.
        input: usize,
        /// Number of output elements.
        output: usize,
    },

    /// A buffer does not satisfy a kernel's alignment requirement.
    #[error("Misaligned buffer for kernel {kernel}: address {address:#x} is not {required}-byte aligned")]
    Misaligned {
        /// Name of the kernel that rejected the buffer.
        kernel: &'static str,
        /// Required alignment in bytes.
        required: usize,
        /// Offending buffer address.
        address: usize,
    },

    /// Memory allocation failed.
    #[error("Memory allocation failed: {message} (requested {requested_size} bytes with {requested_alignment} byte alignment)")]
    Allocation {
        /// The size that was requested to be allocated.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },

    /// Invalid layout parameters were provided.
    #[error("Invalid memory layout: {message} (size: {size}, alignment: {alignment})")]
    Layout {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration {key}={value:?}: {message}")]
    Config {
        /// Configuration key (environment variable name).
        key: &'static str,
        /// The rejected value.
        value: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for simdpow operations.
pub type Result<T> = std::result::Result<T, PowerError>;

/// Creates a length mismatch error.
pub fn length_mismatch(input: usize, output: usize) -> PowerError {
    PowerError::LengthMismatch { input, output }
}

/// Creates a misalignment error for `ptr`.
pub fn misaligned(kernel: &'static str, required: usize, ptr: *const f32) -> PowerError {
    PowerError::Misaligned {
        kernel,
        required,
        address: ptr as usize,
    }
}

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> PowerError {
    PowerError::Allocation {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> PowerError {
    PowerError::Layout {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a configuration error.
pub fn config_error(
    key: &'static str,
    value: impl Into<String>,
    message: impl Into<String>,
) -> PowerError {
    PowerError::Config {
        key,
        value: value.into(),
        message: message.into(),
    }
}
