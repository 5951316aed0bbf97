#[cfg(sse_kernels)]
pub mod sse;

pub mod generic;

pub mod pow4;

pub mod sign;

pub mod traits;

pub use generic::{power_32f_generic, GenericKernel};
