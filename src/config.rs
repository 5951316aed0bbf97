//! Runtime dispatch configuration.
//!
//! Read once from the environment when the process-wide registry is built:
//!
//! | Variable | Values | Effect |
//! |----------|--------|--------|
//! | `SIMDPOW_KERNEL` | `generic`, `sse`, `sse4_1` | Prefer this kernel when the CPU supports it |
//! | `SIMDPOW_VECTOR_POW` | `1`/`true`/`on`, `0`/`false`/`off` | Bind the built-in 4-wide power provider (default on) |
//!
//! Which kernels exist at all is decided at build time; see
//! [`crate::COMPILED_FAMILIES`].

use std::env;

use crate::error::{config_error, Result};
use crate::simd::traits::Capability;

/// Environment variable forcing a kernel.
pub const KERNEL_ENV: &str = "SIMDPOW_KERNEL";

/// Environment variable toggling the vector power provider.
pub const VECTOR_POW_ENV: &str = "SIMDPOW_VECTOR_POW";

/// Settings that influence which kernel a registry binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Kernel to use instead of the fastest supported one.
    pub forced_kernel: Option<Capability>,
    /// Bind the built-in [`crate::LanewisePow`] provider to vector kernels.
    /// When false they run in degraded (scalar loop) mode.
    pub vector_pow: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            forced_kernel: None,
            vector_pow: true,
        }
    }
}

impl DispatchConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(KERNEL_ENV).filter(|v| !v.trim().is_empty()) {
            let kernel = value.parse::<Capability>().map_err(|_| {
                config_error(KERNEL_ENV, value.as_str(), "expected generic, sse or sse4_1")
            })?;
            config.forced_kernel = Some(kernel);
        }

        if let Some(value) = lookup(VECTOR_POW_ENV).filter(|v| !v.trim().is_empty()) {
            config.vector_pow = parse_switch(VECTOR_POW_ENV, &value)?;
        }

        Ok(config)
    }

    pub fn with_forced_kernel(mut self, kernel: Capability) -> Self {
        self.forced_kernel = Some(kernel);
        self
    }

    pub fn with_vector_pow(mut self, enabled: bool) -> Self {
        self.vector_pow = enabled;
        self
    }
}

fn parse_switch(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(config_error(key, value, "expected on/off")),
    }
}
