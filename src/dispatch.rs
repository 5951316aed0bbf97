//! Capability-based kernel selection.
//!
//! CPU features are detected once; a [`KernelRegistry`] then holds every
//! compiled-in kernel the CPU can run, fastest first, with the reference
//! kernel always last. Per call, the registry picks the first kernel whose
//! alignment requirement both buffers meet.

use std::mem;
use std::sync::{Arc, OnceLock};

use log::{debug, trace, warn};

use crate::config::DispatchConfig;
use crate::error::{length_mismatch, Result};
use crate::simd::generic::GenericKernel;
use crate::simd::pow4::{LanewisePow, VectorPow};
#[cfg(sse_kernels)]
use crate::simd::sse::{Sse41Kernel, SseKernel};
use crate::simd::traits::{Capability, PowerKernel};

/// Process-wide registry, built on first use.
static REGISTRY: OnceLock<KernelRegistry> = OnceLock::new();

/// Vector features of the running CPU.
///
/// Only obtainable from detection, optionally narrowed with
/// [`CpuFeatures::without`], so it never claims more than the CPU has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    sse: bool,
    sse4_1: bool,
}

impl CpuFeatures {
    /// Queries the running CPU.
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            Self {
                sse: is_x86_feature_detected!("sse"),
                sse4_1: is_x86_feature_detected!("sse4.1"),
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        {
            Self::none()
        }
    }

    /// A CPU without vector units.
    pub fn none() -> Self {
        Self::default()
    }

    /// These features with `capability` turned off. Turning off SSE also
    /// disables SSE4.1.
    pub fn without(self, capability: Capability) -> Self {
        match capability {
            Capability::Scalar => self,
            Capability::Sse => Self::none(),
            Capability::Sse41 => Self {
                sse4_1: false,
                ..self
            },
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Scalar => true,
            Capability::Sse => self.sse,
            Capability::Sse41 => self.sse && self.sse4_1,
        }
    }
}

fn boxed(kernel: impl PowerKernel + 'static) -> Box<dyn PowerKernel> {
    Box::new(kernel)
}

/// Kernel constructors check the running CPU themselves, so `None` also
/// covers features the caller claimed but the CPU lacks.
fn instantiate(
    capability: Capability,
    pow4: Option<Arc<dyn VectorPow>>,
) -> Option<Box<dyn PowerKernel>> {
    match capability {
        Capability::Scalar => Some(boxed(GenericKernel)),
        #[cfg(sse_kernels)]
        Capability::Sse => SseKernel::new(pow4).map(boxed),
        #[cfg(sse_kernels)]
        Capability::Sse41 => Sse41Kernel::new(pow4).map(boxed),
        #[cfg(not(sse_kernels))]
        Capability::Sse | Capability::Sse41 => {
            drop(pow4);
            None
        }
    }
}

/// Kernels usable on this machine, in order of preference.
#[derive(Debug)]
pub struct KernelRegistry {
    features: CpuFeatures,
    kernels: Vec<Box<dyn PowerKernel>>,
}

impl KernelRegistry {
    /// Binds every compiled-in kernel that `features` supports. Vector
    /// kernels receive `pow4`; with `None` they run in degraded mode.
    pub fn new(features: CpuFeatures, pow4: Option<Arc<dyn VectorPow>>) -> Self {
        Self::build(features, pow4, None)
    }

    /// Like [`KernelRegistry::new`], with the built-in provider bound
    /// according to `config` and its forced kernel moved to the front.
    pub fn with_config(features: CpuFeatures, config: &DispatchConfig) -> Self {
        let pow4 = if config.vector_pow {
            Some(Arc::new(LanewisePow) as Arc<dyn VectorPow>)
        } else {
            None
        };
        Self::build(features, pow4, config.forced_kernel)
    }

    /// Detected CPU features plus [`DispatchConfig::from_env`]. An invalid
    /// environment is logged and replaced by defaults.
    pub fn from_env() -> Self {
        let config = DispatchConfig::from_env().unwrap_or_else(|err| {
            warn!("simdpow: {err}; using default dispatch configuration");
            DispatchConfig::default()
        });
        Self::with_config(CpuFeatures::detect(), &config)
    }

    fn build(
        features: CpuFeatures,
        pow4: Option<Arc<dyn VectorPow>>,
        forced: Option<Capability>,
    ) -> Self {
        let mut kernels: Vec<Box<dyn PowerKernel>> = Capability::ALL
            .iter()
            .filter(|capability| features.supports(**capability))
            .filter_map(|capability| instantiate(*capability, pow4.clone()))
            .collect();

        if let Some(forced) = forced {
            match kernels.iter().position(|k| k.capability() == forced) {
                Some(index) => {
                    let kernel = kernels.remove(index);
                    kernels.insert(0, kernel);
                }
                None => warn!(
                    "simdpow: forced kernel {forced} is not available on this machine; ignoring"
                ),
            }
        }

        debug!(
            "simdpow: bound kernels [{}] (features {:?}, vector pow {})",
            kernels.iter().map(|k| k.name()).collect::<Vec<_>>().join(", "),
            features,
            pow4.as_ref().map_or("none", |p| p.name()),
        );

        Self { features, kernels }
    }

    pub fn features(&self) -> CpuFeatures {
        self.features
    }

    /// Bound kernels, in order of preference.
    pub fn kernels(&self) -> impl Iterator<Item = &dyn PowerKernel> + '_ {
        self.kernels.iter().map(|k| &**k)
    }

    /// The kernel implementing `capability`, if bound.
    pub fn get(&self, capability: Capability) -> Option<&dyn PowerKernel> {
        self.kernels().find(|k| k.capability() == capability)
    }

    /// The preferred kernel, ignoring alignment.
    pub fn best(&self) -> &dyn PowerKernel {
        &*self.kernels[0]
    }

    /// The reference kernel. Always bound.
    pub fn reference(&self) -> &dyn PowerKernel {
        self.get(Capability::Scalar).unwrap_or(&GenericKernel)
    }

    /// The preferred kernel whose alignment both pointers satisfy.
    pub fn select(&self, output: *const f32, input: *const f32) -> &dyn PowerKernel {
        let kernel = self
            .kernels()
            .find(|k| {
                let alignment = k.alignment();
                alignment.is_satisfied_by(output) && alignment.is_satisfied_by(input)
            })
            .unwrap_or(&GenericKernel);

        if kernel.capability() != self.best().capability() {
            trace!(
                "simdpow: {:p}/{:p} not aligned for {}, using {}",
                output,
                input,
                self.best().name(),
                kernel.name()
            );
        }
        kernel
    }

    /// Number of leading elements to run on the reference kernel so that
    /// the rest of both buffers is aligned for [`KernelRegistry::best`].
    /// Zero when no such split exists.
    fn aligned_head(&self, output: *const f32, input: *const f32, num_points: usize) -> usize {
        let align = self.best().alignment().bytes();
        if align <= mem::size_of::<f32>() {
            return 0;
        }

        let input_offset = input as usize % align;
        let output_offset = output as usize % align;
        if input_offset == 0
            || input_offset != output_offset
            || input_offset % mem::size_of::<f32>() != 0
        {
            return 0;
        }

        ((align - input_offset) / mem::size_of::<f32>()).min(num_points)
    }

    /// Raises every element of `input` to `power` into `output`.
    ///
    /// # Errors
    ///
    /// [`crate::PowerError::LengthMismatch`] if the lengths differ.
    pub fn power(&self, output: &mut [f32], input: &[f32], power: f32) -> Result<()> {
        if output.len() != input.len() {
            return Err(length_mismatch(input.len(), output.len()));
        }

        let head = self.aligned_head(output.as_ptr(), input.as_ptr(), input.len());
        let (output_head, output_body) = output.split_at_mut(head);
        let (input_head, input_body) = input.split_at(head);

        if head > 0 {
            trace!("simdpow: peeling {head} elements to reach alignment");
            self.reference().power(output_head, input_head, power)?;
        }

        self.select(output_body.as_ptr(), input_body.as_ptr())
            .power(output_body, input_body, power)
    }

    /// Raises every element of `data` to `power` in place.
    pub fn power_in_place(&self, data: &mut [f32], power: f32) -> Result<()> {
        let head = self.aligned_head(data.as_ptr(), data.as_ptr(), data.len());
        let (data_head, data_body) = data.split_at_mut(head);

        if head > 0 {
            trace!("simdpow: peeling {head} elements to reach alignment");
            self.reference().power_in_place(data_head, power)?;
        }

        self.select(data_body.as_ptr(), data_body.as_ptr())
            .power_in_place(data_body, power)
    }
}

/// The process-wide registry: detected CPU features and
/// [`DispatchConfig::from_env`], built once.
pub fn registry() -> &'static KernelRegistry {
    REGISTRY.get_or_init(KernelRegistry::from_env)
}
