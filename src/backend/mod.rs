//! Execution backends and the selection logic that picks one for a job.

pub(crate) mod caps;
pub(crate) mod cpu;
#[cfg(feature = "gpu")]
pub(crate) mod gpu;

use std::fmt;

use crate::{
    foundation::error::{SynthError, SynthResult},
    job::{SynthOutput, SynthesisJob},
};

/// Environment variable consulted when [`BackendOpts::threads`] is unset.
pub const THREADS_ENV: &str = "PATCHSYNTH_THREADS";

/// Seed used by [`BackendOpts::default`].
pub const DEFAULT_SEED: u64 = 0x5EED_5EED_5EED_5EED;

/// Something that can execute a [`SynthesisJob`].
///
/// Implementations block until `output` is fully populated.
pub trait SynthBackend {
    fn run(&self, job: &SynthesisJob, output: &mut SynthOutput) -> SynthResult<()>;
}

/// Backend requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Cpu,
    Gpu,
    /// GPU when one is available, CPU otherwise.
    #[default]
    Auto,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend that can actually execute on this machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedBackend {
    Cpu,
    Gpu,
}

impl ResolvedBackend {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }
}

impl fmt::Display for ResolvedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ResolvedBackend> for BackendKind {
    fn from(value: ResolvedBackend) -> Self {
        match value {
            ResolvedBackend::Cpu => Self::Cpu,
            ResolvedBackend::Gpu => Self::Gpu,
        }
    }
}

/// Knobs shared by every backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendOpts {
    /// Worker threads for host-side work; `None` defers to rayon's default.
    pub threads: Option<usize>,
    /// Seed of the random field initialization and random search.
    pub seed: u64,
}

impl Default for BackendOpts {
    fn default() -> Self {
        Self {
            threads: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl BackendOpts {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Defaults, with `threads` taken from [`THREADS_ENV`] when it holds a positive integer.
    pub fn from_env() -> Self {
        let threads = std::env::var(THREADS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);
        Self {
            threads,
            ..Self::default()
        }
    }
}

/// Instantiate the backend for an already resolved choice.
pub fn create_backend(
    kind: ResolvedBackend,
    opts: &BackendOpts,
) -> SynthResult<Box<dyn SynthBackend>> {
    match kind {
        ResolvedBackend::Cpu => Ok(Box::new(cpu::CpuBackend::new(opts.clone())?)),
        #[cfg(feature = "gpu")]
        ResolvedBackend::Gpu => Ok(Box::new(gpu::GpuBackend::new(opts.clone())?)),
        #[cfg(not(feature = "gpu"))]
        ResolvedBackend::Gpu => Err(SynthError::backend(
            "the gpu backend is not compiled in (enable the `gpu` feature)",
        )),
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> SynthResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SynthError::validation(
            "backend 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SynthError::backend(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/backend/opts.rs"]
mod tests;
