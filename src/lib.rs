//! patchsynth prepares and runs example-based guided image synthesis jobs.
//!
//! Raw RGBA inputs are reduced to their minimal channel layout, validated and assembled into an
//! immutable [`SynthesisJob`] with a coarse-to-fine [`PyramidSchedule`]. The job is then handed
//! to exactly one [`SynthBackend`], chosen at runtime:
//!
//! - [`BackendKind::Cpu`]: rayon-parallel PatchMatch search and voting
//! - [`BackendKind::Gpu`]: host search with a wgpu compute vote (cargo feature `gpu`)
//! - [`BackendKind::Auto`]: GPU when a [`CapabilityProvider`] reports one, CPU otherwise
//!
//! [`inpaint`] wires the whole pipeline for in-memory images; the `patchsynth` binary does the
//! same for files.
#![forbid(unsafe_code)]

pub(crate) mod backend;
/// Command line front end used by the `patchsynth` binary.
pub mod cli;
pub(crate) mod config;
pub(crate) mod foundation;
pub(crate) mod inpaint;
pub(crate) mod job;
pub(crate) mod pyramid;
pub(crate) mod raster;
pub(crate) mod synth;

pub use crate::backend::caps::{
    CapabilityProvider, StaticCapabilities, SystemCapabilities, backend_available,
    resolve_backend,
};
pub use crate::backend::cpu::CpuBackend;
#[cfg(feature = "gpu")]
pub use crate::backend::gpu::GpuBackend;
pub use crate::backend::{
    BackendKind, BackendOpts, DEFAULT_SEED, ResolvedBackend, SynthBackend, THREADS_ENV,
    create_backend,
};
pub use crate::config::{
    ChannelLimits, DEFAULT_MASK, DEFAULT_SOURCE, MAX_GUIDE_CHANNELS, MAX_STYLE_CHANNELS,
    OUTPUT_SUFFIX, SynthConfig, default_output_path,
};
pub use crate::foundation::error::{SynthError, SynthResult};
pub use crate::inpaint::{
    INPAINT_STOP_THRESHOLD, InpaintOpts, inpaint, inpaint_job, inpaint_job_from_raw,
    load_inpaint_job,
};
pub use crate::job::assemble::{JobInputs, JobParams, assemble, validate_patch_size};
pub use crate::job::dispatch::{dispatch, run_job};
pub use crate::job::weights::WeightVector;
pub use crate::job::{SynthOutput, SynthesisJob, VoteMode};
pub use crate::pyramid::schedule::{
    LevelParams, LevelPass, MAX_LEVEL_PROBE, PyramidSchedule, max_pyramid_levels,
    pyramid_level_size, resolve_level_count,
};
pub use crate::raster::channels::{ChannelCount, CompactImage, RawImage, repack};
pub use crate::raster::io::{decode_raw, load_raw, save_png};
pub use crate::raster::resample::resample_area;
pub use crate::synth::EXTRA_PASS_PATCH_SIZE;
pub use crate::synth::nnf::Nnf;
