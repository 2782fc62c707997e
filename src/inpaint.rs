use crate::{
    backend::{BackendKind, BackendOpts, caps::CapabilityProvider},
    config::{ChannelLimits, SynthConfig},
    foundation::error::SynthResult,
    job::{
        SynthOutput, SynthesisJob, VoteMode,
        assemble::{JobInputs, JobParams, assemble},
        dispatch::dispatch,
    },
    pyramid::schedule::LevelParams,
    raster::{
        channels::{CompactImage, RawImage, repack},
        io::load_raw,
    },
};

/// Options of the in-memory inpainting entry point.
///
/// Defaults differ from the command line: votes are weighted by match cost and pixels settle once
/// they change by at most 1.
#[derive(Clone, Debug)]
pub struct InpaintOpts {
    pub params: JobParams,
    pub backend: BackendKind,
    pub backend_opts: BackendOpts,
    pub limits: ChannelLimits,
}

/// Stop threshold of [`InpaintOpts::default`].
pub const INPAINT_STOP_THRESHOLD: u32 = 1;

impl Default for InpaintOpts {
    fn default() -> Self {
        let params = JobParams::default();
        Self {
            params: JobParams {
                vote_mode: VoteMode::Weighted,
                level: LevelParams {
                    stop_threshold: INPAINT_STOP_THRESHOLD,
                    ..params.level
                },
                ..params
            },
            backend: BackendKind::default(),
            backend_opts: BackendOpts::default(),
            limits: ChannelLimits::default(),
        }
    }
}

/// Build an inpainting job: the mask is the target guide and its inversion the source guide, so
/// masked target regions are synthesized from the unmasked parts of the source.
pub fn inpaint_job(
    source: CompactImage,
    mask: CompactImage,
    params: &JobParams,
    limits: &ChannelLimits,
) -> SynthResult<SynthesisJob> {
    let source_guide = mask.inverted();
    assemble(
        JobInputs {
            source_style: source,
            source_guide,
            target_guide: mask,
            target_modulation: None,
        },
        params,
        limits,
    )
}

/// Repack both RGBA images to their minimal channel layouts, then [`inpaint_job`].
pub fn inpaint_job_from_raw(
    source: &RawImage,
    mask: &RawImage,
    params: &JobParams,
    limits: &ChannelLimits,
) -> SynthResult<SynthesisJob> {
    let source = repack(source, source.channel_count());
    let mask = repack(mask, mask.channel_count());
    tracing::debug!(
        style_channels = source.channels(),
        guide_channels = mask.channels(),
        "repacked inputs"
    );
    inpaint_job(source, mask, params, limits)
}

/// Decode the source and mask named by `cfg` and build the job.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(source = %cfg.source.display(), mask = %cfg.mask.display())
)]
pub fn load_inpaint_job(cfg: &SynthConfig, limits: &ChannelLimits) -> SynthResult<SynthesisJob> {
    let source = load_raw(&cfg.source)?;
    let mask = load_raw(&cfg.mask)?;
    inpaint_job_from_raw(&source, &mask, &cfg.job_params(), limits)
}

/// Inpaint `source` where `mask` is set, on whichever backend `opts.backend` resolves to.
pub fn inpaint(
    source: &CompactImage,
    mask: &CompactImage,
    opts: &InpaintOpts,
    caps: &dyn CapabilityProvider,
) -> SynthResult<SynthOutput> {
    let job = inpaint_job(source.clone(), mask.clone(), &opts.params, &opts.limits)?;
    dispatch(job, opts.backend, caps, &opts.backend_opts)
}

#[cfg(test)]
#[path = "../tests/unit/inpaint.rs"]
mod tests;
