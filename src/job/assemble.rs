use crate::{
    config::ChannelLimits,
    foundation::error::{SynthError, SynthResult},
    job::{SynthesisJob, VoteMode, weights::WeightVector},
    pyramid::schedule::{LevelParams, PyramidSchedule},
    raster::channels::CompactImage,
};

/// Repacked images a job is assembled from.
#[derive(Clone, Debug)]
pub struct JobInputs {
    pub source_style: CompactImage,
    pub source_guide: CompactImage,
    pub target_guide: CompactImage,
    pub target_modulation: Option<CompactImage>,
}

/// Scalar parameters of a job before schedule derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct JobParams {
    /// Total weight of the style role, split across its channels.
    pub style_weight: f32,
    /// Total weight of the guide role, split across its channels.
    pub guide_weight: f32,
    pub uniformity: f32,
    pub patch_size: u32,
    /// Explicit level count; `None` uses the feasible maximum.
    pub pyramid_levels: Option<usize>,
    /// Controls broadcast to every level.
    pub level: LevelParams,
    pub vote_mode: VoteMode,
    pub extra_pass_3x3: bool,
    /// Ask the backend for the final nearest-neighbor field.
    pub want_nnf: bool,
}

impl Default for JobParams {
    fn default() -> Self {
        Self {
            style_weight: 1.0,
            guide_weight: 1.0,
            uniformity: 3500.0,
            patch_size: 5,
            pyramid_levels: None,
            level: LevelParams::default(),
            vote_mode: VoteMode::Plain,
            extra_pass_3x3: false,
            want_nnf: false,
        }
    }
}

/// Validate shapes, channel ceilings and ranges, then build the immutable job.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        source = ?inputs.source_style.dimensions(),
        style_channels = inputs.source_style.channels(),
        guide_channels = inputs.source_guide.channels(),
    )
)]
pub fn assemble(
    inputs: JobInputs,
    params: &JobParams,
    limits: &ChannelLimits,
) -> SynthResult<SynthesisJob> {
    let JobInputs {
        source_style,
        source_guide,
        target_guide,
        target_modulation,
    } = inputs;

    if source_style.dimensions() != source_guide.dimensions() {
        return Err(SynthError::validation(format!(
            "shape mismatch, source shape is {}, mask shape is {}",
            shape(&source_style),
            shape(&source_guide)
        )));
    }
    if source_style.width() == 0 || source_style.height() == 0 {
        return Err(SynthError::validation(format!(
            "source shape {} has no pixels",
            shape(&source_style)
        )));
    }
    if target_guide.width() == 0 || target_guide.height() == 0 {
        return Err(SynthError::validation(format!(
            "target shape {} has no pixels",
            shape(&target_guide)
        )));
    }
    if source_style.channels() > limits.max_style {
        return Err(SynthError::validation(format!(
            "too many style channels ({}), maximum number is {}",
            source_style.channels(),
            limits.max_style
        )));
    }
    if source_guide.channels() > limits.max_guide {
        return Err(SynthError::validation(format!(
            "too many guide channels ({}), maximum number is {}",
            source_guide.channels(),
            limits.max_guide
        )));
    }
    if target_guide.channels() != source_guide.channels() {
        return Err(SynthError::validation(format!(
            "target guide has {} channels, source guide has {}",
            target_guide.channels(),
            source_guide.channels()
        )));
    }
    if let Some(m) = &target_modulation
        && (m.dimensions() != target_guide.dimensions() || m.channels() != target_guide.channels())
    {
        return Err(SynthError::validation(format!(
            "modulation shape is {}, target guide shape is {}",
            shape(m),
            shape(&target_guide)
        )));
    }

    validate_patch_size(params.patch_size)?;
    if params.pyramid_levels == Some(0) {
        return Err(SynthError::validation(
            "pyramid level count must be >= 1 when set",
        ));
    }

    let schedule = PyramidSchedule::derive(
        source_style.dimensions(),
        params.patch_size,
        params.pyramid_levels,
        params.level,
    );

    Ok(SynthesisJob {
        style_weights: WeightVector::uniform(params.style_weight, source_style.channels()),
        guide_weights: WeightVector::uniform(params.guide_weight, source_guide.channels()),
        source_style,
        source_guide,
        target_guide,
        target_modulation,
        uniformity: params.uniformity,
        patch_size: params.patch_size,
        vote_mode: params.vote_mode,
        schedule,
        extra_pass_3x3: params.extra_pass_3x3,
        want_nnf: params.want_nnf,
    })
}

/// Patch sizes must be odd and at least 3.
pub fn validate_patch_size(patch_size: u32) -> SynthResult<()> {
    if patch_size < 3 {
        return Err(SynthError::validation("patchsize is too small!"));
    }
    if patch_size % 2 == 0 {
        return Err(SynthError::validation("patchsize must be an odd number!"));
    }
    Ok(())
}

impl SynthesisJob {
    /// Replace the uniform weights derived at assembly time.
    pub fn with_weights(mut self, style: WeightVector, guide: WeightVector) -> SynthResult<Self> {
        if style.len() != self.style_channels() || guide.len() != self.guide_channels() {
            return Err(SynthError::validation(format!(
                "weight vectors cover {}+{} channels, job has {}+{}",
                style.len(),
                guide.len(),
                self.style_channels(),
                self.guide_channels()
            )));
        }
        self.style_weights = style;
        self.guide_weights = guide;
        Ok(self)
    }
}

fn shape(img: &CompactImage) -> String {
    format!("{}x{}x{}", img.width(), img.height(), img.channels())
}

#[cfg(test)]
#[path = "../../tests/unit/job/assemble.rs"]
mod tests;
