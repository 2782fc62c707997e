use std::path::{Path, PathBuf};

use crate::{
    backend::BackendKind,
    job::{VoteMode, assemble::JobParams},
    pyramid::schedule::LevelParams,
};

/// Most style channels a job may carry.
pub const MAX_STYLE_CHANNELS: usize = 8;
/// Most guide channels a job may carry.
pub const MAX_GUIDE_CHANNELS: usize = 24;

pub const DEFAULT_SOURCE: &str = "albedo.png";
pub const DEFAULT_MASK: &str = "bmask0.png";
pub const OUTPUT_SUFFIX: &str = "_inpainted.png";

/// Per-role channel ceilings enforced at assembly time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLimits {
    pub max_style: usize,
    pub max_guide: usize,
}

impl Default for ChannelLimits {
    fn default() -> Self {
        Self {
            max_style: MAX_STYLE_CHANNELS,
            max_guide: MAX_GUIDE_CHANNELS,
        }
    }
}

/// Everything the command line can set, with its defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthConfig {
    pub source: PathBuf,
    pub mask: PathBuf,
    /// Explicit output path; see [`SynthConfig::output_path`].
    pub output: Option<PathBuf>,
    pub style_weight: f32,
    pub guide_weight: f32,
    pub uniformity: f32,
    pub patch_size: u32,
    pub pyramid_levels: Option<usize>,
    pub search_vote_iters: u32,
    pub patch_match_iters: u32,
    pub stop_threshold: u32,
    pub extra_pass_3x3: bool,
    pub backend: BackendKind,
}

impl Default for SynthConfig {
    fn default() -> Self {
        let level = LevelParams::default();
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            mask: PathBuf::from(DEFAULT_MASK),
            output: None,
            style_weight: 1.0,
            guide_weight: 1.0,
            uniformity: 3500.0,
            patch_size: 5,
            pyramid_levels: None,
            search_vote_iters: level.search_vote_iters,
            patch_match_iters: level.patch_match_iters,
            stop_threshold: level.stop_threshold,
            extra_pass_3x3: false,
            backend: BackendKind::Auto,
        }
    }
}

impl SynthConfig {
    /// The explicit output, or the source path with its extension replaced by `_inpainted.png`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.source))
    }

    pub fn level_params(&self) -> LevelParams {
        LevelParams {
            search_vote_iters: self.search_vote_iters,
            patch_match_iters: self.patch_match_iters,
            stop_threshold: self.stop_threshold,
        }
    }

    pub fn job_params(&self) -> JobParams {
        JobParams {
            style_weight: self.style_weight,
            guide_weight: self.guide_weight,
            uniformity: self.uniformity,
            patch_size: self.patch_size,
            pyramid_levels: self.pyramid_levels,
            level: self.level_params(),
            vote_mode: VoteMode::Plain,
            extra_pass_3x3: self.extra_pass_3x3,
            want_nnf: false,
        }
    }
}

pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}
