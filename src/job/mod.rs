//! Immutable synthesis jobs, their output buffers and the dispatch path to a backend.

pub(crate) mod assemble;
pub(crate) mod dispatch;
pub(crate) mod weights;

use crate::{
    foundation::error::{SynthError, SynthResult},
    job::weights::WeightVector,
    pyramid::schedule::PyramidSchedule,
    raster::channels::CompactImage,
    synth::nnf::Nnf,
};

/// How overlapping patches are combined when reconstructing the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoteMode {
    /// Every overlapping patch contributes equally.
    #[default]
    Plain,
    /// Patches contribute in inverse proportion to their match cost.
    Weighted,
}

/// A fully validated synthesis request.
///
/// Built by [`assemble`](crate::assemble) and consumed by exactly one backend call. Source style
/// and source guide share dimensions; target guide and optional modulation share the target
/// dimensions.
#[derive(Clone, Debug)]
pub struct SynthesisJob {
    pub(crate) source_style: CompactImage,
    pub(crate) source_guide: CompactImage,
    pub(crate) target_guide: CompactImage,
    pub(crate) target_modulation: Option<CompactImage>,
    pub(crate) style_weights: WeightVector,
    pub(crate) guide_weights: WeightVector,
    pub(crate) uniformity: f32,
    pub(crate) patch_size: u32,
    pub(crate) vote_mode: VoteMode,
    pub(crate) schedule: PyramidSchedule,
    pub(crate) extra_pass_3x3: bool,
    pub(crate) want_nnf: bool,
}

impl SynthesisJob {
    pub fn style_channels(&self) -> usize {
        self.source_style.channels()
    }

    pub fn guide_channels(&self) -> usize {
        self.source_guide.channels()
    }

    pub fn source_size(&self) -> (u32, u32) {
        self.source_style.dimensions()
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.target_guide.dimensions()
    }

    pub fn source_style(&self) -> &CompactImage {
        &self.source_style
    }

    pub fn source_guide(&self) -> &CompactImage {
        &self.source_guide
    }

    pub fn target_guide(&self) -> &CompactImage {
        &self.target_guide
    }

    /// Optional per-pixel scaling of the guide term, one byte per guide channel.
    pub fn target_modulation(&self) -> Option<&CompactImage> {
        self.target_modulation.as_ref()
    }

    pub fn style_weights(&self) -> &WeightVector {
        &self.style_weights
    }

    pub fn guide_weights(&self) -> &WeightVector {
        &self.guide_weights
    }

    pub fn uniformity(&self) -> f32 {
        self.uniformity
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    pub fn vote_mode(&self) -> VoteMode {
        self.vote_mode
    }

    pub fn schedule(&self) -> &PyramidSchedule {
        &self.schedule
    }

    /// Number of coarse-to-fine levels; zero means a single full-resolution pass.
    pub fn num_pyramid_levels(&self) -> usize {
        self.schedule.len()
    }

    pub fn extra_pass_3x3(&self) -> bool {
        self.extra_pass_3x3
    }

    /// Whether the backend should also report the final nearest-neighbor field.
    pub fn wants_nnf(&self) -> bool {
        self.want_nnf
    }
}

/// Buffers a backend populates: the synthesized image and, on request, the final field.
#[derive(Clone, Debug)]
pub struct SynthOutput {
    image: CompactImage,
    nnf: Option<Nnf>,
}

impl SynthOutput {
    /// Zeroed buffers sized to the job's target and style channel count.
    pub(crate) fn for_job(job: &SynthesisJob) -> Self {
        let (w, h) = job.target_size();
        let len = w as usize * h as usize;
        Self {
            image: CompactImage::from_parts(
                w,
                h,
                job.style_channels(),
                vec![0; len * job.style_channels()],
            ),
            nnf: job
                .wants_nnf()
                .then(|| Nnf::from_field(w, h, vec![[0, 0]; len])),
        }
    }

    pub fn image(&self) -> &CompactImage {
        &self.image
    }

    pub fn into_image(self) -> CompactImage {
        self.image
    }

    pub fn nnf(&self) -> Option<&Nnf> {
        self.nnf.as_ref()
    }

    pub fn into_parts(self) -> (CompactImage, Option<Nnf>) {
        (self.image, self.nnf)
    }

    /// Replace the image buffer. The new image must keep the allocated shape.
    pub fn write_image(&mut self, image: CompactImage) -> SynthResult<()> {
        let expected = (self.image.dimensions(), self.image.channels());
        let got = (image.dimensions(), image.channels());
        if expected != got {
            return Err(SynthError::backend(format!(
                "backend produced a {}x{}x{} image, expected {}x{}x{}",
                got.0.0, got.0.1, got.1, expected.0.0, expected.0.1, expected.1
            )));
        }
        self.image = image;
        Ok(())
    }

    /// Store the final field when one was requested; otherwise a no-op.
    pub fn write_nnf(&mut self, nnf: Nnf) -> SynthResult<()> {
        let Some(slot) = self.nnf.as_mut() else {
            return Ok(());
        };
        if (nnf.width(), nnf.height()) != (slot.width(), slot.height()) {
            return Err(SynthError::backend(format!(
                "backend produced a {}x{} field, expected {}x{}",
                nnf.width(),
                nnf.height(),
                slot.width(),
                slot.height()
            )));
        }
        *slot = nnf;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/output.rs"]
mod tests;
