use rayon::prelude::*;

use crate::{
    foundation::error::SynthResult, job::VoteMode, raster::channels::CompactImage, synth::nnf::Nnf,
};

/// Inputs of one voting step.
pub(crate) struct VoteInput<'a> {
    pub(crate) source_style: &'a CompactImage,
    pub(crate) nnf: &'a Nnf,
    /// Per-target-pixel match cost; required by [`VoteMode::Weighted`].
    pub(crate) errors: Option<&'a [f32]>,
    pub(crate) patch_size: u32,
    pub(crate) mode: VoteMode,
}

impl VoteInput<'_> {
    /// Contribution weight of the patch centered at target pixel `i`.
    pub(crate) fn patch_weight(&self, i: usize) -> f32 {
        match (self.mode, self.errors) {
            (VoteMode::Weighted, Some(errors)) => 1.0 / (1.0 + errors[i]),
            _ => 1.0,
        }
    }
}

/// Reconstructs target style from a nearest-neighbor field.
///
/// Every target pixel averages the source pixels that the overlapping matched patches place on it.
pub(crate) trait Voter {
    fn vote(&mut self, input: &VoteInput<'_>) -> SynthResult<CompactImage>;
}

/// Host implementation, parallel over target rows.
#[derive(Debug, Default)]
pub(crate) struct CpuVoter;

impl Voter for CpuVoter {
    fn vote(&mut self, input: &VoteInput<'_>) -> SynthResult<CompactImage> {
        Ok(vote_cpu(input))
    }
}

pub(crate) fn vote_cpu(input: &VoteInput<'_>) -> CompactImage {
    let (tw, th) = (input.nnf.width(), input.nnf.height());
    let (sw, sh) = input.source_style.dimensions();
    let c = input.source_style.channels();
    let src = input.source_style.as_bytes();
    let field = input.nnf.as_slice();
    let r = (input.patch_size / 2) as i32;

    let mut out = vec![0u8; tw as usize * th as usize * c];
    out.par_chunks_mut(tw as usize * c)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            let mut acc = vec![0.0f32; c];
            for x in 0..tw as i32 {
                acc.fill(0.0);
                let mut wsum = 0.0f32;
                for oy in -r..=r {
                    let py = y - oy;
                    if py < 0 || py >= th as i32 {
                        continue;
                    }
                    for ox in -r..=r {
                        let px = x - ox;
                        if px < 0 || px >= tw as i32 {
                            continue;
                        }
                        let pi = py as usize * tw as usize + px as usize;
                        let [mx, my] = field[pi];
                        let sx = (mx + ox).clamp(0, sw as i32 - 1) as usize;
                        let sy = (my + oy).clamp(0, sh as i32 - 1) as usize;
                        let si = (sy * sw as usize + sx) * c;
                        let w = input.patch_weight(pi);
                        for (a, v) in acc.iter_mut().zip(&src[si..si + c]) {
                            *a += w * f32::from(*v);
                        }
                        wsum += w;
                    }
                }
                let o = x as usize * c;
                for (dst, a) in row[o..o + c].iter_mut().zip(&acc) {
                    *dst = if wsum > 0.0 {
                        (a / wsum).round().clamp(0.0, 255.0) as u8
                    } else {
                        0
                    };
                }
            }
        });

    CompactImage::from_parts(tw, th, c, out)
}

#[cfg(test)]
#[path = "../../tests/unit/synth/vote.rs"]
mod tests;
