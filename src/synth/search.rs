use rayon::prelude::*;

use crate::{
    foundation::rng::Rng64,
    raster::channels::CompactImage,
    synth::{
        LevelImages,
        nnf::{CenterBounds, Nnf},
    },
};

/// Per-channel weights and the uniformity penalty that define the patch cost.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CostWeights<'a> {
    pub(crate) style: &'a [f32],
    pub(crate) guide: &'a [f32],
    pub(crate) uniformity: f32,
}

/// Everything a cost evaluation reads, frozen for one search.
pub(crate) struct SearchCtx<'a> {
    level: &'a LevelImages,
    estimate: &'a CompactImage,
    weights: CostWeights<'a>,
    radius: i32,
    bounds: CenterBounds,
    occurrence: Vec<u32>,
    occurrence_ideal: f32,
}

impl<'a> SearchCtx<'a> {
    pub(crate) fn new(
        level: &'a LevelImages,
        estimate: &'a CompactImage,
        weights: CostWeights<'a>,
        patch_size: u32,
        nnf: &Nnf,
    ) -> Self {
        let (sw, sh) = level.source_style.dimensions();
        let bounds = CenterBounds::new((sw, sh), patch_size);

        let mut occurrence = vec![0u32; sw as usize * sh as usize];
        for &[x, y] in nnf.as_slice() {
            occurrence[y as usize * sw as usize + x as usize] += 1;
        }
        let centers = ((bounds.x1 - bounds.x0 + 1) * (bounds.y1 - bounds.y0 + 1)).max(1) as f32;
        let occurrence_ideal = (nnf.as_slice().len() as f32 / centers).max(1.0);

        Self {
            level,
            estimate,
            weights,
            radius: (patch_size / 2) as i32,
            bounds,
            occurrence,
            occurrence_ideal,
        }
    }

    pub(crate) fn bounds(&self) -> CenterBounds {
        self.bounds
    }

    /// Weighted squared style and guide distance between the target patch at `(tx, ty)` and the
    /// source patch centered at `s`, plus the uniformity penalty of `s`. Samples clamp at borders.
    pub(crate) fn cost(&self, tx: i32, ty: i32, s: [i32; 2]) -> f32 {
        let level = self.level;
        let (tw, th) = self.estimate.dimensions();
        let (sw, sh) = level.source_style.dimensions();
        let sc = level.source_style.channels();
        let gc = level.source_guide.channels();

        let mut style = 0.0f32;
        let mut guide = 0.0f32;
        for dy in -self.radius..=self.radius {
            let ty = (ty + dy).clamp(0, th as i32 - 1) as usize;
            let sy = (s[1] + dy).clamp(0, sh as i32 - 1) as usize;
            for dx in -self.radius..=self.radius {
                let tx = (tx + dx).clamp(0, tw as i32 - 1) as usize;
                let sx = (s[0] + dx).clamp(0, sw as i32 - 1) as usize;
                let t = ty * tw as usize + tx;
                let si = sy * sw as usize + sx;

                let tp = &self.estimate.as_bytes()[t * sc..(t + 1) * sc];
                let sp = &level.source_style.as_bytes()[si * sc..(si + 1) * sc];
                for ((a, b), w) in tp.iter().zip(sp).zip(self.weights.style) {
                    let d = f32::from(*a) - f32::from(*b);
                    style += w * d * d;
                }

                let tg = &level.target_guide.as_bytes()[t * gc..(t + 1) * gc];
                let sg = &level.source_guide.as_bytes()[si * gc..(si + 1) * gc];
                let modulation = level
                    .modulation
                    .as_ref()
                    .map(|m| &m.as_bytes()[t * gc..(t + 1) * gc]);
                for (c, ((a, b), w)) in tg.iter().zip(sg).zip(self.weights.guide).enumerate() {
                    let d = f32::from(*a) - f32::from(*b);
                    let m = modulation.map_or(1.0, |m| f32::from(m[c]) / 255.0);
                    guide += w * m * d * d;
                }
            }
        }

        let occ = self.occurrence[s[1] as usize * sw as usize + s[0] as usize] as f32;
        style + guide + self.weights.uniformity * occ / self.occurrence_ideal
    }
}

/// Cost of every current match.
pub(crate) fn patch_errors(ctx: &SearchCtx<'_>, nnf: &Nnf) -> Vec<f32> {
    let w = nnf.width() as usize;
    let mut errors = vec![0.0f32; nnf.as_slice().len()];
    errors
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, e) in row.iter_mut().enumerate() {
                *e = ctx.cost(x as i32, y as i32, nnf.as_slice()[y * w + x]);
            }
        });
    errors
}

/// Run `iters` PatchMatch iterations over the active pixels.
///
/// Each iteration reads the previous field only, so rows update in parallel. Candidates come from
/// the four neighbors' matches shifted by one pixel, then from a random search whose radius halves
/// down to one pixel.
#[tracing::instrument(level = "trace", skip(ctx, nnf, active))]
pub(crate) fn patch_match(
    ctx: &SearchCtx<'_>,
    mut nnf: Nnf,
    active: &[bool],
    iters: u32,
    seed: u64,
) -> (Nnf, Vec<f32>) {
    let mut errors = patch_errors(ctx, &nnf);
    let (w, h) = (nnf.width(), nnf.height());
    let bounds = ctx.bounds();
    let max_radius = (bounds.x1 - bounds.x0).max(bounds.y1 - bounds.y0).max(1);

    for iter in 0..iters {
        let prev = nnf.as_slice();
        let prev_err = &errors;
        let mut next = vec![[0i32; 2]; prev.len()];
        let mut next_err = vec![0.0f32; prev.len()];

        next.par_chunks_mut(w as usize)
            .zip(next_err.par_chunks_mut(w as usize))
            .enumerate()
            .for_each(|(y, (row, row_err))| {
                let y = y as u32;
                for x in 0..w {
                    let i = (y * w + x) as usize;
                    let mut best = prev[i];
                    let mut best_err = prev_err[i];
                    if active[i] {
                        let (tx, ty) = (x as i32, y as i32);
                        let consider = |best: &mut [i32; 2], best_err: &mut f32, cand: [i32; 2]| {
                            let cand = bounds.clamp(cand);
                            if cand == *best {
                                return;
                            }
                            let e = ctx.cost(tx, ty, cand);
                            if e < *best_err {
                                *best = cand;
                                *best_err = e;
                            }
                        };

                        for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
                            let (nx, ny) = (tx + dx, ty + dy);
                            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                                continue;
                            }
                            let [mx, my] = prev[(ny as u32 * w + nx as u32) as usize];
                            consider(&mut best, &mut best_err, [mx - dx, my - dy]);
                        }

                        let mut rng = Rng64::for_pixel(seed, u64::from(iter) + 1, x, y);
                        let mut radius = max_radius;
                        while radius >= 1 {
                            let [bx, by] = best;
                            let cand = [
                                bx + rng.range_i32(-radius, radius),
                                by + rng.range_i32(-radius, radius),
                            ];
                            consider(&mut best, &mut best_err, cand);
                            radius /= 2;
                        }
                    }
                    row[x as usize] = best;
                    row_err[x as usize] = best_err;
                }
            });

        nnf = Nnf::from_field(w, h, next);
        errors = next_err;
    }

    (nnf, errors)
}

#[cfg(test)]
#[path = "../../tests/unit/synth/search.rs"]
mod tests;
