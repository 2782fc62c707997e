/// Highest downscale exponent probed when looking for the feasible level count.
pub const MAX_LEVEL_PROBE: u32 = 32;

/// Size of the base image scaled by `2^-level`, truncated per dimension.
pub fn pyramid_level_size(base: (u32, u32), level: u32) -> (u32, u32) {
    let scale = 2.0f32.powi(-(level as i32));
    ((base.0 as f32 * scale) as u32, (base.1 as f32 * scale) as u32)
}

/// Number of pyramid levels whose smaller side still fits a `2 * patch_size + 1` window.
///
/// Scans exponents from [`MAX_LEVEL_PROBE`] down to zero and returns `level + 1` for the first
/// (largest) feasible one, or zero when even the base image is too small.
pub fn max_pyramid_levels(base: (u32, u32), patch_size: u32) -> usize {
    let min_side = patch_size.saturating_mul(2).saturating_add(1);
    (0..=MAX_LEVEL_PROBE)
        .rev()
        .find(|&level| {
            let (w, h) = pyramid_level_size(base, level);
            w.min(h) >= min_side
        })
        .map_or(0, |level| level as usize + 1)
}

/// Clamp an explicit level request to the feasible maximum; `None` selects the maximum.
pub fn resolve_level_count(requested: Option<usize>, max_levels: usize) -> usize {
    match requested {
        None => max_levels,
        Some(n) => n.min(max_levels),
    }
}

/// Iteration controls applied to one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelParams {
    /// Rounds of search followed by a vote.
    pub search_vote_iters: u32,
    /// PatchMatch iterations inside each search.
    pub patch_match_iters: u32,
    /// Pixels changing by at most this much after a vote stop being searched.
    pub stop_threshold: u32,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            search_vote_iters: 6,
            patch_match_iters: 4,
            stop_threshold: 5,
        }
    }
}

/// One executable resolution step of a schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelPass {
    /// Downscale exponent relative to the base image (`0` is full resolution).
    pub exponent: u32,
    /// Controls for this pass.
    pub params: LevelParams,
}

/// Per-level controls, index `0` = coarsest, last = full resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PyramidSchedule {
    flat: LevelParams,
    levels: Vec<LevelParams>,
}

impl PyramidSchedule {
    /// Broadcast `flat` to `count` levels.
    pub fn uniform(count: usize, flat: LevelParams) -> Self {
        Self {
            flat,
            levels: vec![flat; count],
        }
    }

    /// Derive the level count for `base` and `patch_size`, then broadcast `flat`.
    ///
    /// Requests above the feasible maximum are reduced without error.
    pub fn derive(
        base: (u32, u32),
        patch_size: u32,
        requested: Option<usize>,
        flat: LevelParams,
    ) -> Self {
        let max_levels = max_pyramid_levels(base, patch_size);
        let count = resolve_level_count(requested, max_levels);
        if let Some(req) = requested.filter(|&r| r > max_levels) {
            tracing::debug!(
                requested = req,
                max_levels,
                "pyramid level request clamped to feasible maximum"
            );
        }
        tracing::debug!(
            width = base.0,
            height = base.1,
            patch_size,
            max_levels,
            count,
            "derived pyramid schedule"
        );
        Self::uniform(count, flat)
    }

    /// Number of pyramid levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no coarse-to-fine levels were scheduled.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Per-level controls, coarsest first.
    pub fn levels(&self) -> &[LevelParams] {
        &self.levels
    }

    /// Per-level search/vote iteration counts.
    pub fn search_vote_iters(&self) -> Vec<u32> {
        self.levels.iter().map(|l| l.search_vote_iters).collect()
    }

    /// Per-level PatchMatch iteration counts.
    pub fn patch_match_iters(&self) -> Vec<u32> {
        self.levels.iter().map(|l| l.patch_match_iters).collect()
    }

    /// Per-level stop thresholds.
    pub fn stop_thresholds(&self) -> Vec<u32> {
        self.levels.iter().map(|l| l.stop_threshold).collect()
    }

    /// Resolution steps to execute, coarsest first.
    ///
    /// An empty schedule still yields the full-resolution pass with the flat controls.
    pub fn passes(&self) -> Vec<LevelPass> {
        if self.levels.is_empty() {
            return vec![LevelPass {
                exponent: 0,
                params: self.flat,
            }];
        }
        let last = self.levels.len() - 1;
        self.levels
            .iter()
            .enumerate()
            .map(|(i, &params)| LevelPass {
                exponent: (last - i) as u32,
                params,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pyramid/schedule.rs"]
mod tests;
