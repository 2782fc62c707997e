//! Command line front end: single-dash flags, diagnostics on stdout, exit status 0 or 1.

pub(crate) mod grammar;

use std::{fmt, io::Write};

use anyhow::Context as _;

use crate::{
    backend::{
        BackendOpts, ResolvedBackend,
        caps::{CapabilityProvider, resolve_backend},
    },
    config::{ChannelLimits, SynthConfig},
    foundation::error::{SynthError, SynthResult},
    inpaint::load_inpaint_job,
    job::{SynthesisJob, dispatch::dispatch},
    raster::io::save_png,
};

pub const USAGE: &str = "\
usage: patchsynth [options]

options:
  -albedo <albedo.png>
  -mask <mask.png>
  -output <output.png>
  -weight <value>
  -uniformity <value>
  -patchsize <size>
  -pyramidlevels <number>
  -searchvoteiters <number>
  -patchmatchiters <number>
  -stopthreshold <value>
  -extrapass3x3
  -backend [cpu|gpu]
";

/// Effective parameters echoed before a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub uniformity: f32,
    pub patch_size: u32,
    pub pyramid_levels: usize,
    pub search_vote_iters: u32,
    pub patch_match_iters: u32,
    pub stop_threshold: u32,
    pub extra_pass_3x3: bool,
    pub backend: ResolvedBackend,
}

impl RunSummary {
    pub fn new(cfg: &SynthConfig, job: &SynthesisJob, backend: ResolvedBackend) -> Self {
        Self {
            uniformity: job.uniformity(),
            patch_size: job.patch_size(),
            pyramid_levels: job.num_pyramid_levels(),
            search_vote_iters: cfg.search_vote_iters,
            patch_match_iters: cfg.patch_match_iters,
            stop_threshold: cfg.stop_threshold,
            extra_pass_3x3: job.extra_pass_3x3(),
            backend,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "uniformity: {:.0}", self.uniformity)?;
        writeln!(f, "patchsize: {}", self.patch_size)?;
        writeln!(f, "pyramidlevels: {}", self.pyramid_levels)?;
        writeln!(f, "searchvoteiters: {}", self.search_vote_iters)?;
        writeln!(f, "patchmatchiters: {}", self.patch_match_iters)?;
        writeln!(f, "stopthreshold: {}", self.stop_threshold)?;
        writeln!(
            f,
            "extrapass3x3: {}",
            if self.extra_pass_3x3 { "yes" } else { "no" }
        )?;
        writeln!(f, "backend: {}", self.backend)
    }
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Run the command line with `args` (program name excluded), writing all user-facing text to
/// `out`. Returns the process exit status.
pub fn run(args: &[String], caps: &dyn CapabilityProvider, out: &mut dyn Write) -> u8 {
    if args.is_empty() {
        let _ = writeln!(out, "{USAGE}");
        return EXIT_FAILURE;
    }
    match execute(args, caps, out) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "run failed");
            let _ = writeln!(out, "error: {}", e.diagnostic());
            EXIT_FAILURE
        }
    }
}

fn execute(
    args: &[String],
    caps: &dyn CapabilityProvider,
    out: &mut dyn Write,
) -> SynthResult<()> {
    let cfg = grammar::parse_args(args, caps)?;
    let resolved = resolve_backend(cfg.backend, caps).ok_or_else(|| {
        SynthError::backend(format!("the {} backend is not available!", cfg.backend))
    })?;
    let output_path = cfg.output_path();

    let job = load_inpaint_job(&cfg, &ChannelLimits::default())?;
    write!(out, "{}", RunSummary::new(&cfg, &job, resolved)).context("write run summary")?;

    let output = dispatch(job, resolved.into(), caps, &BackendOpts::from_env())?;
    save_png(&output_path, output.image())?;

    writeln!(out, "result was written to {}", output_path.display())
        .context("write completion message")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/cli/run.rs"]
mod tests;
