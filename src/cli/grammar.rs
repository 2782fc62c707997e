use std::{path::PathBuf, str::FromStr};

use clap::ValueEnum;

use crate::{
    backend::{
        BackendKind,
        caps::{CapabilityProvider, backend_available},
    },
    config::SynthConfig,
    foundation::error::{SynthError, SynthResult},
    job::assemble::validate_patch_size,
};

/// Backends that can be named on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    Cpu,
    #[value(alias = "cuda")]
    Gpu,
}

impl From<BackendChoice> for BackendKind {
    fn from(value: BackendChoice) -> Self {
        match value {
            BackendChoice::Cpu => Self::Cpu,
            BackendChoice::Gpu => Self::Gpu,
        }
    }
}

/// One recognized, already validated option.
#[derive(Clone, Debug, PartialEq)]
pub enum CliOption {
    Source(PathBuf),
    Mask(PathBuf),
    Output(PathBuf),
    GuideWeight(f32),
    Uniformity(f32),
    PatchSize(u32),
    PyramidLevels(usize),
    SearchVoteIters(u32),
    PatchMatchIters(u32),
    StopThreshold(u32),
    ExtraPass3x3,
    Backend(BackendKind),
}

impl CliOption {
    pub fn apply(self, cfg: &mut SynthConfig) {
        match self {
            Self::Source(p) => cfg.source = p,
            Self::Mask(p) => cfg.mask = p,
            Self::Output(p) => cfg.output = Some(p),
            Self::GuideWeight(w) => cfg.guide_weight = w,
            Self::Uniformity(u) => cfg.uniformity = u,
            Self::PatchSize(p) => cfg.patch_size = p,
            Self::PyramidLevels(n) => cfg.pyramid_levels = Some(n),
            Self::SearchVoteIters(n) => cfg.search_vote_iters = n,
            Self::PatchMatchIters(n) => cfg.patch_match_iters = n,
            Self::StopThreshold(n) => cfg.stop_threshold = n,
            Self::ExtraPass3x3 => cfg.extra_pass_3x3 = true,
            Self::Backend(b) => cfg.backend = b,
        }
    }
}

/// Consume the option starting at `tokens[pos]`.
///
/// Returns the option and the position of the next unconsumed token. Values are validated here,
/// so the first offending token aborts parsing.
pub fn parse_option(
    tokens: &[String],
    pos: usize,
    caps: &dyn CapabilityProvider,
) -> SynthResult<(CliOption, usize)> {
    let flag = tokens
        .get(pos)
        .ok_or_else(|| SynthError::parse(format!("no option at position {pos}")))?
        .as_str();

    let option = match flag {
        "-albedo" => CliOption::Source(PathBuf::from(value(tokens, pos, flag)?)),
        "-mask" => CliOption::Mask(PathBuf::from(value(tokens, pos, flag)?)),
        "-output" => CliOption::Output(PathBuf::from(value(tokens, pos, flag)?)),
        "-weight" => CliOption::GuideWeight(number::<f32>(tokens, pos, flag)?),
        "-uniformity" => CliOption::Uniformity(number::<f32>(tokens, pos, flag)?),
        "-patchsize" => {
            let size = number::<i32>(tokens, pos, flag)?;
            let size = u32::try_from(size)
                .map_err(|_| SynthError::validation("patchsize is too small!"))?;
            validate_patch_size(size)?;
            CliOption::PatchSize(size)
        }
        "-pyramidlevels" => {
            let n = number::<i32>(tokens, pos, flag)?;
            if n < 1 {
                return Err(bad_argument(flag));
            }
            CliOption::PyramidLevels(n as usize)
        }
        "-searchvoteiters" => CliOption::SearchVoteIters(count(tokens, pos, flag)?),
        "-patchmatchiters" => CliOption::PatchMatchIters(count(tokens, pos, flag)?),
        "-stopthreshold" => CliOption::StopThreshold(count(tokens, pos, flag)?),
        "-backend" => {
            let name = value(tokens, pos, flag)?;
            let kind: BackendKind = <BackendChoice as ValueEnum>::from_str(name, false)
                .map_err(|_| SynthError::parse(format!("unrecognized backend '{name}'")))?
                .into();
            if !backend_available(kind, caps) {
                return Err(SynthError::backend(format!(
                    "the {kind} backend is not available!"
                )));
            }
            CliOption::Backend(kind)
        }
        "-extrapass3x3" => return Ok((CliOption::ExtraPass3x3, pos + 1)),
        other => return Err(SynthError::parse(format!("unrecognized option '{other}'"))),
    };
    Ok((option, pos + 2))
}

/// Fold every token into a [`SynthConfig`], starting from the defaults.
pub fn parse_args(tokens: &[String], caps: &dyn CapabilityProvider) -> SynthResult<SynthConfig> {
    let mut cfg = SynthConfig::default();
    let mut pos = 0;
    while pos < tokens.len() {
        let (option, next) = parse_option(tokens, pos, caps)?;
        tracing::trace!(?option, "parsed option");
        option.apply(&mut cfg);
        pos = next;
    }
    Ok(cfg)
}

fn value<'a>(tokens: &'a [String], pos: usize, flag: &str) -> SynthResult<&'a str> {
    tokens
        .get(pos + 1)
        .map(String::as_str)
        .ok_or_else(|| SynthError::parse(format!("missing argument for the {flag} option")))
}

/// The whole token must parse; no trailing characters.
fn number<T: FromStr>(tokens: &[String], pos: usize, flag: &str) -> SynthResult<T> {
    let raw = value(tokens, pos, flag)?;
    raw.parse::<T>()
        .map_err(|_| SynthError::parse(format!("bad {flag} argument '{raw}'")))
}

/// A non-negative integer.
fn count(tokens: &[String], pos: usize, flag: &str) -> SynthResult<u32> {
    let n = number::<i32>(tokens, pos, flag)?;
    u32::try_from(n).map_err(|_| bad_argument(flag))
}

fn bad_argument(flag: &str) -> SynthError {
    SynthError::validation(format!("bad argument for {flag}!"))
}

#[cfg(test)]
#[path = "../../tests/unit/cli/grammar.rs"]
mod tests;
