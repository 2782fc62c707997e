/// Convenience result type used across patchsynth.
pub type SynthResult<T> = Result<T, SynthError>;

/// Top-level error taxonomy used by job assembly, dispatch and the CLI.
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// Malformed, missing or unrecognized command line input.
    #[error("parse error: {0}")]
    Parse(String),

    /// Inputs that decoded fine but violate a job invariant (shapes, channel ceilings, ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// No executable backend, or a backend that failed while running a job.
    #[error("backend error: {0}")]
    Backend(String),

    /// Image decode/encode failures.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SynthError {
    /// Build a [`SynthError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`SynthError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SynthError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`SynthError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Message without the category prefix, as printed by the CLI.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Parse(m) | Self::Validation(m) | Self::Backend(m) | Self::Io(m) => m.clone(),
            Self::Other(e) => format!("{e:#}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
