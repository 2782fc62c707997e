use crate::{
    backend::{
        BackendKind, BackendOpts, SynthBackend,
        caps::{CapabilityProvider, resolve_backend},
        create_backend,
    },
    foundation::error::{SynthError, SynthResult},
    job::{SynthOutput, SynthesisJob},
};

/// Allocate the output buffers and hand the job to `backend`, exactly once.
#[tracing::instrument(level = "debug", skip_all, fields(target = ?job.target_size()))]
pub fn run_job(job: SynthesisJob, backend: &dyn SynthBackend) -> SynthResult<SynthOutput> {
    let mut output = SynthOutput::for_job(&job);
    backend.run(&job, &mut output)?;
    Ok(output)
}

/// Resolve `kind` against `caps`, build that backend and run the job on it.
///
/// A request that resolves to no backend fails before anything is allocated or executed.
#[tracing::instrument(level = "debug", skip(job, caps, opts))]
pub fn dispatch(
    job: SynthesisJob,
    kind: BackendKind,
    caps: &dyn CapabilityProvider,
    opts: &BackendOpts,
) -> SynthResult<SynthOutput> {
    let resolved = resolve_backend(kind, caps)
        .ok_or_else(|| SynthError::backend(format!("the {kind} backend is not available!")))?;
    tracing::debug!(%resolved, "backend resolved");
    let backend = create_backend(resolved, opts)?;
    run_job(job, backend.as_ref())
}

#[cfg(test)]
#[path = "../../tests/unit/job/dispatch.rs"]
mod tests;
