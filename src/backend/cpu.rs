use crate::{
    backend::{BackendOpts, SynthBackend, build_thread_pool},
    foundation::error::SynthResult,
    job::{SynthOutput, SynthesisJob},
    synth::{run_pyramid, vote::CpuVoter},
};

/// Host backend: search and vote both run on a dedicated rayon pool.
pub struct CpuBackend {
    opts: BackendOpts,
    pool: rayon::ThreadPool,
}

impl CpuBackend {
    pub fn new(opts: BackendOpts) -> SynthResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        Ok(Self { opts, pool })
    }
}

impl SynthBackend for CpuBackend {
    #[tracing::instrument(
        level = "debug",
        name = "cpu_backend_run",
        skip_all,
        fields(threads = self.pool.current_num_threads(), levels = job.num_pyramid_levels())
    )]
    fn run(&self, job: &SynthesisJob, output: &mut SynthOutput) -> SynthResult<()> {
        self.pool
            .install(|| run_pyramid(job, &mut CpuVoter, self.opts.seed, output))
    }
}
