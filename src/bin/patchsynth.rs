use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PATCHSYNTH_LOG=patchsynth=debug`.
const LOG_ENV: &str = "PATCHSYNTH_LOG";

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut stdout = std::io::stdout().lock();
    ExitCode::from(patchsynth::cli::run(
        &args,
        &patchsynth::SystemCapabilities,
        &mut stdout,
    ))
}
