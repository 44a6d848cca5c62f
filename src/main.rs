//! Entry point. All real logic lives in the library crate so that
//! `tests/launcher.rs` can spawn this binary while unit tests exercise
//! the same modules in-process.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hdist_launcher::process::Process;

fn main() -> anyhow::Result<()> {
    init_tracing().context("failed to initialize tracing")?;

    let process = Process::os();
    let err = hdist_launcher::run(&process);
    eprintln!("{err}");
    std::process::exit(err.exit_code());
}

/// Ambient, `RUST_LOG`-gated diagnostic tracing for developers
/// debugging the launcher itself. Silent by default and entirely
/// independent of the `HDIST_LAUNCHER_DEBUG` wire protocol emitted by
/// [`hdist_launcher::debug_log`].
fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(std::io::stderr)
        .try_init()
}
