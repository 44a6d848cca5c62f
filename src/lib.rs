//! `hdist-launcher`: a tiny proxy binary symlinked into installer
//! profiles under the name of the real program it stands in for. See
//! `SPEC_FULL.md` for the full requirements this crate implements.
//!
//! [`run`] drives the four stages described there: self-location
//! (`self_location`), symlink chain resolution (`chain`), sidecar
//! discovery and shebang parsing (`sidecar`, `shebang`), and process
//! replacement (`dispatch`). It never returns a success value on the
//! happy path — a successful run replaces this process's image before
//! `run` would otherwise return.

pub mod chain;
pub mod debug_log;
pub mod dispatch;
pub mod errors;
pub mod process;
pub mod self_location;
pub mod shebang;
pub mod sidecar;

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::debug_log::DebugLog;
use crate::errors::LauncherError;
use crate::process::Process;
use crate::sidecar::Sidecar;

/// Run the launcher end to end. Returns the [`LauncherError`] that
/// explains why the process didn't get replaced — including
/// [`LauncherError::Usage`], which is not really a failure (spec.md
/// P5) but still carries an exit code, so `main` has exactly one
/// place to decide what to print and how to exit.
pub fn run(process: &Process) -> LauncherError {
    let mut debug_log = DebugLog::new(process);

    let invoked_path = match self_location::locate(process) {
        Ok(path) => path,
        Err(e) => return e,
    };
    debug!(invoked_path = %invoked_path.display(), "self-location resolved");

    if self_location::is_direct_execution(&invoked_path) {
        return LauncherError::Usage;
    }

    let resolution = match chain::resolve(&invoked_path, &mut debug_log) {
        Ok(r) => r,
        Err(e) => return e,
    };
    debug!(hops = resolution.hops.len(), "symlink chain resolved");

    // spec.md §4.3: "last = chain.last_non_launcher_hop" — the hop
    // whose symlink the user actually addressed, immediately before
    // the launcher binary itself.
    let Some(last_hop) = resolution.hops.last() else {
        return LauncherError::ChainTooLong;
    };
    let (base, name) = sidecar::base_and_name(&last_hop.from);

    let sidecar = match sidecar::discover(&base, &name) {
        Ok(s) => s,
        Err(e) => return e,
    };

    let trailing_args: Vec<OsString> = process.args_os().skip(1).collect();

    match sidecar {
        Sidecar::Link { path } => dispatch_link(&base, &path, &last_hop.from, &trailing_args),
        Sidecar::Script { first_line } => dispatch_script(
            &base,
            &name,
            &first_line,
            resolution.profile_bin_dir.as_deref(),
            &mut debug_log,
            &trailing_args,
        ),
    }
}

fn dispatch_link(
    base: &Path,
    sidecar_contents: &str,
    argv0: &Path,
    trailing_args: &[OsString],
) -> LauncherError {
    let cmd_path = if Path::new(sidecar_contents).is_absolute() {
        sidecar_contents.to_string()
    } else {
        base.join(sidecar_contents).display().to_string()
    };
    dispatch::dispatch_link(&cmd_path, argv0, trailing_args)
}

#[allow(clippy::too_many_arguments)]
fn dispatch_script(
    base: &Path,
    name: &str,
    first_line: &str,
    profile_bin_dir: Option<&Path>,
    debug_log: &mut DebugLog,
    trailing_args: &[OsString],
) -> LauncherError {
    let script_path = base.join(format!("{name}.real"));

    let fields = match shebang::tokenize(first_line) {
        Ok(f) => f,
        Err(shebang::NotAShebang) => return LauncherError::BadShebang(script_path),
    };

    let origin = base.display().to_string();
    let profile_bin_dir_value = profile_bin_dir
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| shebang::PROFILE_BIN_DIR_NA.to_string());

    let expanded_cmd = shebang::expand(&fields.cmd, &origin, &profile_bin_dir_value);
    let expanded_arg = shebang::expand(&fields.arg, &origin, &profile_bin_dir_value);

    let interpreter = match shebang::resolve_interpreter(&expanded_cmd) {
        Ok(i) => i,
        Err(e) => return e,
    };

    debug_log.line("shebang_cmd", &interpreter);
    debug_log.line("shebang_arg", &expanded_arg);

    dispatch::dispatch_script(
        &interpreter,
        &expanded_arg,
        &script_path.display().to_string(),
        trailing_args,
    )
}
