//! Stage 4: replace this process's image with the resolved target
//! (spec.md §4.5). Both dispatch paths return a [`LauncherError`]
//! rather than `Result<(), _>`: `exec` only ever returns to the caller
//! when it failed, so the type says exactly that — there is no
//! success value to represent.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::LauncherError;

/// `.link` dispatch: exec `cmd_path` with the caller's trailing
/// arguments, but with `argv[0]` overridden to `argv0` — the path the
/// user actually addressed the `.link` symlink through (spec.md §4.5).
pub fn dispatch_link(cmd_path: &str, argv0: &Path, trailing_args: &[OsString]) -> LauncherError {
    exec_with_argv0(cmd_path, argv0.as_os_str(), trailing_args)
}

/// `.real` dispatch: exec the resolved interpreter with
/// `[arg_if_nonempty, script_path, trailing_args...]`. `argv[0]` is
/// left as the interpreter's own name; the script observes its own
/// path as the interpreter's first real argument, per spec.md §4.5's
/// note that `sys.argv[0] == script_real_path` from the *script's*
/// point of view, not the interpreter process's argv[0].
pub fn dispatch_script(
    interpreter: &str,
    arg: &str,
    script_path: &str,
    trailing_args: &[OsString],
) -> LauncherError {
    let mut args: Vec<OsString> = Vec::with_capacity(trailing_args.len() + 2);
    if !arg.is_empty() {
        args.push(OsString::from(arg));
    }
    args.push(OsString::from(script_path));
    args.extend(trailing_args.iter().cloned());
    exec(interpreter, &args)
}

#[cfg(unix)]
fn exec(program: &str, args: &[OsString]) -> LauncherError {
    use std::os::unix::process::CommandExt;

    let err = Command::new(program).args(args).exec();
    LauncherError::ExecFailed(PathBuf::from(program), err)
}

#[cfg(unix)]
fn exec_with_argv0(program: &str, argv0: &OsStr, args: &[OsString]) -> LauncherError {
    use std::os::unix::process::CommandExt;

    let err = Command::new(program).arg0(argv0).args(args).exec();
    LauncherError::ExecFailed(PathBuf::from(program), err)
}

#[cfg(not(unix))]
fn exec(program: &str, _args: &[OsString]) -> LauncherError {
    LauncherError::UnsupportedPlatform(program.to_string())
}

#[cfg(not(unix))]
fn exec_with_argv0(program: &str, _argv0: &OsStr, _args: &[OsString]) -> LauncherError {
    LauncherError::UnsupportedPlatform(program.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_link_reports_exec_failure_for_missing_binary() {
        let err = dispatch_link(
            "/definitely/does/not/exist/program",
            Path::new("/profile/bin/program"),
            &[],
        );
        assert!(matches!(err, LauncherError::ExecFailed(_, _)));
    }

    #[test]
    fn dispatch_script_reports_exec_failure_for_missing_interpreter() {
        let err = dispatch_script(
            "/definitely/does/not/exist/python3",
            "",
            "/profile/bin/script.real",
            &[],
        );
        assert!(matches!(err, LauncherError::ExecFailed(_, _)));
    }
}
