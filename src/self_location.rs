//! Stage 1: figure out the path the caller actually invoked us by
//! (spec.md §4.1). This never canonicalises anything — the whole
//! point of the launcher is to preserve the caller's view of where the
//! program "lives", so the rest of resolution can walk the lexical
//! symlink chain from exactly that path.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::errors::LauncherError;
use crate::process::Process;

/// `argv[0]` had a path separator in it: use it verbatim, relative or
/// absolute, never realpath'd.
fn has_separator(s: &OsStr) -> bool {
    s.to_string_lossy().contains(std::path::MAIN_SEPARATOR)
}

/// True if `path` exists and the current user can execute it, without
/// following the question any further than a single `access(2)` check
/// (no canonicalisation, no opening the file).
#[cfg(unix)]
pub fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid, NUL-terminated byte string for the
    // duration of the call; access() only reads it.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

#[cfg(not(unix))]
pub fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// Search each `PATH` entry left to right for an executable
/// `dir/name`, returning the first match as `dir + "/" + name` (not
/// canonicalised).
fn search_path(process: &Process, name: &OsStr) -> Option<PathBuf> {
    let path_var = process.var("PATH").ok()?;
    for dir in env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Resolve `invoked_path` from `argv[0]` and (if needed) `PATH`.
pub fn locate(process: &Process) -> Result<PathBuf, LauncherError> {
    let arg0: OsString = process.arg0().unwrap_or_default();

    if has_separator(&arg0) {
        return Ok(PathBuf::from(arg0));
    }

    search_path(process, &arg0).ok_or(LauncherError::NotInPath(arg0))
}

/// spec.md §4.1's special case: the resolved path is a plain regular
/// file (not a symlink) and it *is* this launcher binary's own
/// canonical path. In that case the caller ran the launcher directly
/// rather than through a profile symlink.
pub fn is_direct_execution(invoked_path: &Path) -> bool {
    let Ok(meta) = std::fs::symlink_metadata(invoked_path) else {
        return false;
    };
    if meta.file_type().is_symlink() {
        return false;
    }
    let Ok(current_exe) = env::current_exe() else {
        return false;
    };
    same_file::is_same_file(invoked_path, current_exe).unwrap_or(false)
}
