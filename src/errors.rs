//! The launcher's error taxonomy.
//!
//! Every variant here corresponds to exactly one row of the error
//! table: a trigger condition, a diagnostic line, and (via
//! [`LauncherError::exit_code`]) an exit status. `main` renders the
//! error with `Display` and exits with that code; nothing downstream
//! of a `LauncherError` ever inspects its message text again, so the
//! wording only has to be correct here.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error as ThisError;

/// The diagnostic prefix used for both the debug protocol and error
/// lines. The original implementation emitted `hdist-launcher:`; this
/// rewrite settles on the shorter `launcher:` used throughout the
/// specification's own worked examples (see DESIGN.md).
pub const DIAG_PREFIX: &str = "launcher";

#[derive(ThisError, Debug)]
pub enum LauncherError {
    #[error("{DIAG_PREFIX}:Not found in PATH: {}", .0.to_string_lossy())]
    NotInPath(OsString),

    #[error("{DIAG_PREFIX}:Symlink chain too long")]
    ChainTooLong,

    #[error("{DIAG_PREFIX}:Unable to launch '{}'", .0.display())]
    ReadlinkFailed(PathBuf),

    #[error("{DIAG_PREFIX}:Unable to launch '{}'", .0.display())]
    NoSidecar(PathBuf),

    #[error("{DIAG_PREFIX}:Unable to launch '{}'", .0.display())]
    BadShebang(PathBuf),

    #[error("{DIAG_PREFIX}:Unable to launch '{}'", .0.display())]
    ExecFailed(PathBuf, #[source] std::io::Error),

    #[error("{DIAG_PREFIX}:Unable to launch '{0}'")]
    NoInterpreter(String),

    #[error("{DIAG_PREFIX}:Unsupported platform for process replacement: '{0}'")]
    UnsupportedPlatform(String),

    #[error("{DIAG_PREFIX}:Usage: invoke this binary only through a profile symlink")]
    Usage,

    #[error("{DIAG_PREFIX}:{0}")]
    Io(String, #[source] std::io::Error),
}

impl LauncherError {
    /// The exit status `main` uses for this error. `Usage` is the one
    /// case that is not really a failure (spec.md P5): it still routes
    /// through this type so `main` has a single place that decides
    /// between writing to stderr and exiting.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::Usage => 0,
            _ => 127,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_exits_zero_everything_else_exits_127() {
        assert_eq!(LauncherError::Usage.exit_code(), 0);
        assert_eq!(LauncherError::ChainTooLong.exit_code(), 127);
        assert_eq!(
            LauncherError::NotInPath(OsString::from("rustc")).exit_code(),
            127
        );
    }

    #[test]
    fn diagnostics_use_the_chosen_prefix() {
        assert_eq!(
            LauncherError::NotInPath(OsString::from("rustc")).to_string(),
            "launcher:Not found in PATH: rustc"
        );
        assert_eq!(
            LauncherError::NoSidecar(PathBuf::from("/d/foo0.real")).to_string(),
            "launcher:Unable to launch '/d/foo0.real'"
        );
        assert_eq!(LauncherError::ChainTooLong.to_string(), "launcher:Symlink chain too long");
    }
}
