//! Stage 3: find the sidecar descriptor next to the last non-launcher
//! hop of the chain (spec.md §4.3).

use std::path::{Path, PathBuf};

use crate::errors::LauncherError;

#[derive(Debug, Clone)]
pub enum Sidecar {
    Link { path: String },
    Script { first_line: String },
}

/// `.link` wins over `.real` when both exist (spec.md §9's open
/// question, resolved in favor of lookup order — see DESIGN.md).
pub fn discover(base: &Path, name: &str) -> Result<Sidecar, LauncherError> {
    let link_path = base.join(format!("{name}.link"));
    if let Ok(contents) = std::fs::read_to_string(&link_path) {
        let trimmed = contents.strip_suffix('\n').unwrap_or(&contents);
        return Ok(Sidecar::Link {
            path: trimmed.to_string(),
        });
    }

    let real_path = base.join(format!("{name}.real"));
    if let Ok(mut contents) = std::fs::read_to_string(&real_path) {
        let first_line_end = contents.find('\n').unwrap_or(contents.len());
        contents.truncate(first_line_end);
        return Ok(Sidecar::Script {
            first_line: contents,
        });
    }

    Err(LauncherError::NoSidecar(base.join(format!("{name}.real"))))
}

/// Split the last hop's path (the symlink the user actually addressed
/// a script through) into its lexical directory and file name.
pub fn base_and_name(last_hop_path: &Path) -> (PathBuf, String) {
    let base = last_hop_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = last_hop_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (base, name)
}
