//! Stage 2: walk the symlink chain from `invoked_path` until it
//! terminates at this launcher binary (spec.md §4.2), discovering the
//! profile-bin directory marker along the way.
//!
//! Every join in this module is *lexical*: a relative symlink target
//! is always appended to the textual parent of the symlink that held
//! it, never to that parent's realpath. This is the one invariant
//! spec.md calls out by name (§9, "lexical vs canonical paths") and
//! it's what makes `${ORIGIN}` describe the profile the caller
//! actually reached. The append itself goes through [`lexical_join`]
//! rather than bare `Path::join`, which would re-double a leading
//! `./` whenever the parent is itself the trivial `.` (see its doc
//! comment and spec.md §8 scenario 1).

use std::path::{Path, PathBuf};

use same_file::Handle;

use crate::debug_log::DebugLog;
use crate::errors::LauncherError;

/// One hop of the chain: the symlink that was read, the raw
/// `readlink()` return value (unparsed), and the lexically-joined
/// path that becomes `cur` for the next iteration.
#[derive(Debug, Clone)]
pub struct Hop {
    pub from: PathBuf,
    pub raw_target: PathBuf,
    pub next: PathBuf,
}

pub struct ChainResolution {
    pub hops: Vec<Hop>,
    /// The literal (non-canonicalised) path of the final hop, which
    /// realpath's to the launcher binary.
    pub launcher_path: PathBuf,
    pub profile_bin_dir: Option<PathBuf>,
}

/// spec.md §4.2: "Enforce a hop limit (e.g., 40)".
const MAX_HOPS: usize = 40;

const PROFILE_BIN_MARKER: &str = "is-profile-bin";

fn lexical_parent(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Join a relative `target` onto `dir` the way the spec's own
/// `dirname(cur) + "/" + target` concatenation means in practice: when
/// `dir` is the trivial `.` lexical parent, it contributes no prefix
/// at all, rather than letting `Path::join` glue a redundant `./` onto
/// a `target` that may already start with one. Without this, a chain
/// like spec.md §8 scenario 1's `foo3 -> ./foo2` invoked as `./foo3`
/// computes `cur` as `././foo2` instead of `./foo2`, so the debug log
/// and every downstream use of that hop (`${ORIGIN}`, the `.link`
/// dispatch `argv[0]`) would carry the doubled prefix too.
fn lexical_join(dir: &Path, target: &Path) -> PathBuf {
    if dir == Path::new(".") {
        target.to_path_buf()
    } else {
        dir.join(target)
    }
}

/// Walk from `invoked_path` to the launcher binary, emitting one
/// `readlink` debug line per hop and tracking the outermost
/// `is-profile-bin` marker seen along the way.
pub fn resolve(invoked_path: &Path, debug: &mut DebugLog) -> Result<ChainResolution, LauncherError> {
    let current_exe = std::env::current_exe()
        .map_err(|e| LauncherError::Io("could not determine own executable path".into(), e))?;
    let launcher_handle = Handle::from_path(&current_exe)
        .map_err(|e| LauncherError::Io("could not stat own executable".into(), e))?;

    let mut cur = invoked_path.to_path_buf();
    let mut hops = Vec::new();
    let mut profile_bin_dir: Option<PathBuf> = None;

    for _ in 0..MAX_HOPS {
        let raw_target =
            std::fs::read_link(&cur).map_err(|_| LauncherError::ReadlinkFailed(cur.clone()))?;

        debug.readlink(&cur.display().to_string(), &raw_target.display().to_string());

        let dir = lexical_parent(&cur);
        if dir.join(PROFILE_BIN_MARKER).exists() {
            profile_bin_dir = Some(dir.clone());
        }

        let next = if raw_target.is_absolute() {
            raw_target.clone()
        } else {
            lexical_join(&dir, &raw_target)
        };

        if let Ok(next_handle) = Handle::from_path(&next) {
            if next_handle == launcher_handle {
                hops.push(Hop {
                    from: cur,
                    raw_target,
                    next: next.clone(),
                });
                debug.line(
                    "PROFILE_BIN_DIR",
                    &profile_bin_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                );
                return Ok(ChainResolution {
                    hops,
                    launcher_path: next,
                    profile_bin_dir,
                });
            }
        }

        hops.push(Hop {
            from: cur,
            raw_target,
            next: next.clone(),
        });
        cur = next;
    }

    Err(LauncherError::ChainTooLong)
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::process::{Process, TestContext};

    /// Builds `dirs.len()` directories under `root`, each with a
    /// symlink named `foo` pointing (absolutely) to the `foo` in the
    /// next directory, with the last directory's `foo` pointing at the
    /// current test binary — standing in for the launcher binary, the
    /// way `examples/original_source/test_launcher.py`'s `setup()`
    /// uses the freshly built `hdist-launcher` binary itself.
    fn build_chain(root: &std::path::Path, dirs: &[&str]) -> Vec<PathBuf> {
        let launcher_stand_in = std::env::current_exe().unwrap();
        let mut foo_paths = Vec::new();
        for dir in dirs {
            std::fs::create_dir_all(root.join(dir)).unwrap();
            foo_paths.push(root.join(dir).join("foo"));
        }
        for i in 0..foo_paths.len() {
            let target = if i + 1 < foo_paths.len() {
                foo_paths[i + 1].clone()
            } else {
                launcher_stand_in.clone()
            };
            std::os::unix::fs::symlink(&target, &foo_paths[i]).unwrap();
        }
        foo_paths
    }

    #[test]
    fn resolve_walks_every_hop_to_the_launcher() {
        let root = tempfile::tempdir().unwrap();
        let foo_paths = build_chain(root.path(), &["a", "b", "c"]);

        let process = Process::TestProcess(TestContext::new(&["x"]));
        let mut debug = DebugLog::new(&process);
        let resolution = resolve(&foo_paths[0], &mut debug).unwrap();

        assert_eq!(resolution.hops.len(), 3);
        assert_eq!(resolution.hops[0].from, foo_paths[0]);
        assert_eq!(resolution.hops[1].from, foo_paths[1]);
        assert_eq!(resolution.hops[2].from, foo_paths[2]);
        assert_eq!(
            resolution.launcher_path,
            std::env::current_exe().unwrap()
        );
        assert!(resolution.profile_bin_dir.is_none());
    }

    #[test]
    fn resolve_detects_single_profile_bin_marker() {
        let root = tempfile::tempdir().unwrap();
        let foo_paths = build_chain(root.path(), &["a", "b", "c"]);
        std::fs::write(root.path().join("b").join("is-profile-bin"), b"").unwrap();

        let process = Process::TestProcess(TestContext::new(&["x"]));
        let mut debug = DebugLog::new(&process);
        let resolution = resolve(&foo_paths[0], &mut debug).unwrap();

        assert_eq!(resolution.profile_bin_dir, Some(root.path().join("b")));
    }

    /// spec.md §4.2: later matches overwrite earlier ones, so with
    /// multiple `is-profile-bin` markers present, the directory
    /// closest to the launcher binary (the last one visited in the
    /// walk) wins.
    #[test]
    fn resolve_last_marker_in_walk_order_wins() {
        let root = tempfile::tempdir().unwrap();
        let foo_paths = build_chain(root.path(), &["a", "b", "c"]);
        std::fs::write(root.path().join("a").join("is-profile-bin"), b"").unwrap();
        std::fs::write(root.path().join("c").join("is-profile-bin"), b"").unwrap();

        let process = Process::TestProcess(TestContext::new(&["x"]));
        let mut debug = DebugLog::new(&process);
        let resolution = resolve(&foo_paths[0], &mut debug).unwrap();

        assert_eq!(resolution.profile_bin_dir, Some(root.path().join("c")));
    }

    #[test]
    fn resolve_fails_past_the_hop_limit() {
        let root = tempfile::tempdir().unwrap();
        let mut dirs = Vec::new();
        for i in 0..(MAX_HOPS + 2) {
            dirs.push(format!("d{i}"));
        }
        let dir_refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
        let foo_paths = build_chain(root.path(), &dir_refs);

        let process = Process::TestProcess(TestContext::new(&["x"]));
        let mut debug = DebugLog::new(&process);
        assert!(matches!(
            resolve(&foo_paths[0], &mut debug),
            Err(LauncherError::ChainTooLong)
        ));
    }

    /// spec.md §8 scenario 1: `foo3 -> ./foo2` invoked as `./foo3`
    /// must produce `./foo2` as the next hop, not `././foo2`.
    #[test]
    fn lexical_join_does_not_double_a_leading_dot_slash() {
        assert_eq!(
            lexical_join(Path::new("."), Path::new("./foo2")),
            Path::new("./foo2")
        );
        assert_eq!(
            lexical_join(Path::new("."), Path::new("foo0")),
            Path::new("foo0")
        );
        assert_eq!(
            lexical_join(Path::new("/d"), Path::new("foo0")),
            Path::new("/d/foo0")
        );
    }
}
