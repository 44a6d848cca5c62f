//! The `HDIST_LAUNCHER_DEBUG` wire protocol: one `launcher:DEBUG:key=value`
//! line per emitted fact, written straight to standard error.
//!
//! This is intentionally not routed through `tracing`: the test
//! harness in spec.md §8 parses these lines back out of stderr by
//! prefix and `=` split, so the format is a stable external contract,
//! not a log message that's merely *likely* to look like this.

use std::io::Write;

use crate::errors::DIAG_PREFIX;
use crate::process::Process;

pub struct DebugLog {
    enabled: bool,
    writer: Box<dyn Write + Send>,
}

impl DebugLog {
    pub fn new(process: &Process) -> Self {
        let enabled = process
            .var("HDIST_LAUNCHER_DEBUG")
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        DebugLog {
            enabled,
            writer: process.stderr(),
        }
    }

    pub fn line(&mut self, key: &str, value: &str) {
        if !self.enabled {
            return;
        }
        // Best-effort: a launcher that can't write its own debug trace
        // still has to proceed with resolution and exec.
        let _ = writeln!(self.writer, "{DIAG_PREFIX}:DEBUG:{key}={value}");
    }

    pub fn readlink(&mut self, from: &str, to: &str) {
        self.line("readlink", &format!("{from} -> {to}"));
    }
}
