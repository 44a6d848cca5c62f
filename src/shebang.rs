//! Stage 3b: parse a `.real` file's first line as a shebang, expand
//! `${ORIGIN}`/`${PROFILE_BIN_DIR}`, and pick an interpreter among a
//! `:`-separated candidate list (spec.md §4.4).

use std::path::Path;

use crate::errors::LauncherError;
use crate::self_location::is_executable_file;

/// The two raw (unexpanded) fields tokenised out of a shebang line.
pub struct ShebangFields {
    pub cmd: String,
    pub arg: String,
}

/// `${PROFILE_BIN_DIR}` expands to this literal when no profile-bin
/// directory was found during chain resolution.
pub const PROFILE_BIN_DIR_NA: &str = "__NA__";

/// The `.real` file's first line didn't start with `#!`. Carries no
/// path: the caller knows which `.real` file it read and attaches that
/// path when turning this into a [`LauncherError::BadShebang`].
pub struct NotAShebang;

/// Tokenise `#!<cmd> <arg>` into its two fields, without expanding
/// variables yet. Splits on the first run of spaces/tabs; the
/// argument keeps any internal whitespace and only has trailing
/// spaces/tabs trimmed.
pub fn tokenize(first_line: &str) -> Result<ShebangFields, NotAShebang> {
    let rest = first_line.strip_prefix("#!").ok_or(NotAShebang)?;

    let bytes = rest.as_bytes();
    let mut split_at = 0;
    while split_at < bytes.len() && !is_shebang_ws(bytes[split_at]) {
        split_at += 1;
    }
    let cmd = &rest[..split_at];

    let mut arg_start = split_at;
    while arg_start < bytes.len() && is_shebang_ws(bytes[arg_start]) {
        arg_start += 1;
    }
    let arg = rest[arg_start..].trim_end_matches(is_shebang_ws_char);

    Ok(ShebangFields {
        cmd: cmd.to_string(),
        arg: arg.to_string(),
    })
}

fn is_shebang_ws(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_shebang_ws_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Expand `${ORIGIN}` and `${PROFILE_BIN_DIR}` in a single left-to-right
/// pass over `template`. Unknown `${...}` sequences, and anything
/// *produced* by a substitution, are never re-scanned.
pub fn expand(template: &str, origin: &str, profile_bin_dir: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let Some(pos) = rest.find("${") else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..pos]);
        let after = &rest[pos..];
        if let Some(tail) = after.strip_prefix("${ORIGIN}") {
            out.push_str(origin);
            rest = tail;
        } else if let Some(tail) = after.strip_prefix("${PROFILE_BIN_DIR}") {
            out.push_str(profile_bin_dir);
            rest = tail;
        } else {
            out.push_str("${");
            rest = &after[2..];
        }
    }
    out
}

/// spec.md §4.4's multi-interpreter fallback: an expanded `shebang_cmd`
/// containing `:` is an ordered list of candidates; pick the first
/// that exists and is executable (symlinks followed).
pub fn resolve_interpreter(expanded_cmd: &str) -> Result<String, LauncherError> {
    if !expanded_cmd.contains(':') {
        return Ok(expanded_cmd.to_string());
    }
    expanded_cmd
        .split(':')
        .find(|candidate| is_executable_file(Path::new(candidate)))
        .map(str::to_string)
        .ok_or_else(|| LauncherError::NoInterpreter(expanded_cmd.to_string()))
}
