//! An abstraction over the bits of process state the launcher reads:
//! `argv`, environment variables, and standard error. Real resolution
//! always runs against [`Process::os`]; the test variant lets the
//! pure-logic unit tests in this crate drive [`crate::self_location`]
//! and [`crate::shebang`] without forking a subprocess or touching the
//! real environment.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub enum Process {
    OsProcess,
    #[cfg(test)]
    TestProcess(TestContext),
}

impl Process {
    pub fn os() -> Self {
        Self::OsProcess
    }

    /// `argv[0]` as the caller passed it, honoring the
    /// `HDIST_LAUNCHER_FORCE_ARG0` test seam (never documented as
    /// user-facing configuration; it exists so unit tests can exercise
    /// self-location without forking a real process).
    pub fn arg0(&self) -> Option<OsString> {
        if let Ok(forced) = self.var("HDIST_LAUNCHER_FORCE_ARG0") {
            return Some(OsString::from(forced));
        }
        self.args_os().next()
    }

    pub fn args_os(&self) -> Box<dyn Iterator<Item = OsString> + '_> {
        match self {
            Process::OsProcess => Box::new(env::args_os()),
            #[cfg(test)]
            Process::TestProcess(p) => Box::new(p.args.clone().into_iter()),
        }
    }

    pub fn var(&self, key: &str) -> Result<String, env::VarError> {
        match self {
            Process::OsProcess => env::var(key),
            #[cfg(test)]
            Process::TestProcess(p) => match p.vars.get(key) {
                Some(val) => Ok(val.clone()),
                None => Err(env::VarError::NotPresent),
            },
        }
    }

    /// A writer for the launcher's own diagnostic output. This is
    /// distinct from the stdio inherited by the dispatched program:
    /// the launcher itself only ever writes to standard error, never
    /// standard out.
    pub fn stderr(&self) -> Box<dyn Write + Send> {
        match self {
            Process::OsProcess => Box::new(io::stderr()),
            #[cfg(test)]
            Process::TestProcess(p) => Box::new(TestWriter(p.stderr.clone())),
        }
    }
}

#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct TestContext {
    pub args: Vec<OsString>,
    pub vars: std::collections::HashMap<String, String>,
    pub stderr: Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl TestContext {
    pub fn new<A: AsRef<str>>(args: &[A]) -> Self {
        TestContext {
            args: args.iter().map(|a| OsString::from(a.as_ref())).collect(),
            vars: std::collections::HashMap::new(),
            stderr: Arc::default(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr.lock().unwrap_or_else(|e| e.into_inner())).into_owned()
    }
}

#[cfg(test)]
#[derive(Clone)]
struct TestWriter(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
