//! External tool lookup and process execution.
//!
//! Tool locations come from a [`ToolEnv`] snapshot taken once, never from
//! ambient process state during a build. Processes are started through the
//! [`ProcessRunner`] seam so that builds can be exercised without a real
//! toolchain installed.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use boardkit_platform::tool_env_var;

/// A snapshot of the environment used to locate external tools.
#[derive(Debug, Clone, Default)]
pub struct ToolEnv {
    vars: HashMap<String, String>,
    path: Option<OsString>,
    cwd: PathBuf,
}

impl ToolEnv {
    /// Captures the current process environment, `PATH` and working directory.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: unicode_vars(std::env::vars_os()),
            path: std::env::var_os("PATH"),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// An environment with no variables and an empty search path.
    pub fn empty() -> Self {
        Self {
            cwd: PathBuf::from("."),
            ..Self::default()
        }
    }

    /// Sets a variable, builder style.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Replaces the search path, builder style.
    pub fn with_path(mut self, path: impl Into<OsString>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Reads a variable from the snapshot.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The executable name or path to use for `tool`: the override variable
    /// if set, otherwise the conventional name.
    pub fn executable(&self, tool: &str) -> String {
        self.var(&tool_env_var(tool))
            .filter(|v| !v.is_empty())
            .unwrap_or(tool)
            .to_string()
    }

    /// Finds `tool` on disk, honoring its override variable.
    pub fn locate(&self, tool: &str) -> Option<PathBuf> {
        which::which_in(self.executable(tool), self.path.as_ref(), &self.cwd).ok()
    }
}

/// A single external process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Resolved path of the executable.
    pub program: PathBuf,
    /// Arguments, not including the program.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Invocation {
    /// The command line as a single string, for messages.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// How a finished process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl Exit {
    /// A successful exit.
    pub const SUCCESS: Exit = Exit { code: Some(0) };

    /// An exit with the given code.
    pub fn code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Returns `true` for a zero exit code.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Starts external processes and waits for them.
pub trait ProcessRunner {
    /// Runs one process to completion.
    fn run(&mut self, invocation: &Invocation) -> io::Result<Exit>;
}

impl<F> ProcessRunner for F
where
    F: FnMut(&Invocation) -> io::Result<Exit>,
{
    fn run(&mut self, invocation: &Invocation) -> io::Result<Exit> {
        self(invocation)
    }
}

/// Runs processes with [`std::process::Command`], inheriting stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<Exit> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()?;
        Ok(Exit {
            code: status.code(),
        })
    }
}

fn unicode_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn non_unicode_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = unicode_vars([
            (OsString::from("YOSYS"), OsString::from("/opt/yosys")),
            (OsString::from("BROKEN"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![b'X', 0x80]), OsString::from("value")),
        ]);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["YOSYS"], "/opt/yosys");
    }

    #[cfg(unix)]
    #[test]
    fn process_snapshot_survives_non_unicode_variable() {
        use std::os::unix::ffi::OsStrExt;

        let key = "BOARDKIT_TOOLS_NON_UNICODE_VALUE";
        std::env::set_var(key, std::ffi::OsStr::from_bytes(b"\xff\xfe"));
        let env = ToolEnv::from_process();
        std::env::remove_var(key);

        assert_eq!(env.var(key), None);
        assert_eq!(env.path, std::env::var_os("PATH"));
    }

    #[test]
    fn override_variable_wins() {
        let env = ToolEnv::empty().with_var("NEXTPNR_ECP5", "/opt/fpga/bin/nextpnr-ecp5");
        assert_eq!(env.executable("nextpnr-ecp5"), "/opt/fpga/bin/nextpnr-ecp5");
        assert_eq!(env.executable("yosys"), "yosys");
    }

    #[test]
    fn empty_override_is_ignored() {
        let env = ToolEnv::empty().with_var("DFU_UTIL", "");
        assert_eq!(env.executable("dfu-util"), "dfu-util");
    }

    #[test]
    fn locate_on_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let env = ToolEnv::empty().with_path(dir.path());
        assert_eq!(env.locate("fake-tool"), Some(tool.clone()));
        assert_eq!(env.locate("missing-tool"), None);

        let env = ToolEnv::empty().with_var("FAKE", tool.to_str().unwrap());
        assert_eq!(env.locate("fake"), Some(tool));
    }

    #[test]
    fn closures_are_runners() {
        let mut count = 0;
        let mut runner = |_: &Invocation| -> io::Result<Exit> {
            count += 1;
            Ok(Exit::code(3))
        };
        let inv = Invocation {
            program: PathBuf::from("x"),
            args: vec!["a b".to_string(), "c".to_string()],
            cwd: PathBuf::from("."),
        };
        let exit = runner.run(&inv).unwrap();
        assert!(!exit.success());
        assert_eq!(count, 1);
        assert_eq!(inv.display(), "x \"a b\" c");
    }
}
