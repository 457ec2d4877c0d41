//! Package manager process adapter.

#[cfg(any(test, feature = "testing"))]
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::model::Scope;

#[derive(Debug, Error)]
pub enum PackageManagerError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{command}` failed: {reason}")]
    Rejected { command: String, reason: String },
    #[error("unexpected package manager output: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

pub type PmResult<T> = std::result::Result<T, PackageManagerError>;

/// Operations the tool needs from the package manager.
pub trait PackageManager {
    /// Uninstall one package. Local removals run in the project root.
    fn uninstall(&self, name: &str, scope: Scope) -> PmResult<()>;

    /// Raw JSON describing globally installed top-level packages.
    fn list_global(&self) -> PmResult<String>;
}

/// Shape of `npm ls -g --depth=0 --json`.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalTree {
    #[serde(default)]
    pub dependencies: Map<String, Value>,
}

impl GlobalTree {
    pub fn parse(raw: &str) -> PmResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn names(self) -> Vec<String> {
        self.dependencies.into_iter().map(|(name, _)| name).collect()
    }
}

/// Shells out to an npm-compatible executable.
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: String,
    project_root: PathBuf,
}

impl NpmCli {
    pub fn new(program: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            project_root: project_root.into(),
        }
    }

    fn run(&self, args: &[&str]) -> PmResult<Output> {
        let command = display_command(&self.program, args);
        tracing::debug!(command = %command, "running package manager");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.project_root)
            .output()
            .map_err(|source| PackageManagerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(PackageManagerError::Failed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

impl PackageManager for NpmCli {
    fn uninstall(&self, name: &str, scope: Scope) -> PmResult<()> {
        self.run(&uninstall_args(name, scope)).map(|_| ())
    }

    fn list_global(&self) -> PmResult<String> {
        let output = self.run(&["ls", "-g", "--depth=0", "--json"])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Prints the uninstall commands instead of running them.
///
/// Global listing is still delegated so the output shows what would be offered.
pub struct DryRun<P, W> {
    inner: P,
    program: String,
    out: Mutex<W>,
}

impl<P: PackageManager, W: Write> DryRun<P, W> {
    pub fn new(inner: P, program: impl Into<String>, out: W) -> Self {
        Self {
            inner,
            program: program.into(),
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.out.into_inner()
    }
}

impl<P: PackageManager, W: Write> PackageManager for DryRun<P, W> {
    fn uninstall(&self, name: &str, scope: Scope) -> PmResult<()> {
        let command = display_command(&self.program, &uninstall_args(name, scope));
        let mut out = self.out.lock();
        writeln!(out, "would run: {command}").map_err(|err| PackageManagerError::Rejected {
            command,
            reason: err.to_string(),
        })
    }

    fn list_global(&self) -> PmResult<String> {
        self.inner.list_global()
    }
}

/// In-memory test double for exercising the removal flow without spawning processes.
///
/// Only built for unit tests and with the `testing` feature, which the integration tests enable.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct FakePackageManager {
    global_json: Option<String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, Scope)>>,
}

#[cfg(any(test, feature = "testing"))]
impl FakePackageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this JSON from `list_global`. Without it, listing fails.
    pub fn with_global_json(mut self, json: impl Into<String>) -> Self {
        self.global_json = Some(json.into());
        self
    }

    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Every uninstall attempt, in call order.
    pub fn calls(&self) -> Vec<(String, Scope)> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "testing"))]
impl PackageManager for FakePackageManager {
    fn uninstall(&self, name: &str, scope: Scope) -> PmResult<()> {
        self.calls.lock().push((name.to_owned(), scope));
        if self.failing.contains(name) {
            return Err(PackageManagerError::Rejected {
                command: display_command("npm", &uninstall_args(name, scope)),
                reason: "simulated failure".into(),
            });
        }
        Ok(())
    }

    fn list_global(&self) -> PmResult<String> {
        self.global_json
            .clone()
            .ok_or_else(|| PackageManagerError::Rejected {
                command: "npm ls -g --depth=0 --json".into(),
                reason: "no global listing configured".into(),
            })
    }
}

fn uninstall_args(name: &str, scope: Scope) -> Vec<&str> {
    match scope {
        Scope::Local => vec!["uninstall", name],
        Scope::Global => vec!["uninstall", "-g", name],
    }
}

fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
