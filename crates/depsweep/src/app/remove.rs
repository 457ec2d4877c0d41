//! Sequential package removal.

use std::io::Write;
use std::time::Instant;

use crate::domain::model::{FailedRemoval, RemovalReport, Scope};
use crate::infra::npm::PackageManager;

/// Uninstalls packages one at a time so progress lines stay ordered and the package manager
/// never sees concurrent mutations of its lock state.
pub struct Remover<'a> {
    pm: &'a dyn PackageManager,
}

impl<'a> Remover<'a> {
    pub fn new(pm: &'a dyn PackageManager) -> Self {
        Self { pm }
    }

    /// Remove `names` in order, writing one line per package and a closing summary to `out`.
    ///
    /// Failures are logged and reported but do not stop the batch. Neither does a failed write
    /// to `out`. An empty batch does nothing and returns `None`.
    pub fn remove(
        &self,
        names: &[String],
        scope: Scope,
        out: &mut dyn Write,
    ) -> Option<RemovalReport> {
        if names.is_empty() {
            return None;
        }

        let started = Instant::now();
        let mut removed = Vec::new();
        let mut failed = Vec::new();

        for name in names {
            match self.pm.uninstall(name, scope) {
                Ok(()) => {
                    tracing::info!(package = %name, scope = %scope, "removed package");
                    match scope {
                        Scope::Local => emit(out, &format!("✔ removed {name}")),
                        Scope::Global => emit(out, &format!("✔ removed {name} (global)")),
                    }
                    removed.push(name.clone());
                }
                Err(err) => {
                    tracing::error!(package = %name, scope = %scope, error = %err, "failed to remove package");
                    emit(out, &format!("✘ failed to remove {name}: {err}"));
                    failed.push(FailedRemoval {
                        name: name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let report = RemovalReport {
            scope,
            attempted: names.len(),
            removed,
            failed,
            elapsed: started.elapsed(),
        };
        emit(out, &summary_line(&report));
        Some(report)
    }
}

fn emit(out: &mut dyn Write, line: &str) {
    if let Err(err) = writeln!(out, "{line}") {
        tracing::warn!(error = %err, "failed to write removal progress");
    }
}

pub fn summary_line(report: &RemovalReport) -> String {
    let mut line = format!(
        "Finished removing {} {} package(s) in {:.2}s",
        report.attempted,
        report.scope,
        report.elapsed.as_secs_f64()
    );
    if !report.failed.is_empty() {
        line.push_str(&format!(" ({} failed)", report.failed.len()));
    }
    line
}
