//! End-to-end flow: detect unused dependencies, list them, ask, and remove.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::app::global::list_global_packages;
use crate::app::remove::Remover;
use crate::app::scan::{CollectorConfig, FileCollector};
use crate::app::scripts::mentioned_in_scripts;
use crate::app::selection::parse_selection;
use crate::app::usage::{SourceSet, UsageDetector};
use crate::domain::model::{Listing, RemovalReport, Scope};
use crate::infra::config::Config;
use crate::infra::manifest::Manifest;
use crate::infra::npm::PackageManager;
use crate::infra::prompt::Prompt;

pub const NOTHING_TO_DO: &str = "No unused dependencies found.";
pub const QUESTION: &str = "Enter the numbers to remove (e.g. 1,3) or \"all\":";
pub const INVALID_INPUT: &str = "Invalid input, nothing was removed.";

/// Candidates that are neither imported from source nor mentioned by a script, in manifest
/// order (`dependencies` first, then `devDependencies`).
pub fn find_unused(
    manifest: &Manifest,
    sources: &SourceSet,
    detector: &UsageDetector,
) -> Vec<String> {
    manifest
        .candidates()
        .into_iter()
        .filter(|name| !detector.is_used(name, sources) && !mentioned_in_scripts(manifest, name))
        .collect()
}

/// Render the numbered listing. Global entries are tagged.
pub fn render_listing(listing: &Listing) -> String {
    let mut rendered = String::from("Unused dependencies:\n");
    for (number, name, scope) in listing.numbered() {
        match scope {
            Scope::Local => rendered.push_str(&format!("{number}. {name}\n")),
            Scope::Global => rendered.push_str(&format!("{number}. {name} [global]\n")),
        }
    }
    rendered
}

/// How the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NothingToDo,
    /// The listing was printed without prompting.
    Listed(Listing),
    InvalidSelection,
    Removed(Vec<RemovalReport>),
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub include_global: bool,
    pub list_only: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            include_global: true,
            list_only: false,
        }
    }
}

/// Owns the per-run inputs: the project root, its manifest, and the loaded configuration.
pub struct Pruner<'a> {
    root: PathBuf,
    manifest: Manifest,
    config: Config,
    pm: &'a dyn PackageManager,
}

impl<'a> Pruner<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        manifest: Manifest,
        config: Config,
        pm: &'a dyn PackageManager,
    ) -> Self {
        Self {
            root: root.into(),
            manifest,
            config,
            pm,
        }
    }

    /// Scan the project and build this run's listing.
    pub fn listing(&self, include_global: bool) -> Result<Listing> {
        let collector_cfg = CollectorConfig::from_root(self.root.clone(), &self.config);
        let paths = FileCollector::new().collect(&collector_cfg)?;
        let sources = SourceSet::load(&paths);
        let detector = UsageDetector::from_config(&self.config);

        let unused = find_unused(&self.manifest, &sources, &detector);
        tracing::info!(
            files = sources.len(),
            candidates = self.manifest.candidates().len(),
            unused = unused.len(),
            "usage scan finished"
        );

        let global = if include_global {
            list_global_packages(self.pm)
        } else {
            Vec::new()
        };
        Ok(Listing::new(unused, global))
    }

    pub fn run(
        &self,
        options: RunOptions,
        prompt: &mut dyn Prompt,
        out: &mut dyn Write,
    ) -> Result<Outcome> {
        let listing = self.listing(options.include_global)?;
        if listing.is_empty() {
            writeln!(out, "{NOTHING_TO_DO}")?;
            return Ok(Outcome::NothingToDo);
        }

        write!(out, "{}", render_listing(&listing))?;
        if options.list_only {
            return Ok(Outcome::Listed(listing));
        }
        out.flush()?;

        let Some(answer) = prompt.ask(QUESTION)? else {
            writeln!(out, "{INVALID_INPUT}")?;
            return Ok(Outcome::InvalidSelection);
        };

        let selection = match parse_selection(&answer, listing.len()) {
            Ok(selection) => selection,
            Err(err) => {
                tracing::debug!(input = %answer, error = %err, "rejected selection");
                writeln!(out, "{INVALID_INPUT}")?;
                return Ok(Outcome::InvalidSelection);
            }
        };

        let plan = listing.plan(&selection);
        let remover = Remover::new(self.pm);
        let mut reports = Vec::new();
        reports.extend(remover.remove(&plan.local, Scope::Local, out));
        reports.extend(remover.remove(&plan.global, Scope::Global, out));
        Ok(Outcome::Removed(reports))
    }
}
