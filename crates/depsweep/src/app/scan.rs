//! Source file collection.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use parking_lot::Mutex;

use crate::infra::config::Config;

/// Inputs for a collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub skip_dirs: Vec<String>,
    pub globs: Vec<String>,
    pub respect_gitignore: bool,
}

impl CollectorConfig {
    pub fn from_root(root: PathBuf, config: &Config) -> Self {
        Self {
            root,
            extensions: config.scan.extensions.clone(),
            skip_dirs: config.scan.skip_dirs.clone(),
            globs: config.scan.globs.clone(),
            respect_gitignore: config.scan.respect_gitignore(),
        }
    }
}

/// Depth-first walk collecting JavaScript and TypeScript sources.
///
/// Symbolic links are never followed. Each directory is entered at most once by real path, so
/// cycles created through bind mounts or similar terminate. Unreadable directories are logged
/// and contribute nothing.
#[derive(Debug, Default)]
pub struct FileCollector;

impl FileCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn collect(&self, cfg: &CollectorConfig) -> Result<Vec<PathBuf>> {
        let filter = Arc::new(EntryFilter::new(cfg)?);

        let mut builder = WalkBuilder::new(&cfg.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .git_ignore(cfg.respect_gitignore)
            .ignore(cfg.respect_gitignore)
            .require_git(false);

        builder.filter_entry({
            let filter = filter.clone();
            move |entry| filter.admit(entry)
        });

        let mut files = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|ty| ty.is_file());
                    if is_file && filter.has_source_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable path");
                }
            }
        }

        files.sort();
        tracing::debug!(root = %cfg.root.display(), files = files.len(), "collected sources");
        Ok(files)
    }
}

struct EntryFilter {
    root: PathBuf,
    extensions: Vec<String>,
    skip_dirs: Vec<String>,
    globs: GlobSet,
    visited: Mutex<HashSet<PathBuf>>,
}

impl EntryFilter {
    fn new(cfg: &CollectorConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &cfg.globs {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid scan glob '{pattern}'"))?;
            builder.add(glob);
        }

        Ok(Self {
            root: cfg.root.clone(),
            extensions: cfg
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            skip_dirs: cfg.skip_dirs.clone(),
            globs: builder.build().context("failed to build scan globs")?,
            visited: Mutex::new(HashSet::new()),
        })
    }

    fn admit(&self, entry: &DirEntry) -> bool {
        if entry.path_is_symlink() {
            return false;
        }

        let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        if entry.depth() > 0 && self.globs.is_match(rel) {
            return false;
        }

        let is_dir = entry.file_type().is_some_and(|ty| ty.is_dir());
        if !is_dir {
            return true;
        }

        if entry.depth() > 0 && self.is_skipped_dir(entry.path()) {
            return false;
        }

        match fs::canonicalize(entry.path()) {
            Ok(real) => self.visited.lock().insert(real),
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "cannot resolve directory");
                false
            }
        }
    }

    fn is_skipped_dir(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.skip_dirs.iter().any(|needle| path.contains(needle.as_str()))
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}
