//! Dependency usage detection.
//!
//! Matching is plain substring search for a fixed set of import/require spellings. It can be
//! fooled by comments and string literals, and it misses computed specifiers, subpath imports
//! (`lodash/fp`), and `export ... from` re-exports.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::infra::config::Config;

/// A source file held in memory for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Contents of every collected source file.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Read `paths` in parallel, keeping their order. Unreadable files are logged and dropped.
    pub fn load(paths: &[PathBuf]) -> Self {
        let files = paths
            .par_iter()
            .filter_map(|path| read_source(path))
            .collect();
        Self { files }
    }

    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }
}

fn read_source(path: &Path) -> Option<SourceFile> {
    match fs::read(path) {
        Ok(bytes) => Some(SourceFile {
            path: path.to_path_buf(),
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        }),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read source file");
            None
        }
    }
}

/// Decides whether a dependency is referenced from source.
#[derive(Debug, Clone)]
pub struct UsageDetector {
    always_used: Vec<String>,
    always_used_prefixes: Vec<String>,
}

impl Default for UsageDetector {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl UsageDetector {
    pub fn from_config(config: &Config) -> Self {
        Self {
            always_used: config.usage.always_used.clone(),
            always_used_prefixes: config.usage.always_used_prefixes.clone(),
        }
    }

    /// Dependencies such as type packages never show up in imports and count as used.
    pub fn is_presumed_used(&self, name: &str) -> bool {
        self.always_used.iter().any(|used| used == name)
            || self
                .always_used_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    pub fn is_used(&self, name: &str, sources: &SourceSet) -> bool {
        if self.is_presumed_used(name) {
            return true;
        }
        let patterns = import_patterns(name);
        sources
            .files()
            .iter()
            .any(|file| references(&file.contents, &patterns))
    }
}

fn references(contents: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| contents.contains(pattern.as_str()))
}

/// Literal spellings that count as a reference to `name`.
pub fn import_patterns(name: &str) -> [String; 7] {
    [
        format!("require('{name}')"),
        format!("import '{name}'"),
        format!("import \"{name}\""),
        format!("from '{name}'"),
        format!("from \"{name}\""),
        format!("import('{name}')"),
        format!("import(\"{name}\")"),
    ]
}
