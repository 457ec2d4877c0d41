//! Domain models for listings, selections, and removal reports.

use std::fmt;
use std::time::Duration;

/// Where a package is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Declared in the project manifest.
    Local,
    /// Installed system-wide by the package manager.
    Global,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numbered listing shown to the user: unused dependencies first, then global packages.
///
/// Indices into the listing are only meaningful for the run that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub unused: Vec<String>,
    pub global: Vec<String>,
}

impl Listing {
    pub fn new(unused: Vec<String>, global: Vec<String>) -> Self {
        Self { unused, global }
    }

    pub fn len(&self) -> usize {
        self.unused.len() + self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unused.is_empty() && self.global.is_empty()
    }

    /// Look up a 0-based index in the combined listing.
    pub fn entry(&self, index: usize) -> Option<(&str, Scope)> {
        if let Some(name) = self.unused.get(index) {
            return Some((name.as_str(), Scope::Local));
        }
        self.global
            .get(index.checked_sub(self.unused.len())?)
            .map(|name| (name.as_str(), Scope::Global))
    }

    /// Iterate entries with their 1-based display number.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str, Scope)> {
        let local = self.unused.iter().map(|name| (name.as_str(), Scope::Local));
        let global = self.global.iter().map(|name| (name.as_str(), Scope::Global));
        local
            .chain(global)
            .enumerate()
            .map(|(idx, (name, scope))| (idx + 1, name, scope))
    }

    /// Split a selection into the local and global packages to uninstall.
    ///
    /// A selected name that is also globally installed goes to the global batch, whichever
    /// listing entry picked it.
    pub fn plan(&self, selection: &Selection) -> RemovalPlan {
        match selection {
            Selection::All => RemovalPlan {
                local: self.unused.clone(),
                global: self.global.clone(),
            },
            Selection::Indices(indices) => {
                let mut plan = RemovalPlan::default();
                for (name, _) in indices.iter().filter_map(|&idx| self.entry(idx)) {
                    if self.is_global(name) {
                        plan.global.push(name.to_owned());
                    } else {
                        plan.local.push(name.to_owned());
                    }
                }
                plan
            }
        }
    }

    fn is_global(&self, name: &str) -> bool {
        self.global.iter().any(|global| global == name)
    }
}

/// Parsed answer to the removal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every listed entry.
    All,
    /// Distinct 0-based indices in first-seen order, all within the listing.
    Indices(Vec<usize>),
}

/// Packages to uninstall, partitioned by scope, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    pub local: Vec<String>,
    pub global: Vec<String>,
}

/// Outcome of one sequential removal batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    pub scope: Scope,
    pub attempted: usize,
    pub removed: Vec<String>,
    pub failed: Vec<FailedRemoval>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRemoval {
    pub name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["g1".into(), "g2".into()],
        )
    }

    #[test]
    fn entries_span_local_then_global() {
        let listing = listing();
        assert_eq!(listing.len(), 5);
        assert_eq!(listing.entry(0), Some(("a", Scope::Local)));
        assert_eq!(listing.entry(3), Some(("g1", Scope::Global)));
        assert_eq!(listing.entry(5), None);

        let numbers: Vec<_> = listing.numbered().map(|(n, _, _)| n).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn plan_partitions_local_and_global() {
        let plan = listing().plan(&Selection::Indices(vec![4, 0, 2]));
        assert_eq!(plan.local, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(plan.global, vec!["g2".to_string()]);
    }

    #[test]
    fn plan_all_takes_everything() {
        let plan = listing().plan(&Selection::All);
        assert_eq!(plan.local.len(), 3);
        assert_eq!(plan.global.len(), 2);
    }

    #[test]
    fn globally_installed_name_is_removed_globally() {
        let listing = Listing::new(
            vec!["eslint".into(), "moment".into()],
            vec!["eslint".into(), "serve".into()],
        );
        let plan = listing.plan(&Selection::Indices(vec![0]));
        assert!(plan.local.is_empty());
        assert_eq!(plan.global, vec!["eslint".to_string()]);

        let plan = listing.plan(&Selection::Indices(vec![3, 1]));
        assert_eq!(plan.local, vec!["moment".to_string()]);
        assert_eq!(plan.global, vec!["serve".to_string()]);
    }
}
