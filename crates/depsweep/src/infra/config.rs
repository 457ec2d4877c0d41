//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static PROJECT_CONFIG_FILE: &str = ".depsweep.toml";

/// Layered configuration loaded from defaults, user, project, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub scan: Scan,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub package_manager: PackageManager,
}

/// Run-level settings. Unset fields fall through to lower layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    startup_delay_ms: Option<u64>,
    #[serde(default)]
    include_global: Option<bool>,
}

impl Defaults {
    fn default_startup_delay_ms() -> u64 {
        500
    }

    fn default_include_global() -> bool {
        true
    }

    pub fn startup_delay_ms(&self) -> u64 {
        self.startup_delay_ms
            .unwrap_or_else(Self::default_startup_delay_ms)
    }

    pub fn include_global(&self) -> bool {
        self.include_global
            .unwrap_or_else(Self::default_include_global)
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            startup_delay_ms: Some(Self::default_startup_delay_ms()),
            include_global: Some(Self::default_include_global()),
        }
    }
}

/// Controls which files the collector returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    #[serde(default = "Scan::default_extensions")]
    pub extensions: Vec<String>,
    /// Directories whose path contains any of these substrings are not entered.
    #[serde(default = "Scan::default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
    #[serde(default)]
    respect_gitignore: Option<bool>,
}

impl Scan {
    fn default_extensions() -> Vec<String> {
        ["js", "ts", "jsx", "tsx", "mjs", "cjs"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn default_skip_dirs() -> Vec<String> {
        ["node_modules", ".vscode", ".git"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(false)
    }
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            skip_dirs: Self::default_skip_dirs(),
            globs: Vec::new(),
            respect_gitignore: Some(false),
        }
    }
}

/// Dependencies presumed used without looking at any source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default = "Usage::default_always_used")]
    pub always_used: Vec<String>,
    #[serde(default = "Usage::default_always_used_prefixes")]
    pub always_used_prefixes: Vec<String>,
}

impl Usage {
    fn default_always_used() -> Vec<String> {
        vec!["typescript".into()]
    }

    fn default_always_used_prefixes() -> Vec<String> {
        vec!["@types/".into()]
    }
}

impl Default for Usage {
    fn default() -> Self {
        Self {
            always_used: Self::default_always_used(),
            always_used_prefixes: Self::default_always_used_prefixes(),
        }
    }
}

/// Executable used for uninstalls and global listing. Unset means the platform's `npm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PackageManager {
    #[serde(default)]
    program: Option<String>,
}

impl PackageManager {
    fn default_program() -> String {
        if cfg!(windows) {
            "npm.cmd".into()
        } else {
            "npm".into()
        }
    }

    pub fn program(&self) -> String {
        self.program
            .clone()
            .unwrap_or_else(Self::default_program)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    package_manager: Option<String>,
    startup_delay_ms: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            package_manager: env::var("DEPSWEEP_PACKAGE_MANAGER").ok(),
            startup_delay_ms: env::var("DEPSWEEP_STARTUP_DELAY_MS").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(package_manager: &str, startup_delay_ms: &str) -> Self {
        Self {
            package_manager: Some(package_manager.to_owned()),
            startup_delay_ms: Some(startup_delay_ms.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration for a project root.
    ///
    /// Layers, lowest precedence first: built-in defaults, the user config, `.depsweep.toml` in
    /// the project root, an explicit `extra` file, then environment overrides.
    pub fn load(root: &Path, extra: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let project = Some(root.join(PROJECT_CONFIG_FILE));
        Self::load_with_layers(global, project, extra.map(Path::to_path_buf), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        project: Option<PathBuf>,
        extra: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(project_path) = project.filter(|path| path.exists()) {
            layers.push(Self::from_file(&project_path)?);
        }

        // An explicitly requested file must exist.
        if let Some(extra_path) = extra {
            layers.push(Self::from_file(&extra_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            scan: merge_scan(self.scan, other.scan),
            usage: merge_usage(self.usage, other.usage),
            package_manager: merge_package_manager(self.package_manager, other.package_manager),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        startup_delay_ms: overlay.startup_delay_ms.or(base.startup_delay_ms),
        include_global: overlay.include_global.or(base.include_global),
    }
}

fn merge_scan(base: Scan, overlay: Scan) -> Scan {
    Scan {
        extensions: union(base.extensions, overlay.extensions),
        skip_dirs: union(base.skip_dirs, overlay.skip_dirs),
        globs: union(base.globs, overlay.globs),
        respect_gitignore: overlay.respect_gitignore.or(base.respect_gitignore),
    }
}

fn merge_usage(base: Usage, overlay: Usage) -> Usage {
    Usage {
        always_used: union(base.always_used, overlay.always_used),
        always_used_prefixes: union(base.always_used_prefixes, overlay.always_used_prefixes),
    }
}

fn merge_package_manager(base: PackageManager, overlay: PackageManager) -> PackageManager {
    PackageManager {
        program: overlay.program.or(base.program),
    }
}

fn union(base: Vec<String>, overlay: Vec<String>) -> Vec<String> {
    let mut merged: BTreeSet<String> = base.into_iter().collect();
    merged.extend(overlay);
    merged.into_iter().collect()
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("depsweep/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(program) = env.package_manager.filter(|p| !p.trim().is_empty()) {
        config.package_manager.program = Some(program);
    }
    if let Some(raw) = env.startup_delay_ms {
        match raw.trim().parse::<u64>() {
            Ok(ms) => config.defaults.startup_delay_ms = Some(ms),
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "ignoring DEPSWEEP_STARTUP_DELAY_MS")
            }
        }
    }
    config
}
