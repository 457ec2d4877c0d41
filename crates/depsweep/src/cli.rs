//! Command line entry point.

use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;

use crate::app::prune::{Outcome, Pruner, RunOptions};
use crate::infra::config::Config;
use crate::infra::manifest::Manifest;
use crate::infra::npm::{DryRun, NpmCli, PackageManager};
use crate::infra::prompt::{FixedAnswer, LinePrompt, Prompt};

/// Find and remove unused package.json dependencies.
#[derive(Debug, Parser)]
#[command(name = "depsweep", author, version, about, long_about = None)]
pub struct Cli {
    /// Project root containing package.json (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Additional config file layered over user and project config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer the prompt non-interactively, e.g. "1,3" or "all"
    #[arg(long, value_name = "INPUT")]
    pub select: Option<String>,

    /// Print the listing and exit without prompting
    #[arg(long, conflicts_with = "select")]
    pub list: bool,

    /// Print uninstall commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Do not list globally installed packages
    #[arg(long)]
    pub no_global: bool,

    /// Delay before scanning, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completions: Option<Shell>,
}

/// Run the CLI. Failures are reported and still exit successfully.
pub fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let name = command.get_name().to_owned();
        clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        return Ok(());
    }

    if let Err(err) = sweep(cli) {
        tracing::error!(error = %format!("{err:#}"), "run aborted");
        eprintln!("depsweep: {err:#}");
    }
    Ok(())
}

fn sweep(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("unable to determine working directory")?,
    };
    let config = Config::load(&root, cli.config.as_deref())?;

    let delay = cli.delay_ms.unwrap_or(config.defaults.startup_delay_ms());
    if delay > 0 {
        thread::sleep(Duration::from_millis(delay));
    }

    let manifest = Manifest::load(&root)?;

    let program = config.package_manager.program();
    let npm = NpmCli::new(program.clone(), &root);
    let pm: Box<dyn PackageManager> = if cli.dry_run {
        Box::new(DryRun::new(npm, program, io::stdout()))
    } else {
        Box::new(npm)
    };

    let options = RunOptions {
        include_global: config.defaults.include_global() && !cli.no_global,
        list_only: cli.list,
    };
    let mut prompt: Box<dyn Prompt> = match cli.select {
        Some(answer) => Box::new(FixedAnswer::new(answer)),
        None => Box::new(LinePrompt),
    };

    let pruner = Pruner::new(root, manifest, config, pm.as_ref());
    let outcome = pruner.run(options, prompt.as_mut(), &mut io::stdout())?;
    tracing::debug!(outcome = outcome_label(&outcome), "run finished");
    Ok(())
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::NothingToDo => "nothing-to-do",
        Outcome::Listed(_) => "listed",
        Outcome::InvalidSelection => "invalid-selection",
        Outcome::Removed(_) => "removed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_conflicts_with_select() {
        let parsed = Cli::try_parse_from(["depsweep", "--list", "--select", "all"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_flags() -> Result<()> {
        let cli = Cli::try_parse_from([
            "depsweep",
            "--root",
            "web",
            "--dry-run",
            "--no-global",
            "--delay-ms",
            "0",
            "-vv",
        ])?;
        assert_eq!(cli.root, Some(PathBuf::from("web")));
        assert!(cli.dry_run);
        assert!(cli.no_global);
        assert_eq!(cli.delay_ms, Some(0));
        assert_eq!(cli.verbose, 2);
        Ok(())
    }
}
