use std::fs;
use std::path::Path;

use anyhow::Result;
use depsweep::app::prune::{Outcome, Pruner, RunOptions, INVALID_INPUT, NOTHING_TO_DO};
use depsweep::domain::model::Scope;
use depsweep::infra::config::Config;
use depsweep::infra::manifest::Manifest;
use depsweep::infra::npm::FakePackageManager;
use depsweep::infra::prompt::FixedAnswer;

const GLOBALS: &str = r#"{"dependencies": {"nodemon": {"version": "3.0.0"}, "serve": {"version": "14.0.0"}}}"#;

fn write_project(root: &Path) -> Result<Manifest> {
    fs::write(
        root.join("package.json"),
        r#"{
  "scripts": {"lint": "eslint ."},
  "dependencies": {"express": "4", "moment": "2", "uuid": "9"},
  "devDependencies": {"eslint": "8", "mocha": "10"}
}"#,
    )?;
    fs::create_dir_all(root.join("lib"))?;
    fs::create_dir_all(root.join("node_modules/moment"))?;
    fs::write(root.join("lib/server.js"), "const express = require('express');\n")?;
    fs::write(
        root.join("node_modules/moment/index.js"),
        "module.exports = require('moment');\n",
    )?;
    Manifest::load(root)
}

fn run(root: &Path, pm: &FakePackageManager, answer: FixedAnswer) -> Result<(Outcome, String)> {
    let manifest = write_project(root)?;
    let pruner = Pruner::new(root, manifest, Config::default(), pm);
    let mut prompt = answer;
    let mut out = Vec::new();
    let outcome = pruner.run(RunOptions::default(), &mut prompt, &mut out)?;
    Ok((outcome, String::from_utf8(out)?))
}

#[test]
fn listing_puts_local_before_global() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let pm = FakePackageManager::new().with_global_json(GLOBALS);
    let manifest = write_project(temp.path())?;
    let pruner = Pruner::new(temp.path(), manifest, Config::default(), &pm);

    let listing = pruner.listing(true)?;
    assert_eq!(listing.unused, vec!["moment", "uuid", "mocha"]);
    assert_eq!(listing.global, vec!["nodemon", "serve"]);
    Ok(())
}

#[test]
fn numbered_selection_partitions_local_then_global() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let pm = FakePackageManager::new().with_global_json(GLOBALS);
    let (outcome, text) = run(temp.path(), &pm, FixedAnswer::new("5, 1"))?;

    assert_eq!(
        pm.calls(),
        vec![
            ("moment".to_string(), Scope::Local),
            ("serve".to_string(), Scope::Global),
        ]
    );
    let Outcome::Removed(reports) = outcome else {
        panic!("expected a removal outcome");
    };
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].scope, Scope::Local);
    assert_eq!(reports[1].scope, Scope::Global);
    assert!(text.contains("4. nodemon [global]"));
    assert!(text.contains("✔ removed serve (global)"));
    Ok(())
}

#[test]
fn all_removes_every_entry_in_order() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let pm = FakePackageManager::new().with_global_json(GLOBALS);
    run(temp.path(), &pm, FixedAnswer::new("All"))?;

    let names: Vec<_> = pm.calls().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["moment", "uuid", "mocha", "nodemon", "serve"]);
    Ok(())
}

#[test]
fn only_local_selection_skips_global_summary() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let pm = FakePackageManager::new().with_global_json(GLOBALS);
    let (_, text) = run(temp.path(), &pm, FixedAnswer::new("2"))?;

    assert!(text.contains("Finished removing 1 local package(s)"));
    assert!(!text.contains("global package(s)"));
    Ok(())
}

#[test]
fn invalid_or_missing_answer_removes_nothing() -> Result<()> {
    for answer in [FixedAnswer::new("nope"), FixedAnswer::new("42"), FixedAnswer::none()] {
        let temp = tempfile::tempdir()?;
        let pm = FakePackageManager::new().with_global_json(GLOBALS);
        let (outcome, text) = run(temp.path(), &pm, answer)?;

        assert_eq!(outcome, Outcome::InvalidSelection);
        assert!(text.ends_with(&format!("{INVALID_INPUT}\n")));
        assert!(pm.calls().is_empty());
    }
    Ok(())
}

#[test]
fn failing_global_listing_still_offers_local_entries() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let pm = FakePackageManager::new();
    let (_, text) = run(temp.path(), &pm, FixedAnswer::none())?;

    assert!(text.contains("3. mocha"));
    assert!(!text.contains("[global]"));
    Ok(())
}

#[test]
fn nothing_to_do_skips_prompt() -> Result<()> {
    let temp = tempfile::tempdir()?;
    fs::write(
        temp.path().join("package.json"),
        r#"{"devDependencies": {"@types/node": "20"}}"#,
    )?;
    let manifest = Manifest::load(temp.path())?;
    let pm = FakePackageManager::new().with_global_json("{}");
    let pruner = Pruner::new(temp.path(), manifest, Config::default(), &pm);

    let mut prompt = FixedAnswer::new("all");
    let mut out = Vec::new();
    let outcome = pruner.run(RunOptions::default(), &mut prompt, &mut out)?;

    assert_eq!(outcome, Outcome::NothingToDo);
    assert_eq!(String::from_utf8(out)?, format!("{NOTHING_TO_DO}\n"));
    assert!(pm.calls().is_empty());
    Ok(())
}
