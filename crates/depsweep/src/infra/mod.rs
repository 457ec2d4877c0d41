//! Infrastructure adapters for config, logging, manifests, and the package manager.

pub mod config;
pub mod logging;
pub mod manifest;
pub mod npm;
pub mod prompt;
