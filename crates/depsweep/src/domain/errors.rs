//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid selection")]
    InvalidSelection,
    #[error("no package.json found in {}", .0.display())]
    ManifestNotFound(PathBuf),
}
