//! Globally installed package discovery.

use crate::infra::npm::{GlobalTree, PackageManager, PmResult};

/// Names of globally installed top-level packages, in package-manager order.
///
/// Any failure is logged and yields an empty list.
pub fn list_global_packages(pm: &dyn PackageManager) -> Vec<String> {
    match fetch(pm) {
        Ok(names) => names,
        Err(err) => {
            tracing::error!(error = %err, "failed to list global packages");
            Vec::new()
        }
    }
}

fn fetch(pm: &dyn PackageManager) -> PmResult<Vec<String>> {
    let raw = pm.list_global()?;
    Ok(GlobalTree::parse(&raw)?.names())
}
