//! Manifest script scanning.

use crate::infra::manifest::Manifest;

/// True when any `scripts` command mentions `name` as a substring, e.g. `eslint` in
/// `"lint": "eslint src"`.
pub fn mentioned_in_scripts(manifest: &Manifest, name: &str) -> bool {
    manifest
        .script_commands()
        .any(|command| command.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{"scripts": {"build": "tsc -p . && rollup -c", "dev": "nodemon server.js", "n": 3}}"#,
        )
        .expect("valid manifest")
    }

    #[test]
    fn finds_binaries_used_by_scripts() {
        let manifest = manifest();
        assert!(mentioned_in_scripts(&manifest, "rollup"));
        assert!(mentioned_in_scripts(&manifest, "nodemon"));
        assert!(!mentioned_in_scripts(&manifest, "webpack"));
    }

    #[test]
    fn substring_matching_is_loose() {
        // "server" is not a dependency binary, but the text contains it.
        assert!(mentioned_in_scripts(&manifest(), "server"));
    }

    #[test]
    fn no_scripts_means_no_mentions() {
        assert!(!mentioned_in_scripts(&Manifest::default(), "rollup"));
    }
}
