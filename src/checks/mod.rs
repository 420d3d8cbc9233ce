//! Command groups and tooling availability.
//!
//! A group whose tooling is absent (no Pint binary, no `lint` script) is
//! skipped rather than failed.

pub mod builtin;

use crate::config::{EnabledCondition, GroupConfig};
use crate::core::executor::Executor;
use std::path::Path;

/// Returns `None` if the group can run in `dir`, or the reason it cannot.
#[must_use]
pub fn unavailable_reason(group: &GroupConfig, dir: &Path) -> Option<String> {
    let condition = group.enabled_if.as_ref()?;
    check_condition(condition, dir)
}

fn check_condition(condition: &EnabledCondition, dir: &Path) -> Option<String> {
    if let Some(ref path) = condition.file_exists {
        if !dir.join(path).exists() {
            return Some(format!("{path} not found"));
        }
    }

    if let Some(ref cmd) = condition.command_exists {
        if !Executor::command_exists(cmd) {
            return Some(format!("{cmd} not on PATH"));
        }
    }

    if let Some(ref script) = condition.npm_script {
        if !has_npm_script(dir, script) {
            return Some(format!("no \"{script}\" script in package.json"));
        }
    }

    None
}

/// Returns true if `dir/package.json` defines `script`.
#[must_use]
pub fn has_npm_script(dir: &Path, script: &str) -> bool {
    let Ok(content) = std::fs::read_to_string(dir.join("package.json")) else {
        return false;
    };

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(manifest) => manifest
            .get("scripts")
            .and_then(|s| s.get(script))
            .and_then(|s| s.as_str())
            .is_some_and(|s| !s.trim().is_empty()),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Unreadable package.json");
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::Role;
    use tempfile::TempDir;

    fn group(condition: EnabledCondition) -> GroupConfig {
        GroupConfig::new("g", Role::Frontend, "true").enabled_if(condition)
    }

    #[test]
    fn test_no_condition_is_available() {
        let temp = TempDir::new().expect("create temp dir");
        let g = GroupConfig::new("g", Role::Api, "true");
        assert_eq!(unavailable_reason(&g, temp.path()), None);
    }

    #[test]
    fn test_file_exists_condition() {
        let temp = TempDir::new().expect("create temp dir");
        let g = group(EnabledCondition {
            file_exists: Some("phpstan.neon".to_string()),
            ..Default::default()
        });

        assert_eq!(
            unavailable_reason(&g, temp.path()),
            Some("phpstan.neon not found".to_string())
        );

        std::fs::write(temp.path().join("phpstan.neon"), "").expect("write");
        assert_eq!(unavailable_reason(&g, temp.path()), None);
    }

    #[test]
    fn test_command_exists_condition() {
        let temp = TempDir::new().expect("create temp dir");
        let g = group(EnabledCondition {
            command_exists: Some("definitely_not_a_command_12345".to_string()),
            ..Default::default()
        });
        assert!(unavailable_reason(&g, temp.path()).is_some());
    }

    #[test]
    fn test_npm_script_condition() {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::write(
            temp.path().join("package.json"),
            r#"{ "scripts": { "lint": "eslint .", "test": "" } }"#,
        )
        .expect("write");

        assert!(has_npm_script(temp.path(), "lint"));
        assert!(!has_npm_script(temp.path(), "test"));
        assert!(!has_npm_script(temp.path(), "build"));
    }

    #[test]
    fn test_npm_script_without_manifest() {
        let temp = TempDir::new().expect("create temp dir");
        assert!(!has_npm_script(temp.path(), "lint"));
    }

    #[test]
    fn test_npm_script_with_broken_manifest() {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::write(temp.path().join("package.json"), "{ nope").expect("write");
        assert!(!has_npm_script(temp.path(), "lint"));
    }
}
