//! Configuration handling for stackcheck.
//!
//! This module provides configuration loading and validation,
//! supporting both `stackcheck.toml` files and sensible defaults.

use crate::checks::builtin;
use crate::core::error::{Error, Result};
use crate::core::resolver::Role;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "stackcheck.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hook behaviour.
    pub hook: HookConfig,
    /// Role detection settings.
    pub roles: RolesConfig,
    /// Command groups, in invocation order within each role.
    pub groups: Vec<GroupConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hook: HookConfig::default(),
            roles: RolesConfig::default(),
            groups: builtin::default_groups(),
        }
    }
}

impl Config {
    /// Loads configuration found at or above `start`, or returns defaults.
    pub fn load_or_default_from(start: &Path) -> Result<Self> {
        match Self::find_config_file_from(start) {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree from `start`.
    pub fn find_config_file_from(start: &Path) -> Result<PathBuf> {
        let mut current = start;
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::ConfigNotFound {
            path: start.join(CONFIG_FILE_NAME),
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.roles.api.validate("roles.api")?;
        self.roles.frontend.validate("roles.frontend")?;

        let mut seen = HashSet::new();
        for (i, group) in self.groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(Error::config_invalid(
                    format!("groups[{i}].name"),
                    "must not be empty",
                ));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(Error::config_invalid(
                    format!("groups[{i}].name"),
                    format!("duplicate group name: {}", group.name),
                ));
            }
            if group.run.trim().is_empty() {
                return Err(Error::config_invalid(
                    format!("groups.{}.run", group.name),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Returns the groups for a role, in invocation order.
    pub fn groups_for(&self, role: Role) -> impl Iterator<Item = &GroupConfig> {
        self.groups.iter().filter(move |g| g.role == role)
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Generates default configuration as a string.
    #[must_use]
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Returns a configuration pinned to explicit directory names.
    ///
    /// A pinned role tries only the given name, so later hook runs resolve
    /// exactly the directories chosen at install time.
    #[must_use]
    pub fn pinned(api_dir: Option<&str>, frontend_dir: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = api_dir {
            config.roles.api.candidates = vec![dir.to_string()];
        }
        if let Some(dir) = frontend_dir {
            config.roles.frontend.candidates = vec![dir.to_string()];
        }
        config
    }
}

/// Hook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Paths the pre-write hook refuses to let an agent modify.
    ///
    /// Entries ending in `/` match a directory at any depth; other entries
    /// match a file name exactly.
    pub protected_paths: Vec<String>,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            protected_paths: vec![
                ".env".to_string(),
                "vendor/".to_string(),
                "node_modules/".to_string(),
                "composer.lock".to_string(),
                "package-lock.json".to_string(),
            ],
        }
    }
}

/// Role detection settings for both roles.
///
/// Fields left out of a `[roles.*]` table keep that role's built-in values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PartialRolesConfig")]
pub struct RolesConfig {
    /// How to find the API directory.
    pub api: RoleSpec,
    /// How to find the frontend directory.
    pub frontend: RoleSpec,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            api: RoleSpec {
                candidates: strings(&["api", "backend", "laravel-api", "server"]),
                markers: strings(&["artisan", "composer.json"]),
            },
            frontend: RoleSpec {
                candidates: strings(&["webapp", "frontend", "client", "vue-app", "web", "app"]),
                markers: strings(&["package.json"]),
            },
        }
    }
}

/// How to find the directory for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSpec {
    /// Directory names to try, highest priority first.
    pub candidates: Vec<String>,
    /// Files that must all exist in a candidate for it to qualify.
    pub markers: Vec<String>,
}

/// `[roles]` as written in the file, before defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialRolesConfig {
    api: PartialRoleSpec,
    frontend: PartialRoleSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialRoleSpec {
    candidates: Option<Vec<String>>,
    markers: Option<Vec<String>>,
}

impl PartialRoleSpec {
    fn or(self, defaults: RoleSpec) -> RoleSpec {
        RoleSpec {
            candidates: self.candidates.unwrap_or(defaults.candidates),
            markers: self.markers.unwrap_or(defaults.markers),
        }
    }
}

impl From<PartialRolesConfig> for RolesConfig {
    fn from(partial: PartialRolesConfig) -> Self {
        let defaults = Self::default();
        Self {
            api: partial.api.or(defaults.api),
            frontend: partial.frontend.or(defaults.frontend),
        }
    }
}

impl RoleSpec {
    fn validate(&self, field: &str) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(Error::config_invalid(
                format!("{field}.candidates"),
                "must not be empty",
            ));
        }
        if self.markers.is_empty() {
            return Err(Error::config_invalid(
                format!("{field}.markers"),
                "must not be empty",
            ));
        }

        let relative = relative_path_pattern()?;
        for name in self.candidates.iter().chain(&self.markers) {
            if !relative.is_match(name) {
                return Err(Error::config_invalid(
                    field,
                    format!("not a relative path inside the project: {name}"),
                ));
            }
        }

        Ok(())
    }
}

/// Matches `a`, `a/b`, `laravel-api`; rejects absolute paths, `..` and empties.
fn relative_path_pattern() -> Result<Regex> {
    Regex::new(r"^(?:[A-Za-z0-9_][A-Za-z0-9._-]*)(?:/[A-Za-z0-9_][A-Za-z0-9._-]*)*$").map_err(
        |e| Error::Internal {
            message: format!("invalid path pattern: {e}"),
        },
    )
}

/// Configuration for a single command group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Group identifier, e.g. `api-test`.
    pub name: String,
    /// Role whose directory the command runs in.
    pub role: Role,
    /// Command to run.
    pub run: String,
    /// Human-readable description.
    pub description: String,
    /// Condition for the group's tooling being present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_if: Option<EnabledCondition>,
    /// Environment variables to set.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: Role::Api,
            run: String::new(),
            description: String::new(),
            enabled_if: None,
            env: HashMap::new(),
        }
    }
}

impl GroupConfig {
    /// Creates a group that always runs.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role, run: impl Into<String>) -> Self {
        let run = run.into();
        Self {
            name: name.into(),
            role,
            description: run.clone(),
            run,
            enabled_if: None,
            env: HashMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the enabling condition.
    #[must_use]
    pub fn enabled_if(mut self, condition: EnabledCondition) -> Self {
        self.enabled_if = Some(condition);
        self
    }
}

/// Condition for a group's tooling being present.
///
/// Relative paths are resolved against the role directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EnabledCondition {
    /// A file that must exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_exists: Option<String>,
    /// A command that must be on PATH.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_exists: Option<String>,
    /// A script that must be defined in `package.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_script: Option<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.groups.is_empty());
    }

    #[test]
    fn test_default_role_specs() {
        let roles = RolesConfig::default();
        assert_eq!(
            roles.api.candidates,
            vec!["api", "backend", "laravel-api", "server"]
        );
        assert_eq!(
            roles.frontend.candidates,
            vec!["webapp", "frontend", "client", "vue-app", "web", "app"]
        );
    }

    #[test]
    fn test_groups_for_role_keeps_order() {
        let config = Config::default();
        let api: Vec<_> = config.groups_for(Role::Api).map(|g| g.name.as_str()).collect();
        assert_eq!(
            api,
            vec![
                builtin::names::API_LINT,
                builtin::names::API_REFACTOR,
                builtin::names::API_ANALYSE,
                builtin::names::API_TEST,
            ]
        );
        let frontend: Vec<_> = config
            .groups_for(Role::Frontend)
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(
            frontend,
            vec![builtin::names::FRONTEND_LINT, builtin::names::FRONTEND_TEST]
        );
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let mut config = Config::default();
        config.roles.api.candidates.clear();
        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("roles.api.candidates"));
    }

    #[test]
    fn test_empty_markers_rejected() {
        let mut config = Config::default();
        config.roles.frontend.markers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_escaping_candidate_rejected() {
        for bad in ["../api", "/srv/api", "", "api/../x"] {
            let mut config = Config::default();
            config.roles.api.candidates = vec![bad.to_string()];
            assert!(config.validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_nested_candidate_accepted() {
        let mut config = Config::default();
        config.roles.api.candidates = vec!["services/laravel-api".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut config = Config::default();
        config.groups.push(GroupConfig::new("api-test", Role::Api, "true"));
        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_run_rejected() {
        let mut config = Config::default();
        config.groups.push(GroupConfig::new("noop", Role::Api, "  "));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_groups_from_toml() {
        let config: Config = toml::from_str(
            r#"
[[groups]]
name = "api-check"
role = "api"
run = "composer check"

[[groups]]
name = "web-lint"
role = "frontend"
run = "pnpm lint"
enabled_if = { npm_script = "lint" }
"#,
        )
        .expect("parse");

        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[1].role, Role::Frontend);
        assert_eq!(
            config.groups[1].enabled_if,
            Some(EnabledCondition {
                npm_script: Some("lint".to_string()),
                ..Default::default()
            })
        );
        // Unspecified sections keep their defaults.
        assert_eq!(config.roles, RolesConfig::default());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml = Config::default_toml();
        assert!(toml.contains("[roles.api]"));
        assert!(toml.contains("[[groups]]"));
        let parsed: Config = toml::from_str(&toml).expect("reparse");
        assert_eq!(parsed.groups.len(), Config::default().groups.len());
    }

    #[test]
    fn test_pinned_config() {
        let config = Config::pinned(Some("laravel"), None);
        assert_eq!(config.roles.api.candidates, vec!["laravel"]);
        assert_eq!(
            config.roles.frontend.candidates,
            RolesConfig::default().frontend.candidates
        );
    }

    #[test]
    fn test_find_config_file_searches_upwards() {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "").expect("write config");
        let nested = temp.path().join("api/app/Models");
        std::fs::create_dir_all(&nested).expect("mkdir");

        let found = Config::find_config_file_from(&nested).expect("find");
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().expect("create temp dir");
        let config = Config::load_or_default_from(temp.path()).expect("load");
        assert_eq!(config.roles, RolesConfig::default());
    }

    #[test]
    fn test_load_from_rejects_invalid() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[roles.api]\ncandidates = []\n").expect("write");
        assert!(matches!(
            Config::load_from(&path),
            Err(Error::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_partial_role_table_keeps_other_defaults() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[roles.api]\ncandidates = [\"laravel\"]\n").expect("write");

        let config = Config::load_from(&path).expect("load");

        assert_eq!(config.roles.api.candidates, vec!["laravel"]);
        assert_eq!(config.roles.api.markers, vec!["artisan", "composer.json"]);
        assert_eq!(config.roles.frontend, RolesConfig::default().frontend);
    }

    #[test]
    fn test_partial_role_table_markers_only() {
        let config: Config =
            toml::from_str("[roles.frontend]\nmarkers = [\"vite.config.ts\"]\n").expect("parse");
        assert_eq!(config.roles.frontend.markers, vec!["vite.config.ts"]);
        assert_eq!(
            config.roles.frontend.candidates,
            RolesConfig::default().frontend.candidates
        );
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[[groups]\n").expect("write");
        assert!(matches!(
            Config::load_from(&path),
            Err(Error::ConfigParse { .. })
        ));
    }
}
