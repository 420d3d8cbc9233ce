//! Error types for stackcheck.
//!
//! This module defines all errors that can occur during operation.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in stackcheck.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // Project resolution errors
    // =========================================================================
    /// Neither the API nor the frontend role resolved to a directory.
    #[error(
        "No API or frontend directory found under {root}\n  API candidates tried: {}\n  Frontend candidates tried: {}",
        .api_candidates.join(", "),
        .frontend_candidates.join(", ")
    )]
    NoRolesResolved {
        /// Project root that was searched.
        root: PathBuf,
        /// Candidate names tried for the API role.
        api_candidates: Vec<String>,
        /// Candidate names tried for the frontend role.
        frontend_candidates: Vec<String>,
    },

    /// A directory named explicitly on the command line does not exist.
    #[error("{role} directory not found: {path}")]
    RoleDirMissing {
        /// Role the directory was supposed to fill.
        role: String,
        /// Path that was checked.
        path: PathBuf,
    },

    /// A directory named explicitly on the command line lacks the role's markers.
    #[error(
        "{role} directory {path} is missing required files: {}",
        .missing.join(", ")
    )]
    RoleDirUnqualified {
        /// Role the directory was supposed to fill.
        role: String,
        /// Path that was checked.
        path: PathBuf,
        /// Marker files that were not found.
        missing: Vec<String>,
    },

    /// Project root does not exist or is not a directory.
    #[error("Project root is not a directory: {path}")]
    InvalidRoot {
        /// Path that was given as the root.
        path: PathBuf,
    },

    // =========================================================================
    // Hook errors
    // =========================================================================
    /// Unknown hook event name.
    #[error("Unknown hook event: {name}. Expected: pre-write, post-edit, or post-write")]
    UnknownHookEvent {
        /// The name that was given.
        name: String,
    },

    /// A generated file already exists and was not written by us.
    #[error("{path} already exists and was not created by stackcheck. Use --force to overwrite.")]
    ArtifactExists {
        /// Path to the existing file.
        path: PathBuf,
    },

    /// Settings file has an unexpected shape.
    #[error("Settings file {path} is malformed: {message}")]
    SettingsMalformed {
        /// Path to the settings file.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },

    // =========================================================================
    // Command group errors
    // =========================================================================
    /// Command group not found in configuration.
    #[error("Command group not found: {name}")]
    GroupNotFound {
        /// Name of the group that wasn't found.
        name: String,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration validation error.
    pub fn config_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns an exit code appropriate for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::NoRolesResolved { .. }
            | Self::SettingsMalformed { .. } => 78, // EX_CONFIG
            Self::RoleDirMissing { .. }
            | Self::RoleDirUnqualified { .. }
            | Self::InvalidRoot { .. } => 66, // EX_NOINPUT
            Self::UnknownHookEvent { .. } => 64,                         // EX_USAGE
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_roles() -> Error {
        Error::NoRolesResolved {
            root: PathBuf::from("/proj"),
            api_candidates: vec!["api".into(), "backend".into()],
            frontend_candidates: vec!["webapp".into()],
        }
    }

    // =========================================================================
    // Display tests
    // =========================================================================

    #[test]
    fn test_display_config_not_found() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("/my/stackcheck.toml"),
        };
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /my/stackcheck.toml"
        );
    }

    #[test]
    fn test_display_config_invalid() {
        let err = Error::config_invalid("roles.api.candidates", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: roles.api.candidates - must not be empty"
        );
    }

    #[test]
    fn test_display_no_roles_lists_candidates() {
        let msg = no_roles().to_string();
        assert!(msg.contains("/proj"));
        assert!(msg.contains("API candidates tried: api, backend"));
        assert!(msg.contains("Frontend candidates tried: webapp"));
    }

    #[test]
    fn test_display_role_dir_missing() {
        let err = Error::RoleDirMissing {
            role: "API".into(),
            path: PathBuf::from("/proj/nope"),
        };
        assert_eq!(err.to_string(), "API directory not found: /proj/nope");
    }

    #[test]
    fn test_display_unknown_hook_event() {
        let err = Error::UnknownHookEvent {
            name: "pre-commit".into(),
        };
        assert!(err.to_string().contains("pre-commit"));
        assert!(err.to_string().contains("post-edit"));
    }

    #[test]
    fn test_display_artifact_exists() {
        let err = Error::ArtifactExists {
            path: PathBuf::from("CLAUDE.md"),
        };
        assert_eq!(
            err.to_string(),
            "CLAUDE.md already exists and was not created by stackcheck. Use --force to overwrite."
        );
    }

    #[test]
    fn test_display_io() {
        let err = Error::io("read config", std::io::Error::other("file not found"));
        assert_eq!(err.to_string(), "I/O error: read config");
    }

    // =========================================================================
    // Constructor and source chain tests
    // =========================================================================

    #[test]
    fn test_config_parse_with_source_has_source() {
        use std::error::Error as StdError;
        let toml_err = toml::from_str::<toml::Value>("bad [[[").expect_err("should fail");
        let err = Error::config_parse_with_source("bad toml", toml_err);
        assert!(err.source().is_some());
    }

    // =========================================================================
    // Exit code and classification tests
    // =========================================================================

    #[test]
    fn test_exit_code_config_errors() {
        assert_eq!(Error::config_invalid("a", "b").exit_code(), 78);
        assert_eq!(no_roles().exit_code(), 78);
    }

    #[test]
    fn test_exit_code_missing_input() {
        let err = Error::InvalidRoot {
            path: PathBuf::from("x"),
        };
        assert_eq!(err.exit_code(), 66);
    }

    #[test]
    fn test_display_role_dir_unqualified() {
        let err = Error::RoleDirUnqualified {
            role: "API".into(),
            path: PathBuf::from("/proj/laravel"),
            missing: vec!["artisan".into(), "composer.json".into()],
        };
        assert_eq!(
            err.to_string(),
            "API directory /proj/laravel is missing required files: artisan, composer.json"
        );
        assert_eq!(err.exit_code(), 66);
    }

    #[test]
    fn test_exit_code_usage() {
        let err = Error::UnknownHookEvent { name: "x".into() };
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_exit_code_other() {
        assert_eq!(Error::io("x", std::io::Error::other("y")).exit_code(), 1);
        assert_eq!(
            Error::Internal {
                message: "x".into()
            }
            .exit_code(),
            1
        );
    }
}
