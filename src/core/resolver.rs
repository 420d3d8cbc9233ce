//! Project role resolution.
//!
//! A project is split into up to two halves: a Laravel API and a frontend
//! application. The resolver finds the directory that plays each role by
//! probing an ordered list of candidate names and checking each candidate
//! for the role's marker files.

use crate::config::{RoleSpec, RolesConfig};
use crate::core::dispatch::normalize;
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One of the two functional halves of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Laravel API backend.
    Api,
    /// Frontend application.
    Frontend,
}

impl Role {
    /// All roles, in invocation order.
    pub const ALL: [Self; 2] = [Self::Api, Self::Frontend];

    /// Returns the lowercase name used in configuration files.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Frontend => "frontend",
        }
    }

    /// Returns the label used in user-facing output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Frontend => "Frontend",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "frontend" => Ok(Self::Frontend),
            _ => Err(format!("Invalid role: {s}. Expected: api or frontend")),
        }
    }
}

/// Outcome of resolving a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
    root: PathBuf,
    api_dir: Option<PathBuf>,
    frontend_dir: Option<PathBuf>,
}

impl ResolvedProject {
    /// Builds a resolved project from already-known directories.
    #[must_use]
    pub fn new(root: PathBuf, api_dir: Option<PathBuf>, frontend_dir: Option<PathBuf>) -> Self {
        Self {
            root: normalize(&root),
            api_dir: api_dir.map(|p| normalize(&p)),
            frontend_dir: frontend_dir.map(|p| normalize(&p)),
        }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// API directory, if one was found.
    #[must_use]
    pub fn api_dir(&self) -> Option<&Path> {
        self.api_dir.as_deref()
    }

    /// Frontend directory, if one was found.
    #[must_use]
    pub fn frontend_dir(&self) -> Option<&Path> {
        self.frontend_dir.as_deref()
    }

    /// Directory for the given role.
    #[must_use]
    pub fn dir(&self, role: Role) -> Option<&Path> {
        match role {
            Role::Api => self.api_dir(),
            Role::Frontend => self.frontend_dir(),
        }
    }

    /// Returns true if neither role resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_dir.is_none() && self.frontend_dir.is_none()
    }
}

/// Resolves roles for a project root using an explicit configuration.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    roles: &'a RolesConfig,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over the given role specifications.
    #[must_use]
    pub const fn new(roles: &'a RolesConfig) -> Self {
        Self { roles }
    }

    /// Resolves both roles under `root`.
    ///
    /// Roles resolve independently; a role with no qualifying candidate is
    /// left empty rather than reported as an error.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> ResolvedProject {
        let api_dir = first_qualifying(root, &self.roles.api);
        let frontend_dir = first_qualifying(root, &self.roles.frontend);

        tracing::debug!(
            root = %root.display(),
            api = ?api_dir,
            frontend = ?frontend_dir,
            "Resolved project roles"
        );

        ResolvedProject::new(root.to_path_buf(), api_dir, frontend_dir)
    }

    /// Resolves both roles and fails if neither is found.
    ///
    /// Used by the installer, where a project with no recognizable half
    /// cannot be configured.
    pub fn resolve_for_install(&self, root: &Path) -> Result<ResolvedProject> {
        if !root.is_dir() {
            return Err(Error::InvalidRoot {
                path: root.to_path_buf(),
            });
        }

        let project = self.resolve(root);
        if project.is_empty() {
            return Err(Error::NoRolesResolved {
                root: root.to_path_buf(),
                api_candidates: self.roles.api.candidates.clone(),
                frontend_candidates: self.roles.frontend.candidates.clone(),
            });
        }

        Ok(project)
    }

    /// Returns the detection settings for a role.
    #[must_use]
    pub fn spec(&self, role: Role) -> &RoleSpec {
        match role {
            Role::Api => &self.roles.api,
            Role::Frontend => &self.roles.frontend,
        }
    }
}

/// Returns the first candidate under `root` that holds every marker.
fn first_qualifying(root: &Path, spec: &RoleSpec) -> Option<PathBuf> {
    spec.candidates
        .iter()
        .map(|name| root.join(name))
        .find(|dir| qualifies(dir, spec))
}

/// Returns true if `dir` is a directory holding every marker file.
#[must_use]
pub fn qualifies(dir: &Path, spec: &RoleSpec) -> bool {
    dir.is_dir() && spec.markers.iter().all(|marker| dir.join(marker).is_file())
}
