//! Dispatch policy: which roles to check after an edit.

use crate::core::resolver::{ResolvedProject, Role};
use std::path::{Component, Path, PathBuf};

/// What caused a dispatch decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// No edited file was supplied; everything runs.
    Everything,
    /// A specific file was edited.
    EditedFile(PathBuf),
}

/// Which command groups should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchDecision {
    /// Run the API command groups.
    pub run_api: bool,
    /// Run the frontend command groups.
    pub run_frontend: bool,
    /// What the decision was computed from.
    pub trigger: Trigger,
}

impl DispatchDecision {
    /// Returns whether groups for `role` should run.
    #[must_use]
    pub const fn runs(&self, role: Role) -> bool {
        match role {
            Role::Api => self.run_api,
            Role::Frontend => self.run_frontend,
        }
    }

    /// Returns true if nothing should run.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.run_api && !self.run_frontend
    }

    /// Roles selected by this decision, in invocation order.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.runs(*role))
    }
}

/// Decides which roles to check for an optional edited file.
///
/// Without a file everything runs. With a file, a role runs only when the
/// file sits under that role's resolved directory. Relative paths are taken
/// relative to the project root. Paths are compared component by component
/// after lexical normalization; symlinks are not resolved.
#[must_use]
pub fn decide(edited: Option<&Path>, project: &ResolvedProject) -> DispatchDecision {
    let Some(edited) = edited else {
        return DispatchDecision {
            run_api: true,
            run_frontend: true,
            trigger: Trigger::Everything,
        };
    };

    let path = if edited.is_absolute() {
        normalize(edited)
    } else {
        normalize(&project.root().join(edited))
    };

    let under = |dir: Option<&Path>| dir.is_some_and(|d| path.starts_with(d));

    DispatchDecision {
        run_api: under(project.api_dir()),
        run_frontend: under(project.frontend_dir()),
        trigger: Trigger::EditedFile(path),
    }
}

/// Lexically normalizes a path, dropping `.` and folding `..`.
///
/// This never touches the filesystem. A `..` at the root stays at the root.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
