//! Editor hook events and their exit-code contract.

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::dispatch::normalize;
use crate::core::error::Error;
use std::path::{Component, Path, PathBuf};

/// Exit code every check hook returns once checks have run.
///
/// The host only surfaces hook output for this code, so it is used for
/// both passing and failing runs; the summary text carries the outcome.
pub const SENTINEL_EXIT_CODE: u8 = 2;

/// Environment variable that disables every hook.
pub const SKIP_ENV_VAR: &str = "STACKCHECK_SKIP";

/// Environment variable the host sets to the project directory.
pub const PROJECT_DIR_ENV_VAR: &str = "CLAUDE_PROJECT_DIR";

/// Lifecycle events stackcheck installs hooks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Before a file is edited or written.
    PreWrite,
    /// After a file is edited.
    PostEdit,
    /// After a file is written.
    PostWrite,
}

impl HookEvent {
    /// All events, in settings order.
    pub const ALL: [Self; 3] = [Self::PreWrite, Self::PostEdit, Self::PostWrite];

    /// Returns the command-line name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PreWrite => "pre-write",
            Self::PostEdit => "post-edit",
            Self::PostWrite => "post-write",
        }
    }

    /// Returns the host lifecycle event this hook is registered under.
    #[must_use]
    pub const fn host_event(&self) -> &'static str {
        match self {
            Self::PreWrite => "PreToolUse",
            Self::PostEdit | Self::PostWrite => "PostToolUse",
        }
    }

    /// Returns the host tool matcher for this hook.
    #[must_use]
    pub const fn matcher(&self) -> &'static str {
        match self {
            Self::PreWrite => "Edit|Write|MultiEdit",
            Self::PostEdit => "Edit|MultiEdit",
            Self::PostWrite => "Write",
        }
    }

    /// Returns the generated script that handles this event.
    #[must_use]
    pub const fn script_name(&self) -> &'static str {
        match self {
            Self::PreWrite => "pre-write.sh",
            Self::PostEdit | Self::PostWrite => "post-edit.sh",
        }
    }

    /// Returns true for events that run command groups.
    #[must_use]
    pub const fn runs_checks(&self) -> bool {
        matches!(self, Self::PostEdit | Self::PostWrite)
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for HookEvent {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pre-write" => Ok(Self::PreWrite),
            "post-edit" => Ok(Self::PostEdit),
            "post-write" => Ok(Self::PostWrite),
            _ => Err(Error::UnknownHookEvent {
                name: s.to_string(),
            }),
        }
    }
}

/// Returns the protected entry that `path` falls under, if any.
///
/// Entries ending in `/` match a directory name anywhere below the root;
/// other entries match the file name exactly.
#[must_use]
pub fn protected_match<'a>(path: &Path, root: &Path, protected: &'a [String]) -> Option<&'a str> {
    let path = if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    };
    let relative = path.strip_prefix(normalize(root)).unwrap_or(&path);

    let dirs: Vec<&std::ffi::OsStr> = relative
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    let file_name = relative.file_name();

    protected.iter().map(String::as_str).find(|entry| {
        entry.strip_suffix('/').map_or_else(
            || file_name.is_some_and(|f| f == *entry),
            |dir| dirs.iter().any(|d| *d == dir),
        )
    })
}

/// Works out the project root for an invocation.
///
/// An explicit root wins. Otherwise the search starts at the host's project
/// directory, then the payload's working directory, then `cwd`, and climbs
/// to the nearest directory holding a configuration file.
#[must_use]
pub fn locate_root(
    explicit: Option<&Path>,
    host_dir: Option<&Path>,
    payload_cwd: Option<&Path>,
    cwd: &Path,
) -> PathBuf {
    if let Some(root) = explicit {
        return absolutize(root, cwd);
    }

    let start = absolutize(host_dir.or(payload_cwd).unwrap_or(cwd), cwd);

    match Config::find_config_file_from(&start) {
        Ok(config_path) => config_path
            .parent()
            .map_or_else(|| start.clone(), Path::to_path_buf),
        Err(_) => start,
    }
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&cwd.join(path))
    }
}

/// Path of the configuration file a root would use.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}
