//! Scaffolding of hook configuration into a project.
//!
//! Installation is planned in full before anything touches the disk: roles
//! are resolved, every file is rendered, and conflicts are checked. Only a
//! plan that passes all of that is written.

pub mod settings;
pub mod templates;

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::error::{Error, Result};
use crate::core::hook::HookEvent;
use crate::core::resolver::{ResolvedProject, Resolver, Role};
use std::path::{Path, PathBuf};

/// Host configuration directory, relative to the project root.
pub const CLAUDE_DIR: &str = ".claude";

/// Settings file, relative to the project root.
pub const SETTINGS_FILE: &str = ".claude/settings.json";

/// Commands directory, relative to the project root.
pub const COMMANDS_DIR: &str = ".claude/commands";

/// Guidance document, relative to the project root.
pub const GUIDANCE_FILE: &str = "CLAUDE.md";

/// What a generated file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Host settings, merged rather than replaced.
    Settings,
    /// Executable hook script.
    Script,
    /// Guidance or command document.
    Document,
    /// stackcheck configuration.
    Config,
}

impl ArtifactKind {
    /// Marker that identifies a file we generated.
    #[must_use]
    pub const fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Settings => None,
            Self::Script => Some(templates::SCRIPT_MARKER),
            Self::Document => Some(templates::DOC_MARKER),
            Self::Config => Some(templates::CONFIG_MARKER),
        }
    }
}

/// A file the installer will write.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
    /// Kind of file.
    pub kind: ArtifactKind,
}

impl Artifact {
    fn new(path: impl Into<PathBuf>, contents: String, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            contents,
            kind,
        }
    }
}

/// Options for installation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Overwrite files we did not generate.
    pub force: bool,
    /// Skip the guidance document.
    pub no_docs: bool,
}

/// Directory names given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ExplicitDirs {
    /// API directory name.
    pub api: Option<String>,
    /// Frontend directory name.
    pub frontend: Option<String>,
}

impl ExplicitDirs {
    /// Returns true if no directory was given.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.api.is_none() && self.frontend.is_none()
    }
}

/// Fully rendered installation, not yet written.
#[derive(Debug)]
pub struct InstallPlan {
    root: PathBuf,
    project: ResolvedProject,
    config: Config,
    artifacts: Vec<Artifact>,
}

impl InstallPlan {
    /// Resolves roles and renders every artifact.
    ///
    /// Fails before anything is written if no role resolves, or if an
    /// explicit directory is missing or lacks its role's markers.
    pub fn new(
        root: &Path,
        base: Option<Config>,
        dirs: &ExplicitDirs,
        options: InstallOptions,
    ) -> Result<Self> {
        let config = if dirs.is_empty() {
            base.unwrap_or_default()
        } else {
            pin_config(root, base, dirs)?
        };
        config.validate()?;

        let project = Resolver::new(&config.roles).resolve_for_install(root)?;

        let mut artifacts = Vec::new();

        let settings_path = root.join(SETTINGS_FILE);
        let merged = settings::merge_hooks(settings::read(&settings_path)?, &settings_path)?;
        let settings_json = serde_json::to_string_pretty(&merged).map_err(|e| Error::Internal {
            message: format!("Failed to serialize settings: {e}"),
        })?;
        artifacts.push(Artifact::new(
            SETTINGS_FILE,
            settings_json + "\n",
            ArtifactKind::Settings,
        ));

        artifacts.push(Artifact::new(
            Path::new(settings::HOOKS_DIR).join(HookEvent::PreWrite.script_name()),
            templates::pre_write_script(),
            ArtifactKind::Script,
        ));
        artifacts.push(Artifact::new(
            Path::new(settings::HOOKS_DIR).join(HookEvent::PostEdit.script_name()),
            templates::post_edit_script(),
            ArtifactKind::Script,
        ));

        for (name, contents) in templates::command_docs(&project) {
            artifacts.push(Artifact::new(
                Path::new(COMMANDS_DIR).join(name),
                contents,
                ArtifactKind::Document,
            ));
        }

        if !options.no_docs {
            artifacts.push(Artifact::new(
                GUIDANCE_FILE,
                templates::guidance(&project, &config),
                ArtifactKind::Document,
            ));
        }

        artifacts.push(Artifact::new(
            CONFIG_FILE_NAME,
            templates::config_file(&config),
            ArtifactKind::Config,
        ));

        Ok(Self {
            root: root.to_path_buf(),
            project,
            config,
            artifacts,
        })
    }

    /// Resolved project the plan was built for.
    #[must_use]
    pub const fn project(&self) -> &ResolvedProject {
        &self.project
    }

    /// Configuration the plan will write.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Files the plan will write.
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Existing files that would be overwritten but were not generated by us.
    #[must_use]
    pub fn conflicts(&self) -> Vec<PathBuf> {
        self.artifacts
            .iter()
            .filter_map(|artifact| {
                let marker = artifact.kind.marker()?;
                let path = self.root.join(&artifact.path);
                let existing = std::fs::read_to_string(&path).ok()?;
                (!existing.contains(marker) && existing != artifact.contents).then_some(path)
            })
            .collect()
    }

    /// Writes every artifact, refusing conflicts unless `force` is set.
    ///
    /// An existing settings file is copied to a timestamped backup first.
    pub fn apply(&self, force: bool) -> Result<Vec<PathBuf>> {
        if !force {
            if let Some(path) = self.conflicts().into_iter().next() {
                return Err(Error::ArtifactExists { path });
            }
        }

        let mut written = Vec::with_capacity(self.artifacts.len());

        for artifact in &self.artifacts {
            let path = self.root.join(&artifact.path);

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::io(format!("create {}", parent.display()), e))?;
            }

            if artifact.kind == ArtifactKind::Settings && path.exists() {
                let backup = backup_path(&path);
                std::fs::copy(&path, &backup).map_err(|e| Error::io("backup settings", e))?;
                tracing::info!(backup = %backup.display(), "Backed up existing settings");
            }

            std::fs::write(&path, &artifact.contents)
                .map_err(|e| Error::io(format!("write {}", path.display()), e))?;

            if artifact.kind == ArtifactKind::Script {
                make_executable(&path)?;
            }

            tracing::debug!(path = %path.display(), "Wrote artifact");
            written.push(path);
        }

        Ok(written)
    }
}

/// Builds a configuration pinned to explicit directories.
///
/// Each explicit directory must exist and hold every marker of its role.
fn pin_config(root: &Path, base: Option<Config>, dirs: &ExplicitDirs) -> Result<Config> {
    let mut config = base.unwrap_or_default();

    for (role, dir) in [(Role::Api, &dirs.api), (Role::Frontend, &dirs.frontend)] {
        let Some(dir) = dir else {
            continue;
        };
        let path = root.join(dir);
        if !path.is_dir() {
            return Err(Error::RoleDirMissing {
                role: role.label().to_string(),
                path,
            });
        }

        let missing: Vec<String> = Resolver::new(&config.roles)
            .spec(role)
            .markers
            .iter()
            .filter(|marker| !path.join(marker).is_file())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::RoleDirUnqualified {
                role: role.label().to_string(),
                path,
                missing,
            });
        }
    }

    let pinned = Config::pinned(dirs.api.as_deref(), dirs.frontend.as_deref());
    if dirs.api.is_some() {
        config.roles.api.candidates = pinned.roles.api.candidates;
    }
    if dirs.frontend.is_some() {
        config.roles.frontend.candidates = pinned.roles.frontend.candidates;
    }
    Ok(config)
}

fn backup_path(path: &Path) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    path.with_extension(format!("json.stackcheck.bak.{ts}"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .map_err(|e| Error::io("get script metadata", e))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|e| Error::io("set script perms", e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Removes installed hooks; returns the files that were changed or deleted.
///
/// Scripts without our marker are left alone. Documents and configuration
/// are kept so that local edits survive.
pub fn uninstall(root: &Path) -> Result<Vec<PathBuf>> {
    let mut touched = Vec::new();

    let settings_path = root.join(SETTINGS_FILE);
    if settings_path.exists() {
        let mut value = settings::read(&settings_path)?;
        if settings::remove_hooks(&mut value, &settings_path)? > 0 {
            let json = serde_json::to_string_pretty(&value).map_err(|e| Error::Internal {
                message: format!("Failed to serialize settings: {e}"),
            })?;
            std::fs::write(&settings_path, json + "\n")
                .map_err(|e| Error::io("write settings", e))?;
            touched.push(settings_path);
        }
    }

    let mut scripts: Vec<_> = HookEvent::ALL.iter().map(HookEvent::script_name).collect();
    scripts.dedup();
    for script in scripts {
        let path = root.join(settings::HOOKS_DIR).join(script);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        if content.contains(templates::SCRIPT_MARKER) {
            std::fs::remove_file(&path).map_err(|e| Error::io("remove hook script", e))?;
            touched.push(path);
        } else {
            tracing::warn!(path = %path.display(), "Hook script was not installed by stackcheck, leaving it");
        }
    }

    Ok(touched)
}
