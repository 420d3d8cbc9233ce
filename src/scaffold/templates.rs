//! Templates for generated files.
//!
//! Placeholders use `{name}` and are filled by plain string replacement.

use crate::config::Config;
use crate::core::resolver::{ResolvedProject, Role};
use std::fmt::Write as _;
use std::path::Path;

/// Marker line carried by every generated hook script.
pub const SCRIPT_MARKER: &str = "# stackcheck hook";

/// Marker line carried by every generated markdown document.
pub const DOC_MARKER: &str = "<!-- generated by stackcheck -->";

/// Marker line carried by a generated configuration file.
pub const CONFIG_MARKER: &str = "# generated by stackcheck";

const PRE_WRITE_SCRIPT: &str = r#"#!/bin/sh
# stackcheck hook - installed by `stackcheck install`
# Blocks edits to protected paths before they happen.

if [ "$STACKCHECK_SKIP" = "1" ]; then
    exit 0
fi

exec stackcheck hook pre-write
"#;

const POST_EDIT_SCRIPT: &str = r#"#!/bin/sh
# stackcheck hook - installed by `stackcheck install`
# Lints and tests the part of the project an edit touched.
# Usage: post-edit.sh [post-edit|post-write]

if [ "$STACKCHECK_SKIP" = "1" ]; then
    exit 0
fi

exec stackcheck hook "${1:-post-edit}"
"#;

const GUIDANCE: &str = r"<!-- generated by stackcheck -->
# Project guide

This project is checked automatically after every edit. Each edit runs the
checks for the part of the project it touched:

{roles}
When a hook reports a failure, fix it before moving on. The hook output
lists every failing check in one pass.

## Checks

{groups}
## Commands

- `/check` runs every check for the whole project.
{commands}
## Conventions

- Do not edit dependency directories or lock files; the pre-write hook
  blocks {protected}.
- Set `STACKCHECK_SKIP=1` to disable the hooks for a session.
";

const CHECK_COMMAND: &str = r"<!-- generated by stackcheck -->
Run every project check and report the results.

1. Run `stackcheck run` from the project root.
2. For each failing check, read its output and fix the cause.
3. Re-run until everything passes.
";

const API_TEST_COMMAND: &str = r"<!-- generated by stackcheck -->
Run the API checks in `{api_dir}`.

1. Run `stackcheck run {api_dir}` from the project root.
2. If a test fails, read the failure, fix the code under `{api_dir}`, and
   run it again.
";

const FRONTEND_LINT_COMMAND: &str = r"<!-- generated by stackcheck -->
Run the frontend checks in `{frontend_dir}`.

1. Run `stackcheck run {frontend_dir}` from the project root.
2. Fix every lint error reported, then run it again.
";

/// Pre-write hook script.
#[must_use]
pub fn pre_write_script() -> String {
    PRE_WRITE_SCRIPT.to_string()
}

/// Post-edit hook script.
#[must_use]
pub fn post_edit_script() -> String {
    POST_EDIT_SCRIPT.to_string()
}

/// Guidance document for the project root.
#[must_use]
pub fn guidance(project: &ResolvedProject, config: &Config) -> String {
    let mut roles = String::new();
    let mut groups = String::new();
    let mut commands = String::new();

    for role in Role::ALL {
        let Some(dir) = relative_dir(project, role) else {
            continue;
        };
        let _ = writeln!(roles, "- {} code lives in `{dir}/`.", role.label());

        let _ = writeln!(groups, "### {}\n", role.label());
        for group in config.groups_for(role) {
            let _ = writeln!(groups, "- `{}`: {}", group.name, group.description);
        }
        groups.push('\n');

        match role {
            Role::Api => commands.push_str("- `/api-test` runs the API checks.\n"),
            Role::Frontend => commands.push_str("- `/frontend-lint` runs the frontend checks.\n"),
        }
    }

    let protected = config
        .hook
        .protected_paths
        .iter()
        .map(|p| format!("`{p}`"))
        .collect::<Vec<_>>()
        .join(", ");

    GUIDANCE
        .replace("{roles}", &roles)
        .replace("{groups}", &groups)
        .replace("{commands}", &commands)
        .replace("{protected}", &protected)
}

/// Command shortcut documents as `(file name, contents)` pairs.
///
/// Role-specific shortcuts are only produced for roles that resolved.
#[must_use]
pub fn command_docs(project: &ResolvedProject) -> Vec<(&'static str, String)> {
    let mut docs = vec![("check.md", CHECK_COMMAND.to_string())];

    if let Some(dir) = relative_dir(project, Role::Api) {
        docs.push(("api-test.md", API_TEST_COMMAND.replace("{api_dir}", &dir)));
    }
    if let Some(dir) = relative_dir(project, Role::Frontend) {
        docs.push((
            "frontend-lint.md",
            FRONTEND_LINT_COMMAND.replace("{frontend_dir}", &dir),
        ));
    }

    docs
}

/// Configuration file contents.
#[must_use]
pub fn config_file(config: &Config) -> String {
    let body = toml::to_string_pretty(config).unwrap_or_default();
    format!("{CONFIG_MARKER}\n{body}")
}

/// Role directory relative to the project root, with `/` separators.
fn relative_dir(project: &ResolvedProject, role: Role) -> Option<String> {
    let dir = project.dir(role)?;
    let relative = dir.strip_prefix(project.root()).unwrap_or(dir);
    Some(display_slash(relative))
}

fn display_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
