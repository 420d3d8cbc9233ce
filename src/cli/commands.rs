//! CLI command implementations.

use crate::checks;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::dispatch::{decide, DispatchDecision, Trigger};
use crate::core::error::{Error, Result};
use crate::core::hook::{self, HookEvent, PROJECT_DIR_ENV_VAR, SENTINEL_EXIT_CODE, SKIP_ENV_VAR};
use crate::core::payload::HookPayload;
use crate::core::resolver::{self, ResolvedProject, Resolver, Role};
use crate::core::runner::{RunResult, Runner};
use crate::scaffold::{self, templates, ExplicitDirs, InstallOptions, InstallPlan};
use console::style;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// Output lines shown per failing group.
const OUTPUT_TAIL_LINES: usize = 30;

/// Initialize configuration.
pub fn init(root: Option<&Path>, force: bool) -> Result<ExitCode> {
    let root = base_dir(root)?;
    let config_path = root.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(&config_path, templates::config_file(&Config::default()))
        .map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Review the role candidates and groups in {CONFIG_FILE_NAME}");
    eprintln!("  2. Run: stackcheck install");

    Ok(ExitCode::SUCCESS)
}

/// Install hooks, command docs, guidance and configuration.
pub fn install(root: Option<&Path>, dirs: &ExplicitDirs, options: InstallOptions) -> Result<ExitCode> {
    let root = base_dir(root)?;

    let config_path = hook::config_path(&root);
    let base = if config_path.is_file() {
        Some(Config::load_from(&config_path)?)
    } else {
        None
    };

    let plan = InstallPlan::new(&root, base, dirs, options)?;

    for role in Role::ALL {
        match plan.project().dir(role) {
            Some(dir) => eprintln!(
                "{} {} directory: {}",
                style("✓").green(),
                role.label(),
                display_relative(dir, &root)
            ),
            None => eprintln!(
                "{} No {} directory found, its checks will be skipped",
                style("•").cyan(),
                role.label()
            ),
        }
    }

    let mut force = options.force;
    let conflicts = plan.conflicts();
    if !force && !conflicts.is_empty() && std::io::stdin().is_terminal() {
        eprintln!();
        for path in &conflicts {
            eprintln!(
                "{} {} was not created by stackcheck",
                style("!").yellow(),
                display_relative(path, &root)
            );
        }

        force = dialoguer::Confirm::new()
            .with_prompt(format!("Overwrite {} file(s)?", conflicts.len()))
            .default(false)
            .interact()
            .map_err(|e| Error::Internal {
                message: format!("Prompt failed: {e}"),
            })?;

        if !force {
            eprintln!("Aborted, nothing was written.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let written = plan.apply(force)?;

    eprintln!();
    for path in &written {
        eprintln!("{} Wrote {}", style("✓").green(), display_relative(path, &root));
    }

    eprintln!("\nNext steps:");
    eprintln!("  1. Review {CONFIG_FILE_NAME} and {}", scaffold::GUIDANCE_FILE);
    eprintln!("  2. Run: stackcheck run");

    Ok(ExitCode::SUCCESS)
}

/// Uninstall hooks.
pub fn uninstall(root: Option<&Path>) -> Result<ExitCode> {
    let root = project_root(root)?;
    let touched = scaffold::uninstall(&root)?;

    if touched.is_empty() {
        eprintln!(
            "{} No stackcheck hooks installed under {}",
            style("•").cyan(),
            root.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    for path in &touched {
        eprintln!(
            "{} Removed hooks from {}",
            style("✓").green(),
            display_relative(path, &root)
        );
    }
    eprintln!(
        "  {} and {CONFIG_FILE_NAME} were kept; delete them by hand if desired.",
        scaffold::GUIDANCE_FILE
    );

    Ok(ExitCode::SUCCESS)
}

/// Handle a hook event from the editor host.
pub fn hook(root: Option<&Path>, event: &str) -> Result<ExitCode> {
    let event: HookEvent = event.parse()?;

    if skip_requested() {
        tracing::debug!(%event, "Hooks disabled by {SKIP_ENV_VAR}");
        return Ok(ExitCode::SUCCESS);
    }

    let payload = HookPayload::from_stdin()?;
    let host_dir = std::env::var_os(PROJECT_DIR_ENV_VAR).map(PathBuf::from);
    let root = hook::locate_root(
        root,
        host_dir.as_deref(),
        payload.as_ref().and_then(|p| p.cwd.as_deref()),
        &current_dir()?,
    );
    let config = match Config::load_or_default_from(&root) {
        Ok(config) => config,
        // The host only shows output for the sentinel code
        Err(e) if event.runs_checks() => {
            eprintln!("stackcheck: configuration error: {e}");
            return Ok(ExitCode::from(SENTINEL_EXIT_CODE));
        },
        Err(e) => return Err(e),
    };
    let edited = payload.as_ref().and_then(HookPayload::edited_file);

    tracing::debug!(%event, root = %root.display(), edited = ?edited, "Hook invoked");

    if event.runs_checks() {
        check_edit(&root, &config, edited)
    } else {
        guard_write(&root, &config, edited)
    }
}

/// Blocks writes to protected paths.
fn guard_write(root: &Path, config: &Config, edited: Option<&Path>) -> Result<ExitCode> {
    let Some(path) = edited else {
        return Ok(ExitCode::SUCCESS);
    };

    match hook::protected_match(path, root, &config.hook.protected_paths) {
        Some(entry) => {
            eprintln!(
                "Blocked: {} is protected by stackcheck ({entry}). Make this change by hand if it is intended.",
                display_relative(path, root)
            );
            Ok(ExitCode::from(SENTINEL_EXIT_CODE))
        },
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Runs the groups an edit affects and reports the summary.
fn check_edit(root: &Path, config: &Config, edited: Option<&Path>) -> Result<ExitCode> {
    let project = Resolver::new(&config.roles).resolve(root);
    let decision = decide(edited, &project);

    if decision.is_noop() {
        tracing::debug!(trigger = ?decision.trigger, "Edit is outside every role directory");
        return Ok(ExitCode::SUCCESS);
    }

    let result = runtime()?.block_on(Runner::new(config, &project).run(&decision))?;

    print_summary(&result);

    Ok(ExitCode::from(SENTINEL_EXIT_CODE))
}

/// Run checks manually.
pub fn run(
    root: Option<&Path>,
    file: Option<&Path>,
    group: Option<&str>,
    quiet: bool,
) -> Result<ExitCode> {
    let cwd = current_dir()?;
    let root = project_root(root)?;
    let config = Config::load_or_default_from(&root)?;
    let project = Resolver::new(&config.roles).resolve(&root);

    let runner = Runner::new(&config, &project).progress(!quiet && std::io::stderr().is_terminal());
    let rt = runtime()?;

    let result = if let Some(name) = group {
        let result = rt.block_on(runner.run_single(name))?;
        RunResult {
            decision: DispatchDecision {
                run_api: result.role == Role::Api,
                run_frontend: result.role == Role::Frontend,
                trigger: Trigger::Everything,
            },
            results: vec![result],
            duration: Duration::ZERO,
        }
    } else {
        let file = file.map(|f| if f.is_absolute() { f.to_path_buf() } else { cwd.join(f) });
        let decision = decide(file.as_deref(), &project);

        if decision.is_noop() {
            eprintln!(
                "{} Nothing to check: no role directory contains {}",
                style("•").cyan(),
                file.as_deref().map_or_else(String::new, |f| display_relative(f, &root))
            );
            return Ok(ExitCode::SUCCESS);
        }

        rt.block_on(runner.run(&decision))?
    };

    print_summary(&result);

    if result.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Prints the aggregated outcome and the output of failing groups.
fn print_summary(result: &RunResult) {
    let summary = result.summary();

    eprintln!();
    if summary.success {
        eprintln!(
            "{} All checks passed ({} passed, {} skipped) in {}",
            style("✓").green().bold(),
            result.passed_count(),
            result.skipped_count(),
            humantime::format_duration(round_to_millis(result.duration))
        );
    } else {
        eprintln!(
            "{} {} check(s) failed in {}",
            style("✗").red().bold(),
            result.failed_count(),
            humantime::format_duration(round_to_millis(result.duration))
        );
        for line in &summary.lines {
            eprintln!("  {line}");
        }

        for failed in result.failed() {
            let output = failed.output.combined_output();
            if output.trim().is_empty() {
                continue;
            }
            eprintln!();
            eprintln!(
                "  {} {} ({})",
                style("Output of").red(),
                failed.name,
                failed.role
            );
            let lines: Vec<&str> = output.lines().collect();
            for line in &lines[lines.len().saturating_sub(OUTPUT_TAIL_LINES)..] {
                eprintln!("    {line}");
            }
        }
    }

    for skipped in result.results.iter().filter(|r| r.is_skipped()) {
        tracing::debug!(
            group = %skipped.name,
            reason = skipped.skip_reason.as_deref().unwrap_or_default(),
            "Skipped"
        );
    }
}

fn round_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Show the resolved roles and how they were found.
pub fn detect(root: Option<&Path>) -> Result<ExitCode> {
    let root = project_root(root)?;
    let config = Config::load_or_default_from(&root)?;
    let resolver = Resolver::new(&config.roles);
    let project = resolver.resolve(&root);

    eprintln!("Project root: {}", style(root.display()).bold());

    for role in Role::ALL {
        let spec = resolver.spec(role);
        eprintln!();
        match project.dir(role) {
            Some(dir) => eprintln!(
                "{} {}: {}",
                style("✓").green(),
                style(role.label()).bold(),
                display_relative(dir, &root)
            ),
            None => eprintln!(
                "{} {}: not found",
                style("✗").red(),
                style(role.label()).bold()
            ),
        }
        eprintln!("  Markers: {}", spec.markers.join(", "));
        for candidate in &spec.candidates {
            let dir = root.join(candidate);
            let mark = if resolver::qualifies(&dir, spec) {
                style("✓").green()
            } else if dir.is_dir() {
                style("!").yellow()
            } else {
                style("·").dim()
            };
            eprintln!("  {mark} {candidate}");
        }
    }

    if project.is_empty() {
        eprintln!();
        eprintln!(
            "{} Neither role resolved; `stackcheck install` will fail here.",
            style("!").yellow()
        );
        eprintln!("  Pass directory names explicitly: stackcheck install <API_DIR> <FRONTEND_DIR>");
    }

    Ok(ExitCode::SUCCESS)
}

/// List configured command groups.
pub fn list(root: Option<&Path>, role: Option<&str>) -> Result<ExitCode> {
    let root = project_root(root)?;
    let config = Config::load_or_default_from(&root)?;
    let project = Resolver::new(&config.roles).resolve(&root);

    let role: Option<Role> = role
        .map(str::parse)
        .transpose()
        .map_err(|e: String| Error::ConfigInvalid {
            field: "role".to_string(),
            message: e,
        })?;

    for current in Role::ALL.into_iter().filter(|r| role.map_or(true, |f| f == *r)) {
        eprintln!("{}", style(format!("{} groups:", current.label())).bold());
        for group in config.groups_for(current) {
            print_group(group, &project);
        }
        eprintln!();
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints a group's details and whether it would run now.
fn print_group(group: &crate::config::GroupConfig, project: &ResolvedProject) {
    let description = Some(group.description.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("(no description)");

    let status = match project.dir(group.role) {
        None => format!("no {} directory", group.role.label()),
        Some(dir) => checks::unavailable_reason(group, dir).unwrap_or_default(),
    };

    if status.is_empty() {
        eprintln!("  {} - {}", style(&group.name).cyan(), description);
    } else {
        eprintln!(
            "  {} - {} {}",
            style(&group.name).dim(),
            description,
            style(format!("(skipped: {status})")).yellow()
        );
    }
    eprintln!("      {}", style(&group.run).dim());
}

/// Validate configuration.
pub fn validate(root: Option<&Path>) -> Result<ExitCode> {
    let root = project_root(root)?;

    let loaded = Config::find_config_file_from(&root).and_then(|path| Config::load_from(&path));
    match loaded {
        Ok(_) => {
            eprintln!("{} Configuration is valid", style("✓").green());
            Ok(ExitCode::SUCCESS)
        },
        Err(Error::ConfigNotFound { path }) => {
            eprintln!(
                "{} Configuration not found: {}",
                style("!").yellow(),
                path.display()
            );
            eprintln!("  Run: stackcheck init");
            Ok(ExitCode::FAILURE)
        },
        Err(e) => {
            eprintln!("{} Configuration validation failed: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Show configuration.
pub fn config(root: Option<&Path>, raw: bool) -> Result<ExitCode> {
    let root = project_root(root)?;

    match Config::find_config_file_from(&root) {
        Ok(path) => {
            eprintln!("Configuration file: {}", path.display());

            if raw {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io("read config", e))?;
                eprintln!();
                std::io::stdout()
                    .write_all(content.as_bytes())
                    .map_err(|e| Error::io("write output", e))?;
            }

            Ok(ExitCode::SUCCESS)
        },
        Err(Error::ConfigNotFound { .. }) => {
            eprintln!("{} No configuration file found", style("!").yellow());
            eprintln!("  Run: stackcheck init");
            if raw {
                std::io::stdout()
                    .write_all(Config::default_toml().as_bytes())
                    .map_err(|e| Error::io("write output", e))?;
            }
            Ok(ExitCode::FAILURE)
        },
        Err(e) => Err(e),
    }
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "stackcheck",
        &mut std::io::stdout(),
    );
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::io("get current dir", e))
}

/// Root for commands that create a project layout: the explicit root or cwd.
fn base_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = current_dir()?;
    Ok(match explicit {
        Some(root) if root.is_absolute() => root.to_path_buf(),
        Some(root) => cwd.join(root),
        None => cwd,
    })
}

/// Root for commands that act on an installed project.
fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    Ok(hook::locate_root(explicit, None, None, &current_dir()?))
}

fn skip_requested() -> bool {
    std::env::var(SKIP_ENV_VAR).ok().as_deref() == Some("1")
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal {
            message: format!("Failed to create runtime: {e}"),
        })
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
