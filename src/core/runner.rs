//! Command group runner and result aggregation.
//!
//! Groups run strictly one after another: API groups first, then frontend
//! groups, each in configuration order. A failing group never stops the
//! groups after it.

use crate::checks;
use crate::config::{Config, GroupConfig};
use crate::core::dispatch::DispatchDecision;
use crate::core::error::{Error, Result};
use crate::core::executor::{CommandOutput, Executor, GroupRunner};
use crate::core::resolver::{ResolvedProject, Role};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Exit code recorded when a group's command could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Result of running a single command group.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Name of the group.
    pub name: String,
    /// Role the group belongs to.
    pub role: Role,
    /// Output from the group's command.
    pub output: CommandOutput,
    /// Reason for skipping, if the group did not run.
    pub skip_reason: Option<String>,
}

impl CommandResult {
    /// Creates a result for a group that ran.
    #[must_use]
    pub fn ran(name: impl Into<String>, role: Role, output: CommandOutput) -> Self {
        Self {
            name: name.into(),
            role,
            output,
            skip_reason: None,
        }
    }

    /// Creates a skipped result.
    #[must_use]
    pub fn skipped(name: impl Into<String>, role: Role, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            output: CommandOutput::with_code(0),
            skip_reason: Some(reason.into()),
        }
    }

    /// Returns true if the group was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }

    /// Returns true if the group passed or was skipped.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.is_skipped() || self.output.success()
    }
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// True iff every group that ran exited 0.
    pub success: bool,
    /// One line per failing group, in invocation order.
    pub lines: Vec<String>,
}

/// Folds command results into an overall outcome.
///
/// An empty sequence is a success. Skipped groups count as passing.
#[must_use]
pub fn aggregate(results: &[CommandResult]) -> Summary {
    let lines: Vec<String> = results
        .iter()
        .filter(|r| !r.passed())
        .map(|r| format!("{} failed (exit {})", r.name, r.output.exit_code))
        .collect();

    Summary {
        success: lines.is_empty(),
        lines,
    }
}

/// Result of running all dispatched groups.
#[derive(Debug)]
pub struct RunResult {
    /// Decision that selected the groups.
    pub decision: DispatchDecision,
    /// Individual group results, in invocation order.
    pub results: Vec<CommandResult>,
    /// Total duration.
    pub duration: Duration,
}

impl RunResult {
    /// Returns the aggregated summary.
    #[must_use]
    pub fn summary(&self) -> Summary {
        aggregate(&self.results)
    }

    /// Returns true if all groups passed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.results.iter().all(CommandResult::passed)
    }

    /// Returns the number of groups that ran and passed.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.passed() && !r.is_skipped())
            .count()
    }

    /// Returns the number of failed groups.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed()).count()
    }

    /// Returns the number of skipped groups.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    /// Returns failed group results.
    pub fn failed(&self) -> impl Iterator<Item = &CommandResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}

/// Runs dispatched command groups against a resolved project.
#[derive(Debug)]
pub struct Runner<'a, R = Executor> {
    config: &'a Config,
    project: &'a ResolvedProject,
    group_runner: R,
    progress: bool,
}

impl<'a> Runner<'a, Executor> {
    /// Creates a runner that spawns real processes.
    #[must_use]
    pub fn new(config: &'a Config, project: &'a ResolvedProject) -> Self {
        Self::with_group_runner(config, project, Executor::new())
    }
}

impl<'a, R: GroupRunner> Runner<'a, R> {
    /// Creates a runner with a custom group runner.
    #[must_use]
    pub const fn with_group_runner(
        config: &'a Config,
        project: &'a ResolvedProject,
        group_runner: R,
    ) -> Self {
        Self {
            config,
            project,
            group_runner,
            progress: false,
        }
    }

    /// Enables the spinner and per-group status lines on stderr.
    #[must_use]
    pub const fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Runs every group selected by `decision`.
    pub async fn run(&self, decision: &DispatchDecision) -> Result<RunResult> {
        let start = Instant::now();
        let mut results = Vec::new();

        for role in decision.roles() {
            for group in self.config.groups_for(role) {
                results.push(self.run_group(group).await);
            }
        }

        let run = RunResult {
            decision: decision.clone(),
            results,
            duration: start.elapsed(),
        };

        tracing::debug!(
            passed = run.passed_count(),
            failed = run.failed_count(),
            skipped = run.skipped_count(),
            "Run finished"
        );

        Ok(run)
    }

    /// Runs a single group by name, regardless of dispatch.
    pub async fn run_single(&self, name: &str) -> Result<CommandResult> {
        let group = self.config.group(name).ok_or_else(|| Error::GroupNotFound {
            name: name.to_string(),
        })?;
        Ok(self.run_group(group).await)
    }

    /// Runs one group, turning every outcome into a result.
    async fn run_group(&self, group: &GroupConfig) -> CommandResult {
        let Some(dir) = self.project.dir(group.role) else {
            tracing::debug!(group = %group.name, role = %group.role, "Role not resolved, skipping");
            return CommandResult::skipped(
                &group.name,
                group.role,
                format!("no {} directory", group.role.label()),
            );
        };

        if let Some(reason) = checks::unavailable_reason(group, dir) {
            tracing::debug!(group = %group.name, %reason, "Tooling not present, skipping");
            return CommandResult::skipped(&group.name, group.role, reason);
        }

        let pb = self.progress.then(|| spinner(&group.name));

        let output = match self.group_runner.run_group(group, dir).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(group = %group.name, error = %e, "Failed to start command");
                CommandOutput {
                    stderr: e.to_string(),
                    ..CommandOutput::with_code(SPAWN_FAILURE_EXIT_CODE)
                }
            },
        };

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        if self.progress {
            if output.success() {
                eprintln!("{} {}", style("✓").green(), group.name);
            } else {
                eprintln!("{} {}", style("✗").red(), group.name);
            }
        }

        CommandResult::ran(&group.name, group.role, output)
    }
}

fn spinner(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .ok()
            .unwrap_or_else(ProgressStyle::default_spinner),
    );
    pb.set_message(format!("Running {name}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
