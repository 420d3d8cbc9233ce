//! Command-line interface for stackcheck.
//!
//! This module provides the `stackcheck` CLI with subcommands for:
//! - `init`: Write a default configuration
//! - `install`: Scaffold hooks, commands and guidance into a project
//! - `uninstall`: Remove installed hooks
//! - `hook`: Entry point the editor host invokes
//! - `run`: Run checks manually
//! - `detect`: Show resolved roles
//! - `list`: List configured command groups
//! - `validate`: Validate configuration

mod commands;

use crate::core::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Edit-time checks for API + frontend projects.
#[derive(Debug, Parser)]
#[command(
    name = "stackcheck",
    author,
    version,
    about = "Edit-time checks for API + frontend projects",
    long_about = r#"
stackcheck installs editor hooks into a project made of a Laravel API
directory and a frontend directory. After every edit it runs the lint,
analysis and test commands for the half of the project that was touched.

Quick start:
  stackcheck install              # Detect directories and install hooks
  stackcheck install api webapp   # Use explicit directory names
  stackcheck detect               # Show what was detected

Environment variables:
  STACKCHECK_SKIP=1      Make every hook exit immediately
  CLAUDE_PROJECT_DIR     Project root, set by the editor host
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root (defaults to the nearest directory with stackcheck.toml).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default stackcheck.toml.
    #[command(visible_alias = "i")]
    Init {
        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },

    /// Install hooks, commands and guidance into the project.
    Install {
        /// API directory name (skips detection for the API role).
        api_dir: Option<String>,

        /// Frontend directory name (skips detection for the frontend role).
        frontend_dir: Option<String>,

        /// Overwrite files not created by stackcheck.
        #[arg(short, long)]
        force: bool,

        /// Do not write CLAUDE.md.
        #[arg(long)]
        no_docs: bool,
    },

    /// Remove installed hooks.
    Uninstall,

    /// Handle an editor hook event (reads the payload from stdin).
    Hook {
        /// Event name: pre-write, post-edit or post-write.
        event: String,
    },

    /// Run checks manually.
    #[command(visible_alias = "r")]
    Run {
        /// Only run the checks for the role this file belongs to.
        file: Option<PathBuf>,

        /// Run only a specific command group.
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show the resolved API and frontend directories.
    #[command(visible_alias = "d")]
    Detect,

    /// List all configured command groups.
    #[command(visible_alias = "l")]
    List {
        /// Show groups for a specific role.
        #[arg(short, long, value_parser = ["api", "frontend"])]
        role: Option<String>,
    },

    /// Validate the configuration file.
    #[command(visible_alias = "v")]
    Validate,

    /// Show configuration file location and contents.
    Config {
        /// Output raw TOML.
        #[arg(long)]
        raw: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    let root = cli.root.as_deref();

    // With no subcommand, check the whole project
    match cli.command {
        Some(Commands::Init { force }) => commands::init(root, force),
        Some(Commands::Install {
            api_dir,
            frontend_dir,
            force,
            no_docs,
        }) => commands::install(
            root,
            &crate::scaffold::ExplicitDirs {
                api: api_dir,
                frontend: frontend_dir,
            },
            crate::scaffold::InstallOptions { force, no_docs },
        ),
        Some(Commands::Uninstall) => commands::uninstall(root),
        Some(Commands::Hook { event }) => commands::hook(root, &event),
        Some(Commands::Run { file, group }) => {
            commands::run(root, file.as_deref(), group.as_deref(), cli.quiet)
        },
        Some(Commands::Detect) => commands::detect(root),
        Some(Commands::List { role }) => commands::list(root, role.as_deref()),
        Some(Commands::Validate) => commands::validate(root),
        Some(Commands::Config { raw }) => commands::config(root, raw),
        Some(Commands::Completions { shell }) => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
        None => commands::run(root, None, None, cli.quiet),
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {},
    }
}
