//! # stackcheck
//!
//! Edit-time checks for projects split into a Laravel API and a frontend.
//!
//! `stackcheck install` wires hook scripts into an editor agent's settings.
//! After every edit the hook works out which half of the project the file
//! belongs to and runs only that half's lint, analysis and test commands,
//! then reports one aggregated summary.
//!
//! ## Features
//!
//! - **Role detection**: Finds the API and frontend directories by probing
//!   candidate names for marker files
//! - **Targeted dispatch**: An edit under the API directory runs API checks,
//!   an edit under the frontend directory runs frontend checks
//! - **Configurable groups**: Define command groups per role in `stackcheck.toml`
//! - **Graceful degradation**: Groups whose tooling is absent are skipped
//!
//! ## Example
//!
//! ```rust,no_run
//! use stackcheck::{decide, Config, Resolver, Runner};
//! use std::path::Path;
//!
//! # async fn example() -> stackcheck::Result<()> {
//! let root = Path::new("/srv/shop");
//! let config = Config::load_or_default_from(root)?;
//! let project = Resolver::new(&config.roles).resolve(root);
//!
//! let decision = decide(Some(Path::new("api/app/Models/User.php")), &project);
//! let result = Runner::new(&config, &project).run(&decision).await?;
//!
//! for line in result.summary().lines {
//!     eprintln!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/stackcheck/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;
pub mod scaffold;

// Re-export main types for convenience
pub use config::Config;
pub use core::dispatch::{decide, DispatchDecision};
pub use core::error::{Error, Result};
pub use core::resolver::{ResolvedProject, Resolver, Role};
pub use core::runner::{aggregate, CommandResult, RunResult, Runner, Summary};
