//! Core functionality for stackcheck.
//!
//! This module contains the main components:
//! - [`resolver`]: Finding the API and frontend directories
//! - [`dispatch`]: Deciding which roles an edit affects
//! - [`runner`]: Running command groups and aggregating results
//! - [`hook`]: Hook events, protected paths and root discovery
//! - [`error`]: Error types and result handling

pub mod dispatch;
pub mod error;
pub mod executor;
pub mod hook;
pub mod payload;
pub mod resolver;
pub mod runner;
