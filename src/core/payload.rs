//! Hook payload parsing.
//!
//! The editor host may send a JSON description of the edit on stdin. Keys
//! arrive either in snake_case or camelCase, so both are accepted.

use crate::core::error::{Error, Result};
use serde::Deserialize;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Kind of file operation that triggered the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// In-place edit of an existing file.
    Edit,
    /// Whole-file write.
    Write,
    /// Several edits to one file.
    MultiEdit,
}

impl EditKind {
    /// Returns the tool name the host uses for this kind.
    #[must_use]
    pub const fn tool_name(&self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Write => "Write",
            Self::MultiEdit => "MultiEdit",
        }
    }
}

impl std::fmt::Display for EditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tool_name())
    }
}

impl std::str::FromStr for EditKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "edit" => Ok(Self::Edit),
            "write" => Ok(Self::Write),
            "multiedit" => Ok(Self::MultiEdit),
            _ => Err(format!("Unrecognized edit kind: {s}")),
        }
    }
}

/// Tool input portion of a hook payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    /// Absolute path of the edited file.
    #[serde(default, alias = "filePath")]
    pub file_path: Option<PathBuf>,
}

/// Structured description of an edit event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookPayload {
    /// Host lifecycle event, e.g. `PostToolUse`.
    #[serde(default, alias = "hookEventName")]
    pub hook_event_name: Option<String>,
    /// Tool that performed the edit.
    #[serde(default, alias = "toolName")]
    pub tool_name: Option<String>,
    /// Tool arguments.
    #[serde(default, alias = "toolInput")]
    pub tool_input: Option<ToolInput>,
    /// Working directory of the host session.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl HookPayload {
    /// Parses a payload, treating blank or malformed input as absent.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        if input.trim().is_empty() {
            return None;
        }

        match serde_json::from_str(input) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed hook payload");
                None
            },
        }
    }

    /// Reads a payload from stdin unless stdin is an interactive terminal.
    pub fn from_stdin() -> Result<Option<Self>> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Ok(None);
        }

        let mut input = String::new();
        stdin
            .lock()
            .read_to_string(&mut input)
            .map_err(|e| Error::io("read hook payload", e))?;
        Ok(Self::parse(&input))
    }

    /// Returns the recognized edit kind, if any.
    #[must_use]
    pub fn edit_kind(&self) -> Option<EditKind> {
        self.tool_name.as_deref().and_then(|name| name.parse().ok())
    }

    /// Returns the edited file when the payload names a recognized edit.
    ///
    /// An unknown tool or a missing path yields `None`, which callers treat
    /// the same as no payload at all.
    #[must_use]
    pub fn edited_file(&self) -> Option<&Path> {
        self.edit_kind()?;
        self.tool_input
            .as_ref()?
            .file_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
