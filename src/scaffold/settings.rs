//! Host settings file handling.
//!
//! The host keeps hooks under `hooks.<Event>` as a list of matcher groups:
//! `{ "matcher": "Edit", "hooks": [{ "type": "command", "command": "..." }] }`.
//! stackcheck adds its own groups and leaves every other group untouched.

use crate::core::error::{Error, Result};
use crate::core::hook::HookEvent;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Directory, relative to the project root, holding generated hook scripts.
pub const HOOKS_DIR: &str = ".claude/hooks";

/// Command the host runs for an event.
#[must_use]
pub fn hook_command(event: HookEvent) -> String {
    let script = format!("\"$CLAUDE_PROJECT_DIR\"/{HOOKS_DIR}/{}", event.script_name());
    match event {
        HookEvent::PostWrite => format!("{script} {}", event.name()),
        HookEvent::PreWrite | HookEvent::PostEdit => script,
    }
}

/// Returns true if a matcher group runs exactly one of our hook commands.
fn is_ours(group: &Value) -> bool {
    let ours: Vec<String> = HookEvent::ALL.iter().map(|e| hook_command(*e)).collect();
    group
        .get("hooks")
        .and_then(Value::as_array)
        .is_some_and(|hooks| {
            hooks.iter().any(|hook| {
                hook.get("command")
                    .and_then(Value::as_str)
                    .is_some_and(|cmd| ours.iter().any(|o| o == cmd))
            })
        })
}

fn hooks_object<'a>(settings: &'a mut Value, path: &Path) -> Result<&'a mut Map<String, Value>> {
    let malformed = |message: &str| Error::SettingsMalformed {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    settings
        .as_object_mut()
        .ok_or_else(|| malformed("top level is not an object"))?
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| malformed("\"hooks\" is not an object"))
}

/// Adds stackcheck's hook groups, replacing any earlier ones.
pub fn merge_hooks(mut settings: Value, path: &Path) -> Result<Value> {
    let hooks = hooks_object(&mut settings, path)?;

    for event in HookEvent::ALL {
        let key = event.host_event();
        if let Some(groups) = hooks.get_mut(key).and_then(Value::as_array_mut) {
            groups.retain(|g| !is_ours(g));
        }
    }

    for event in HookEvent::ALL {
        let group = json!({
            "matcher": event.matcher(),
            "hooks": [
                {
                    "type": "command",
                    "command": hook_command(event)
                }
            ]
        });

        let entry = hooks
            .entry(event.host_event())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry.as_array_mut() {
            Some(groups) => groups.push(group),
            None => {
                return Err(Error::SettingsMalformed {
                    path: path.to_path_buf(),
                    message: format!("\"hooks.{}\" is not a list", event.host_event()),
                })
            },
        }
    }

    Ok(settings)
}

/// Removes stackcheck's hook groups; returns how many were removed.
pub fn remove_hooks(settings: &mut Value, path: &Path) -> Result<usize> {
    let hooks = hooks_object(settings, path)?;
    let mut removed = 0;

    for groups in hooks.values_mut().filter_map(Value::as_array_mut) {
        let before = groups.len();
        groups.retain(|g| !is_ours(g));
        removed += before - groups.len();
    }

    hooks.retain(|_, v| v.as_array().map_or(true, |a| !a.is_empty()));

    Ok(removed)
}

/// Reads a settings file, returning an empty object when it is absent.
pub fn read(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(json!({}));
    }

    let content = std::fs::read_to_string(path).map_err(|e| Error::io("read settings", e))?;
    if content.trim().is_empty() {
        return Ok(json!({}));
    }

    serde_json::from_str(&content)
        .map_err(|e| Error::config_parse_with_source(format!("{}", path.display()), e))
}
