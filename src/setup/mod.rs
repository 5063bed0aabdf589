//! Installer for command templates and agent-runtime settings.
//!
//! Copies a source checkout's `.claude/commands` tree into the global
//! (`~/.claude`) or project (`./.claude`) configuration directory and merges
//! its `settings.json` onto whatever is already installed: permission lists
//! are unioned with duplicates removed, hook lists are appended, and any
//! other existing keys are preserved.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::error::{Result, TaskLoopError};

/// Name of the configuration directory shared with the agent runtime.
pub const CLAUDE_DIR: &str = ".claude";

const SETTINGS_FILE: &str = "settings.json";
const COMMANDS_DIR: &str = "commands";
const PROJECT_GUIDE: &str = "CLAUDE.md";

/// Install into `~/.claude`. Returns the directory written to.
pub fn install_global(source: &Path) -> Result<PathBuf> {
    let claude_dir = dirs::home_dir()
        .ok_or_else(|| TaskLoopError::Setup("could not determine the home directory".to_string()))?
        .join(CLAUDE_DIR);
    install_claude_dir(source, &claude_dir, true)?;
    Ok(claude_dir)
}

/// Install into `<project_root>/.claude`, seeding `CLAUDE.md` next to it
/// when the project does not have one yet. Returns the directory written to.
pub fn install_project(source: &Path, project_root: &Path) -> Result<PathBuf> {
    let guide_src = source.join(PROJECT_GUIDE);
    let guide_dest = project_root.join(PROJECT_GUIDE);
    if guide_src.exists() && !guide_dest.exists() {
        fs::copy(&guide_src, &guide_dest)?;
        log::info!("Copied {} to {}", PROJECT_GUIDE, guide_dest.display());
    }

    let claude_dir = project_root.join(CLAUDE_DIR);
    install_claude_dir(source, &claude_dir, false)?;
    Ok(claude_dir)
}

/// Copy commands and settle settings into one `.claude` directory.
///
/// Global installs always merge settings; project installs copy the source
/// file verbatim when the project has none yet.
fn install_claude_dir(source: &Path, claude_dir: &Path, always_merge: bool) -> Result<()> {
    fs::create_dir_all(claude_dir)?;

    let source_claude = source.join(CLAUDE_DIR);
    copy_dir(&source_claude.join(COMMANDS_DIR), &claude_dir.join(COMMANDS_DIR))?;

    let settings_src = source_claude.join(SETTINGS_FILE);
    let settings_dest = claude_dir.join(SETTINGS_FILE);

    if !always_merge && !settings_dest.exists() {
        if settings_src.exists() {
            fs::copy(&settings_src, &settings_dest)?;
            log::info!("Copied settings to {}", settings_dest.display());
        }
        return Ok(());
    }

    let incoming = read_settings_strict(&settings_src)?;
    let existing = read_settings_lenient(&settings_dest);
    let merged = merge_settings(existing, &incoming);
    fs::write(&settings_dest, serde_json::to_string_pretty(&merged)?)?;
    log::info!("Merged settings into {}", settings_dest.display());
    Ok(())
}

/// Recursively copy `src` into `dest`, creating missing directories.
/// A missing source is a no-op.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    if !src.exists() {
        return Ok(());
    }

    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path)?;
            log::info!("Copied {} to {}", src_path.display(), dest_path.display());
        }
    }
    Ok(())
}

/// Merge incoming settings onto existing ones.
///
/// `permissions.allow` and `permissions.deny` become the union of both
/// lists, existing entries first, duplicates removed. Each `hooks.<type>`
/// list gets the incoming entries appended. Every other existing key is
/// left as-is.
pub fn merge_settings(existing: Value, incoming: &Value) -> Value {
    let mut merged = match existing {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(incoming_perms) = incoming.get("permissions").and_then(Value::as_object) {
        let perms_value = merged
            .entry("permissions".to_string())
            .or_insert_with(|| json!({}));
        if !perms_value.is_object() {
            *perms_value = json!({});
        }
        if let Some(perms) = perms_value.as_object_mut() {
            for list in ["allow", "deny"] {
                let combined = merged_list(perms.get(list), incoming_perms.get(list));
                perms.insert(list.to_string(), Value::Array(combined));
            }
        }
    }

    if let Some(incoming_hooks) = incoming.get("hooks").and_then(Value::as_object) {
        let hooks_value = merged
            .entry("hooks".to_string())
            .or_insert_with(|| json!({}));
        if !hooks_value.is_object() {
            *hooks_value = json!({});
        }
        if let Some(hooks) = hooks_value.as_object_mut() {
            for (hook_type, configs) in incoming_hooks {
                let slot = hooks
                    .entry(hook_type.clone())
                    .or_insert_with(|| json!([]));
                if !slot.is_array() {
                    *slot = json!([]);
                }
                if let (Some(existing_list), Some(incoming_list)) =
                    (slot.as_array_mut(), configs.as_array())
                {
                    existing_list.extend(incoming_list.iter().cloned());
                }
            }
        }
    }

    Value::Object(merged)
}

/// Order-preserving union of two JSON arrays. Lists are small enough that a
/// linear duplicate scan is fine.
fn merged_list(existing: Option<&Value>, incoming: Option<&Value>) -> Vec<Value> {
    let mut combined: Vec<Value> = Vec::new();
    for value in [existing, incoming]
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
    {
        if !combined.contains(value) {
            combined.push(value.clone());
        }
    }
    combined
}

/// Read installed settings; missing or unparseable files read as empty.
fn read_settings_lenient(path: &Path) -> Value {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Could not parse existing settings at {}: {}", path.display(), e);
            json!({})
        }),
        Err(_) => json!({}),
    }
}

/// Read settings shipped by the source; a missing file reads as empty, but a
/// malformed one is the packager's bug and is surfaced.
fn read_settings_strict(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(json!({}));
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
