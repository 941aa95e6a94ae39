//! Deterministic workspace addressing.
//!
//! A workspace is a per-issue directory under `workspaces_dir`, identified by
//! `{REPO_UPPER}_ISSUE_{iid:04}`. In preset mode the id comes from the
//! preset's primary repository; in single-repo mode from the repo name itself.

use std::path::{Path, PathBuf};

use crate::error::{Result, WtplanError};
use crate::inventory::{Inventory, resolve_paths};

/// Fallback repository name when neither a preset nor a repo is given.
const DEFAULT_REPO: &str = "default";

/// Derive the workspace identifier from an uppercased repository name and an
/// issue number. Zero-padded to four digits; wider issue numbers keep their
/// natural width.
pub fn compute_workspace_id(repo_upper: &str, iid: u32) -> String {
    format!("{repo_upper}_ISSUE_{iid:04}")
}

/// Resolve the on-disk path for a workspace member.
///
/// Preset mode (`preset` given): the workspace id is always derived from the
/// preset's primary repository; `repo` only selects which member subdirectory
/// is addressed. Fails with [`WtplanError::UnknownPreset`] for an undeclared
/// preset name.
///
/// Single-repo mode (`preset` absent): the id is derived from `repo`, falling
/// back to a literal default name when that is absent too.
pub fn workspace_path(
    inv: &Inventory,
    base_dir: &Path,
    preset: Option<&str>,
    iid: Option<u32>,
    repo: Option<&str>,
) -> Result<PathBuf> {
    let (primary, alias) = match preset {
        None => {
            let primary = repo.unwrap_or(DEFAULT_REPO).to_string();
            let alias = primary.clone();
            (primary, alias)
        }
        Some(name) => {
            let preset = inv
                .presets
                .get(name)
                .ok_or_else(|| WtplanError::UnknownPreset(name.to_string()))?;
            let alias = repo.unwrap_or(preset.primary_repo.as_str()).to_string();
            (preset.primary_repo.clone(), alias)
        }
    };

    let ws_id = compute_workspace_id(&primary.to_uppercase(), iid.unwrap_or(0));
    let paths = resolve_paths(inv, base_dir);
    Ok(paths.workspaces_dir.join(ws_id).join(alias))
}
