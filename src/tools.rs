//! JSON tool surface shared by the CLI and any external tool host.
//!
//! Every tool is a pure function over an explicit base directory: load the
//! inventory, run the core operation, shape the outcome as a serde_json
//! payload ready for rendering. No hidden globals, so a future transport can
//! call these directly.

use std::path::Path;

use serde_json::{Value, json};

use crate::error::{Result, WtplanError};
use crate::inventory::{INVENTORY_FILE, Inventory, ensure_inventory, init_workspace_layout};
use crate::links::{apply_links, plan_links};
use crate::policy::effective_policy;
use crate::workspace::workspace_path;

/// Workspace addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceMode {
    /// Address through a named preset; id derived from its primary repo.
    Preset,
    /// Address a single repository directly.
    Repo,
}

impl WorkspaceMode {
    /// JSON key the identifier is reported under.
    pub fn key(self) -> &'static str {
        match self {
            WorkspaceMode::Preset => "preset",
            WorkspaceMode::Repo => "repo",
        }
    }
}

/// Options shared by the workspace add tools.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Base directory override, echoed back in the payload.
    pub base: Option<String>,
    /// Apply the plan instead of only reporting it.
    pub apply: bool,
    /// Force overwrite when syncing links.
    pub force_links: bool,
    /// Delete extra destination files when syncing.
    pub delete_links: bool,
}

/// Inventory location for one invocation: explicit config path if given,
/// else the default-named file in the base directory.
fn inventory_path(base_dir: &Path, config_path: Option<&Path>) -> std::path::PathBuf {
    match config_path {
        Some(path) => path.to_path_buf(),
        None => base_dir.join(INVENTORY_FILE),
    }
}

/// Initialize the inventory and workspace layout.
pub fn init(base_dir: &Path, toolbox_dir: Option<&str>, config_path: Option<&Path>) -> Result<Value> {
    let inv_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => ensure_inventory(base_dir, toolbox_dir)?,
    };
    let mut inv = match Inventory::load(&inv_path) {
        Ok(inv) => inv,
        Err(WtplanError::InventoryNotFound(_)) => {
            // Explicit config path outside the default location
            let inv = Inventory {
                toolbox_dir: toolbox_dir.map(str::to_owned),
                ..Default::default()
            };
            inv.save(&inv_path)?;
            inv
        }
        Err(e) => return Err(e),
    };
    if let (Some(toolbox), None) = (toolbox_dir, &inv.toolbox_dir) {
        inv.toolbox_dir = Some(toolbox.to_string());
        inv.save(&inv_path)?;
    }

    let layout = init_workspace_layout(&inv, base_dir)?;
    Ok(json!({
        "inventory": inv_path.display().to_string(),
        "layout": {
            "root": layout.root.display().to_string(),
            "bare_dir": layout.bare_dir.display().to_string(),
            "workspaces_dir": layout.workspaces_dir.display().to_string(),
        },
    }))
}

/// Summarize differences between the inventory and the actual state.
///
/// `workspace_id` is accepted for interface compatibility; link plans are
/// currently global, not per-workspace.
pub fn plan(base_dir: &Path, workspace_id: Option<&str>, config_path: Option<&Path>) -> Result<Value> {
    let _ = workspace_id;
    let inv_path = inventory_path(base_dir, config_path);
    let inv = match Inventory::load(&inv_path) {
        Ok(inv) => inv,
        Err(WtplanError::InventoryNotFound(path)) => {
            return Ok(json!({
                "error": format!("Inventory not found: {}. Run 'wtplan init' first.", path.display()),
            }));
        }
        Err(e) => return Err(e),
    };

    let policy = effective_policy(&inv, false, false);
    let items = plan_links(&inv, base_dir, policy);
    Ok(json!({
        "links_repo_root": items,
        "note": "git worktree operations are not implemented in v0.1",
    }))
}

/// Create a workspace (plan by default, mutate with `opts.apply`).
pub fn workspace_add(
    base_dir: &Path,
    mode: WorkspaceMode,
    identifier: &str,
    issue_iid: u32,
    opts: &AddOptions,
    config_path: Option<&Path>,
) -> Result<Value> {
    let inv = Inventory::load(&inventory_path(base_dir, config_path))?;

    let (preset, repo) = split_identifier(mode, identifier);
    let ws_path = match workspace_path(&inv, base_dir, preset, Some(issue_iid), repo) {
        Ok(path) => path,
        Err(WtplanError::UnknownPreset(name)) => {
            return Ok(json!({
                "error": format!("Unknown {}: {}", mode.key(), identifier),
                "details": WtplanError::UnknownPreset(name).to_string(),
            }));
        }
        Err(e) => return Err(e),
    };

    let policy = effective_policy(&inv, opts.force_links, opts.delete_links);

    let mut result = serde_json::Map::new();
    result.insert("apply".to_string(), json!(opts.apply));
    result.insert("base".to_string(), json!(opts.base));
    result.insert(mode.key().to_string(), json!(identifier));
    result.insert("issue_iid".to_string(), json!(issue_iid));

    if opts.apply {
        let applied = apply_links(&inv, base_dir, policy)?;
        result.insert("result".to_string(), serde_json::to_value(applied)?);
    } else {
        let planned = plan_links(&inv, base_dir, policy);
        result.insert("plan".to_string(), serde_json::to_value(planned)?);
    }

    if mode == WorkspaceMode::Repo {
        result.insert("workspace".to_string(), json!(ws_path.display().to_string()));
        result.insert("mode".to_string(), json!("single_repo"));
    }

    Ok(Value::Object(result))
}

/// Remove a workspace. Stub: safe removal needs repository state analysis
/// (dirty/unpushed/diverged) which is not implemented in this version.
pub fn workspace_remove(
    mode: WorkspaceMode,
    identifier: &str,
    issue_iid: u32,
    force: bool,
    apply: bool,
) -> Value {
    let mut result = serde_json::Map::new();
    result.insert("apply".to_string(), json!(apply));
    result.insert("force".to_string(), json!(force));
    result.insert(
        "note".to_string(),
        json!("safe delete (dirty/unpushed/diverged/unknown) is not implemented in v0.1"),
    );
    result.insert(mode.key().to_string(), json!(identifier));
    result.insert("issue_iid".to_string(), json!(issue_iid));
    if mode == WorkspaceMode::Repo {
        result.insert("mode".to_string(), json!("single_repo"));
    }
    Value::Object(result)
}

/// Resolve the absolute workspace path (read-only reference).
///
/// Unlike [`workspace_add`], an unknown preset propagates as an error here.
pub fn workspace_path_query(
    base_dir: &Path,
    mode: WorkspaceMode,
    identifier: &str,
    issue_iid: u32,
    config_path: Option<&Path>,
) -> Result<Value> {
    let inv = Inventory::load(&inventory_path(base_dir, config_path))?;
    let (preset, repo) = split_identifier(mode, identifier);
    let path = workspace_path(&inv, base_dir, preset, Some(issue_iid), repo)?;

    let mut result = serde_json::Map::new();
    result.insert("path".to_string(), json!(path.display().to_string()));
    result.insert(mode.key().to_string(), json!(identifier));
    result.insert("issue_iid".to_string(), json!(issue_iid));
    if mode == WorkspaceMode::Repo {
        result.insert("mode".to_string(), json!("single_repo"));
    }
    Ok(Value::Object(result))
}

fn split_identifier(mode: WorkspaceMode, identifier: &str) -> (Option<&str>, Option<&str>) {
    match mode {
        WorkspaceMode::Preset => (Some(identifier), None),
        WorkspaceMode::Repo => (None, Some(identifier)),
    }
}
