//! Typed inventory document (.wtplan.yml).
//!
//! The inventory is the single declarative description of a project root:
//! workspace layout directories, the optional toolbox, link declarations,
//! default policy, and named presets. It is read fully into memory, passed
//! explicitly into every operation, and rewritten as a whole file. Missing
//! keys resolve to their documented defaults at the load boundary, not at
//! each use site.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WtplanError};
use crate::policy::{LinkPolicy, LinkType, PolicyOverride};

/// Default inventory filename in a project root.
pub const INVENTORY_FILE: &str = ".wtplan.yml";

/// The desired-state document for one project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Document schema version.
    pub version: u32,

    /// Project root, relative to the base directory.
    pub root: String,

    /// Bare repository directory, relative to root.
    pub bare_dir: String,

    /// Workspaces directory, relative to root.
    pub workspaces_dir: String,

    /// Shared toolbox directory to project links from. Links are inert
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbox_dir: Option<String>,

    /// Default policies, keyed by link group.
    pub default_policy: DefaultPolicy,

    /// Named repository bundles.
    pub presets: BTreeMap<String, Preset>,

    /// Link declarations projected into the repo root, in order.
    pub links_repo_root: Vec<LinkSpec>,

    /// Free-form workspace bookkeeping; not interpreted by the engine.
    pub workspaces: serde_yaml::Value,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            version: 1,
            root: ".".to_string(),
            bare_dir: "bare".to_string(),
            workspaces_dir: "worktrees".to_string(),
            toolbox_dir: None,
            default_policy: DefaultPolicy::default(),
            presets: BTreeMap::new(),
            links_repo_root: Vec::new(),
            workspaces: serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        }
    }
}

impl Inventory {
    /// Load the inventory from a file.
    ///
    /// Fails with [`WtplanError::InventoryNotFound`] if the file does not
    /// exist and [`WtplanError::InvalidInventory`] if the top-level document
    /// is not a mapping.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WtplanError::InventoryNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&text)?;
        if !doc.is_mapping() {
            return Err(WtplanError::InvalidInventory(
                "inventory must be a mapping".to_string(),
            ));
        }
        Ok(serde_yaml::from_value(doc)?)
    }

    /// Serialize and write the inventory back as a whole-file replace.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Default policies for each link group.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPolicy {
    /// Default policy for `links_repo_root` items.
    pub links_repo_root: LinkPolicy,
}

/// A named bundle of repositories sharing one workspace identity.
///
/// Presets are declared in the inventory and read-only at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    /// Repository the workspace id is derived from.
    pub primary_repo: String,

    /// Member repositories checked out into the workspace.
    pub repos: Vec<String>,
}

/// One declared link from the toolbox into a workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSpec {
    /// Path relative to the toolbox directory.
    pub source: String,

    /// Path relative to the destination base; defaults to the source's
    /// final component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Explicit per-link policy override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyOverride>,

    // The same override keys may also appear directly on the item.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl LinkSpec {
    /// Create a link spec with just a source path.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Destination name for this link: explicit target, or the source's
    /// final path component.
    pub fn target_name(&self) -> &str {
        if let Some(target) = &self.target {
            return target;
        }
        Path::new(&self.source)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.source)
    }

    /// Override built from the shorthand top-level keys.
    pub(crate) fn shorthand_policy(&self) -> PolicyOverride {
        PolicyOverride {
            link_type: self.link_type,
            force: self.force,
            delete: self.delete,
        }
    }
}

/// The three layout directories, resolved to absolute normalized paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryPaths {
    pub root: PathBuf,
    pub bare_dir: PathBuf,
    pub workspaces_dir: PathBuf,
}

/// Resolve the layout directories against a base directory.
///
/// `bare_dir` and `workspaces_dir` are always subpaths of `root`.
pub fn resolve_paths(inv: &Inventory, base_dir: &Path) -> InventoryPaths {
    let root = normalize(&base_dir.join(&inv.root));
    InventoryPaths {
        bare_dir: normalize(&root.join(&inv.bare_dir)),
        workspaces_dir: normalize(&root.join(&inv.workspaces_dir)),
        root,
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem, so it works for paths
/// that do not exist yet.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(comp.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Create the inventory file with defaults if absent; no-op if present.
///
/// Returns the inventory path either way.
pub fn ensure_inventory(base_dir: &Path, toolbox_dir: Option<&str>) -> Result<PathBuf> {
    let inv_path = base_dir.join(INVENTORY_FILE);
    if inv_path.exists() {
        return Ok(inv_path);
    }
    let inv = Inventory {
        toolbox_dir: toolbox_dir.map(str::to_owned),
        ..Default::default()
    };
    inv.save(&inv_path)?;
    Ok(inv_path)
}

/// Create the bare and workspaces directories declared by the inventory.
pub fn init_workspace_layout(inv: &Inventory, base_dir: &Path) -> Result<InventoryPaths> {
    let paths = resolve_paths(inv, base_dir);
    fs::create_dir_all(&paths.bare_dir)?;
    fs::create_dir_all(&paths.workspaces_dir)?;
    Ok(paths)
}
