//! Link reconciliation engine.
//!
//! Compares declared toolbox links against the live filesystem and converges
//! on the declared state. [`plan_links`] is the read-only half; [`apply_links`]
//! the mutating half. Both classify each destination through one shared
//! [`classify_target`] step, so they can never disagree on what counts as a
//! NOOP or a CONFLICT.

mod apply;
mod plan;

pub use apply::apply_links;
pub use plan::plan_links;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::inventory::{Inventory, LinkSpec, normalize};
use crate::policy::{LinkPolicy, LinkType, per_link_policy};

/// Action classification for one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Noop,
    Add,
    Update,
    Delete,
    Conflict,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Noop => write!(f, "NOOP"),
            ActionKind::Add => write!(f, "ADD"),
            ActionKind::Update => write!(f, "UPDATE"),
            ActionKind::Delete => write!(f, "DELETE"),
            ActionKind::Conflict => write!(f, "CONFLICT"),
        }
    }
}

/// One row of a plan or apply report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// What needs to happen (plan) or what was done (apply).
    pub kind: ActionKind,
    /// Absolute destination path.
    pub target: String,
    /// Human-readable reason.
    pub detail: String,
}

impl PlanItem {
    pub(crate) fn new(kind: ActionKind, target: &Path, detail: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.display().to_string(),
            detail: detail.into(),
        }
    }
}

/// A link spec resolved against the toolbox and the destination base.
#[derive(Debug)]
pub(crate) struct ResolvedLink {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub policy: LinkPolicy,
}

pub(crate) fn resolve_link(
    toolbox: &Path,
    base_dir: &Path,
    spec: &LinkSpec,
    default: LinkPolicy,
) -> ResolvedLink {
    ResolvedLink {
        src: toolbox.join(&spec.source),
        dst: normalize(&base_dir.join(spec.target_name())),
        policy: per_link_policy(spec, default),
    }
}

/// Toolbox root, if one is configured. A relative path is resolved against
/// the base directory.
pub(crate) fn toolbox_root(inv: &Inventory, base_dir: &Path) -> Option<PathBuf> {
    inv.toolbox_dir.as_deref().map(|toolbox| {
        let path = Path::new(toolbox);
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&base_dir.join(path))
        }
    })
}

/// Current state of a destination relative to its toolbox source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetState {
    /// Toolbox source is missing; nothing can be done for this link.
    MissingSource,
    /// Destination absent; the link can be created.
    Absent,
    /// Destination is already a symlink resolving to the source.
    Linked,
    /// Destination is a plain file shallow-equal to the source file.
    Copied,
    /// Destination exists but differs from the declared state.
    Diverged,
}

/// Inspect the destination of one resolved link.
///
/// Existence is checked without following symlinks, so a dangling symlink
/// counts as a present, diverged entry rather than an absent one.
pub(crate) fn classify_target(link: &ResolvedLink) -> TargetState {
    if !link.src.exists() {
        return TargetState::MissingSource;
    }
    if link.dst.symlink_metadata().is_err() {
        return TargetState::Absent;
    }
    match link.policy.link_type {
        LinkType::Symlink => {
            if link.dst.is_symlink() && resolves_to(&link.dst, &link.src) {
                TargetState::Linked
            } else {
                TargetState::Diverged
            }
        }
        LinkType::Copy => {
            if shallow_equal(&link.src, &link.dst) {
                TargetState::Copied
            } else {
                TargetState::Diverged
            }
        }
    }
}

/// True when both paths resolve to the same real file.
fn resolves_to(dst: &Path, src: &Path) -> bool {
    match (fs::canonicalize(dst), fs::canonicalize(src)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Shallow copy equality: both are plain files with equal byte size.
///
/// Directories never compare equal, so directory copies always re-sync.
/// The approximation is intentional; content is not hashed.
fn shallow_equal(src: &Path, dst: &Path) -> bool {
    match (fs::metadata(src), fs::metadata(dst)) {
        (Ok(s), Ok(d)) => s.is_file() && d.is_file() && s.len() == d.len(),
        _ => false,
    }
}
