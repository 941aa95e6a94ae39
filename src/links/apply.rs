//! Mutating half of the reconciliation engine.
//!
//! Executes the declared link state against the filesystem. Each link is
//! handled to completion independently; there is no transaction across links,
//! so a failure partway leaves earlier links applied. A re-run converges:
//! entries that already match report NOOP and removal of already-gone paths
//! is tolerated.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use super::{ActionKind, PlanItem, TargetState, classify_target, resolve_link, toolbox_root};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::policy::{LinkPolicy, LinkType};

/// Apply the declared link state, returning what was actually done.
///
/// The returned sequence is computed independently of [`super::plan_links`];
/// the two may diverge if the filesystem changes between calls. Same early
/// exits as plan: empty when no toolbox is configured, single CONFLICT when
/// the toolbox directory is missing.
pub fn apply_links(inv: &Inventory, base_dir: &Path, policy: LinkPolicy) -> Result<Vec<PlanItem>> {
    let Some(toolbox) = toolbox_root(inv, base_dir) else {
        return Ok(Vec::new());
    };
    if !toolbox.exists() {
        return Ok(vec![PlanItem::new(
            ActionKind::Conflict,
            &toolbox,
            "toolbox_dir does not exist",
        )]);
    }

    let mut out = Vec::new();
    for spec in &inv.links_repo_root {
        let link = resolve_link(&toolbox, base_dir, spec, policy);
        debug!("apply: {} -> {}", link.src.display(), link.dst.display());

        if let Some(parent) = link.dst.parent() {
            fs::create_dir_all(parent)?;
        }

        match classify_target(&link) {
            TargetState::MissingSource => {
                out.push(PlanItem::new(
                    ActionKind::Conflict,
                    &link.dst,
                    format!("missing source: {}", link.src.display()),
                ));
                continue;
            }
            TargetState::Linked => {
                out.push(PlanItem::new(ActionKind::Noop, &link.dst, "already linked"));
                continue;
            }
            TargetState::Copied => {
                out.push(PlanItem::new(
                    ActionKind::Noop,
                    &link.dst,
                    "already copied (shallow match)",
                ));
                continue;
            }
            TargetState::Diverged => {
                if !link.policy.force {
                    out.push(PlanItem::new(
                        ActionKind::Conflict,
                        &link.dst,
                        "existing differs (use --force-links)",
                    ));
                    continue;
                }
                remove_existing(&link.dst)?;
            }
            TargetState::Absent => {}
        }

        match link.policy.link_type {
            LinkType::Symlink => {
                std::os::unix::fs::symlink(&link.src, &link.dst)?;
                out.push(PlanItem::new(
                    ActionKind::Add,
                    &link.dst,
                    format!("symlink -> {}", link.src.display()),
                ));
            }
            LinkType::Copy => {
                // fs::copy carries permissions but not timestamps; shallow
                // equality is size-based, so mtimes are never consulted.
                if link.src.is_dir() {
                    copy_tree(&link.src, &link.dst)?;
                    out.push(PlanItem::new(ActionKind::Add, &link.dst, "copied directory tree"));
                    if link.policy.delete {
                        delete_extras(&link.src, &link.dst)?;
                        out.push(PlanItem::new(
                            ActionKind::Delete,
                            &link.dst,
                            "deleted extras (rsync -a --delete)",
                        ));
                    }
                } else {
                    fs::copy(&link.src, &link.dst)?;
                    out.push(PlanItem::new(ActionKind::Add, &link.dst, "copied file"));
                }
            }
        }
    }

    Ok(out)
}

/// Remove whatever occupies the destination, tolerating an entry that is
/// already gone. Symlinks are unlinked, never followed.
fn remove_existing(dst: &Path) -> Result<()> {
    let meta = match dst.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let removed = if meta.is_dir() {
        fs::remove_dir_all(dst)
    } else {
        fs::remove_file(dst)
    };
    match removed {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => Ok(other?),
    }
}

/// Recursively copy `src` into `dst`, merging into existing directories.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove destination entries, by name at every directory level, that have
/// no counterpart under the source tree.
fn delete_extras(src: &Path, dst: &Path) -> Result<()> {
    for entry in fs::read_dir(dst)? {
        let entry = entry?;
        let counterpart = src.join(entry.file_name());
        if counterpart.exists() {
            if counterpart.is_dir() && entry.file_type()?.is_dir() {
                delete_extras(&counterpart, &entry.path())?;
            }
            continue;
        }
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())
        } else {
            fs::remove_file(entry.path())
        };
        if let Err(e) = removed {
            // Tolerate races where the extra entry is already gone
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }
    }
    Ok(())
}
