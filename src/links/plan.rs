//! Read-only diff between declared links and the live filesystem.

use std::path::Path;

use log::debug;

use super::{ActionKind, PlanItem, TargetState, classify_target, resolve_link, toolbox_root};
use crate::inventory::Inventory;
use crate::policy::{LinkPolicy, LinkType};

/// Compute the actions needed to converge `base_dir` to the declared link
/// state. Purely informational; never mutates anything.
///
/// Returns an empty plan when no toolbox is configured, and a single
/// CONFLICT naming the toolbox path when the configured toolbox directory
/// does not exist.
pub fn plan_links(inv: &Inventory, base_dir: &Path, policy: LinkPolicy) -> Vec<PlanItem> {
    let Some(toolbox) = toolbox_root(inv, base_dir) else {
        return Vec::new();
    };
    if !toolbox.exists() {
        return vec![PlanItem::new(
            ActionKind::Conflict,
            &toolbox,
            "toolbox_dir does not exist",
        )];
    }

    let mut plan = Vec::new();
    for spec in &inv.links_repo_root {
        let link = resolve_link(&toolbox, base_dir, spec, policy);
        debug!("plan: {} -> {}", link.src.display(), link.dst.display());

        match classify_target(&link) {
            TargetState::MissingSource => plan.push(PlanItem::new(
                ActionKind::Conflict,
                &link.dst,
                format!("missing source: {}", link.src.display()),
            )),
            TargetState::Absent => plan.push(PlanItem::new(
                ActionKind::Add,
                &link.dst,
                format!("{} from {}", link.policy.link_type, link.src.display()),
            )),
            TargetState::Linked => {
                plan.push(PlanItem::new(ActionKind::Noop, &link.dst, "already linked"));
            }
            TargetState::Copied => plan.push(PlanItem::new(
                ActionKind::Noop,
                &link.dst,
                "already copied (shallow match)",
            )),
            TargetState::Diverged => match link.policy.link_type {
                LinkType::Symlink => {
                    let (kind, detail) = if link.policy.force {
                        (ActionKind::Update, "replace existing with symlink")
                    } else {
                        (ActionKind::Conflict, "existing differs")
                    };
                    plan.push(PlanItem::new(kind, &link.dst, detail));
                }
                LinkType::Copy => {
                    let kind = if link.policy.force {
                        ActionKind::Update
                    } else {
                        ActionKind::Conflict
                    };
                    plan.push(PlanItem::new(kind, &link.dst, "copy update"));
                    if link.policy.delete {
                        // Descriptive placeholder; the read-only pass does not
                        // enumerate which destination entries would go.
                        plan.push(PlanItem::new(
                            ActionKind::Delete,
                            &link.dst,
                            "delete extra files (rsync -a --delete)",
                        ));
                    }
                }
            },
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::LinkSpec;
    use std::fs;
    use tempfile::TempDir;

    fn inventory_with_toolbox(temp: &TempDir, specs: Vec<LinkSpec>) -> Inventory {
        let toolbox = temp.path().join("toolbox");
        fs::create_dir_all(&toolbox).unwrap();
        Inventory {
            toolbox_dir: Some(toolbox.display().to_string()),
            links_repo_root: specs,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_toolbox_configured_is_inert() {
        let temp = TempDir::new().unwrap();
        let inv = Inventory::default();
        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_missing_toolbox_short_circuits() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("no-such-toolbox");
        let inv = Inventory {
            toolbox_dir: Some(missing.display().to_string()),
            links_repo_root: vec![LinkSpec::new("a"), LinkSpec::new("b")],
            ..Default::default()
        };

        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, ActionKind::Conflict);
        assert_eq!(plan[0].target, missing.display().to_string());
        assert_eq!(plan[0].detail, "toolbox_dir does not exist");
    }

    #[test]
    fn test_missing_source_is_conflict() {
        let temp = TempDir::new().unwrap();
        let inv = inventory_with_toolbox(&temp, vec![LinkSpec::new("gone")]);
        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, ActionKind::Conflict);
        assert!(plan[0].detail.contains("missing source"));
    }

    #[test]
    fn test_absent_destination_is_add() {
        let temp = TempDir::new().unwrap();
        let inv = inventory_with_toolbox(&temp, vec![LinkSpec::new("tool")]);
        fs::write(temp.path().join("toolbox/tool"), "x").unwrap();

        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, ActionKind::Add);
        assert!(plan[0].detail.starts_with("symlink from "));
    }

    #[test]
    fn test_existing_symlink_noop() {
        let temp = TempDir::new().unwrap();
        let inv = inventory_with_toolbox(&temp, vec![LinkSpec::new("tool")]);
        let src = temp.path().join("toolbox/tool");
        fs::write(&src, "x").unwrap();
        std::os::unix::fs::symlink(&src, temp.path().join("tool")).unwrap();

        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, ActionKind::Noop);
        assert_eq!(plan[0].detail, "already linked");
    }

    #[test]
    fn test_diverged_symlink_force_gate() {
        let temp = TempDir::new().unwrap();
        let inv = inventory_with_toolbox(&temp, vec![LinkSpec::new("tool")]);
        fs::write(temp.path().join("toolbox/tool"), "x").unwrap();
        fs::write(temp.path().join("tool"), "stale").unwrap();

        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert_eq!(plan[0].kind, ActionKind::Conflict);
        assert_eq!(plan[0].detail, "existing differs");

        let forced = LinkPolicy {
            force: true,
            ..Default::default()
        };
        let plan = plan_links(&inv, temp.path(), forced);
        assert_eq!(plan[0].kind, ActionKind::Update);
        assert_eq!(plan[0].detail, "replace existing with symlink");
    }

    #[test]
    fn test_copy_diverged_with_delete_emits_pair() {
        let temp = TempDir::new().unwrap();
        let inv = inventory_with_toolbox(&temp, vec![LinkSpec::new("conf")]);
        fs::create_dir(temp.path().join("toolbox/conf")).unwrap();
        fs::create_dir(temp.path().join("conf")).unwrap();

        let policy = LinkPolicy {
            link_type: crate::policy::LinkType::Copy,
            force: true,
            delete: true,
        };
        let plan = plan_links(&inv, temp.path(), policy);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].kind, ActionKind::Update);
        assert_eq!(plan[0].detail, "copy update");
        assert_eq!(plan[1].kind, ActionKind::Delete);
        assert_eq!(plan[1].target, plan[0].target);
    }

    #[test]
    fn test_items_emitted_in_declaration_order() {
        let temp = TempDir::new().unwrap();
        let inv = inventory_with_toolbox(&temp, vec![LinkSpec::new("b"), LinkSpec::new("a")]);
        fs::write(temp.path().join("toolbox/a"), "x").unwrap();
        fs::write(temp.path().join("toolbox/b"), "x").unwrap();

        let plan = plan_links(&inv, temp.path(), LinkPolicy::default());
        assert_eq!(plan.len(), 2);
        assert!(plan[0].target.ends_with("/b"));
        assert!(plan[1].target.ends_with("/a"));
    }
}
