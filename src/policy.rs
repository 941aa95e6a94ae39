//! Link materialization policy.
//!
//! A [`LinkPolicy`] governs how a toolbox entry is projected into a workspace:
//! symlink vs copy, whether existing content may be replaced (force), and
//! whether extra destination entries are pruned after a copy (delete).
//!
//! The effective policy for one link is an overlay: inventory default, then
//! CLI flags, then the per-link override.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inventory::{Inventory, LinkSpec};

/// How a link is materialized on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Symbolic link pointing at the toolbox entry.
    #[default]
    Symlink,
    /// Full copy of the toolbox file or tree.
    Copy,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Symlink => write!(f, "symlink"),
            LinkType::Copy => write!(f, "copy"),
        }
    }
}

/// Fully resolved policy for one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPolicy {
    /// Materialization kind.
    #[serde(rename = "type")]
    pub link_type: LinkType,
    /// Replace an existing destination that differs.
    pub force: bool,
    /// After a directory copy, remove destination entries absent from the source.
    pub delete: bool,
}

/// Partial policy; unset fields fall back to the effective default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverride {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl PolicyOverride {
    /// Check if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.link_type.is_none() && self.force.is_none() && self.delete.is_none()
    }

    /// Resolve against a default policy, field by field.
    pub fn overlay(&self, default: LinkPolicy) -> LinkPolicy {
        LinkPolicy {
            link_type: self.link_type.unwrap_or(default.link_type),
            force: self.force.unwrap_or(default.force),
            delete: self.delete.unwrap_or(default.delete),
        }
    }
}

/// Compute the effective default policy for a run.
///
/// Starts from `default_policy.links_repo_root` in the inventory.
/// `cli_delete` implies force; neither CLI flag ever alters the link type.
pub fn effective_policy(inv: &Inventory, cli_force: bool, cli_delete: bool) -> LinkPolicy {
    let base = inv.default_policy.links_repo_root;

    let mut force = base.force;
    let mut delete = base.delete;
    if cli_force {
        force = true;
    }
    if cli_delete {
        force = true;
        delete = true;
    }

    LinkPolicy {
        link_type: base.link_type,
        force,
        delete,
    }
}

/// Resolve the policy for one link item.
///
/// An explicit `policy` sub-object wins; otherwise shorthand `type`/`force`/
/// `delete` keys on the item itself form the override. An item with neither
/// gets the default back untouched.
pub fn per_link_policy(item: &LinkSpec, default: LinkPolicy) -> LinkPolicy {
    if let Some(explicit) = &item.policy {
        return explicit.overlay(default);
    }
    let shorthand = item.shorthand_policy();
    if shorthand.is_empty() {
        default
    } else {
        shorthand.overlay(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_with_default(policy: LinkPolicy) -> Inventory {
        let mut inv = Inventory::default();
        inv.default_policy.links_repo_root = policy;
        inv
    }

    #[test]
    fn test_link_type_display() {
        assert_eq!(LinkType::Symlink.to_string(), "symlink");
        assert_eq!(LinkType::Copy.to_string(), "copy");
    }

    #[test]
    fn test_default_policy() {
        let policy = LinkPolicy::default();
        assert_eq!(policy.link_type, LinkType::Symlink);
        assert!(!policy.force);
        assert!(!policy.delete);
    }

    #[test]
    fn test_effective_policy_defaults() {
        let inv = Inventory::default();
        let policy = effective_policy(&inv, false, false);
        assert_eq!(policy, LinkPolicy::default());
    }

    #[test]
    fn test_effective_policy_cli_force() {
        let inv = Inventory::default();
        let policy = effective_policy(&inv, true, false);
        assert!(policy.force);
        assert!(!policy.delete);
    }

    #[test]
    fn test_effective_policy_cli_delete_implies_force() {
        let inv = Inventory::default();
        let policy = effective_policy(&inv, false, true);
        assert!(policy.force);
        assert!(policy.delete);
    }

    #[test]
    fn test_effective_policy_type_never_altered_by_cli() {
        let inv = inventory_with_default(LinkPolicy {
            link_type: LinkType::Copy,
            force: false,
            delete: false,
        });
        let policy = effective_policy(&inv, true, true);
        assert_eq!(policy.link_type, LinkType::Copy);
    }

    #[test]
    fn test_per_link_no_override_returns_default() {
        let item = LinkSpec::new("bin/tool");
        let default = LinkPolicy {
            link_type: LinkType::Copy,
            force: true,
            delete: false,
        };
        assert_eq!(per_link_policy(&item, default), default);
    }

    #[test]
    fn test_per_link_explicit_policy_partial_fallback() {
        let mut item = LinkSpec::new("bin/tool");
        item.policy = Some(PolicyOverride {
            force: Some(true),
            ..Default::default()
        });
        let resolved = per_link_policy(&item, LinkPolicy::default());
        assert!(resolved.force);
        assert_eq!(resolved.link_type, LinkType::Symlink);
        assert!(!resolved.delete);
    }

    #[test]
    fn test_per_link_shorthand_keys() {
        let mut item = LinkSpec::new("bin/tool");
        item.link_type = Some(LinkType::Copy);
        item.delete = Some(true);
        let resolved = per_link_policy(&item, LinkPolicy::default());
        assert_eq!(resolved.link_type, LinkType::Copy);
        assert!(resolved.delete);
        assert!(!resolved.force);
    }

    #[test]
    fn test_per_link_explicit_empty_policy_is_default() {
        let mut item = LinkSpec::new("bin/tool");
        item.policy = Some(PolicyOverride::default());
        let default = LinkPolicy {
            link_type: LinkType::Copy,
            force: true,
            delete: true,
        };
        assert_eq!(per_link_policy(&item, default), default);
    }

    #[test]
    fn test_parse_yaml_policy() {
        let policy: LinkPolicy = serde_yaml::from_str("type: copy\nforce: true\n").unwrap();
        assert_eq!(policy.link_type, LinkType::Copy);
        assert!(policy.force);
        assert!(!policy.delete);
    }
}
