//! wtplan - declarative per-issue workspace layouts
//!
//! wtplan manages per-issue workspace directories across multiple
//! repositories. A YAML inventory (`.wtplan.yml`) declares the desired state:
//! workspace layout, named presets, and links/copies projected from a shared
//! toolbox directory. The plan engine computes the minimal set of actions to
//! converge the filesystem; the apply engine executes them idempotently.

pub mod error;
pub mod inventory;
pub mod links;
pub mod policy;
pub mod tools;
pub mod workspace;

pub use error::{Result, WtplanError};
