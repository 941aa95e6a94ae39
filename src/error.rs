//! Error types for wtplan
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that can occur in wtplan
#[derive(Debug, Error)]
pub enum WtplanError {
    /// Inventory file does not exist
    #[error("Inventory not found: {}", .0.display())]
    InventoryNotFound(PathBuf),

    /// Inventory file exists but is not a usable document
    #[error("Invalid inventory: {0}")]
    InvalidInventory(String),

    /// Preset name not declared in the inventory
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for wtplan operations
pub type Result<T> = std::result::Result<T, WtplanError>;
