//! Error types for the adaptive UI engine.
//!
//! Only configuration and persistence can fail. Per-frame conditions
//! (no tracker, disconnect, user away, missing element references) are
//! reported as values, never as errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdaptiveUiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Duplicate element name: {0}")]
    DuplicateElement(String),

    #[error("Element {0} is already the target of another patch")]
    SharedTarget(String),

    #[error("Unknown mode: {0} (expected none, mixed, transparent, icon or scale)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, AdaptiveUiError>;
