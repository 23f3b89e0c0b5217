// src/error.rs

//! Unified error handling for the monitor application.

use std::fmt;

use thiserror::Error;

use crate::models::ContentType;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The monitored page or channel no longer exists in the organisation config
    #[error("No {content_type} source '{name}' configured for organisation '{code}'")]
    ConfigurationMissing {
        code: String,
        content_type: ContentType,
        name: String,
    },

    /// Listing fetch failed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// Detail lookup for a single item failed
    #[error("Detail resolution failed for item {id}: {message}")]
    DetailResolution { id: String, message: String },

    /// Snapshot write rejected because the item count collapsed
    #[error(
        "Snapshot rejected: {previous_count} -> {current_count} items ({drop_percent:.1}% drop)"
    )]
    SnapshotGuard {
        current_count: usize,
        previous_count: usize,
        drop_percent: f64,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a missing source configuration error.
    pub fn configuration_missing(
        code: impl Into<String>,
        content_type: ContentType,
        name: impl Into<String>,
    ) -> Self {
        Self::ConfigurationMissing {
            code: code.into(),
            content_type,
            name: name.into(),
        }
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a detail resolution error.
    pub fn detail(id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::DetailResolution {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error means the monitor points at a source that is gone.
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, Self::ConfigurationMissing { .. })
    }
}
