// src/models/mod.rs

//! Domain models for the monitor application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod content;
mod organisation;

// Re-export all public types
pub use config::{CheckerConfig, Config, GuardConfig, PathsConfig};
pub use content::{ContentItem, ContentSnapshot, ContentType, Listing, SourceKey};
pub use organisation::{ChannelConfig, OrganisationConfig, PageConfig, SourceConfig};
