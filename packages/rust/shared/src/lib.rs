//! Shared types, error model, and configuration for sectioner.
//!
//! This crate is the foundation depended on by all other sectioner crates.
//! It provides:
//! - [`SectionerError`] — the unified error type
//! - Domain types ([`Section`], [`SectionId`], [`SectionState`])
//! - Configuration ([`AppConfig`], [`WidgetOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClassConfig, LabelConfig, MarkerConfig, RenderConfig, WidgetOptions, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SectionerError};
pub use types::{Section, SectionId, SectionState, SectionSummary};
