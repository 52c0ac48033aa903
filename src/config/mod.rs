// src/config/mod.rs

//! Settings loading and validation for deep-research.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a settings file from disk (`loader.rs`).
//! - Validate basic invariants like interval bounds (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_settings_path, load_and_validate, load_from_path, write_default};
pub use model::{PollIntervals, RawSettingsFile, ResearchSection, Settings};
