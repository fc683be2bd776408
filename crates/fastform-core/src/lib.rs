//! # fastform-core
//!
//! Core types, settings, and error types for the fastform workspace.
//! This crate has no form-rendering logic and provides the foundation the
//! `fastform` crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`layout`] - Form layout vocabulary shared by settings and containers
//! - [`settings`] - Library settings with documented defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod layout;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FastFormError, FastFormResult, ValidationError};
pub use layout::Layout;
pub use settings::Settings;
