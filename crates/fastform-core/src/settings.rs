//! Settings for fastform.
//!
//! [`Settings`] holds library-wide defaults: logging configuration, the
//! layout and submit label applied to forms that do not set their own, and
//! the validation triggers handed to the form-state engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// The complete set of library settings.
///
/// # Examples
///
/// ```
/// use fastform_core::settings::Settings;
/// use fastform_core::Layout;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.default_layout, Layout::Horizontal);
/// assert!(!settings.validate_on_change);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "fastform=debug").
    pub log_level: String,

    // ── Form defaults ────────────────────────────────────────────────

    /// Layout used by forms that do not specify one.
    pub default_layout: Layout,
    /// Submit label used by forms that do not specify one.
    pub default_submit_label: Option<String>,

    // ── Validation triggers ──────────────────────────────────────────

    /// Validate a field whenever its value is set through the default mutator.
    pub validate_on_change: bool,
    /// Validate a field when it is marked touched (the user leaves it).
    pub validate_on_blur: bool,
    /// Validate the whole form when it is mounted.
    pub validate_on_mount: bool,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            default_layout: Layout::Horizontal,
            default_submit_label: None,
            validate_on_change: false,
            validate_on_blur: true,
            validate_on_mount: false,
            extra: HashMap::new(),
        }
    }
}
