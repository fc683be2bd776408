//! Loading [`Settings`] from TOML or JSON and from the environment.
//!
//! Documents are partial: every key they leave out keeps its default.
//! Environment variables are applied last and win over the file.
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FASTFORM_DEBUG` | `debug` |
//! | `FASTFORM_LOG_LEVEL` | `log_level` |
//! | `FASTFORM_DEFAULT_LAYOUT` | `default_layout` |
//! | `FASTFORM_DEFAULT_SUBMIT_LABEL` | `default_submit_label` |
//!
//! ```rust,no_run
//! use fastform_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("config/fastform.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::FastFormError;
use crate::layout::Layout;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys absent from the document keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or a value has the wrong type.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FastFormError> {
    toml::from_str(toml_str).map_err(|e| parse_error("TOML", &e))
}

/// Loads settings from a JSON string.
///
/// Keys absent from the document keep their default values.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a value has the wrong type.
pub fn from_json_str(json_str: &str) -> Result<Settings, FastFormError> {
    serde_json::from_str(json_str).map_err(|e| parse_error("JSON", &e))
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are invalid.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FastFormError> {
    from_toml_str(&read_config_file(path.as_ref())?)
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are invalid.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FastFormError> {
    from_json_str(&read_config_file(path.as_ref())?)
}

/// Loads settings from a file, picking the format from its extension
/// (`.toml` or `.json`), then applies environment overrides.
///
/// # Errors
///
/// Returns an error for an unknown extension, an unreadable file or invalid contents.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FastFormError> {
    let path = path.as_ref();
    let mut settings = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => from_toml_file(path)?,
        Some("json") => from_json_file(path)?,
        _ => {
            return Err(FastFormError::ConfigurationError(format!(
                "unsupported settings file '{}': expected .toml or .json",
                path.display()
            )))
        }
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `FASTFORM_DEBUG` -> `debug` (values: "true"/"1"/"yes" => true, anything else => false)
/// - `FASTFORM_LOG_LEVEL` -> `log_level`
/// - `FASTFORM_DEFAULT_LAYOUT` -> `default_layout` (unknown layouts are ignored)
/// - `FASTFORM_DEFAULT_SUBMIT_LABEL` -> `default_submit_label` (empty clears it)
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FASTFORM_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FASTFORM_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FASTFORM_DEFAULT_LAYOUT") {
        match val.parse::<Layout>() {
            Ok(layout) => settings.default_layout = layout,
            Err(e) => tracing::warn!(error = %e, "ignoring FASTFORM_DEFAULT_LAYOUT"),
        }
    }

    if let Ok(val) = std::env::var("FASTFORM_DEFAULT_SUBMIT_LABEL") {
        settings.default_submit_label = if val.is_empty() { None } else { Some(val) };
    }
}

fn read_config_file(path: &Path) -> Result<String, FastFormError> {
    std::fs::read_to_string(path).map_err(|e| {
        FastFormError::ConfigurationError(format!(
            "cannot read settings file '{}': {e}",
            path.display()
        ))
    })
}

fn parse_error(kind: &str, err: &dyn std::fmt::Display) -> FastFormError {
    FastFormError::ConfigurationError(format!("invalid {kind} settings: {err}"))
}
