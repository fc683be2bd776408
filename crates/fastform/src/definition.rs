//! Form definitions loaded from TOML or JSON.
//!
//! A [`FormDefinition`] is the serializable part of a form: its field
//! descriptors, layout, submit label and initial values. Schemas, handlers
//! and render functions are code and are attached afterwards through
//! [`FormConfig`](crate::form::FormConfig).
//!
//! ```
//! use fastform::definition::FormDefinition;
//!
//! let def = FormDefinition::from_toml_str(r#"
//! layout = "vertical"
//! submit_label = "Sign up"
//!
//! [[fields]]
//! name = "email"
//! type = "text"
//! label = "E-mail"
//!
//! [[fields]]
//! name = "age"
//! type = "number"
//! default_value = 0
//! "#).unwrap();
//!
//! assert_eq!(def.fields.len(), 2);
//! assert_eq!(def.fields[1].field_type, "number");
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fastform_core::{FastFormError, FastFormResult, Layout};

use crate::meta::FieldMeta;
use crate::values::FormValues;

/// The serializable description of a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefinition {
    /// Field descriptors in declaration order.
    pub fields: Vec<FieldMeta>,
    /// Requested layout; `None` defers to settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// Submit control label; `None` defers to settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
    /// Caller initial values, laid over field defaults.
    pub initial_values: FormValues,
}

impl FormDefinition {
    /// Parses a definition from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`FastFormError::ConfigurationError`] if the TOML is malformed
    /// or the definition is inconsistent.
    pub fn from_toml_str(toml_str: &str) -> FastFormResult<Self> {
        let def: Self = toml::from_str(toml_str).map_err(|e| {
            FastFormError::ConfigurationError(format!("Failed to parse form TOML: {e}"))
        })?;
        def.validate()?;
        Ok(def)
    }

    /// Parses a definition from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`FastFormError::ConfigurationError`] if the JSON is malformed
    /// or the definition is inconsistent.
    pub fn from_json_str(json_str: &str) -> FastFormResult<Self> {
        let def: Self = serde_json::from_str(json_str).map_err(|e| {
            FastFormError::ConfigurationError(format!("Failed to parse form JSON: {e}"))
        })?;
        def.validate()?;
        Ok(def)
    }

    /// Loads a definition from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise see
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> FastFormResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Loads a definition from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise see
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> FastFormResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Checks that every field has a non-empty, unique name and a non-empty type.
    ///
    /// # Errors
    ///
    /// Returns [`FastFormError::ConfigurationError`] naming the first offending field.
    pub fn validate(&self) -> FastFormResult<()> {
        let mut seen = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(FastFormError::ConfigurationError(format!(
                    "field at position {index} has an empty name"
                )));
            }
            if field.field_type.is_empty() {
                return Err(FastFormError::ConfigurationError(format!(
                    "field '{}' has an empty type",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(FastFormError::ConfigurationError(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(())
    }
}
