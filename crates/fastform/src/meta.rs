//! Field descriptors.
//!
//! A [`FieldMeta`] is the static description of one form input: its name,
//! the registry key of the component that renders it, an optional label and
//! default value, and an open bag of extra attributes that is handed to the
//! component untouched.
//!
//! Descriptors are plain serde data so whole forms can be loaded from TOML
//! or JSON (see [`FormDefinition`](crate::definition::FormDefinition)). The
//! only non-serializable part is the optional render function used by the
//! built-in `custom` component.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::FieldRenderProps;

/// A render function carried by a field descriptor.
///
/// The built-in `custom` component calls it with the field's resolved props
/// instead of looking up a dedicated component.
pub type RenderFn = Arc<dyn Fn(&FieldRenderProps) -> String + Send + Sync>;

/// Static metadata describing one form input.
///
/// # Examples
///
/// ```
/// use fastform::meta::FieldMeta;
/// use serde_json::json;
///
/// let field = FieldMeta::new("age", "number")
///     .label("Age")
///     .default_value(json!(18))
///     .attr("min", json!(0));
///
/// assert_eq!(field.display_label(), "Age");
/// assert_eq!(field.initial_value(), json!(18));
/// assert_eq!(field.get_attr("min"), Some(&json!(0)));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    /// The field name, unique within a form.
    pub name: String,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The registry key of the component rendering this field.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Value used when the caller supplies no initial value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Arbitrary extra attributes forwarded to the component.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Render function for the `custom` component.
    #[serde(skip)]
    pub render: Option<RenderFn>,
}

impl FieldMeta {
    /// Creates a descriptor with a name and a component type.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type: field_type.into(),
            default_value: None,
            extra: Map::new(),
            render: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Adds an extra attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Sets the render function used by the `custom` component.
    #[must_use]
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&FieldRenderProps) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Returns an extra attribute by key.
    pub fn get_attr(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns the label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Returns the value this field starts with when no override is given.
    ///
    /// Fields without a default start as the empty string.
    pub fn initial_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| Value::String(String::new()))
    }
}

impl fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("field_type", &self.field_type)
            .field("default_value", &self.default_value)
            .field("extra", &self.extra)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
