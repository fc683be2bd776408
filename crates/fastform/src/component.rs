//! Component contracts.
//!
//! Rendering is headless: a [`FieldComponent`] turns [`FieldRenderProps`]
//! into markup, and a [`FormContainer`] wraps the rendered fields and the
//! submit affordance. Neither is implemented here apart from the built-in
//! [`CustomField`]; applications register their own through the
//! [`registry`](crate::registry).

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use fastform_core::Layout;

use crate::context::{FormContext, SubmitTrigger};
use crate::meta::FieldMeta;

/// Default type of the container's extra-props bag.
pub type DefaultExtraProps = Map<String, Value>;

pub(crate) type ChangeHandler = Arc<dyn Fn(Value) + Send + Sync>;
pub(crate) type BlurHandler = Arc<dyn Fn() + Send + Sync>;

/// Everything a field component needs to render one field.
///
/// Props are rebuilt on every render with the field's current value and
/// error; the handlers stay the same between renders.
#[derive(Clone)]
pub struct FieldRenderProps {
    /// The field descriptor.
    pub meta: Arc<FieldMeta>,
    /// The current value.
    pub value: Value,
    /// The current error message, if validation failed.
    pub error: Option<String>,
    on_change: ChangeHandler,
    on_blur: BlurHandler,
    context: FormContext,
}

impl FieldRenderProps {
    pub(crate) fn bound(
        meta: Arc<FieldMeta>,
        value: Value,
        error: Option<String>,
        on_change: ChangeHandler,
        on_blur: BlurHandler,
        context: FormContext,
    ) -> Self {
        Self {
            meta,
            value,
            error,
            on_change,
            on_blur,
            context,
        }
    }

    /// Creates props bound to no form; the handlers do nothing.
    pub fn detached(meta: FieldMeta, value: Value, error: Option<String>) -> Self {
        Self {
            meta: Arc::new(meta),
            value,
            error,
            on_change: Arc::new(|_| {}),
            on_blur: Arc::new(|| {}),
            context: FormContext::detached(),
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Returns the label, falling back to the field name.
    pub fn label(&self) -> &str {
        self.meta.display_label()
    }

    /// Returns an extra attribute from the descriptor.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.meta.get_attr(key)
    }

    /// Returns the current value as a string, if it is one.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Propagates an edit to the form.
    pub fn on_change(&self, value: Value) {
        (self.on_change)(value);
    }

    /// Signals that the user left the field.
    pub fn on_blur(&self) {
        (self.on_blur)();
    }

    /// Returns the owning form's context.
    pub const fn context(&self) -> &FormContext {
        &self.context
    }
}

impl fmt::Debug for FieldRenderProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRenderProps")
            .field("name", &self.meta.name)
            .field("value", &self.value)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Renders one field.
pub trait FieldComponent: Send + Sync {
    /// Renders the field with its current props.
    fn render(&self, props: &FieldRenderProps) -> String;
}

/// A [`FieldComponent`] backed by a closure. See [`field_fn`].
pub struct FieldFn<F>(F);

/// Wraps a closure as a [`FieldComponent`].
///
/// ```
/// use fastform::component::{field_fn, FieldComponent, FieldRenderProps};
/// use fastform::meta::FieldMeta;
/// use serde_json::json;
///
/// let text = field_fn(|props: &FieldRenderProps| {
///     format!(r#"<input name="{}" value="{}" />"#, props.name(), props.value_str().unwrap_or(""))
/// });
/// let props = FieldRenderProps::detached(FieldMeta::new("q", "text"), json!("rust"), None);
/// assert_eq!(text.render(&props), r#"<input name="q" value="rust" />"#);
/// ```
pub fn field_fn<F>(f: F) -> FieldFn<F>
where
    F: Fn(&FieldRenderProps) -> String + Send + Sync,
{
    FieldFn(f)
}

impl<F> FieldComponent for FieldFn<F>
where
    F: Fn(&FieldRenderProps) -> String + Send + Sync,
{
    fn render(&self, props: &FieldRenderProps) -> String {
        (self.0)(props)
    }
}

/// The registry key of the built-in [`CustomField`].
pub const CUSTOM_FIELD_TYPE: &str = "custom";

/// Renders a field through the render function carried by its descriptor.
///
/// This is the escape hatch for one-off fields that do not deserve a
/// registered component. A descriptor without a render function renders
/// as an empty node.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomField;

impl FieldComponent for CustomField {
    fn render(&self, props: &FieldRenderProps) -> String {
        match &props.meta.render {
            Some(render) => render(props),
            None => {
                warn!(field = props.name(), "custom field has no render function");
                String::new()
            }
        }
    }
}

/// One rendered field inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    /// Stable key: the field name followed by its position.
    pub key: String,
    /// The rendered markup.
    pub html: String,
}

/// Everything a container needs to render a form.
pub struct ContainerProps<'a, E = DefaultExtraProps> {
    /// Whether a submission is in flight.
    pub loading: bool,
    /// The requested layout.
    pub layout: Layout,
    /// Label for the submit control.
    pub submit_label: Option<&'a str>,
    /// Whether the error map is free of messages.
    pub can_submit: bool,
    /// Submits the form.
    pub handle_submit: SubmitTrigger,
    /// Rendered fields in declaration order.
    pub children: Vec<FieldNode>,
    /// Caller-supplied extra props.
    pub extra_props: Option<&'a E>,
    /// The owning form's context.
    pub context: FormContext,
}

impl<E> ContainerProps<'_, E> {
    /// Concatenates the rendered children.
    pub fn children_html(&self) -> String {
        self.children.iter().map(|node| node.html.as_str()).collect()
    }
}

impl<E: Serialize> ContainerProps<'_, E> {
    /// Serializes the extra props, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `E` fails to serialize.
    pub fn extra_props_json(&self) -> serde_json::Result<Option<Value>> {
        self.extra_props.map(serde_json::to_value).transpose()
    }
}

/// The layout shell around the rendered fields and the submit control.
///
/// `E` is the type of the extra-props bag passed through from the form
/// configuration.
pub trait FormContainer<E = DefaultExtraProps>: Send + Sync {
    /// Renders the form.
    fn render(&self, props: ContainerProps<'_, E>) -> String;
}
