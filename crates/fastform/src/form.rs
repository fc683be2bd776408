//! The form orchestrator.
//!
//! [`FastForm::mount`] turns a [`FormConfig`] into a live form: it computes
//! the initial values, binds a [`FormHandle`], resolves each field's
//! component from the [`FormRegistry`] and wires its change and blur
//! handlers to the shared state. [`FastForm::render`] then produces the
//! registered container's markup around the rendered fields.
//!
//! ```
//! use std::sync::Arc;
//! use fastform::component::{field_fn, ContainerProps, FieldRenderProps, FormContainer};
//! use fastform::form::{FastForm, FormConfig};
//! use fastform::meta::FieldMeta;
//! use fastform::registry::FormRegistry;
//!
//! struct Plain;
//!
//! impl FormContainer for Plain {
//!     fn render(&self, props: ContainerProps<'_>) -> String {
//!         format!("<form>{}</form>", props.children_html())
//!     }
//! }
//!
//! let registry: Arc<FormRegistry> = Arc::new(FormRegistry::new());
//! registry.register_container(Plain);
//! registry.register_field("text", field_fn(|p: &FieldRenderProps| {
//!     format!(r#"<input name="{}" />"#, p.name())
//! }));
//!
//! let form = FastForm::mount(registry, FormConfig::new(vec![FieldMeta::new("q", "text")]));
//! assert_eq!(form.render().as_deref(), Some(r#"<form><input name="q" /></form>"#));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn, Instrument, Span};
use uuid::Uuid;

use fastform_core::logging::form_span;
use fastform_core::{FastFormResult, Layout, Settings};

use crate::component::{
    BlurHandler, ChangeHandler, ContainerProps, DefaultExtraProps, FieldComponent,
    FieldNode, FieldRenderProps,
};
use crate::context::{FormContext, SubmitTrigger};
use crate::definition::FormDefinition;
use crate::meta::FieldMeta;
use crate::registry::FormRegistry;
use crate::schema::ObjectSchema;
use crate::state::{
    FormHandle, FormHandleConfig, FormState, SubmitHandler, SubmitOutcome, ValidationTriggers,
};
use crate::values::{initial_values, FormErrors, FormValues};

/// Observes the full value set after every field edit.
pub type ChangeCallback = Arc<dyn Fn(&FormValues) + Send + Sync>;

/// Everything needed to mount a form.
///
/// Only `fields` is required. The layout defaults to
/// [`Layout::Horizontal`], initial values default to empty, and fields are
/// validated on blur but not on change or mount.
pub struct FormConfig<E = DefaultExtraProps> {
    /// Field descriptors in declaration order.
    pub fields: Arc<[FieldMeta]>,
    /// Schema used for blur and submit validation.
    pub schema: Option<Arc<ObjectSchema>>,
    /// Requested layout.
    pub layout: Option<Layout>,
    /// Label for the submit control.
    pub submit_label: Option<String>,
    /// Caller initial values, laid over field defaults.
    pub initial_values: FormValues,
    /// Receives the values of a valid form on submit.
    pub on_submit: Option<Arc<dyn SubmitHandler>>,
    /// Receives the full value set on mount and after every field edit.
    pub on_change: Option<ChangeCallback>,
    /// Passed through to the container untouched.
    pub extra_props: Option<E>,
    /// Automatic validation triggers of the state engine.
    pub validation: ValidationTriggers,
}

impl<E> FormConfig<E> {
    /// Creates a configuration for `fields` with every option at its default.
    pub fn new(fields: impl Into<Arc<[FieldMeta]>>) -> Self {
        Self {
            fields: fields.into(),
            schema: None,
            layout: None,
            submit_label: None,
            initial_values: FormValues::new(),
            on_submit: None,
            on_change: None,
            extra_props: None,
            validation: ValidationTriggers::default(),
        }
    }

    /// Creates a configuration from a loaded definition.
    pub fn from_definition(definition: FormDefinition) -> Self {
        Self {
            layout: definition.layout,
            submit_label: definition.submit_label,
            initial_values: definition.initial_values,
            ..Self::new(definition.fields)
        }
    }

    /// Fills the layout and submit label from `settings` where unset, and
    /// takes the validation triggers from `settings`.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.layout = Some(self.layout.unwrap_or(settings.default_layout));
        if self.submit_label.is_none() {
            self.submit_label.clone_from(&settings.default_submit_label);
        }
        self.validation = ValidationTriggers::from(settings);
        self
    }

    /// Sets the validation schema.
    #[must_use]
    pub fn schema(mut self, schema: ObjectSchema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Sets the layout.
    #[must_use]
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the submit label.
    #[must_use]
    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = Some(label.into());
        self
    }

    /// Replaces the caller initial values.
    #[must_use]
    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial_values = values;
        self
    }

    /// Adds one caller initial value.
    #[must_use]
    pub fn initial_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.initial_values.insert(name.into(), value);
        self
    }

    /// Sets the submit handler.
    #[must_use]
    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Sets the change callback.
    #[must_use]
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FormValues) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Sets the extra props passed to the container.
    #[must_use]
    pub fn extra_props(mut self, extra: E) -> Self {
        self.extra_props = Some(extra);
        self
    }
}

/// A field's component and handlers, derived once per descriptor list.
struct FieldBinding {
    key: String,
    meta: Arc<FieldMeta>,
    component: Option<Arc<dyn FieldComponent>>,
    on_change: ChangeHandler,
    on_blur: BlurHandler,
}

impl FieldBinding {
    fn props(&self, state: &FormState, context: &FormContext) -> FieldRenderProps {
        let value = state
            .values
            .get(&self.meta.name)
            .cloned()
            .unwrap_or_else(|| self.meta.initial_value());
        FieldRenderProps::bound(
            Arc::clone(&self.meta),
            value,
            state.error(&self.meta.name).map(String::from),
            Arc::clone(&self.on_change),
            Arc::clone(&self.on_blur),
            context.clone(),
        )
    }
}

/// A mounted form.
pub struct FastForm<E = DefaultExtraProps> {
    id: Uuid,
    span: Span,
    registry: Arc<FormRegistry<E>>,
    handle: FormHandle,
    context: FormContext,
    fields: Arc<[FieldMeta]>,
    bindings: Vec<FieldBinding>,
    generation: u64,
    layout: Layout,
    submit_label: Option<String>,
    on_change: Option<ChangeCallback>,
    extra_props: Option<E>,
}

impl<E> FastForm<E>
where
    E: Serialize + Send + Sync + 'static,
{
    /// Mounts a form.
    ///
    /// The change callback, if any, is called once with the initial values
    /// before this returns.
    pub fn mount(registry: Arc<FormRegistry<E>>, config: FormConfig<E>) -> Self {
        let id = Uuid::new_v4();
        let span = form_span(id);
        let entered = span.enter();

        let initial = initial_values(&config.fields, &config.initial_values);
        if let Some(callback) = &config.on_change {
            callback(&initial);
        }

        let handle = FormHandle::new(FormHandleConfig {
            initial_values: initial,
            schema: config.schema,
            triggers: config.validation,
            on_submit: config.on_submit,
        });
        let context = FormContext::new(id, &handle);
        let bindings = derive_bindings(&config.fields, &registry, &context, config.on_change.as_ref());
        debug!(fields = config.fields.len(), "form mounted");
        drop(entered);

        Self {
            id,
            span,
            registry,
            handle,
            context,
            fields: config.fields,
            bindings,
            generation: 0,
            layout: config.layout.unwrap_or_default(),
            submit_label: config.submit_label,
            on_change: config.on_change,
            extra_props: config.extra_props,
        }
    }

    /// Renders the form, or `None` when no container is registered.
    ///
    /// Fields whose type has no registered component are left out.
    pub fn render(&self) -> Option<String> {
        let _entered = self.span.enter();
        let Some(container) = self.registry.resolve_container() else {
            warn!("no form container registered; rendering nothing");
            return None;
        };

        let state = self.handle.snapshot();
        let children = self
            .bindings
            .iter()
            .filter_map(|binding| {
                let component = binding.component.as_ref()?;
                let props = binding.props(&state, &self.context);
                Some(FieldNode {
                    key: binding.key.clone(),
                    html: component.render(&props),
                })
            })
            .collect();

        Some(container.render(ContainerProps {
            loading: state.submitting,
            layout: self.layout,
            submit_label: self.submit_label.as_deref(),
            can_submit: state.can_submit(),
            handle_submit: SubmitTrigger::new(self.context.clone()),
            children,
            extra_props: self.extra_props.as_ref(),
            context: self.context.clone(),
        }))
    }

    /// Returns the bound render props of the first field named `name`.
    pub fn field(&self, name: &str) -> Option<FieldRenderProps> {
        let binding = self.bindings.iter().find(|b| b.meta.name == name)?;
        Some(binding.props(&self.handle.snapshot(), &self.context))
    }

    /// Replaces the field descriptors.
    ///
    /// Bindings are re-derived only when `fields` is a different list from
    /// the current one; passing back [`fields`](Self::fields) is a no-op.
    /// Fields without a value yet start at their initial value; existing
    /// values are kept.
    pub fn set_fields(&mut self, fields: impl Into<Arc<[FieldMeta]>>) {
        let fields = fields.into();
        if Arc::ptr_eq(&self.fields, &fields) {
            return;
        }
        let _entered = self.span.enter();
        for meta in fields.iter() {
            if self.handle.value(&meta.name).is_none() {
                self.handle
                    .set_field_value_with(&meta.name, meta.initial_value(), false);
            }
        }
        self.bindings =
            derive_bindings(&fields, &self.registry, &self.context, self.on_change.as_ref());
        self.fields = fields;
        self.generation += 1;
    }

    /// Returns how many times the bindings were re-derived since mount.
    pub const fn bindings_generation(&self) -> u64 {
        self.generation
    }

    /// Submits the form. See [`FormHandle::submit`].
    ///
    /// # Errors
    ///
    /// Returns the submit handler's error.
    pub async fn submit(&self) -> FastFormResult<SubmitOutcome> {
        self.handle.submit().instrument(self.span.clone()).await
    }

    /// Returns `true` while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.handle.is_submitting()
    }

    /// Returns `true` when no field carries an error message.
    pub fn can_submit(&self) -> bool {
        self.handle.can_submit()
    }

    /// Returns the current values.
    pub fn values(&self) -> FormValues {
        self.handle.values()
    }

    /// Returns the current errors.
    pub fn errors(&self) -> FormErrors {
        self.handle.errors()
    }

    /// Restores the initial values and clears errors and touched flags.
    pub fn reset(&self) {
        self.handle.reset();
    }

    /// Returns the state handle.
    pub const fn handle(&self) -> &FormHandle {
        &self.handle
    }

    /// Returns a context bound to this form.
    pub fn context(&self) -> FormContext {
        self.context.clone()
    }

    /// Returns the form id.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the effective layout.
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the current field descriptors.
    pub fn fields(&self) -> Arc<[FieldMeta]> {
        Arc::clone(&self.fields)
    }

    /// Unmounts the form. Contexts and field handlers bound to it go dead
    /// unless the caller still holds a [`FormHandle`] clone.
    pub fn unmount(self) {
        let _entered = self.span.enter();
        debug!("form unmounted");
    }
}

impl<E> fmt::Debug for FastForm<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastForm")
            .field("id", &self.id)
            .field("fields", &self.fields.len())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

fn derive_bindings<E: 'static>(
    fields: &[FieldMeta],
    registry: &FormRegistry<E>,
    context: &FormContext,
    on_change: Option<&ChangeCallback>,
) -> Vec<FieldBinding> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .enumerate()
        .map(|(index, meta)| {
            if !seen.insert(meta.name.as_str()) {
                warn!(field = %meta.name, "duplicate field name; both fields share one value");
            }
            let component = registry.resolve_field(&meta.field_type);
            if component.is_none() {
                debug!(field = %meta.name, field_type = %meta.field_type, "no component registered for field type");
            }
            FieldBinding {
                key: format!("{}{index}", meta.name),
                meta: Arc::new(meta.clone()),
                component,
                on_change: change_handler(meta.name.clone(), context.clone(), on_change.cloned()),
                on_blur: blur_handler(meta.name.clone(), context.clone()),
            }
        })
        .collect()
}

fn change_handler(
    name: String,
    context: FormContext,
    callback: Option<ChangeCallback>,
) -> ChangeHandler {
    Arc::new(move |value: Value| {
        let Some(handle) = context.handle() else {
            return;
        };
        let merged = handle.set_field_value_with(&name, value, handle.triggers().on_change);
        if let Some(callback) = &callback {
            callback(&merged);
        }
    })
}

fn blur_handler(name: String, context: FormContext) -> BlurHandler {
    Arc::new(move || {
        if let Some(handle) = context.handle() {
            handle.set_field_touched(&name, true);
        }
    })
}
