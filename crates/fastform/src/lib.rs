//! # fastform
//!
//! Declarative form rendering. A form is described by a list of field
//! descriptors; fastform resolves a component for each field from a
//! registry, binds it to live form state, validates against a schema and
//! wraps the rendered fields in a registered container.
//!
//! Rendering is headless: components produce markup strings and the library
//! ships no concrete widgets beyond the `custom` escape hatch.
//!
//! ## Modules
//!
//! - [`meta`] - Field descriptors
//! - [`values`] - Value and error maps, initial value computation
//! - [`schema`] - Validation schemas and field validators
//! - [`state`] - The form-state engine and submit handlers
//! - [`context`] - The live-state channel handed to components
//! - [`component`] - Field and container component contracts
//! - [`registry`] - Field and container registries
//! - [`definition`] - Form definitions loaded from TOML or JSON
//! - [`form`] - The form orchestrator
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use fastform::prelude::*;
//! use serde_json::json;
//!
//! struct Shell;
//!
//! impl FormContainer for Shell {
//!     fn render(&self, props: ContainerProps<'_>) -> String {
//!         format!("<form class=\"{}\">{}</form>", props.layout, props.children_html())
//!     }
//! }
//!
//! let registry: Arc<FormRegistry> = Arc::new(FormRegistry::new());
//! registry.register_container(Shell);
//! registry.register_field("number", field_fn(|p: &FieldRenderProps| {
//!     format!(r#"<input type="number" name="{}" value="{}" />"#, p.name(), p.value)
//! }));
//!
//! let form = FastForm::mount(
//!     registry,
//!     FormConfig::new(vec![FieldMeta::new("age", "number").default_value(json!(0))])
//!         .initial_value("age", json!(5)),
//! );
//! assert_eq!(
//!     form.render().as_deref(),
//!     Some(r#"<form class="horizontal"><input type="number" name="age" value="5" /></form>"#)
//! );
//! ```

pub mod component;
pub mod context;
pub mod definition;
pub mod form;
pub mod meta;
pub mod registry;
pub mod schema;
pub mod state;
pub mod values;

pub use component::{
    field_fn, ContainerProps, CustomField, DefaultExtraProps, FieldComponent, FieldNode,
    FieldRenderProps, FormContainer, CUSTOM_FIELD_TYPE,
};
pub use context::{FormContext, SubmitTrigger};
pub use definition::FormDefinition;
pub use form::{ChangeCallback, FastForm, FormConfig};
pub use meta::{FieldMeta, RenderFn};
pub use registry::{ContainerRegistry, FieldRegistry, FormRegistry};
pub use schema::{
    create_form_schema, field_schema, Candidate, FieldValidator, ObjectSchema, Ref, StringSchema,
};
pub use state::{
    submit_fn, FormHandle, FormHandleConfig, FormState, SubmitHandler, SubmitOutcome,
    ValidationTriggers,
};
pub use values::{FormErrors, FormValues};

pub use fastform_core::{FastFormError, FastFormResult, Layout, Settings, ValidationError};

/// Convenience re-exports for building and rendering forms.
pub mod prelude {
    pub use crate::component::{
        field_fn, ContainerProps, FieldComponent, FieldRenderProps, FormContainer,
    };
    pub use crate::form::{FastForm, FormConfig};
    pub use crate::meta::FieldMeta;
    pub use crate::registry::FormRegistry;
    pub use crate::schema::{create_form_schema, field_schema, ObjectSchema};
    pub use crate::state::{submit_fn, SubmitOutcome};
    pub use crate::values::FormValues;
    pub use fastform_core::{FastFormError, FastFormResult, Layout};
}
