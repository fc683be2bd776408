//! The form-state engine.
//!
//! A [`FormHandle`] owns the live state of one mounted form: values, error
//! messages, touched flags, and the submitting flag. Every mutation goes
//! through the handle's methods; readers get owned snapshots so that no lock
//! is ever held across an `.await`.
//!
//! Validation runs implicitly only where a [`ValidationTriggers`] flag is
//! set. By default that is blur alone: a field is validated when it is
//! marked touched, and the whole form is always validated on submit.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use fastform_core::{FastFormResult, Settings};

use crate::schema::ObjectSchema;
use crate::values::{has_errors, FormErrors, FormValues};

/// A snapshot of a form's live state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Current field values.
    pub values: FormValues,
    /// Error message per validated field.
    pub errors: FormErrors,
    /// Fields the user has visited.
    pub touched: BTreeMap<String, bool>,
    /// Whether a submission is in flight.
    pub submitting: bool,
    /// Number of submit attempts, including ignored-for-invalid ones.
    pub submit_count: u32,
}

impl FormState {
    /// Returns `true` when no field carries an error message.
    pub fn can_submit(&self) -> bool {
        !has_errors(&self.errors)
    }

    /// Returns the error message recorded for `name`.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).and_then(Option::as_deref)
    }

    /// Returns `true` if `name` has been touched.
    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.get(name).copied().unwrap_or(false)
    }
}

/// When the engine validates on its own.
///
/// The default validates on blur only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationTriggers {
    /// Validate a field after [`FormHandle::set_field_value`].
    pub on_change: bool,
    /// Validate a field after it is marked touched.
    pub on_blur: bool,
    /// Validate the whole form when the handle is created.
    pub on_mount: bool,
}

impl Default for ValidationTriggers {
    fn default() -> Self {
        Self {
            on_change: false,
            on_blur: true,
            on_mount: false,
        }
    }
}

impl From<&Settings> for ValidationTriggers {
    fn from(settings: &Settings) -> Self {
        Self {
            on_change: settings.validate_on_change,
            on_blur: settings.validate_on_blur,
            on_mount: settings.validate_on_mount,
        }
    }
}

/// Receives the values of a valid form on submit.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    /// Handles a submission. An `Err` is returned to the caller of `submit`.
    async fn submit(&self, values: FormValues) -> FastFormResult<()>;
}

/// A [`SubmitHandler`] backed by an async closure. See [`submit_fn`].
pub struct SubmitFn<F>(F);

/// Wraps an async closure as a [`SubmitHandler`].
///
/// ```
/// use fastform::state::submit_fn;
///
/// let handler = submit_fn(|values| async move {
///     tracing::info!(?values, "saving");
///     Ok(())
/// });
/// # let _ = handler;
/// ```
pub fn submit_fn<F, Fut>(f: F) -> SubmitFn<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = FastFormResult<()>> + Send,
{
    SubmitFn(f)
}

#[async_trait]
impl<F, Fut> SubmitHandler for SubmitFn<F>
where
    F: Fn(FormValues) -> Fut + Send + Sync,
    Fut: Future<Output = FastFormResult<()>> + Send,
{
    async fn submit(&self, values: FormValues) -> FastFormResult<()> {
        (self.0)(values).await
    }
}

/// How a call to [`FormHandle::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The form was valid and the handler (if any) completed.
    Submitted,
    /// Validation failed; the handler was not called.
    Invalid(FormErrors),
    /// Another submission was already in flight.
    Ignored,
}

/// Everything needed to create a [`FormHandle`].
#[derive(Default)]
pub struct FormHandleConfig {
    /// Values the form starts with.
    pub initial_values: FormValues,
    /// Schema used by field and form validation.
    pub schema: Option<Arc<ObjectSchema>>,
    /// Automatic validation triggers.
    pub triggers: ValidationTriggers,
    /// Called with the values of a valid form on submit.
    pub on_submit: Option<Arc<dyn SubmitHandler>>,
}

pub(crate) struct Shared {
    state: RwLock<FormState>,
    initial_values: FormValues,
    schema: Option<Arc<ObjectSchema>>,
    triggers: ValidationTriggers,
    on_submit: Option<Arc<dyn SubmitHandler>>,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, FormState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the submitting flag when dropped, on every exit path of a submit.
struct SubmittingGuard {
    shared: Arc<Shared>,
}

impl SubmittingGuard {
    fn acquire(shared: &Arc<Shared>) -> Option<Self> {
        let mut state = shared.write();
        if state.submitting {
            return None;
        }
        state.submitting = true;
        Some(Self {
            shared: Arc::clone(shared),
        })
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.shared.write().submitting = false;
    }
}

/// A handle to the live state of one form.
///
/// Handles are cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct FormHandle {
    shared: Arc<Shared>,
}

impl FormHandle {
    /// Creates a form-state engine.
    pub fn new(config: FormHandleConfig) -> Self {
        let state = FormState {
            values: config.initial_values.clone(),
            ..FormState::default()
        };
        let handle = Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                initial_values: config.initial_values,
                schema: config.schema,
                triggers: config.triggers,
                on_submit: config.on_submit,
            }),
        };
        if handle.shared.triggers.on_mount {
            handle.validate_form();
        }
        handle
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> FormState {
        self.shared.read().clone()
    }

    /// Returns the current values.
    pub fn values(&self) -> FormValues {
        self.shared.read().values.clone()
    }

    /// Returns the current value of one field.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.shared.read().values.get(name).cloned()
    }

    /// Returns the current error map.
    pub fn errors(&self) -> FormErrors {
        self.shared.read().errors.clone()
    }

    /// Returns the error message recorded for one field.
    pub fn error(&self, name: &str) -> Option<String> {
        self.shared.read().error(name).map(String::from)
    }

    /// Returns the values the form started with.
    pub fn initial_values(&self) -> &FormValues {
        &self.shared.initial_values
    }

    /// Returns `true` while a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.shared.read().submitting
    }

    /// Returns the number of submit attempts.
    pub fn submit_count(&self) -> u32 {
        self.shared.read().submit_count
    }

    /// Returns `true` if `name` has been touched.
    pub fn is_touched(&self, name: &str) -> bool {
        self.shared.read().is_touched(name)
    }

    /// Returns `true` if the values differ from the initial values.
    pub fn is_dirty(&self) -> bool {
        self.shared.read().values != self.shared.initial_values
    }

    /// Returns `true` when no field carries an error message.
    pub fn can_submit(&self) -> bool {
        self.shared.read().can_submit()
    }

    /// Returns the automatic validation triggers.
    pub fn triggers(&self) -> ValidationTriggers {
        self.shared.triggers
    }

    /// Returns the validation schema, if any.
    pub fn schema(&self) -> Option<&ObjectSchema> {
        self.shared.schema.as_deref()
    }

    // ── Mutators ─────────────────────────────────────────────────────

    /// Sets one field's value, validating it if the `on_change` trigger is set.
    pub fn set_field_value(&self, name: &str, value: Value) {
        self.set_field_value_with(name, value, self.shared.triggers.on_change);
    }

    /// Sets one field's value and returns the complete value set after the change.
    ///
    /// When `validate` is `true` the field is validated against the new values.
    pub fn set_field_value_with(&self, name: &str, value: Value, validate: bool) -> FormValues {
        let merged = {
            let mut state = self.shared.write();
            state.values.insert(name.to_string(), value);
            state.values.clone()
        };
        if validate {
            self.validate_field(name);
        }
        merged
    }

    /// Replaces all values, optionally validating the whole form.
    pub fn set_values(&self, values: FormValues, validate: bool) {
        self.shared.write().values = values;
        if validate {
            self.validate_form();
        }
    }

    /// Records (or clears, with `None`) an error for one field.
    pub fn set_field_error(&self, name: &str, error: Option<String>) {
        self.shared.write().errors.insert(name.to_string(), error);
    }

    /// Replaces the whole error map.
    pub fn set_errors(&self, errors: FormErrors) {
        self.shared.write().errors = errors;
    }

    /// Marks a field touched, validating it if the `on_blur` trigger is set.
    pub fn set_field_touched(&self, name: &str, touched: bool) {
        self.shared.write().touched.insert(name.to_string(), touched);
        if touched && self.shared.triggers.on_blur {
            self.validate_field(name);
        }
    }

    /// Validates one field and records the result.
    ///
    /// Fields the schema does not cover are left untouched and report `None`.
    pub fn validate_field(&self, name: &str) -> Option<String> {
        let schema = self.shared.schema.as_ref()?;
        if !schema.has_field(name) {
            debug!(field = name, "no validator for field");
            return None;
        }
        let values = self.values();
        let error = schema.validate_at(name, &values);
        self.set_field_error(name, error.clone());
        error
    }

    /// Validates every field and replaces the error map with the result.
    pub fn validate_form(&self) -> FormErrors {
        let errors = match &self.shared.schema {
            Some(schema) => schema.validate(&self.values()),
            None => FormErrors::new(),
        };
        self.set_errors(errors.clone());
        errors
    }

    /// Restores the initial values and clears errors, touched flags and the submit count.
    ///
    /// An in-flight submission keeps its submitting flag.
    pub fn reset(&self) {
        let mut state = self.shared.write();
        state.values = self.shared.initial_values.clone();
        state.errors.clear();
        state.touched.clear();
        state.submit_count = 0;
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Validates the form and, if valid, runs the submit handler.
    ///
    /// The submitting flag is set for the whole call and cleared on every
    /// exit path. A call made while another submission is in flight returns
    /// [`SubmitOutcome::Ignored`] without touching state.
    ///
    /// # Errors
    ///
    /// Returns the submit handler's error unchanged.
    pub async fn submit(&self) -> FastFormResult<SubmitOutcome> {
        let Some(_guard) = SubmittingGuard::acquire(&self.shared) else {
            debug!("submit ignored: a submission is already in flight");
            return Ok(SubmitOutcome::Ignored);
        };

        {
            let mut state = self.shared.write();
            state.submit_count += 1;
            let names: Vec<String> = state.values.keys().cloned().collect();
            for name in names {
                state.touched.insert(name, true);
            }
        }

        let errors = self.validate_form();
        if has_errors(&errors) {
            debug!(count = errors.len(), "submit blocked by validation errors");
            return Ok(SubmitOutcome::Invalid(errors));
        }

        if let Some(handler) = self.shared.on_submit.clone() {
            handler.submit(self.values()).await?;
        }
        Ok(SubmitOutcome::Submitted)
    }
}
