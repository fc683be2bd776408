//! Form context: the live-state channel handed to components.
//!
//! Every field component and the container receive a [`FormContext`] in
//! their props, so descendants reach the form's state without it being
//! threaded through each intermediate layer by hand. The context only
//! exposes reads and the [`FormHandle`]; all writes go through the handle's
//! mutators.
//!
//! A context holds a weak reference. Once the owning form is unmounted the
//! context goes dead: [`FormContext::handle`] returns `None` and callbacks
//! bound to it stop having any effect.

use std::fmt;
use std::sync::Weak;

use uuid::Uuid;

use fastform_core::{FastFormError, FastFormResult};

use crate::state::{FormHandle, FormState, Shared, SubmitOutcome};
use crate::values::{FormErrors, FormValues};

/// A cloneable, weak view of one form's live state.
#[derive(Clone)]
pub struct FormContext {
    form_id: Uuid,
    shared: Weak<Shared>,
}

impl FormContext {
    /// Creates a context bound to `handle`.
    pub fn new(form_id: Uuid, handle: &FormHandle) -> Self {
        Self {
            form_id,
            shared: handle.downgrade(),
        }
    }

    /// Creates a context bound to no form. Useful for rendering components in isolation.
    pub fn detached() -> Self {
        Self {
            form_id: Uuid::nil(),
            shared: Weak::new(),
        }
    }

    /// Returns the id of the owning form.
    pub const fn form_id(&self) -> Uuid {
        self.form_id
    }

    /// Returns the state handle, or `None` once the form is gone.
    pub fn handle(&self) -> Option<FormHandle> {
        self.shared.upgrade().map(FormHandle::from_shared)
    }

    /// Returns `true` while the owning form is alive.
    pub fn is_mounted(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> Option<FormState> {
        self.handle().map(|h| h.snapshot())
    }

    /// Returns the current values.
    pub fn values(&self) -> Option<FormValues> {
        self.handle().map(|h| h.values())
    }

    /// Returns the current errors.
    pub fn errors(&self) -> Option<FormErrors> {
        self.handle().map(|h| h.errors())
    }

    /// Triggers a submission of the owning form.
    ///
    /// # Errors
    ///
    /// Returns [`FastFormError::Unmounted`] if the form is gone, otherwise
    /// whatever the submit handler returned.
    pub async fn submit(&self) -> FastFormResult<SubmitOutcome> {
        let handle = self.handle().ok_or(FastFormError::Unmounted)?;
        handle.submit().await
    }
}

impl fmt::Debug for FormContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormContext")
            .field("form_id", &self.form_id)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

/// The submit affordance handed to a container.
///
/// Containers wire their submit control to [`SubmitTrigger::fire`].
#[derive(Debug, Clone)]
pub struct SubmitTrigger {
    context: FormContext,
}

impl SubmitTrigger {
    /// Creates a trigger submitting the form behind `context`.
    pub const fn new(context: FormContext) -> Self {
        Self { context }
    }

    /// Submits the form.
    ///
    /// # Errors
    ///
    /// See [`FormContext::submit`].
    pub async fn fire(&self) -> FastFormResult<SubmitOutcome> {
        self.context.submit().await
    }
}
