//! Field and container registries.
//!
//! A [`FormRegistry`] is built once at startup, populated through explicit
//! registration calls, and shared (usually behind an `Arc`) with every form
//! it renders. Registration is last-writer-wins; nothing is ever removed.
//!
//! ```
//! use fastform::component::{field_fn, FieldRenderProps};
//! use fastform::registry::FormRegistry;
//!
//! let registry: FormRegistry = FormRegistry::new();
//! registry.register_field("text", field_fn(|p: &FieldRenderProps| {
//!     format!(r#"<input name="{}" />"#, p.name())
//! }));
//!
//! assert!(registry.fields().contains("text"));
//! assert!(registry.fields().contains("custom"));
//! assert!(registry.resolve_container().is_none());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::component::{
    CustomField, DefaultExtraProps, FieldComponent, FormContainer, CUSTOM_FIELD_TYPE,
};

/// Maps field type tags to components.
pub struct FieldRegistry {
    components: RwLock<HashMap<String, Arc<dyn FieldComponent>>>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    /// Creates a registry holding only the built-in `custom` component.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(CUSTOM_FIELD_TYPE, CustomField);
        registry
    }

    /// Creates a registry with no components at all.
    pub fn empty() -> Self {
        Self {
            components: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a component for `field_type`, replacing any previous one.
    pub fn register(&self, field_type: impl Into<String>, component: impl FieldComponent + 'static) {
        self.register_arc(field_type, Arc::new(component));
    }

    /// Registers a shared component for `field_type`, replacing any previous one.
    pub fn register_arc(&self, field_type: impl Into<String>, component: Arc<dyn FieldComponent>) {
        let field_type = field_type.into();
        let mut components = self
            .components
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if components.insert(field_type.clone(), component).is_some() {
            debug!(field_type = %field_type, "field component replaced");
        }
    }

    /// Returns the component registered for `field_type`.
    pub fn resolve(&self, field_type: &str) -> Option<Arc<dyn FieldComponent>> {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(field_type)
            .cloned()
    }

    /// Returns `true` if `field_type` has a component.
    pub fn contains(&self, field_type: &str) -> bool {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(field_type)
    }

    /// Returns the registered type tags, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no component is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds the single container component.
pub struct ContainerRegistry<E = DefaultExtraProps> {
    slot: RwLock<Option<Arc<dyn FormContainer<E>>>>,
}

impl<E: 'static> Default for ContainerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> ContainerRegistry<E> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Registers the container, replacing any previous one.
    pub fn register(&self, container: impl FormContainer<E> + 'static) {
        self.register_arc(Arc::new(container));
    }

    /// Registers a shared container, replacing any previous one.
    pub fn register_arc(&self, container: Arc<dyn FormContainer<E>>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(container).is_some() {
            debug!("form container replaced");
        }
    }

    /// Returns the registered container.
    pub fn resolve(&self) -> Option<Arc<dyn FormContainer<E>>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// The field registry and container slot used to render forms.
pub struct FormRegistry<E = DefaultExtraProps> {
    fields: FieldRegistry,
    container: ContainerRegistry<E>,
}

impl<E: 'static> Default for FormRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> FormRegistry<E> {
    /// Creates a registry with the built-in `custom` field and no container.
    pub fn new() -> Self {
        Self {
            fields: FieldRegistry::new(),
            container: ContainerRegistry::new(),
        }
    }

    /// Returns the field registry.
    pub const fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Returns the container registry.
    pub const fn container(&self) -> &ContainerRegistry<E> {
        &self.container
    }

    /// Registers a field component. See [`FieldRegistry::register`].
    pub fn register_field(
        &self,
        field_type: impl Into<String>,
        component: impl FieldComponent + 'static,
    ) {
        self.fields.register(field_type, component);
    }

    /// Resolves a field component. See [`FieldRegistry::resolve`].
    pub fn resolve_field(&self, field_type: &str) -> Option<Arc<dyn FieldComponent>> {
        self.fields.resolve(field_type)
    }

    /// Registers the container. See [`ContainerRegistry::register`].
    pub fn register_container(&self, container: impl FormContainer<E> + 'static) {
        self.container.register(container);
    }

    /// Resolves the container. See [`ContainerRegistry::resolve`].
    pub fn resolve_container(&self) -> Option<Arc<dyn FormContainer<E>>> {
        self.container.resolve()
    }
}
