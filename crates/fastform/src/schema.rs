//! Validation schemas.
//!
//! A form schema is an [`ObjectSchema`]: an ordered shape mapping field names
//! to [`FieldValidator`]s. Building a schema performs no validation; the
//! form-state engine runs it later against the current value set, either
//! for a single field ([`ObjectSchema::validate_at`]) or for the whole form
//! ([`ObjectSchema::validate`]).
//!
//! Validators see the complete value set, which is what makes cross-field
//! rules possible: a [`Ref`] names another field and is resolved at
//! validation time.
//!
//! ```
//! use fastform::schema::{create_form_schema, field_schema, Candidate, FieldValidator};
//! use serde_json::json;
//!
//! let password = field_schema::string().required("Required").min(8, "Too short");
//! let confirm = field_schema::string().one_of(
//!     [Candidate::from(field_schema::reference("password"))],
//!     "Passwords must match",
//! );
//! let schema = create_form_schema([
//!     ("password", Box::new(password) as Box<dyn FieldValidator>),
//!     ("confirm", Box::new(confirm) as Box<dyn FieldValidator>),
//! ]);
//!
//! let values = json!({"password": "correct horse", "confirm": "wrong"});
//! let errors = schema.validate(values.as_object().unwrap());
//! assert_eq!(errors.get("confirm"), Some(&Some("Passwords must match".to_string())));
//! assert!(!errors.contains_key("password"));
//! ```

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use fastform_core::ValidationError;

use crate::values::{FormErrors, FormValues};

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").ok());

/// A validator for a single field.
///
/// `values` is the complete value set of the form, for rules that depend on
/// other fields.
pub trait FieldValidator: Send + Sync + fmt::Debug {
    /// Validates `value`, returning the first failure.
    fn validate(&self, value: &Value, values: &FormValues) -> Result<(), ValidationError>;
}

/// A reference to another field's value, resolved at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    path: String,
}

impl Ref {
    /// Creates a reference to the field named `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the referenced field name.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up the referenced value.
    pub fn resolve<'a>(&self, values: &'a FormValues) -> Option<&'a Value> {
        values.get(&self.path)
    }
}

/// An allowed value for [`StringSchema::one_of`].
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// A literal value.
    Value(Value),
    /// The current value of another field.
    Ref(Ref),
}

impl Candidate {
    fn matches(&self, value: &Value, values: &FormValues) -> bool {
        match self {
            Self::Value(literal) => literal == value,
            Self::Ref(reference) => reference.resolve(values) == Some(value),
        }
    }
}

impl From<Ref> for Candidate {
    fn from(reference: Ref) -> Self {
        Self::Ref(reference)
    }
}

impl From<Value> for Candidate {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

#[derive(Debug, Clone)]
enum StringRule {
    Required(String),
    Min(usize, String),
    Max(usize, String),
    Email(String),
    Matches(Regex, String),
    OneOf(Vec<Candidate>, String),
}

/// A string validator built from chained rules.
///
/// Rules run in the order they were added and the first failure wins.
/// Absent values (`null`) skip every rule except [`required`](Self::required);
/// numbers and booleans are checked through their string form, while arrays
/// and objects fail with a `"type"` error.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    rules: Vec<StringRule>,
}

impl StringSchema {
    /// Creates a string schema with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on `null` and on the empty string.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Required(message.into()));
        self
    }

    /// Fails when the string has fewer than `min` characters.
    #[must_use]
    pub fn min(mut self, min: usize, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Min(min, message.into()));
        self
    }

    /// Fails when the string has more than `max` characters.
    #[must_use]
    pub fn max(mut self, max: usize, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Max(max, message.into()));
        self
    }

    /// Fails when a non-empty string is not an email address.
    #[must_use]
    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Email(message.into()));
        self
    }

    /// Fails when a non-empty string does not match `regex`.
    #[must_use]
    pub fn matches(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.rules.push(StringRule::Matches(regex, message.into()));
        self
    }

    /// Fails unless the value equals one of `candidates`.
    #[must_use]
    pub fn one_of(
        mut self,
        candidates: impl IntoIterator<Item = Candidate>,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push(StringRule::OneOf(
            candidates.into_iter().collect(),
            message.into(),
        ));
        self
    }
}

/// Coerces a value to the string the rules inspect. `Ok(None)` means absent.
fn coerce_string(value: &Value) -> Result<Option<Cow<'_, str>>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(Cow::Borrowed(s.as_str()))),
        Value::Number(n) => Ok(Some(Cow::Owned(n.to_string()))),
        Value::Bool(b) => Ok(Some(Cow::Owned(b.to_string()))),
        Value::Array(_) | Value::Object(_) => Err(ValidationError::new(
            "This value must be a string.",
            "type",
        )),
    }
}

impl FieldValidator for StringSchema {
    fn validate(&self, value: &Value, values: &FormValues) -> Result<(), ValidationError> {
        let text = coerce_string(value)?;

        for rule in &self.rules {
            if let StringRule::Required(message) = rule {
                if text.as_deref().map_or(true, str::is_empty) {
                    return Err(ValidationError::new(message.clone(), "required"));
                }
                continue;
            }

            let Some(s) = text.as_deref() else {
                continue;
            };

            match rule {
                StringRule::Required(_) => {}
                StringRule::Min(min, message) => {
                    if s.chars().count() < *min {
                        return Err(ValidationError::new(message.clone(), "min")
                            .with_param("min", min.to_string()));
                    }
                }
                StringRule::Max(max, message) => {
                    if s.chars().count() > *max {
                        return Err(ValidationError::new(message.clone(), "max")
                            .with_param("max", max.to_string()));
                    }
                }
                StringRule::Email(message) => {
                    let valid = EMAIL_RE.as_ref().is_some_and(|re| re.is_match(s));
                    if !s.is_empty() && !valid {
                        return Err(ValidationError::new(message.clone(), "email"));
                    }
                }
                StringRule::Matches(regex, message) => {
                    if !s.is_empty() && !regex.is_match(s) {
                        return Err(ValidationError::new(message.clone(), "matches")
                            .with_param("regex", regex.as_str()));
                    }
                }
                StringRule::OneOf(candidates, message) => {
                    if !candidates.iter().any(|c| c.matches(value, values)) {
                        return Err(ValidationError::new(message.clone(), "one_of"));
                    }
                }
            }
        }

        Ok(())
    }
}

/// A schema for a whole value set.
#[derive(Debug, Default)]
pub struct ObjectSchema {
    shape: Vec<(String, Box<dyn FieldValidator>)>,
}

impl ObjectSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the validator for a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, validator: impl FieldValidator + 'static) -> Self {
        self.insert(name.into(), Box::new(validator));
        self
    }

    fn insert(&mut self, name: String, validator: Box<dyn FieldValidator>) {
        if let Some(entry) = self.shape.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = validator;
        } else {
            self.shape.push((name, validator));
        }
    }

    /// Returns the names of fields with a validator, in shape order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.shape.iter().map(|(name, _)| name.as_str())
    }

    /// Returns `true` if `name` has a validator.
    pub fn has_field(&self, name: &str) -> bool {
        self.shape.iter().any(|(n, _)| n == name)
    }

    /// Validates one field against the full value set.
    ///
    /// Returns `None` when the field passes or has no validator.
    pub fn validate_at(&self, name: &str, values: &FormValues) -> Option<String> {
        let (_, validator) = self.shape.iter().find(|(n, _)| n == name)?;
        let value = values.get(name).unwrap_or(&Value::Null);
        validator.validate(value, values).err().map(|e| e.message)
    }

    /// Validates every field in the shape.
    ///
    /// Only failing fields appear in the result; failures accumulate across
    /// fields rather than stopping at the first one.
    pub fn validate(&self, values: &FormValues) -> FormErrors {
        self.shape
            .iter()
            .filter_map(|(name, validator)| {
                let value = values.get(name).unwrap_or(&Value::Null);
                validator
                    .validate(value, values)
                    .err()
                    .map(|e| (name.clone(), Some(e.message)))
            })
            .collect()
    }
}

/// Builds a form schema from a field-keyed shape.
///
/// Later entries for the same name replace earlier ones.
pub fn create_form_schema<I, K>(shape: I) -> ObjectSchema
where
    I: IntoIterator<Item = (K, Box<dyn FieldValidator>)>,
    K: Into<String>,
{
    let mut schema = ObjectSchema::new();
    for (name, validator) in shape {
        schema.insert(name.into(), validator);
    }
    schema
}

/// Primitive validator constructors.
pub mod field_schema {
    use super::{Ref, StringSchema};

    /// Starts a string validator.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// References another field by name.
    pub fn reference(path: impl Into<String>) -> Ref {
        Ref::new(path)
    }
}
