//! Integration tests for the registry -> orchestrator -> container pipeline.
//!
//! These tests mount whole forms against a shared registry, covering:
//! 1. Initial values and change notifications
//! 2. Rendering with missing registrations
//! 3. Validation and `can_submit`
//! 4. The submit lifecycle and the loading flag
//! 5. Context lifetime, custom fields, extra props and definitions

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Notify;

use fastform::component::{
    field_fn, ContainerProps, FieldRenderProps, FormContainer, CUSTOM_FIELD_TYPE,
};
use fastform::context::SubmitTrigger;
use fastform::definition::FormDefinition;
use fastform::form::{FastForm, FormConfig};
use fastform::meta::FieldMeta;
use fastform::registry::FormRegistry;
use fastform::schema::{create_form_schema, field_schema, Candidate, FieldValidator, ObjectSchema};
use fastform::state::{submit_fn, SubmitOutcome};
use fastform::values::FormValues;
use fastform_core::{FastFormError, Layout, Settings};

// ============================================================================
// Shared helpers
// ============================================================================

/// A container exposing every prop it receives as attributes.
struct TestContainer;

impl FormContainer for TestContainer {
    fn render(&self, props: ContainerProps<'_>) -> String {
        let keys: Vec<&str> = props.children.iter().map(|c| c.key.as_str()).collect();
        format!(
            r#"<form layout="{}" loading="{}" can-submit="{}" keys="{}">{}<button>{}</button></form>"#,
            props.layout,
            props.loading,
            props.can_submit,
            keys.join(","),
            props.children_html(),
            props.submit_label.unwrap_or("Submit"),
        )
    }
}

/// A registry with `text` and `number` components but no container.
fn bare_registry() -> Arc<FormRegistry> {
    let registry: Arc<FormRegistry> = Arc::new(FormRegistry::new());
    registry.register_field(
        "text",
        field_fn(|p: &FieldRenderProps| {
            let error = p
                .error
                .as_deref()
                .map(|e| format!("<span>{e}</span>"))
                .unwrap_or_default();
            format!(
                r#"<input name="{}" value="{}" />{error}"#,
                p.name(),
                p.value_str().unwrap_or("")
            )
        }),
    );
    registry.register_field(
        "number",
        field_fn(|p: &FieldRenderProps| {
            format!(r#"<input type="number" name="{}" value="{}" />"#, p.name(), p.value)
        }),
    );
    registry
}

fn registry() -> Arc<FormRegistry> {
    let registry = bare_registry();
    registry.register_container(TestContainer);
    registry
}

fn email_age_fields() -> Vec<FieldMeta> {
    vec![
        FieldMeta::new("email", "text").default_value(json!("")),
        FieldMeta::new("age", "number").default_value(json!(0)),
    ]
}

fn email_schema() -> ObjectSchema {
    ObjectSchema::new().field(
        "email",
        field_schema::string()
            .required("Email is required")
            .email("Invalid email"),
    )
}

type Recorded = Arc<Mutex<Vec<FormValues>>>;

fn recorder() -> (Recorded, impl Fn(&FormValues) + Send + Sync + 'static) {
    let seen: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |values: &FormValues| {
        sink.lock().unwrap().push(values.clone())
    })
}

fn as_json(values: &FormValues) -> Value {
    Value::Object(values.clone())
}

// ============================================================================
// 1. Initial values and change notifications
// ============================================================================

#[test]
fn test_first_change_is_defaults_overlaid_with_initial_values() {
    let (seen, on_change) = recorder();
    let _form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields())
            .initial_value("age", json!(5))
            .on_change(on_change),
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(as_json(&seen[0]), json!({"email": "", "age": 5}));
}

#[test]
fn test_change_callback_receives_merged_values() {
    let (seen, on_change) = recorder();
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields())
            .initial_value("age", json!(5))
            .on_change(on_change),
    );

    form.field("email").unwrap().on_change(json!("a@b.co"));
    form.field("age").unwrap().on_change(json!(6));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(as_json(&seen[1]), json!({"email": "a@b.co", "age": 5}));
    assert_eq!(as_json(&seen[2]), json!({"email": "a@b.co", "age": 6}));
}

#[test]
fn test_change_handler_updates_next_render() {
    let form = FastForm::mount(registry(), FormConfig::new(email_age_fields()));
    form.field("email").unwrap().on_change(json!("ada@example.com"));

    let html = form.render().unwrap();
    assert!(html.contains(r#"<input name="email" value="ada@example.com" />"#));
    assert!(html.contains(r#"<input type="number" name="age" value="0" />"#));
}

#[test]
fn test_change_does_not_validate() {
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).schema(email_schema()),
    );
    form.field("email").unwrap().on_change(json!("not-an-email"));
    assert!(form.errors().is_empty());
    assert!(form.can_submit());
}

// ============================================================================
// 2. Rendering with missing registrations
// ============================================================================

#[test]
fn test_no_container_renders_nothing() {
    let form = FastForm::mount(bare_registry(), FormConfig::new(email_age_fields()));
    assert!(form.render().is_none());
}

#[test]
fn test_container_registered_after_mount_is_used() {
    let registry = bare_registry();
    let form = FastForm::mount(Arc::clone(&registry), FormConfig::new(email_age_fields()));
    assert!(form.render().is_none());

    registry.register_container(TestContainer);
    assert!(form.render().is_some());
}

#[test]
fn test_unregistered_field_type_is_skipped() {
    let form = FastForm::mount(
        registry(),
        FormConfig::new(vec![
            FieldMeta::new("email", "text"),
            FieldMeta::new("when", "datepicker"),
            FieldMeta::new("age", "number"),
        ]),
    );

    let html = form.render().unwrap();
    assert!(html.contains(r#"keys="email0,age2""#));
    assert!(!html.contains("when"));
    // The skipped field still has a value.
    assert_eq!(form.values().get("when"), Some(&json!("")));
}

#[test]
fn test_render_defaults() {
    let form = FastForm::mount(registry(), FormConfig::new(email_age_fields()));
    let html = form.render().unwrap();
    assert!(html.starts_with(r#"<form layout="horizontal" loading="false" can-submit="true""#));
    assert!(html.ends_with("<button>Submit</button></form>"));
}

#[test]
fn test_render_with_settings() {
    let mut settings = Settings::default();
    settings.default_layout = Layout::Vertical;
    settings.default_submit_label = Some("Save".into());

    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).with_settings(&settings),
    );
    let html = form.render().unwrap();
    assert!(html.contains(r#"layout="vertical""#));
    assert!(html.contains("<button>Save</button>"));
}

// ============================================================================
// 3. Validation and can_submit
// ============================================================================

#[test]
fn test_blur_validates_single_field() {
    let form = FastForm::mount(
        registry(),
        FormConfig::new(vec![
            FieldMeta::new("email", "text"),
            FieldMeta::new("name", "text"),
        ])
        .schema(email_schema().field("name", field_schema::string().required("Name is required"))),
    );

    form.field("email").unwrap().on_blur();
    let errors = form.errors();
    assert_eq!(
        errors.get("email"),
        Some(&Some("Email is required".to_string()))
    );
    assert!(!errors.contains_key("name"));
    assert!(!form.can_submit());

    let html = form.render().unwrap();
    assert!(html.contains("<span>Email is required</span>"));
    assert!(html.contains(r#"can-submit="false""#));
}

#[test]
fn test_can_submit_tracks_error_messages() {
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).schema(email_schema()),
    );
    assert!(form.can_submit());

    let email = form.field("email").unwrap();
    email.on_change(json!("nope"));
    email.on_blur();
    assert!(!form.can_submit());

    email.on_change(json!("ada@example.com"));
    email.on_blur();
    // A validated field that passed is recorded without a message.
    assert_eq!(form.errors().get("email"), Some(&None));
    assert!(form.can_submit());
}

#[test]
fn test_cross_field_reference() {
    let schema = create_form_schema([
        (
            "password",
            Box::new(field_schema::string().required("Required")) as Box<dyn FieldValidator>,
        ),
        (
            "confirm",
            Box::new(field_schema::string().one_of(
                [Candidate::from(field_schema::reference("password"))],
                "Passwords must match",
            )) as Box<dyn FieldValidator>,
        ),
    ]);
    let form = FastForm::mount(
        registry(),
        FormConfig::new(vec![
            FieldMeta::new("password", "text"),
            FieldMeta::new("confirm", "text"),
        ])
        .schema(schema),
    );

    form.field("password").unwrap().on_change(json!("hunter22"));
    let confirm = form.field("confirm").unwrap();
    confirm.on_change(json!("hunter23"));
    confirm.on_blur();
    assert!(!form.can_submit());

    confirm.on_change(json!("hunter22"));
    confirm.on_blur();
    assert!(form.can_submit());
}

// ============================================================================
// 4. Submit lifecycle
// ============================================================================

#[tokio::test]
async fn test_submit_valid_form() {
    let received = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&received);
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields())
            .schema(email_schema())
            .initial_value("email", json!("ada@example.com"))
            .on_submit(submit_fn(move |values: FormValues| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().unwrap() = Some(values);
                    Ok(())
                }
            })),
    );

    assert_eq!(form.submit().await.unwrap(), SubmitOutcome::Submitted);
    let received = received.lock().unwrap().clone().unwrap();
    assert_eq!(as_json(&received), json!({"email": "ada@example.com", "age": 0}));
    assert!(!form.is_loading());
}

#[tokio::test]
async fn test_invalid_form_skips_handler_and_resets_loading() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields())
            .schema(email_schema())
            .on_submit(submit_fn(move |_values: FormValues| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })),
    );

    match form.submit().await.unwrap() {
        SubmitOutcome::Invalid(errors) => {
            assert_eq!(
                errors.get("email"),
                Some(&Some("Email is required".to_string()))
            );
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!form.is_loading());
    assert!(!form.can_submit());
    assert!(form.handle().is_touched("email"));
}

#[tokio::test]
async fn test_loading_during_submit_and_reentrant_submit_ignored() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let (s, r, c) = (Arc::clone(&started), Arc::clone(&release), Arc::clone(&calls));
    let form = Arc::new(FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).on_submit(submit_fn(move |_values: FormValues| {
            c.fetch_add(1, Ordering::SeqCst);
            let started = Arc::clone(&s);
            let release = Arc::clone(&r);
            async move {
                started.notify_one();
                release.notified().await;
                Ok(())
            }
        })),
    ));
    assert!(!form.is_loading());

    let task = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.submit().await }
    });

    started.notified().await;
    assert!(form.is_loading());
    assert!(form.render().unwrap().contains(r#"loading="true""#));

    assert_eq!(form.submit().await.unwrap(), SubmitOutcome::Ignored);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    release.notify_one();
    assert_eq!(task.await.unwrap().unwrap(), SubmitOutcome::Submitted);
    assert!(!form.is_loading());
    assert_eq!(form.handle().submit_count(), 1);
}

#[tokio::test]
async fn test_loading_resets_after_handler_error() {
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).on_submit(submit_fn(|_values: FormValues| async {
            Err(FastFormError::SubmitError("service unavailable".into()))
        })),
    );

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, FastFormError::SubmitError(ref msg) if msg == "service unavailable"));
    assert!(!form.is_loading());

    // The form stays usable.
    assert!(form.submit().await.is_err());
    assert_eq!(form.handle().submit_count(), 2);
}

#[tokio::test]
async fn test_loading_resets_after_handler_panic() {
    let form = Arc::new(FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).on_submit(submit_fn(|values: FormValues| async move {
            if values.contains_key("email") {
                panic!("handler exploded");
            }
            Ok(())
        })),
    ));

    let result = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.submit().await }
    })
    .await;

    assert!(result.unwrap_err().is_panic());
    assert!(!form.is_loading());
}

#[tokio::test]
async fn test_container_submit_trigger() {
    struct CapturingContainer {
        trigger: Mutex<Option<SubmitTrigger>>,
    }

    impl FormContainer for CapturingContainer {
        fn render(&self, props: ContainerProps<'_>) -> String {
            *self.trigger.lock().unwrap() = Some(props.handle_submit.clone());
            props.children_html()
        }
    }

    let container = Arc::new(CapturingContainer {
        trigger: Mutex::new(None),
    });
    let registry = bare_registry();
    registry.container().register_arc(Arc::clone(&container) as Arc<dyn FormContainer>);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let form = FastForm::mount(
        registry,
        FormConfig::new(email_age_fields()).on_submit(submit_fn(move |_values: FormValues| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })),
    );
    assert!(form.render().is_some());

    let trigger = container.trigger.lock().unwrap().clone().unwrap();
    assert_eq!(trigger.fire().await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// 5. Context lifetime, custom fields, extra props, definitions
// ============================================================================

#[tokio::test]
async fn test_unmount_kills_context_and_handlers() {
    let (seen, on_change) = recorder();
    let form = FastForm::mount(
        registry(),
        FormConfig::new(email_age_fields()).on_change(on_change),
    );
    let context = form.context();
    let email = form.field("email").unwrap();
    assert!(email.context().is_mounted());

    form.unmount();

    assert!(context.handle().is_none());
    assert!(!email.context().is_mounted());
    email.on_change(json!("late@example.com"));
    email.on_blur();
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(matches!(context.submit().await, Err(FastFormError::Unmounted)));
}

#[test]
fn test_components_read_state_through_context() {
    let registry = registry();
    registry.register_field(
        "summary",
        field_fn(|p: &FieldRenderProps| {
            let count = p.context().values().map_or(0, |v| v.len());
            format!("<p>{count} values</p>")
        }),
    );
    let mut fields = email_age_fields();
    fields.push(FieldMeta::new("summary", "summary"));

    let form = FastForm::mount(registry, FormConfig::new(fields));
    assert!(form.render().unwrap().contains("<p>3 values</p>"));
}

#[test]
fn test_custom_field_uses_descriptor_render_fn() {
    let form = FastForm::mount(
        registry(),
        FormConfig::new(vec![
            FieldMeta::new("greeting", CUSTOM_FIELD_TYPE)
                .default_value(json!("world"))
                .render(|p| format!("<p>Hello {}</p>", p.value_str().unwrap_or(""))),
            FieldMeta::new("blank", CUSTOM_FIELD_TYPE),
        ]),
    );

    let html = form.render().unwrap();
    assert!(html.contains("<p>Hello world</p>"));
    assert!(html.contains(r#"keys="greeting0,blank1""#));
}

#[derive(Serialize)]
struct Theme {
    class: String,
}

struct ThemedContainer;

impl FormContainer<Theme> for ThemedContainer {
    fn render(&self, props: ContainerProps<'_, Theme>) -> String {
        let class = props.extra_props.map_or("plain", |t| t.class.as_str());
        let json = props.extra_props_json().unwrap().unwrap_or(Value::Null);
        format!(r#"<form class="{class}" data-extra='{json}'>{}</form>"#, props.children_html())
    }
}

#[test]
fn test_typed_extra_props_reach_container() {
    let registry: Arc<FormRegistry<Theme>> = Arc::new(FormRegistry::new());
    registry.register_container(ThemedContainer);

    let form = FastForm::mount(
        Arc::clone(&registry),
        FormConfig::new(Vec::<FieldMeta>::new()).extra_props(Theme {
            class: "wide".into(),
        }),
    );
    assert_eq!(
        form.render().as_deref(),
        Some(r#"<form class="wide" data-extra='{"class":"wide"}'></form>"#)
    );

    let plain = FastForm::mount(registry, FormConfig::new(Vec::<FieldMeta>::new()));
    assert_eq!(
        plain.render().as_deref(),
        Some(r#"<form class="plain" data-extra='null'></form>"#)
    );
}

#[test]
fn test_mount_from_toml_definition() {
    let definition = FormDefinition::from_toml_str(
        r#"
layout = "vertical"
submit_label = "Register"

[initial_values]
age = 5

[[fields]]
name = "email"
type = "text"
default_value = ""

[[fields]]
name = "age"
type = "number"
default_value = 0
"#,
    )
    .unwrap();

    let (seen, on_change) = recorder();
    let form = FastForm::mount(
        registry(),
        FormConfig::from_definition(definition).on_change(on_change),
    );
    assert_eq!(as_json(&seen.lock().unwrap()[0]), json!({"email": "", "age": 5}));

    let html = form.render().unwrap();
    assert!(html.contains(r#"layout="vertical""#));
    assert!(html.contains("<button>Register</button>"));
    assert!(html.contains(r#"keys="email0,age1""#));
}

#[test]
fn test_set_fields_memoizes_bindings() {
    let mut form = FastForm::mount(registry(), FormConfig::new(email_age_fields()));
    let before = form.field("email").unwrap();

    form.set_fields(form.fields());
    assert_eq!(form.bindings_generation(), 0);

    let mut fields = email_age_fields();
    fields.push(FieldMeta::new("nickname", "text"));
    form.set_fields(fields);
    assert_eq!(form.bindings_generation(), 1);

    let html = form.render().unwrap();
    assert!(html.contains(r#"keys="email0,age1,nickname2""#));
    assert_eq!(form.values().get("nickname"), Some(&json!("")));

    // Handlers from the previous bindings still write to the same state.
    before.on_change(json!("still@bound.io"));
    assert_eq!(form.values().get("email"), Some(&json!("still@bound.io")));
}
