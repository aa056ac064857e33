//! Form controller lifecycle tests: configure, load, render and submit.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::Method;
use serde_json::json;

use jsonform_controller::{
    FormController, FormError, Handlers, HookContext, HttpResponse, MemoryPage, Page,
    SubmitOutcome, ValidationError,
};
use jsonform_core::diagnostics;
use jsonform_core::{ConfigError, FormParams, SuccessStatus};
use jsonform_test_utils::{
    RecordingRenderer, StubTransport, assert_no_requests, assert_requests, assert_result_contains,
    assert_result_eq, form_controller, form_page, init_test_logging, user_json_schema,
    user_schema, user_value,
};

fn counting(
    counter: &Arc<AtomicUsize>,
) -> impl Fn(&HttpResponse, &mut HookContext<'_>) + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

fn schema_transport() -> StubTransport {
    StubTransport::new().respond_json(
        "user-schema.json",
        &json!({"schema": user_json_schema()}),
    )
}

fn inline_params() -> FormParams {
    FormParams {
        schema: Some(user_schema().into()),
        submit_url: Some("/users".to_string()),
        ..FormParams::default()
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn inline_schema_renders_without_requests() {
    init_test_logging();
    let (mut form, transport, renderer) = form_controller(StubTransport::new(), form_page(""));

    form.configure(inline_params(), Handlers::default())
        .await
        .expect("configure");

    assert_no_requests(&transport);
    assert_eq!(renderer.render_count(), 1);
    let (element, request) = renderer.last().expect("render call");
    assert_eq!(element, "#schema-form");
    assert_eq!(request.schema, user_json_schema());
    assert_eq!(request.form, json!([{"key": "firstName"}, {"key": "lastName"}, {"key": "locale"}]));
    assert_eq!(request.value, None);
}

#[tokio::test]
async fn missing_submit_url_is_reported_without_fetching() {
    let (mut form, transport, renderer) =
        form_controller(schema_transport(), form_page("schemaName=user"));

    let err = form
        .configure_from_query(Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::Config(ConfigError::MissingSubmitUrl)));
    assert_result_eq(&form, "ERROR: Missing submitUrl parameter in URL");
    assert_no_requests(&transport);
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn missing_schema_is_reported_first() {
    let (mut form, transport, _renderer) =
        form_controller(StubTransport::new(), form_page(""));

    let err = form
        .configure_from_query(Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::Config(ConfigError::MissingSchema)));
    assert_result_eq(&form, "ERROR: Missing schemaName parameter in URL");
    assert_no_requests(&transport);
}

#[tokio::test]
async fn unparsable_success_status_is_rejected() {
    let (mut form, transport, _renderer) = form_controller(
        schema_transport(),
        form_page("schemaName=user&submitUrl=/users&successStatus=abc"),
    );

    let err = form
        .configure_from_query(Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FormError::Config(ConfigError::InvalidSuccessStatus(ref raw)) if raw == "abc"
    ));
    assert_result_eq(&form, "ERROR: Invalid successStatus parameter: abc");
    assert_no_requests(&transport);
}

#[tokio::test]
async fn missing_form_element_is_reported() {
    let page = MemoryPage::new("http://localhost:8011/json-form/form.html").with_element("#res");
    let (mut form, transport, renderer) = form_controller(StubTransport::new(), page);

    let err = form
        .configure(inline_params(), Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::Config(ConfigError::MissingFormElement)));
    assert_result_eq(
        &form,
        "ERROR: Missing destination form element, did you call setFormElement?",
    );
    assert_no_requests(&transport);
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn title_param_sets_title_element_and_empty_document_title() {
    let (mut form, _transport, _renderer) = form_controller(
        schema_transport(),
        form_page("title=Create%20user&schemaName=user&submitUrl=/users"),
    );

    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    assert_eq!(form.page().text("#title").as_deref(), Some("Create user"));
    assert_eq!(form.page().document_title(), "Create user");
}

#[tokio::test]
async fn description_goes_to_bound_element_only() {
    let page = form_page("").with_element("#description");
    let (mut form, _transport, _renderer) = form_controller(StubTransport::new(), page);
    form.set_description_element("#description");

    let params = FormParams {
        description: Some("Fill <b>all</b> fields".to_string()),
        ..inline_params()
    };
    form.configure(params, Handlers::default())
        .await
        .expect("configure");

    assert_eq!(
        form.page().text("#description").as_deref(),
        Some("Fill <b>all</b> fields")
    );
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn schema_and_value_are_fetched_in_order() {
    let transport = schema_transport().respond_json("/user/1.json", &user_value());
    let (mut form, transport, renderer) = form_controller(
        transport,
        form_page("schemaName=user&valueUrl=/user/1.json&submitUrl=/user/1.json&submitMethod=PUT"),
    );

    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    assert_requests(&transport, &["GET user-schema.json", "GET /user/1.json"]);
    assert_eq!(renderer.render_count(), 1);
    let (_, request) = renderer.last().expect("render call");
    assert_eq!(request.value, Some(user_value()));
    assert_eq!(form.value(), Some(&user_value()));
}

#[tokio::test]
async fn fetched_layout_reaches_the_renderer_untouched() {
    let form_layout = json!([
        "*",
        {"key": "firstName", "condition": "value.lastName", "description": "help", "minItems": 2},
        {"type": "submit", "title": "Go"}
    ]);
    let transport = StubTransport::new().respond_json(
        "user-schema.json",
        &json!({"schema": user_json_schema(), "form": form_layout.clone()}),
    );
    let (mut form, _transport, renderer) =
        form_controller(transport, form_page("schemaName=user&submitUrl=/users"));

    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    assert_eq!(renderer.render_count(), 1);
    let (_, request) = renderer.last().expect("render call");
    assert_eq!(request.form, form_layout);
    assert_eq!(form.schema().map(|doc| &doc.form), Some(&form_layout));
}

#[tokio::test]
async fn schema_title_fills_empty_title_element() {
    let (mut form, _transport, _renderer) =
        form_controller(schema_transport(), form_page("schemaName=user&submitUrl=/users"));

    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    assert_eq!(form.page().text("#title").as_deref(), Some("User"));
    assert_eq!(form.page().document_title(), "User");
}

#[tokio::test]
async fn schema_load_failure_stops_before_value_and_render() {
    let transport = StubTransport::new()
        .respond(Method::GET, "user-schema.json", 404, "schema not found")
        .respond_json("/user/1.json", &user_value());
    let (mut form, transport, renderer) = form_controller(
        transport,
        form_page("schemaName=user&valueUrl=/user/1.json&submitUrl=/users"),
    );

    let err = form
        .configure_from_query(Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::Load { what: "schema", status: 404, .. }));
    assert_result_eq(
        &form,
        "ERROR: Failed to load schema using URL:<br /><code>user-schema.json</code><br />Response:<br /><code>schema not found</code>",
    );
    assert_requests(&transport, &["GET user-schema.json"]);
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn value_load_failure_prevents_render() {
    let transport =
        schema_transport().respond(Method::GET, "/user/9.json", 500, "db is down");
    let (mut form, _transport, renderer) = form_controller(
        transport,
        form_page("schemaName=user&valueUrl=/user/9.json&submitUrl=/users"),
    );

    let err = form
        .configure_from_query(Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::Load { what: "value", status: 500, .. }));
    assert_result_contains(&form, "Failed to load value using URL:<br /><code>/user/9.json</code>");
    assert_result_contains(&form, "<code>db is down</code>");
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn malformed_schema_document_is_reported() {
    let transport = StubTransport::new().respond(Method::GET, "user-schema.json", 200, "{not json");
    let (mut form, _transport, renderer) =
        form_controller(transport, form_page("schemaName=user&submitUrl=/users"));

    let err = form
        .configure_from_query(Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::InvalidDocument { what: "schema", .. }));
    assert_result_contains(&form, "Failed to load schema using URL");
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn schema_is_fetched_once_per_controller() {
    let (mut form, transport, renderer) =
        form_controller(schema_transport(), form_page("schemaName=user&submitUrl=/users"));

    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");
    form.render().await.expect("second render");

    assert_requests(&transport, &["GET user-schema.json"]);
    assert_eq!(renderer.render_count(), 2);
}

#[tokio::test]
async fn renderer_failure_is_reported() {
    let renderer = RecordingRenderer::failing("unsupported field type <geo>");
    let mut form = FormController::new(
        Arc::new(StubTransport::new()),
        Box::new(form_page("")),
        Box::new(renderer),
    );

    let err = form
        .configure(inline_params(), Handlers::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FormError::Render(_)));
    assert_result_eq(&form, "ERROR: unsupported field type &lt;geo&gt;");
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn matching_status_calls_success_only() {
    let successes = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));
    let transport = schema_transport().respond(Method::PUT, "/user/1.json", 201, "");
    let (mut form, transport, _renderer) = form_controller(
        transport,
        form_page("schemaName=user&submitUrl=/user/1.json&submitMethod=put&successStatus=201"),
    );

    form.configure_from_query(
        Handlers::default()
            .on_success(counting(&successes))
            .on_fail(counting(&failures)),
    )
    .await
    .expect("configure");

    let outcome = form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert!(outcome.is_accepted());
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(failures.load(Ordering::SeqCst), 0);
    assert_requests(&transport, &["GET user-schema.json", "PUT /user/1.json"]);
    let sent = transport.requests().pop().expect("submit request");
    assert_eq!(sent.body, Some(user_value()));
}

#[tokio::test]
async fn default_success_handler_shows_submitted() {
    let transport = StubTransport::new().respond(Method::POST, "/users", 200, "{}");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));
    form.configure(inline_params(), Handlers::default())
        .await
        .expect("configure");

    form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert_result_eq(&form, diagnostics::SUBMITTED);
    assert!(form.page().contains("#res"));
}

#[tokio::test]
async fn mismatched_status_passes_failure_message_to_error_handler() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let successes = Arc::new(AtomicUsize::new(0));
    let transport =
        StubTransport::new().respond(Method::POST, "/users", 500, "{\"error\":\"boom\"}");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));

    form.configure(
        inline_params(),
        Handlers::default()
            .on_success(counting(&successes))
            .on_error(move |html, _ctx| sink.lock().unwrap().push(html.to_string())),
    )
    .await
    .expect("configure");

    let outcome = form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert!(matches!(outcome, SubmitOutcome::Rejected { ref response } if response.status == 500));
    assert_eq!(successes.load(Ordering::SeqCst), 0);
    assert_eq!(
        messages.lock().unwrap().as_slice(),
        [diagnostics::submit_failure(
            "/users",
            SuccessStatus::new(200),
            500,
            "{\"error\":\"boom\"}"
        )]
    );
}

#[tokio::test]
async fn default_fail_handler_writes_error_into_result_sink() {
    let transport = StubTransport::new().respond(Method::POST, "/users", 409, "duplicate");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));
    form.configure(inline_params(), Handlers::default())
        .await
        .expect("configure");

    form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert_result_eq(
        &form,
        "ERROR: Failed to submit form using URL:<br /><code>/users</code><br />Expected status:<br /><code>200</code><br />Status:<br /><code>409</code><br />Response:<br /><code>duplicate</code>",
    );
}

#[tokio::test]
async fn zero_success_status_accepts_any_response() {
    let transport = StubTransport::new().respond(Method::POST, "/users", 418, "teapot");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));
    let params = FormParams {
        success_status: Some(0),
        ..inline_params()
    };
    form.configure(params, Handlers::default())
        .await
        .expect("configure");

    let outcome = form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert!(outcome.is_accepted());
    assert_result_eq(&form, "Submitted.");
}

#[tokio::test]
async fn request_finished_sees_every_response_before_decision() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::clone(&order);
    let failed = Arc::clone(&order);
    let transport = StubTransport::new().respond(Method::POST, "/users", 400, "bad");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));

    form.configure(
        inline_params(),
        Handlers::default()
            .on_request_finished(move |response, _| {
                let status = response.map(|r| r.status).unwrap();
                finished.lock().unwrap().push(format!("finished {status}"));
            })
            .on_fail(move |response, _| {
                failed.lock().unwrap().push(format!("fail {}", response.status));
            }),
    )
    .await
    .expect("configure");

    form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert_eq!(order.lock().unwrap().as_slice(), ["finished 400", "fail 400"]);
}

#[tokio::test]
async fn validation_errors_suppress_the_request() {
    let transport = StubTransport::new().respond(Method::POST, "/users", 200, "");
    let (mut form, transport, _renderer) = form_controller(transport, form_page(""));
    form.configure(inline_params(), Handlers::default())
        .await
        .expect("configure");

    let outcome = form
        .on_submit(
            vec![ValidationError::new("firstName", "is required")],
            json!({"lastName": "Doe"}),
        )
        .await
        .expect("submit");

    assert!(matches!(outcome, SubmitOutcome::Invalid { ref errors } if errors.len() == 1));
    assert_no_requests(&transport);
    assert_result_contains(&form, "<li>firstName: is required</li>");
}

#[tokio::test]
async fn before_submit_can_rewrite_values() {
    let transport = StubTransport::new().respond(Method::POST, "/users", 200, "");
    let (mut form, transport, _renderer) = form_controller(transport, form_page(""));
    form.configure(
        inline_params(),
        Handlers::default().on_before_submit(|values, _| {
            values["id"] = json!(7);
        }),
    )
    .await
    .expect("configure");

    form.on_submit(Vec::new(), json!({"firstName": "Jane"}))
        .await
        .expect("submit");

    let sent = transport.requests().pop().expect("submit request");
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.body, Some(json!({"firstName": "Jane", "id": 7})));
}

#[tokio::test]
async fn submit_without_response_is_reported() {
    let transport = StubTransport::new().fail(Method::POST, "/users", "connection refused");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));
    form.configure(inline_params(), Handlers::default())
        .await
        .expect("configure");

    let err = form.on_submit(Vec::new(), user_value()).await.unwrap_err();

    assert!(matches!(err, FormError::Transport(_)));
    assert_result_contains(&form, "Failed to submit form using URL:<br /><code>/users</code>");
    assert_result_contains(&form, "connection refused");
}

#[tokio::test]
async fn request_finished_runs_when_no_response_arrives() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::clone(&order);
    let errors = Arc::clone(&order);
    let transport = StubTransport::new().fail(Method::POST, "/users", "connection reset");
    let (mut form, _transport, _renderer) = form_controller(transport, form_page(""));
    form.configure(
        inline_params(),
        Handlers::default()
            .on_request_finished(move |response, _| {
                let message = response.map(|r| r.status.to_string()).unwrap_err().to_string();
                finished.lock().unwrap().push(format!("finished: {message}"));
            })
            .on_error(move |_, _| errors.lock().unwrap().push("error".to_string())),
    )
    .await
    .expect("configure");

    let err = form.on_submit(Vec::new(), user_value()).await.unwrap_err();

    assert!(matches!(err, FormError::Transport(_)));
    let order = order.lock().unwrap();
    assert_eq!(order.len(), 2);
    assert!(order[0].starts_with("finished: "));
    assert!(order[0].contains("connection reset"));
    assert_eq!(order[1], "error");
}

#[tokio::test]
async fn submit_without_url_is_skipped() {
    let (mut form, transport, _renderer) = form_controller(StubTransport::new(), form_page(""));

    let outcome = form.on_submit(Vec::new(), user_value()).await.expect("submit");

    assert_eq!(outcome, SubmitOutcome::Skipped);
    assert_no_requests(&transport);
}
