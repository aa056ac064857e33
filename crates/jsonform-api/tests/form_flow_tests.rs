//! A form controller driven against a live schema server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use jsonform_api::server::Server;
use jsonform_controller::{
    FormController, FormError, Handlers, MemoryPage, Page, ReqwestTransport, ValidationError,
};
use jsonform_test_utils::{
    RecordingRenderer, assert_result_contains, assert_result_eq, init_test_logging,
    spawn_server,
};

/// A note to self.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Note")]
struct Note {
    #[schemars(length(min = 3))]
    text: String,
}

type Notes = Arc<Mutex<Vec<Value>>>;

fn notes_server(notes: Notes) -> Server {
    let routes = Router::new()
        .route(
            "/notes",
            post(
                |State(notes): State<Notes>, Json(note): Json<Value>| async move {
                    notes.lock().unwrap().push(note);
                    StatusCode::CREATED
                },
            ),
        )
        .with_state(notes);

    let server = Server::builder().routes(routes).build();
    server
        .repository()
        .add_named::<Note>("note")
        .expect("register note");
    server
}

fn controller(location: &str, renderer: &RecordingRenderer) -> FormController {
    let transport = ReqwestTransport::new(Some(location)).expect("transport");
    FormController::new(
        Arc::new(transport),
        Box::new(MemoryPage::standard(location)),
        Box::new(renderer.clone()),
    )
}

#[tokio::test]
async fn schema_by_name_loads_and_submit_is_accepted() {
    init_test_logging();
    let notes: Notes = Arc::default();
    let server = spawn_server(notes_server(Arc::clone(&notes)).test_router()).await;

    let location = server.url(
        "/json-form/form.html?schemaName=note&submitUrl=/notes&submitMethod=POST&successStatus=201",
    );
    let renderer = RecordingRenderer::new();
    let mut form = controller(&location, &renderer);

    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    assert_eq!(renderer.render_count(), 1);
    let (_, request) = renderer.last().expect("render call");
    assert_eq!(request.schema["title"], "Note");
    assert_eq!(request.schema["properties"]["text"]["required"], json!(true));
    assert_eq!(form.page().text("#title").as_deref(), Some("Note"));

    let outcome = form
        .on_submit(Vec::new(), json!({"text": "buy milk"}))
        .await
        .expect("submit");
    assert!(outcome.is_accepted());
    assert_result_eq(&form, "Submitted.");
    assert_eq!(*notes.lock().unwrap(), [json!({"text": "buy milk"})]);
}

#[tokio::test]
async fn unexpected_status_is_reported_with_server_body() {
    let notes: Notes = Arc::default();
    let server = spawn_server(notes_server(notes).test_router()).await;

    // The server answers 201; the form expects the default 200.
    let location = server.url("/json-form/form.html?schemaName=note&submitUrl=/notes");
    let renderer = RecordingRenderer::new();
    let mut form = controller(&location, &renderer);
    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    let outcome = form
        .on_submit(Vec::new(), json!({"text": "buy milk"}))
        .await
        .expect("submit");
    assert!(!outcome.is_accepted());
    assert_result_contains(&form, "<code>200</code>");
    assert_result_contains(&form, "<code>201</code>");
}

#[tokio::test]
async fn validation_errors_skip_the_request() {
    let notes: Notes = Arc::default();
    let server = spawn_server(notes_server(Arc::clone(&notes)).test_router()).await;

    let location = server.url("/json-form/form.html?schemaName=note&submitUrl=/notes");
    let renderer = RecordingRenderer::new();
    let mut form = controller(&location, &renderer);
    form.configure_from_query(Handlers::default())
        .await
        .expect("configure");

    form.on_submit(
        vec![ValidationError::new("text", "Text is too short")],
        json!({"text": "x"}),
    )
    .await
    .expect("submit");

    assert_result_contains(&form, "Text is too short");
    assert!(notes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_schema_name_fails_to_load() {
    let server = spawn_server(notes_server(Arc::default()).test_router()).await;

    let location = server.url("/json-form/form.html?schemaName=ghost&submitUrl=/notes");
    let renderer = RecordingRenderer::new();
    let mut form = controller(&location, &renderer);
    let err = form
        .configure_from_query(Handlers::default())
        .await
        .expect_err("load must fail");

    assert!(matches!(err, FormError::Load { .. }));
    assert_eq!(renderer.render_count(), 0);
    assert_result_contains(&form, "ghost-schema.json");
    assert_result_contains(&form, "NOT_FOUND");
}
