//! `jsonform-demo`: an in-memory users service with JSON forms.
//!
//! ```text
//! GET  /                  - Users with create/edit links
//! GET  /create-user       - Server-rendered page with three forms
//! GET  /edit-user/:id     - Server-rendered edit form
//! POST /users             - Create user (201)
//! GET  /users.json        - List users
//! GET  /user/:id.json     - Get user
//! PUT  /user/:id.json     - Replace user (204)
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use maud::{DOCTYPE, Markup, html};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use jsonform_api::config::Config;
use jsonform_api::error::{ApiError, ApiResult};
use jsonform_api::page::{Form, Page, render_page};
use jsonform_api::repository::Repository;
use jsonform_api::server::Server;
use jsonform_core::FormParams;
use jsonform_core::observability::{LogFormat, init_logging};

const USER_SCHEMA: &str = "user";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
enum Locale {
    #[serde(rename = "ru-RU")]
    RuRu,
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum UserStatus {
    #[default]
    New,
    Approved,
    Active,
    Deleted,
}

/// User is a sample entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "User")]
struct User {
    #[schemars(title = "First name", length(min = 3))]
    first_name: String,
    #[schemars(title = "Last name", length(min = 3))]
    last_name: String,
    #[serde(default)]
    #[schemars(title = "User locale")]
    locale: Locale,
    #[serde(default)]
    #[schemars(title = "Age", range(min = 1))]
    age: u32,
    #[serde(default)]
    #[schemars(title = "Status")]
    status: UserStatus,
    /// A brief description of the person.
    #[serde(default)]
    #[schemars(title = "Bio", extend("x-jsonform" = {"type": "textarea"}))]
    bio: String,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
struct Another {
    #[schemars(title = "Foo", length(min = 3))]
    foo: String,
    #[schemars(title = "Bar", length(max = 3))]
    bar: String,
}

#[derive(Debug, Clone)]
struct DemoState {
    users: Arc<RwLock<Vec<User>>>,
    repository: Arc<Repository>,
    prefix: String,
}

impl DemoState {
    async fn user(&self, id: usize) -> ApiResult<User> {
        let users = self.users.read().await;
        id.checked_sub(1)
            .and_then(|index| users.get(index))
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("user not found: {id}")))
    }
}

fn user_id(file: &str) -> ApiResult<usize> {
    file.strip_suffix(".json")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| ApiError::not_found(format!("no such user document: {file}")))
}

async fn index(State(state): State<DemoState>) -> Markup {
    let users = state.users.read().await;
    let form = format!("{}form.html", state.prefix);

    html! {
        (DOCTYPE)
        html {
            head { meta charset="utf-8"; title { "Users" } }
            body {
                div {
                    a href={ (form) "?title=Create%20user&schemaName=" (USER_SCHEMA) "&submitUrl=/users&submitMethod=POST&successStatus=201" } {
                        "Create user with dynamic form"
                    }
                    br;
                    a href="/create-user" { "Create user with static form" }
                }
                ul {
                    @for (index, user) in users.iter().enumerate() {
                        @let id = index + 1;
                        li {
                            (user.first_name) " " (user.last_name) " "
                            a href={ (form) "?title=Edit%20user&schemaName=" (USER_SCHEMA) "&valueUrl=/user/" (id) ".json&submitUrl=/user/" (id) ".json&submitMethod=PUT&successStatus=204" } {
                                "Edit with dynamic form"
                            }
                            " "
                            a href={ "/edit-user/" (id) } { "Edit with static form" }
                        }
                    }
                }
            }
        }
    }
}

async fn create_user_page(State(state): State<DemoState>) -> ApiResult<Markup> {
    let page = Page {
        title: "Create User and some more".to_string(),
        ..Page::default()
    };
    let another = |title: &str| {
        Form::with_value(
            FormParams {
                title: Some(title.to_string()),
                submit_method: Some("PUT".to_string()),
                submit_url: Some("/nowhere".to_string()),
                ..FormParams::default()
            },
            &Another::default(),
        )
    };

    let forms = vec![
        Form::with_value(
            FormParams {
                title: Some("Create User".to_string()),
                submit_method: Some("POST".to_string()),
                submit_url: Some("/users".to_string()),
                success_status: Some(201),
                ..FormParams::default()
            },
            &User::default(),
        )?,
        another("Another random form")?,
        another("More random forms")?,
    ];

    Ok(render_page(&state.repository, &page, forms)?)
}

async fn edit_user_page(
    State(state): State<DemoState>,
    Path(id): Path<usize>,
) -> ApiResult<Markup> {
    let user = state.user(id).await?;
    let form = Form::with_value(
        FormParams {
            title: Some("Update User".to_string()),
            submit_method: Some("PUT".to_string()),
            submit_url: Some(format!("/user/{id}.json")),
            success_status: Some(204),
            ..FormParams::default()
        },
        &user,
    )?;

    Ok(render_page(&state.repository, &Page::default(), vec![form])?)
}

async fn create_user(State(state): State<DemoState>, Json(user): Json<User>) -> StatusCode {
    let mut users = state.users.write().await;
    users.push(user);
    tracing::info!(id = users.len(), "user created");
    StatusCode::CREATED
}

async fn list_users(State(state): State<DemoState>) -> Json<Vec<User>> {
    Json(state.users.read().await.clone())
}

async fn get_user(
    State(state): State<DemoState>,
    Path(file): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.user(user_id(&file)?).await?))
}

async fn update_user(
    State(state): State<DemoState>,
    Path(file): Path<String>,
    Json(user): Json<User>,
) -> ApiResult<StatusCode> {
    let id = user_id(&file)?;
    let mut users = state.users.write().await;
    let slot = id
        .checked_sub(1)
        .and_then(|index| users.get_mut(index))
        .ok_or_else(|| ApiError::not_found(format!("user not found: {id}")))?;
    *slot = user;
    tracing::info!(id, "user updated");
    Ok(StatusCode::NO_CONTENT)
}

fn demo_routes(state: DemoState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/create-user", get(create_user_page))
        .route("/edit-user/:id", get(edit_user_page))
        .route("/users", axum::routing::post(create_user))
        .route("/users.json", get(list_users))
        .route("/user/:file", get(get_user).put(update_user))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;

    init_logging(if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    });

    let repository = Arc::new(Repository::with_strict(config.strict));
    repository
        .add_named::<User>(USER_SCHEMA)
        .context("registering user schema")?;
    repository
        .add::<Another>()
        .context("registering another schema")?;

    let state = DemoState {
        users: Arc::new(RwLock::new(vec![User {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            locale: Locale::EnUs,
            age: 30,
            status: UserStatus::Approved,
            bio: "whoa, I never existed!".to_string(),
        }])),
        repository: Arc::clone(&repository),
        prefix: config.prefix.clone(),
    };

    tracing::info!(port = config.http_port, "JSON forms demo at http://localhost:{}/", config.http_port);

    Server::builder()
        .config(config)
        .repository(repository)
        .routes(demo_routes(state))
        .build()
        .serve()
        .await?;
    Ok(())
}
