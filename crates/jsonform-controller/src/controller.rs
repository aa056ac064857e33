//! The form controller.
//!
//! Lifecycle: [`FormController::configure`] validates the configuration and renders;
//! rendering fetches the schema document, then the value, then invokes the renderer;
//! [`FormController::on_submit`] sends the collected values. Each step issues at most
//! one request and nothing is retried.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::Instrument;

use jsonform_core::diagnostics;
use jsonform_core::observability::form_span;
use jsonform_core::params::schema_url_for;
use jsonform_core::query::{QueryParams, parse_query, query_of};
use jsonform_core::{
    ConfigError, FormParams, SchemaDocument, SchemaSource, StatusCheck, SuccessStatus, ValueSource,
};

use crate::error::FormError;
use crate::handlers::{Handlers, HookContext};
use crate::page::{Elements, Page};
use crate::renderer::{FormRenderer, RenderRequest, ValidationError};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Status a schema or value fetch must return.
const LOAD_SUCCESS_STATUS: u16 = 200;

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The renderer reported validation errors; nothing was sent.
    Invalid {
        /// Errors as reported by the renderer.
        errors: Vec<ValidationError>,
    },
    /// No submit URL is set; nothing was sent.
    Skipped,
    /// The response had the expected status.
    Accepted {
        /// The submit response.
        response: HttpResponse,
    },
    /// The response had an unexpected status and the fail handler was invoked.
    Rejected {
        /// The submit response.
        response: HttpResponse,
    },
}

impl SubmitOutcome {
    /// Returns true if the submission was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone)]
struct SubmitSettings {
    url: String,
    method: Method,
    success_status: SuccessStatus,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::POST,
            success_status: SuccessStatus::default(),
        }
    }
}

/// Renders one form and submits its values.
///
/// A controller is bound to one schema: the schema document and the initial value are
/// fetched at most once and cached for its lifetime.
pub struct FormController {
    transport: Arc<dyn Transport>,
    page: Box<dyn Page>,
    renderer: Box<dyn FormRenderer>,
    elements: Elements,
    handlers: Handlers,
    schema_name: Option<String>,
    schema_url: Option<String>,
    schema: Option<SchemaDocument>,
    value_url: Option<String>,
    value: Option<Value>,
    submit: SubmitSettings,
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("transport", &"<Transport>")
            .field("page", &"<Page>")
            .field("renderer", &"<FormRenderer>")
            .field("elements", &self.elements)
            .field("handlers", &self.handlers)
            .field("schema_name", &self.schema_name)
            .field("schema_url", &self.schema_url)
            .field("schema_loaded", &self.schema.is_some())
            .field("value_url", &self.value_url)
            .field("value_loaded", &self.value.is_some())
            .field("submit", &self.submit)
            .finish()
    }
}

impl FormController {
    /// Creates a controller over the given collaborators.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        page: Box<dyn Page>,
        renderer: Box<dyn FormRenderer>,
    ) -> Self {
        Self {
            transport,
            page,
            renderer,
            elements: Elements::default(),
            handlers: Handlers::default(),
            schema_name: None,
            schema_url: None,
            schema: None,
            value_url: None,
            value: None,
            submit: SubmitSettings::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Element and data setters
    // ------------------------------------------------------------------------

    /// Binds the title element.
    pub fn set_title_element(&mut self, selector: impl Into<String>) {
        self.elements.title = Some(selector.into());
    }

    /// Binds the description element.
    pub fn set_description_element(&mut self, selector: impl Into<String>) {
        self.elements.description = Some(selector.into());
    }

    /// Binds the destination form element.
    pub fn set_form_element(&mut self, selector: impl Into<String>) {
        self.elements.form = Some(selector.into());
    }

    /// Binds the result sink.
    pub fn set_result_element(&mut self, selector: impl Into<String>) {
        self.elements.result = Some(selector.into());
    }

    /// Sets the schema name; the schema is fetched from `<name>-schema.json`.
    pub fn set_schema_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.schema_url = Some(schema_url_for(&name));
        self.schema_name = Some(name);
    }

    /// Sets the URL the initial value is fetched from.
    pub fn set_value_url(&mut self, url: impl Into<String>) {
        self.value_url = Some(url.into());
    }

    /// Sets the submit method and URL.
    pub fn set_submit_url(&mut self, method: Method, url: impl Into<String>) {
        self.submit.method = method;
        self.submit.url = url.into();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The page the form lives in.
    #[must_use]
    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    /// Bound element selectors.
    #[must_use]
    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// The schema document, once resolved.
    #[must_use]
    pub fn schema(&self) -> Option<&SchemaDocument> {
        self.schema.as_ref()
    }

    /// The initial value, once resolved.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Current content of the result sink, if it is bound and exists.
    #[must_use]
    pub fn result_text(&self) -> Option<String> {
        self.elements
            .result
            .as_deref()
            .and_then(|selector| self.page.text(selector))
    }

    /// Parses the page's query string.
    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        parse_query(query_of(&self.page.location()))
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Configures the form from the page's query string, then renders it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or rendering fails; the error
    /// has already been reported through the error handler.
    pub async fn configure_from_query(&mut self, handlers: Handlers) -> Result<(), FormError> {
        let query = self.query_params();
        match FormParams::from_query_strict(&query) {
            Ok(params) => self.configure(params, handlers).await,
            Err(err) => {
                self.prepare(handlers);
                Err(self.config_error(err))
            }
        }
    }

    /// Applies the configuration, then renders the form.
    ///
    /// Title and description are written before validation; default element bindings
    /// and default handlers are installed for whatever the caller left unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or rendering fails; the error
    /// has already been reported through the error handler.
    pub async fn configure(
        &mut self,
        params: FormParams,
        handlers: Handlers,
    ) -> Result<(), FormError> {
        self.prepare(handlers);

        if let Some(title) = params.title.as_deref().filter(|t| !t.trim().is_empty()) {
            if let Some(selector) = &self.elements.title {
                self.page.set_text(selector, title);
            }
            if self.page.document_title().is_empty() {
                self.page.set_document_title(title);
            }
        }

        if let (Some(description), Some(selector)) = (
            params.description.as_deref().filter(|d| !d.trim().is_empty()),
            &self.elements.description,
        ) {
            self.page.set_html(selector, description);
        }

        let resolved = match params.resolve() {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.config_error(err)),
        };

        match resolved.schema {
            SchemaSource::Inline(schema) => self.schema = Some(schema),
            SchemaSource::Remote { name, url } => {
                self.schema_name = name;
                self.schema_url = Some(url);
            }
        }
        match resolved.value {
            ValueSource::Inline(value) => self.value = Some(value),
            ValueSource::Remote(url) => self.value_url = Some(url),
            ValueSource::None => {}
        }
        self.submit = SubmitSettings {
            url: resolved.submit_url,
            method: resolved.submit_method,
            success_status: resolved.success_status,
        };

        tracing::debug!(
            schema = self.schema_name.as_deref().unwrap_or("inline"),
            submit_url = %self.submit.url,
            submit_method = %self.submit.method,
            success_status = %self.submit.success_status,
            "form configured"
        );

        let span = form_span(
            "render",
            self.schema_name.as_deref().unwrap_or("inline"),
            &self.submit.url,
        );
        self.render().instrument(span).await
    }

    fn prepare(&mut self, handlers: Handlers) {
        self.elements.bind_defaults();
        self.handlers.merge(handlers);
        self.handlers.install_defaults();
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Resolves the schema and value, then invokes the renderer.
    ///
    /// The renderer is only invoked once both the schema and, when one is configured,
    /// the value are available.
    ///
    /// # Errors
    ///
    /// Returns an error if the form element is missing, a fetch fails, or the renderer
    /// rejects the document; the error has already been reported.
    pub async fn render(&mut self) -> Result<(), FormError> {
        let Some(form_element) = self
            .elements
            .form
            .clone()
            .filter(|selector| self.page.contains(selector))
        else {
            return Err(self.config_error(ConfigError::MissingFormElement));
        };

        if self.schema.is_none() {
            let Some(url) = self.schema_url.clone() else {
                return Err(self.config_error(ConfigError::MissingSchema));
            };
            let document = self.load("schema", &url).await?;
            let schema: SchemaDocument = match serde_json::from_value(document) {
                Ok(schema) => schema,
                Err(err) => return Err(self.invalid_document("schema", &url, &err.to_string())),
            };
            self.apply_schema_title(&schema);
            self.schema = Some(schema);
        }

        if self.value.is_none() {
            if let Some(url) = self.value_url.clone().filter(|url| !url.is_empty()) {
                let value = self.load("value", &url).await?;
                self.value = Some(value);
            }
        }

        let request = self.schema.as_ref().map(|schema| RenderRequest {
            schema: schema.schema.clone(),
            form: schema.form.clone(),
            value: self.value.clone(),
        });
        let Some(request) = request else {
            return Err(self.config_error(ConfigError::MissingSchema));
        };

        tracing::debug!(element = %form_element, "rendering form");
        if let Err(err) = self.renderer.render(&form_element, request) {
            self.report_error(&diagnostics::escape_html(&err.0));
            return Err(FormError::Render(err.0));
        }
        Ok(())
    }

    fn apply_schema_title(&mut self, schema: &SchemaDocument) {
        let Some(title) = schema.title() else {
            return;
        };
        let Some(selector) = self.elements.title.as_deref() else {
            return;
        };
        if self.page.text(selector).is_some_and(|text| text.is_empty()) {
            self.page.set_text(selector, title);
            self.page.set_document_title(title);
        }
    }

    async fn load(&mut self, what: &'static str, url: &str) -> Result<Value, FormError> {
        tracing::debug!(what, url, "loading form document");

        let response = match self.transport.send(HttpRequest::get(url)).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(what, url, error = %err, "form document request failed");
                self.report_error(&diagnostics::load_failure(
                    what,
                    url,
                    &diagnostics::escape_html(&err.to_string()),
                ));
                return Err(err.into());
            }
        };

        if response.status != LOAD_SUCCESS_STATUS {
            tracing::warn!(what, url, status = response.status, "form document not loaded");
            self.report_error(&diagnostics::load_failure(what, url, &response.body));
            return Err(FormError::Load {
                what,
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }

        match serde_json::from_str(&response.body) {
            Ok(document) => Ok(document),
            Err(err) => Err(self.invalid_document(what, url, &err.to_string())),
        }
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Handles a submission reported by the renderer.
    ///
    /// Validation errors suppress the request and are listed in the result sink.
    /// Otherwise the values go through the before-submit hook and are sent. The
    /// request-finished hook sees how the request ended, with or without a response;
    /// a response then goes to the success or fail hook depending on its status.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Transport`] if no response was received, and
    /// [`FormError::UnexpectedStatus`] if the status did not match and no fail hook is
    /// installed.
    pub async fn on_submit(
        &mut self,
        errors: Vec<ValidationError>,
        values: Value,
    ) -> Result<SubmitOutcome, FormError> {
        self.hook_context().clear_result();

        if !errors.is_empty() {
            tracing::warn!(count = errors.len(), errors = ?errors, "form has validation errors, submit suppressed");
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            self.report_error(&diagnostics::validation_failure(
                messages.iter().map(String::as_str),
            ));
            return Ok(SubmitOutcome::Invalid { errors });
        }

        let mut values = values;
        if let Some(hook) = self.handlers.on_before_submit.clone() {
            hook(&mut values, &mut self.hook_context());
        }

        if self.submit.url.is_empty() {
            tracing::debug!("no submit URL configured, submit skipped");
            return Ok(SubmitOutcome::Skipped);
        }

        let url = self.submit.url.clone();
        let request = HttpRequest::json(self.submit.method.clone(), url.as_str(), values);
        let span = form_span(
            "submit",
            self.schema_name.as_deref().unwrap_or("inline"),
            &url,
        );
        let response = match self.transport.send(request).instrument(span).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "submit request failed");
                if let Some(hook) = self.handlers.on_request_finished.clone() {
                    hook(Err(&err), &mut self.hook_context());
                }
                self.report_error(&diagnostics::submit_transport_failure(&url, &err.to_string()));
                return Err(err.into());
            }
        };

        tracing::info!(
            url = %url,
            status = response.status,
            expected = %self.submit.success_status,
            "submit request finished"
        );

        if let Some(hook) = self.handlers.on_request_finished.clone() {
            hook(Ok(&response), &mut self.hook_context());
        }

        match self.submit.success_status.check(response.status) {
            StatusCheck::Success => {
                if let Some(hook) = self.handlers.on_success.clone() {
                    hook(&response, &mut self.hook_context());
                }
                Ok(SubmitOutcome::Accepted { response })
            }
            StatusCheck::Failure => match self.handlers.on_fail.clone() {
                Some(hook) => {
                    hook(&response, &mut self.hook_context());
                    Ok(SubmitOutcome::Rejected { response })
                }
                None => Err(FormError::UnexpectedStatus {
                    url,
                    expected: self.submit.success_status,
                    actual: response.status,
                    body: response.body,
                }),
            },
        }
    }

    // ------------------------------------------------------------------------
    // Error reporting
    // ------------------------------------------------------------------------

    fn hook_context(&mut self) -> HookContext<'_> {
        HookContext::new(
            self.page.as_mut(),
            &self.elements,
            &self.submit.url,
            self.submit.success_status,
            self.handlers.on_error.as_ref(),
        )
    }

    fn report_error(&mut self, html: &str) {
        self.hook_context().report_error(html);
    }

    fn config_error(&mut self, err: ConfigError) -> FormError {
        tracing::warn!(error = %err, "form configuration error");
        self.report_error(&err.to_string());
        FormError::Config(err)
    }

    fn invalid_document(&mut self, what: &'static str, url: &str, message: &str) -> FormError {
        tracing::warn!(what, url, error = message, "form document is invalid");
        self.report_error(&diagnostics::load_failure(
            what,
            url,
            &diagnostics::escape_html(message),
        ));
        FormError::InvalidDocument {
            what,
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}
