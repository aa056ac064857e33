//! Caller hooks and their defaults.
//!
//! Hooks receive a [`HookContext`] as their last argument: the page, the bound
//! elements and the submit settings of the controller that invoked them.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use jsonform_core::SuccessStatus;
use jsonform_core::diagnostics;

use crate::error::TransportError;
use crate::page::{Elements, Page};
use crate::transport::HttpResponse;

/// Hook receiving a completed response.
pub type ResponseHook = Arc<dyn Fn(&HttpResponse, &mut HookContext<'_>) + Send + Sync>;

/// Hook receiving the end of a submit request: its response, or the transport error
/// when none arrived.
pub type FinishedHook =
    Arc<dyn Fn(Result<&HttpResponse, &TransportError>, &mut HookContext<'_>) + Send + Sync>;

/// Hook receiving an HTML message.
pub type MessageHook = Arc<dyn Fn(&str, &mut HookContext<'_>) + Send + Sync>;

/// Hook receiving the values about to be submitted; it may modify them.
pub type ValuesHook = Arc<dyn Fn(&mut Value, &mut HookContext<'_>) + Send + Sync>;

/// View of a controller handed to hooks.
pub struct HookContext<'a> {
    /// The page the form lives in.
    pub page: &'a mut dyn Page,
    /// Bound element selectors.
    pub elements: &'a Elements,
    /// Configured submit URL.
    pub submit_url: &'a str,
    /// Configured success status.
    pub success_status: SuccessStatus,
    error: Option<&'a MessageHook>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(
        page: &'a mut dyn Page,
        elements: &'a Elements,
        submit_url: &'a str,
        success_status: SuccessStatus,
        error: Option<&'a MessageHook>,
    ) -> Self {
        Self {
            page,
            elements,
            submit_url,
            success_status,
            error,
        }
    }

    /// Writes HTML into the result sink and shows it.
    pub fn show_result(&mut self, html: &str) {
        if let Some(result) = &self.elements.result {
            self.page.set_html(result, html);
            self.page.set_visible(result, true);
        }
    }

    /// Clears and hides the result sink.
    pub fn clear_result(&mut self) {
        if let Some(result) = &self.elements.result {
            self.page.set_html(result, "");
            self.page.set_visible(result, false);
        }
    }

    /// Reports an error through the controller's error handler.
    pub fn report_error(&mut self, html: &str) {
        let error = self.error;
        match error {
            Some(hook) => hook(html, self),
            None => default_error(html, self),
        }
    }
}

impl fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("elements", &self.elements)
            .field("submit_url", &self.submit_url)
            .field("success_status", &self.success_status)
            .finish_non_exhaustive()
    }
}

/// Hooks a caller can supply; unset success, fail and error hooks get defaults on
/// configure.
#[derive(Clone, Default)]
pub struct Handlers {
    /// Called when a submit response has the expected status.
    pub on_success: Option<ResponseHook>,
    /// Called when a submit response has an unexpected status.
    pub on_fail: Option<ResponseHook>,
    /// Called with an HTML message for every reported error.
    pub on_error: Option<MessageHook>,
    /// Called with the values right before they are submitted.
    pub on_before_submit: Option<ValuesHook>,
    /// Called when every submit request ends, before the success/fail decision.
    /// Also called when no response arrived.
    pub on_request_finished: Option<FinishedHook>,
}

impl Handlers {
    /// Sets the success hook.
    #[must_use]
    pub fn on_success(
        mut self,
        hook: impl Fn(&HttpResponse, &mut HookContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    /// Sets the fail hook.
    #[must_use]
    pub fn on_fail(
        mut self,
        hook: impl Fn(&HttpResponse, &mut HookContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_fail = Some(Arc::new(hook));
        self
    }

    /// Sets the error hook.
    #[must_use]
    pub fn on_error(
        mut self,
        hook: impl Fn(&str, &mut HookContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Sets the before-submit hook.
    #[must_use]
    pub fn on_before_submit(
        mut self,
        hook: impl Fn(&mut Value, &mut HookContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_before_submit = Some(Arc::new(hook));
        self
    }

    /// Sets the request-finished hook.
    #[must_use]
    pub fn on_request_finished(
        mut self,
        hook: impl Fn(Result<&HttpResponse, &TransportError>, &mut HookContext<'_>)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.on_request_finished = Some(Arc::new(hook));
        self
    }

    /// Overrides hooks with the ones set in `other`.
    pub fn merge(&mut self, other: Handlers) {
        let Handlers {
            on_success,
            on_fail,
            on_error,
            on_before_submit,
            on_request_finished,
        } = other;

        if on_success.is_some() {
            self.on_success = on_success;
        }
        if on_fail.is_some() {
            self.on_fail = on_fail;
        }
        if on_error.is_some() {
            self.on_error = on_error;
        }
        if on_before_submit.is_some() {
            self.on_before_submit = on_before_submit;
        }
        if on_request_finished.is_some() {
            self.on_request_finished = on_request_finished;
        }
    }

    /// Installs the default success, fail and error hooks where none is set.
    pub fn install_defaults(&mut self) {
        if self.on_error.is_none() {
            let hook: MessageHook = Arc::new(default_error);
            self.on_error = Some(hook);
        }
        if self.on_fail.is_none() {
            let hook: ResponseHook = Arc::new(default_fail);
            self.on_fail = Some(hook);
        }
        if self.on_success.is_none() {
            let hook: ResponseHook = Arc::new(default_success);
            self.on_success = Some(hook);
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_success", &self.on_success.is_some())
            .field("on_fail", &self.on_fail.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_before_submit", &self.on_before_submit.is_some())
            .field("on_request_finished", &self.on_request_finished.is_some())
            .finish()
    }
}

/// Shows `Submitted.` in the result sink.
pub fn default_success(_response: &HttpResponse, ctx: &mut HookContext<'_>) {
    ctx.show_result(diagnostics::SUBMITTED);
}

/// Shows `ERROR: <html>` in the result sink.
pub fn default_error(html: &str, ctx: &mut HookContext<'_>) {
    ctx.show_result(&format!("{}{html}", diagnostics::ERROR_PREFIX));
}

/// Reports the submit URL, expected and actual status, and the response body.
pub fn default_fail(response: &HttpResponse, ctx: &mut HookContext<'_>) {
    let message = diagnostics::submit_failure(
        ctx.submit_url,
        ctx.success_status,
        response.status,
        &response.body,
    );
    ctx.report_error(&message);
}
