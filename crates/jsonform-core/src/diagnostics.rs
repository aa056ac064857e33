//! User-facing diagnostic messages.
//!
//! These are HTML fragments written into the result sink. Response bodies are embedded
//! verbatim; validation messages are escaped since they originate from field input.

use std::fmt::Write as _;

use crate::status::SuccessStatus;

/// Text shown by the default success handler.
pub const SUBMITTED: &str = "Submitted.";

/// Prefix used by the default error handler.
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Message for a failed schema or value load.
#[must_use]
pub fn load_failure(what: &str, url: &str, response_text: &str) -> String {
    format!(
        "Failed to load {what} using URL:<br /><code>{url}</code><br />Response:<br /><code>{response_text}</code>"
    )
}

/// Message for a submit whose response status did not match the expectation.
#[must_use]
pub fn submit_failure(
    url: &str,
    expected: SuccessStatus,
    actual: u16,
    response_text: &str,
) -> String {
    format!(
        "Failed to submit form using URL:<br /><code>{url}</code><br />Expected status:<br /><code>{expected}</code><br />Status:<br /><code>{actual}</code><br />Response:<br /><code>{response_text}</code>"
    )
}

/// Message for a submit that got no response at all.
#[must_use]
pub fn submit_transport_failure(url: &str, error: &str) -> String {
    format!(
        "Failed to submit form using URL:<br /><code>{url}</code><br />Error:<br /><code>{}</code>",
        escape_html(error)
    )
}

/// Message listing local validation errors.
#[must_use]
pub fn validation_failure<'a>(messages: impl IntoIterator<Item = &'a str>) -> String {
    let mut html = String::from("Please correct the form:<ul>");
    for message in messages {
        let _ = write!(html, "<li>{}</li>", escape_html(message));
    }
    html.push_str("</ul>");
    html
}

/// Escapes text for embedding in a message, the way `maud` escapes rendered strings.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    maud::html! { (raw) }.into_string()
}
