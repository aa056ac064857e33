//! Server-rendered pages hosting forms.
//!
//! A page embeds each form's parameters as a JSON script block next to the elements
//! the form controller binds to. Renderer scripts are supplied by the integrator
//! through [`Page::append_html_head`].

use maud::{DOCTYPE, Markup, PreEscaped, html};
use schemars::JsonSchema;
use serde::Serialize;

use jsonform_core::query::QueryParams;
use jsonform_core::{FormParams, FormSchema, Result};

use crate::repository::Repository;

/// Page chrome around the forms.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Document title.
    pub title: String,
    /// Raw HTML appended to `<head>`.
    pub append_html_head: String,
    /// Raw HTML placed before the forms.
    pub prepend_html: String,
    /// Raw HTML placed after the forms.
    pub append_html: String,
}

type SchemaOf = fn(&Repository) -> Result<FormSchema>;

/// One form on a page.
#[derive(Debug, Clone)]
pub struct Form {
    params: FormParams,
    schema_of: Option<SchemaOf>,
}

impl Form {
    /// A form described entirely by its parameters.
    #[must_use]
    pub fn new(params: FormParams) -> Self {
        Self {
            params,
            schema_of: None,
        }
    }

    /// A form pre-filled with `value`.
    ///
    /// Unless the parameters carry a schema, the page uses the schema of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn with_value<T: Serialize + JsonSchema + 'static>(
        mut params: FormParams,
        value: &T,
    ) -> Result<Self> {
        params.value = Some(serde_json::to_value(value)?);
        let schema_of: SchemaOf = |repository| repository.schema::<T>();
        Ok(Self {
            params,
            schema_of: Some(schema_of),
        })
    }

    /// Parameters as they will be embedded.
    #[must_use]
    pub fn params(&self) -> &FormParams {
        &self.params
    }
}

/// Renders a page hosting `forms`.
///
/// Form `N` (counting from 1) gets the elements `#title-N`, `#schema-form-N` and
/// `#res-N` and its parameters in `#params-N`.
///
/// # Errors
///
/// Returns an error if a value's schema cannot be resolved or parameters cannot be
/// serialized.
pub fn render_page(repository: &Repository, page: &Page, forms: Vec<Form>) -> Result<Markup> {
    let mut sections = Vec::with_capacity(forms.len());
    for (index, form) in forms.into_iter().enumerate() {
        let mut params = form.params;
        if params.schema.is_none() {
            if let Some(schema_of) = form.schema_of {
                params.schema = Some(schema_of(repository)?.into());
            }
        }
        sections.push(form_section(index + 1, &params)?);
    }

    Ok(html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (page.title) }
                (PreEscaped(&page.append_html_head))
            }
            body {
                (PreEscaped(&page.prepend_html))
                @for section in &sections {
                    (section)
                }
                (PreEscaped(&page.append_html))
            }
        }
    })
}

fn form_section(n: usize, params: &FormParams) -> Result<Markup> {
    let json = script_json(params)?;
    Ok(html! {
        div.jsonform id={ "form-" (n) } {
            h2 id={ "title-" (n) } { (params.title.as_deref().unwrap_or_default()) }
            @if let Some(description) = &params.description {
                div id={ "description-" (n) } { (PreEscaped(description)) }
            }
            form id={ "schema-form-" (n) } {}
            div id={ "res-" (n) } style="display:none" {}
            script type="application/json" id={ "params-" (n) } { (PreEscaped(json)) }
        }
    })
}

/// Renders the stand-alone form page configured by a query string.
///
/// The page has the default `#title`, `#schema-form` and `#res` elements; the parsed
/// configuration is embedded in `#params` for the client.
///
/// # Errors
///
/// Returns an error if the parameters cannot be serialized.
pub fn render_query_page(page: &Page, query: &QueryParams) -> Result<Markup> {
    let params = FormParams::from_query(query);
    let json = script_json(&params)?;
    let title = params.title.as_deref().unwrap_or(page.title.as_str());

    Ok(html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                (PreEscaped(&page.append_html_head))
            }
            body {
                (PreEscaped(&page.prepend_html))
                h1 id="title" { (title) }
                form id="schema-form" {}
                div id="res" style="display:none" {}
                script type="application/json" id="params" { (PreEscaped(json)) }
                (PreEscaped(&page.append_html))
            }
        }
    })
}

/// Serializes parameters for a `<script>` block; `</` cannot appear inside one.
fn script_json(params: &FormParams) -> Result<String> {
    Ok(serde_json::to_string(params)?.replace("</", "<\\/"))
}
