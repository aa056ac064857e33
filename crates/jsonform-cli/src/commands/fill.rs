//! Fill command - load a form and submit values to it.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

use jsonform_controller::{
    FormController, Handlers, MemoryPage, ReqwestTransport, SubmitOutcome, ValidationError,
};

use crate::renderer::TerminalRenderer;
use crate::{Config, OutputFormat};

/// Arguments for the fill command.
#[derive(Debug, Args)]
pub struct FillArgs {
    /// Form configuration as a query string, e.g.
    /// `schemaName=user&submitUrl=/users&submitMethod=POST&successStatus=201`.
    #[arg(long, short = 'q')]
    pub query: String,

    /// JSON file with the values to submit; `-` reads stdin.
    #[arg(long, short = 'v', default_value = "-")]
    pub values: String,
}

/// Result of a fill.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    /// Whether the server accepted the submission.
    pub accepted: bool,
    /// `accepted`, `rejected`, `invalid` or `skipped`.
    pub outcome: &'static str,
    /// Submit response status, when a request was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Content of the form's result sink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Validation errors that suppressed the submission.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

/// Execute the fill command.
///
/// # Errors
///
/// Returns an error if the values cannot be read, the form cannot be loaded, or the
/// submission is not accepted.
pub async fn execute(args: FillArgs, config: &Config) -> Result<()> {
    let values = read_values(&args.values)?;
    let renderer = if matches!(config.format, OutputFormat::Json) {
        TerminalRenderer::quiet()
    } else {
        TerminalRenderer::new()
    };

    let report = fill(&args.query, values, config, renderer).await?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text | OutputFormat::Table => print_report(&report),
    }

    if report.accepted {
        Ok(())
    } else {
        anyhow::bail!("form was not submitted ({})", report.outcome)
    }
}

/// Loads the form configured by `query`, validates `values` and submits them.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the schema or value cannot be
/// loaded, or no response to the submission was received.
pub async fn fill(
    query: &str,
    values: Value,
    config: &Config,
    renderer: TerminalRenderer,
) -> Result<FillReport> {
    let location = config.url(&format!("form.html?{}", query.trim_start_matches('?')));
    let transport =
        ReqwestTransport::new(Some(&location)).context("Failed to create HTTP transport")?;
    let mut form = FormController::new(
        Arc::new(transport),
        Box::new(MemoryPage::standard(location.clone())),
        Box::new(renderer.clone()),
    );

    if let Err(err) = form.configure_from_query(Handlers::default()).await {
        let shown = form.result_text().map(|html| plain_text(&html));
        return Err(anyhow!(err)).context(shown.unwrap_or_else(|| "Failed to load form".into()));
    }

    let errors = renderer.validate(&values);
    let outcome = match form.on_submit(errors, values).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let shown = form.result_text().map(|html| plain_text(&html));
            return Err(anyhow!(err)).context(shown.unwrap_or_else(|| "Failed to submit".into()));
        }
    };
    let result = form.result_text().map(|html| plain_text(&html));

    Ok(match outcome {
        SubmitOutcome::Accepted { response } => FillReport {
            accepted: true,
            outcome: "accepted",
            status: Some(response.status),
            result,
            errors: Vec::new(),
        },
        SubmitOutcome::Rejected { response } => FillReport {
            accepted: false,
            outcome: "rejected",
            status: Some(response.status),
            result,
            errors: Vec::new(),
        },
        SubmitOutcome::Invalid { errors } => FillReport {
            accepted: false,
            outcome: "invalid",
            status: None,
            result,
            errors,
        },
        SubmitOutcome::Skipped => FillReport {
            accepted: false,
            outcome: "skipped",
            status: None,
            result,
            errors: Vec::new(),
        },
    })
}

fn read_values(source: &str) -> Result<Value> {
    let raw = if source == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read values from stdin")?
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {source}"))?
    };
    serde_json::from_str(&raw).context("Values are not valid JSON")
}

fn print_report(report: &FillReport) {
    let outcome = if report.accepted {
        report.outcome.green().to_string()
    } else {
        report.outcome.red().to_string()
    };
    match report.status {
        Some(status) => println!("{outcome} (status {status})"),
        None => println!("{outcome}"),
    }
    if let Some(result) = &report.result {
        println!("{}", result.dimmed());
    }
}

/// Renders result-sink HTML as terminal text: line breaks and list items become new
/// lines, other tags are dropped and the entities `escape_html` produces are decoded.
#[must_use]
pub fn plain_text(html: &str) -> String {
    let spaced = html
        .replace("<br />", "\n")
        .replace("<br>", "\n")
        .replace("<li>", "\n- ");

    let mut text = String::with_capacity(spaced.len());
    let mut in_tag = false;
    for c in spaced.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
