//! Schema commands - inspect schemas served by name.

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use serde_json::Value;

use jsonform_core::{FormItem, FormSchema};

use crate::client::ApiClient;
use crate::{Config, OutputFormat};

/// Arguments for the schema command.
#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Schema name, as registered on the server.
    #[arg()]
    pub name: String,
}

/// One row per form item, nested items flattened.
#[derive(Debug, Clone, PartialEq, Eq, tabled::Tabled)]
pub struct LayoutRow {
    /// Item key; sections have none.
    #[tabled(rename = "Key")]
    pub key: String,
    /// Form item type; empty for the default widget.
    #[tabled(rename = "Type")]
    pub form_type: String,
    /// Property title.
    #[tabled(rename = "Title")]
    pub title: String,
    /// Whether the property is flagged required.
    #[tabled(rename = "Required")]
    pub required: bool,
}

/// Execute the schema command.
///
/// # Errors
///
/// Returns an error if the schema cannot be fetched.
pub async fn execute(args: SchemaArgs, config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    let schema = client.schema(&args.name).await?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
        OutputFormat::Text => {
            let title = schema.title().unwrap_or(&args.name).to_string();
            println!("{}", title.bold());
            for row in layout_rows(&schema) {
                let marker = if row.required {
                    " *".red().to_string()
                } else {
                    String::new()
                };
                let kind = if row.form_type.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", row.form_type).dimmed().to_string()
                };
                println!("  {}{kind}  {}{marker}", row.key, row.title);
            }
        }
        OutputFormat::Table => println!("{}", tabled::Table::new(layout_rows(&schema))),
    }

    Ok(())
}

/// Execute the schemas command.
///
/// # Errors
///
/// Returns an error if the list cannot be fetched.
pub async fn execute_list(config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    let list = client.schemas().await?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Text | OutputFormat::Table => {
            if list.names.is_empty() {
                println!("No schemas registered");
            }
            for name in &list.names {
                println!("{name}  {}", config.url(&jsonform_core::params::schema_url_for(name)).dimmed());
            }
        }
    }

    Ok(())
}

/// Flattens the layout of `schema` into rows, depth first.
#[must_use]
pub fn layout_rows(schema: &FormSchema) -> Vec<LayoutRow> {
    let mut rows = Vec::new();
    collect_rows(&schema.form, &schema.schema, &mut rows);
    rows
}

fn collect_rows(items: &[FormItem], schema: &Value, rows: &mut Vec<LayoutRow>) {
    for item in items {
        let property = property_for(schema, &item.key);
        let title = if item.title.is_empty() {
            property
                .and_then(|p| p.get("title"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            item.title.clone()
        };
        rows.push(LayoutRow {
            key: item.key.clone(),
            form_type: item.form_type.clone(),
            title,
            required: property.is_some_and(|p| p.get("required") == Some(&Value::Bool(true))),
        });
        collect_rows(&item.items, schema, rows);
    }
}

/// Resolves a layout key (`user.firstName`, `neighbors[].bio`) to its property schema.
fn property_for<'a>(schema: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = schema;
    for part in key.split('.') {
        let (name, is_array) = match part.strip_suffix("[]") {
            Some(name) => (name, true),
            None => (part, false),
        };
        current = current.get("properties")?.get(name)?;
        if is_array {
            current = current.get("items")?;
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FormSchema {
        serde_json::from_value(json!({
            "schema": {
                "title": "Street",
                "type": "object",
                "properties": {
                    "name": {"type": "string", "title": "Name", "required": true},
                    "neighbors": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {"bio": {"type": "string", "title": "Bio"}}
                        }
                    }
                }
            },
            "form": [
                {"key": "name"},
                {"key": "neighbors", "type": "array", "items": [
                    {"type": "section", "items": [{"key": "neighbors[].bio", "type": "textarea"}]}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_layout_rows_flatten_nested_items() {
        let rows = layout_rows(&schema());
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["name", "neighbors", "", "neighbors[].bio"]);

        assert!(rows[0].required);
        assert_eq!(rows[0].title, "Name");
        assert_eq!(rows[2].form_type, "section");
        assert_eq!(rows[3].title, "Bio");
        assert_eq!(rows[3].form_type, "textarea");
    }

    #[test]
    fn test_schema_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: SchemaArgs,
        }

        let cli = TestCli::parse_from(["test", "user"]);
        assert_eq!(cli.args.name, "user");
    }
}
