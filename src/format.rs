//! Output formatting utilities for markdown and JSON.

use crate::config::ResolvedValue;
use crate::profile::Profile;
use clap::ValueEnum;
use serde_json::{Value, json};

/// Output format for resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

/// Format resolved values as a markdown table.
pub fn format_values_markdown(
    name: &str,
    profile: Profile,
    values: &[&ResolvedValue],
    anonymous_args: &[String],
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {} ({})\n\n", name, profile));
    md.push_str(&format!("## Fields ({})\n\n", values.len()));
    md.push_str("| field | type | value | source |\n");
    md.push_str("|---|---|---|---|\n");

    for resolved in values {
        let value = resolved
            .value
            .as_ref()
            .map(|v| format!("`{}`", escape_cell(&v.to_string())))
            .unwrap_or_else(|| "_unset_".to_string());
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            resolved.field.name, resolved.field.value_type, value, resolved.specifier
        ));
    }

    if !anonymous_args.is_empty() {
        md.push_str("\n## Arguments\n\n");
        for arg in anonymous_args {
            md.push_str(&format!("- `{}`\n", arg));
        }
    }

    md
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Format resolved values as JSON.
pub fn format_values_json(
    name: &str,
    profile: Profile,
    values: &[&ResolvedValue],
    anonymous_args: &[String],
) -> Value {
    let fields: Vec<Value> = values
        .iter()
        .map(|resolved| {
            json!({
                "name": resolved.field.name,
                "type": resolved.field.value_type,
                "value": resolved.value,
                "specifier": resolved.specifier,
                "required": resolved.field.required,
            })
        })
        .collect();

    json!({
        "application": name,
        "profile": profile.as_str(),
        "fields": fields,
        "arguments": anonymous_args,
    })
}
