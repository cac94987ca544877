//! Output formatting utilities for markdown and JSON.

use crate::config::{ConfigurationNode, TierSet};
use crate::forms::FormDefinition;
use crate::renderers::ViewRendererDefinition;
use crate::workflow::StatusSet;
use serde::Serialize;
use serde_json::Value;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Pretty JSON for any serialisable value.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Format a JSON value as markdown: scalars inline, containers fenced.
pub fn format_value_markdown(path: &str, value: &Value) -> String {
    match value {
        Value::String(s) => format!("- **{}**: `{}`\n", path, s),
        Value::Object(_) | Value::Array(_) => {
            format!("## {}\n\n```json\n{}\n```\n", path, to_json(value))
        }
        other => format!("- **{}**: {}\n", path, other),
    }
}

/// Format the composed tiers as markdown.
pub fn format_tiers_markdown(tiers: &TierSet) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Tiers ({})\n\n", tiers.len()));
    for node in tiers.iter() {
        md.push_str(&format_tier_short(node));
    }

    md
}

fn format_tier_short(node: &ConfigurationNode) -> String {
    let others = if node.others.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = node.others.keys().map(|s| s.as_str()).collect();
        format!(" (inherits {})", names.join(", "))
    };
    format!(
        "- **{}** `{}`: {} apis, {} assets{}\n",
        node.tier,
        node.id,
        count_leaves(&node.apis().to_value()),
        count_leaves(&node.assets().to_value()),
        others,
    )
}

fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(count_leaves).sum(),
        _ => 1,
    }
}

/// Format renderers as markdown.
pub fn format_renderers_markdown(renderers: &[ViewRendererDefinition]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Renderers ({})\n\n", renderers.len()));

    for renderer in renderers {
        let actions: Vec<&str> = renderer.supported_actions.iter().map(|a| a.as_str()).collect();
        let default = if renderer.is_default { " (default)" } else { "" };
        let unavailable = if renderer.available { "" } else { " [unavailable]" };
        md.push_str(&format!(
            "- **{}**{}{} `{}`: {}\n",
            renderer.name,
            default,
            unavailable,
            renderer.id,
            actions.join(", ")
        ));
    }

    md
}

/// Format the status set as markdown, in declaration order.
pub fn format_statuses_markdown(statuses: &StatusSet) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Statuses ({})\n\n", statuses.statuses.len()));

    for status in &statuses.statuses {
        md.push_str(&format!("## {}\n", status.name));
        md.push_str(&format!("- **id**: `{}`\n", status.id));
        if status.is_initial {
            md.push_str("- **initial**\n");
        }
        if status.is_final {
            md.push_str("- **final**\n");
        }
        if !status.allowed_transition_ids.is_empty() {
            let exits: Vec<String> = status
                .allowed_transition_ids
                .iter()
                .map(|id| format!("`{}`", id))
                .collect();
            md.push_str(&format!("- **exits**: {}\n", exits.join(", ")));
        }
        if let Some(ref desc) = status.description {
            md.push_str(&format!("- {}\n", desc));
        }
        md.push('\n');
    }

    md
}

/// Format a form definition as markdown.
pub fn format_form_markdown(form: &FormDefinition) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n", form.title.as_deref().unwrap_or(&form.id)));
    md.push_str(&format!("- **id**: `{}`\n", form.id));
    md.push_str(&format!("- **mode**: {}\n", form.mode));
    if let Some(ref desc) = form.description {
        md.push_str(&format!("\n{}\n", desc));
    }

    md.push_str(&format!("\n## Fields ({})\n\n", form.fields.len()));
    for field in &form.fields {
        let required = if field.required { " *" } else { "" };
        md.push_str(&format!(
            "- `{}` {}{}: {}\n",
            field.key,
            field.field_type,
            required,
            field.label
        ));
    }

    md
}
