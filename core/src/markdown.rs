//! Markdown documentation rendering.

use crate::Schema;

/// Title used when [`MarkdownOptions`] is left at its default.
pub const DEFAULT_MARKDOWN_TITLE: &str = "Environment Variables";

const INTRO: &str = "This document describes the environment variables used by this application.";

/// Options for [`render_markdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Level-1 heading text.
    pub title: String,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_MARKDOWN_TITLE.to_string(),
        }
    }
}

/// Renders a schema as a Markdown reference document.
///
/// The document has a title, a fixed introduction, one table row per
/// variable in declaration order and, when any variable restricts its
/// values, an "Allowed Values" section. Output is deterministic.
///
/// # Examples
///
/// ```
/// use envguard_core::*;
///
/// let schema = Schema::new().with_variable(
///     "PORT",
///     VariableSpec::optional().with_default("3000").with_description("HTTP port"),
/// );
/// let doc = render_markdown(&schema, &MarkdownOptions::default());
///
/// assert!(doc.starts_with("# Environment Variables\n"));
/// assert!(doc.contains("| `PORT` | ❌ | `3000` | HTTP port |  |\n"));
/// ```
pub fn render_markdown(schema: &Schema, options: &MarkdownOptions) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", options.title));
    out.push_str(&format!("{INTRO}\n\n"));

    out.push_str("| Name | Required | Default | Description | Example |\n");
    out.push_str("|------|----------|---------|-------------|---------|\n");
    for (name, spec) in schema.iter() {
        let required = if spec.required { "✅" } else { "❌" };
        let default = spec
            .default
            .as_deref()
            .map(code)
            .unwrap_or_else(|| "—".to_string());
        let description = spec.description.as_deref().map(cell).unwrap_or_default();
        let example = spec.example.as_deref().map(code).unwrap_or_default();
        out.push_str(&format!(
            "| `{name}` | {required} | {default} | {description} | {example} |\n"
        ));
    }

    let mut restricted = schema.iter().filter(|(_, spec)| spec.has_allowed()).peekable();
    if restricted.peek().is_some() {
        out.push_str("\n## Allowed Values\n");
        for (name, spec) in restricted {
            out.push_str(&format!("\n### `{name}`\n\n"));
            for value in &spec.allowed {
                out.push_str(&format!("- {}\n", code(value)));
            }
        }
    }

    out
}

/// Escapes text for a single table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Wraps a value in a code span whose fence is longer than any backtick
/// run inside it.
fn code(value: &str) -> String {
    if value.is_empty() {
        return "`\"\"`".to_string();
    }

    let longest_run = value
        .split(|ch| ch != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    let text = cell(value);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}
