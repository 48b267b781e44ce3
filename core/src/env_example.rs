//! `.env.example` rendering.

use crate::{Schema, VariableSpec};

const HEADER: [&str; 2] = ["# Environment Variables", "# Generated by envguard"];

/// Options for [`render_env_example`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvExampleOptions {
    /// Emit description, `[REQUIRED]` and allowed-value comments.
    pub include_comments: bool,
    /// Split variables into a Required section followed by an Optional one.
    pub group_by_required: bool,
}

impl Default for EnvExampleOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            group_by_required: false,
        }
    }
}

/// Renders a schema as an example environment file.
///
/// Each variable becomes a `NAME=value` line, where the value is the spec
/// default or empty, optionally preceded by comment lines. Records are
/// separated by one blank line. With `group_by_required`, required
/// variables come first under `# Required`, then the rest under
/// `# Optional`, each keeping declaration order. Empty sections are
/// omitted.
///
/// Defaults containing whitespace, `#`, `$`, backslashes or quotes are
/// quoted so the file parses back to the same values with
/// [`EnvSnapshot::parse_dotenv`](crate::EnvSnapshot::parse_dotenv).
///
/// # Examples
///
/// ```
/// use envguard_core::*;
///
/// let schema = Schema::new()
///     .with_variable("DATABASE_URL", VariableSpec::required().with_description("Postgres URL"))
///     .with_variable("PORT", VariableSpec::optional().with_default("3000"));
///
/// let text = render_env_example(&schema, &EnvExampleOptions::default());
/// assert_eq!(
///     text,
///     "# Environment Variables\n# Generated by envguard\n\n# Postgres URL\n# [REQUIRED]\nDATABASE_URL=\n\nPORT=3000\n"
/// );
/// ```
pub fn render_env_example(schema: &Schema, options: &EnvExampleOptions) -> String {
    let mut blocks: Vec<String> = vec![HEADER.join("\n")];

    if options.group_by_required {
        let (required, optional): (Vec<_>, Vec<_>) =
            schema.iter().partition(|(_, spec)| spec.required);
        for (title, section) in [("# Required", required), ("# Optional", optional)] {
            for (index, (name, spec)) in section.into_iter().enumerate() {
                let record = render_record(name, spec, options);
                if index == 0 {
                    blocks.push(format!("{title}\n\n{record}"));
                } else {
                    blocks.push(record);
                }
            }
        }
    } else {
        for (name, spec) in schema.iter() {
            blocks.push(render_record(name, spec, options));
        }
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn render_record(name: &str, spec: &VariableSpec, options: &EnvExampleOptions) -> String {
    let mut lines = Vec::new();

    if options.include_comments {
        if let Some(description) = &spec.description {
            for line in description.lines() {
                lines.push(format!("# {line}"));
            }
        }
        if spec.required {
            lines.push("# [REQUIRED]".to_string());
        }
        if spec.has_allowed() {
            lines.push(format!("# Allowed values: {}", spec.allowed.join(", ")));
        }
    }

    let value = spec.default.as_deref().map(quote_value).unwrap_or_default();
    lines.push(format!("{name}={value}"));
    lines.join("\n")
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '#' | '"' | '\'' | '\\' | '$'));
    if !needs_quotes {
        return value.to_string();
    }

    // Single quotes are literal: no escapes and no `$` substitution.
    if !value.contains(['\'', '\n']) {
        return format!("'{value}'");
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\\' | '$' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
