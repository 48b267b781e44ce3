//! Schema self-consistency checks.
//!
//! The validator and renderers accept any [`Schema`] as-is. Loaders run
//! [`lint_schema`] to catch specs that contradict themselves, such as a
//! default that is not in its own allowed list, before they reach users.
//!
//! # Examples
//!
//! ```
//! use envguard_core::*;
//!
//! let schema = Schema::new().with_variable(
//!     "LOG_LEVEL",
//!     VariableSpec::optional().with_default("verbose").with_allowed(["info", "debug"]),
//! );
//!
//! let issues = lint_schema(&schema);
//! assert!(matches!(issues[0], SchemaIssue::DefaultNotAllowed { .. }));
//! assert!(!issues[0].is_fatal());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::Schema;

/// A self-inconsistency found in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaIssue {
    /// Variable name is empty or whitespace-only.
    #[error("environment variable name cannot be empty")]
    EmptyName,
    /// An allowed-list entry is the empty string.
    #[error("{name}: allowed values cannot contain an empty string")]
    EmptyAllowedValue { name: String },
    /// An allowed-list entry appears more than once.
    #[error("{name}: allowed value \"{value}\" is listed more than once")]
    DuplicateAllowedValue { name: String, value: String },
    /// The default is not one of the allowed values.
    #[error("{name}: default \"{default}\" is not one of the allowed values")]
    DefaultNotAllowed { name: String, default: String },
}

impl SchemaIssue {
    /// Returns `true` if the schema is unusable with this issue.
    ///
    /// Only an empty name is fatal; the rest describe schemas that still
    /// validate and render, just not the way their author meant.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SchemaIssue::EmptyName)
    }
}

/// Checks a schema for self-inconsistent specs.
///
/// Issues are reported in schema order. An empty schema has no issues.
pub fn lint_schema(schema: &Schema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    for (name, spec) in schema.iter() {
        if name.trim().is_empty() {
            issues.push(SchemaIssue::EmptyName);
            continue;
        }

        let mut seen = HashSet::new();
        for value in &spec.allowed {
            if value.is_empty() {
                issues.push(SchemaIssue::EmptyAllowedValue {
                    name: name.to_string(),
                });
            } else if !seen.insert(value.as_str()) {
                issues.push(SchemaIssue::DuplicateAllowedValue {
                    name: name.to_string(),
                    value: value.clone(),
                });
            }
        }

        if let Some(default) = &spec.default {
            if !spec.permits(default) {
                issues.push(SchemaIssue::DefaultNotAllowed {
                    name: name.to_string(),
                    default: default.clone(),
                });
            }
        }
    }

    issues
}
