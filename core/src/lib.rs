//! Core schema types, validation, and rendering for envguard.
//!
//! This crate defines the schema for a program's environment variables and
//! everything derived from it:
//!
//! - [`VariableSpec`] — constraints and documentation for one variable
//!   (required, default, allowed values, description, example).
//! - [`Schema`] — ordered mapping from variable name to spec.
//! - [`EnvSnapshot`] — the environment being checked, injected by the
//!   caller rather than read from the process.
//!
//! Validation ([`validate`]) resolves each variable to its effective value
//! and reports missing or disallowed values. Rendering
//! ([`render_markdown`], [`render_env_example`]) turns the same schema into
//! documentation and an example `.env` file. Linting ([`lint_schema`])
//! catches specs that contradict themselves.
//!
//! Everything here is synchronous and pure: no operation touches the
//! filesystem or the process environment.
//!
//! # Example
//!
//! ```
//! use envguard_core::*;
//!
//! let schema = Schema::new()
//!     .with_variable(
//!         "DATABASE_URL",
//!         VariableSpec::required().with_description("Postgres connection string"),
//!     )
//!     .with_variable(
//!         "NODE_ENV",
//!         VariableSpec::optional()
//!             .with_default("development")
//!             .with_allowed(["development", "production", "test"]),
//!     );
//!
//! let snapshot = EnvSnapshot::new().with("DATABASE_URL", "postgres://localhost/app");
//! let outcome = validate(&schema, &snapshot, ValidateOptions::default()).unwrap();
//! assert_eq!(outcome.values.get("NODE_ENV"), Some("development"));
//!
//! let docs = render_markdown(&schema, &MarkdownOptions::default());
//! assert!(docs.contains("## Allowed Values"));
//!
//! let example = render_env_example(&schema, &EnvExampleOptions::default());
//! assert!(example.contains("NODE_ENV=development"));
//! ```

mod env_example;
mod lint;
mod markdown;
mod snapshot;
mod types;
mod validate;

pub use env_example::{EnvExampleOptions, render_env_example};
pub use lint::{SchemaIssue, lint_schema};
pub use markdown::{DEFAULT_MARKDOWN_TITLE, MarkdownOptions, render_markdown};
pub use snapshot::{DotenvError, EnvSnapshot};
pub use types::*;
pub use validate::{
    ResolvedValues, ValidateOptions, ValidationFailed, ValidationOutcome, Violation,
    ViolationKind, effective_value, format_violations, is_valid, validate,
};
