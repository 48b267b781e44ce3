//! Environment validation against a [`Schema`].
//!
//! Reconciles a schema with an [`EnvSnapshot`], resolving each variable to
//! its effective value (the provided value, else the declared default) and
//! collecting one [`Violation`] per variable that is missing or outside
//! its allowed list.
//!
//! # Examples
//!
//! ```
//! use envguard_core::*;
//!
//! let schema = Schema::new()
//!     .with_variable("DATABASE_URL", VariableSpec::required())
//!     .with_variable("PORT", VariableSpec::optional().with_default("3000"));
//!
//! let snapshot = EnvSnapshot::new().with("DATABASE_URL", "postgres://localhost/app");
//! let outcome = validate(&schema, &snapshot, ValidateOptions::default()).unwrap();
//! assert!(outcome.valid);
//! assert_eq!(outcome.values.get("PORT"), Some("3000"));
//!
//! // Missing required variable → error by default
//! let err = validate(&schema, &EnvSnapshot::new(), ValidateOptions::default()).unwrap_err();
//! assert_eq!(err.violations.len(), 1);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::{EnvSnapshot, Schema, VariableSpec};

/// Which check a variable failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required variable with no value and no default.
    Missing,
    /// Effective value is not in the allowed list.
    NotAllowed,
}

/// One variable's failed check.
///
/// `description` and `allowed` are copied from the [`VariableSpec`] for both
/// kinds so callers can render an "expected" hint uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Variable name.
    pub name: String,
    /// Which check failed.
    pub kind: ViolationKind,
    /// Human-readable message.
    pub message: String,
    /// Description copied from the [`VariableSpec`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values copied from the [`VariableSpec`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

impl Violation {
    fn missing(name: &str, spec: &VariableSpec) -> Self {
        Self {
            name: name.to_string(),
            kind: ViolationKind::Missing,
            message: format!("Missing environment variable: {name}"),
            description: spec.description.clone(),
            allowed: spec.allowed.clone(),
        }
    }

    fn not_allowed(name: &str, value: &str, spec: &VariableSpec) -> Self {
        Self {
            name: name.to_string(),
            kind: ViolationKind::NotAllowed,
            message: format!("Invalid value for {name}: \"{value}\""),
            description: spec.description.clone(),
            allowed: spec.allowed.clone(),
        }
    }
}

/// Effective value per schema variable, in schema order.
///
/// Serializes as a map from name to value (`null` when unresolved).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedValues {
    entries: IndexMap<String, Option<String>>,
}

impl ResolvedValues {
    /// Returns the resolved value for `name`.
    ///
    /// `None` both for unresolved variables and for names the schema does
    /// not declare; use [`contains`](Self::contains) to tell them apart.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|value| value.as_deref())
    }

    /// Returns `true` if `name` has an entry.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the resolved values, returning the owned map in schema
    /// order.
    pub fn into_inner(self) -> IndexMap<String, Option<String>> {
        self.entries
    }
}

/// Result of reconciling a schema against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// `true` when `violations` is empty.
    pub valid: bool,
    /// Failed checks in schema order.
    pub violations: Vec<Violation>,
    /// Effective value for every schema variable.
    pub values: ResolvedValues,
}

/// Options for [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Return [`ValidationFailed`] instead of an invalid outcome.
    pub throw_on_failure: bool,
}

impl ValidateOptions {
    /// Options that always return the outcome, valid or not.
    pub fn non_throwing() -> Self {
        Self {
            throw_on_failure: false,
        }
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            throw_on_failure: true,
        }
    }
}

/// Validation failed with one or more violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("environment validation failed with {} error(s)", violations.len())]
pub struct ValidationFailed {
    /// Every violation, in schema order.
    pub violations: Vec<Violation>,
}

/// Validates `snapshot` against `schema`.
///
/// For each variable, in schema order: a value is provided only when
/// present and non-empty; the effective value is the provided value, else
/// the declared default. A required variable with neither yields a
/// [`ViolationKind::Missing`] violation and skips the allowed-list check.
/// An effective value outside a non-empty allowed list yields a
/// [`ViolationKind::NotAllowed`] violation.
///
/// # Errors
///
/// Returns [`ValidationFailed`] when the outcome is invalid and
/// `options.throw_on_failure` is set. The formatted report is logged at
/// error level first.
///
/// # Examples
///
/// ```
/// use envguard_core::*;
///
/// let schema = Schema::new().with_variable(
///     "NODE_ENV",
///     VariableSpec::optional()
///         .with_default("development")
///         .with_allowed(["development", "production", "test"]),
/// );
///
/// let snapshot = EnvSnapshot::new().with("NODE_ENV", "staging");
/// let outcome = validate(&schema, &snapshot, ValidateOptions::non_throwing()).unwrap();
/// assert!(!outcome.valid);
/// assert_eq!(outcome.violations[0].message, "Invalid value for NODE_ENV: \"staging\"");
/// ```
pub fn validate(
    schema: &Schema,
    snapshot: &EnvSnapshot,
    options: ValidateOptions,
) -> Result<ValidationOutcome, ValidationFailed> {
    let mut violations = Vec::new();
    let mut values = IndexMap::with_capacity(schema.len());

    for (name, spec) in schema.iter() {
        let provided = snapshot.get(name).filter(|value| !value.is_empty());
        let effective = provided.or(spec.default.as_deref()).map(String::from);
        debug!(
            variable = name,
            provided = provided.is_some(),
            defaulted = provided.is_none() && effective.is_some(),
            "resolved"
        );

        if spec.required && provided.is_none() && spec.default.is_none() {
            violations.push(Violation::missing(name, spec));
        } else if let Some(value) = effective.as_deref() {
            if !spec.permits(value) {
                violations.push(Violation::not_allowed(name, value, spec));
            }
        }

        values.insert(name.to_string(), effective);
    }

    let valid = violations.is_empty();
    if !valid && options.throw_on_failure {
        error!(
            "environment validation failed:\n{}",
            format_violations(&violations)
        );
        return Err(ValidationFailed { violations });
    }

    Ok(ValidationOutcome {
        valid,
        violations,
        values: ResolvedValues { entries: values },
    })
}

/// Returns the effective value of `name`, without failing on violations.
///
/// # Examples
///
/// ```
/// use envguard_core::*;
///
/// let schema = Schema::new().with_variable("PORT", VariableSpec::optional().with_default("3000"));
/// let snapshot = EnvSnapshot::new().with("PORT", "");
/// assert_eq!(effective_value(&schema, "PORT", &snapshot).as_deref(), Some("3000"));
/// ```
pub fn effective_value(schema: &Schema, name: &str, snapshot: &EnvSnapshot) -> Option<String> {
    let outcome = validate(schema, snapshot, ValidateOptions::non_throwing()).ok()?;
    outcome.values.into_inner().swap_remove(name).flatten()
}

/// Returns `true` if `snapshot` satisfies `schema`.
pub fn is_valid(schema: &Schema, snapshot: &EnvSnapshot) -> bool {
    validate(schema, snapshot, ValidateOptions::non_throwing())
        .map(|outcome| outcome.valid)
        .unwrap_or(false)
}

/// Renders violations as indented, human-readable lines.
///
/// Each violation yields a `✗ message` line, followed by its description
/// and an `Expected one of:` hint when the spec has them.
pub fn format_violations(violations: &[Violation]) -> String {
    let mut out = String::new();
    for violation in violations {
        out.push_str(&format!("  ✗ {}\n", violation.message));
        if let Some(description) = &violation.description {
            out.push_str(&format!("    {description}\n"));
        }
        if !violation.allowed.is_empty() {
            out.push_str(&format!(
                "    Expected one of: {}\n",
                violation.allowed.join(", ")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn node_env_schema() -> Schema {
        Schema::new().with_variable(
            "NODE_ENV",
            VariableSpec::optional()
                .with_default("development")
                .with_allowed(["development", "production", "test"]),
        )
    }

    #[test]
    fn test_missing_required_variable() {
        let schema = Schema::new().with_variable("DATABASE_URL", VariableSpec::required());

        let outcome =
            validate(&schema, &EnvSnapshot::new(), ValidateOptions::non_throwing()).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::Missing);
        assert_eq!(
            outcome.violations[0].message,
            "Missing environment variable: DATABASE_URL"
        );
        assert!(outcome.values.contains("DATABASE_URL"));
        assert_eq!(outcome.values.get("DATABASE_URL"), None);
    }

    #[test]
    fn test_value_outside_allowed_list() {
        let snapshot = EnvSnapshot::new().with("NODE_ENV", "staging");
        let outcome =
            validate(&node_env_schema(), &snapshot, ValidateOptions::non_throwing()).unwrap();

        assert!(!outcome.valid);
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::NotAllowed);
        assert_eq!(
            outcome.violations[0].message,
            "Invalid value for NODE_ENV: \"staging\""
        );
        assert_eq!(
            outcome.violations[0].allowed,
            ["development", "production", "test"]
        );
        assert_eq!(outcome.values.get("NODE_ENV"), Some("staging"));
    }

    #[test]
    fn test_default_fills_unset_variable() {
        let outcome = validate(
            &node_env_schema(),
            &EnvSnapshot::new(),
            ValidateOptions::default(),
        )
        .unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.values.get("NODE_ENV"), Some("development"));
    }

    #[test]
    fn test_empty_string_counts_as_unset() {
        let schema =
            Schema::new().with_variable("PORT", VariableSpec::optional().with_default("3000"));
        let snapshot = EnvSnapshot::new().with("PORT", "");

        let outcome = validate(&schema, &snapshot, ValidateOptions::default()).unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.values.get("PORT"), Some("3000"));
    }

    #[test]
    fn test_empty_string_for_required_without_default_is_missing() {
        let schema = Schema::new().with_variable("API_KEY", VariableSpec::required());
        let snapshot = EnvSnapshot::new().with("API_KEY", "");

        let outcome = validate(&schema, &snapshot, ValidateOptions::non_throwing()).unwrap();
        assert_eq!(outcome.violations[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn test_required_with_default_is_satisfied() {
        let schema =
            Schema::new().with_variable("HOST", VariableSpec::required().with_default("0.0.0.0"));
        assert!(is_valid(&schema, &EnvSnapshot::new()));
    }

    #[test]
    fn test_missing_required_skips_allowed_check() {
        let schema = Schema::new().with_variable(
            "MODE",
            VariableSpec::required()
                .with_description("Run mode")
                .with_allowed(["a", "b"]),
        );
        let outcome =
            validate(&schema, &EnvSnapshot::new(), ValidateOptions::non_throwing()).unwrap();

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::Missing);
        assert_eq!(outcome.violations[0].description.as_deref(), Some("Run mode"));
        assert_eq!(outcome.violations[0].allowed, ["a", "b"]);
    }

    #[test]
    fn test_optional_without_value_skips_allowed_check() {
        let schema = Schema::new()
            .with_variable("LEVEL", VariableSpec::optional().with_allowed(["info", "debug"]));
        let outcome = validate(&schema, &EnvSnapshot::new(), ValidateOptions::default()).unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.values.get("LEVEL"), None);
    }

    #[test]
    fn test_default_outside_allowed_list_is_reported() {
        let schema = Schema::new().with_variable(
            "LEVEL",
            VariableSpec::optional()
                .with_default("trace")
                .with_allowed(["info", "debug"]),
        );
        assert!(!is_valid(&schema, &EnvSnapshot::new()));
    }

    #[test]
    fn test_throwing_mode_returns_all_violations() {
        let schema = Schema::new()
            .with_variable("A", VariableSpec::required())
            .with_variable("B", VariableSpec::optional())
            .with_variable("C", VariableSpec::optional().with_allowed(["x"]));
        let snapshot = EnvSnapshot::new().with("C", "y");

        let err = validate(&schema, &snapshot, ValidateOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "environment validation failed with 2 error(s)");
        let names: Vec<_> = err.violations.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn test_values_cover_every_schema_variable_in_order() {
        let schema = Schema::new()
            .with_variable("Z", VariableSpec::optional())
            .with_variable("Y", VariableSpec::optional().with_default("d"))
            .with_variable("X", VariableSpec::optional());
        let snapshot = EnvSnapshot::new().with("X", "set").with("UNRELATED", "1");

        let outcome = validate(&schema, &snapshot, ValidateOptions::default()).unwrap();
        let values: Vec<_> = outcome.values.iter().collect();
        assert_eq!(values, [("Z", None), ("Y", Some("d")), ("X", Some("set"))]);
        assert!(!outcome.values.contains("UNRELATED"));
    }

    #[test]
    fn test_effective_value_wrapper() {
        let snapshot = EnvSnapshot::new().with("NODE_ENV", "staging");
        assert_eq!(
            effective_value(&node_env_schema(), "NODE_ENV", &snapshot).as_deref(),
            Some("staging")
        );
        assert_eq!(
            effective_value(&node_env_schema(), "UNKNOWN", &snapshot),
            None
        );
    }

    #[test]
    fn test_format_violations_includes_hints() {
        let violations = vec![Violation::not_allowed(
            "NODE_ENV",
            "staging",
            &VariableSpec::optional()
                .with_description("Runtime mode")
                .with_allowed(["development", "production"]),
        )];

        assert_eq!(
            format_violations(&violations),
            "  ✗ Invalid value for NODE_ENV: \"staging\"\n    Runtime mode\n    Expected one of: development, production\n"
        );
    }

    #[derive(Clone)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_debug_log_omits_resolved_values() {
        let buffer = LogBuffer(Arc::new(Mutex::new(Vec::new())));
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        let schema = Schema::new()
            .with_variable("API_KEY", VariableSpec::required())
            .with_variable("PORT", VariableSpec::optional().with_default("8123"));
        let snapshot = EnvSnapshot::new().with("API_KEY", "s3cr3t-token");
        tracing::subscriber::with_default(subscriber, || {
            validate(&schema, &snapshot, ValidateOptions::default()).unwrap();
        });

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("API_KEY"));
        assert!(logs.contains("defaulted=true"));
        assert!(!logs.contains("s3cr3t-token"));
        assert!(!logs.contains("8123"));
    }

    #[test]
    fn test_outcome_serializes_values_as_map() {
        let outcome = validate(
            &node_env_schema(),
            &EnvSnapshot::new(),
            ValidateOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["values"]["NODE_ENV"], "development");
    }
}
