//! Schema type definitions for environment variable modeling.
//!
//! This module defines the data model shared by the validator and both
//! renderers. The types are designed for serialization with [`serde`] and
//! keep declaration order through JSON, YAML, and back.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constraints and documentation for one environment variable.
///
/// A spec is plain data: it carries no validation state and is never
/// mutated by validation or rendering. Build one with
/// [`required`](VariableSpec::required) or [`optional`](VariableSpec::optional)
/// and chain the `with_*` methods.
///
/// # Examples
///
/// ```
/// use envguard_core::VariableSpec;
///
/// let spec = VariableSpec::optional()
///     .with_description("Runtime mode")
///     .with_default("development")
///     .with_allowed(["development", "production", "test"]);
///
/// assert!(!spec.required);
/// assert!(spec.permits("test"));
/// assert!(!spec.permits("staging"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariableSpec {
    /// Whether the variable must resolve to a value.
    pub required: bool,
    /// Human-readable explanation of what the variable controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sample value shown in generated documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Value used when the environment does not provide one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Permitted values (empty = any value).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

impl VariableSpec {
    /// Creates a spec for a variable that must resolve to a value.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Creates a spec for a variable that may be left unset.
    pub fn optional() -> Self {
        Self::default()
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an example value.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Adds a default value.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restricts the variable to a fixed set of values.
    pub fn with_allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the variable is restricted to an allowed list.
    pub fn has_allowed(&self) -> bool {
        !self.allowed.is_empty()
    }

    /// Returns `true` if `value` satisfies the allowed list.
    ///
    /// Every value is permitted when no allowed list is declared.
    pub fn permits(&self, value: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|allowed| allowed == value)
    }
}

/// Errors raised while assembling a [`Schema`] from entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The same variable name was declared twice.
    #[error("duplicate environment variable `{0}`")]
    DuplicateName(String),
}

/// Ordered mapping from environment variable name to its [`VariableSpec`].
///
/// Declaration order is significant: the documentation table and the
/// example file list variables in the order they were declared. Equality
/// compares names and specs without regard to order.
///
/// # Examples
///
/// ```
/// use envguard_core::{Schema, VariableSpec};
///
/// let schema = Schema::new()
///     .with_variable("DATABASE_URL", VariableSpec::required())
///     .with_variable("PORT", VariableSpec::optional().with_default("3000"));
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.names().collect::<Vec<_>>(), ["DATABASE_URL", "PORT"]);
/// assert_eq!(schema.get("PORT").unwrap().default.as_deref(), Some("3000"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    entries: IndexMap<String, VariableSpec>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from `(name, spec)` pairs in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateName`] if a name appears twice.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, VariableSpec)>,
        S: Into<String>,
    {
        let mut schema = Self::new();
        for (name, spec) in entries {
            schema.insert_new(name.into(), spec)?;
        }
        Ok(schema)
    }

    /// Adds a variable, or replaces the spec of an existing one in place.
    pub fn with_variable(mut self, name: impl Into<String>, spec: VariableSpec) -> Self {
        self.entries.insert(name.into(), spec);
        self
    }

    /// Looks up the spec for `name`.
    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.entries.get(name)
    }

    /// Returns `true` if the schema declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over `(name, spec)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Iterates over variable names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of declared variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no variables are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_new(&mut self, name: String, spec: VariableSpec) -> Result<(), SchemaError> {
        match self.entries.entry(name) {
            Entry::Occupied(entry) => Err(SchemaError::DuplicateName(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(spec);
                Ok(())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SchemaVisitor)
    }
}

struct SchemaVisitor;

impl<'de> Visitor<'de> for SchemaVisitor {
    type Value = Schema;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of environment variable names to variable specs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Schema, A::Error> {
        let mut schema = Schema {
            entries: IndexMap::with_capacity(map.size_hint().unwrap_or(0)),
        };
        while let Some((name, spec)) = map.next_entry::<String, VariableSpec>()? {
            schema.insert_new(name, spec).map_err(de::Error::custom)?;
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_preserves_declaration_order() {
        let raw = r#"{
            "ZETA": { "required": true },
            "ALPHA": { "default": "a" },
            "MIDDLE": { "allowed": ["x", "y"] }
        }"#;

        let schema: Schema = serde_json::from_str(raw).unwrap();
        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            ["ZETA", "ALPHA", "MIDDLE"]
        );
        assert!(schema.get("ZETA").unwrap().required);
        assert_eq!(schema.get("MIDDLE").unwrap().allowed, ["x", "y"]);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_names() {
        let raw = r#"{ "PORT": {}, "PORT": { "default": "1" } }"#;
        let err = serde_json::from_str::<Schema>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate environment variable `PORT`"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_spec_fields() {
        let raw = r#"{ "PORT": { "requird": true } }"#;
        assert!(serde_json::from_str::<Schema>(raw).is_err());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let schema = Schema::new()
            .with_variable("PORT", VariableSpec::optional().with_default("3000"));
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"{"PORT":{"required":false,"default":"3000"}}"#);
    }

    #[test]
    fn test_with_variable_replaces_in_place() {
        let schema = Schema::new()
            .with_variable("A", VariableSpec::optional())
            .with_variable("B", VariableSpec::optional())
            .with_variable("A", VariableSpec::required());

        assert_eq!(schema.names().collect::<Vec<_>>(), ["A", "B"]);
        assert!(schema.get("A").unwrap().required);
    }

    #[test]
    fn test_from_entries_rejects_duplicates() {
        let err = Schema::from_entries([
            ("A", VariableSpec::optional()),
            ("A", VariableSpec::required()),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName("A".to_string()));
    }

    #[test]
    fn test_equality_ignores_declaration_order() {
        let forward = Schema::new()
            .with_variable("A", VariableSpec::optional())
            .with_variable("B", VariableSpec::required());
        let reversed = Schema::new()
            .with_variable("B", VariableSpec::required())
            .with_variable("A", VariableSpec::optional());

        assert_eq!(forward, reversed);
        assert_ne!(
            forward.names().collect::<Vec<_>>(),
            reversed.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_permits_without_allowed_list() {
        let spec = VariableSpec::optional();
        assert!(!spec.has_allowed());
        assert!(spec.permits("anything"));
    }
}
