//! Schema loading with pluggable sources and file discovery.
//!
//! A [`SchemaSource`] produces a [`Schema`] or a typed [`SourceError`]; the
//! validator and renderers never see how it was produced. Files are read by
//! [`FileSource`] in JSON or YAML, picked by extension.
//!
//! # Loading patterns
//!
//! ```no_run
//! use envguard_source::{FileSource, LintPolicy, SchemaLocator, SchemaSource, load_schema};
//!
//! // Load a specific file
//! let schema = FileSource::new("config/env.schema.yaml").load().unwrap();
//!
//! // Search the working directory for a default schema file name
//! let loaded = load_schema(&SchemaLocator::new("."), LintPolicy::Permissive).unwrap();
//! println!("{} variables from {}", loaded.schema.len(), loaded.path.display());
//! ```

use std::path::{Path, PathBuf};

use envguard_core::{Schema, SchemaIssue, lint_schema};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, SourceError};

/// File names searched, in priority order, when no schema path is given.
pub const DEFAULT_SCHEMA_FILES: &[&str] = &[
    "env.schema.json",
    "env.schema.yaml",
    "env.schema.yml",
    "envguard.schema.json",
    "envguard.schema.yaml",
    "envguard.schema.yml",
];

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Picks a format from a file extension (`.json`, `.yaml`, `.yml`).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use envguard_source::SchemaFormat;
    ///
    /// assert_eq!(SchemaFormat::from_path(Path::new("env.schema.YML")), Some(SchemaFormat::Yaml));
    /// assert_eq!(SchemaFormat::from_path(Path::new("env.schema.js")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Parses `text` as a schema document.
    ///
    /// The document root must be a map of variable names to specs. Syntax
    /// errors surface as [`SourceError::Json`] / [`SourceError::Yaml`];
    /// well-formed documents of the wrong shape surface as
    /// [`SourceError::Invalid`]. `origin` names the document in errors.
    pub fn parse(self, text: &str, origin: &str) -> Result<Schema> {
        match self {
            Self::Json => parse_json(text, origin),
            Self::Yaml => parse_yaml(text, origin),
        }
    }
}

fn parse_json(text: &str, origin: &str) -> Result<Schema> {
    serde_json::from_str(text).map_err(|source| match source.classify() {
        serde_json::error::Category::Data => SourceError::Invalid {
            origin: origin.to_string(),
            reason: source.to_string(),
        },
        _ => SourceError::Json {
            origin: origin.to_string(),
            source,
        },
    })
}

fn parse_yaml(text: &str, origin: &str) -> Result<Schema> {
    let mut document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|source| SourceError::Yaml {
            origin: origin.to_string(),
            source,
        })?;
    if document.is_null() {
        return Err(SourceError::Invalid {
            origin: origin.to_string(),
            reason: "schema document is empty".to_string(),
        });
    }
    stringify_scalars(&mut document);
    Schema::deserialize(document).map_err(|err| SourceError::Invalid {
        origin: origin.to_string(),
        reason: err.to_string(),
    })
}

/// Turns unquoted YAML numbers and booleans in `default`, `example` and
/// `allowed` into strings, so `default: 3000` reads as `"3000"`.
fn stringify_scalars(document: &mut serde_yaml::Value) {
    let Some(variables) = document.as_mapping_mut() else {
        return;
    };
    for spec in variables.values_mut() {
        let Some(spec) = spec.as_mapping_mut() else {
            continue;
        };
        for key in ["default", "example"] {
            if let Some(value) = spec.get_mut(key) {
                stringify_scalar(value);
            }
        }
        let allowed = spec.get_mut("allowed").and_then(|value| value.as_sequence_mut());
        if let Some(allowed) = allowed {
            allowed.iter_mut().for_each(stringify_scalar);
        }
    }
}

fn stringify_scalar(value: &mut serde_yaml::Value) {
    let text = match value {
        serde_yaml::Value::Number(number) => number.to_string(),
        serde_yaml::Value::Bool(flag) => flag.to_string(),
        _ => return,
    };
    *value = serde_yaml::Value::String(text);
}

/// Anything that can produce a [`Schema`].
pub trait SchemaSource {
    /// Short human-readable name used in logs and errors.
    fn describe(&self) -> String;

    /// Produces the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the schema cannot be read or is not a
    /// valid schema.
    fn load(&self) -> Result<Schema>;
}

/// A schema stored in a JSON or YAML file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: Option<SchemaFormat>,
}

impl FileSource {
    /// Reads `path`, choosing the format from its extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Reads `path` in an explicit format, ignoring its extension.
    pub fn with_format(path: impl Into<PathBuf>, format: SchemaFormat) -> Self {
        Self {
            path: path.into(),
            format: Some(format),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Schema> {
        let format = self
            .format
            .or_else(|| SchemaFormat::from_path(&self.path))
            .ok_or_else(|| SourceError::UnsupportedFormat(self.path.clone()))?;
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), ?format, "loading schema file");
        format.parse(&text, &self.describe())
    }
}

/// A schema document held in memory.
///
/// # Examples
///
/// ```
/// use envguard_source::{SchemaFormat, SchemaSource, TextSource};
///
/// let source = TextSource::new("PORT:\n  default: \"3000\"\n", SchemaFormat::Yaml);
/// let schema = source.load().unwrap();
/// assert_eq!(schema.get("PORT").unwrap().default.as_deref(), Some("3000"));
/// ```
#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
    format: SchemaFormat,
    name: String,
}

impl TextSource {
    /// Wraps `text` in the given format.
    pub fn new(text: impl Into<String>, format: SchemaFormat) -> Self {
        Self {
            text: text.into(),
            format,
            name: "<inline>".to_string(),
        }
    }

    /// Sets the name reported in errors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl SchemaSource for TextSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Schema> {
        self.format.parse(&self.text, &self.name)
    }
}

impl SchemaSource for Schema {
    fn describe(&self) -> String {
        "<in-memory schema>".to_string()
    }

    fn load(&self) -> Result<Schema> {
        Ok(self.clone())
    }
}

/// Finds the schema file for a working directory.
///
/// An explicit path, if set, is the only location tried (relative paths
/// resolve against the working directory). Otherwise each candidate file
/// name is tried in order, defaulting to [`DEFAULT_SCHEMA_FILES`].
///
/// # Examples
///
/// ```no_run
/// use envguard_source::SchemaLocator;
///
/// let path = SchemaLocator::new("/srv/app")
///     .with_explicit("config/env.schema.yaml")
///     .locate()
///     .unwrap();
/// assert!(path.ends_with("config/env.schema.yaml"));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaLocator {
    cwd: PathBuf,
    explicit: Option<PathBuf>,
    candidates: Vec<String>,
}

impl SchemaLocator {
    /// Creates a locator searching `cwd` for the default file names.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            explicit: None,
            candidates: DEFAULT_SCHEMA_FILES.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Uses `path` instead of searching.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Replaces the candidate file names.
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Returns the candidate file names, in search order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Resolves the schema path.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] listing every name tried.
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(explicit) = &self.explicit {
            let path = self.cwd.join(explicit);
            if path.is_file() {
                return Ok(path);
            }
            return Err(SourceError::NotFound {
                dir: self.cwd.clone(),
                searched: vec![explicit.display().to_string()],
            });
        }

        for candidate in &self.candidates {
            let path = self.cwd.join(candidate);
            debug!(path = %path.display(), "checking for schema file");
            if path.is_file() {
                return Ok(path);
            }
        }

        Err(SourceError::NotFound {
            dir: self.cwd.clone(),
            searched: self.candidates.clone(),
        })
    }
}

/// How lint issues are treated while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LintPolicy {
    /// Log non-fatal issues as warnings and keep the schema.
    #[default]
    Permissive,
    /// Reject the schema on any issue.
    Strict,
}

/// A schema together with where it came from and what lint found.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// Resolved schema file path.
    pub path: PathBuf,
    /// The loaded schema.
    pub schema: Schema,
    /// Non-fatal lint issues that were tolerated.
    pub issues: Vec<SchemaIssue>,
}

/// Loads a schema from `source` and lints it under `policy`.
///
/// Fatal issues always reject the schema; other issues reject it only
/// under [`LintPolicy::Strict`] and are otherwise logged and returned.
///
/// # Errors
///
/// Returns the source's own error, or [`SourceError::Invalid`] listing the
/// rejected issues.
pub fn load_linted<S>(source: &S, policy: LintPolicy) -> Result<(Schema, Vec<SchemaIssue>)>
where
    S: SchemaSource + ?Sized,
{
    let schema = source.load()?;
    let issues = lint_schema(&schema);

    let rejected: Vec<&SchemaIssue> = issues
        .iter()
        .filter(|issue| issue.is_fatal() || policy == LintPolicy::Strict)
        .collect();
    if !rejected.is_empty() {
        let reason = rejected
            .iter()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SourceError::Invalid {
            origin: source.describe(),
            reason,
        });
    }

    for issue in &issues {
        warn!(source = %source.describe(), "{issue}");
    }
    debug!(source = %source.describe(), variables = schema.len(), "schema loaded");
    Ok((schema, issues))
}

/// Locates, loads and lints a schema file.
///
/// # Errors
///
/// Returns [`SourceError::NotFound`] if no file is found, a load error if
/// it cannot be read or parsed, or [`SourceError::Invalid`] if it is
/// rejected by lint.
pub fn load_schema(locator: &SchemaLocator, policy: LintPolicy) -> Result<LoadedSchema> {
    let path = locator.locate()?;
    let (schema, issues) = load_linted(&FileSource::new(&path), policy)?;
    Ok(LoadedSchema {
        path,
        schema,
        issues,
    })
}
