//! Schema discovery, loading and project configuration for envguard.
//!
//! This crate sits between the filesystem and `envguard-core`: it finds a
//! schema file, parses it from JSON or YAML into a [`Schema`], lints it,
//! and reads the optional project configuration file.
//!
//! # Quick start
//!
//! ```no_run
//! use envguard_source::{LintPolicy, ProjectConfig, SchemaLocator, load_schema};
//!
//! let config = ProjectConfig::discover(".").unwrap().unwrap_or_default();
//!
//! let mut locator = SchemaLocator::new(".");
//! if let Some(path) = &config.schema {
//!     locator = locator.with_explicit(path);
//! }
//! let loaded = load_schema(&locator, LintPolicy::Permissive).unwrap();
//! println!("{} variables", loaded.schema.len());
//! ```
//!
//! # Schema documents
//!
//! The document root maps variable names to specs, in declaration order:
//!
//! ```yaml
//! DATABASE_URL:
//!   required: true
//!   description: Postgres connection string
//!   example: postgres://localhost:5432/app
//! NODE_ENV:
//!   default: development
//!   allowed: [development, production, test]
//! ```
//!
//! [`Schema`]: envguard_core::Schema

mod config;
mod error;
mod loader;

pub use config::{
    DEFAULT_DOCS_OUTPUT, DEFAULT_EXAMPLE_OUTPUT, DocsConfig, ExampleConfig, PROJECT_CONFIG_FILE,
    ProjectConfig,
};
pub use error::{Result, SourceError};
pub use loader::{
    DEFAULT_SCHEMA_FILES, FileSource, LintPolicy, LoadedSchema, SchemaFormat, SchemaLocator,
    SchemaSource, TextSource, load_linted, load_schema,
};
