//! Project configuration for envguard runs.
//!
//! Defines the optional YAML file that sets per-project defaults for the
//! schema location and generated artifacts. Command-line flags override
//! anything set here.
//!
//! # Example YAML
//!
//! ```yaml
//! schema: config/env.schema.yaml
//! strict: true
//! docs:
//!   output: docs/ENVIRONMENT.md
//!   title: Service Configuration
//! example:
//!   output: .env.example
//!   include_comments: true
//!   group_by_required: true
//! ```

use std::path::{Path, PathBuf};

use envguard_core::{EnvExampleOptions, MarkdownOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SourceError};

/// File name looked up in the working directory by [`ProjectConfig::discover`].
pub const PROJECT_CONFIG_FILE: &str = ".envguard.yml";

/// Default documentation output file name.
pub const DEFAULT_DOCS_OUTPUT: &str = "ENVIRONMENT.md";

/// Default example file output name.
pub const DEFAULT_EXAMPLE_OUTPUT: &str = ".env.example";

/// Settings for the generated Markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Output path, relative to the working directory.
    pub output: Option<PathBuf>,
    /// Document title.
    pub title: Option<String>,
}

/// Settings for the generated example environment file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExampleConfig {
    /// Output path, relative to the working directory.
    pub output: Option<PathBuf>,
    /// Emit comment lines for each variable.
    pub include_comments: Option<bool>,
    /// Split variables into Required and Optional sections.
    pub group_by_required: Option<bool>,
}

/// Top-level project configuration.
///
/// Every field is optional; an absent file behaves like
/// `ProjectConfig::default()`.
///
/// # Examples
///
/// ```
/// use envguard_source::ProjectConfig;
///
/// let config: ProjectConfig = serde_yaml::from_str("docs:\n  title: Service Configuration\n").unwrap();
/// assert_eq!(config.markdown_options().title, "Service Configuration");
/// assert!(config.env_example_options().include_comments);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Schema file path, relative to the working directory.
    pub schema: Option<PathBuf>,
    /// Reject schemas with any lint issue.
    pub strict: bool,
    /// Markdown document settings.
    pub docs: DocsConfig,
    /// Example file settings.
    pub example: ExampleConfig,
}

impl ProjectConfig {
    /// Loads configuration from a YAML file.
    ///
    /// An empty file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read, or
    /// [`SourceError::Config`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| SourceError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads [`PROJECT_CONFIG_FILE`] from `cwd` if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), for a file that exists.
    pub fn discover(cwd: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = cwd.as_ref().join(PROJECT_CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        debug!(path = %path.display(), "loading project config");
        Self::load(&path).map(Some)
    }

    /// Markdown options with configured values over built-in defaults.
    pub fn markdown_options(&self) -> MarkdownOptions {
        let mut options = MarkdownOptions::default();
        if let Some(title) = &self.docs.title {
            options.title = title.clone();
        }
        options
    }

    /// Example file options with configured values over built-in defaults.
    pub fn env_example_options(&self) -> EnvExampleOptions {
        let defaults = EnvExampleOptions::default();
        EnvExampleOptions {
            include_comments: self
                .example
                .include_comments
                .unwrap_or(defaults.include_comments),
            group_by_required: self
                .example
                .group_by_required
                .unwrap_or(defaults.group_by_required),
        }
    }

    /// Documentation output path, or [`DEFAULT_DOCS_OUTPUT`].
    pub fn docs_output(&self) -> PathBuf {
        self.docs
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_OUTPUT))
    }

    /// Example file output path, or [`DEFAULT_EXAMPLE_OUTPUT`].
    pub fn example_output(&self) -> PathBuf {
        self.example
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXAMPLE_OUTPUT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
schema: config/env.schema.yaml
strict: true
docs:
  output: docs/ENVIRONMENT.md
  title: Service Configuration
example:
  include_comments: false
  group_by_required: true
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ProjectConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.schema, Some(PathBuf::from("config/env.schema.yaml")));
        assert!(config.strict);
        assert_eq!(config.docs_output(), PathBuf::from("docs/ENVIRONMENT.md"));
        assert_eq!(config.example_output(), PathBuf::from(".env.example"));
        assert_eq!(config.markdown_options().title, "Service Configuration");
        assert_eq!(
            config.env_example_options(),
            EnvExampleOptions {
                include_comments: false,
                group_by_required: true,
            }
        );
    }

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.schema, None);
        assert!(!config.strict);
        assert_eq!(config.docs_output(), PathBuf::from(DEFAULT_DOCS_OUTPUT));
        assert_eq!(config.markdown_options(), MarkdownOptions::default());
        assert_eq!(config.env_example_options(), EnvExampleOptions::default());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(serde_yaml::from_str::<ProjectConfig>("shema: env.json\n").is_err());
    }

    #[test]
    fn test_discover_and_load() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ProjectConfig::discover(dir.path()).unwrap(), None);

        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), sample_yaml()).unwrap();
        let config = ProjectConfig::discover(dir.path()).unwrap().unwrap();
        assert!(config.strict);

        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "\n").unwrap();
        let config = ProjectConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "strict: [not, a, bool]\n").unwrap();
        let err = ProjectConfig::load(&path).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }
}
