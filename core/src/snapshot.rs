//! Environment snapshots and `.env` file parsing.
//!
//! The validator never reads the process environment itself. Callers hand
//! it an [`EnvSnapshot`], built from the real environment at the program
//! boundary, from `.env` text, or by hand in tests.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Errors produced while reading `.env` input.
#[derive(Debug, Error)]
pub enum DotenvError {
    /// A line is not a valid assignment or a quoted value never closes.
    #[error("malformed line `{line}` at position {position}")]
    Malformed { line: String, position: usize },
    /// The input could not be read.
    #[error("failed to read dotenv input: {0}")]
    Io(#[from] std::io::Error),
    /// A `$VAR` substitution could not be resolved.
    #[error("variable substitution failed: {0}")]
    Substitution(String),
}

impl From<dotenvy::Error> for DotenvError {
    fn from(err: dotenvy::Error) -> Self {
        match err {
            dotenvy::Error::LineParse(line, position) => Self::Malformed {
                line: line.trim_end().to_string(),
                position,
            },
            dotenvy::Error::Io(err) => Self::Io(err),
            other => Self::Substitution(other.to_string()),
        }
    }
}

/// Point-in-time mapping from variable name to value.
///
/// A name missing from the snapshot is unset. An empty string is kept as
/// given; the validator treats it as "no value".
///
/// # Examples
///
/// ```
/// use envguard_core::EnvSnapshot;
///
/// let snapshot = EnvSnapshot::new()
///     .with("PORT", "8080")
///     .with("DEBUG", "");
///
/// assert_eq!(snapshot.get("PORT"), Some("8080"));
/// assert_eq!(snapshot.get("DEBUG"), Some(""));
/// assert_eq!(snapshot.get("MISSING"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Parses `.env`-style text.
    ///
    /// Follows the usual dotenv rules: `#` comments, an optional `export `
    /// prefix, literal single-quoted values, double-quoted values with
    /// escapes that may span several lines, and `$VAR` / `${VAR}`
    /// substitution in unquoted and double-quoted values. Substitution
    /// reads the process environment first, then earlier assignments in the
    /// same input; the process environment is never modified. Later
    /// assignments to the same name win.
    ///
    /// # Errors
    ///
    /// Returns a [`DotenvError`] for the first line that fails to parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use envguard_core::EnvSnapshot;
    ///
    /// let text = "# database\nexport DATABASE_URL=\"postgres://localhost/app\"\nPORT=3000 # http\n";
    /// let snapshot = EnvSnapshot::parse_dotenv(text).unwrap();
    /// assert_eq!(snapshot.get("DATABASE_URL"), Some("postgres://localhost/app"));
    /// assert_eq!(snapshot.get("PORT"), Some("3000"));
    /// ```
    pub fn parse_dotenv(text: &str) -> Result<Self, DotenvError> {
        Self::read_dotenv(text.as_bytes())
    }

    /// Reads and parses a `.env` file, following the same rules as
    /// [`parse_dotenv`](Self::parse_dotenv).
    ///
    /// # Errors
    ///
    /// Returns [`DotenvError::Io`] if the file cannot be opened or read.
    pub fn from_dotenv_file(path: impl AsRef<Path>) -> Result<Self, DotenvError> {
        let iter = dotenvy::from_path_iter(path.as_ref())?;
        iter.map(|item| item.map_err(DotenvError::from)).collect()
    }

    fn read_dotenv<R: Read>(reader: R) -> Result<Self, DotenvError> {
        dotenvy::from_read_iter(reader)
            .map(|item| item.map_err(DotenvError::from))
            .collect()
    }

    /// Adds or replaces a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Adds or replaces a variable in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Unsets a variable, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    /// Layers `other` on top of this snapshot; its values win.
    pub fn extend(&mut self, other: EnvSnapshot) {
        self.vars.extend(other.vars);
    }

    /// Returns the raw value for `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns the number of variables in the snapshot.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
