//! Error types for schema construction, encoding and decoding.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error returned by column conversion functions.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors raised while defining a schema or running it over data.
///
/// Every variant aborts the current call; nothing is retried or partially
/// recovered.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two columns in one line share the same `(group, name)` pair.
    #[error("You have already defined a column named '{name}' in the {group:?} group")]
    DuplicateColumnName { name: String, group: Option<String> },

    /// A record key is claimed twice: by a column and a group, or by either
    /// of them and a child section.
    #[error("Name '{name}' is used by more than one column, group or child section")]
    DuplicateGroupName { name: String },

    /// Two top-level sections (or two children of one section) share a name.
    #[error("Duplicate section name: '{0}'")]
    DuplicateSectionName(String),

    /// A template was referenced that the definition does not know about.
    #[error("Template '{0}' not found as a known template")]
    UnknownTemplate(String),

    /// The column's conversion function rejected the raw text.
    #[error("The value '{value}' in column '{column}' could not be parsed: {source}")]
    Parse {
        column: String,
        value: String,
        #[source]
        source: BoxError,
    },

    /// The formatted value is wider than the column and truncation is off.
    #[error(
        "The formatted value '{value}' in column '{column}' exceeds the allowed length of {length} characters"
    )]
    FormattedValueTooLong {
        column: String,
        value: String,
        length: usize,
    },

    /// The raw line is narrower than the line schema.
    #[error("Line for '{section}' has {found} characters, expected at least {expected}")]
    ColumnMismatch {
        section: String,
        expected: usize,
        found: usize,
    },

    /// A non-optional section matched no input line.
    #[error("Required section '{0}' was not found")]
    RequiredSectionNotFound(String),

    /// A non-optional section had no data to encode.
    #[error("Required section '{0}' was empty")]
    RequiredSectionEmpty(String),

    /// Section data had a shape that cannot be encoded (e.g. a bare scalar).
    #[error("Section '{section}' expected a record or a list of records, found {found}")]
    UnexpectedValue { section: String, found: String },

    /// No definition is registered under the given name.
    #[error("Definition name '{0}' was not found")]
    UnknownDefinition(String),

    /// A schema description file is structurally valid JSON but unusable.
    #[error("Invalid schema configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SchemaError>;
