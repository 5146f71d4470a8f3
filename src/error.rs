//! Error taxonomy shared by the loader and the analytic components.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced to the caller.
///
/// Data-level outcomes such as a missing operand in a comparison are not
/// errors; they are reported through [`crate::compare::MismatchClass`].
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is absent from a table.
    #[error("missing column \"{column}\" in {table}")]
    MissingColumn { column: String, table: String },

    /// A built table's columns differ in length.
    #[error("column \"{column}\" in {table} has {found} rows, expected {expected}")]
    ColumnLength {
        column: String,
        table: String,
        expected: usize,
        found: usize,
    },

    /// Comparison tolerance must be finite and non-negative.
    #[error("invalid tolerance {0}: must be finite and >= 0")]
    InvalidTolerance(f64),

    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed YAML in \"{}\": {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("no dispatch data for project {0}")]
    NoDispatchData(String),
}

impl Error {
    pub(crate) fn missing_column(column: &str, table: &str) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
            table: table.to_string(),
        }
    }
}
