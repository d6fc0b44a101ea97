//! Error types for the extraction library.

use thiserror::Error;

use crate::value::ColumnType;

/// Main error type for extraction and write-back operations.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// `connect` called on an already-open connection.
    #[error("already connected")]
    AlreadyConnected,

    /// Any operation other than `connect`/`is_connected` on a closed connection.
    #[error("not connected")]
    NotConnected,

    /// A column's native type is outside the supported dictionary.
    /// Indicates the schema has drifted from what the mapper declares.
    #[error("unexpected type '{native}' for column {table}.{column}")]
    UnexpectedType {
        table: String,
        column: String,
        native: String,
    },

    /// A field map names a column the table does not have.
    #[error("unknown column {table}.{column}")]
    UnknownColumn { table: String, column: String },

    /// `batch_write` update mode with a key that is not part of the field
    /// map or not a real column. Raised before any row is written.
    #[error("invalid key field: {0}")]
    InvalidKey(String),

    /// A textual value could not be coerced into the column's declared type.
    #[error("cannot coerce '{value}' into {ty} for column {column}")]
    Coercion {
        column: String,
        ty: ColumnType,
        value: String,
    },

    /// Underlying SQL execution failure. Fatal to the whole call,
    /// propagated unchanged.
    #[error("database error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Configuration error (invalid YAML, missing fields, unknown schema).
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (config files, export output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
