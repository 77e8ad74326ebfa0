use std::path::PathBuf;

use thiserror::Error;

/// modelgen errors
#[derive(Error, Debug)]
pub enum ModelGenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Failed to introspect schema '{schema}': {message}")]
    Introspection { schema: String, message: String },

    #[error("Unknown type '{data_type}' for column '{column}' in table '{table}'")]
    UnrecognizedType {
        table: String,
        column: String,
        data_type: String,
    },

    #[error("Name collision: {0}")]
    NameCollision(String),

    #[error("Table '{table}' produces an invalid identifier '{name}'")]
    InvalidIdentifier { table: String, name: String },

    #[error("Code generation failed for table '{table}': {message}")]
    CodeGen { table: String, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
