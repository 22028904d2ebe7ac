use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaFoldError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid rule '{id}': {reason}")]
    InvalidRule { id: String, reason: String },
}

/// Rejections raised when a rule is written to the store.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Rule not found: {0}")]
    NotFound(String),

    #[error("Rule name must not be empty")]
    EmptyName,

    #[error("Condition {index} ({condition_type}): value_end must be greater than value for 'between'")]
    InvalidRange {
        index: usize,
        condition_type: String,
    },

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

/// Failures reported by the external collaborators (rule source, metadata
/// provider, folder sink, catalog).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read media file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, MediaFoldError>;
