//! Error types for sqlgen

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the parse and model layers
pub type Result<T> = std::result::Result<T, SqlGenError>;

/// Errors that can occur while turning SQL into the generation model
#[derive(Error, Debug)]
pub enum SqlGenError {
    // ------------------------------------------------------------------
    // Structural
    // ------------------------------------------------------------------
    #[error("missing begin stmt near by '{near}'")]
    MissingBegin { near: String },

    #[error("missing commit stmt")]
    MissingCommit,

    #[error("missing transaction")]
    MissingTransaction,

    #[error("unsupported stmt near by '{near}'")]
    UnsupportedStatement { near: String },

    #[error("unsupported nested transaction")]
    UnsupportedNestedTransaction,

    #[error("unsupported nested query")]
    UnsupportedNestedQuery,

    #[error("missing table")]
    MissingTable,

    #[error("multiple table")]
    MultipleTable,

    #[error("unsupported expression: {expr}")]
    UnsupportedExpression { expr: String },

    #[error("missing table definition: {table}")]
    MissingTableDefinition { table: String },

    #[error("missing column '{column}' in table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("invalid model: {message}")]
    InvalidModel { message: String },

    /// Wraps a failure with the normalized text of the statement that caused it
    #[error("{source}, error near: '{near}'")]
    Near {
        near: String,
        #[source]
        source: Box<SqlGenError>,
    },

    // ------------------------------------------------------------------
    // Type
    // ------------------------------------------------------------------
    #[error("unsupported type: {tp}")]
    UnsupportedType { tp: String },

    // ------------------------------------------------------------------
    // Upstream
    // ------------------------------------------------------------------
    #[error("SQL parse error: {message}")]
    Parse { message: String },

    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no sql file found")]
    NoSqlFile,

    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read config file: {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {path}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing schema")]
    MissingSchema,

    #[error("invalid dsn: {dsn}")]
    InvalidDsn { dsn: String },

    #[error("schema provider error: {message}")]
    SchemaProvider { message: String },

    #[error("failed to format output")]
    Format(#[from] std::fmt::Error),
}

impl SqlGenError {
    /// Wrap this error with the statement text it occurred near.
    ///
    /// Errors that already carry a location are returned unchanged so the
    /// innermost statement wins.
    pub fn near(self, text: impl Into<String>) -> Self {
        match self {
            SqlGenError::Near { .. } => self,
            other => SqlGenError::Near {
                near: text.into(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, skipping any `Near` wrappers
    pub fn root(&self) -> &SqlGenError {
        match self {
            SqlGenError::Near { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<sqlparser::parser::ParserError> for SqlGenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        SqlGenError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<sqlparser::tokenizer::TokenizerError> for SqlGenError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        SqlGenError::Parse {
            message: err.to_string(),
        }
    }
}
