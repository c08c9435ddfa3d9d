use crate::types::Dialect;
use thiserror::Error;

/// Boxed driver error carried through [`MapperError::Execution`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for statement compilation and execution
#[derive(Error, Debug)]
pub enum MapperError {
    /// Filter value does not match the arity or type the operator expects
    #[error("Invalid filter value: {0}")]
    InvalidFilterValue(String),

    /// A raw descriptor could not be deserialized
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// The generated key could not be recovered from the sequence store
    #[error("Sequence lookup failed for table: {0}")]
    SequenceLookupFailed(String),

    /// A filter or sort names a property the entity does not map
    #[error("Unknown property '{property}' on table {table}")]
    UnknownProperty { table: String, property: String },

    /// The entity has no primary key column
    #[error("Table {0} has no primary key column")]
    MissingPrimaryKey(String),

    /// The primary key value is null
    #[error("Primary key value is null for table {0}")]
    MissingPrimaryKeyValue(String),

    /// The statement would have no column to write
    #[error("Nothing to write for table {0}")]
    NothingToWrite(String),

    /// Write feedback cannot be normalized for this dialect
    #[error("Unsupported dialect for write operations: {0}")]
    UnsupportedDialect(Dialect),

    /// The driver did not report a value the dialect promises
    #[error("Driver did not report {0}")]
    MissingDriverFeedback(&'static str),

    /// Entity or row (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend execution error, passed through unchanged
    #[error("Execution failed: {0}")]
    Execution(#[source] BoxError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl MapperError {
    /// Create an invalid filter value error
    pub fn invalid_filter_value(msg: impl Into<String>) -> Self {
        MapperError::InvalidFilterValue(msg.into())
    }

    /// Create a malformed descriptor error
    pub fn malformed_descriptor(msg: impl Into<String>) -> Self {
        MapperError::MalformedDescriptor(msg.into())
    }

    /// Create an unknown property error
    pub fn unknown_property(table: impl Into<String>, property: impl Into<String>) -> Self {
        MapperError::UnknownProperty {
            table: table.into(),
            property: property.into(),
        }
    }

    /// Wrap a driver error without altering it
    pub fn execution(err: impl Into<BoxError>) -> Self {
        MapperError::Execution(err.into())
    }
}

impl From<serde_json::Error> for MapperError {
    fn from(err: serde_json::Error) -> Self {
        MapperError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
