use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelataError {
    /// Error executing a statement
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// No row at the requested position
    #[error("No row found at position {position}")]
    NotFound { position: usize },

    /// Error with transaction
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Error mapping a row into a model
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Invalid schema descriptor
    #[error("Schema error: {0}")]
    Schema(String),

    /// Caller supplied arguments that cannot produce a valid statement
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error loading configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The deferred task was dropped before it produced a result
    #[error("The deferred task was dropped before completing")]
    Cancelled,

    /// Generic store error
    #[error("Database error: {0}")]
    Other(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl RelataError {
    /// Returns true for the recoverable out-of-range positional lookup.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, RelataError::NotFound { .. })
    }

    /// Returns true for failures raised by the store itself.
    pub const fn is_store_error(&self) -> bool {
        match self {
            RelataError::ExecutionError(_)
            | RelataError::TransactionError(_)
            | RelataError::Mapping(_)
            | RelataError::Other(_) => true,
            #[cfg(feature = "rusqlite")]
            RelataError::Rusqlite(_) => true,
            _ => false,
        }
    }
}

/// Result type for relation operations
pub type Result<T> = std::result::Result<T, RelataError>;
