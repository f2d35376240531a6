//! Error handling for the execution engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Out of memory")]
    OutOfMemory,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Expression evaluation failed (type mismatch, division by zero, ...).
    /// Aborts the current `produce_chunk` call; propagates to the driver.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// A cancellation token was observed set. Non-fatal for the session,
    /// but the current query must stop.
    #[error("Query cancelled")]
    Cancelled,

    /// A debug-only invariant was violated (chunk verify, cursor bounds).
    /// Indicates a bug in the engine itself.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for engine operations (alias for Result)
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_err {
    ($msg:expr) => {
        $crate::common::error::EngineError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::EngineError::Internal(format!($fmt, $($arg)*))
    };
}

/// Macro for creating not implemented errors
#[macro_export]
macro_rules! not_implemented_err {
    ($msg:expr) => {
        $crate::common::error::EngineError::NotImplemented($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::EngineError::NotImplemented(format!($fmt, $($arg)*))
    };
}
