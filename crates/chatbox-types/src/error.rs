use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chatbox-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Rejected pagination parameters. Raised before any query runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'offset_datetime' and 'offset_id' must either both be given or not given")]
    IncompleteCursor,

    #[error("invalid offset_datetime: '{0}' is not a unix timestamp")]
    MalformedTimestamp(String),

    #[error("invalid offset_id: '{0}' is not a valid UUID")]
    MalformedId(String),

    #[error("invalid limit: '{0}' is not an integer")]
    InvalidLimit(String),

    #[error("limit {limit} is out of range, must be between 1 and {max}")]
    LimitOutOfRange { limit: i64, max: u32 },

    #[error("invalid value for '{name}': '{value}' is not a boolean")]
    InvalidFlag { name: &'static str, value: String },
}

/// Failure of a paginated fetch: either the request was invalid or the
/// store failed. Store errors are passed through untouched.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors related to chat and message operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat not found")]
    NotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("permission denied: {0}")]
    Forbidden(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// A configuration file that parsed but describes an unusable setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
