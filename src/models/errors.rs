use thiserror::Error;

/// Service-level errors that can occur in business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service not found: {id}")]
    ServiceNotFound { id: i64 },

    #[error("Message not found: {id}")]
    MessageNotFound { id: i64 },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

impl ServiceError {
    /// Whether the error was detected before any write and belongs to the caller
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation { .. } | ServiceError::Configuration { .. }
        )
    }
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed")]
    ConnectionFailed,

    #[error("Item not found")]
    NotFound,

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Invalid row: {message}")]
    InvalidRow { message: String },
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepositoryError::ConnectionFailed
            }
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                RepositoryError::ConstraintViolation {
                    message: db_err.message().to_string(),
                }
            }
            sqlx::Error::ColumnNotFound(column) => RepositoryError::InvalidRow {
                message: format!("Missing column {}", column),
            },
            sqlx::Error::ColumnDecode { index, source } => RepositoryError::InvalidRow {
                message: format!("Failed to decode column {}: {}", index, source),
            },
            other => RepositoryError::Database {
                message: other.to_string(),
            },
        }
    }
}

impl From<sqlx::migrate::MigrateError> for RepositoryError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepositoryError::Migration {
            message: err.to_string(),
        }
    }
}

/// Validation errors for input data
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Field too long: {field}, max_length={max_length}, actual_length={actual_length}")]
    TooLong {
        field: String,
        max_length: usize,
        actual_length: usize,
    },

    #[error("Invalid format: {field}, expected={expected}")]
    InvalidFormat { field: String, expected: String },

    #[error("Value out of range: {field}, min={min}, max={max}, value={value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation {
            message: err.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
