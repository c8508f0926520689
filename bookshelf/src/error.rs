use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown column '{column}' on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

impl StoreError {
    /// Machine-readable code attached to GraphQL errors as `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::DataIntegrity(_) => "DATA_INTEGRITY",
            StoreError::InvalidInput(_) => "BAD_USER_INPUT",
            StoreError::UnknownColumn { .. } | StoreError::Sqlite(_) => "INTERNAL",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::types::Type;
        use rusqlite::ErrorCode;

        // Required fields never default: a NULL means the row is broken.
        if let rusqlite::Error::InvalidColumnType(_, column, Type::Null) = &err {
            return StoreError::DataIntegrity(format!("required column '{column}' is NULL"));
        }

        let rusqlite::Error::SqliteFailure(failure, message) = &err else {
            return StoreError::Sqlite(err);
        };
        let code = failure.code;
        let detail = message.clone().unwrap_or_else(|| failure.to_string());
        match code {
            ErrorCode::ConstraintViolation => StoreError::ConstraintViolation(detail),
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::SystemIoFailure
            | ErrorCode::ReadOnly => StoreError::Unavailable(detail),
            _ => StoreError::Sqlite(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
