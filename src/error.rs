use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SqlError: {0}")]
    Sql(#[from] libsql::Error),
    #[error("MigrationError: {name}: {message}")]
    Migration { name: String, message: String },
    #[error("LockError: {0}")]
    Lock(String),
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("StoreError: {0}")]
    Store(#[from] StoreError),
    #[error("EncodeError: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("UnsupportedEvent: {0}")]
    UnsupportedEvent(String),
}
