use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Database not initialized")]
    NotInitialized,

    #[error("User already exists")]
    AlreadyExists,

    #[error("{0} is required for onboarding update")]
    RequiredFieldMissing(&'static str),

    #[error("Insufficient tokens: {available} available, {requested} requested")]
    InsufficientTokens { available: i64, requested: i64 },

    #[error("No token account for user {0}")]
    TokenAccountMissing(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),
}

impl From<figment::Error> for StoreError {
    fn from(e: figment::Error) -> Self {
        StoreError::Config(Box::new(e))
    }
}

impl StoreError {
    /// True when the underlying engine rejected a write on a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(SqlxError::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}
