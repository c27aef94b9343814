use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr), // Automatically converts DbErr to TodoError

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Identity verification failed: {0}")]
    Identity(String),

    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        TodoError::Validation(message.into())
    }
}

pub type Result<T, E = TodoError> = std::result::Result<T, E>;
