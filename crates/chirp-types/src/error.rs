use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}
