use chirp_types::{TypeError, UserId};

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required field was missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Another live user already holds this username.
    #[error("user with username {0:?} already exists")]
    UsernameTaken(String),

    /// No live user has this id.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No live user has this username.
    #[error("no user named {0:?}")]
    UsernameNotFound(String),

    /// The backing medium could not be reached or a statement failed for
    /// reasons unrelated to the data.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Coarse classification of a [`StoreError`].
///
/// Callers translate a kind into their own status codes; the variants of
/// [`StoreError`] carry the detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    UsernameTaken,
    NotFound,
    StorageUnavailable,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::UsernameTaken(_) => ErrorKind::UsernameTaken,
            Self::UserNotFound(_) | Self::UsernameNotFound(_) => ErrorKind::NotFound,
            Self::Unavailable(_) => ErrorKind::StorageUnavailable,
        }
    }

    /// Returns `true` if retrying the whole operation may succeed.
    ///
    /// Every store operation is safe to repeat: a retried `create_user`
    /// re-runs its uniqueness check.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StorageUnavailable
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
