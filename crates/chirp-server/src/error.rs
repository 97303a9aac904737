use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chirp_store::{ErrorKind, StoreError};
use thiserror::Error;

use crate::handler::Message;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

const INTERNAL_MESSAGE: &str = "internal server error";

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(err) => match err.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::UsernameTaken => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures keep their detail in the log, not the body.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            match self {
                Self::BadRequest(msg) => msg,
                Self::Store(err) => err.to_string(),
                other => other.to_string(),
            }
        };
        (status, Json(Message::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_types::UserId;

    #[test]
    fn store_kinds_map_to_statuses() {
        let cases = [
            (StoreError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (StoreError::UsernameTaken("a".into()), StatusCode::CONFLICT),
            (StoreError::UserNotFound(UserId::new(1)), StatusCode::NOT_FOUND),
            (StoreError::UsernameNotFound("a".into()), StatusCode::NOT_FOUND),
            (
                StoreError::Unavailable("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn server_errors_hide_detail() {
        let response =
            ServerError::Store(StoreError::Unavailable("secret path".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(INTERNAL_MESSAGE));
        assert!(!text.contains("secret path"));
    }

    #[tokio::test]
    async fn client_errors_carry_message() {
        let response = ServerError::Store(StoreError::UsernameTaken("alice".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["message"],
            "user with username \"alice\" already exists"
        );
    }
}
