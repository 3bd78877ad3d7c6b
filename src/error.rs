use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::repo::CreateUserError;

/// Every failure a handler can report to a client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body or query string could not be decoded into the expected shape.
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Unsupported grant type")]
    UnsupportedGrantType,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Covers a missing, malformed, forged or expired token as well as a
    /// token whose subject no longer resolves to a user.
    #[error("Invalid token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnsupportedGrantType | ApiError::InvalidEmail | ApiError::EmailTaken => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CreateUserError> for ApiError {
    fn from(e: CreateUserError) -> Self {
        match e {
            CreateUserError::EmailTaken => ApiError::EmailTaken,
            CreateUserError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut res = (status, Json(ErrorBody { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn detail_of(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let v: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        v["detail"].as_str().expect("detail field").to_string()
    }

    #[tokio::test]
    async fn conflict_maps_to_bad_request_with_detail() {
        let res = ApiError::EmailTaken.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail_of(res).await, "Email already registered");
    }

    #[tokio::test]
    async fn invalid_token_is_401_with_challenge() {
        let res = ApiError::InvalidToken.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(detail_of(res).await, "Invalid token");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let res = ApiError::Internal(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail_of(res).await, "Internal server error");
    }

    #[tokio::test]
    async fn invalid_request_is_422_with_reason() {
        let res = ApiError::InvalidRequest("missing field `password`".into()).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detail_of(res).await, "missing field `password`");
    }

    #[test]
    fn create_user_error_conversion() {
        assert!(matches!(
            ApiError::from(CreateUserError::EmailTaken),
            ApiError::EmailTaken
        ));
        assert!(matches!(
            ApiError::from(CreateUserError::Other(anyhow::anyhow!("x"))),
            ApiError::Internal(_)
        ));
    }
}
