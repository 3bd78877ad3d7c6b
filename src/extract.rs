//! Request-body extractors whose rejections use the API's `{detail}` error
//! body instead of axum's plain-text defaults.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// [`axum::Form`] rejecting with [`ApiError::InvalidRequest`].
pub struct ApiForm<T>(pub T);

/// [`axum::Json`] rejecting with [`ApiError::InvalidRequest`].
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Form::<T>::from_request(req, state).await {
            Ok(axum::Form(value)) => Ok(ApiForm(value)),
            Err(rejection) => {
                let detail = rejection.body_text();
                debug!(%detail, "form rejected");
                Err(ApiError::InvalidRequest(detail))
            }
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let detail = rejection.body_text();
                debug!(%detail, "json rejected");
                Err(ApiError::InvalidRequest(detail))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Login {
        username: String,
        password: String,
    }

    fn form_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn form_decodes_fields() {
        let req = form_request("username=a%40x.com&password=pw1");
        let ApiForm(login) = ApiForm::<Login>::from_request(req, &())
            .await
            .expect("form");
        assert_eq!(login.username, "a@x.com");
        assert_eq!(login.password, "pw1");
    }

    #[tokio::test]
    async fn missing_form_field_is_invalid_request() {
        let err = ApiForm::<Login>::from_request(form_request("username=a%40x.com"), &())
            .await
            .err()
            .expect("rejection");
        match err {
            ApiError::InvalidRequest(detail) => assert!(detail.contains("password")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn json_without_content_type_is_invalid_request() {
        let req = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"username":"a","password":"b"}"#))
            .unwrap();
        let err = ApiJson::<Login>::from_request(req, &())
            .await
            .err()
            .expect("rejection");
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
