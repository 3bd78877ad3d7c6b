use axum::{
    async_trait,
    extract::{FromRequest, Query, Request},
    http::header,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extract::ApiJson};

#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    pub text: String,
}

/// Complaint text taken from the `text` query parameter, or failing that
/// from a JSON body `{"text": ...}`.
pub struct ComplaintText(pub String);

#[async_trait]
impl<S> FromRequest<S> for ComplaintText
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Query(q)) = Query::<CreateComplaintRequest>::try_from_uri(req.uri()) {
            return Ok(ComplaintText(q.text));
        }
        if !req.headers().contains_key(header::CONTENT_TYPE) {
            return Err(ApiError::InvalidRequest("missing field `text`".into()));
        }
        let ApiJson(body) = ApiJson::<CreateComplaintRequest>::from_request(req, state).await?;
        Ok(ComplaintText(body.text))
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedComplaintResponse {
    pub id: i64,
    pub text: String,
}
