use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{ComplaintText, CreatedComplaintResponse};
use super::repo::Complaint;
use crate::{auth::extractors::CurrentUser, error::ApiError, state::AppState};

pub fn complaint_routes() -> Router<AppState> {
    Router::new().route("/complaints", get(list_complaints).post(create_complaint))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_complaint(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ComplaintText(text): ComplaintText,
) -> Result<Json<CreatedComplaintResponse>, ApiError> {
    let mut tx = state.db.begin().await.context("begin tx")?;
    let complaint = Complaint::create(&mut *tx, &text, user.id).await?;
    tx.commit().await.context("commit tx")?;

    info!(complaint_id = complaint.id, "complaint created");
    Ok(Json(CreatedComplaintResponse {
        id: complaint.id,
        text: complaint.text,
    }))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn list_complaints(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Complaint>>, ApiError> {
    let complaints = Complaint::list_by_owner(&state.db, user.id).await?;
    Ok(Json(complaints))
}
