use anyhow::Context;
use axum::{extract::State, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{PasswordForm, RegisterResponse, TokenResponse},
        password::{hash_password_blocking, verify_against_dummy, verify_password},
        repo::{CreateUserError, User},
    },
    error::ApiError,
    extract::ApiForm,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<PasswordForm>,
) -> Result<Json<RegisterResponse>, ApiError> {
    form.check_grant_type()?;

    if !is_valid_email(&form.username) {
        warn!("invalid email");
        return Err(ApiError::InvalidEmail);
    }

    if User::find_by_email(&state.db, &form.username).await?.is_some() {
        warn!(email = %form.username, "email already registered");
        return Err(ApiError::EmailTaken);
    }

    // No lock is held while hashing; the transaction only ever writes, so a
    // contended insert waits on the busy timeout instead of failing.
    let hash = hash_password_blocking(&form.password).await?;
    let mut tx = state.db.begin().await.context("begin tx")?;
    let user = match User::insert(&mut *tx, &form.username, &hash).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, CreateUserError::EmailTaken) {
                warn!(email = %form.username, "email registered concurrently");
            }
            return Err(e.into());
        }
    };
    tx.commit().await.context("commit tx")?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(RegisterResponse { email: user.email }))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<PasswordForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    form.check_grant_type()?;

    let user = User::find_by_email(&state.db, &form.username).await?;
    let authenticated = match &user {
        Some(u) => verify_password(&form.password, &u.hashed_password),
        None => verify_against_dummy(&form.password),
    };

    let user = match user {
        Some(u) if authenticated => u,
        _ => {
            warn!(email = %form.username, "login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let access_token = state
        .keys
        .sign_access(&user.email)
        .context("sign access token")?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}
