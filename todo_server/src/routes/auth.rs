//! Registration, login, logout and Google sign-in.
//!
//! Every successful sign-in answers with the [`UserProfile`] and a
//! `Set-Cookie` header carrying the session token.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tododb::{Credentials, GoogleLogin, TodoError, UserProfile, entity::user};

use crate::{
    auth::{CurrentUser, clear_session_cookie, session_cookie},
    error::ApiError,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = payload?;
    let user = state.users.register(&credentials).await?;
    signed_in(&state, StatusCode::CREATED, user)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = payload?;
    let user = state.users.authenticate(&credentials).await?;
    signed_in(&state, StatusCode::OK, user)
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_session_cookie(state.cookie_secure))],
        Json(json!({ "message": "Logged out" })),
    )
}

pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    // A valid token for an account that no longer resolves is still unauthorized.
    let found = state.users.find(user.id).await?.ok_or(TodoError::Unauthorized)?;
    Ok(Json(found.into()))
}

pub async fn google(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLogin>, JsonRejection>,
) -> Result<Response, ApiError> {
    let verifier = state.google.clone().ok_or(ApiError::GoogleDisabled)?;
    let Json(login) = payload?;
    if login.credential.is_empty() {
        return Err(TodoError::validation("credential is required").into());
    }

    let identity = verifier.verify(&login.credential).await.map_err(|e| {
        log::debug!("Google credential rejected: {e}");
        e
    })?;
    let user = state.users.sign_in_with_google(&identity).await?;
    signed_in(&state, StatusCode::OK, user)
}

fn signed_in(state: &AppState, status: StatusCode, user: user::Model) -> Result<Response, ApiError> {
    let token = state.keys.issue(user.id)?;
    let cookie = session_cookie(&token, state.cookie_secure);
    let profile = UserProfile::from(user);
    Ok((status, [(SET_COOKIE, cookie)], Json(profile)).into_response())
}
