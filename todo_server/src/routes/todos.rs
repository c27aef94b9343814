use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tododb::{CreateTodo, Deleted, TodoId, entity::todo};

use crate::{auth::CurrentUser, error::ApiError, state::AppState};

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<todo::Model>>, ApiError> {
    Ok(Json(state.todos.list(user.id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<todo::Model>), ApiError> {
    let Json(input) = payload?;
    let created = state.todos.create(user.id, &input.text).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<todo::Model>, ApiError> {
    let TodoId { id } = id.parse::<TodoId>()?;
    Ok(Json(state.todos.toggle(user.id, id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let TodoId { id } = id.parse::<TodoId>()?;
    Ok(Json(state.todos.delete(user.id, id).await?))
}
