//! `POST /rpc/:procedure`: the typed procedure surface.
//!
//! Same stores and validation as the REST routes; inputs are the request body
//! as JSON, outputs are the bare result. `listTodos` ignores its body.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use tododb::{CreateTodo, Procedure, TodoId};

use crate::{auth::CurrentUser, error::ApiError, state::AppState};

pub async fn call(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(procedure): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let procedure: Procedure = procedure.parse()?;
    log::debug!("rpc {} for user {}", procedure.name(), user.id);

    let response = match procedure {
        Procedure::ListTodos => Json(state.todos.list(user.id).await?).into_response(),
        Procedure::CreateTodo => {
            let input: CreateTodo = input(&body)?;
            Json(state.todos.create(user.id, &input.text).await?).into_response()
        }
        Procedure::ToggleTodo => {
            let TodoId { id } = input(&body)?;
            Json(state.todos.toggle(user.id, id).await?).into_response()
        }
        Procedure::DeleteTodo => {
            let TodoId { id } = input(&body)?;
            Json(state.todos.delete(user.id, id).await?).into_response()
        }
    };
    Ok(response)
}

/// An empty body reads as `{}`, so missing input fails the same way as missing fields.
fn input<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    Ok(serde_json::from_slice(body)?)
}
