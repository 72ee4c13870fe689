use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, instrument};

use crate::auth::extractors::CurrentUser;
use crate::state::AppState;

use super::dto::{CreateTodoRequest, TodoFilter, UpdateTodoRequest};
use super::repo::{self, Todo};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
}

#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn list_todos(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<TodoFilter>,
) -> Result<Json<Vec<Todo>>, TodoError> {
    let todos = repo::list_for_user(&state.db, user.0.user_id, filter.complete)
        .await
        .map_err(internal)?;
    Ok(Json(todos))
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.user_id))]
pub async fn create_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), TodoError> {
    let todo = repo::create(
        &state.db,
        user.0.user_id,
        &payload.title,
        &payload.description,
        payload.due_date,
    )
    .await
    .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(skip(state, user, payload), fields(user_id = user.0.user_id))]
pub async fn update_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(todo_id): Path<i64>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, TodoError> {
    match repo::set_complete(&state.db, user.0.user_id, todo_id, payload.complete)
        .await
        .map_err(internal)?
    {
        Some(todo) => Ok(Json(todo)),
        None => Err(not_found()),
    }
}

#[instrument(skip(state, user), fields(user_id = user.0.user_id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(todo_id): Path<i64>,
) -> Result<StatusCode, TodoError> {
    if repo::delete(&state.db, user.0.user_id, todo_id)
        .await
        .map_err(internal)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

/// Same `{"detail": ...}` body shape the auth surface uses.
type TodoError = (StatusCode, Json<Value>);

fn not_found() -> TodoError {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Todo not found" })))
}

fn internal(e: anyhow::Error) -> TodoError {
    error!(error = %e, "todo operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Internal server error" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn not_found_body_matches_wire_contract() {
        let res = not_found().into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Todo not found");
    }

    #[tokio::test]
    async fn internal_body_does_not_leak_detail() {
        let res = internal(anyhow::anyhow!("pool exhausted")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Internal server error");
    }
}
