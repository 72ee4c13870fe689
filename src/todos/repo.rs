use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    pub todo_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<Date>,
    pub complete: bool,
    pub created_at: OffsetDateTime,
}

pub async fn list_for_user(
    db: &PgPool,
    user_id: i64,
    complete: Option<bool>,
) -> anyhow::Result<Vec<Todo>> {
    let rows = sqlx::query_as::<_, Todo>(
        r#"
        SELECT todo_id, user_id, title, description, due_date, complete, created_at
        FROM todos
        WHERE user_id = $1 AND ($2::boolean IS NULL OR complete = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(complete)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    user_id: i64,
    title: &str,
    description: &str,
    due_date: Option<Date>,
) -> anyhow::Result<Todo> {
    let todo = sqlx::query_as::<_, Todo>(
        r#"
        INSERT INTO todos (user_id, title, description, due_date)
        VALUES ($1, $2, $3, $4)
        RETURNING todo_id, user_id, title, description, due_date, complete, created_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(due_date)
    .fetch_one(db)
    .await?;
    Ok(todo)
}

/// Scoped by owner; `None` when the todo does not exist or belongs to
/// someone else.
pub async fn set_complete(
    db: &PgPool,
    user_id: i64,
    todo_id: i64,
    complete: bool,
) -> anyhow::Result<Option<Todo>> {
    let todo = sqlx::query_as::<_, Todo>(
        r#"
        UPDATE todos
        SET complete = $3
        WHERE todo_id = $1 AND user_id = $2
        RETURNING todo_id, user_id, title, description, due_date, complete, created_at
        "#,
    )
    .bind(todo_id)
    .bind(user_id)
    .bind(complete)
    .fetch_optional(db)
    .await?;
    Ok(todo)
}

pub async fn delete(db: &PgPool, user_id: i64, todo_id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM todos
        WHERE todo_id = $1 AND user_id = $2
        "#,
    )
    .bind(todo_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
