use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::constants::ERR_EMPTY_USER_NAME;
use crate::error::{AppError, Result};
use crate::models::{User, UserCreate, UserUpdate};
use crate::AppState;

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<Json<User>> {
    if !User::validate_name(&payload.user_name) {
        return Err(AppError::InvalidInput(ERR_EMPTY_USER_NAME.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (user_name) VALUES (?) RETURNING user_id, user_name",
    )
    .bind(payload.user_name.trim())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id = user.user_id, "User created");
    Ok(Json(user))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users =
        sqlx::query_as::<_, User>("SELECT user_id, user_name FROM users ORDER BY user_id")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>> {
    sqlx::query_as::<_, User>("SELECT user_id, user_name FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User"))
}

/// Rename a user; the id never changes
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<User>> {
    if !User::validate_name(&payload.user_name) {
        return Err(AppError::InvalidInput(ERR_EMPTY_USER_NAME.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET user_name = ? WHERE user_id = ? RETURNING user_id, user_name",
    )
    .bind(payload.user_name.trim())
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("User"))?;

    tracing::info!(user_id, "User updated");
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User"));
    }

    tracing::info!(user_id, "User deleted");
    Ok(Json(json!({ "detail": "User deleted" })))
}
