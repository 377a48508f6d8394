use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::constants::{ERR_EMPTY_ITEM_NAME, ERR_NEGATIVE_QUANTITY};
use crate::error::{AppError, Result};
use crate::models::{InventoryCreate, InventoryItem, InventoryUpdate};
use crate::AppState;

fn validate(name: &str, quantity: i64) -> Result<()> {
    if !InventoryItem::validate_name(name) {
        return Err(AppError::InvalidInput(ERR_EMPTY_ITEM_NAME.to_string()));
    }
    if !InventoryItem::validate_quantity(quantity) {
        return Err(AppError::InvalidInput(ERR_NEGATIVE_QUANTITY.to_string()));
    }
    Ok(())
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<InventoryCreate>,
) -> Result<Json<InventoryItem>> {
    validate(&payload.item_name, payload.quantity)?;

    let item = sqlx::query_as::<_, InventoryItem>(
        "INSERT INTO inventory (item_name, quantity) VALUES (?, ?) \
         RETURNING item_id, item_name, quantity",
    )
    .bind(payload.item_name.trim())
    .bind(payload.quantity)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(item_id = item.item_id, "Inventory item created");
    Ok(Json(item))
}

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<InventoryItem>>> {
    let items = sqlx::query_as::<_, InventoryItem>(
        "SELECT item_id, item_name, quantity FROM inventory ORDER BY item_id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<InventoryItem>> {
    sqlx::query_as::<_, InventoryItem>(
        "SELECT item_id, item_name, quantity FROM inventory WHERE item_id = ?",
    )
    .bind(item_id)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or(AppError::NotFound("Item"))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(payload): Json<InventoryUpdate>,
) -> Result<Json<InventoryItem>> {
    validate(&payload.item_name, payload.quantity)?;

    let item = sqlx::query_as::<_, InventoryItem>(
        "UPDATE inventory SET item_name = ?, quantity = ? WHERE item_id = ? \
         RETURNING item_id, item_name, quantity",
    )
    .bind(payload.item_name.trim())
    .bind(payload.quantity)
    .bind(item_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Item"))?;

    tracing::info!(item_id, "Inventory item updated");
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM inventory WHERE item_id = ?")
        .bind(item_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Item"));
    }

    tracing::info!(item_id, "Inventory item deleted");
    Ok(Json(json!({ "detail": "Item deleted" })))
}
