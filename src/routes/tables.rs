use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::db::tables;
use crate::error::Result;
use crate::AppState;

/// List the tables in the store
pub async fn get_all_tables(State(state): State<AppState>) -> Result<Json<Value>> {
    let tables = tables::list_tables(&state.db).await?;
    Ok(Json(json!({ "tables": tables })))
}

/// Dump every row of one table
pub async fn get_table_rows(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
) -> Result<Json<Value>> {
    let rows = tables::table_rows(&state.db, &table_name).await?;
    Ok(Json(json!({ "table": table_name, "rows": rows })))
}
