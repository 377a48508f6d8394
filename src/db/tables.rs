//! Read-only introspection over whatever tables the store contains.

use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::db::Db;
use crate::error::{AppError, Result};

/// Users table name
pub const USERS: &str = "users";

/// Inventory table name
pub const INVENTORY: &str = "inventory";

/// List user-visible tables, skipping SQLite and migration bookkeeping
pub async fn list_tables(db: &Db) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(db)
    .await?;

    Ok(names
        .into_iter()
        .filter(|name| !name.starts_with("sqlite_") && !name.starts_with("_sqlx"))
        .collect())
}

/// Read every row of a table as JSON objects keyed by column name
///
/// The name is only interpolated into SQL after it was found in the
/// catalog, so arbitrary input never reaches the query text.
pub async fn table_rows(db: &Db, table_name: &str) -> Result<Vec<Map<String, Value>>> {
    let tables = list_tables(db).await?;
    if !tables.iter().any(|t| t == table_name) {
        return Err(AppError::TableNotFound(table_name.to_string()));
    }

    let sql = format!("SELECT * FROM \"{}\"", table_name.replace('"', "\"\""));
    let rows = sqlx::query(&sql).fetch_all(db).await?;

    rows.iter().map(row_to_json).collect()
}

fn row_to_json(row: &SqliteRow) -> Result<Map<String, Value>> {
    let mut object = Map::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
                "REAL" => Number::from_f64(row.try_get::<f64, _>(index)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "BLOB" => Value::from(row.try_get::<Vec<u8>, _>(index)?),
                _ => Value::from(row.try_get::<String, _>(index)?),
            }
        };

        object.insert(column.name().to_string(), value);
    }

    Ok(object)
}
