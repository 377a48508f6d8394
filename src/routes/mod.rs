pub mod backup;
pub mod health;
pub mod inventory;
pub mod tables;
pub mod users;
pub mod weather;

pub use backup::{
    backup_information, create_backup, create_timestamped_backup, restore_backup,
    verify_backup_database, verify_main_database,
};
pub use health::{health_check, home, ping};
pub use inventory::{create_item, delete_item, get_item, list_items, update_item};
pub use tables::{get_all_tables, get_table_rows};
pub use users::{create_user, delete_user, get_user, list_users, update_user};
pub use weather::weather_by_city;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Build the full API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/health/ping", get(ping))
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/inventory", post(create_item).get(list_items))
        .route(
            "/inventory/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/db", get(get_all_tables))
        .route("/db/:table_name", get(get_table_rows))
        .route("/weather/city/:city", get(weather_by_city))
        .route("/backup/create", post(create_backup))
        .route("/backup/create-timestamped", post(create_timestamped_backup))
        .route("/backup/restore", post(restore_backup))
        .route("/backup/info", get(backup_information))
        .route("/backup/verify-main", get(verify_main_database))
        .route("/backup/verify-backup", get(verify_backup_database))
        .with_state(state)
}
