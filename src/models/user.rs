use serde::{Deserialize, Serialize};

/// User row as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Auto-assigned, never changes once issued
    pub user_id: i64,
    pub user_name: String,
}

/// Body of `POST /users`
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub user_name: String,
}

/// Body of `PUT /users/:id`
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub user_name: String,
}

impl User {
    /// A user name must contain something other than whitespace
    pub fn validate_name(name: &str) -> bool {
        !name.trim().is_empty()
    }
}
