use serde::{Deserialize, Serialize};

/// Inventory row as stored in the `inventory` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    /// Auto-assigned, never changes once issued
    pub item_id: i64,
    pub item_name: String,
    /// Never negative (enforced here and by a CHECK constraint)
    pub quantity: i64,
}

/// Body of `POST /inventory`
#[derive(Debug, Deserialize)]
pub struct InventoryCreate {
    pub item_name: String,
    #[serde(default)]
    pub quantity: i64,
}

/// Body of `PUT /inventory/:id`
#[derive(Debug, Deserialize)]
pub struct InventoryUpdate {
    pub item_name: String,
    pub quantity: i64,
}

impl InventoryItem {
    pub fn validate_name(name: &str) -> bool {
        !name.trim().is_empty()
    }

    pub fn validate_quantity(quantity: i64) -> bool {
        quantity >= 0
    }
}
