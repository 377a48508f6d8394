pub mod inventory;
pub mod user;

pub use inventory::{InventoryCreate, InventoryItem, InventoryUpdate};
pub use user::{User, UserCreate, UserUpdate};
