pub mod crud;
pub mod schema;

pub use crud::InventoryCrud;
pub use schema::{DataSource, InventoryItem, ItemCreate, ItemsPage, Laboratory, NewLaboratory};
