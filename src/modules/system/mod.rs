pub mod crud;
pub mod schema;

pub use crud::SystemCrud;
pub use schema::{HealthSnapshot, OverallStatus, ServerStatus, SyncSnapshot};
