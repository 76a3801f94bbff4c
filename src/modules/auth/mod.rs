pub mod crud;
pub mod schema;

pub use crud::{AuthCrud, AuthError};
