pub mod types;
pub mod classifier;
pub mod retry;
pub mod credentials;
pub mod connector;
pub mod client;

pub use types::*;
pub use retry::{BackoffPolicy, RequestAttempt};
pub use credentials::{attach_credentials, CredentialStore};
pub use connector::{Connector, HttpConnector};
pub use client::{ResilientTransport, Transport};
