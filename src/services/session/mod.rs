pub mod registry;
pub mod load;
pub mod flood;

pub use registry::{SessionError, SessionHandle, SessionKind, SessionRegistry};
pub use load::{DemoTarget, LoadConfig, LoadGenerator, LoadReport, LoadSession};
pub use flood::{BulkFlooder, FloodConfig, FloodProgress, FloodSession};
