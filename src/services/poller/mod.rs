pub mod snapshot;
pub mod subscription;

pub use snapshot::{FeedState, SnapshotCell};
pub use subscription::{LivePoller, PollSubscription};
