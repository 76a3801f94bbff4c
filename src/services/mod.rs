pub mod dashboard;
pub mod metrics;
pub mod poller;
pub mod reset;
pub mod session;
pub mod transport;
