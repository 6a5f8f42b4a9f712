//! gateQ - waiting-room admission-control server.
//!
//! Throttles access to a protected downstream resource by holding newcomers
//! in an ordered wait queue and periodically promoting a bounded number of
//! them into an admitted set.

pub mod config;
pub mod error;
pub mod http;
pub mod queue;
pub mod store;
pub mod telemetry;
