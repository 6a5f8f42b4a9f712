//! Admission-control engine.
//!
//! ## Module organization
//!
//! - `keys.rs` - storage key construction per queue
//! - `admission.rs` - register, promote, status, rank, requeue, heartbeat, leave
//! - `load.rs` - system load sampling for the adaptive quota
//! - `scheduler.rs` - periodic throttle scheduler and quota policy

mod admission;
mod keys;
pub mod load;
mod scheduler;

#[cfg(test)]
mod tests;

pub use admission::AdmissionControl;
pub use keys::KeySpace;
pub use scheduler::{QuotaPolicy, ThrottleScheduler};
