//! Admission engine tests.


use std::sync::Arc;
use std::time::Duration;

use crate::queue::{AdmissionControl, KeySpace};
use crate::store::MemoryStore;

const NAMESPACE: &str = "user_queue";
const PROCEED_TTL: Duration = Duration::from_secs(600);
const WAIT_TTL: Duration = Duration::from_secs(10);

/// Engine over a fresh in-memory store. The store handle is returned so
/// tests can seed scores and force key expiry directly.
fn setup() -> (Arc<AdmissionControl>, Arc<MemoryStore>, KeySpace) {
    let store = Arc::new(MemoryStore::new());
    let keys = KeySpace::new(NAMESPACE);
    let admission = Arc::new(AdmissionControl::new(
        store.clone(),
        keys.clone(),
        PROCEED_TTL,
        WAIT_TTL,
    ));
    (admission, store, keys)
}
