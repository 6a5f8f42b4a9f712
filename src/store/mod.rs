//! Ordered key-value store abstraction.
//!
//! The admission engine coordinates exclusively through a store of ordered
//! sets: per key, a set of `(member, score)` pairs sorted by ascending score
//! with lexicographic member tie-break. Each trait call is atomic with
//! respect to its key; composite engine operations spanning two calls are
//! documented at their call sites.

mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;

/// Store-level error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the command.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other store-side failure.
    #[error("store error: {0}")]
    Other(String),
}

/// A `(member, score)` pair returned by ordered-set reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMember {
    pub member: String,
    pub score: u64,
}

/// Ordered-set store interface.
///
/// Scores are Unix timestamps in seconds. Ranks are zero-based positions in
/// ascending `(score, member)` order.
#[async_trait]
pub trait OrderedSetStore: Send + Sync {
    /// Zero-based rank of `member` within `key`, or `None` if absent.
    async fn rank(&self, key: &str, member: &str) -> Result<Option<u64>, StoreError>;

    /// Insert `member` only if not already present. Returns `true` iff
    /// inserted. This is a single atomic conditional operation, not a
    /// check-then-insert.
    async fn add_if_absent(&self, key: &str, member: &str, score: u64)
        -> Result<bool, StoreError>;

    /// Upsert `member` with `score`. Returns `true` iff the member was newly
    /// inserted (as opposed to rescored).
    async fn add(&self, key: &str, member: &str, score: u64) -> Result<bool, StoreError>;

    /// Atomically remove and return up to `count` lowest-scored members,
    /// ascending.
    async fn pop_min(&self, key: &str, count: u64) -> Result<Vec<ScoredMember>, StoreError>;

    /// Remove `member` from `key`. Returns `true` iff it was present.
    async fn remove(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Number of members under `key` (0 if the key does not exist).
    async fn card(&self, key: &str) -> Result<u64, StoreError>;

    /// Set a key-level TTL. The whole set is dropped when it lapses.
    /// Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Enumerate keys matching a glob pattern (`*` wildcard). No ordering
    /// guarantee; no duplicates within one scan.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;
}
