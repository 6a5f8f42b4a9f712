//! Core admission-control engine.
//!
//! Holds no mutable state of its own; all cross-request coordination happens
//! through the ordered-set store's atomic single-key operations.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use super::keys::KeySpace;
use crate::error::QueueError;
use crate::store::OrderedSetStore;

/// Current Unix time in seconds, used as the arrival/admission score.
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct AdmissionControl {
    store: Arc<dyn OrderedSetStore>,
    keys: KeySpace,
    proceed_ttl: Duration,
    wait_ttl: Duration,
}

impl AdmissionControl {
    pub fn new(
        store: Arc<dyn OrderedSetStore>,
        keys: KeySpace,
        proceed_ttl: Duration,
        wait_ttl: Duration,
    ) -> Self {
        Self {
            store,
            keys,
            proceed_ttl,
            wait_ttl,
        }
    }

    /// Register a user in the queue's wait set.
    ///
    /// The registered-check and the insert are collapsed into one atomic
    /// `add_if_absent`, so two concurrent registrations for the same user
    /// cannot both succeed. Returns the user's 1-based wait rank at call
    /// time.
    pub async fn register(&self, queue: &str, user_id: &str) -> Result<u64, QueueError> {
        let wait_key = self.keys.wait_key(queue);

        if !self
            .store
            .add_if_absent(&wait_key, user_id, now_secs())
            .await?
        {
            return Err(QueueError::AlreadyRegistered);
        }

        match self.store.rank(&wait_key, user_id).await? {
            Some(rank) => {
                debug!(queue = %queue, user_id = %user_id, rank = rank + 1, "Registered in wait queue");
                Ok(rank + 1)
            }
            // The wait key lapsed between the insert and the rank read.
            None => Err(QueueError::RegistrationFailed),
        }
    }

    /// Move up to `quota` lowest-ranked waiting users into the proceed set
    /// and refresh the proceed key's TTL. Returns the number moved.
    ///
    /// The pop and the inserts are separate atomic store calls, not one
    /// transaction: a crash in between loses the popped members. Promotion
    /// is at-most-once. Concurrent calls are safe because `pop_min` hands
    /// each caller a disjoint batch.
    pub async fn promote(&self, queue: &str, quota: u64) -> Result<u64, QueueError> {
        let popped = self.store.pop_min(&self.keys.wait_key(queue), quota).await?;
        if popped.is_empty() {
            return Ok(0);
        }

        let proceed_key = self.keys.proceed_key(queue);
        let admitted_at = now_secs();
        for entry in &popped {
            self.store
                .add(&proceed_key, &entry.member, admitted_at)
                .await?;
        }
        self.store.expire(&proceed_key, self.proceed_ttl).await?;

        Ok(popped.len() as u64)
    }

    /// Whether the user is currently in the queue's admitted cohort.
    pub async fn is_admitted(&self, queue: &str, user_id: &str) -> Result<bool, QueueError> {
        let rank = self
            .store
            .rank(&self.keys.proceed_key(queue), user_id)
            .await?;
        Ok(rank.is_some())
    }

    /// 1-based position in the wait set, or the `-1` sentinel if absent.
    /// Absence is a normal queryable state, not an error.
    pub async fn rank(&self, queue: &str, user_id: &str) -> Result<i64, QueueError> {
        let rank = self.store.rank(&self.keys.wait_key(queue), user_id).await?;
        Ok(rank.map_or(-1, |r| r as i64 + 1))
    }

    /// Demote-on-check variant: if the user is currently admitted, move them
    /// back to the wait set with a fresh arrival timestamp and report `false`.
    ///
    /// Every call against an admitted user demotes them, so this must stay an
    /// explicitly opted-in entry point and never the default status check.
    pub async fn check_and_requeue(&self, queue: &str, user_id: &str) -> Result<bool, QueueError> {
        let proceed_key = self.keys.proceed_key(queue);
        if self.store.rank(&proceed_key, user_id).await?.is_some() {
            self.store.remove(&proceed_key, user_id).await?;
            self.store
                .add_if_absent(&self.keys.wait_key(queue), user_id, now_secs())
                .await?;
            debug!(queue = %queue, user_id = %user_id, "Requeued admitted user");
        }
        Ok(false)
    }

    /// Refresh the wait key's TTL. The TTL is key-wide: one user's heartbeat
    /// extends the deadline for everyone waiting in the queue. Returns
    /// whether the wait key existed.
    pub async fn heartbeat(&self, queue: &str, _user_id: &str) -> Result<bool, QueueError> {
        let refreshed = self
            .store
            .expire(&self.keys.wait_key(queue), self.wait_ttl)
            .await?;
        Ok(refreshed)
    }

    /// Remove a user from the wait set. A no-op if already absent.
    pub async fn leave(&self, queue: &str, user_id: &str) -> Result<(), QueueError> {
        self.store
            .remove(&self.keys.wait_key(queue), user_id)
            .await?;
        Ok(())
    }
}
