//! Periodic throttle scheduler.
//!
//! A background control loop that discovers active queues by scanning wait
//! keys and promotes waiting users per queue. Ticks are coalesced: a tick
//! runs inline in the loop and the interval re-arms on the wall clock, while
//! the per-queue fan-out inside a tick runs concurrently with a cap.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use super::admission::AdmissionControl;
use super::keys::KeySpace;
use super::load;
use crate::store::OrderedSetStore;

/// Max queues promoted concurrently within one tick.
const PROMOTE_CONCURRENCY: usize = 8;

/// How many users a single promotion may move per tick per queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuotaPolicy {
    /// Constant quota.
    Fixed(u64),
    /// Quota shrinks as system load rises: `max(1, capacity * (1 - load))`.
    Adaptive { capacity: u64 },
}

impl QuotaPolicy {
    /// Resolve the quota for the current tick.
    pub fn quota(&self) -> u64 {
        match self {
            QuotaPolicy::Fixed(n) => (*n).max(1),
            QuotaPolicy::Adaptive { capacity } => adaptive_quota(*capacity, load::load_rate()),
        }
    }
}

pub(crate) fn adaptive_quota(capacity: u64, load_rate: f64) -> u64 {
    let load = load_rate.clamp(0.0, 1.0);
    let quota = (capacity as f64 * (1.0 - load)).floor();
    (quota as u64).max(1)
}

pub struct ThrottleScheduler {
    admission: Arc<AdmissionControl>,
    store: Arc<dyn OrderedSetStore>,
    keys: KeySpace,
    tick_interval: Duration,
    policy: QuotaPolicy,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ThrottleScheduler {
    pub fn new(
        admission: Arc<AdmissionControl>,
        store: Arc<dyn OrderedSetStore>,
        keys: KeySpace,
        tick_interval: Duration,
        policy: QuotaPolicy,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            admission,
            store,
            keys,
            tick_interval,
            policy,
            shutdown_rx,
        }
    }

    /// Run the scheduler loop until shutdown. An in-flight tick always
    /// finishes before the loop observes the shutdown signal.
    pub async fn run(mut self) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.tick_interval.as_secs(),
            policy = ?self.policy,
            "Throttle scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Throttle scheduler stopped");
                    return;
                }
            }
        }
    }

    /// One scheduler tick: discover queues, resolve the quota once, promote
    /// each queue. A failing queue is logged and never aborts the tick for
    /// the remaining queues.
    pub(crate) async fn tick(&self) {
        let pattern = self.keys.wait_scan_pattern();
        let wait_keys = match self.store.scan_keys(&pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Queue discovery scan failed, skipping tick");
                return;
            }
        };

        let queues: Vec<String> = wait_keys
            .iter()
            .filter_map(|key| self.keys.queue_from_wait_key(key))
            .map(str::to_string)
            .collect();
        if queues.is_empty() {
            return;
        }

        let quota = self.policy.quota();

        stream::iter(queues)
            .for_each_concurrent(PROMOTE_CONCURRENCY, |queue| {
                let admission = Arc::clone(&self.admission);
                async move {
                    match admission.promote(&queue, quota).await {
                        Ok(0) => {}
                        Ok(moved) => {
                            info!(queue = %queue, moved, quota, "Promoted waiting users");
                        }
                        Err(e) => {
                            warn!(queue = %queue, error = %e, "Promotion failed, continuing with remaining queues");
                        }
                    }
                }
            })
            .await;
    }
}
