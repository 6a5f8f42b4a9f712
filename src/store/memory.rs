//! In-process ordered-set store.
//!
//! Backed by a `DashMap` keyed by set name; every trait call acquires a
//! single entry guard, which makes each call atomic per key. Key TTLs are
//! tracked as deadlines and evicted lazily on access, so expiry is visible
//! to the next caller without a background sweeper.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{OrderedSetStore, ScoredMember, StoreError};

/// One ordered set: member -> score plus an ordered index for rank queries.
/// Ordering is ascending `(score, member)`, so ties break lexicographically.
#[derive(Default)]
struct SortedSet {
    scores: HashMap<String, u64>,
    ordered: BTreeSet<(u64, String)>,
}

impl SortedSet {
    fn contains(&self, member: &str) -> bool {
        self.scores.contains_key(member)
    }

    /// Returns `true` iff the member was newly inserted.
    fn insert(&mut self, member: &str, score: u64) -> bool {
        match self.scores.insert(member.to_string(), score) {
            Some(old) => {
                self.ordered.remove(&(old, member.to_string()));
                self.ordered.insert((score, member.to_string()));
                false
            }
            None => {
                self.ordered.insert((score, member.to_string()));
                true
            }
        }
    }

    fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.ordered.remove(&(score, member.to_string()));
                true
            }
            None => false,
        }
    }

    fn rank(&self, member: &str) -> Option<u64> {
        let score = *self.scores.get(member)?;
        self.ordered
            .iter()
            .position(|(s, m)| *s == score && m == member)
            .map(|pos| pos as u64)
    }

    fn pop_min(&mut self, count: usize) -> Vec<ScoredMember> {
        let mut popped = Vec::with_capacity(count.min(self.ordered.len()));
        while popped.len() < count {
            let Some((score, member)) = self.ordered.pop_first() else {
                break;
            };
            self.scores.remove(&member);
            popped.push(ScoredMember { member, score });
        }
        popped
    }

    fn len(&self) -> usize {
        self.scores.len()
    }

    fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Default)]
struct Entry {
    set: SortedSet,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

/// Glob matcher supporting the `*` wildcard only, which is all the key
/// layout uses (`<ns>:*:wait`).
fn glob_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == text;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let mut rest = text;
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return part.is_empty() || rest.ends_with(part);
        } else if !part.is_empty() {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

/// In-memory ordered-set store.
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Drop the key if its TTL has lapsed. Called at the top of every
    /// operation so expiry is observed before the key is touched.
    fn purge_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, e| e.is_expired(now));
    }

    /// Drop the key if its set became empty; a queue exists implicitly only
    /// while one of its sets is non-empty.
    fn drop_if_empty(&self, key: &str) {
        self.entries.remove_if(key, |_, e| e.set.is_empty());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderedSetStore for MemoryStore {
    async fn rank(&self, key: &str, member: &str) -> Result<Option<u64>, StoreError> {
        self.purge_expired(key);
        Ok(self.entries.get(key).and_then(|e| e.set.rank(member)))
    }

    async fn add_if_absent(
        &self,
        key: &str,
        member: &str,
        score: u64,
    ) -> Result<bool, StoreError> {
        self.purge_expired(key);
        let mut entry = self.entries.entry(key.to_string()).or_default();
        if entry.set.contains(member) {
            return Ok(false);
        }
        entry.set.insert(member, score);
        Ok(true)
    }

    async fn add(&self, key: &str, member: &str, score: u64) -> Result<bool, StoreError> {
        self.purge_expired(key);
        let mut entry = self.entries.entry(key.to_string()).or_default();
        Ok(entry.set.insert(member, score))
    }

    async fn pop_min(&self, key: &str, count: u64) -> Result<Vec<ScoredMember>, StoreError> {
        self.purge_expired(key);
        let popped = match self.entries.get_mut(key) {
            Some(mut entry) => entry.set.pop_min(count as usize),
            None => Vec::new(),
        };
        self.drop_if_empty(key);
        Ok(popped)
    }

    async fn remove(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.purge_expired(key);
        let removed = match self.entries.get_mut(key) {
            Some(mut entry) => entry.set.remove(member),
            None => false,
        };
        self.drop_if_empty(key);
        Ok(removed)
    }

    async fn card(&self, key: &str) -> Result<u64, StoreError> {
        self.purge_expired(key);
        Ok(self.entries.get(key).map_or(0, |e| e.set.len() as u64))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.deadline = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|e| !e.value().is_expired(now) && glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect())
    }
}
