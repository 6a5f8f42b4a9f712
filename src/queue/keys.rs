//! Storage key construction.
//!
//! All key templates live here so the layout cannot drift across call sites.
//! Layout: `<namespace>:<queue>:wait` and `<namespace>:<queue>:proceed`.

const WAIT_SUFFIX: &str = "wait";
const PROCEED_SUFFIX: &str = "proceed";

/// Resolves a logical queue name into its two store keys. Pure and stateless.
#[derive(Debug, Clone)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn wait_key(&self, queue: &str) -> String {
        format!("{}:{}:{}", self.namespace, queue, WAIT_SUFFIX)
    }

    pub fn proceed_key(&self, queue: &str) -> String {
        format!("{}:{}:{}", self.namespace, queue, PROCEED_SUFFIX)
    }

    /// Scan pattern matching every queue's wait key.
    pub fn wait_scan_pattern(&self) -> String {
        format!("{}:*:{}", self.namespace, WAIT_SUFFIX)
    }

    /// Inverse of [`wait_key`](Self::wait_key), used by the scheduler to
    /// recover queue names from scanned keys.
    pub fn queue_from_wait_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.namespace.as_str())?
            .strip_prefix(':')?
            .strip_suffix(WAIT_SUFFIX)?
            .strip_suffix(':')
    }
}
