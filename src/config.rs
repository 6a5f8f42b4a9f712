//! Environment-driven configuration.

use std::str::FromStr;
use std::time::Duration;

use crate::queue::QuotaPolicy;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_NAMESPACE: &str = "user_queue";
const DEFAULT_TICK_SECS: u64 = 10;
const DEFAULT_QUOTA: u64 = 1;
const DEFAULT_ADAPTIVE_CAPACITY: u64 = 10;
const DEFAULT_PROCEED_TTL_SECS: u64 = 600;
const DEFAULT_WAIT_TTL_SECS: u64 = 10;

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Key namespace; every store key is `<namespace>:<queue>:<suffix>`.
    pub namespace: String,
    pub tick_interval: Duration,
    pub quota_policy: QuotaPolicy,
    /// TTL set on a queue's proceed key after each promotion.
    pub proceed_ttl: Duration,
    /// TTL set on a queue's wait key by each heartbeat.
    pub wait_ttl: Duration,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// - `HTTP_PORT` (default 8080)
    /// - `QUEUE_NAMESPACE` (default `user_queue`)
    /// - `TICK_INTERVAL_SECS` (default 10)
    /// - `PROMOTE_QUOTA` fixed quota per tick per queue (default 1)
    /// - `ADAPTIVE_QUOTA` set to `1`/`true` for the load-adaptive policy
    /// - `ADAPTIVE_CAPACITY` max burst under the adaptive policy (default 10)
    /// - `PROCEED_TTL_SECS` (default 600)
    /// - `WAIT_TTL_SECS` (default 10)
    pub fn from_env() -> Self {
        let quota_policy = if env_flag("ADAPTIVE_QUOTA") {
            QuotaPolicy::Adaptive {
                capacity: env_parse("ADAPTIVE_CAPACITY", DEFAULT_ADAPTIVE_CAPACITY),
            }
        } else {
            QuotaPolicy::Fixed(env_parse("PROMOTE_QUOTA", DEFAULT_QUOTA))
        };

        Self {
            http_port: env_parse("HTTP_PORT", DEFAULT_HTTP_PORT),
            namespace: std::env::var("QUEUE_NAMESPACE")
                .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string()),
            tick_interval: Duration::from_secs(env_parse("TICK_INTERVAL_SECS", DEFAULT_TICK_SECS)),
            quota_policy,
            proceed_ttl: Duration::from_secs(env_parse(
                "PROCEED_TTL_SECS",
                DEFAULT_PROCEED_TTL_SECS,
            )),
            wait_ttl: Duration::from_secs(env_parse("WAIT_TTL_SECS", DEFAULT_WAIT_TTL_SECS)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            namespace: DEFAULT_NAMESPACE.to_string(),
            tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
            quota_policy: QuotaPolicy::Fixed(DEFAULT_QUOTA),
            proceed_ttl: Duration::from_secs(DEFAULT_PROCEED_TTL_SECS),
            wait_ttl: Duration::from_secs(DEFAULT_WAIT_TTL_SECS),
        }
    }
}
