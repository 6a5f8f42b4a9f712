//! HTTP API request and response types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::queue::AdmissionControl;

/// Shared application state.
pub type AppState = Arc<AdmissionControl>;

fn default_queue() -> String {
    "default".to_string()
}

/// Query parameters for registration and status lookups.
#[derive(Deserialize)]
pub struct UserQuery {
    #[serde(default = "default_queue")]
    pub queue: String,
    pub user_id: String,
}

/// Query parameters for the manual promotion endpoint.
#[derive(Deserialize)]
pub struct AllowQuery {
    #[serde(default = "default_queue")]
    pub queue: String,
    pub count: u64,
}

/// JSON body for leave and heartbeat.
#[derive(Deserialize)]
pub struct MemberRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    pub user_id: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    /// 1-based position in the wait queue at registration time.
    pub rank: u64,
}

#[derive(Serialize)]
pub struct AllowResponse {
    pub request_count: u64,
    pub allowed_count: u64,
}

#[derive(Serialize)]
pub struct AllowedResponse {
    pub allowed: bool,
}

#[derive(Serialize)]
pub struct RankResponse {
    /// 1-based wait rank, or -1 if the user is not waiting.
    pub rank: i64,
}
