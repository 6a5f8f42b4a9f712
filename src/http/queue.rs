//! Waiting-queue HTTP handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::types::{
    AllowQuery, AllowResponse, AllowedResponse, AppState, MemberRequest, RankResponse,
    RegisterResponse, UserQuery,
};
use crate::error::QueueError;

/// Register a user in the wait queue. Fails with 409 if already registered.
pub async fn register(
    State(admission): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<RegisterResponse>, QueueError> {
    let rank = admission.register(&params.queue, &params.user_id).await?;
    Ok(Json(RegisterResponse { rank }))
}

/// Manually promote up to `count` waiting users.
pub async fn allow(
    State(admission): State<AppState>,
    Query(params): Query<AllowQuery>,
) -> Result<Json<AllowResponse>, QueueError> {
    let allowed_count = admission.promote(&params.queue, params.count).await?;
    Ok(Json(AllowResponse {
        request_count: params.count,
        allowed_count,
    }))
}

/// Whether the user is currently admitted.
pub async fn allowed(
    State(admission): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<AllowedResponse>, QueueError> {
    let allowed = admission.is_admitted(&params.queue, &params.user_id).await?;
    Ok(Json(AllowedResponse { allowed }))
}

/// Current wait rank (1-based), or -1 if not waiting.
pub async fn rank(
    State(admission): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<RankResponse>, QueueError> {
    let rank = admission.rank(&params.queue, &params.user_id).await?;
    Ok(Json(RankResponse { rank }))
}

/// Remove a user from the wait queue. Succeeds even if already absent.
pub async fn leave(
    State(admission): State<AppState>,
    Json(req): Json<MemberRequest>,
) -> Result<StatusCode, QueueError> {
    admission.leave(&req.queue, &req.user_id).await?;
    Ok(StatusCode::OK)
}

/// Refresh the wait queue's liveness TTL.
pub async fn heartbeat(
    State(admission): State<AppState>,
    Json(req): Json<MemberRequest>,
) -> Result<StatusCode, QueueError> {
    admission.heartbeat(&req.queue, &req.user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
