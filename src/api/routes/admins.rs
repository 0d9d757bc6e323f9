//! Admin Console Routes
//!
//! - GET /api/v1/admins?q= - List admins, filtered by address substring
//! - POST /api/v1/admins - Grant admin rights
//! - DELETE /api/v1/admins/:address - Revoke admin rights
//! - POST /api/v1/admins/:address/check - Check admin status
//! - GET /api/v1/admins/activity - Activity log, newest first
//! - POST /api/v1/creator/transfer - Transfer the creator role
//!
//! Successful actions are pushed to `admin.activity` subscribers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::admin::{ActivityEntry, Admin};
use crate::api::dto::{
    ActivityResponse, AddressRequest, AdminCheckResponse, AdminListQuery, AdminListResponse,
    AdminRemovedResponse, CreatorResponse,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::websocket::WsEvent;

/// GET /api/v1/admins
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminListQuery>,
) -> Json<AdminListResponse> {
    let admins = state.admins.list(query.q.as_deref()).await;

    Json(AdminListResponse {
        total: admins.len(),
        admins,
    })
}

/// POST /api/v1/admins
pub async fn add_admin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddressRequest>,
) -> ApiResult<(StatusCode, Json<Admin>)> {
    let (admin, entry) = state.admins.add_admin(&req.address).await?;
    publish_activity(&state, entry);

    Ok((StatusCode::CREATED, Json(admin)))
}

/// DELETE /api/v1/admins/:address
pub async fn remove_admin(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<AdminRemovedResponse>> {
    let (removed, entry) = state.admins.remove_admin(&address).await?;
    publish_activity(&state, entry);

    Ok(Json(AdminRemovedResponse { address, removed }))
}

/// POST /api/v1/admins/:address/check
pub async fn check_admin(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<AdminCheckResponse>> {
    let (is_admin, entry) = state.admins.check_admin(&address).await?;
    publish_activity(&state, entry);

    Ok(Json(AdminCheckResponse { address, is_admin }))
}

/// POST /api/v1/creator/transfer
pub async fn transfer_creator(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddressRequest>,
) -> ApiResult<Json<CreatorResponse>> {
    let (creator, entry) = state.admins.transfer_creator(&req.address).await?;
    publish_activity(&state, entry);

    Ok(Json(CreatorResponse { creator }))
}

/// GET /api/v1/admins/activity
pub async fn list_activity(State(state): State<Arc<AppState>>) -> Json<ActivityResponse> {
    let entries = state.admins.activity().await;

    Json(ActivityResponse {
        total: entries.len(),
        entries,
    })
}

fn publish_activity(state: &AppState, entry: ActivityEntry) {
    state.ws_hub.publish(WsEvent::admin_activity(entry));
}
