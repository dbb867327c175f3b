use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use application::NotificationPage;
use domain::{Pagination, PresenceRecord, PresenceStatus};

use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct UpdatePresencePayload {
    status: PresenceStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkPresencePayload {
    user_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationsQuery {
    page: Option<u32>,
    limit: Option<u32>,
    unread_only: Option<bool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/presence/update", post(update_presence))
        .route("/presence/me", get(get_my_presence))
        .route("/presence/user/{user_id}", get(get_user_presence))
        .route("/presence/bulk", post(get_bulk_presence))
        .route("/presence/heartbeat", post(heartbeat))
        .route("/presence/offline", post(set_offline))
        .route("/notifications", get(get_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_as_read))
        .route("/notifications/{notification_id}/read", post(mark_as_read))
        .route("/notifications/{notification_id}", delete(delete_notification))
}

async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

async fn update_presence(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdatePresencePayload>,
) -> Result<Json<PresenceRecord>, ApiError> {
    let record = state
        .presence_service
        .update_presence(user.0, payload.status)
        .await?;
    Ok(Json(record))
}

async fn get_my_presence(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PresenceRecord>, ApiError> {
    let record = state.presence_service.get_presence(user.0).await?;
    Ok(Json(record))
}

async fn get_user_presence(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PresenceRecord>, ApiError> {
    let record = state.presence_service.get_presence(user_id).await?;
    Ok(Json(record))
}

async fn get_bulk_presence(
    State(state): State<AppState>,
    Json(payload): Json<BulkPresencePayload>,
) -> Result<Json<Vec<PresenceRecord>>, ApiError> {
    let records = state
        .presence_service
        .get_bulk_presence(&payload.user_ids)
        .await?;
    Ok(Json(records))
}

async fn heartbeat(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<JsonValue>, ApiError> {
    state.presence_service.heartbeat(user.0).await?;
    Ok(Json(json!({ "success": true })))
}

async fn set_offline(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PresenceRecord>, ApiError> {
    let record = state.presence_service.set_offline(user.0).await?;
    Ok(Json(record))
}

async fn get_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<NotificationPage>, ApiError> {
    let pagination = Pagination::new(query.page.unwrap_or(1), query.limit.unwrap_or(20));
    let page = state
        .notification_service
        .get_notifications(user.0, pagination, query.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(page))
}

async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<JsonValue>, ApiError> {
    let count = state.notification_service.unread_count(user.0).await?;
    Ok(Json(json!({ "unreadCount": count })))
}

async fn mark_as_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<domain::Notification>, ApiError> {
    let notification = state
        .notification_service
        .mark_as_read(notification_id, user.0)
        .await?;
    Ok(Json(notification))
}

async fn mark_all_as_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<JsonValue>, ApiError> {
    let count = state.notification_service.mark_all_as_read(user.0).await?;
    Ok(Json(json!({ "markedCount": count })))
}

async fn delete_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<JsonValue>, ApiError> {
    state
        .notification_service
        .delete_notification(notification_id, user.0)
        .await?;
    Ok(Json(json!({ "success": true })))
}
