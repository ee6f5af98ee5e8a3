//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{HealthResponse, RoomUsersResponse, StatsResponse},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Connections and rooms at this moment
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let snapshot = state.get_online_users_usecase.execute().await;
    Json(StatsResponse::from(snapshot))
}

/// Users in a room (404 when nobody is in it)
pub async fn get_room_users(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomUsersResponse>, StatusCode> {
    match state.get_room_users_usecase.execute(room_id).await {
        Ok((_, users)) if users.is_empty() => Err(StatusCode::NOT_FOUND),
        Ok((room_id, users)) => Ok(Json(RoomUsersResponse::new(&room_id, users))),
        Err(e) => {
            tracing::debug!("Invalid room users request: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}
