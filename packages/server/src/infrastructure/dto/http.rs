//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

pub use super::websocket::{
    RegistrySnapshotDto as StatsResponse, RoomUsersPayload as RoomUsersResponse,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
