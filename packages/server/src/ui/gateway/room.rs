//! join-room / leave-room

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::RoomRequest,
    usecase::{JoinRoomInput, JoinRoomUseCase, LeaveRoomUseCase},
};

use super::support::GatewaySupport;

pub struct RoomGateway {
    support: GatewaySupport,
    join_room: Arc<JoinRoomUseCase>,
    leave_room: Arc<LeaveRoomUseCase>,
}

impl RoomGateway {
    pub fn new(
        support: GatewaySupport,
        join_room: Arc<JoinRoomUseCase>,
        leave_room: Arc<LeaveRoomUseCase>,
    ) -> Self {
        Self {
            support,
            join_room,
            leave_room,
        }
    }

    pub async fn join_room(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<RoomRequest>(connection_id, "join-room", data)
            .await
        else {
            return;
        };

        let input = JoinRoomInput {
            room_id: request.room_id.unwrap_or_default(),
            username: request.username,
        };
        if let Err(e) = self.join_room.execute(connection_id, input).await {
            tracing::warn!("join-room from '{}' failed: {}", connection_id, e);
            self.support.emit_error(connection_id, e).await;
        }
    }

    pub async fn leave_room(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<RoomRequest>(connection_id, "leave-room", data)
            .await
        else {
            return;
        };

        if let Err(e) = self
            .leave_room
            .execute(connection_id, request.room_id.unwrap_or_default())
            .await
        {
            tracing::warn!("leave-room from '{}' failed: {}", connection_id, e);
            self.support.emit_error(connection_id, e).await;
        }
    }
}
