//! typing-start / typing-stop / get-typing-status

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::{RoomRequest, ServerEvent, TypingStatusPayload},
    usecase::{GetTypingStatusUseCase, StartTypingUseCase, StopTypingUseCase},
};

use super::support::{GatewaySupport, NOT_IN_ROOM_TYPING};

pub struct TypingGateway {
    support: GatewaySupport,
    start_typing: Arc<StartTypingUseCase>,
    stop_typing: Arc<StopTypingUseCase>,
    typing_status: Arc<GetTypingStatusUseCase>,
}

impl TypingGateway {
    pub fn new(
        support: GatewaySupport,
        start_typing: Arc<StartTypingUseCase>,
        stop_typing: Arc<StopTypingUseCase>,
        typing_status: Arc<GetTypingStatusUseCase>,
    ) -> Self {
        Self {
            support,
            start_typing,
            stop_typing,
            typing_status,
        }
    }

    /// ルームに参加していればルーム ID を返す
    async fn member_room(
        &self,
        connection_id: &ConnectionId,
        event: &str,
        data: serde_json::Value,
    ) -> Option<String> {
        let request = self
            .support
            .parse_payload::<RoomRequest>(connection_id, event, data)
            .await?;
        self.support
            .require_membership(connection_id, request.room_id.as_deref(), NOT_IN_ROOM_TYPING)
            .await?;
        request.room_id
    }

    pub async fn start_typing(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(room_id) = self.member_room(connection_id, "typing-start", data).await else {
            return;
        };
        if let Err(e) = self.start_typing.execute(connection_id, room_id).await {
            self.support.emit_error(connection_id, e).await;
        }
    }

    pub async fn stop_typing(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(room_id) = self.member_room(connection_id, "typing-stop", data).await else {
            return;
        };
        if let Err(e) = self.stop_typing.execute(connection_id, room_id).await {
            self.support.emit_error(connection_id, e).await;
        }
    }

    pub async fn typing_status(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(room_id) = self
            .member_room(connection_id, "get-typing-status", data)
            .await
        else {
            return;
        };
        match self.typing_status.execute(room_id).await {
            Ok((room_id, users)) => {
                let payload = TypingStatusPayload {
                    room_id: room_id.into_string(),
                    users: users.into_iter().map(Into::into).collect(),
                };
                self.support
                    .emit_to_caller(connection_id, ServerEvent::TypingStatus, &payload)
                    .await;
            }
            Err(e) => self.support.emit_error(connection_id, e).await,
        }
    }
}
