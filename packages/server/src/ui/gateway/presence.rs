//! get-room-users / get-online-users / check-user-online
//!
//! 結果は呼び出し元だけに返す。

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::{
        CheckUserOnlineRequest, RegistrySnapshotDto, RoomRequest, RoomUsersPayload, ServerEvent,
        UserOnlineStatusPayload,
    },
    usecase::{CheckUserOnlineUseCase, GetOnlineUsersUseCase, GetRoomUsersUseCase},
};

use super::support::GatewaySupport;

pub struct PresenceGateway {
    support: GatewaySupport,
    room_users: Arc<GetRoomUsersUseCase>,
    online_users: Arc<GetOnlineUsersUseCase>,
    check_user_online: Arc<CheckUserOnlineUseCase>,
}

impl PresenceGateway {
    pub fn new(
        support: GatewaySupport,
        room_users: Arc<GetRoomUsersUseCase>,
        online_users: Arc<GetOnlineUsersUseCase>,
        check_user_online: Arc<CheckUserOnlineUseCase>,
    ) -> Self {
        Self {
            support,
            room_users,
            online_users,
            check_user_online,
        }
    }

    pub async fn room_users(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<RoomRequest>(connection_id, "get-room-users", data)
            .await
        else {
            return;
        };
        if self.support.require_connection(connection_id).await.is_none() {
            return;
        }

        match self
            .room_users
            .execute(request.room_id.unwrap_or_default())
            .await
        {
            Ok((room_id, users)) => {
                let payload = RoomUsersPayload::new(&room_id, users);
                self.support
                    .emit_to_caller(connection_id, ServerEvent::RoomUsers, &payload)
                    .await;
            }
            Err(e) => self.support.emit_error(connection_id, e).await,
        }
    }

    pub async fn online_users(&self, connection_id: &ConnectionId) {
        if self.support.require_connection(connection_id).await.is_none() {
            return;
        }
        let snapshot = self.online_users.execute().await;
        self.support
            .emit_to_caller(
                connection_id,
                ServerEvent::OnlineUsers,
                &RegistrySnapshotDto::from(snapshot),
            )
            .await;
    }

    pub async fn check_user_online(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<CheckUserOnlineRequest>(connection_id, "check-user-online", data)
            .await
        else {
            return;
        };
        if self.support.require_connection(connection_id).await.is_none() {
            return;
        }

        match self
            .check_user_online
            .execute(request.user_id.unwrap_or_default())
            .await
        {
            Ok((user_id, is_online)) => {
                let payload = UserOnlineStatusPayload {
                    user_id: user_id.into_string(),
                    is_online,
                };
                self.support
                    .emit_to_caller(connection_id, ServerEvent::UserOnlineStatus, &payload)
                    .await;
            }
            Err(e) => self.support.emit_error(connection_id, e).await,
        }
    }
}
