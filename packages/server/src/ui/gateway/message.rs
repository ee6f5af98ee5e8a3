//! send-message / update-message / delete-message / get-room-messages
//!
//! いずれもルームへの参加が必要。編集・削除はペイロードの `authorId` が
//! 呼び出し元のユーザーと一致しなければ UseCase に渡さない。

use std::sync::Arc;

use crate::{
    domain::{ConnectionEntry, ConnectionId},
    infrastructure::dto::websocket::{
        DeleteMessageRequest, MessagePayload, RoomMessagesPayload, RoomMessagesRequest,
        SendMessageRequest, ServerEvent, UpdateMessageRequest,
    },
    usecase::{
        DeleteMessageInput, DeleteMessageUseCase, GetRoomMessagesUseCase, RoomError,
        RoomMessagesInput, SendMessageInput, SendMessageUseCase, UpdateMessageInput,
        UpdateMessageUseCase,
    },
};

use super::support::{GatewaySupport, NOT_IN_ROOM};

pub struct MessageGateway {
    support: GatewaySupport,
    send_message: Arc<SendMessageUseCase>,
    update_message: Arc<UpdateMessageUseCase>,
    delete_message: Arc<DeleteMessageUseCase>,
    room_messages: Arc<GetRoomMessagesUseCase>,
}

/// ペイロードの authorId が呼び出し元と異なるか
fn claims_other_author(entry: &ConnectionEntry, author_id: Option<&str>) -> bool {
    author_id
        .filter(|author| !author.trim().is_empty())
        .is_some_and(|author| author != entry.user_id.as_str())
}

impl MessageGateway {
    pub fn new(
        support: GatewaySupport,
        send_message: Arc<SendMessageUseCase>,
        update_message: Arc<UpdateMessageUseCase>,
        delete_message: Arc<DeleteMessageUseCase>,
        room_messages: Arc<GetRoomMessagesUseCase>,
    ) -> Self {
        Self {
            support,
            send_message,
            update_message,
            delete_message,
            room_messages,
        }
    }

    pub async fn send_message(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<SendMessageRequest>(connection_id, "send-message", data)
            .await
        else {
            return;
        };
        let Some(entry) = self
            .support
            .require_membership(connection_id, request.room_id.as_deref(), NOT_IN_ROOM)
            .await
        else {
            return;
        };

        let input = SendMessageInput {
            room_id: request.room_id.unwrap_or_default(),
            content: request.content.unwrap_or_default(),
            author_id: entry.user_id.into_string(),
        };
        if let Err(e) = self.send_message.execute(input).await {
            tracing::warn!("send-message from '{}' failed: {}", connection_id, e);
            self.support.emit_error(connection_id, e).await;
        }
    }

    pub async fn update_message(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<UpdateMessageRequest>(connection_id, "update-message", data)
            .await
        else {
            return;
        };
        let Some(entry) = self
            .support
            .require_membership(connection_id, request.room_id.as_deref(), NOT_IN_ROOM)
            .await
        else {
            return;
        };
        if claims_other_author(&entry, request.author_id.as_deref()) {
            self.support
                .emit_error(connection_id, RoomError::Unauthorized("update"))
                .await;
            return;
        }

        let input = UpdateMessageInput {
            message_id: request.message_id.unwrap_or_default(),
            content: request.content.unwrap_or_default(),
            room_id: request.room_id.unwrap_or_default(),
            author_id: request.author_id.unwrap_or_default(),
        };
        if let Err(e) = self.update_message.execute(input).await {
            tracing::warn!("update-message from '{}' failed: {}", connection_id, e);
            self.support.emit_error(connection_id, e).await;
        }
    }

    pub async fn delete_message(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<DeleteMessageRequest>(connection_id, "delete-message", data)
            .await
        else {
            return;
        };
        let Some(entry) = self
            .support
            .require_membership(connection_id, request.room_id.as_deref(), NOT_IN_ROOM)
            .await
        else {
            return;
        };
        if claims_other_author(&entry, request.author_id.as_deref()) {
            self.support
                .emit_error(connection_id, RoomError::Unauthorized("delete"))
                .await;
            return;
        }

        let input = DeleteMessageInput {
            message_id: request.message_id.unwrap_or_default(),
            room_id: request.room_id.unwrap_or_default(),
            author_id: request.author_id.unwrap_or_default(),
        };
        if let Err(e) = self.delete_message.execute(input).await {
            tracing::warn!("delete-message from '{}' failed: {}", connection_id, e);
            self.support.emit_error(connection_id, e).await;
        }
    }

    pub async fn room_messages(&self, connection_id: &ConnectionId, data: serde_json::Value) {
        let Some(request) = self
            .support
            .parse_payload::<RoomMessagesRequest>(connection_id, "get-room-messages", data)
            .await
        else {
            return;
        };
        if self
            .support
            .require_membership(connection_id, request.room_id.as_deref(), NOT_IN_ROOM)
            .await
            .is_none()
        {
            return;
        }

        let input = RoomMessagesInput {
            room_id: request.room_id.unwrap_or_default(),
            limit: request.limit,
            offset: request.offset,
        };
        match self.room_messages.execute(input).await {
            Ok(history) => {
                let payload = RoomMessagesPayload {
                    room_id: history.room_id.into_string(),
                    messages: history.messages.iter().map(MessagePayload::from).collect(),
                    limit: history.limit,
                    offset: history.offset,
                };
                self.support
                    .emit_to_caller(connection_id, ServerEvent::RoomMessages, &payload)
                    .await;
            }
            Err(e) => self.support.emit_error(connection_id, e).await,
        }
    }
}
