//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() / leave()
//! - グループからの退出 → レジストリからの退出 → user-left-room の発行 → 入力中の停止
//!
//! ### なぜこのテストが必要か
//! - 退出したユーザーの入力中表示が残らないことを保証する
//! - 参加していないルームからの退出で何も発行されないことを保証する

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DomainEvent, EventPublisher, MessagePusher, RoomId,
    RoomMember, TypingTracker,
};

use super::error::RoomError;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    publisher: Arc<dyn EventPublisher>,
    typing: Arc<dyn TypingTracker>,
}

impl LeaveRoomUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        publisher: Arc<dyn EventPublisher>,
        typing: Arc<dyn TypingTracker>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            publisher,
            typing,
        }
    }

    /// ルーム退出を実行（ルーム ID の検証を含む）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
    ) -> Result<RoomMember, RoomError> {
        let room_id = RoomId::new(room_id)?;
        self.leave(connection_id, &room_id).await
    }

    /// 検証済みのルーム ID で退出する（切断時の後始末でも使う）
    pub async fn leave(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<RoomMember, RoomError> {
        let entry = self
            .registry
            .get(connection_id)
            .await
            .ok_or(RoomError::ConnectionNotFound)?;
        if !entry.is_in_room(room_id) {
            return Err(RoomError::NotInRoom);
        }

        // 1. トランスポートのグループから外す
        if let Err(e) = self.message_pusher.leave_group(connection_id, room_id).await {
            tracing::warn!(
                "Failed to remove '{}' from group '{}': {}",
                connection_id,
                room_id,
                e
            );
        }

        // 2. レジストリから退出
        if !self.registry.leave_room(connection_id, room_id).await {
            return Err(RoomError::NotInRoom);
        }

        // 3. 発行
        let member = entry.as_member();
        self.publisher.publish(DomainEvent::UserLeftRoom {
            room_id: room_id.clone(),
            user_id: member.user_id.clone(),
            display_name: member.display_name.clone(),
        });
        tracing::info!(
            "User '{}' ({}) left room '{}'",
            member.user_id,
            connection_id,
            room_id
        );

        // 4. 入力中なら停止させる
        self.typing.stop_typing(room_id, &member.user_id).await;

        Ok(member)
    }
}
