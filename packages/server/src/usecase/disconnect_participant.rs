//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加中の全ルームからの退出 → レジストリから削除 → Pusher から登録解除
//!
//! ### なぜこのテストが必要か
//! - 突然の切断でも、参加していたルームごとに 1 回ずつ退出が通知され、
//!   どのルームにも接続が残らないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数ルームに参加した接続の切断
//! - 異常系：1 つのルームの退出に失敗しても残りのルームは退出し、接続は削除される
//! - エッジケース：未登録の接続の切断（何もしない）

use std::sync::Arc;

use crate::domain::{ConnectionEntry, ConnectionId, ConnectionRegistry, MessagePusher, RoomId};

use super::leave_room::LeaveRoomUseCase;

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectSummary {
    pub entry: ConnectionEntry,
    /// 退出できたルーム
    pub rooms_left: Vec<RoomId>,
}

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    leave_room: Arc<LeaveRoomUseCase>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        leave_room: Arc<LeaveRoomUseCase>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            leave_room,
        }
    }

    /// 切断を実行
    ///
    /// 1 つのルームの退出に失敗しても、残りのルームの処理は続ける。
    /// 未登録の接続なら `None`。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<DisconnectSummary> {
        let Some(rooms) = self.registry.rooms_of(connection_id).await else {
            tracing::debug!("Disconnect of unknown connection '{}'", connection_id);
            return None;
        };

        // 1. 参加中の全ルームから退出
        let mut rooms: Vec<RoomId> = rooms.into_iter().collect();
        rooms.sort();
        let mut rooms_left = Vec::with_capacity(rooms.len());
        for room_id in rooms {
            match self.leave_room.leave(connection_id, &room_id).await {
                Ok(_) => rooms_left.push(room_id),
                Err(e) => tracing::warn!(
                    "Failed to leave room '{}' while disconnecting '{}': {}",
                    room_id,
                    connection_id,
                    e
                ),
            }
        }

        // 2. レジストリから削除
        let entry = self.registry.remove(connection_id).await?;

        // 3. Pusher から登録解除
        self.message_pusher.unregister_client(connection_id).await;

        tracing::info!(
            "User '{}' ({}) disconnected, left {} room(s)",
            entry.user_id,
            connection_id,
            rooms_left.len()
        );
        Some(DisconnectSummary { entry, rooms_left })
    }
}
