//! UseCase: プレゼンスの参照
//!
//! ルームの参加者、接続全体のスナップショット、ユーザーの接続確認、
//! ルームのメッセージ履歴を返す。いずれも状態を変更しない。

use std::sync::Arc;

use crate::domain::{
    ConnectionRegistry, MessageRecord, MessageStore, RegistrySnapshot, RoomId, RoomMember, UserId,
};

use super::error::RoomError;

/// 履歴取得のデフォルト件数
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// 履歴取得の最大件数
pub const MAX_HISTORY_LIMIT: usize = 100;

/// ルーム参加者一覧のユースケース
pub struct GetRoomUsersUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetRoomUsersUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, room_id: String) -> Result<(RoomId, Vec<RoomMember>), RoomError> {
        let room_id = RoomId::new(room_id)?;
        let users = self.registry.users_in_room(&room_id).await;
        Ok((room_id, users))
    }
}

/// 接続全体のスナップショットのユースケース
pub struct GetOnlineUsersUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetOnlineUsersUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> RegistrySnapshot {
        self.registry.snapshot().await
    }
}

/// ユーザーの接続確認のユースケース
pub struct CheckUserOnlineUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl CheckUserOnlineUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, user_id: String) -> Result<(UserId, bool), RoomError> {
        let user_id = UserId::new(user_id)?;
        let online = self.registry.is_user_connected(&user_id).await;
        Ok((user_id, online))
    }
}

/// 履歴取得の入力
#[derive(Debug, Clone, Default)]
pub struct RoomMessagesInput {
    pub room_id: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// 履歴取得の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessages {
    pub room_id: RoomId,
    pub messages: Vec<MessageRecord>,
    pub limit: usize,
    pub offset: usize,
}

/// ルームのメッセージ履歴のユースケース
pub struct GetRoomMessagesUseCase {
    store: Arc<dyn MessageStore>,
}

impl GetRoomMessagesUseCase {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// 最新から `offset` 件さかのぼった位置の最大 `limit` 件（1〜100、省略時 50）を古い順に返す
    pub async fn execute(&self, input: RoomMessagesInput) -> Result<RoomMessages, RoomError> {
        let room_id = RoomId::new(input.room_id)?;
        let limit = input
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        let offset = input.offset.unwrap_or(0);

        let messages = self.store.find_by_room(&room_id, limit, offset).await?;
        Ok(RoomMessages {
            room_id,
            messages,
            limit,
            offset,
        })
    }
}
