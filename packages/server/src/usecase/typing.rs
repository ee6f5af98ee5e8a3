//! UseCase: 入力中インジケーター
//!
//! 入力開始・停止・状態取得。表示名は接続のレジストリエントリから取る。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId, TypingStatus, TypingTracker};

use super::error::RoomError;

/// 入力開始のユースケース
pub struct StartTypingUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    typing: Arc<dyn TypingTracker>,
}

impl StartTypingUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, typing: Arc<dyn TypingTracker>) -> Self {
        Self { registry, typing }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
    ) -> Result<(), RoomError> {
        let room_id = RoomId::new(room_id)?;
        let entry = self
            .registry
            .get(connection_id)
            .await
            .ok_or(RoomError::ConnectionNotFound)?;

        self.typing
            .start_typing(&room_id, &entry.user_id, &entry.display_name)
            .await;
        Ok(())
    }
}

/// 入力停止のユースケース
pub struct StopTypingUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    typing: Arc<dyn TypingTracker>,
}

impl StopTypingUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, typing: Arc<dyn TypingTracker>) -> Self {
        Self { registry, typing }
    }

    /// 実際に入力中から停止に遷移した場合は `true`
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
    ) -> Result<bool, RoomError> {
        let room_id = RoomId::new(room_id)?;
        let entry = self
            .registry
            .get(connection_id)
            .await
            .ok_or(RoomError::ConnectionNotFound)?;

        Ok(self.typing.stop_typing(&room_id, &entry.user_id).await)
    }
}

/// 入力中ユーザー一覧のユースケース
pub struct GetTypingStatusUseCase {
    typing: Arc<dyn TypingTracker>,
}

impl GetTypingStatusUseCase {
    pub fn new(typing: Arc<dyn TypingTracker>) -> Self {
        Self { typing }
    }

    pub async fn execute(&self, room_id: String) -> Result<(RoomId, Vec<TypingStatus>), RoomError> {
        let room_id = RoomId::new(room_id)?;
        let status = self.typing.status(&room_id).await;
        Ok((room_id, status))
    }
}
