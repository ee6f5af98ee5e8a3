//! UseCase: メッセージ編集処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateMessageUseCase::execute() メソッド
//! - 取得 → 存在・所有者の確認 → 編集日時を付けて保存 → message-updated の発行
//!
//! ### なぜこのテストが必要か
//! - 所有者以外による編集が、書き込み前に拒否されることを保証する

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    DomainEvent, EventPublisher, MessageContent, MessageId, MessageRecord, MessageStore,
    MessageUpdate, RoomId, Timestamp, UserId,
};

use super::error::RoomError;

/// メッセージ編集の入力
#[derive(Debug, Clone, Default)]
pub struct UpdateMessageInput {
    pub message_id: String,
    pub content: String,
    pub room_id: String,
    pub author_id: String,
}

/// メッセージ編集のユースケース
pub struct UpdateMessageUseCase {
    store: Arc<dyn MessageStore>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl UpdateMessageUseCase {
    pub fn new(
        store: Arc<dyn MessageStore>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            publisher,
            clock,
        }
    }

    pub async fn execute(&self, input: UpdateMessageInput) -> Result<MessageRecord, RoomError> {
        let message_id = MessageId::new(input.message_id)?;
        let content = MessageContent::new(input.content)?;
        let room_id = RoomId::new(input.room_id)?;
        let author_id = UserId::new(input.author_id)?;

        let existing = find_owned_message(
            self.store.as_ref(),
            &message_id,
            &room_id,
            &author_id,
            "update",
        )
        .await?;

        let update = MessageUpdate {
            content: Some(content),
            edited_at: Some(Timestamp::new(self.clock.now_millis())),
        };
        let updated = self.store.update(&existing.id, update).await?;

        self.publisher.publish(DomainEvent::MessageUpdated(updated.clone()));
        tracing::debug!("Message '{}' updated by '{}'", updated.id, author_id);
        Ok(updated)
    }
}

/// メッセージを取得し、ルームと所有者を確認する
///
/// 存在しない・論理削除済み・別ルームのメッセージは NotFound。
pub(crate) async fn find_owned_message(
    store: &dyn MessageStore,
    message_id: &MessageId,
    room_id: &RoomId,
    author_id: &UserId,
    action: &'static str,
) -> Result<MessageRecord, RoomError> {
    let record = store
        .find_by_id(message_id)
        .await?
        .filter(|record| !record.is_deleted() && &record.room_id == room_id)
        .ok_or(RoomError::MessageNotFound)?;

    if &record.author_id != author_id {
        tracing::warn!(
            "User '{}' tried to {} message '{}' owned by '{}'",
            author_id,
            action,
            message_id,
            record.author_id
        );
        return Err(RoomError::Unauthorized(action));
    }
    Ok(record)
}
