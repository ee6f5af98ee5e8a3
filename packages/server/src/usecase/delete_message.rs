//! UseCase: メッセージ削除処理
//!
//! 論理削除。所有者の確認は編集と同じく書き込みの前に行う。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    DomainEvent, EventPublisher, MessageId, MessageRecord, MessageStore, RoomId, Timestamp,
    UserId,
};

use super::{error::RoomError, update_message::find_owned_message};

/// メッセージ削除の入力
#[derive(Debug, Clone, Default)]
pub struct DeleteMessageInput {
    pub message_id: String,
    pub room_id: String,
    pub author_id: String,
}

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    store: Arc<dyn MessageStore>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl DeleteMessageUseCase {
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

    pub async fn execute(&self, input: DeleteMessageInput) -> Result<MessageRecord, RoomError> {
        let message_id = MessageId::new(input.message_id)?;
        let room_id = RoomId::new(input.room_id)?;
        let author_id = UserId::new(input.author_id)?;

        find_owned_message(
            self.store.as_ref(),
            &message_id,
            &room_id,
            &author_id,
            "delete",
        )
        .await?;

        let deleted = self.store.delete(&message_id).await?;
        let deleted_at = deleted
            .deleted_at
            .unwrap_or_else(|| Timestamp::new(self.clock.now_millis()));

        self.publisher.publish(DomainEvent::MessageDeleted {
            message_id: deleted.id.clone(),
            room_id: deleted.room_id.clone(),
            author_id: deleted.author_id.clone(),
            deleted_at,
        });
        tracing::debug!("Message '{}' deleted by '{}'", deleted.id, author_id);
        Ok(deleted)
    }
}
