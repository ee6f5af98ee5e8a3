//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 入力の検証 → メッセージストアへの保存 → message-created の発行
//!
//! ### なぜこのテストが必要か
//! - 不正な入力ではストアが一切呼ばれないことを保証する
//! - 保存に失敗したメッセージが配信されないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存されたレコード（ID・タイムスタンプ）がそのまま発行される
//! - 異常系：本文が空、長すぎる、ストアの障害

use std::sync::Arc;

use crate::domain::{
    DomainEvent, EventPublisher, MessageContent, MessageRecord, MessageStore, NewMessage, RoomId,
    UserId,
};

use super::error::RoomError;

/// メッセージ送信の入力
#[derive(Debug, Clone, Default)]
pub struct SendMessageInput {
    pub room_id: String,
    pub content: String,
    pub author_id: String,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    store: Arc<dyn MessageStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl SendMessageUseCase {
    pub fn new(store: Arc<dyn MessageStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(MessageRecord)` - ストアが採番した ID とタイムスタンプを含むレコード
    /// * `Err(RoomError)` - 検証エラーまたはストアの障害（何も発行されない）
    pub async fn execute(&self, input: SendMessageInput) -> Result<MessageRecord, RoomError> {
        let new_message = NewMessage {
            room_id: RoomId::new(input.room_id)?,
            author_id: UserId::new(input.author_id)?,
            content: MessageContent::new(input.content)?,
        };

        let record = self.store.create(new_message).await?;

        self.publisher.publish(DomainEvent::MessageCreated(record.clone()));
        tracing::debug!(
            "Message '{}' sent by '{}' to room '{}'",
            record.id,
            record.author_id,
            record.room_id
        );
        Ok(record)
    }
}
