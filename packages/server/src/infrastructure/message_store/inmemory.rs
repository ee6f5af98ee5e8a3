//! InMemory MessageStore 実装
//!
//! 削除は論理削除。ルーム単位の取得は作成順（古い順）で、論理削除済みは除外する。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    MessageId, MessageRecord, MessageStore, MessageUpdate, NewMessage, RoomId, StoreError,
    Timestamp,
};

#[derive(Default)]
struct StoreState {
    messages: HashMap<MessageId, MessageRecord>,
    /// 作成順の ID
    order: Vec<MessageId>,
}

pub struct InMemoryMessageStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    fn new_id() -> Result<MessageId, StoreError> {
        MessageId::new(Uuid::new_v4().to_string())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: NewMessage) -> Result<MessageRecord, StoreError> {
        let now = self.now();
        let record = MessageRecord {
            id: Self::new_id()?,
            content: message.content,
            author_id: message.author_id,
            room_id: message.room_id,
            created_at: now,
            updated_at: now,
            edited_at: None,
            deleted_at: None,
        };

        let mut state = self.state.lock().await;
        state.order.push(record.id.clone());
        state.messages.insert(record.id.clone(), record.clone());
        tracing::debug!("Message '{}' stored in room '{}'", record.id, record.room_id);
        Ok(record)
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<MessageRecord>, StoreError> {
        Ok(self.state.lock().await.messages.get(id).cloned())
    }

    async fn update(
        &self,
        id: &MessageId,
        update: MessageUpdate,
    ) -> Result<MessageRecord, StoreError> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let record = state
            .messages
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.as_str().to_string()))?;

        if let Some(content) = update.content {
            record.content = content;
        }
        if let Some(edited_at) = update.edited_at {
            record.edited_at = Some(edited_at);
        }
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn delete(&self, id: &MessageId) -> Result<MessageRecord, StoreError> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let record = state
            .messages
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.as_str().to_string()))?;

        record.deleted_at = Some(now);
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn find_by_room(
        &self,
        room_id: &RoomId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        let state = self.state.lock().await;
        // offset は最新のメッセージから数える。ページ内は古い順に返す
        let mut page: Vec<MessageRecord> = state
            .order
            .iter()
            .rev()
            .filter_map(|id| state.messages.get(id))
            .filter(|record| &record.room_id == room_id && !record.is_deleted())
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        page.reverse();
        Ok(page)
    }
}
