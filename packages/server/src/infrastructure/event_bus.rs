//! broadcast チャンネルを使った EventPublisher 実装
//!
//! 状態の変更（UseCase）と配信（Notifier）を分離する。
//! 発行はブロックせず、購読者がいない場合の失敗はログに残して握りつぶす。

use tokio::sync::broadcast;

use crate::domain::{DomainEvent, EventPublisher};

/// デフォルトのチャンネル容量
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher for BroadcastEventBus {
    fn publish(&self, event: DomainEvent) {
        let tag = event.tag();
        let room_id = event.room_id().clone();
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(
                "Published '{}' for room '{}' to {} subscriber(s)",
                tag,
                room_id,
                receivers
            ),
            Err(_) => tracing::warn!(
                "Dropped '{}' for room '{}': no active subscribers",
                tag,
                room_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, RoomId, UserId};

    fn joined(room: &str) -> DomainEvent {
        DomainEvent::UserJoinedRoom {
            room_id: RoomId::new(room).unwrap(),
            user_id: UserId::new("alice").unwrap(),
            display_name: DisplayName::new("Alice").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        // テスト項目: 発行したイベントが全ての購読者に届く
        // given (前提条件):
        let bus = BroadcastEventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        // when (操作):
        bus.publish(joined("r1"));

        // then (期待する結果):
        assert_eq!(first.recv().await.unwrap(), joined("r1"));
        assert_eq!(second.recv().await.unwrap(), joined("r1"));
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        // テスト項目: 購読者がいなくても発行は失敗扱いにならない
        // given (前提条件):
        let bus = BroadcastEventBus::new(4);

        // when (操作):
        bus.publish(joined("r1"));

        // then (期待する結果):
        assert_eq!(bus.subscriber_count(), 0);
    }
}
