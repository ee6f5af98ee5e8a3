//! UseCase テスト用のハーネス
//!
//! インメモリ実装一式と、発行されたイベントを受け取る購読者を組み立てる。

use std::sync::Arc;

use hiroba_shared::time::ManualClock;
use tokio::sync::{
    broadcast::{self, error::TryRecvError},
    mpsc,
};

use crate::domain::{
    ConnectionId, ConnectionRegistry, DisplayName, DomainEvent, MessagePusher, RoomId, Timestamp,
    UserId,
};
use crate::infrastructure::{
    BroadcastEventBus, DEFAULT_TYPING_TIMEOUT, InMemoryConnectionRegistry, InMemoryMessageStore,
    InMemoryTypingTracker, WebSocketMessagePusher,
};

pub struct Harness {
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub bus: Arc<BroadcastEventBus>,
    pub typing: Arc<InMemoryTypingTracker>,
    pub store: Arc<InMemoryMessageStore>,
    pub clock: Arc<ManualClock>,
    events: broadcast::Receiver<DomainEvent>,
}

impl Harness {
    pub fn new() -> Self {
        let bus = Arc::new(BroadcastEventBus::new(256));
        let events = bus.subscribe();
        let clock = Arc::new(ManualClock::new(1_000_000));
        Self {
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
            typing: Arc::new(InMemoryTypingTracker::new(
                bus.clone(),
                clock.clone(),
                DEFAULT_TYPING_TIMEOUT,
            )),
            store: Arc::new(InMemoryMessageStore::new(clock.clone())),
            bus,
            clock,
            events,
        }
    }

    /// レジストリと Pusher に接続を登録し、その接続の受信側を返す
    pub async fn connect(&self, connection: &str, user: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry
            .register(
                conn(connection),
                UserId::new(user).unwrap(),
                DisplayName::new(user).unwrap(),
                Timestamp::new(0),
            )
            .await
            .unwrap();
        self.pusher.register_client(conn(connection), tx).await;
        rx
    }

    /// 登録済みの接続をルームに参加させる（イベントは発行しない）
    pub async fn enter(&self, connection: &str, room_id: &str) {
        self.pusher
            .join_group(&conn(connection), &room(room_id))
            .await
            .unwrap();
        assert!(self.registry.join_room(&conn(connection), &room(room_id)).await);
    }

    /// これまでに発行されたイベントを全て取り出す
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut drained = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return drained,
                Err(TryRecvError::Lagged(n)) => panic!("test subscriber lagged by {n}"),
            }
        }
    }
}

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id).unwrap()
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}
