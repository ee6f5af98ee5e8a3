//! InMemory TypingTracker 実装
//!
//! (ルーム, ユーザー) ごとの入力中状態を保持し、バックグラウンドの sweeper が
//! タイムアウトしたエントリを停止させます。
//!
//! 明示的な停止と sweeper は同じロックでエントリを削除し、
//! 実際に削除した側だけがイベントを発行します。

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    DisplayName, DomainEvent, EventPublisher, RoomId, Timestamp, TypingStatus, TypingTracker,
    UserId,
};

/// 入力中状態のデフォルトのタイムアウト
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
struct TypingEntry {
    display_name: DisplayName,
    last_activity: Timestamp,
}

pub struct InMemoryTypingTracker {
    entries: Mutex<HashMap<(RoomId, UserId), TypingEntry>>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    shutdown_token: CancellationToken,
}

impl InMemoryTypingTracker {
    /// sweeper を起動せずに作成する（`sweep_expired` は手動で呼ぶ）
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            publisher,
            clock,
            timeout: timeout.max(Duration::from_millis(1)),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// タイムアウトと同じ間隔で sweeper を起動して作成する
    ///
    /// sweeper は tracker への弱参照だけを持つため、tracker が drop されると停止する。
    pub fn start(
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Arc<Self> {
        let tracker = Arc::new(Self::new(publisher, clock, timeout));
        tokio::spawn(run_sweeper(
            Arc::downgrade(&tracker),
            tracker.shutdown_token.clone(),
            tracker.timeout,
        ));
        tracing::debug!(
            "Typing sweeper started (timeout={}ms)",
            tracker.timeout.as_millis()
        );
        tracker
    }

    /// sweeper を停止する
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    fn is_expired(&self, entry: &TypingEntry, now: Timestamp) -> bool {
        now.millis_since(entry.last_activity) > self.timeout.as_millis() as i64
    }

    fn publish_change(
        &self,
        room_id: RoomId,
        user_id: UserId,
        display_name: DisplayName,
        is_typing: bool,
        at: Timestamp,
    ) {
        self.publisher.publish(DomainEvent::TypingChanged {
            room_id,
            user_id,
            display_name,
            is_typing,
            at,
        });
    }
}

impl Drop for InMemoryTypingTracker {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}

async fn run_sweeper(
    tracker: Weak<InMemoryTypingTracker>,
    shutdown_token: CancellationToken,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_token.cancelled() => {
                tracing::debug!("Typing sweeper shutting down");
                break;
            }
            _ = interval.tick() => {
                let Some(tracker) = tracker.upgrade() else {
                    break;
                };
                let swept = tracker.sweep_expired().await;
                if swept > 0 {
                    tracing::debug!("Typing sweeper expired {} entr(ies)", swept);
                }
            }
        }
    }
}

#[async_trait]
impl TypingTracker for InMemoryTypingTracker {
    async fn start_typing(&self, room_id: &RoomId, user_id: &UserId, display_name: &DisplayName) {
        let now = self.now();
        {
            let mut entries = self.entries.lock().await;
            entries.insert(
                (room_id.clone(), user_id.clone()),
                TypingEntry {
                    display_name: display_name.clone(),
                    last_activity: now,
                },
            );
        }
        self.publish_change(
            room_id.clone(),
            user_id.clone(),
            display_name.clone(),
            true,
            now,
        );
    }

    async fn stop_typing(&self, room_id: &RoomId, user_id: &UserId) -> bool {
        let removed = self
            .entries
            .lock()
            .await
            .remove(&(room_id.clone(), user_id.clone()));

        match removed {
            Some(entry) => {
                self.publish_change(
                    room_id.clone(),
                    user_id.clone(),
                    entry.display_name,
                    false,
                    self.now(),
                );
                true
            }
            None => false,
        }
    }

    async fn status(&self, room_id: &RoomId) -> Vec<TypingStatus> {
        let now = self.now();
        let entries = self.entries.lock().await;
        let mut typing: Vec<TypingStatus> = entries
            .iter()
            .filter(|((room, _), entry)| room == room_id && !self.is_expired(entry, now))
            .map(|((_, user_id), entry)| TypingStatus {
                user_id: user_id.clone(),
                display_name: entry.display_name.clone(),
                started_at: entry.last_activity,
            })
            .collect();
        typing.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        typing
    }

    async fn sweep_expired(&self) -> usize {
        let now = self.now();
        let expired: Vec<((RoomId, UserId), TypingEntry)> = {
            let mut entries = self.entries.lock().await;
            let keys: Vec<(RoomId, UserId)> = entries
                .iter()
                .filter(|(_, entry)| self.is_expired(entry, now))
                .map(|(key, _)| key.clone())
                .collect();
            keys.into_iter()
                .filter_map(|key| entries.remove(&key).map(|entry| (key, entry)))
                .collect()
        };

        let count = expired.len();
        for ((room_id, user_id), entry) in expired {
            self.publish_change(room_id, user_id, entry.display_name, false, now);
        }
        count
    }
}
