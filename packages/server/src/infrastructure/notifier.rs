//! Notifier
//!
//! EventBus を購読し、ドメインイベントを対象ルームの全接続に配信する唯一の購読者。
//! 配信の失敗はログに残すだけで、発行元の処理には影響しない。

use std::sync::Arc;

use tokio::{sync::broadcast, task::JoinHandle};

use crate::domain::{DomainEvent, MessagePusher};
use crate::infrastructure::dto::conversion::domain_event_frame;

pub struct Notifier {
    pusher: Arc<dyn MessagePusher>,
}

impl Notifier {
    pub fn new(pusher: Arc<dyn MessagePusher>) -> Self {
        Self { pusher }
    }

    /// 1 件のイベントをルームに配信する
    pub async fn deliver(&self, event: &DomainEvent) {
        let frame = match domain_event_frame(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode '{}' event: {}", event.tag(), e);
                return;
            }
        };

        match self.pusher.broadcast_to_group(event.room_id(), &frame).await {
            Ok(delivered) => tracing::debug!(
                "Delivered '{}' to {} connection(s) in room '{}'",
                event.tag(),
                delivered,
                event.room_id()
            ),
            Err(e) => tracing::warn!(
                "Failed to deliver '{}' to room '{}': {}",
                event.tag(),
                event.room_id(),
                e
            ),
        }
    }

    /// 購読ループを起動する。EventBus が閉じると終了する
    pub fn spawn(self, mut receiver: broadcast::Receiver<DomainEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => self.deliver(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Notifier lagged behind, {} event(s) skipped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notifier stopping");
                        break;
                    }
                }
            }
        })
    }
}
