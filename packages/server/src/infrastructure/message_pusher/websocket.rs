//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - グループ（ルーム）への所属を管理
//! - 特定の接続への送信（push_to）とグループへの送信（broadcast_to_group）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! sender とグループの 2 つの map は 1 つの Mutex で保護され、
//! 送信はチャンネルへの enqueue のみなのでロック中にブロックしません。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomId};

#[derive(Default)]
struct PusherState {
    /// Key: connection_id, Value: 送信チャンネル
    clients: HashMap<ConnectionId, PusherChannel>,
    /// Key: グループ名（room_id）, Value: 所属している接続
    groups: HashMap<RoomId, HashSet<ConnectionId>>,
}

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    state: Mutex<PusherState>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの接続数
    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    /// グループに所属している接続数
    pub async fn group_size(&self, group: &RoomId) -> usize {
        self.state
            .lock()
            .await
            .groups
            .get(group)
            .map_or(0, HashSet::len)
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut state = self.state.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        state.clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut state = self.state.lock().await;
        state.clients.remove(connection_id);
        state.groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn join_group(
        &self,
        connection_id: &ConnectionId,
        group: &RoomId,
    ) -> Result<(), MessagePushError> {
        let mut state = self.state.lock().await;
        if !state.clients.contains_key(connection_id) {
            return Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ));
        }
        state
            .groups
            .entry(group.clone())
            .or_default()
            .insert(connection_id.clone());
        tracing::debug!("Connection '{}' joined group '{}'", connection_id, group);
        Ok(())
    }

    async fn leave_group(
        &self,
        connection_id: &ConnectionId,
        group: &RoomId,
    ) -> Result<(), MessagePushError> {
        let mut state = self.state.lock().await;
        if let Some(members) = state.groups.get_mut(group) {
            members.remove(connection_id);
            if members.is_empty() {
                state.groups.remove(group);
            }
        }
        tracing::debug!("Connection '{}' left group '{}'", connection_id, group);
        Ok(())
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let state = self.state.lock().await;

        if let Some(sender) = state.clients.get(connection_id) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to connection '{}'", connection_id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast_to_group(
        &self,
        group: &RoomId,
        content: &str,
    ) -> Result<usize, MessagePushError> {
        let state = self.state.lock().await;
        let Some(members) = state.groups.get(group) else {
            tracing::debug!("Group '{}' has no members, nothing to broadcast", group);
            return Ok(0);
        };

        let mut delivered = 0;
        for member in members {
            match state.clients.get(member) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::warn!(
                        "Failed to push message to connection '{}': {}",
                        member,
                        e
                    ),
                },
                None => tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    member
                ),
            }
        }
        tracing::debug!(
            "Broadcasted message to {} connection(s) in group '{}'",
            delivered,
            group
        );
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信
    // - broadcast_to_group: グループ内の接続への送信
    // - グループへの参加・退出と登録解除時の後始末
    //
    // 【なぜこのテストが必要か】
    // - ルームへの配信はこのグループ機能だけに依存している
    // - ルーム外の接続に配信されないことを保証する必要がある
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id).unwrap()
    }

    async fn register(
        pusher: &WebSocketMessagePusher,
        id: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(conn(id), tx).await;
        rx
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx = register(&pusher, "c1").await;

        // when (操作):
        let result = pusher.push_to(&conn("c1"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&conn("nonexistent"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_broadcast_to_group_reaches_only_members() {
        // テスト項目: グループのメンバーだけに配信される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice = register(&pusher, "alice").await;
        let mut bob = register(&pusher, "bob").await;
        let mut carol = register(&pusher, "carol").await;
        pusher.join_group(&conn("alice"), &room("r1")).await.unwrap();
        pusher.join_group(&conn("bob"), &room("r1")).await.unwrap();
        pusher.join_group(&conn("carol"), &room("r2")).await.unwrap();

        // when (操作):
        let delivered = pusher.broadcast_to_group(&room("r1"), "hi r1").await;

        // then (期待する結果):
        assert_eq!(delivered, Ok(2));
        assert_eq!(alice.recv().await, Some("hi r1".to_string()));
        assert_eq!(bob.recv().await, Some("hi r1".to_string()));
        assert!(carol.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_group_requires_registered_client() {
        // テスト項目: 未登録の接続はグループに参加できない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.join_group(&conn("ghost"), &room("r1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
        assert_eq!(pusher.group_size(&room("r1")).await, 0);
    }

    #[tokio::test]
    async fn test_leave_group_stops_delivery() {
        // テスト項目: グループから外れた接続には配信されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice = register(&pusher, "alice").await;
        pusher.join_group(&conn("alice"), &room("r1")).await.unwrap();

        // when (操作):
        pusher.leave_group(&conn("alice"), &room("r1")).await.unwrap();
        let delivered = pusher.broadcast_to_group(&room("r1"), "hi").await;

        // then (期待する結果):
        assert_eq!(delivered, Ok(0));
        assert!(alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_client_removes_group_memberships() {
        // テスト項目: 登録解除で全グループから外れる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let _alice = register(&pusher, "alice").await;
        let _bob = register(&pusher, "bob").await;
        pusher.join_group(&conn("alice"), &room("r1")).await.unwrap();
        pusher.join_group(&conn("alice"), &room("r2")).await.unwrap();
        pusher.join_group(&conn("bob"), &room("r1")).await.unwrap();

        // when (操作):
        pusher.unregister_client(&conn("alice")).await;

        // then (期待する結果):
        assert_eq!(pusher.client_count().await, 1);
        assert_eq!(pusher.group_size(&room("r1")).await, 1);
        assert_eq!(pusher.group_size(&room("r2")).await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_channel() {
        // テスト項目: 受信側が閉じた接続はスキップし、他の接続には配信する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let closed = register(&pusher, "closed").await;
        let mut open = register(&pusher, "open").await;
        pusher.join_group(&conn("closed"), &room("r1")).await.unwrap();
        pusher.join_group(&conn("open"), &room("r1")).await.unwrap();
        drop(closed);

        // when (操作):
        let delivered = pusher.broadcast_to_group(&room("r1"), "hi").await;

        // then (期待する結果):
        assert_eq!(delivered, Ok(1));
        assert_eq!(open.recv().await, Some("hi".to_string()));
    }
}
