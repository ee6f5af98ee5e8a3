//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 本人確認済みの接続をレジストリと MessagePusher に登録する
//!
//! ### なぜこのテストが必要か
//! - 本人確認できなかった接続が何も登録されずに拒否されることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：本人確認なし、接続 ID の重複

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    AuthUser, ConnectionEntry, ConnectionId, ConnectionRegistry, MessagePusher, PusherChannel,
    Timestamp,
};

use super::error::ConnectError;

/// 接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - トランスポートが採番した接続 ID
    /// * `identity` - 接続時に解決されたユーザー（`None` なら拒否）
    /// * `sender` - 接続への送信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionEntry)` - 登録された接続
    /// * `Err(ConnectError)` - 接続拒否（何も登録されない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: Option<AuthUser>,
        sender: PusherChannel,
    ) -> Result<ConnectionEntry, ConnectError> {
        let Some(user) = identity else {
            tracing::warn!("Rejected unauthenticated connection '{}'", connection_id);
            return Err(ConnectError::Unauthenticated);
        };

        // 1. レジストリに登録
        let connected_at = Timestamp::new(self.clock.now_millis());
        let entry = self
            .registry
            .register(
                connection_id.clone(),
                user.user_id,
                user.username,
                connected_at,
            )
            .await?;

        // 2. MessagePusher に送信チャンネルを登録
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        tracing::info!(
            "User '{}' ({}) connected as '{}'",
            entry.user_id,
            entry.display_name,
            entry.connection_id
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{DisplayName, RegistryError, UserId};
    use crate::usecase::test_support::{Harness, conn};

    fn usecase(h: &Harness) -> ConnectParticipantUseCase {
        ConnectParticipantUseCase::new(h.registry.clone(), h.pusher.clone(), h.clock.clone())
    }

    fn alice() -> AuthUser {
        AuthUser {
            user_id: UserId::new("alice").unwrap(),
            username: DisplayName::new("Alice").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_connect_registers_connection() {
        // テスト項目: 本人確認済みの接続がレジストリと Pusher に登録される
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h);
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let entry = usecase
            .execute(conn("c1"), Some(alice()), tx)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(entry.user_id.as_str(), "alice");
        assert_eq!(entry.connected_at, Timestamp::new(1_000_000));
        assert!(entry.joined_rooms.is_empty());
        assert_eq!(h.registry.connection_count().await, 1);
        h.pusher.push_to(&conn("c1"), "ping").await.unwrap();
        assert_eq!(rx.recv().await, Some("ping".to_string()));
    }

    #[tokio::test]
    async fn test_connect_without_identity_is_rejected() {
        // テスト項目: 本人確認が無い接続は拒否され、何も登録されない
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h);
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(conn("c1"), None, tx).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::Unauthenticated));
        assert_eq!(h.registry.connection_count().await, 0);
        assert_eq!(h.pusher.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_connect_with_duplicate_connection_id_conflicts() {
        // テスト項目: 同じ接続 ID での再接続は Conflict
        // given (前提条件):
        let h = Harness::new();
        let usecase = usecase(&h);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        usecase.execute(conn("c1"), Some(alice()), tx1).await.unwrap();

        // when (操作):
        let result = usecase.execute(conn("c1"), Some(alice()), tx2).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::Conflict(RegistryError::Conflict(
                "c1".to_string()
            )))
        );
        assert_eq!(h.registry.connection_count().await, 1);
    }
}
