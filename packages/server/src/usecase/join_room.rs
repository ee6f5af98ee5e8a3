//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - トランスポートのグループ参加 → レジストリへの参加 → user-joined-room の発行
//!
//! ### なぜこのテストが必要か
//! - 参加に失敗した場合に、何も発行されずグループにも残らないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加とイベント発行、参加時の表示名変更
//! - 異常系：ルーム ID の欠落、未登録の接続、グループ参加の失敗（表示名は変わらない）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DisplayName, DomainEvent, EventPublisher, MessagePusher,
    RoomId, RoomMember,
};

use super::error::RoomError;

/// ルーム参加の入力
#[derive(Debug, Clone, Default)]
pub struct JoinRoomInput {
    pub room_id: String,
    /// 指定された場合は参加に成功した後で表示名を変更する
    pub username: Option<String>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    publisher: Arc<dyn EventPublisher>,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            publisher,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(RoomMember)` - 参加したユーザー（表示名は変更後のもの）
    /// * `Err(RoomError)` - 参加失敗（何も発行されない）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        input: JoinRoomInput,
    ) -> Result<RoomMember, RoomError> {
        let room_id = RoomId::new(input.room_id)?;

        // 1. 接続が登録されていること
        let mut entry = self
            .registry
            .get(connection_id)
            .await
            .ok_or(RoomError::ConnectionNotFound)?;

        // 2. 表示名の検証（変更は参加が成功してから）
        let display_name = input
            .username
            .filter(|name| !name.trim().is_empty())
            .map(DisplayName::new)
            .transpose()?
            .filter(|name| *name != entry.display_name);

        // 3. トランスポートのグループに参加
        self.message_pusher
            .join_group(connection_id, &room_id)
            .await?;

        // 4. レジストリに参加（この間に接続が消えていたら取り消す）
        if !self.registry.join_room(connection_id, &room_id).await {
            if let Err(e) = self.message_pusher.leave_group(connection_id, &room_id).await {
                tracing::warn!(
                    "Failed to roll back group join of '{}' in room '{}': {}",
                    connection_id,
                    room_id,
                    e
                );
            }
            return Err(RoomError::ConnectionNotFound);
        }

        // 5. 表示名の変更
        if let Some(display_name) = display_name
            && self
                .registry
                .rename_user(connection_id, display_name.clone())
                .await
        {
            entry.display_name = display_name;
        }

        // 6. 発行
        let member = entry.as_member();
        self.publisher.publish(DomainEvent::UserJoinedRoom {
            room_id: room_id.clone(),
            user_id: member.user_id.clone(),
            display_name: member.display_name.clone(),
        });
        tracing::info!(
            "User '{}' ({}) joined room '{}'",
            member.user_id,
            connection_id,
            room_id
        );
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, UserId, ValidationError};
    use crate::usecase::test_support::{Harness, conn, room};

    fn usecase(h: &Harness) -> JoinRoomUseCase {
        JoinRoomUseCase::new(h.registry.clone(), h.pusher.clone(), h.bus.clone())
    }

    fn input(room_id: &str) -> JoinRoomInput {
        JoinRoomInput {
            room_id: room_id.to_string(),
            username: None,
        }
    }

    #[tokio::test]
    async fn test_join_room_success() {
        // テスト項目: 参加するとレジストリとグループに反映され、user-joined-room が発行される
        // given (前提条件):
        let mut h = Harness::new();
        let _rx = h.connect("c1", "alice").await;
        let usecase = usecase(&h);

        // when (操作):
        let member = usecase.execute(&conn("c1"), input("r1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(member.user_id.as_str(), "alice");
        assert!(h.registry.is_in_room(&conn("c1"), &room("r1")).await);
        assert_eq!(h.pusher.group_size(&room("r1")).await, 1);
        let events = h.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DomainEvent::UserJoinedRoom { room_id, user_id, .. }
                if room_id.as_str() == "r1" && user_id.as_str() == "alice"
        ));
    }

    #[tokio::test]
    async fn test_join_room_with_username_renames_user() {
        // テスト項目: username を指定して参加すると表示名が変わる
        // given (前提条件):
        let mut h = Harness::new();
        let _rx = h.connect("c1", "alice").await;
        let usecase = usecase(&h);

        // when (操作):
        let member = usecase
            .execute(
                &conn("c1"),
                JoinRoomInput {
                    room_id: "r1".to_string(),
                    username: Some("Alice A.".to_string()),
                },
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(member.display_name.as_str(), "Alice A.");
        let users = h.registry.users_in_room(&room("r1")).await;
        assert_eq!(users[0].display_name.as_str(), "Alice A.");
        assert!(matches!(
            &h.drain_events()[0],
            DomainEvent::UserJoinedRoom { display_name, .. } if display_name.as_str() == "Alice A."
        ));
    }

    #[tokio::test]
    async fn test_join_room_without_room_id_fails_validation() {
        // テスト項目: ルーム ID が無い参加は検証エラーで、何も発行されない
        // given (前提条件):
        let mut h = Harness::new();
        let _rx = h.connect("c1", "alice").await;
        let usecase = usecase(&h);

        // when (操作):
        let result = usecase.execute(&conn("c1"), input("  ")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RoomError::Validation(ValidationError::MissingRoomId))
        );
        assert!(h.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_join_room_with_unknown_connection_fails() {
        // テスト項目: 未登録の接続は参加できず、グループにも残らない
        // given (前提条件):
        let mut h = Harness::new();
        let usecase = usecase(&h);

        // when (操作):
        let result = usecase.execute(&conn("ghost"), input("r1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::ConnectionNotFound));
        assert_eq!(h.pusher.group_size(&room("r1")).await, 0);
        assert!(h.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_join_keeps_previous_display_name() {
        // テスト項目: グループ参加に失敗した場合、username を指定していても表示名は変わらない
        // given (前提条件): レジストリにだけ登録され、Pusher には登録されていない接続
        let mut h = Harness::new();
        h.registry
            .register(
                conn("c1"),
                UserId::new("alice").unwrap(),
                DisplayName::new("alice").unwrap(),
                Timestamp::new(0),
            )
            .await
            .unwrap();
        let usecase = usecase(&h);

        // when (操作):
        let result = usecase
            .execute(
                &conn("c1"),
                JoinRoomInput {
                    room_id: "r1".to_string(),
                    username: Some("Renamed".to_string()),
                },
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomError::Dependency(_))));
        let entry = h.registry.get(&conn("c1")).await.unwrap();
        assert_eq!(entry.display_name.as_str(), "alice");
        assert!(!entry.is_in_room(&room("r1")));
        assert!(h.drain_events().is_empty());
    }
}
