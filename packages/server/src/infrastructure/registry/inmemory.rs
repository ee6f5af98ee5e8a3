//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! 接続 ID をキーとする HashMap を単一の Mutex で保護します。
//! ロックは map へのアクセスの間だけ保持し、await を跨いで保持しません。

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionEntry, ConnectionId, ConnectionRegistry, DisplayName, RegistryError,
    RegistrySnapshot, RoomId, RoomMember, RoomSnapshot, Timestamp, UserId,
};

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: connection_id, Value: 接続エントリ
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

/// ルームの参加者をユーザー単位で重複排除して返す（user_id 順）
///
/// 同じユーザーの接続が複数ある場合は、最も新しい接続（同時刻なら接続 ID の大きい方）の表示名を使う。
fn collect_members<'a>(
    entries: impl Iterator<Item = &'a ConnectionEntry>,
    room_id: &RoomId,
) -> Vec<RoomMember> {
    let mut latest: BTreeMap<&UserId, &ConnectionEntry> = BTreeMap::new();
    for entry in entries.filter(|entry| entry.is_in_room(room_id)) {
        latest
            .entry(&entry.user_id)
            .and_modify(|current| {
                if (entry.connected_at, &entry.connection_id)
                    > (current.connected_at, &current.connection_id)
                {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }
    latest.into_values().map(ConnectionEntry::as_member).collect()
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        display_name: DisplayName,
        connected_at: Timestamp,
    ) -> Result<ConnectionEntry, RegistryError> {
        let mut connections = self.connections.lock().await;
        if connections.contains_key(&connection_id) {
            return Err(RegistryError::Conflict(connection_id.into_string()));
        }

        let entry = ConnectionEntry::new(connection_id.clone(), user_id, display_name, connected_at);
        connections.insert(connection_id, entry.clone());
        tracing::debug!(
            "Connection '{}' registered for user '{}'",
            entry.connection_id,
            entry.user_id
        );
        Ok(entry)
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry> {
        let removed = self.connections.lock().await.remove(connection_id);
        match &removed {
            Some(entry) => tracing::debug!(
                "Connection '{}' removed (user '{}')",
                connection_id,
                entry.user_id
            ),
            None => tracing::debug!("Connection '{}' was not registered", connection_id),
        }
        removed
    }

    async fn get(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry> {
        self.connections.lock().await.get(connection_id).cloned()
    }

    async fn join_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get_mut(connection_id) {
            Some(entry) => {
                entry.joined_rooms.insert(room_id.clone());
                tracing::debug!("Connection '{}' joined room '{}'", connection_id, room_id);
                true
            }
            None => {
                tracing::debug!("Connection '{}' not found on join", connection_id);
                false
            }
        }
    }

    async fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections
            .get_mut(connection_id)
            .map(|entry| entry.joined_rooms.remove(room_id))
            .unwrap_or(false);
        if removed {
            tracing::debug!("Connection '{}' left room '{}'", connection_id, room_id);
        }
        removed
    }

    async fn is_in_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        self.connections
            .lock()
            .await
            .get(connection_id)
            .is_some_and(|entry| entry.is_in_room(room_id))
    }

    async fn users_in_room(&self, room_id: &RoomId) -> Vec<RoomMember> {
        let connections = self.connections.lock().await;
        collect_members(connections.values(), room_id)
    }

    async fn is_user_connected(&self, user_id: &UserId) -> bool {
        self.connections
            .lock()
            .await
            .values()
            .any(|entry| &entry.user_id == user_id)
    }

    async fn rename_user(&self, connection_id: &ConnectionId, display_name: DisplayName) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get_mut(connection_id) {
            Some(entry) => {
                tracing::debug!(
                    "Connection '{}' renamed to '{}'",
                    connection_id,
                    display_name
                );
                entry.display_name = display_name;
                true
            }
            None => false,
        }
    }

    async fn rooms_of(&self, connection_id: &ConnectionId) -> Option<HashSet<RoomId>> {
        self.connections
            .lock()
            .await
            .get(connection_id)
            .map(|entry| entry.joined_rooms.clone())
    }

    async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    async fn snapshot(&self) -> RegistrySnapshot {
        let connections = self.connections.lock().await;

        let all_rooms: HashSet<&RoomId> = connections
            .values()
            .flat_map(|entry| entry.joined_rooms.iter())
            .collect();

        let rooms: BTreeMap<RoomId, RoomSnapshot> = all_rooms
            .into_iter()
            .map(|room_id| {
                let members = collect_members(connections.values(), room_id);
                let snapshot = RoomSnapshot {
                    count: members.len(),
                    members,
                };
                (room_id.clone(), snapshot)
            })
            .collect();

        RegistrySnapshot {
            total_connections: connections.len(),
            rooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続の登録・削除、ルームへの参加・退出
    // - ルーム参加者の重複排除とスナップショット
    //
    // 【なぜこのテストが必要か】
    // - Registry は接続状態の唯一の正であり、切断時の後始末もここに依存する
    // - 並行に操作されても更新が失われないことを保証する必要がある
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id).unwrap()
    }

    async fn register(registry: &InMemoryConnectionRegistry, connection: &str, user: &str) {
        registry
            .register(
                conn(connection),
                UserId::new(user).unwrap(),
                DisplayName::new(user).unwrap(),
                Timestamp::new(1_000),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_duplicate_connection_conflicts() {
        // テスト項目: 同じ接続 ID の二重登録は Conflict になる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        register(&registry, "c1", "alice").await;

        // when (操作):
        let result = registry
            .register(
                conn("c1"),
                UserId::new("bob").unwrap(),
                DisplayName::new("bob").unwrap(),
                Timestamp::new(2_000),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::Conflict("c1".to_string())));
        assert_eq!(registry.get(&conn("c1")).await.unwrap().user_id.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_remove_unknown_connection_is_none() {
        // テスト項目: 未登録の接続の削除はエラーではなく None
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();

        // when (操作):
        let removed = registry.remove(&conn("ghost")).await;

        // then (期待する結果):
        assert!(removed.is_none());
    }

    #[tokio::test]
    async fn test_join_and_leave_room() {
        // テスト項目: 参加・退出が反映され、退出は冪等
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        register(&registry, "c1", "alice").await;

        // when (操作):
        let joined = registry.join_room(&conn("c1"), &room("r1")).await;
        let in_room = registry.is_in_room(&conn("c1"), &room("r1")).await;
        let left = registry.leave_room(&conn("c1"), &room("r1")).await;
        let left_again = registry.leave_room(&conn("c1"), &room("r1")).await;

        // then (期待する結果):
        assert!(joined);
        assert!(in_room);
        assert!(left);
        assert!(!left_again);
        assert!(!registry.is_in_room(&conn("c1"), &room("r1")).await);
    }

    #[tokio::test]
    async fn test_join_room_with_unknown_connection_returns_false() {
        // テスト項目: 未登録の接続はルームに参加できず false が返る
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();

        // when (操作):
        let joined = registry.join_room(&conn("ghost"), &room("r1")).await;

        // then (期待する結果):
        assert!(!joined);
        assert!(registry.users_in_room(&room("r1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_users_in_room_deduplicates_users() {
        // テスト項目: 同じユーザーが複数接続で参加していても 1 人として数える
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        register(&registry, "c1", "alice").await;
        register(&registry, "c2", "alice").await;
        register(&registry, "c3", "bob").await;
        for c in ["c1", "c2", "c3"] {
            registry.join_room(&conn(c), &room("r1")).await;
        }

        // when (操作):
        let users = registry.users_in_room(&room("r1")).await;

        // then (期待する結果):
        let ids: Vec<&str> = users.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_users_in_room_uses_latest_connection_display_name() {
        // テスト項目: 同じユーザーの接続ごとに表示名が異なる場合、最も新しい接続の表示名が返る
        // given (前提条件): 新しい接続を先に登録し、HashMap の順序に依存しないことを確認する
        let registry = InMemoryConnectionRegistry::new();
        for (connection, name, connected_at) in [
            ("c9", "Alice (phone)", 3_000),
            ("c1", "Alice (old)", 1_000),
            ("c5", "Alice (laptop)", 2_000),
        ] {
            registry
                .register(
                    conn(connection),
                    UserId::new("alice").unwrap(),
                    DisplayName::new(name).unwrap(),
                    Timestamp::new(connected_at),
                )
                .await
                .unwrap();
            registry.join_room(&conn(connection), &room("r1")).await;
        }

        // when (操作):
        let users = registry.users_in_room(&room("r1")).await;
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name.as_str(), "Alice (phone)");
        assert_eq!(
            snapshot.rooms[&room("r1")].members[0].display_name.as_str(),
            "Alice (phone)"
        );
    }

    #[tokio::test]
    async fn test_is_user_connected_and_rename() {
        // テスト項目: ユーザーの接続確認と表示名の変更
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        register(&registry, "c1", "alice").await;

        // when (操作):
        let renamed = registry
            .rename_user(&conn("c1"), DisplayName::new("Alice A.").unwrap())
            .await;
        let renamed_ghost = registry
            .rename_user(&conn("ghost"), DisplayName::new("x").unwrap())
            .await;

        // then (期待する結果):
        assert!(renamed);
        assert!(!renamed_ghost);
        assert!(registry.is_user_connected(&UserId::new("alice").unwrap()).await);
        assert!(!registry.is_user_connected(&UserId::new("bob").unwrap()).await);
        assert_eq!(
            registry.get(&conn("c1")).await.unwrap().display_name.as_str(),
            "Alice A."
        );
    }

    #[tokio::test]
    async fn test_snapshot_reports_rooms_and_totals() {
        // テスト項目: スナップショットが接続数とルームごとの参加者を返す
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        register(&registry, "c1", "alice").await;
        register(&registry, "c2", "bob").await;
        register(&registry, "c3", "carol").await;
        registry.join_room(&conn("c1"), &room("r1")).await;
        registry.join_room(&conn("c2"), &room("r1")).await;
        registry.join_room(&conn("c2"), &room("r2")).await;

        // when (操作):
        let snapshot = registry.snapshot().await;

        // then (期待する結果):
        assert_eq!(snapshot.total_connections, 3);
        assert_eq!(snapshot.rooms.len(), 2);
        assert_eq!(snapshot.rooms[&room("r1")].count, 2);
        assert_eq!(snapshot.rooms[&room("r2")].count, 1);
        assert_eq!(snapshot.rooms[&room("r2")].members[0].user_id.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_concurrent_join_leave_keeps_per_connection_order() {
        // テスト項目: 他の接続が並行して操作しても、同一接続の操作は順序通りに反映される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        register(&registry, "main", "alice").await;
        for i in 0..16 {
            register(&registry, &format!("noise-{i}"), &format!("user-{i}")).await;
        }

        // when (操作): 無関係な接続が並行して参加・退出を繰り返す
        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let id = conn(&format!("noise-{i}"));
                for _ in 0..50 {
                    registry.join_room(&id, &room("r1")).await;
                    registry.leave_room(&id, &room("r1")).await;
                }
            }));
        }
        // main 接続は join → leave → join → join → leave → join の順に操作する
        let main = conn("main");
        let expected = [true, false, true, true, false, true];
        for &join in &expected {
            if join {
                registry.join_room(&main, &room("r1")).await;
            } else {
                registry.leave_room(&main, &room("r1")).await;
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果): 最後の操作（join）が反映され、他の接続は残っていない
        assert!(registry.is_in_room(&main, &room("r1")).await);
        let users = registry.users_in_room(&room("r1")).await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id.as_str(), "alice");
    }
}
