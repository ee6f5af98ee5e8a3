//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::collections::HashSet;

use async_trait::async_trait;

use super::{
    ConnectionEntry, ConnectionId, DisplayName, MessageId, MessageRecord, MessageUpdate,
    NewMessage, RegistryError, RegistrySnapshot, RoomId, RoomMember, StoreError, Timestamp,
    UserId,
};

/// ConnectionRegistry trait
///
/// 接続 ID からユーザー情報と参加ルームへの対応を管理する。
/// ルームは独立したエンティティを持たず、参加している接続の集合として導出される。
///
/// 各メソッドは 1 回のロック取得内で完結するため、走査系の操作でも
/// 同じ接続の変更前後の状態が混在することはない。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録する。同じ接続 ID が既に存在する場合は `Conflict`
    async fn register(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        display_name: DisplayName,
        connected_at: Timestamp,
    ) -> Result<ConnectionEntry, RegistryError>;

    /// 接続を削除し、削除したエントリを返す（存在しなければ `None`）
    async fn remove(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry>;

    /// 接続エントリを取得
    async fn get(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry>;

    /// ルームに参加させる。接続が存在しなければ `false`
    async fn join_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// ルームから退出させる。参加していなければ `false`（冪等）
    async fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// 接続がルームに参加しているか
    async fn is_in_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// ルームに参加しているユーザー一覧（ユーザー単位で重複なし）
    async fn users_in_room(&self, room_id: &RoomId) -> Vec<RoomMember>;

    /// いずれかの接続がこのユーザーに対応しているか
    async fn is_user_connected(&self, user_id: &UserId) -> bool;

    /// 表示名を変更する。接続が存在しなければ `false`
    async fn rename_user(&self, connection_id: &ConnectionId, display_name: DisplayName) -> bool;

    /// 接続が参加しているルームの集合
    async fn rooms_of(&self, connection_id: &ConnectionId) -> Option<HashSet<RoomId>>;

    /// 接続数
    async fn connection_count(&self) -> usize;

    /// ある時点の一貫したスナップショット
    async fn snapshot(&self) -> RegistrySnapshot;
}

/// MessageStore trait
///
/// メッセージの永続化を担う外部コラボレーター。削除は論理削除（`deleted_at` を設定）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを作成し、採番された ID とタイムスタンプを含むレコードを返す
    async fn create(&self, message: NewMessage) -> Result<MessageRecord, StoreError>;

    /// ID でメッセージを取得
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<MessageRecord>, StoreError>;

    /// メッセージを部分更新
    async fn update(
        &self,
        id: &MessageId,
        update: MessageUpdate,
    ) -> Result<MessageRecord, StoreError>;

    /// メッセージを論理削除
    async fn delete(&self, id: &MessageId) -> Result<MessageRecord, StoreError>;

    /// ルームのメッセージを新しい側から `offset` 件飛ばして最大 `limit` 件取得し、古い順に返す
    /// （論理削除済みは除く）
    async fn find_by_room(
        &self,
        room_id: &RoomId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MessageRecord>, StoreError>;
}
