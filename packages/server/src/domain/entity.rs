//! Entity 定義
//!
//! 接続エントリ、メッセージレコード、レジストリのスナップショットなどを定義します。

use std::collections::{BTreeMap, HashSet};

use super::{ConnectionId, DisplayName, MessageContent, MessageId, RoomId, Timestamp, UserId};

/// 接続ごとのエントリ
///
/// ConnectionRegistry だけが所有・変更する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub joined_rooms: HashSet<RoomId>,
    pub connected_at: Timestamp,
}

impl ConnectionEntry {
    pub fn new(
        connection_id: ConnectionId,
        user_id: UserId,
        display_name: DisplayName,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            user_id,
            display_name,
            joined_rooms: HashSet::new(),
            connected_at,
        }
    }

    pub fn is_in_room(&self, room_id: &RoomId) -> bool {
        self.joined_rooms.contains(room_id)
    }

    /// ルームのメンバーとしての表現
    pub fn as_member(&self) -> RoomMember {
        RoomMember {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// ルームに参加しているユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub user_id: UserId,
    pub display_name: DisplayName,
}

/// 1 ルーム分のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomSnapshot {
    pub count: usize,
    pub members: Vec<RoomMember>,
}

/// レジストリ全体のスナップショット（診断用）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrySnapshot {
    pub total_connections: usize,
    pub rooms: BTreeMap<RoomId, RoomSnapshot>,
}

/// 接続時に確認されたユーザー情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: DisplayName,
}

/// メッセージストアに永続化されたメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: MessageId,
    pub content: MessageContent,
    pub author_id: UserId,
    pub room_id: RoomId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub edited_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
}

impl MessageRecord {
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// 新規メッセージの作成パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub content: MessageContent,
    pub author_id: UserId,
    pub room_id: RoomId,
}

/// メッセージの部分更新パラメータ
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageUpdate {
    pub content: Option<MessageContent>,
    pub edited_at: Option<Timestamp>,
}

/// 入力中ユーザーの状態（読み出し用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingStatus {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub started_at: Timestamp,
}
