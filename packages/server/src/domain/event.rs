//! Domain Event 定義
//!
//! 状態遷移が完了したことを表す不変の通知。EventBus を通して Notifier に届けられる。

use super::{DisplayName, MessageId, MessageRecord, RoomId, Timestamp, UserId};

/// ドメインイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    UserJoinedRoom {
        room_id: RoomId,
        user_id: UserId,
        display_name: DisplayName,
    },
    UserLeftRoom {
        room_id: RoomId,
        user_id: UserId,
        display_name: DisplayName,
    },
    MessageCreated(MessageRecord),
    MessageUpdated(MessageRecord),
    MessageDeleted {
        message_id: MessageId,
        room_id: RoomId,
        author_id: UserId,
        deleted_at: Timestamp,
    },
    TypingChanged {
        room_id: RoomId,
        user_id: UserId,
        display_name: DisplayName,
        is_typing: bool,
        at: Timestamp,
    },
}

impl DomainEvent {
    /// イベントの配信先ルーム
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::UserJoinedRoom { room_id, .. }
            | Self::UserLeftRoom { room_id, .. }
            | Self::MessageDeleted { room_id, .. }
            | Self::TypingChanged { room_id, .. } => room_id,
            Self::MessageCreated(message) | Self::MessageUpdated(message) => &message.room_id,
        }
    }

    /// ログ用のタグ名
    pub fn tag(&self) -> &'static str {
        match self {
            Self::UserJoinedRoom { .. } => "user-joined-room",
            Self::UserLeftRoom { .. } => "user-left-room",
            Self::MessageCreated(_) => "message-created",
            Self::MessageUpdated(_) => "message-updated",
            Self::MessageDeleted { .. } => "message-deleted",
            Self::TypingChanged { .. } => "typing-changed",
        }
    }
}

/// ドメインイベントの発行口
///
/// 発行は呼び出し側をブロックせず、失敗しても業務処理の成否には影響しない。
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent);
}
