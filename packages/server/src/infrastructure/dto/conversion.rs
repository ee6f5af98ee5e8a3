//! Conversion logic between domain entities and DTOs.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ConnectionEntry, DomainEvent, MessageRecord, RegistrySnapshot, RoomId, RoomMember,
    TypingStatus,
};
use crate::infrastructure::dto::websocket::{self as dto, ServerEvent, encode};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&MessageRecord> for dto::MessagePayload {
    fn from(model: &MessageRecord) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            content: model.content.as_str().to_string(),
            author_id: model.author_id.as_str().to_string(),
            room_id: model.room_id.as_str().to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            updated_at: timestamp_to_rfc3339(model.updated_at.value()),
            edited_at: model.edited_at.map(|t| timestamp_to_rfc3339(t.value())),
            is_edited: model.is_edited(),
        }
    }
}

impl From<RoomMember> for dto::UserInfo {
    fn from(model: RoomMember) -> Self {
        Self {
            user_id: model.user_id.into_string(),
            username: model.display_name.into_string(),
        }
    }
}

impl From<TypingStatus> for dto::TypingUserInfo {
    fn from(model: TypingStatus) -> Self {
        Self {
            user_id: model.user_id.into_string(),
            username: model.display_name.into_string(),
            started_at: timestamp_to_rfc3339(model.started_at.value()),
        }
    }
}

impl From<RegistrySnapshot> for dto::RegistrySnapshotDto {
    fn from(model: RegistrySnapshot) -> Self {
        Self {
            total_connections: model.total_connections,
            rooms: model
                .rooms
                .into_iter()
                .map(|(room_id, room)| {
                    (
                        room_id.into_string(),
                        dto::RoomSnapshotDto {
                            count: room.count,
                            users: room.members.into_iter().map(Into::into).collect(),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl dto::RoomUsersPayload {
    pub fn new(room_id: &RoomId, members: Vec<RoomMember>) -> Self {
        let users: Vec<dto::UserInfo> = members.into_iter().map(Into::into).collect();
        Self {
            room_id: room_id.as_str().to_string(),
            count: users.len(),
            users,
        }
    }
}

impl From<&ConnectionEntry> for dto::ConnectionEstablishedPayload {
    fn from(entry: &ConnectionEntry) -> Self {
        Self {
            connection_id: entry.connection_id.as_str().to_string(),
            user_id: entry.user_id.as_str().to_string(),
            username: entry.display_name.as_str().to_string(),
        }
    }
}

// ========================================
// DomainEvent → outbound frame
// ========================================

/// Encode a domain event as the frame broadcast to its room.
pub fn domain_event_frame(event: &DomainEvent) -> Result<String, serde_json::Error> {
    match event {
        DomainEvent::UserJoinedRoom {
            room_id,
            user_id,
            display_name,
        } => encode(
            ServerEvent::UserJoinedRoom,
            &dto::UserRoomPayload {
                user_id: user_id.as_str().to_string(),
                username: display_name.as_str().to_string(),
                room_id: room_id.as_str().to_string(),
            },
        ),
        DomainEvent::UserLeftRoom {
            room_id,
            user_id,
            display_name,
        } => encode(
            ServerEvent::UserLeftRoom,
            &dto::UserRoomPayload {
                user_id: user_id.as_str().to_string(),
                username: display_name.as_str().to_string(),
                room_id: room_id.as_str().to_string(),
            },
        ),
        DomainEvent::MessageCreated(message) => encode(
            ServerEvent::MessageReceived,
            &dto::MessagePayload::from(message),
        ),
        DomainEvent::MessageUpdated(message) => encode(
            ServerEvent::MessageUpdated,
            &dto::MessagePayload::from(message),
        ),
        DomainEvent::MessageDeleted {
            message_id,
            room_id,
            author_id,
            deleted_at,
        } => encode(
            ServerEvent::MessageDeleted,
            &dto::MessageDeletedPayload {
                message_id: message_id.as_str().to_string(),
                room_id: room_id.as_str().to_string(),
                author_id: author_id.as_str().to_string(),
                deleted_at: timestamp_to_rfc3339(deleted_at.value()),
            },
        ),
        DomainEvent::TypingChanged {
            room_id,
            user_id,
            display_name,
            is_typing,
            ..
        } => encode(
            ServerEvent::TypingStatusChanged,
            &dto::TypingStatusChangedPayload {
                user_id: user_id.as_str().to_string(),
                username: display_name.as_str().to_string(),
                room_id: room_id.as_str().to_string(),
                is_typing: *is_typing,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{DisplayName, MessageContent, MessageId, RoomSnapshot, Timestamp, UserId};

    fn record() -> MessageRecord {
        MessageRecord {
            id: MessageId::new("m1").unwrap(),
            content: MessageContent::new("Hello!").unwrap(),
            author_id: UserId::new("alice").unwrap(),
            room_id: RoomId::new("r1").unwrap(),
            created_at: Timestamp::new(1672531200000),
            updated_at: Timestamp::new(1672531200000),
            edited_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_message_record_to_payload() {
        // テスト項目: MessageRecord が RFC 3339 の日時を持つペイロードに変換される
        // given (前提条件):
        let model = record();

        // when (操作):
        let payload = dto::MessagePayload::from(&model);

        // then (期待する結果):
        assert_eq!(payload.id, "m1");
        assert_eq!(payload.author_id, "alice");
        assert!(payload.created_at.starts_with("2023-01-01T00:00:00"));
        assert!(payload.edited_at.is_none());
        assert!(!payload.is_edited);
    }

    #[test]
    fn test_message_created_event_becomes_message_received_frame() {
        // テスト項目: message-created イベントは message-received フレームとして配信される
        // given (前提条件):
        let event = DomainEvent::MessageCreated(record());

        // when (操作):
        let frame = domain_event_frame(&event).unwrap();

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "message-received");
        assert_eq!(value["data"]["content"], "Hello!");
        assert_eq!(value["data"]["roomId"], "r1");
        assert_eq!(value["data"]["isEdited"], false);
    }

    #[test]
    fn test_typing_changed_event_frame() {
        // テスト項目: typing-changed イベントは typing-status-changed フレームになる
        // given (前提条件):
        let event = DomainEvent::TypingChanged {
            room_id: RoomId::new("r1").unwrap(),
            user_id: UserId::new("bob").unwrap(),
            display_name: DisplayName::new("Bob").unwrap(),
            is_typing: false,
            at: Timestamp::new(0),
        };

        // when (操作):
        let frame = domain_event_frame(&event).unwrap();

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "typing-status-changed");
        assert_eq!(value["data"]["userId"], "bob");
        assert_eq!(value["data"]["username"], "Bob");
        assert_eq!(value["data"]["isTyping"], false);
    }

    #[test]
    fn test_registry_snapshot_to_dto() {
        // テスト項目: スナップショットがルーム ID をキーとする DTO に変換される
        // given (前提条件):
        let member = RoomMember {
            user_id: UserId::new("alice").unwrap(),
            display_name: DisplayName::new("Alice").unwrap(),
        };
        let mut rooms = BTreeMap::new();
        rooms.insert(
            RoomId::new("r1").unwrap(),
            RoomSnapshot {
                count: 1,
                members: vec![member],
            },
        );
        let snapshot = RegistrySnapshot {
            total_connections: 2,
            rooms,
        };

        // when (操作):
        let dto = dto::RegistrySnapshotDto::from(snapshot);

        // then (期待する結果):
        assert_eq!(dto.total_connections, 2);
        assert_eq!(dto.rooms["r1"].count, 1);
        assert_eq!(dto.rooms["r1"].users[0].username, "Alice");
    }
}
