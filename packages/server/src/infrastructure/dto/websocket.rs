//! WebSocket message DTOs.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Payload keys are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Events sent by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    JoinRoom,
    LeaveRoom,
    SendMessage,
    UpdateMessage,
    DeleteMessage,
    TypingStart,
    TypingStop,
    GetRoomUsers,
    GetOnlineUsers,
    CheckUserOnline,
    GetRoomMessages,
    GetTypingStatus,
}

impl ClientEvent {
    pub fn parse(name: &str) -> Option<Self> {
        let event = match name {
            "join-room" => Self::JoinRoom,
            "leave-room" => Self::LeaveRoom,
            "send-message" => Self::SendMessage,
            "update-message" => Self::UpdateMessage,
            "delete-message" => Self::DeleteMessage,
            "typing-start" => Self::TypingStart,
            "typing-stop" => Self::TypingStop,
            "get-room-users" => Self::GetRoomUsers,
            "get-online-users" => Self::GetOnlineUsers,
            "check-user-online" => Self::CheckUserOnline,
            "get-room-messages" => Self::GetRoomMessages,
            "get-typing-status" => Self::GetTypingStatus,
            _ => return None,
        };
        Some(event)
    }
}

/// Events sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    ConnectionEstablished,
    UserJoinedRoom,
    UserLeftRoom,
    MessageReceived,
    MessageUpdated,
    MessageDeleted,
    TypingStatusChanged,
    RoomUsers,
    OnlineUsers,
    UserOnlineStatus,
    RoomMessages,
    TypingStatus,
    Error,
}

impl ServerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished => "connection-established",
            Self::UserJoinedRoom => "user-joined-room",
            Self::UserLeftRoom => "user-left-room",
            Self::MessageReceived => "message-received",
            Self::MessageUpdated => "message-updated",
            Self::MessageDeleted => "message-deleted",
            Self::TypingStatusChanged => "typing-status-changed",
            Self::RoomUsers => "room-users",
            Self::OnlineUsers => "online-users",
            Self::UserOnlineStatus => "user-online-status",
            Self::RoomMessages => "room-messages",
            Self::TypingStatus => "typing-status",
            Self::Error => "error",
        }
    }
}

// ========================================
// Envelope
// ========================================

/// Inbound frame. `data` is parsed per event.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OutboundEnvelope<'a, T> {
    event: &'a str,
    data: &'a T,
}

/// Serialize an outbound frame.
pub fn encode<T: Serialize>(event: ServerEvent, data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundEnvelope {
        event: event.as_str(),
        data,
    })
}

// ========================================
// Inbound payloads
// ========================================
//
// Fields are optional so a missing field becomes a named validation error
// instead of a parse failure.

/// join-room / leave-room / typing-start / typing-stop / get-room-users / get-typing-status
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    pub message_id: Option<String>,
    pub content: Option<String>,
    pub room_id: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageRequest {
    pub message_id: Option<String>,
    pub room_id: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUserOnlineRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessagesRequest {
    pub room_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ========================================
// Outbound payloads
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEstablishedPayload {
    pub connection_id: String,
    pub user_id: String,
    pub username: String,
}

/// user-joined-room / user-left-room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoomPayload {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
}

/// message-received / message-updated, and the items of room-messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub room_id: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<String>,
    pub is_edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeletedPayload {
    pub message_id: String,
    pub room_id: String,
    pub author_id: String,
    pub deleted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatusChangedPayload {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUsersPayload {
    pub room_id: String,
    pub users: Vec<UserInfo>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotDto {
    pub count: usize,
    pub users: Vec<UserInfo>,
}

/// online-users と GET /api/stats の共通レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshotDto {
    pub total_connections: usize,
    pub rooms: BTreeMap<String, RoomSnapshotDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOnlineStatusPayload {
    pub user_id: String,
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessagesPayload {
    pub room_id: String,
    pub messages: Vec<MessagePayload>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUserInfo {
    pub user_id: String,
    pub username: String,
    pub started_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatusPayload {
    pub room_id: String,
    pub users: Vec<TypingUserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}
