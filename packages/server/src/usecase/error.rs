//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{MessagePushError, RegistryError, StoreError, ValidationError};

/// ルーム操作（参加・退出・メッセージ・入力中・参照系）のエラー
///
/// Display の文言はそのまま `error` イベントの `message` として接続に返される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Client not authenticated")]
    ConnectionNotFound,

    #[error("You must join the room before performing this action")]
    NotInRoom,

    #[error("Message not found")]
    MessageNotFound,

    /// 所有者以外による編集・削除（"update" / "delete"）
    #[error("Unauthorized to {0} this message")]
    Unauthorized(&'static str),

    #[error("Service unavailable: {0}")]
    Dependency(String),
}

impl From<StoreError> for RoomError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => Self::MessageNotFound,
            StoreError::Unavailable(reason) => Self::Dependency(reason),
        }
    }
}

impl From<MessagePushError> for RoomError {
    fn from(error: MessagePushError) -> Self {
        Self::Dependency(error.to_string())
    }
}

/// 接続処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Client not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    Conflict(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_client_facing() {
        // テスト項目: エラーの文言がクライアントに返す文言になっている
        // given (前提条件):
        let errors = [
            RoomError::from(ValidationError::MissingRoomId),
            RoomError::ConnectionNotFound,
            RoomError::MessageNotFound,
            RoomError::Unauthorized("delete"),
        ];

        // when (操作):
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();

        // then (期待する結果):
        assert_eq!(
            messages,
            vec![
                "Room ID is required",
                "Client not authenticated",
                "Message not found",
                "Unauthorized to delete this message",
            ]
        );
    }

    #[test]
    fn test_store_not_found_maps_to_message_not_found() {
        // テスト項目: ストアの NotFound は MessageNotFound、それ以外は Dependency
        // given (前提条件):
        let not_found = StoreError::NotFound("m1".to_string());
        let unavailable = StoreError::Unavailable("down".to_string());

        // when (操作):
        let mapped = (RoomError::from(not_found), RoomError::from(unavailable));

        // then (期待する結果):
        assert_eq!(mapped.0, RoomError::MessageNotFound);
        assert_eq!(mapped.1, RoomError::Dependency("down".to_string()));
    }
}
