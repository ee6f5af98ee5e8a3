//! ドメイン層のエラー定義
//!
//! 入力の検証エラー、レジストリ・メッセージストア・トランスポートの各エラーを定義します。

use thiserror::Error;

/// 入力値の検証エラー
///
/// 欠落しているフィールドごとに別のバリアントを持つため、呼び出し側は原因を判別できる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Connection ID is required")]
    MissingConnectionId,
    #[error("Room ID is required")]
    MissingRoomId,
    #[error("User ID is required")]
    MissingUserId,
    #[error("Username is required")]
    MissingDisplayName,
    #[error("Message ID is required")]
    MissingMessageId,
    #[error("Content is required")]
    MissingContent,
    #[error("Content is too long ({length} > {max} characters)")]
    ContentTooLong { length: usize, max: usize },
}

/// ConnectionRegistry のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection '{0}' is already registered")]
    Conflict(String),
}

/// MessageStore のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Message '{0}' not found in store")]
    NotFound(String),
    #[error("Message store unavailable: {0}")]
    Unavailable(String),
}

/// メッセージ送信（Push）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' not found")]
    ClientNotFound(String),
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}

/// 接続時の本人確認エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Authentication required: {0} not provided")]
    MissingCredential(&'static str),
    #[error("Invalid identity: {0}")]
    Invalid(#[from] ValidationError),
}
