//! Value Object 定義
//!
//! 識別子やメッセージ本文などの値オブジェクトを定義します。
//! 生成時に空文字列（空白のみを含む）を拒否し、欠落したフィールドごとに名前付きの
//! [`ValidationError`] を返します。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// 空文字列を拒否する `String` の newtype を定義するマクロ
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $missing:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ValidationError::$missing);
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// トランスポートが割り当てる接続 ID（接続ごとに一意）
    ConnectionId,
    MissingConnectionId
);

string_id!(
    /// 論理ユーザーの ID（複数の接続が同じユーザーに対応しうる）
    UserId,
    MissingUserId
);

string_id!(
    /// ルーム ID（メンバーシップによって暗黙的に存在する）
    RoomId,
    MissingRoomId
);

string_id!(
    /// メッセージストアが採番するメッセージ ID
    MessageId,
    MissingMessageId
);

string_id!(
    /// 表示名（接続中いつでも変更可能）
    DisplayName,
    MissingDisplayName
);

/// メッセージ本文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent(String);

impl MessageContent {
    /// 本文の最大文字数
    pub const MAX_LENGTH: usize = 4000;

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::MissingContent);
        }
        let length = value.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationError::ContentTooLong {
                length,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageContent> for String {
    fn from(value: MessageContent) -> Self {
        value.0
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `earlier` からの経過ミリ秒
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}
