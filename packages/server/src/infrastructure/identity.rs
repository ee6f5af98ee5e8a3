//! ハンドシェイクのクエリから本人を特定する IdentityResolver 実装
//!
//! 開発用。トークンの検証は行わず、`userId` と `username` をそのまま信用する。

use async_trait::async_trait;

use crate::domain::{AuthUser, DisplayName, Handshake, IdentityError, IdentityResolver, UserId};

pub const USER_ID_PARAM: &str = "userId";
pub const USERNAME_PARAM: &str = "username";

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryIdentityResolver;

impl QueryIdentityResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityResolver for QueryIdentityResolver {
    async fn resolve(&self, handshake: &Handshake) -> Result<AuthUser, IdentityError> {
        let user_id = handshake
            .query
            .get(USER_ID_PARAM)
            .ok_or(IdentityError::MissingCredential(USER_ID_PARAM))?;
        // username が無い場合は userId を表示名として使う
        let username = handshake
            .query
            .get(USERNAME_PARAM)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(user_id);

        Ok(AuthUser {
            user_id: UserId::new(user_id.as_str())?,
            username: DisplayName::new(username.as_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    fn handshake(pairs: &[(&str, &str)]) -> Handshake {
        Handshake {
            query: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_resolve_reads_user_id_and_username() {
        // テスト項目: クエリの userId と username からユーザーを特定する
        // given (前提条件):
        let resolver = QueryIdentityResolver::new();

        // when (操作):
        let user = resolver
            .resolve(&handshake(&[("userId", "u-1"), ("username", "alice")]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(user.user_id.as_str(), "u-1");
        assert_eq!(user.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_user_id_as_username() {
        // テスト項目: username が無ければ userId を表示名にする
        // given (前提条件):
        let resolver = QueryIdentityResolver::new();

        // when (操作):
        let user = resolver.resolve(&handshake(&[("userId", "bob")])).await.unwrap();

        // then (期待する結果):
        assert_eq!(user.username.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_resolve_without_user_id_fails() {
        // テスト項目: userId が無い接続は認証エラー
        // given (前提条件):
        let resolver = QueryIdentityResolver::new();

        // when (操作):
        let result = resolver.resolve(&handshake(&[("username", "alice")])).await;

        // then (期待する結果):
        assert_eq!(result, Err(IdentityError::MissingCredential("userId")));
    }

    #[tokio::test]
    async fn test_resolve_with_blank_user_id_fails_validation() {
        // テスト項目: 空白だけの userId は検証エラー
        // given (前提条件):
        let resolver = QueryIdentityResolver::new();

        // when (操作):
        let result = resolver.resolve(&handshake(&[("userId", "  ")])).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(IdentityError::Invalid(ValidationError::MissingUserId))
        );
    }
}
