//! IdentityResolver trait 定義
//!
//! 接続時に一度だけ呼ばれ、ハンドシェイクからユーザーを特定する。

use std::collections::HashMap;

use async_trait::async_trait;

use super::{AuthUser, IdentityError};

/// WebSocket ハンドシェイクの情報
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    /// クエリパラメータ
    pub query: HashMap<String, String>,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, handshake: &Handshake) -> Result<AuthUser, IdentityError>;
}
