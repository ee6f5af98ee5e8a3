//! MessagePusher trait 定義
//!
//! トランスポートのグループ（ルーム）機能の抽象化。
//! 接続ごとの送信チャンネルを管理し、接続単位の送信とグループ単位のブロードキャストを提供する。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomId};

/// クライアントへの送信チャンネル（シリアライズ済みフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルと全グループへの所属を解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 接続をグループに参加させる
    async fn join_group(
        &self,
        connection_id: &ConnectionId,
        group: &RoomId,
    ) -> Result<(), MessagePushError>;

    /// 接続をグループから外す
    async fn leave_group(
        &self,
        connection_id: &ConnectionId,
        group: &RoomId,
    ) -> Result<(), MessagePushError>;

    /// 特定の接続に送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// グループ内の全接続に送信し、送信できた接続数を返す
    async fn broadcast_to_group(
        &self,
        group: &RoomId,
        content: &str,
    ) -> Result<usize, MessagePushError>;
}
