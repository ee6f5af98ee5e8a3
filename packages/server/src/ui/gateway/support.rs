//! ゲートウェイ共通の処理
//!
//! 呼び出し元への送信、エラーの送信、接続とルーム参加の確認、ペイロードの解析。

use std::{fmt::Display, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    domain::{ConnectionEntry, ConnectionId, ConnectionRegistry, MessagePusher, RoomId},
    infrastructure::dto::websocket::{ErrorPayload, ServerEvent, encode},
    usecase::RoomError,
};

/// ルームに参加していない接続からのメッセージ系イベントへの応答
pub const NOT_IN_ROOM: &str = "You must join the room before performing this action";
/// ルームに参加していない接続からの入力中イベントへの応答
pub const NOT_IN_ROOM_TYPING: &str = "You must join the room before sending typing events";

#[derive(Clone)]
pub struct GatewaySupport {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GatewaySupport {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 呼び出し元の接続だけに送信する
    pub async fn emit_to_caller<T: Serialize + Sync>(
        &self,
        connection_id: &ConnectionId,
        event: ServerEvent,
        data: &T,
    ) {
        let frame = match encode(event, data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode '{}': {}", event.as_str(), e);
                return;
            }
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &frame).await {
            tracing::warn!(
                "Failed to emit '{}' to '{}': {}",
                event.as_str(),
                connection_id,
                e
            );
        }
    }

    /// 呼び出し元の接続に `error` イベントを送信する
    pub async fn emit_error(&self, connection_id: &ConnectionId, message: impl Display + Send) {
        let message = message.to_string();
        tracing::debug!("Emitting error to '{}': {}", connection_id, message);
        let payload = ErrorPayload { message };
        self.emit_to_caller(connection_id, ServerEvent::Error, &payload)
            .await;
    }

    /// 登録済みの接続を取得する。無ければエラーを送信して `None`
    pub async fn require_connection(&self, connection_id: &ConnectionId) -> Option<ConnectionEntry> {
        let entry = self.registry.get(connection_id).await;
        if entry.is_none() {
            self.emit_error(connection_id, RoomError::ConnectionNotFound).await;
        }
        entry
    }

    /// 接続がルームに参加していることを確認する
    ///
    /// 接続が未登録、ルーム ID が無い、参加していない場合はそれぞれのエラーを送信して `None`。
    pub async fn require_membership(
        &self,
        connection_id: &ConnectionId,
        room_id: Option<&str>,
        not_in_room: &str,
    ) -> Option<ConnectionEntry> {
        let entry = self.require_connection(connection_id).await?;
        let room_id = match RoomId::new(room_id.unwrap_or_default()) {
            Ok(room_id) => room_id,
            Err(e) => {
                self.emit_error(connection_id, e).await;
                return None;
            }
        };
        if !entry.is_in_room(&room_id) {
            self.emit_error(connection_id, not_in_room).await;
            return None;
        }
        Some(entry)
    }

    /// ペイロードを解析する。`data` が無い場合はデフォルト値、解析できなければエラーを送信して `None`
    pub async fn parse_payload<T: DeserializeOwned + Default + Send>(
        &self,
        connection_id: &ConnectionId,
        event: &str,
        data: serde_json::Value,
    ) -> Option<T> {
        if data.is_null() {
            return Some(T::default());
        }
        match serde_json::from_value(data) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::debug!("Invalid payload for '{}': {}", event, e);
                self.emit_error(connection_id, format!("Invalid payload for '{event}'"))
                    .await;
                None
            }
        }
    }
}
