//! TypingTracker trait 定義

use async_trait::async_trait;

use super::{DisplayName, RoomId, TypingStatus, UserId};

/// 入力中インジケーターの状態管理
///
/// (ルーム, ユーザー) ごとに absent → typing → absent の状態遷移を持つ。
/// タイムアウトによる失効と明示的な停止は、観測者からは区別できない。
#[async_trait]
pub trait TypingTracker: Send + Sync {
    /// 入力開始（既に入力中ならタイムスタンプを更新）。常に typing-changed を発行する
    async fn start_typing(&self, room_id: &RoomId, user_id: &UserId, display_name: &DisplayName);

    /// 入力停止。実際に状態遷移した場合のみ `true` を返し、イベントを発行する
    async fn stop_typing(&self, room_id: &RoomId, user_id: &UserId) -> bool;

    /// 失効していない入力中ユーザーの一覧（状態は変更しない）
    async fn status(&self, room_id: &RoomId) -> Vec<TypingStatus>;

    /// 失効したエントリを停止させ、停止させた件数を返す
    async fn sweep_expired(&self) -> usize;
}
