//! UI layer
//!
//! axum のサーバー、WebSocket / HTTP ハンドラー、イベント種別ごとのゲートウェイ。

pub mod gateway;
pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
