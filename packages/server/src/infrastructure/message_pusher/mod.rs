//! MessagePusher の実装
//!
//! Domain 層で定義された MessagePusher trait の具体的な実装を提供します。

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
