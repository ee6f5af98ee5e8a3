//! HTTP / WebSocket handlers.

pub mod http;
pub mod websocket;

pub use http::{get_room_users, get_stats, health_check};
pub use websocket::websocket_handler;
