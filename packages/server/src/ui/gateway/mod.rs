//! Transport adapters
//!
//! イベント種別ごとの入口。受信したペイロードを検証し、UseCase に委譲し、
//! 結果を呼び出し元への送信イベントに変換する。ルーム全体への配信は Notifier が行う。

pub mod message;
pub mod presence;
pub mod room;
pub mod support;
pub mod typing;

pub use message::MessageGateway;
pub use presence::PresenceGateway;
pub use room::RoomGateway;
pub use support::GatewaySupport;
pub use typing::TypingGateway;
