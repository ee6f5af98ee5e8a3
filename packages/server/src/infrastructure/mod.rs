//! Infrastructure layer
//!
//! Domain 層の trait のインメモリ実装、EventBus、Notifier、DTO を提供します。

pub mod dto;
pub mod event_bus;
pub mod identity;
pub mod message_pusher;
pub mod message_store;
pub mod notifier;
pub mod registry;
pub mod typing;

pub use event_bus::{BroadcastEventBus, DEFAULT_EVENT_CAPACITY};
pub use identity::QueryIdentityResolver;
pub use message_pusher::WebSocketMessagePusher;
pub use message_store::InMemoryMessageStore;
pub use notifier::Notifier;
pub use registry::InMemoryConnectionRegistry;
pub use typing::{DEFAULT_TYPING_TIMEOUT, InMemoryTypingTracker};
