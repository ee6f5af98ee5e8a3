//! Domain layer
//!
//! 値オブジェクト、エンティティ、ドメインイベントと、
//! UseCase 層が依存するインターフェース（trait）を定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod identity;
pub mod message_pusher;
pub mod repository;
pub mod typing;
pub mod value_object;

pub use entity::{
    AuthUser, ConnectionEntry, MessageRecord, MessageUpdate, NewMessage, RegistrySnapshot,
    RoomMember, RoomSnapshot, TypingStatus,
};
pub use error::{IdentityError, MessagePushError, RegistryError, StoreError, ValidationError};
pub use event::{DomainEvent, EventPublisher};
pub use identity::{Handshake, IdentityResolver};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{ConnectionRegistry, MessageStore};
pub use typing::TypingTracker;
pub use value_object::{
    ConnectionId, DisplayName, MessageContent, MessageId, RoomId, Timestamp, UserId,
};

#[cfg(test)]
pub use repository::MockMessageStore;
