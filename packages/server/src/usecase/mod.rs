//! UseCase layer
//!
//! 1 つの操作につき 1 つの構造体を持ち、`execute` で実行します。
//! 依存は全て Domain 層の trait 経由で受け取ります。

pub mod connect_participant;
pub mod delete_message;
pub mod disconnect_participant;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod presence;
pub mod send_message;
pub mod typing;
pub mod update_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use delete_message::{DeleteMessageInput, DeleteMessageUseCase};
pub use disconnect_participant::{DisconnectParticipantUseCase, DisconnectSummary};
pub use error::{ConnectError, RoomError};
pub use join_room::{JoinRoomInput, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use presence::{
    CheckUserOnlineUseCase, GetOnlineUsersUseCase, GetRoomMessagesUseCase, GetRoomUsersUseCase,
    RoomMessages, RoomMessagesInput,
};
pub use send_message::{SendMessageInput, SendMessageUseCase};
pub use typing::{GetTypingStatusUseCase, StartTypingUseCase, StopTypingUseCase};
pub use update_message::{UpdateMessageInput, UpdateMessageUseCase};
