//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::IdentityResolver,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetOnlineUsersUseCase,
        GetRoomUsersUseCase,
    },
};

use super::gateway::{GatewaySupport, MessageGateway, PresenceGateway, RoomGateway, TypingGateway};

/// Shared application state
pub struct AppState {
    /// ハンドシェイクからユーザーを特定する
    pub identity_resolver: Arc<dyn IdentityResolver>,
    /// ConnectParticipantUseCase（接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// HTTP API 用
    pub get_room_users_usecase: Arc<GetRoomUsersUseCase>,
    pub get_online_users_usecase: Arc<GetOnlineUsersUseCase>,
    pub support: GatewaySupport,
    pub room_gateway: RoomGateway,
    pub message_gateway: MessageGateway,
    pub typing_gateway: TypingGateway,
    pub presence_gateway: PresenceGateway,
}
