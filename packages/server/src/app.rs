//! Dependency wiring.
//!
//! Builds the in-memory collaborators, use cases and gateways, and starts the
//! background tasks (typing sweeper, notifier) that live as long as the server.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};
use tokio::task::JoinHandle;

use crate::{
    config::ServerConfig,
    domain::{ConnectionRegistry, EventPublisher, MessagePusher, MessageStore, TypingTracker},
    infrastructure::{
        BroadcastEventBus, InMemoryConnectionRegistry, InMemoryMessageStore, InMemoryTypingTracker,
        Notifier, QueryIdentityResolver, WebSocketMessagePusher,
    },
    ui::{
        gateway::{GatewaySupport, MessageGateway, PresenceGateway, RoomGateway, TypingGateway},
        state::AppState,
    },
    usecase::{
        CheckUserOnlineUseCase, ConnectParticipantUseCase, DeleteMessageUseCase,
        DisconnectParticipantUseCase, GetOnlineUsersUseCase, GetRoomMessagesUseCase,
        GetRoomUsersUseCase, GetTypingStatusUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        SendMessageUseCase, StartTypingUseCase, StopTypingUseCase, UpdateMessageUseCase,
    },
};

/// A fully wired application.
pub struct App {
    pub state: Arc<AppState>,
    typing_tracker: Arc<InMemoryTypingTracker>,
    notifier: JoinHandle<()>,
}

impl App {
    /// Wire everything with the system clock.
    pub fn build(config: &ServerConfig) -> Self {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    pub fn build_with_clock(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Collaborators
        let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
        let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new(clock.clone()));
        let event_bus = BroadcastEventBus::new(config.event_capacity);
        let events = event_bus.subscribe();
        let publisher: Arc<dyn EventPublisher> = Arc::new(event_bus);
        let typing_tracker =
            InMemoryTypingTracker::start(publisher.clone(), clock.clone(), config.typing_timeout);
        let typing: Arc<dyn TypingTracker> = typing_tracker.clone();

        // 2. Notifier
        let notifier = Notifier::new(message_pusher.clone()).spawn(events);

        // 3. UseCases
        let leave_room = Arc::new(LeaveRoomUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            publisher.clone(),
            typing.clone(),
        ));
        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            leave_room.clone(),
        ));
        let join_room = Arc::new(JoinRoomUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            publisher.clone(),
        ));
        let get_room_users = Arc::new(GetRoomUsersUseCase::new(registry.clone()));
        let get_online_users = Arc::new(GetOnlineUsersUseCase::new(registry.clone()));

        // 4. Gateways
        let support = GatewaySupport::new(registry.clone(), message_pusher.clone());
        let room_gateway = RoomGateway::new(support.clone(), join_room, leave_room);
        let message_gateway = MessageGateway::new(
            support.clone(),
            Arc::new(SendMessageUseCase::new(store.clone(), publisher.clone())),
            Arc::new(UpdateMessageUseCase::new(
                store.clone(),
                publisher.clone(),
                clock.clone(),
            )),
            Arc::new(DeleteMessageUseCase::new(
                store.clone(),
                publisher.clone(),
                clock.clone(),
            )),
            Arc::new(GetRoomMessagesUseCase::new(store)),
        );
        let typing_gateway = TypingGateway::new(
            support.clone(),
            Arc::new(StartTypingUseCase::new(registry.clone(), typing.clone())),
            Arc::new(StopTypingUseCase::new(registry.clone(), typing.clone())),
            Arc::new(GetTypingStatusUseCase::new(typing)),
        );
        let presence_gateway = PresenceGateway::new(
            support.clone(),
            get_room_users.clone(),
            get_online_users.clone(),
            Arc::new(CheckUserOnlineUseCase::new(registry)),
        );

        let state = Arc::new(AppState {
            identity_resolver: Arc::new(QueryIdentityResolver::new()),
            connect_participant_usecase,
            disconnect_participant_usecase,
            get_room_users_usecase: get_room_users,
            get_online_users_usecase: get_online_users,
            support,
            room_gateway,
            message_gateway,
            typing_gateway,
            presence_gateway,
        });

        tracing::debug!(
            "Application wired (typing_timeout={}ms, event_capacity={})",
            config.typing_timeout.as_millis(),
            config.event_capacity
        );

        Self {
            state,
            typing_tracker,
            notifier,
        }
    }

    /// Stop the typing sweeper and the notifier.
    pub fn shutdown(self) {
        self.typing_tracker.shutdown();
        self.notifier.abort();
        tracing::info!("Background tasks stopped");
    }
}
