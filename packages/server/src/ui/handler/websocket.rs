//! WebSocket connection handlers.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    domain::{ConnectionId, Handshake},
    infrastructure::dto::websocket::{
        ClientEvent, ConnectionEstablishedPayload, InboundEnvelope, ServerEvent,
    },
    ui::state::AppState,
    usecase::ConnectError,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, StatusCode> {
    // 1. 本人確認（失敗したら upgrade しない）
    let handshake = Handshake { query };
    let identity = match state.identity_resolver.resolve(&handshake).await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Handshake rejected: {}", e);
            None
        }
    };

    // 2. 接続 ID の採番とチャンネルの作成
    let connection_id = ConnectionId::new(Uuid::new_v4().to_string())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let (tx, rx) = mpsc::unbounded_channel();

    // 3. 登録
    let entry = match state
        .connect_participant_usecase
        .execute(connection_id.clone(), identity, tx)
        .await
    {
        Ok(entry) => entry,
        Err(ConnectError::Unauthenticated) => return Err(StatusCode::UNAUTHORIZED),
        Err(ConnectError::Conflict(e)) => {
            tracing::warn!("Rejecting connection: {}", e);
            return Err(StatusCode::CONFLICT);
        }
    };

    // 4. 接続した本人にだけ connection-established を送る（upgrade 後に送信される）
    let payload = ConnectionEstablishedPayload::from(&entry);
    state
        .support
        .emit_to_caller(&connection_id, ServerEvent::ConnectionEstablished, &payload)
        .await;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id, rx)))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound flow: frames addressed to this connection
/// (room broadcasts and replies) are written to its WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Inbound frames are handled one at a time, in the order they arrive
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_frame(&state_clone, &connection_id_clone, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await;
}

/// Parse one inbound frame and dispatch it to the gateway for its event.
pub async fn handle_frame(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let envelope = match serde_json::from_str::<InboundEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("Unparsable frame from '{}': {}", connection_id, e);
            state
                .support
                .emit_error(connection_id, "Invalid message format")
                .await;
            return;
        }
    };

    let Some(event) = ClientEvent::parse(&envelope.event) else {
        state
            .support
            .emit_error(connection_id, format!("Unknown event: {}", envelope.event))
            .await;
        return;
    };
    tracing::debug!("Received '{}' from '{}'", envelope.event, connection_id);

    let data = envelope.data;
    match event {
        ClientEvent::JoinRoom => state.room_gateway.join_room(connection_id, data).await,
        ClientEvent::LeaveRoom => state.room_gateway.leave_room(connection_id, data).await,
        ClientEvent::SendMessage => {
            state
                .message_gateway
                .send_message(connection_id, data)
                .await
        }
        ClientEvent::UpdateMessage => {
            state
                .message_gateway
                .update_message(connection_id, data)
                .await
        }
        ClientEvent::DeleteMessage => {
            state
                .message_gateway
                .delete_message(connection_id, data)
                .await
        }
        ClientEvent::GetRoomMessages => {
            state
                .message_gateway
                .room_messages(connection_id, data)
                .await
        }
        ClientEvent::TypingStart => state.typing_gateway.start_typing(connection_id, data).await,
        ClientEvent::TypingStop => state.typing_gateway.stop_typing(connection_id, data).await,
        ClientEvent::GetTypingStatus => {
            state
                .typing_gateway
                .typing_status(connection_id, data)
                .await
        }
        ClientEvent::GetRoomUsers => {
            state
                .presence_gateway
                .room_users(connection_id, data)
                .await
        }
        ClientEvent::GetOnlineUsers => state.presence_gateway.online_users(connection_id).await,
        ClientEvent::CheckUserOnline => {
            state
                .presence_gateway
                .check_user_online(connection_id, data)
                .await
        }
    }
}
