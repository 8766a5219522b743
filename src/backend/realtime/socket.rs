/**
 * WebSocket Endpoint
 *
 * `GET /ws?token=<jwt>&roomId=<room>` upgrades to a WebSocket and hands the
 * socket to `run_connection`.
 *
 * # Identity
 *
 * The session token is read from the `token` query parameter, falling back
 * to an `Authorization: Bearer` header. A missing or invalid token does not
 * reject the upgrade: the connection is accepted as anonymous and only
 * receives room and all-connection broadcasts.
 *
 * # Tasks
 *
 * Each connection runs two halves. The writer task drains an unbounded
 * queue into the socket sink; its queue sender is what the dispatcher holds.
 * The reader loop decodes inbound frames and keeps only a weak sender, so
 * when the registry drops a connection the writer drains what is left and
 * closes the socket. When the reader ends first it unregisters the
 * connection, which has the same effect.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::backend::auth::sessions::user_id_from_token;
use crate::backend::middleware::auth::bearer_token;
use crate::backend::realtime::dispatcher::Dispatcher;
use crate::backend::realtime::protocol::handle_frame;
use crate::backend::realtime::registry::ConnectionId;
use crate::backend::server::state::AppState;
use crate::shared::WsMessage;

/// Query parameters accepted by the upgrade endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsConnectQuery {
    pub token: Option<String>,
    pub room_id: Option<String>,
}

/// GET /ws
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsConnectQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers));

    let user_id = token.and_then(|token| match user_id_from_token(&state.jwt_secret, token) {
        Ok(user_id) => Some(user_id),
        Err(e) => {
            tracing::warn!(error = %e, "[Realtime] Invalid token, connecting anonymously");
            None
        }
    });
    let room_id = query.room_id.filter(|r| !r.is_empty());

    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| run_connection(socket, dispatcher, user_id, room_id))
}

/// Drive one upgraded connection until either side goes away
pub async fn run_connection(
    socket: WebSocket,
    dispatcher: Dispatcher,
    user_id: Option<Uuid>,
    room_id: Option<String>,
) {
    let (sink, mut stream) = socket.split();
    let (sender, receiver) = mpsc::unbounded_channel::<WsMessage>();
    let pong_sender = sender.downgrade();

    // the registry owns the only strong sender; unregistering ends the writer
    let connection_id = dispatcher.register(user_id, room_id, sender);
    let mut writer = tokio::spawn(writer_task(sink, receiver, connection_id));
    let mut writer_done = false;

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&dispatcher, connection_id, &pong_sender, text.as_str());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "[Realtime] Read failed");
                    break;
                }
            },
            _ = &mut writer => {
                writer_done = true;
                break;
            }
        }
    }

    dispatcher.unregister(connection_id);

    if !writer_done {
        if let Err(e) = writer.await {
            tracing::warn!(connection_id = %connection_id, error = %e, "[Realtime] Writer task failed");
        }
    }
}

/// Forward queued frames to the socket; ends when every sender is dropped
/// or the socket rejects a write
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    receiver: mpsc::UnboundedReceiver<WsMessage>,
    connection_id: ConnectionId,
) {
    let mut outbound = UnboundedReceiverStream::new(receiver);

    while let Some(message) = outbound.next().await {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "[Realtime] Failed to encode frame");
                continue;
            }
        };

        if let Err(e) = sink.send(Message::Text(text.into())).await {
            tracing::debug!(connection_id = %connection_id, error = %e, "[Realtime] Write failed");
            break;
        }
    }

    let _ = sink.close().await;
}
