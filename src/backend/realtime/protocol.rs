/**
 * Inbound Frame Handling
 *
 * Decodes one client text frame and acts on it. `ping` is answered straight
 * from the reading task; room changes go through the dispatcher so they stay
 * ordered with broadcasts. Anything malformed or unknown is logged and
 * dropped without closing the connection.
 */

use tokio::sync::mpsc::WeakUnboundedSender;

use crate::backend::realtime::dispatcher::Dispatcher;
use crate::backend::realtime::registry::ConnectionId;
use crate::shared::{ClientCommand, WsMessage};

/// Handle one inbound text frame from `connection_id`
///
/// `sender` is weak: the registry holds the only strong sender, so a pong
/// can only reach a connection that is still registered.
pub fn handle_frame(
    dispatcher: &Dispatcher,
    connection_id: ConnectionId,
    sender: &WeakUnboundedSender<WsMessage>,
    text: &str,
) {
    let message = match WsMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "[Realtime] Ignoring malformed frame");
            return;
        }
    };

    match message.command() {
        Ok(ClientCommand::Ping) => {
            let sent = sender
                .upgrade()
                .is_some_and(|sender| sender.send(WsMessage::pong()).is_ok());
            if !sent {
                tracing::debug!(connection_id = %connection_id, "[Realtime] Pong dropped, connection closed");
            }
        }
        Ok(ClientCommand::JoinRoom { room_id }) => dispatcher.join_room(connection_id, room_id),
        Ok(ClientCommand::LeaveRoom) => dispatcher.leave_room(connection_id),
        Ok(ClientCommand::Unknown(message_type)) => {
            tracing::debug!(connection_id = %connection_id, %message_type, "[Realtime] Ignoring unknown message type");
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "[Realtime] Ignoring invalid command");
        }
    }
}
