/**
 * WebSocket Wire Messages
 *
 * This module defines the JSON envelope exchanged in both directions over
 * the `/ws` connection, and the decoding of inbound control messages.
 *
 * # Envelope
 *
 * ```json
 * { "type": "join_room", "data": { "roomId": "video:42" }, "userId": "...", "roomId": "..." }
 * ```
 *
 * `userId` and `roomId` are optional and omitted when absent. `data` is any
 * JSON value and defaults to `null`.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Message type tags used on the wire
pub mod message_types {
    /// Client liveness check
    pub const PING: &str = "ping";
    /// Reply to `ping`
    pub const PONG: &str = "pong";
    /// Client asks to move into a room
    pub const JOIN_ROOM: &str = "join_room";
    /// Client asks to leave its room
    pub const LEAVE_ROOM: &str = "leave_room";
    /// Reply to `join_room`
    pub const ROOM_JOINED: &str = "room_joined";
    /// Reply to `leave_room`
    pub const ROOM_LEFT: &str = "room_left";
    /// Server push carrying a freshly created notification
    pub const NOTIFICATION: &str = "notification";
}

/// One JSON frame on the WebSocket transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WsMessage {
    /// Discriminating type tag
    #[serde(rename = "type")]
    pub message_type: String,
    /// Arbitrary payload
    #[serde(default)]
    pub data: serde_json::Value,
    /// Optional user id the frame refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Optional room id the frame refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

/// Decoded inbound control message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Ping,
    JoinRoom { room_id: String },
    LeaveRoom,
    /// Any other type tag; ignored by the server
    Unknown(String),
}

impl WsMessage {
    /// Create a frame with only a type and data
    pub fn new(message_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            message_type: message_type.into(),
            data,
            user_id: None,
            room_id: None,
        }
    }

    /// Reply to a client `ping`
    pub fn pong() -> Self {
        Self::new(message_types::PONG, serde_json::json!("pong"))
    }

    /// Reply to a successful `join_room`
    pub fn room_joined(room_id: &str) -> Self {
        Self::new(
            message_types::ROOM_JOINED,
            serde_json::json!({
                "roomId": room_id,
                "message": format!("Joined room {}", room_id),
            }),
        )
    }

    /// Reply to `leave_room`
    pub fn room_left() -> Self {
        Self::new(message_types::ROOM_LEFT, serde_json::json!("Left room successfully"))
    }

    /// Decode a text frame
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode as a text frame
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Interpret this frame as an inbound control message
    ///
    /// `join_room` must carry `{"roomId": "<string>"}` in `data`; anything
    /// else is a protocol error.
    pub fn command(&self) -> Result<ClientCommand, SharedError> {
        match self.message_type.as_str() {
            message_types::PING => Ok(ClientCommand::Ping),
            message_types::JOIN_ROOM => {
                let room_id = self
                    .data
                    .get("roomId")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| SharedError::protocol("join_room requires a string roomId"))?;
                Ok(ClientCommand::JoinRoom {
                    room_id: room_id.to_string(),
                })
            }
            message_types::LEAVE_ROOM => Ok(ClientCommand::LeaveRoom),
            other => Ok(ClientCommand::Unknown(other.to_string())),
        }
    }
}
