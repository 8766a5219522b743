/**
 * Connection Registry
 *
 * The authoritative in-process record of who is connected and how to reach
 * them. A registry is owned by exactly one task, the dispatch loop in
 * `dispatcher.rs`, so none of its methods lock anything.
 *
 * # Indexes
 *
 * - `connections`: connection id → `Connection` (user id, room, outbound sender)
 * - `rooms`: room id → set of connection ids currently in that room
 *
 * Every id in `rooms[r]` is present in `connections` with `room_id == Some(r)`,
 * and a room entry is removed as soon as its set becomes empty.
 *
 * # Transport handle
 *
 * A connection is reached through an unbounded sender feeding that
 * connection's writer task. Dropping the `Connection` drops the sender,
 * which ends the writer task and closes the socket. A failed send means the
 * writer task is already gone.
 */

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::WsMessage;

/// Identifies one live connection
pub type ConnectionId = Uuid;

/// Outbound half of a connection: frames queued for its writer task
pub type ConnectionSender = mpsc::UnboundedSender<WsMessage>;

/// One live client session
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    /// `None` for anonymous sessions
    pub user_id: Option<Uuid>,
    /// Current room, at most one
    pub room_id: Option<String>,
    sender: ConnectionSender,
}

impl Connection {
    /// Queue a frame for this connection's writer
    ///
    /// Returns `false` when the writer task has gone away.
    pub fn send(&self, message: WsMessage) -> bool {
        self.sender.send(message).is_ok()
    }
}

/// Addressing mode of a broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastTarget {
    /// Every live connection of one user
    User(Uuid),
    /// Every connection currently joined to a room
    Room(String),
    /// Every live connection
    All,
}

/// An ephemeral unit of fan-out work
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastMessage {
    pub message: WsMessage,
    pub target: BroadcastTarget,
}

/// Outcome of delivering one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections the frame was queued for
    pub delivered: usize,
    /// Connections unregistered because their writer was gone
    pub pruned: usize,
}

/// Point-in-time counts for read-only introspection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_connections: usize,
    pub rooms: HashMap<String, usize>,
}

/// In-memory connection index
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection, optionally placing it in an initial room
    ///
    /// An empty room id means "no room". Registering an id that is already
    /// present replaces the old entry, which is closed.
    pub fn register(
        &mut self,
        id: ConnectionId,
        user_id: Option<Uuid>,
        room_id: Option<String>,
        sender: ConnectionSender,
    ) {
        self.unregister(id);

        let room_id = room_id.filter(|r| !r.is_empty());
        if let Some(room) = &room_id {
            self.rooms.entry(room.clone()).or_default().insert(id);
        }
        self.connections.insert(
            id,
            Connection {
                id,
                user_id,
                room_id,
                sender,
            },
        );
    }

    /// Remove a connection from every index
    ///
    /// Returns the removed entry; dropping it closes the transport. Removing
    /// an absent id is a no-op.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        if let Some(room) = &connection.room_id {
            self.remove_from_room(id, room);
        }
        Some(connection)
    }

    /// Move a connection into `room_id`, leaving its previous room
    ///
    /// Returns `false` if the connection is not registered. Joining the empty
    /// room id is the same as leaving.
    pub fn join_room(&mut self, id: ConnectionId, room_id: &str) -> bool {
        if room_id.is_empty() {
            return self.leave_room(id);
        }
        let Some(connection) = self.connections.get_mut(&id) else {
            return false;
        };

        if connection.room_id.as_deref() == Some(room_id) {
            return true;
        }
        let previous = connection.room_id.replace(room_id.to_string());
        if let Some(previous) = previous {
            self.remove_from_room(id, &previous);
        }
        self.rooms.entry(room_id.to_string()).or_default().insert(id);
        true
    }

    /// Take a connection out of its room, if any
    ///
    /// Returns `false` if the connection is not registered.
    pub fn leave_room(&mut self, id: ConnectionId) -> bool {
        let Some(connection) = self.connections.get_mut(&id) else {
            return false;
        };
        if let Some(previous) = connection.room_id.take() {
            self.remove_from_room(id, &previous);
        }
        true
    }

    fn remove_from_room(&mut self, id: ConnectionId, room_id: &str) {
        if let Some(members) = self.rooms.get_mut(room_id) {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(room_id);
            }
        }
    }

    /// Connections a broadcast should reach
    pub fn recipients(&self, target: &BroadcastTarget) -> Vec<ConnectionId> {
        match target {
            BroadcastTarget::Room(room_id) => self
                .rooms
                .get(room_id)
                .map(|members| members.iter().copied().collect())
                .unwrap_or_default(),
            BroadcastTarget::User(user_id) => self
                .connections
                .values()
                .filter(|c| c.user_id == Some(*user_id))
                .map(|c| c.id)
                .collect(),
            BroadcastTarget::All => self.connections.keys().copied().collect(),
        }
    }

    /// Queue a frame for one connection, unregistering it if the send fails
    ///
    /// Returns `true` if the frame was queued.
    pub fn send_to(&mut self, id: ConnectionId, message: WsMessage) -> bool {
        let Some(connection) = self.connections.get(&id) else {
            return false;
        };
        if connection.send(message) {
            return true;
        }
        tracing::warn!(connection_id = %id, "Send failed, unregistering connection");
        self.unregister(id);
        false
    }

    /// Fan a broadcast out to its recipients
    pub fn deliver(&mut self, broadcast: &BroadcastMessage) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for id in self.recipients(&broadcast.target) {
            if self.send_to(id, broadcast.message.clone()) {
                report.delivered += 1;
            } else {
                report.pruned += 1;
            }
        }
        report
    }

    /// Unregister every connection, closing them all
    pub fn drain(&mut self) -> usize {
        let count = self.connections.len();
        self.rooms.clear();
        self.connections.clear();
        count
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Room a connection currently belongs to
    pub fn room_of(&self, id: ConnectionId) -> Option<&str> {
        self.connections.get(&id).and_then(|c| c.room_id.as_deref())
    }

    /// Members of a room, `None` if the room has no members
    pub fn room_members(&self, room_id: &str) -> Option<&HashSet<ConnectionId>> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Snapshot of connection counts
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_connections: self.connections.len(),
            rooms: self
                .rooms
                .iter()
                .map(|(room, members)| (room.clone(), members.len()))
                .collect(),
        }
    }

    /// Check the room index against the primary set
    pub fn is_consistent(&self) -> bool {
        let indexed = self.rooms.iter().all(|(room, members)| {
            !members.is_empty()
                && members.iter().all(|id| {
                    self.connections
                        .get(id)
                        .is_some_and(|c| c.room_id.as_deref() == Some(room.as_str()))
                })
        });
        let placed = self.connections.values().all(|c| match &c.room_id {
            Some(room) => self.rooms.get(room).is_some_and(|m| m.contains(&c.id)),
            None => true,
        });
        indexed && placed
    }
}
