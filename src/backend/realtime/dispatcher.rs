/**
 * Dispatch Loop
 *
 * The single point of serialization for every registry mutation and every
 * outbound send. One task owns the `ConnectionRegistry` and consumes
 * commands from an unbounded channel strictly in submission order, so a
 * broadcast submitted after a room join always sees the join.
 *
 * # Handle
 *
 * `Dispatcher` is the cloneable handle the rest of the application holds.
 * Its methods enqueue a command and return immediately; callers never wait
 * for delivery and never observe delivery failures.
 *
 * # Introspection
 *
 * After each mutation the loop publishes a `RegistryStats` snapshot behind a
 * short-held `RwLock`. `room_connection_count` and `total_connections` read
 * that snapshot from any task without touching the registry.
 *
 * # Lifecycle
 *
 * `Dispatcher::start()` spawns the loop. `Dispatcher::stop()` enqueues a
 * shutdown: the loop closes every connection and exits, and later commands
 * are dropped.
 */

use std::sync::{Arc, RwLock};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::realtime::registry::{
    BroadcastMessage, BroadcastTarget, ConnectionId, ConnectionRegistry, ConnectionSender,
    RegistryStats,
};
use crate::shared::WsMessage;

/// Work accepted by the dispatch loop
#[derive(Debug)]
enum Command {
    Register {
        id: ConnectionId,
        user_id: Option<Uuid>,
        room_id: Option<String>,
        sender: ConnectionSender,
    },
    Unregister {
        id: ConnectionId,
    },
    JoinRoom {
        id: ConnectionId,
        room_id: String,
    },
    LeaveRoom {
        id: ConnectionId,
    },
    Broadcast(BroadcastMessage),
    /// Resolves once every earlier command has been handled
    Sync(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle to the dispatch loop
#[derive(Clone, Debug)]
pub struct Dispatcher {
    commands: mpsc::UnboundedSender<Command>,
    stats: Arc<RwLock<RegistryStats>>,
}

impl Dispatcher {
    /// Spawn the dispatch loop on the current runtime
    ///
    /// Returns the handle and the loop's join handle; the loop ends after
    /// `stop()` or once every handle has been dropped.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let stats = Arc::new(RwLock::new(RegistryStats::default()));

        let dispatch_loop = DispatchLoop {
            registry: ConnectionRegistry::new(),
            commands: receiver,
            stats: stats.clone(),
        };
        let handle = tokio::spawn(dispatch_loop.run());

        tracing::info!("[Realtime] Dispatch loop started");
        (Self { commands, stats }, handle)
    }

    fn submit(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            tracing::debug!("[Realtime] Dispatch loop stopped, dropping {:?}", e.0);
        }
    }

    /// Register a new connection and return its id
    pub fn register(
        &self,
        user_id: Option<Uuid>,
        room_id: Option<String>,
        sender: ConnectionSender,
    ) -> ConnectionId {
        let id = Uuid::new_v4();
        self.submit(Command::Register {
            id,
            user_id,
            room_id,
            sender,
        });
        id
    }

    /// Unregister a connection; a no-op if it is already gone
    pub fn unregister(&self, id: ConnectionId) {
        self.submit(Command::Unregister { id });
    }

    /// Move a connection into a room; the loop replies `room_joined`
    pub fn join_room(&self, id: ConnectionId, room_id: impl Into<String>) {
        self.submit(Command::JoinRoom {
            id,
            room_id: room_id.into(),
        });
    }

    /// Take a connection out of its room; the loop replies `room_left`
    pub fn leave_room(&self, id: ConnectionId) {
        self.submit(Command::LeaveRoom { id });
    }

    /// Enqueue a broadcast
    pub fn broadcast(&self, broadcast: BroadcastMessage) {
        self.submit(Command::Broadcast(broadcast));
    }

    /// Push to every live connection of one user
    pub fn broadcast_to_user(&self, user_id: Uuid, message_type: &str, data: serde_json::Value) {
        self.broadcast(BroadcastMessage {
            message: WsMessage::new(message_type, data),
            target: BroadcastTarget::User(user_id),
        });
    }

    /// Push to every connection currently in a room
    pub fn broadcast_to_room(&self, room_id: &str, message_type: &str, data: serde_json::Value) {
        self.broadcast(BroadcastMessage {
            message: WsMessage::new(message_type, data),
            target: BroadcastTarget::Room(room_id.to_string()),
        });
    }

    /// Push to every live connection
    pub fn broadcast_to_all(&self, message_type: &str, data: serde_json::Value) {
        self.broadcast(BroadcastMessage {
            message: WsMessage::new(message_type, data),
            target: BroadcastTarget::All,
        });
    }

    /// Wait until every command submitted before this call has been handled
    ///
    /// Returns immediately if the loop has stopped.
    pub async fn sync(&self) {
        let (tx, rx) = oneshot::channel();
        self.submit(Command::Sync(tx));
        let _ = rx.await;
    }

    /// Close every connection and end the loop
    pub fn stop(&self) {
        self.submit(Command::Shutdown);
    }

    /// Number of connections in a room, from the latest snapshot
    pub fn room_connection_count(&self, room_id: &str) -> usize {
        self.read_stats(|stats| stats.rooms.get(room_id).copied().unwrap_or(0))
    }

    /// Number of live connections, from the latest snapshot
    pub fn total_connections(&self) -> usize {
        self.read_stats(|stats| stats.total_connections)
    }

    fn read_stats<T>(&self, f: impl FnOnce(&RegistryStats) -> T) -> T {
        match self.stats.read() {
            Ok(stats) => f(&stats),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }
}

/// The task that owns the registry
struct DispatchLoop {
    registry: ConnectionRegistry,
    commands: mpsc::UnboundedReceiver<Command>,
    stats: Arc<RwLock<RegistryStats>>,
}

impl DispatchLoop {
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            if !self.handle(command) {
                break;
            }
        }

        let closed = self.registry.drain();
        self.publish_stats();
        self.commands.close();
        tracing::info!(closed, "[Realtime] Dispatch loop stopped");
    }

    /// Apply one command; returns `false` when the loop should exit
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Register {
                id,
                user_id,
                room_id,
                sender,
            } => {
                tracing::info!(
                    connection_id = %id,
                    user_id = ?user_id,
                    room_id = ?room_id,
                    "[Realtime] Client connected"
                );
                self.registry.register(id, user_id, room_id, sender);
                self.publish_stats();
            }
            Command::Unregister { id } => {
                if let Some(connection) = self.registry.unregister(id) {
                    tracing::info!(
                        connection_id = %id,
                        user_id = ?connection.user_id,
                        room_id = ?connection.room_id,
                        "[Realtime] Client disconnected"
                    );
                    self.publish_stats();
                }
            }
            Command::JoinRoom { id, room_id } => {
                if self.registry.join_room(id, &room_id) {
                    tracing::debug!(connection_id = %id, %room_id, "[Realtime] Joined room");
                    self.registry.send_to(id, WsMessage::room_joined(&room_id));
                    self.publish_stats();
                }
            }
            Command::LeaveRoom { id } => {
                if self.registry.leave_room(id) {
                    tracing::debug!(connection_id = %id, "[Realtime] Left room");
                    self.registry.send_to(id, WsMessage::room_left());
                    self.publish_stats();
                }
            }
            Command::Broadcast(broadcast) => {
                let report = self.registry.deliver(&broadcast);
                tracing::debug!(
                    message_type = %broadcast.message.message_type,
                    target = ?broadcast.target,
                    delivered = report.delivered,
                    pruned = report.pruned,
                    "[Realtime] Broadcast delivered"
                );
                if report.pruned > 0 {
                    self.publish_stats();
                }
            }
            Command::Sync(done) => {
                let _ = done.send(());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn publish_stats(&self) {
        let snapshot = self.registry.stats();
        match self.stats.write() {
            Ok(mut stats) => *stats = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
