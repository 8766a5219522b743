//! Property-based tests for the connection registry

use std::collections::HashMap;

use proptest::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use socialhub::backend::realtime::{BroadcastMessage, BroadcastTarget, ConnectionRegistry};
use socialhub::shared::WsMessage;

#[derive(Debug, Clone)]
enum Op {
    Register { slot: usize, user: usize, room: Option<usize> },
    Unregister { slot: usize },
    Join { slot: usize, room: usize },
    Leave { slot: usize },
    Drop { slot: usize },
    Broadcast { room: usize },
}

const SLOTS: usize = 6;
const ROOMS: usize = 3;
const USERS: usize = 3;

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SLOTS, 0..USERS, proptest::option::of(0..ROOMS))
            .prop_map(|(slot, user, room)| Op::Register { slot, user, room }),
        (0..SLOTS).prop_map(|slot| Op::Unregister { slot }),
        (0..SLOTS, 0..ROOMS).prop_map(|(slot, room)| Op::Join { slot, room }),
        (0..SLOTS).prop_map(|slot| Op::Leave { slot }),
        (0..SLOTS).prop_map(|slot| Op::Drop { slot }),
        (0..ROOMS).prop_map(|room| Op::Broadcast { room }),
    ]
}

fn room_name(room: usize) -> String {
    format!("video:{}", room)
}

proptest! {
    #[test]
    fn test_room_membership_stays_exclusive(ops in proptest::collection::vec(op(), 1..60)) {
        let ids: Vec<Uuid> = (0..SLOTS).map(|_| Uuid::new_v4()).collect();
        let users: Vec<Uuid> = (0..USERS).map(|_| Uuid::new_v4()).collect();
        let mut receivers: HashMap<Uuid, mpsc::UnboundedReceiver<WsMessage>> = HashMap::new();
        let mut registry = ConnectionRegistry::new();

        for op in ops {
            match op {
                Op::Register { slot, user, room } => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    receivers.insert(ids[slot], rx);
                    registry.register(ids[slot], Some(users[user]), room.map(room_name), tx);
                }
                Op::Unregister { slot } => {
                    registry.unregister(ids[slot]);
                }
                Op::Join { slot, room } => {
                    let joined = registry.join_room(ids[slot], &room_name(room));
                    prop_assert_eq!(joined, registry.contains(ids[slot]));
                }
                Op::Leave { slot } => {
                    registry.leave_room(ids[slot]);
                    prop_assert_eq!(registry.room_of(ids[slot]), None);
                }
                Op::Drop { slot } => {
                    // the writer went away without unregistering
                    receivers.remove(&ids[slot]);
                }
                Op::Broadcast { room } => {
                    let expected = registry.recipients(&BroadcastTarget::Room(room_name(room)));
                    let report = registry.deliver(&BroadcastMessage {
                        message: WsMessage::new("tick", serde_json::Value::Null),
                        target: BroadcastTarget::Room(room_name(room)),
                    });
                    prop_assert_eq!(report.delivered + report.pruned, expected.len());
                    for id in expected {
                        prop_assert_eq!(registry.contains(id), receivers.contains_key(&id));
                    }
                }
            }

            prop_assert!(registry.is_consistent());
            for id in &ids {
                let rooms_holding = (0..ROOMS)
                    .filter(|r| {
                        registry
                            .room_members(&room_name(*r))
                            .is_some_and(|m| m.contains(id))
                    })
                    .count();
                prop_assert!(rooms_holding <= 1);
                prop_assert_eq!(rooms_holding == 1, registry.room_of(*id).is_some());
            }
        }

        let stats = registry.stats();
        prop_assert_eq!(stats.total_connections, registry.len());
        prop_assert_eq!(stats.rooms.values().sum::<usize>(), (0..SLOTS)
            .filter(|s| registry.room_of(ids[*s]).is_some())
            .count());
    }
}
