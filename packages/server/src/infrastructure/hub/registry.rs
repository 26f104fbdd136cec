//! Room registry: room id to room, mutated only by the hub loop.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::domain::{ChatMessage, Client, JoinError, LeaveTicket, RoomId, RoomSnapshot, Timestamp, UserId};

use super::{
    config::HubConfig,
    room::{FanOut, Room},
};

/// Result of routing a message to an existing room
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    pub fan_out: FanOut,
    /// Users to notify on their presence connection
    pub notify: Vec<UserId>,
    /// Whether the room was evicted because fan-out removed its last member
    pub room_evicted: bool,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[cfg(test)]
    pub fn members_of(&self, room_id: &RoomId) -> Vec<UserId> {
        self.rooms
            .get(room_id)
            .map(|room| {
                room.snapshot()
                    .members
                    .into_iter()
                    .map(|m| m.user_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach `client` to its room, materializing the room on first join.
    pub fn join(
        &mut self,
        client: Client,
        roster: HashSet<UserId>,
        now: Timestamp,
    ) -> Result<(), JoinError> {
        let room_id = client.room_id.clone();
        let is_new = !self.rooms.contains_key(&room_id);
        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), HashSet::new(), now));
        let result = room.join(client, roster);
        if result.is_err() && is_new {
            self.rooms.remove(&room_id);
        }
        result
    }

    /// Detach the connection named by `ticket`. Empty rooms are evicted.
    ///
    /// Returns `true` when a member was removed.
    pub fn leave(&mut self, ticket: &LeaveTicket) -> bool {
        let Some(room) = self.rooms.get_mut(&ticket.room_id) else {
            return false;
        };
        let removed = room.leave(ticket).is_some();
        if room.is_empty() {
            self.rooms.remove(&ticket.room_id);
        }
        removed
    }

    /// Fan `message` out to its room. `None` when the room is not registered.
    pub fn route(&mut self, message: &Arc<ChatMessage>, config: &HubConfig) -> Option<RouteOutcome> {
        let room = self.rooms.get_mut(&message.room_id)?;
        let fan_out = room.fan_out(message, config);
        let notify = room.notify_targets(&message.from);
        let room_evicted = room.is_empty();
        if room_evicted {
            self.rooms.remove(&message.room_id);
        }
        Some(RouteOutcome {
            fan_out,
            notify,
            room_evicted,
        })
    }

    pub fn snapshots(&self) -> Vec<RoomSnapshot> {
        let mut rooms: Vec<RoomSnapshot> = self.rooms.values().map(Room::snapshot).collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }

    pub fn snapshot(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        self.rooms.get(room_id).map(Room::snapshot)
    }
}
