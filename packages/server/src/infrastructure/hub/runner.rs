//! The hub loop.
//!
//! One task owns the [`RoomRegistry`] and processes join, leave and route
//! requests strictly one at a time. No lock guards the registry; the channel
//! ordering is the only synchronization.

use std::{collections::HashSet, sync::Arc};

use hiroba_shared::time::Clock;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    ChatMessage, Client, JoinError, LeaveTicket, PresenceEvent, PresencePushError,
    PresenceTracker, RoomId, RoomSnapshot, Timestamp, UserId,
};

use super::{
    config::HubConfig, handle::HubHandle, metrics::HubMetrics, registry::RoomRegistry,
};

pub(super) struct JoinRequest {
    pub client: Client,
    pub roster: HashSet<UserId>,
    pub reply: oneshot::Sender<Result<(), JoinError>>,
}

pub(super) enum InspectRequest {
    Rooms(oneshot::Sender<Vec<RoomSnapshot>>),
    Room(RoomId, oneshot::Sender<Option<RoomSnapshot>>),
}

pub struct Hub {
    config: HubConfig,
    registry: RoomRegistry,
    presence: Arc<dyn PresenceTracker>,
    clock: Arc<dyn Clock>,
    metrics: Arc<HubMetrics>,
    join_rx: mpsc::Receiver<JoinRequest>,
    leave_rx: mpsc::UnboundedReceiver<LeaveTicket>,
    broadcast_rx: mpsc::Receiver<Arc<ChatMessage>>,
    inspect_rx: mpsc::Receiver<InspectRequest>,
}

impl Hub {
    /// Create the hub and a handle to it. The hub does nothing until [`Hub::run`] is polled.
    pub fn new(
        config: HubConfig,
        presence: Arc<dyn PresenceTracker>,
        clock: Arc<dyn Clock>,
    ) -> (Self, HubHandle) {
        let capacity = config.command_capacity.max(1);
        let (join_tx, join_rx) = mpsc::channel(capacity);
        let (leave_tx, leave_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(capacity);
        let (inspect_tx, inspect_rx) = mpsc::channel(capacity);
        let metrics = Arc::new(HubMetrics::default());

        let handle = HubHandle::new(join_tx, leave_tx, broadcast_tx, inspect_tx, metrics.clone());
        let hub = Self {
            config,
            registry: RoomRegistry::new(),
            presence,
            clock,
            metrics,
            join_rx,
            leave_rx,
            broadcast_rx,
            inspect_rx,
        };
        (hub, handle)
    }

    /// Create the hub and spawn its loop on the current runtime.
    pub fn spawn(
        config: HubConfig,
        presence: Arc<dyn PresenceTracker>,
        clock: Arc<dyn Clock>,
    ) -> HubHandle {
        let (hub, handle) = Self::new(config, presence, clock);
        tokio::spawn(hub.run());
        handle
    }

    /// Process requests until every handle has been dropped.
    pub async fn run(mut self) {
        tracing::info!("Hub started");
        loop {
            tokio::select! {
                biased;
                Some(ticket) = self.leave_rx.recv() => self.handle_leave(ticket),
                Some(request) = self.join_rx.recv() => self.handle_join(request),
                // Inspection is rare and cheap; ahead of broadcast so a busy
                // room cannot starve it.
                Some(request) = self.inspect_rx.recv() => self.handle_inspect(request),
                Some(message) = self.broadcast_rx.recv() => self.handle_route(message).await,
                else => break,
            }
        }
        tracing::info!("Hub stopped");
    }

    fn handle_join(&mut self, request: JoinRequest) {
        let JoinRequest {
            client,
            roster,
            reply,
        } = request;
        let ticket = client.ticket();
        let now = Timestamp::new(self.clock.now_millis());

        let result = self.registry.join(client, roster, now);
        let joined = result.is_ok();
        self.metrics.record_join(joined);
        match &result {
            Ok(()) => tracing::info!("Client '{}' joined room '{}'", ticket.user_id, ticket.room_id),
            Err(e) => tracing::warn!("Rejected join: {}", e),
        }

        // A requester that stopped waiting never starts a pump, so nobody
        // would ever send the Leave for this connection.
        if reply.send(result).is_err() && joined {
            tracing::warn!(
                "Join requester of '{}' in room '{}' is gone, undoing the join",
                ticket.user_id,
                ticket.room_id
            );
            self.handle_leave(ticket);
        }
    }

    fn handle_leave(&mut self, ticket: LeaveTicket) {
        if self.registry.leave(&ticket) {
            self.metrics.record_leave();
            tracing::info!(
                "Client '{}' left room '{}'",
                ticket.user_id,
                ticket.room_id
            );
        } else {
            tracing::debug!(
                "Leave for '{}' in room '{}' ignored (already gone)",
                ticket.user_id,
                ticket.room_id
            );
        }
    }

    async fn handle_route(&mut self, message: Arc<ChatMessage>) {
        let Some(outcome) = self.registry.route(&message, &self.config) else {
            self.metrics.record_unknown_room();
            tracing::warn!(
                "Room '{}' is not active, dropping message from '{}'",
                message.room_id,
                message.from
            );
            return;
        };

        let fan_out = &outcome.fan_out;
        self.metrics.record_route(
            fan_out.delivered.len(),
            fan_out.dropped_full.len(),
            fan_out.evicted.len(),
        );
        tracing::debug!(
            "Routed message from '{}' to {} member(s) of room '{}'",
            message.from,
            fan_out.delivered.len(),
            message.room_id
        );
        for user_id in &fan_out.dropped_full {
            tracing::warn!("Outbound queue of '{}' is full, message dropped", user_id);
        }
        for user_id in &fan_out.evicted {
            tracing::warn!(
                "Client '{}' evicted from room '{}' (outbound queue full or closed)",
                user_id,
                message.room_id
            );
        }
        if outcome.room_evicted {
            tracing::info!("Room '{}' is empty and was evicted", message.room_id);
        }

        for user_id in &outcome.notify {
            let event = PresenceEvent::Notification {
                from: message.from.clone(),
                username: message.username.clone(),
                content: message.content.clone(),
            };
            match self.presence.push_to(user_id, event).await {
                Ok(()) => self.metrics.record_notification(),
                Err(PresencePushError::ClientNotFound(_)) => {}
                Err(e) => tracing::debug!("Notification not delivered: {}", e),
            }
        }
    }

    fn handle_inspect(&self, request: InspectRequest) {
        match request {
            InspectRequest::Rooms(reply) => {
                let _ = reply.send(self.registry.snapshots());
            }
            InspectRequest::Room(room_id, reply) => {
                let _ = reply.send(self.registry.snapshot(&room_id));
            }
        }
    }
}
