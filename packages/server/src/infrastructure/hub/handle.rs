//! Cloneable handle to the hub loop.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    ChatHub, ChatMessage, Client, HubError, JoinError, LeaveTicket, RoomId, RoomSnapshot, UserId,
};

use super::{
    metrics::{HubMetrics, HubMetricsSnapshot},
    runner::{InspectRequest, JoinRequest},
};

/// Sends requests to the hub over its join, leave, broadcast and inspect channels.
///
/// The hub loop stops once every clone of the handle is dropped.
#[derive(Clone)]
pub struct HubHandle {
    join_tx: mpsc::Sender<JoinRequest>,
    leave_tx: mpsc::UnboundedSender<LeaveTicket>,
    broadcast_tx: mpsc::Sender<Arc<ChatMessage>>,
    inspect_tx: mpsc::Sender<InspectRequest>,
    metrics: Arc<HubMetrics>,
}

impl HubHandle {
    pub(super) fn new(
        join_tx: mpsc::Sender<JoinRequest>,
        leave_tx: mpsc::UnboundedSender<LeaveTicket>,
        broadcast_tx: mpsc::Sender<Arc<ChatMessage>>,
        inspect_tx: mpsc::Sender<InspectRequest>,
        metrics: Arc<HubMetrics>,
    ) -> Self {
        Self {
            join_tx,
            leave_tx,
            broadcast_tx,
            inspect_tx,
            metrics,
        }
    }

    pub fn metrics(&self) -> HubMetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn inspect<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> InspectRequest,
    ) -> Result<T, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.inspect_tx
            .send(request(reply_tx))
            .await
            .map_err(|_| HubError::Unavailable)?;
        reply_rx.await.map_err(|_| HubError::Unavailable)
    }
}

#[async_trait]
impl ChatHub for HubHandle {
    async fn join(&self, client: Client, roster: HashSet<UserId>) -> Result<(), JoinError> {
        let (reply, reply_rx) = oneshot::channel();
        self.join_tx
            .send(JoinRequest {
                client,
                roster,
                reply,
            })
            .await
            .map_err(|_| JoinError::HubUnavailable)?;
        reply_rx.await.map_err(|_| JoinError::HubUnavailable)?
    }

    fn leave(&self, ticket: LeaveTicket) {
        if self.leave_tx.send(ticket).is_err() {
            tracing::debug!("Hub is not running, leave ignored");
        }
    }

    async fn route(&self, message: ChatMessage) -> Result<(), HubError> {
        self.broadcast_tx
            .send(Arc::new(message))
            .await
            .map_err(|_| HubError::Unavailable)
    }

    async fn rooms(&self) -> Result<Vec<RoomSnapshot>, HubError> {
        self.inspect(InspectRequest::Rooms).await
    }

    async fn room(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, HubError> {
        let room_id = room_id.clone();
        self.inspect(move |reply| InspectRequest::Room(room_id, reply))
            .await
    }
}
