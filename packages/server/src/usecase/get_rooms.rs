//! UseCase: 稼働中の Room の一覧・詳細（Hub のスナップショット）

use std::sync::Arc;

use crate::domain::{ChatHub, RoomId, RoomSnapshot};

use super::error::GetRoomError;

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    hub: Arc<dyn ChatHub>,
}

impl GetRoomsUseCase {
    pub fn new(hub: Arc<dyn ChatHub>) -> Self {
        Self { hub }
    }

    /// Room ID 順の一覧
    pub async fn execute(&self) -> Result<Vec<RoomSnapshot>, GetRoomError> {
        self.hub
            .rooms()
            .await
            .map_err(|_| GetRoomError::HubUnavailable)
    }
}

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    hub: Arc<dyn ChatHub>,
}

impl GetRoomDetailUseCase {
    pub fn new(hub: Arc<dyn ChatHub>) -> Self {
        Self { hub }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomSnapshot, GetRoomError> {
        self.hub
            .room(room_id)
            .await
            .map_err(|_| GetRoomError::HubUnavailable)?
            .ok_or_else(|| GetRoomError::RoomNotFound(room_id.to_string()))
    }
}
