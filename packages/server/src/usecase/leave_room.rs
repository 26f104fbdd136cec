//! UseCase: Room からの退出
//!
//! Connection Pump の終了処理から、接続ごとにちょうど 1 回呼ばれる。

use std::sync::Arc;

use crate::domain::{ChatHub, LeaveTicket};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    hub: Arc<dyn ChatHub>,
}

impl LeaveRoomUseCase {
    pub fn new(hub: Arc<dyn ChatHub>) -> Self {
        Self { hub }
    }

    /// 退出を要求する（ブロックしない）
    ///
    /// Hub は接続 ID が一致する場合にのみメンバーを削除するため、
    /// 既に追い出された接続の退出要求は何もしない。
    pub fn execute(&self, ticket: LeaveTicket) {
        tracing::debug!(
            "Leaving room '{}' as '{}' ({})",
            ticket.room_id,
            ticket.user_id,
            ticket.connection_id
        );
        self.hub.leave(ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, MockChatHub, RoomId, UserId};

    #[test]
    fn test_leave_forwards_ticket_to_hub() {
        // テスト項目: 退出要求がそのまま Hub に 1 回だけ渡される
        // given (前提条件):
        let ticket = LeaveTicket {
            room_id: RoomId::try_from("r1").unwrap(),
            user_id: UserId::try_from("u1").unwrap(),
            connection_id: ConnectionId::generate(),
        };
        let expected = ticket.clone();
        let mut hub = MockChatHub::new();
        hub.expect_leave()
            .withf(move |t| t == &expected)
            .times(1)
            .return_const(());
        let usecase = LeaveRoomUseCase::new(Arc::new(hub));

        // when (操作):
        usecase.execute(ticket);

        // then (期待する結果): MockChatHub の times(1) で検証
    }
}
