//! Room: one registry entry owned by the hub loop.
//!
//! All functions here are synchronous and side-effect free apart from
//! `try_send` on member queues, so they are tested without a runtime.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use tokio::sync::mpsc::error::TrySendError;

use crate::domain::{
    ChatMessage, Client, JoinError, LeaveTicket, MemberSnapshot, RoomId, RoomSnapshot, Timestamp,
    UserId,
};

use super::config::{HubConfig, OverflowPolicy};

/// Result of fanning one message out to a room
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Members whose queue accepted the message
    pub delivered: Vec<UserId>,
    /// Members that skipped the message because their queue was full
    pub dropped_full: Vec<UserId>,
    /// Members removed from the room (queue full under `Disconnect`, or queue closed)
    pub evicted: Vec<UserId>,
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    roster: HashSet<UserId>,
    members: HashMap<UserId, Client>,
    created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, roster: HashSet<UserId>, created_at: Timestamp) -> Self {
        Self {
            id,
            roster,
            members: HashMap::new(),
            created_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[cfg(test)]
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.members.contains_key(user_id)
    }

    /// Add a member. A second connection for the same identity is rejected.
    ///
    /// The roster is refreshed with the participants known at admission time.
    pub fn join(&mut self, client: Client, roster: HashSet<UserId>) -> Result<(), JoinError> {
        if self.members.contains_key(&client.user_id) {
            return Err(JoinError::AlreadyJoined {
                room_id: self.id.as_str().to_string(),
                user_id: client.user_id.as_str().to_string(),
            });
        }
        self.roster.extend(roster);
        self.members.insert(client.user_id.clone(), client);
        Ok(())
    }

    /// Remove the member named by `ticket` if it is still the same connection.
    ///
    /// Dropping the returned client drops the last queue sender, which closes the queue.
    pub fn leave(&mut self, ticket: &LeaveTicket) -> Option<Client> {
        let same_connection = self
            .members
            .get(&ticket.user_id)
            .is_some_and(|client| client.connection_id == ticket.connection_id);
        if same_connection {
            self.members.remove(&ticket.user_id)
        } else {
            None
        }
    }

    /// Enqueue `message` on every member's queue without blocking.
    pub fn fan_out(&mut self, message: &Arc<ChatMessage>, config: &HubConfig) -> FanOut {
        let mut result = FanOut::default();

        for (user_id, client) in &self.members {
            if !config.echo_to_sender && user_id == &message.from {
                continue;
            }
            match client.outbound.try_send(Arc::clone(message)) {
                Ok(()) => result.delivered.push(user_id.clone()),
                Err(TrySendError::Full(_)) => match config.overflow_policy {
                    OverflowPolicy::Disconnect => result.evicted.push(user_id.clone()),
                    OverflowPolicy::DropNewest => result.dropped_full.push(user_id.clone()),
                },
                Err(TrySendError::Closed(_)) => result.evicted.push(user_id.clone()),
            }
        }

        for user_id in &result.evicted {
            self.members.remove(user_id);
        }

        result
    }

    /// Users to notify on their presence connection: roster and members, minus the sender.
    pub fn notify_targets(&self, sender: &UserId) -> Vec<UserId> {
        self.roster
            .iter()
            .chain(self.members.keys())
            .filter(|id| *id != sender)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let mut members: Vec<MemberSnapshot> = self
            .members
            .values()
            .map(|client| MemberSnapshot {
                user_id: client.user_id.clone(),
                username: client.username.clone(),
                connection_id: client.connection_id,
            })
            .collect();
        members.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let mut roster: Vec<UserId> = self.roster.iter().cloned().collect();
        roster.sort();

        RoomSnapshot {
            room_id: self.id.clone(),
            members,
            roster,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{MessageContent, Username};
    use tokio::sync::mpsc;

    pub(crate) fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    pub(crate) fn client(
        room: &str,
        id: &str,
        capacity: usize,
    ) -> (Client, mpsc::Receiver<Arc<ChatMessage>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let client = Client::new(
            user(id),
            Username::try_from(id).unwrap(),
            RoomId::try_from(room).unwrap(),
            tx,
        );
        (client, rx)
    }

    pub(crate) fn message(room: &str, from: &str, content: &str) -> Arc<ChatMessage> {
        Arc::new(ChatMessage::new(
            RoomId::try_from(room).unwrap(),
            user(from),
            Username::try_from(from).unwrap(),
            MessageContent::try_from(content).unwrap(),
            Timestamp::new(1000),
        ))
    }

    fn room(id: &str) -> Room {
        Room::new(RoomId::try_from(id).unwrap(), HashSet::new(), Timestamp::new(0))
    }

    #[test]
    fn test_join_rejects_duplicate_identity() {
        // テスト項目: 同じユーザーの 2 本目の接続は拒否され、メンバーは 1 人のまま
        // given (前提条件):
        let mut room = room("r1");
        let (first, _rx1) = client("r1", "u1", 4);
        let (second, _rx2) = client("r1", "u1", 4);
        room.join(first.clone(), HashSet::new()).unwrap();

        // when (操作):
        let result = room.join(second, HashSet::new());

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinError::AlreadyJoined {
                room_id: "r1".to_string(),
                user_id: "u1".to_string(),
            })
        );
        assert_eq!(room.len(), 1);
        assert_eq!(room.snapshot().members[0].connection_id, first.connection_id);
    }

    #[test]
    fn test_leave_with_stale_ticket_is_noop() {
        // テスト項目: 古い接続の LeaveTicket では新しい接続は退出しない
        // given (前提条件):
        let mut room = room("r1");
        let (old, _rx_old) = client("r1", "u1", 4);
        let stale = old.ticket();
        room.join(old.clone(), HashSet::new()).unwrap();
        room.leave(&stale).unwrap();
        let (new, _rx_new) = client("r1", "u1", 4);
        room.join(new, HashSet::new()).unwrap();

        // when (操作):
        let removed = room.leave(&stale);

        // then (期待する結果):
        assert!(removed.is_none());
        assert!(room.contains(&user("u1")));
    }

    #[test]
    fn test_fan_out_with_echo_reaches_all_members() {
        // テスト項目: echo 有効時は送信者を含む全メンバーに 1 回ずつ配信される
        // given (前提条件):
        let mut room = room("r1");
        let (c1, mut rx1) = client("r1", "u1", 4);
        let (c2, mut rx2) = client("r1", "u2", 4);
        let (c3, mut rx3) = client("r1", "u3", 4);
        for c in [c1, c2, c3] {
            room.join(c, HashSet::new()).unwrap();
        }
        let msg = message("r1", "u1", "hello");

        // when (操作):
        let result = room.fan_out(&msg, &HubConfig::default());

        // then (期待する結果):
        assert_eq!(result.delivered.len(), 3);
        for rx in [&mut rx1, &mut rx2, &mut rx3] {
            let received = rx.try_recv().unwrap();
            assert_eq!(received.content.as_str(), "hello");
            assert_eq!(received.room_id.as_str(), "r1");
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_fan_out_without_echo_skips_sender() {
        // テスト項目: echo 無効時は送信者以外の N-1 人に配信される
        // given (前提条件):
        let mut room = room("r1");
        let (c1, mut rx1) = client("r1", "u1", 4);
        let (c2, mut rx2) = client("r1", "u2", 4);
        room.join(c1, HashSet::new()).unwrap();
        room.join(c2, HashSet::new()).unwrap();
        let config = HubConfig {
            echo_to_sender: false,
            ..HubConfig::default()
        };

        // when (操作):
        let result = room.fan_out(&message("r1", "u1", "hello"), &config);

        // then (期待する結果):
        assert_eq!(result.delivered, vec![user("u2")]);
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap().content.as_str(), "hello");
    }

    #[test]
    fn test_fan_out_disconnects_full_member() {
        // テスト項目: Disconnect ポリシーでは満杯のメンバーが退出させられ、キューが閉じる
        // given (前提条件):
        let mut room = room("r1");
        let (slow, mut slow_rx) = client("r1", "slow", 1);
        let (fast, mut fast_rx) = client("r1", "fast", 4);
        room.join(slow, HashSet::new()).unwrap();
        room.join(fast, HashSet::new()).unwrap();
        let config = HubConfig::default();
        room.fan_out(&message("r1", "fast", "m1"), &config);

        // when (操作):
        let result = room.fan_out(&message("r1", "fast", "m2"), &config);

        // then (期待する結果):
        assert_eq!(result.evicted, vec![user("slow")]);
        assert!(!room.contains(&user("slow")));
        assert_eq!(slow_rx.try_recv().unwrap().content.as_str(), "m1");
        assert!(matches!(
            slow_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        assert_eq!(fast_rx.try_recv().unwrap().content.as_str(), "m1");
        assert_eq!(fast_rx.try_recv().unwrap().content.as_str(), "m2");
    }

    #[test]
    fn test_fan_out_drop_newest_keeps_member() {
        // テスト項目: DropNewest ポリシーでは満杯のメンバーは残り、新しいメッセージだけ捨てられる
        // given (前提条件):
        let mut room = room("r1");
        let (slow, mut slow_rx) = client("r1", "slow", 1);
        room.join(slow, HashSet::new()).unwrap();
        let config = HubConfig {
            overflow_policy: OverflowPolicy::DropNewest,
            ..HubConfig::default()
        };
        room.fan_out(&message("r1", "u1", "m1"), &config);

        // when (操作):
        let result = room.fan_out(&message("r1", "u1", "m2"), &config);

        // then (期待する結果):
        assert_eq!(result.dropped_full, vec![user("slow")]);
        assert!(room.contains(&user("slow")));
        assert_eq!(slow_rx.try_recv().unwrap().content.as_str(), "m1");
        assert!(matches!(
            slow_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_fan_out_evicts_member_with_closed_queue() {
        // テスト項目: writer が終了した（受信側が閉じた）メンバーは退出させられる
        // given (前提条件):
        let mut room = room("r1");
        let (gone, gone_rx) = client("r1", "gone", 4);
        room.join(gone, HashSet::new()).unwrap();
        drop(gone_rx);

        // when (操作):
        let result = room.fan_out(&message("r1", "u1", "hello"), &HubConfig::default());

        // then (期待する結果):
        assert_eq!(result.evicted, vec![user("gone")]);
        assert!(room.is_empty());
    }

    #[test]
    fn test_notify_targets_union_of_roster_and_members_without_sender() {
        // テスト項目: 通知先は roster とメンバーの和集合から送信者を除いたもの
        // given (前提条件):
        let roster: HashSet<UserId> = [user("u1"), user("u2")].into_iter().collect();
        let mut room = Room::new(RoomId::try_from("r1").unwrap(), roster, Timestamp::new(0));
        let (guest, _rx) = client("r1", "u3", 4);
        room.join(guest, HashSet::new()).unwrap();

        // when (操作):
        let targets = room.notify_targets(&user("u1"));

        // then (期待する結果):
        assert_eq!(targets, vec![user("u2"), user("u3")]);
    }
}
