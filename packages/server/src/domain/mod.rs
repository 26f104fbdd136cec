//! ドメイン層
//!
//! Value Object、Entity、エラー、そして外部コラボレータ（ストア・認証・Presence・Hub）の
//! インターフェースを定義します。

pub mod entity;
pub mod error;
pub mod hub;
pub mod identity;
pub mod presence;
pub mod repository;
pub mod value_object;

pub use entity::{
    ChatMessage, Client, Conversation, LeaveTicket, MemberSnapshot, OutboundQueue, Participant,
    PresenceEvent, RoomSnapshot, counterparts_of,
};
pub use error::{
    HubError, IdentityError, JoinError, PresencePushError, RepositoryError, ValueObjectError,
};
pub use hub::ChatHub;
pub use identity::{Credentials, Identity, IdentityResolver};
pub use presence::{PresenceChannel, PresenceToken, PresenceTracker};
pub use repository::{ConversationRepository, MessageRepository};
pub use value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username,
};

#[cfg(test)]
pub use hub::MockChatHub;
#[cfg(test)]
pub use identity::MockIdentityResolver;
#[cfg(test)]
pub use presence::MockPresenceTracker;
#[cfg(test)]
pub use repository::{MockConversationRepository, MockMessageRepository};
