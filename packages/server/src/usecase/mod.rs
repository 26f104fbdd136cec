//! UseCase 層
//!
//! ドメイン層の trait（`Arc<dyn Trait>`）だけに依存し、UI 層から呼ばれます。

mod connect_presence;
mod create_conversation;
mod disconnect_presence;
pub mod error;
mod get_conversations;
mod get_room_messages;
mod get_rooms;
mod join_room;
mod leave_room;
mod send_message;

pub use connect_presence::{ConnectPresenceUseCase, PresenceSession};
pub use create_conversation::CreateConversationUseCase;
pub use disconnect_presence::DisconnectPresenceUseCase;
pub use error::{
    ConnectPresenceError, ConversationError, GetRoomError, GetRoomMessagesError, JoinRoomError,
    SendMessageError,
};
pub use get_conversations::GetConversationsUseCase;
pub use get_room_messages::GetRoomMessagesUseCase;
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::{Admission, JoinRoomUseCase, JoinedClient};
pub use leave_room::LeaveRoomUseCase;
pub use send_message::{MessageAuthor, PersistFailurePolicy, SendMessageUseCase};
