//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::PresenceTracker,
    infrastructure::hub::HubHandle,
    usecase::{
        ConnectPresenceUseCase, CreateConversationUseCase, DisconnectPresenceUseCase,
        GetConversationsUseCase, GetRoomDetailUseCase, GetRoomMessagesUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（Room 参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// ConnectPresenceUseCase（Presence 接続開始のユースケース）
    pub connect_presence_usecase: Arc<ConnectPresenceUseCase>,
    /// DisconnectPresenceUseCase（Presence 接続終了のユースケース）
    pub disconnect_presence_usecase: Arc<DisconnectPresenceUseCase>,
    pub create_conversation_usecase: Arc<CreateConversationUseCase>,
    pub get_conversations_usecase: Arc<GetConversationsUseCase>,
    pub get_room_messages_usecase: Arc<GetRoomMessagesUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Hub counters for the debug endpoint
    pub hub: HubHandle,
    /// Online users for the debug endpoint
    pub presence: Arc<dyn PresenceTracker>,
}
