//! HTTP and WebSocket handlers.

mod http;
mod presence;
mod websocket;

pub use http::{
    create_conversation, debug_hub, get_conversations, get_room_detail, get_room_messages,
    get_rooms, health_check,
};
pub use presence::join_app_handler;
pub use websocket::join_room_handler;
