//! Composition root: wires in-memory infrastructure, the hub and use cases
//! into an [`AppState`].

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};

use crate::{
    domain::{Identity, UserId, Username},
    infrastructure::{
        hub::{Hub, HubConfig},
        identity::InMemoryIdentityResolver,
        presence::InMemoryPresenceTracker,
        repository::{InMemoryConversationRepository, InMemoryMessageRepository},
    },
    ui::AppState,
    usecase::{
        ConnectPresenceUseCase, CreateConversationUseCase, DisconnectPresenceUseCase,
        GetConversationsUseCase, GetRoomDetailUseCase, GetRoomMessagesUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, PersistFailurePolicy, SendMessageUseCase,
    },
};

/// Default capacity of a presence connection's queue
pub const DEFAULT_PRESENCE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub hub: HubConfig,
    pub persist_failure: PersistFailurePolicy,
    pub presence_capacity: usize,
    /// Accept `?user_id=` as identity when no bearer token is given
    pub allow_query_identity: bool,
    /// Bearer tokens known to the identity resolver
    pub tokens: Vec<(String, Identity)>,
    /// Per-room limit of the message store (`None` for unlimited)
    pub message_capacity_per_room: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            persist_failure: PersistFailurePolicy::default(),
            presence_capacity: DEFAULT_PRESENCE_CAPACITY,
            allow_query_identity: true,
            tokens: Vec::new(),
            message_capacity_per_room: None,
        }
    }
}

/// Wired application
///
/// The stores are exposed so that callers can seed conversations.
pub struct App {
    pub state: AppState,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
}

impl App {
    /// Build the application and spawn the hub loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(config: &ServerConfig) -> Self {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    pub fn build_with_clock(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Infrastructure
        let identity_resolver = Arc::new(config.tokens.iter().cloned().fold(
            InMemoryIdentityResolver::new(config.allow_query_identity),
            |resolver, (token, identity)| resolver.with_token(token, identity),
        ));
        let conversations = Arc::new(InMemoryConversationRepository::new(clock.clone()));
        let messages = Arc::new(match config.message_capacity_per_room {
            Some(capacity) => InMemoryMessageRepository::with_capacity_per_room(capacity),
            None => InMemoryMessageRepository::new(),
        });
        let presence = Arc::new(InMemoryPresenceTracker::new());

        // 2. Hub
        let hub = Hub::spawn(config.hub.clone(), presence.clone(), clock.clone());
        let hub_ref = Arc::new(hub.clone());

        // 3. UseCases
        let state = AppState {
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                identity_resolver.clone(),
                conversations.clone(),
                hub_ref.clone(),
                config.hub.outbound_capacity,
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(hub_ref.clone())),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                messages.clone(),
                hub_ref.clone(),
                clock,
                config.persist_failure,
            )),
            connect_presence_usecase: Arc::new(ConnectPresenceUseCase::new(
                identity_resolver.clone(),
                conversations.clone(),
                presence.clone(),
                config.presence_capacity,
            )),
            disconnect_presence_usecase: Arc::new(DisconnectPresenceUseCase::new(
                conversations.clone(),
                presence.clone(),
            )),
            create_conversation_usecase: Arc::new(CreateConversationUseCase::new(
                identity_resolver.clone(),
                conversations.clone(),
            )),
            get_conversations_usecase: Arc::new(GetConversationsUseCase::new(
                identity_resolver.clone(),
                conversations.clone(),
            )),
            get_room_messages_usecase: Arc::new(GetRoomMessagesUseCase::new(
                identity_resolver,
                conversations.clone(),
                messages.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(hub_ref.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(hub_ref)),
            hub,
            presence,
        };

        Self {
            state,
            conversations,
            messages,
        }
    }
}

/// Parse `TOKEN:USER_ID[:USERNAME]`. The username defaults to the user id.
pub fn parse_token_spec(spec: &str) -> Result<(String, Identity), String> {
    let mut parts = spec.splitn(3, ':');
    let token = parts.next().unwrap_or_default().trim();
    let user_id = parts.next().unwrap_or_default().trim();
    if token.is_empty() || user_id.is_empty() {
        return Err(format!(
            "invalid token spec '{spec}', expected TOKEN:USER_ID[:USERNAME]"
        ));
    }
    let username = parts.next().map(str::trim).unwrap_or(user_id);

    let user_id = UserId::try_from(user_id).map_err(|e| e.to_string())?;
    let username = Username::try_from(username).map_err(|e| e.to_string())?;
    Ok((
        token.to_string(),
        Identity {
            user_id,
            username,
            email: None,
        },
    ))
}
