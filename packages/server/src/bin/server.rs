//! Hiroba chat relay server.
//!
//! Clients join a room over WebSocket and exchange messages with the other
//! participants; a separate presence connection carries notifications.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --echo-to-sender false
//! ```

use clap::Parser;
use hiroba_server::{
    app::{App, DEFAULT_PRESENCE_CAPACITY, ServerConfig, parse_token_spec},
    domain::Identity,
    infrastructure::hub::{HubConfig, OverflowPolicy},
    ui::Server,
    usecase::PersistFailurePolicy,
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time chat relay with rooms and presence notifications", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Capacity of each client's outbound queue
    #[arg(long, default_value_t = HubConfig::default().outbound_capacity)]
    outbound_capacity: usize,

    /// What to do when a client's outbound queue is full
    #[arg(long, value_enum, default_value_t = OverflowPolicy::Disconnect)]
    overflow_policy: OverflowPolicy,

    /// Deliver each message back to its sender
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    echo_to_sender: bool,

    /// What to do with a message that could not be persisted
    #[arg(long, value_enum, default_value_t = PersistFailurePolicy::Suppress)]
    persist_failure: PersistFailurePolicy,

    /// Capacity of each presence connection's queue
    #[arg(long, default_value_t = DEFAULT_PRESENCE_CAPACITY)]
    presence_capacity: usize,

    /// Require a bearer token; reject `?user_id=` identities
    #[arg(long)]
    no_query_identity: bool,

    /// Register a bearer token as TOKEN:USER_ID[:USERNAME] (repeatable)
    #[arg(long = "token", value_name = "TOKEN:USER_ID[:USERNAME]", value_parser = parse_token_spec)]
    tokens: Vec<(String, Identity)>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            hub: HubConfig {
                outbound_capacity: self.outbound_capacity,
                overflow_policy: self.overflow_policy,
                echo_to_sender: self.echo_to_sender,
                ..HubConfig::default()
            },
            persist_failure: self.persist_failure,
            presence_capacity: self.presence_capacity,
            allow_query_identity: !self.no_query_identity,
            tokens: self.tokens.clone(),
            message_capacity_per_room: None,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = args.server_config();
    tracing::info!(
        "Hub config: outbound_capacity={}, overflow_policy={:?}, echo_to_sender={}, persist_failure={:?}",
        config.hub.outbound_capacity,
        config.hub.overflow_policy,
        config.hub.echo_to_sender,
        config.persist_failure
    );

    let app = App::build(&config);
    let server = Server::new(app.state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
