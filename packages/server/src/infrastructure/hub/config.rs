//! Hub configuration.

/// What the hub does when a member's outbound queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OverflowPolicy {
    /// Remove the slow member from its room and close its queue.
    #[default]
    Disconnect,
    /// Skip this message for the slow member and keep it connected.
    DropNewest,
}

#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of each client's outbound queue
    pub outbound_capacity: usize,
    /// Capacity of the hub's join, broadcast and inspect channels
    pub command_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    /// Whether the sender receives its own message back
    pub echo_to_sender: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            command_capacity: 256,
            overflow_policy: OverflowPolicy::Disconnect,
            echo_to_sender: true,
        }
    }
}
