use crate::value::{Fields, Symbol};

/// Which parts of the terminus state survive a restart (AMQP 1.0, 3.5.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminusDurability {
    /// No terminus state is retained durably
    #[default]
    None,
    /// Only the existence and configuration of the terminus is retained
    Configuration,
    /// Configuration and unsettled state are retained
    UnsettledState,
}

/// When the expiry timer of a terminus starts (AMQP 1.0, 3.5.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminusExpiryPolicy {
    /// Timer starts when the link is detached
    #[default]
    LinkDetach,
    /// Timer starts when the session ends
    SessionEnd,
    /// Timer starts when the connection closes
    ConnectionClose,
    /// The terminus never expires
    Never,
}

/// Source terminus: where deliveries originate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Source {
    /// Address of the source node
    pub address: Option<String>,
    /// Durability of the terminus
    pub durable: TerminusDurability,
    /// Expiry policy
    pub expiry_policy: TerminusExpiryPolicy,
    /// Expiry timeout in seconds
    pub timeout: u32,
    /// Request the peer to create the node
    pub dynamic: bool,
    /// Distribution mode, e.g. `move` or `copy`
    pub distribution_mode: Option<Symbol>,
    /// Message filters
    pub filter: Option<Fields>,
    /// Outcomes the source supports
    pub outcomes: Option<Vec<Symbol>>,
    /// Extension capabilities of the source node
    pub capabilities: Option<Vec<Symbol>>,
}

impl Source {
    /// Creates a source bound to `address` with default terminus settings.
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()), ..Default::default() }
    }
}

/// Target terminus: where deliveries are sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Target {
    /// Address of the target node
    pub address: Option<String>,
    /// Durability of the terminus
    pub durable: TerminusDurability,
    /// Expiry policy
    pub expiry_policy: TerminusExpiryPolicy,
    /// Expiry timeout in seconds
    pub timeout: u32,
    /// Request the peer to create the node
    pub dynamic: bool,
    /// Extension capabilities of the target node
    pub capabilities: Option<Vec<Symbol>>,
}

impl Target {
    /// Creates a target bound to `address` with default terminus settings.
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()), ..Default::default() }
    }
}
