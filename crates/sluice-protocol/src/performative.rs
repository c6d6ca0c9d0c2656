//! Decoded link performatives.
//!
//! These are the link-relevant contents of AMQP Attach, Flow, Transfer,
//! Disposition and Detach frames after the codec has run. Session numbering
//! (handles, delivery ids, windows) stays with the codec/session collaborator:
//! frames are addressed to links by name and deliveries by tag.

use sluice_core::tag::DeliveryTag;

use crate::{
    definitions::{ReceiverSettleMode, Role, SenderSettleMode},
    delivery_state::{DeliveryState, ErrorCondition},
    sequence::SequenceNo,
    terminus::{Source, Target},
    value::{Fields, Symbol},
};

/// Attach: the peer (or we) attached a link endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Attach {
    /// Link name, unique per direction within a connection
    pub name: String,
    /// Role of the endpoint that sent the Attach
    pub role: Role,
    /// Sender settle mode proposed by the endpoint
    pub snd_settle_mode: SenderSettleMode,
    /// Receiver settle mode proposed by the endpoint
    pub rcv_settle_mode: ReceiverSettleMode,
    /// Source terminus
    pub source: Option<Source>,
    /// Target terminus
    pub target: Option<Target>,
    /// Sender's initial delivery count; only meaningful when `role` is sender
    pub initial_delivery_count: Option<SequenceNo>,
    /// Capabilities the endpoint supports
    pub offered_capabilities: Option<Vec<Symbol>>,
    /// Capabilities the endpoint wants the peer to support
    pub desired_capabilities: Option<Vec<Symbol>>,
    /// Link properties
    pub properties: Option<Fields>,
}

/// Flow: link-level flow control state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Flow {
    /// Delivery count of the endpoint that sent the Flow; `None` when a
    /// receiver has not yet seen the sender's Attach
    pub delivery_count: Option<SequenceNo>,
    /// Credit the receiver grants, as seen by the endpoint that sent the Flow
    pub link_credit: u32,
    /// Deliveries the sender could send if it had credit
    pub available: Option<u32>,
    /// Drain requested (receiver) or acknowledged (sender)
    pub drain: bool,
}

/// Transfer: one frame of a delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    /// Tag of the delivery the frame belongs to
    pub delivery_tag: DeliveryTag,
    /// State the sender attaches to the delivery
    pub state: Option<DeliveryState>,
    /// The sender settled the delivery before sending it
    pub settled: bool,
    /// More frames follow for this delivery
    pub more: bool,
    /// Size of the payload carried by this frame, in bytes
    pub payload_size: usize,
}

/// Disposition: state or settlement change for one or more deliveries.
#[derive(Debug, Clone, PartialEq)]
pub struct Disposition {
    /// Role of the endpoint that sent the Disposition
    pub role: Role,
    /// Deliveries the disposition applies to
    pub delivery_tags: Vec<DeliveryTag>,
    /// New delivery state
    pub state: Option<DeliveryState>,
    /// The endpoint settled the deliveries
    pub settled: bool,
}

/// Detach: the endpoint suspended (`closed == false`) or closed the link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detach {
    /// The link is closed rather than merely detached
    pub closed: bool,
    /// Why the link was detached
    pub error: Option<ErrorCondition>,
}

/// Link performatives that can be exchanged between peers.
#[derive(Debug, Clone, PartialEq)]
pub enum Performative {
    /// Attach a link endpoint
    Attach(Attach),
    /// Update flow control state
    Flow(Flow),
    /// Transfer (part of) a delivery
    Transfer(Transfer),
    /// Update delivery state or settlement
    Disposition(Disposition),
    /// Detach or close the link
    Detach(Detach),
}

impl Performative {
    /// Returns the performative name, as used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Performative::Attach(_) => "attach",
            Performative::Flow(_) => "flow",
            Performative::Transfer(_) => "transfer",
            Performative::Disposition(_) => "disposition",
            Performative::Detach(_) => "detach",
        }
    }
}

/// A performative addressed to a link by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Name of the link the performative belongs to
    pub link: String,
    /// The performative itself
    pub body: Performative,
}

impl Frame {
    /// Creates a frame addressed to `link`.
    pub fn new(link: impl Into<String>, body: Performative) -> Self {
        Self { link: link.into(), body }
    }
}
