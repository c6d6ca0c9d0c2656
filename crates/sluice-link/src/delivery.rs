//! A single message transfer on a link and its settlement state.
//!
//! Deliveries are owned by their link's [`DeliveryList`](crate::delivery_list::DeliveryList)
//! and addressed by [`DeliveryId`]. Applications read them through shared
//! references and mutate them through the owning [`Link`](crate::Link),
//! which keeps the link's counters consistent.

use sluice_core::tag::DeliveryTag;
use sluice_protocol::DeliveryState;

use crate::handle::LinkHandle;

/// Generational identifier of a delivery within its link.
///
/// Identifiers of freed deliveries never resolve again, even after the slot
/// is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeliveryId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// One message transfer on a link.
#[derive(Debug, Clone)]
pub struct Delivery {
    id: DeliveryId,
    tag: DeliveryTag,
    link: LinkHandle,

    local_state: Option<DeliveryState>,
    remote_state: Option<DeliveryState>,
    settled: bool,
    remote_settled: bool,

    /// Counted in the link's queued total
    pub(crate) queued: bool,
    /// Handed to the transport (sender side)
    pub(crate) sent: bool,
    /// More transfer frames are expected (receiver side)
    pub(crate) partial: bool,
    /// Peer has been told (or told us) the delivery is settled
    pub(crate) settlement_reported: bool,
    /// Bytes received and not yet read
    pub(crate) readable: usize,
    /// Bytes waiting to be written by the transport
    pub(crate) writable: usize,
    updated: bool,
}

impl Delivery {
    pub(crate) fn new(tag: DeliveryTag, link: LinkHandle) -> Self {
        Self {
            id: DeliveryId::default(),
            tag,
            link,
            local_state: None,
            remote_state: None,
            settled: false,
            remote_settled: false,
            queued: false,
            sent: false,
            partial: false,
            settlement_reported: false,
            readable: 0,
            writable: 0,
            updated: false,
        }
    }

    pub(crate) fn assign_id(&mut self, id: DeliveryId) {
        self.id = id;
    }

    /// Identifier of the delivery within its link.
    pub fn id(&self) -> DeliveryId {
        self.id
    }

    /// Delivery tag, unique among the link's unsettled deliveries.
    pub fn tag(&self) -> &DeliveryTag {
        &self.tag
    }

    /// Link that owns the delivery.
    pub fn link(&self) -> LinkHandle {
        self.link
    }

    /// State set locally, if any.
    pub fn local_state(&self) -> Option<&DeliveryState> {
        self.local_state.as_ref()
    }

    /// State last reported by the peer, if any.
    pub fn remote_state(&self) -> Option<&DeliveryState> {
        self.remote_state.as_ref()
    }

    /// True once settled locally. Never reverts.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// True once the peer has settled the delivery.
    pub fn remote_settled(&self) -> bool {
        self.remote_settled
    }

    /// True while more transfer frames are expected from the peer.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// True while the delivery still counts against the link's queued total.
    pub fn is_queued(&self) -> bool {
        self.queued
    }

    /// True once the delivery has been handed to the transport.
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// True if the peer changed state or settlement since the last
    /// [`Link::clear_updated`](crate::Link::clear_updated).
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Received bytes not yet read.
    pub fn available(&self) -> usize {
        self.readable
    }

    /// True if received bytes are waiting to be read.
    pub fn is_readable(&self) -> bool {
        self.readable > 0
    }

    /// Bytes the transport still has to write for this delivery.
    pub fn pending(&self) -> usize {
        self.writable
    }

    pub(crate) fn set_local_state(&mut self, state: Option<DeliveryState>) {
        self.local_state = state;
    }

    pub(crate) fn set_remote_state(&mut self, state: DeliveryState) {
        self.remote_state = Some(state);
        self.updated = true;
    }

    pub(crate) fn mark_settled(&mut self) {
        self.settled = true;
    }

    pub(crate) fn mark_remote_settled(&mut self) {
        if !self.remote_settled {
            self.remote_settled = true;
            self.settlement_reported = true;
            self.updated = true;
        }
    }

    pub(crate) fn mark_updated(&mut self) {
        self.updated = true;
    }

    pub(crate) fn clear_updated(&mut self) {
        self.updated = false;
    }

    /// Settled with the peer informed, and no longer queued.
    pub(crate) fn is_freeable(&self) -> bool {
        self.settled && !self.queued && self.settlement_reported
    }
}
