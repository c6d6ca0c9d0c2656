//! Link-level credit accounting (AMQP 1.0, 2.6.7).
//!
//! Both ends of a link track credit, but from opposite sides:
//!
//! - A **receiver** grants credit with `flow`, and each delivery it consumes
//!   (moves its cursor off) uses one unit up. Deliveries that arrived but were
//!   not yet consumed are `queued`.
//! - A **sender** learns its credit from the peer's Flow. Advancing over a
//!   delivery uses one unit; the delivery stays `queued` until the transport
//!   takes it, and the transport may only take it while the sent delivery count
//!   is below the peer's limit.
//!
//! In both cases the peer's view of credit is `credit - queued`, which can go
//! negative on a sender that advanced past its credit.
//!
//! # Drain
//!
//! A receiver sets `drain` to ask the sender to use up or give back all of
//! its credit. The sender gives back unused credit with [`CreditController::drained`],
//! which advances the delivery count so the peer sees the credit consumed. On
//! the receiver that reconciliation shows up as a jump in the sender's
//! delivery count, reported through its own [`CreditController::drained`].
//!
//! # Example
//!
//! ```
//! use sluice_link::credit::CreditController;
//! use sluice_protocol::{Flow, Role};
//!
//! let mut sender = CreditController::new(Role::Sender, 0);
//! sender.on_flow(&Flow { delivery_count: Some(0), link_credit: 2, ..Default::default() });
//! assert_eq!(sender.credit(), 2);
//!
//! sender.on_delivery_queued();
//! sender.on_advance();
//! assert_eq!(sender.credit(), 1);
//! assert_eq!(sender.remote_credit(), 0);
//! ```

use sluice_protocol::{
    sequence::{sequence_delta, sequence_greater_than, sequence_less_than},
    Flow, Role, SequenceNo,
};
use tracing::{debug, warn};

const MAX_CREDIT: u32 = i32::MAX as u32;

/// Credit, queue and drain state of one link endpoint.
#[derive(Debug, Clone)]
pub struct CreditController {
    role: Role,
    /// Credit as seen locally; may go negative on a sender
    credit: i32,
    /// Deliveries created/arrived and not yet sent/consumed
    queued: u32,
    drain: bool,
    /// Receiver: credit the sender gave back since the last `drained` call
    drained: u32,
    /// Sender: deliveries handed to the transport. Receiver: deliveries received.
    delivery_count: SequenceNo,
    /// Sender: delivery count after every advanced or drained delivery
    advanced: SequenceNo,
    /// Sender: peer delivery count plus peer link credit
    limit: SequenceNo,
    initial_delivery_count: SequenceNo,
    /// Receiver: the sender's delivery count is known (its Attach arrived)
    delivery_count_known: bool,
    flow_pending: bool,
}

impl CreditController {
    /// Creates a controller for `role`. A sender starts counting at
    /// `initial_delivery_count`; a receiver adopts the sender's value when
    /// the peer's Attach arrives.
    pub fn new(role: Role, initial_delivery_count: SequenceNo) -> Self {
        Self {
            role,
            credit: 0,
            queued: 0,
            drain: false,
            drained: 0,
            delivery_count: initial_delivery_count,
            advanced: initial_delivery_count,
            limit: initial_delivery_count,
            initial_delivery_count,
            delivery_count_known: role.is_sender(),
            flow_pending: false,
        }
    }

    /// Local credit.
    pub fn credit(&self) -> i32 {
        self.credit
    }

    /// Deliveries not yet sent (sender) or consumed (receiver).
    pub fn queued(&self) -> u32 {
        self.queued
    }

    /// Credit as the peer sees it.
    pub fn remote_credit(&self) -> i32 {
        self.credit.saturating_sub(self.queued.min(MAX_CREDIT) as i32)
    }

    /// Current drain flag.
    pub fn drain(&self) -> bool {
        self.drain
    }

    /// Receiver: drain requested and unused credit still outstanding.
    pub fn draining(&self) -> bool {
        self.drain && self.credit > self.queued.min(MAX_CREDIT) as i32
    }

    /// Delivery count as it goes on the wire.
    pub fn delivery_count(&self) -> SequenceNo {
        self.delivery_count
    }

    /// Sender: true if the peer's limit allows one more transfer.
    pub fn can_send(&self) -> bool {
        self.role.is_sender() && sequence_less_than(self.delivery_count, self.limit)
    }

    /// A delivery was created (sender) and now waits to be advanced and sent.
    pub fn on_delivery_queued(&mut self) {
        self.queued = self.queued.saturating_add(1);
    }

    /// Sender: the cursor moved off a delivery, using one unit of credit.
    pub fn on_advance(&mut self) {
        debug_assert!(self.role.is_sender());
        self.credit = self.credit.saturating_sub(1);
        self.advanced = self.advanced.wrapping_add(1);
    }

    /// Sender: the transport took one delivery.
    pub fn on_sent(&mut self) {
        self.queued = self.queued.saturating_sub(1);
        self.delivery_count = self.delivery_count.wrapping_add(1);
    }

    /// Receiver: a new delivery arrived from the peer.
    pub fn on_received(&mut self) {
        if self.remote_credit() <= 0 {
            warn!(credit = self.credit, queued = self.queued, "peer sent a delivery without credit");
        }
        self.queued = self.queued.saturating_add(1);
        self.delivery_count = self.delivery_count.wrapping_add(1);
    }

    /// Receiver: the application consumed a queued delivery.
    pub fn on_consumed(&mut self) {
        debug_assert!(self.role.is_receiver());
        self.queued = self.queued.saturating_sub(1);
        self.credit = self.credit.saturating_sub(1);
    }

    /// Receiver: grants `credits` more deliveries.
    pub fn grant(&mut self, credits: u32) {
        self.credit = self.credit.saturating_add(credits.min(MAX_CREDIT) as i32);
        self.flow_pending = true;
    }

    /// Receiver: sets the drain flag to be sent with the next Flow.
    pub fn set_drain(&mut self, drain: bool) {
        if self.drain != drain {
            self.drain = drain;
            self.flow_pending = true;
        }
    }

    /// Receiver: the peer's Attach told us where its delivery count starts.
    pub fn record_peer_initial_delivery_count(&mut self, delivery_count: SequenceNo) {
        if self.role.is_receiver() {
            self.delivery_count = delivery_count;
            self.delivery_count_known = true;
        }
    }

    /// Returns credit given back through drain.
    ///
    /// A draining sender gives back all remaining credit, advancing its
    /// delivery count so the peer sees it consumed; the second call returns 0.
    /// A receiver returns what the sender gave back since the last call.
    pub fn drained(&mut self) -> u32 {
        match self.role {
            Role::Sender => {
                if !self.drain || self.credit <= 0 {
                    return 0;
                }
                let returned = self.credit as u32;
                self.credit = 0;
                self.advanced = self.advanced.wrapping_add(returned);
                self.delivery_count = self.delivery_count.wrapping_add(returned);
                self.flow_pending = true;
                debug!(returned, delivery_count = self.delivery_count, "drained sender credit");
                returned
            }
            Role::Receiver => std::mem::take(&mut self.drained),
        }
    }

    /// Applies the peer's Flow. Returns false if it was ignored as
    /// inconsistent with our own accounting.
    pub fn on_flow(&mut self, flow: &Flow) -> bool {
        match self.role {
            Role::Sender => self.on_sender_flow(flow),
            Role::Receiver => self.on_receiver_flow(flow),
        }
    }

    fn on_sender_flow(&mut self, flow: &Flow) -> bool {
        let peer_count = flow.delivery_count.unwrap_or(self.initial_delivery_count);
        if sequence_greater_than(peer_count, self.delivery_count) {
            warn!(
                peer_count,
                delivery_count = self.delivery_count,
                "peer flow acknowledges deliveries that were never sent; ignoring"
            );
            return false;
        }

        self.limit = peer_count.wrapping_add(flow.link_credit.min(MAX_CREDIT));
        self.credit = sequence_delta(self.limit, self.advanced) as i32;
        self.drain = flow.drain;
        debug!(limit = self.limit, credit = self.credit, drain = self.drain, "peer flow applied");
        true
    }

    fn on_receiver_flow(&mut self, flow: &Flow) -> bool {
        let Some(peer_count) = flow.delivery_count else {
            return true;
        };
        let delta = sequence_delta(peer_count, self.delivery_count);
        if delta > 0 {
            // The sender moved its count without transfers: drained credit.
            let returned = delta.min(i64::from(MAX_CREDIT)) as u32;
            self.delivery_count = peer_count;
            self.credit = self.credit.saturating_sub(returned as i32);
            self.drained = self.drained.saturating_add(returned);
            debug!(returned, delivery_count = peer_count, "sender drained credit");
        }
        true
    }

    /// Snapshot of our flow state for an outbound Flow.
    pub fn flow_state(&self) -> Flow {
        match self.role {
            Role::Sender => Flow {
                delivery_count: Some(self.delivery_count),
                link_credit: sequence_delta(self.limit, self.delivery_count).max(0) as u32,
                available: Some(self.queued),
                drain: self.drain,
            },
            Role::Receiver => Flow {
                delivery_count: self.delivery_count_known.then_some(self.delivery_count),
                link_credit: self.remote_credit().max(0) as u32,
                available: None,
                drain: self.drain,
            },
        }
    }

    /// True if a Flow should be sent; clears the flag.
    pub fn take_flow_pending(&mut self) -> bool {
        std::mem::take(&mut self.flow_pending)
    }

    /// True if a Flow should be sent.
    pub fn has_flow_pending(&self) -> bool {
        self.flow_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(delivery_count: u32, link_credit: u32, drain: bool) -> Flow {
        Flow { delivery_count: Some(delivery_count), link_credit, available: None, drain }
    }

    #[test]
    fn test_receiver_grant_and_consume() {
        let mut receiver = CreditController::new(Role::Receiver, 0);
        receiver.grant(3);
        assert_eq!(receiver.credit(), 3);
        assert!(receiver.take_flow_pending());
        assert!(!receiver.take_flow_pending());

        receiver.on_received();
        assert_eq!(receiver.queued(), 1);
        assert_eq!(receiver.remote_credit(), 2);

        receiver.on_consumed();
        assert_eq!(receiver.credit(), 2);
        assert_eq!(receiver.queued(), 0);
        assert_eq!(receiver.remote_credit(), 2);
    }

    #[test]
    fn test_sender_credit_from_flow() {
        let mut sender = CreditController::new(Role::Sender, 0);
        assert!(sender.on_flow(&flow(0, 5, false)));
        assert_eq!(sender.credit(), 5);

        for _ in 0..3 {
            sender.on_delivery_queued();
            sender.on_advance();
        }
        assert_eq!(sender.credit(), 2);
        assert_eq!(sender.remote_credit(), -1);

        while sender.can_send() && sender.queued() > 0 {
            sender.on_sent();
        }
        assert_eq!(sender.delivery_count(), 3);
        assert_eq!(sender.remote_credit(), 2);

        // Flow written before the peer saw our transfers.
        assert!(sender.on_flow(&flow(0, 5, false)));
        assert_eq!(sender.credit(), 2);
    }

    #[test]
    fn test_sender_blocks_at_limit() {
        let mut sender = CreditController::new(Role::Sender, 0);
        sender.on_flow(&flow(0, 1, false));

        sender.on_delivery_queued();
        sender.on_advance();
        sender.on_delivery_queued();
        sender.on_advance();
        assert_eq!(sender.credit(), -1);

        assert!(sender.can_send());
        sender.on_sent();
        assert!(!sender.can_send());
        assert_eq!(sender.queued(), 1);
    }

    #[test]
    fn test_sender_ignores_flow_ahead_of_sent_count() {
        let mut sender = CreditController::new(Role::Sender, 0);
        assert!(!sender.on_flow(&flow(4, 10, false)));
        assert_eq!(sender.credit(), 0);
    }

    #[test]
    fn test_sender_drain_returns_remaining_credit_once() {
        let mut sender = CreditController::new(Role::Sender, 0);
        sender.on_flow(&flow(0, 5, true));
        sender.on_delivery_queued();
        sender.on_advance();

        assert_eq!(sender.drained(), 4);
        assert_eq!(sender.credit(), 0);
        assert_eq!(sender.drained(), 0);
        assert!(sender.take_flow_pending());

        // The advanced delivery still fits under the limit.
        assert!(sender.can_send());
        sender.on_sent();
        assert_eq!(sender.delivery_count(), 5);
        assert_eq!(sender.flow_state().link_credit, 0);
    }

    #[test]
    fn test_receiver_sees_drained_credit() {
        let mut receiver = CreditController::new(Role::Receiver, 0);
        receiver.record_peer_initial_delivery_count(10);
        receiver.grant(5);
        receiver.set_drain(true);
        assert!(receiver.draining());

        receiver.on_flow(&flow(15, 0, true));
        assert_eq!(receiver.credit(), 0);
        assert!(!receiver.draining());
        assert_eq!(receiver.drained(), 5);
        assert_eq!(receiver.drained(), 0);
    }

    #[test]
    fn test_receiver_flow_state_before_attach() {
        let mut receiver = CreditController::new(Role::Receiver, 0);
        receiver.grant(7);
        let state = receiver.flow_state();
        assert_eq!(state.delivery_count, None);
        assert_eq!(state.link_credit, 7);

        receiver.record_peer_initial_delivery_count(u32::MAX);
        assert_eq!(receiver.flow_state().delivery_count, Some(u32::MAX));
    }

    #[test]
    fn test_counts_wrap() {
        let mut sender = CreditController::new(Role::Sender, u32::MAX);
        sender.on_flow(&flow(u32::MAX, 2, false));
        sender.on_delivery_queued();
        sender.on_advance();
        sender.on_sent();
        assert_eq!(sender.delivery_count(), 0);
        assert!(sender.can_send());
        assert_eq!(sender.credit(), 1);
    }
}
