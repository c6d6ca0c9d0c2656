use sluice_core::tag::DeliveryTag;
use sluice_protocol::{
    Attach, Detach, Disposition, EndpointState, Flow, Performative, Transfer,
};
use tracing::{debug, trace, warn};

use crate::{
    delivery::{Delivery, DeliveryId},
    work::WorkKind,
};

use super::Link;

impl Link {
    /// Applies a performative received from the peer.
    ///
    /// Peer misbehaviour (a frame that contradicts our own accounting, an
    /// unknown delivery tag) is logged, counted in the statistics and
    /// otherwise ignored; it never changes link state.
    pub fn process_performative(&mut self, performative: &Performative) {
        trace!(link = %self.name, kind = performative.name(), "processing peer performative");
        match performative {
            Performative::Attach(attach) => self.on_remote_attach(attach),
            Performative::Flow(flow) => self.on_remote_flow(flow),
            Performative::Transfer(transfer) => self.on_remote_transfer(transfer),
            Performative::Disposition(disposition) => self.on_remote_disposition(disposition),
            Performative::Detach(detach) => self.on_remote_detach(detach),
        }
    }

    fn ignore(&mut self, reason: &str) {
        warn!(link = %self.name, reason, "ignoring peer frame");
        self.statistics.frames_ignored += 1;
    }

    fn on_remote_attach(&mut self, attach: &Attach) {
        if attach.role == self.role {
            self.ignore("peer attached with our own role");
            return;
        }
        debug!(link = %self.name, role = ?attach.role, "peer attached");
        self.remote_state = EndpointState::Active;
        self.remote_detached = false;
        self.remote_condition = None;
        self.remote_source = attach.source.clone();
        self.remote_target = attach.target.clone();
        self.settlement.record_remote(attach.snd_settle_mode, attach.rcv_settle_mode);
        self.capabilities.record_remote(
            attach.offered_capabilities.clone(),
            attach.desired_capabilities.clone(),
            attach.properties.clone(),
        );
        if let Some(initial) = attach.initial_delivery_count {
            self.credit.record_peer_initial_delivery_count(initial);
        }
        self.notifier.notify(WorkKind::State);
    }

    fn on_remote_flow(&mut self, flow: &Flow) {
        if !self.credit.on_flow(flow) {
            self.statistics.frames_ignored += 1;
            return;
        }
        self.notifier.notify(WorkKind::Flow);
    }

    fn on_remote_transfer(&mut self, transfer: &Transfer) {
        if self.role.is_sender() {
            self.ignore("transfer received on a sending link");
            return;
        }

        if let Some(&id) = self.unsettled.get(&transfer.delivery_tag) {
            let Some(delivery) = self.deliveries.get_mut(id) else {
                return;
            };
            if !delivery.partial {
                self.ignore("transfer reuses the tag of a complete delivery");
                return;
            }
            self.statistics.transfers_received += 1;
            delivery.readable += transfer.payload_size;
            delivery.partial = transfer.more;
            if let Some(state) = &transfer.state {
                delivery.set_remote_state(state.clone());
            }
            if transfer.settled {
                delivery.mark_remote_settled();
            }
            delivery.mark_updated();
            self.notifier.notify(WorkKind::Delivery(id));
            return;
        }

        self.statistics.transfers_received += 1;
        let mut delivery = Delivery::new(transfer.delivery_tag.clone(), self.handle());
        delivery.queued = true;
        delivery.partial = transfer.more;
        delivery.readable = transfer.payload_size;
        if let Some(state) = &transfer.state {
            delivery.set_remote_state(state.clone());
        }
        if transfer.settled {
            delivery.mark_remote_settled();
        }
        let id = self.deliveries.append(delivery);
        self.unsettled.insert(transfer.delivery_tag.clone(), id);
        self.credit.on_received();
        trace!(link = %self.name, ?id, more = transfer.more, "delivery arrived");
        self.notifier.notify(WorkKind::Delivery(id));
    }

    fn on_remote_disposition(&mut self, disposition: &Disposition) {
        if disposition.role == self.role {
            self.ignore("disposition sent with our own role");
            return;
        }
        for tag in &disposition.delivery_tags {
            let Some(id) = self.find_by_tag(tag) else {
                self.ignore("disposition for an unknown delivery tag");
                continue;
            };
            if let Some(delivery) = self.deliveries.get_mut(id) {
                if let Some(state) = &disposition.state {
                    delivery.set_remote_state(state.clone());
                }
                if disposition.settled {
                    delivery.mark_remote_settled();
                }
                // Nothing left to tell a peer that already settled.
                if delivery.remote_settled() {
                    self.dispositions.remove(id);
                }
            }
            self.notifier.notify(WorkKind::Delivery(id));
            self.free_if_done(id);
        }
    }

    /// Locally unsettled deliveries are indexed; settled ones still held
    /// (awaiting the peer) are found by walking the list.
    fn find_by_tag(&self, tag: &DeliveryTag) -> Option<DeliveryId> {
        if let Some(&id) = self.unsettled.get(tag) {
            return Some(id);
        }
        self.deliveries.iter().find(|d| d.is_settled() && d.tag() == tag).map(Delivery::id)
    }

    fn on_remote_detach(&mut self, detach: &Detach) {
        debug!(link = %self.name, closed = detach.closed, "peer detached");
        self.remote_condition = detach.error.clone();
        if detach.closed {
            self.remote_state = EndpointState::Closed;
        } else {
            self.remote_detached = true;
        }
        self.notifier.notify(WorkKind::State);
    }
}
