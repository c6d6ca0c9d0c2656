use sluice_protocol::{Attach, Detach, Disposition, Flow, Performative, Transfer};
use tracing::trace;

use crate::delivery::DeliveryId;

use super::Link;

impl Link {
    /// Drains everything the link has to tell the peer, in protocol order:
    /// Attach, Flow, Transfers, Dispositions, Detach.
    pub fn take_performatives(&mut self) -> Vec<Performative> {
        let mut performatives = Vec::new();
        if let Some(attach) = self.take_attach() {
            performatives.push(Performative::Attach(attach));
        }
        if let Some(flow) = self.take_flow() {
            performatives.push(Performative::Flow(flow));
        }
        while let Some((_, transfer)) = self.take_transfer() {
            performatives.push(Performative::Transfer(transfer));
        }
        while let Some(disposition) = self.take_disposition() {
            performatives.push(Performative::Disposition(disposition));
        }
        if let Some(detach) = self.take_detach() {
            performatives.push(Performative::Detach(detach));
        }
        performatives
    }

    /// True if [`Link::take_performatives`] would produce anything.
    pub fn has_pending_performatives(&self) -> bool {
        self.attach_pending
            || self.detach_pending.is_some()
            || (self.is_attached() && self.credit.has_flow_pending())
            || (self.is_attached() && !self.dispositions.is_empty())
            || (self.is_attached() && !self.outgoing.is_empty() && self.credit.can_send())
    }

    /// Attached on our side and not suspended or ended by the peer. The
    /// peer's Attach is not awaited.
    fn is_attached(&self) -> bool {
        self.local_state.is_active()
            && !self.detached
            && !self.attach_pending
            && !self.remote_detached
            && !self.remote_state.is_closed()
    }

    /// Our Attach, once after each `open`.
    pub fn take_attach(&mut self) -> Option<Attach> {
        if !std::mem::take(&mut self.attach_pending) {
            return None;
        }
        Some(Attach {
            name: self.name.clone(),
            role: self.role,
            snd_settle_mode: self.settlement.sender_settle_mode(),
            rcv_settle_mode: self.settlement.receiver_settle_mode(),
            source: self.source.clone(),
            target: self.target.clone(),
            initial_delivery_count: self.role.is_sender().then_some(self.credit.delivery_count()),
            offered_capabilities: self.capabilities.offered().map(<[_]>::to_vec),
            desired_capabilities: self.capabilities.desired().map(<[_]>::to_vec),
            properties: self.capabilities.properties().cloned(),
        })
    }

    /// Our flow state, if it changed since the last Flow.
    pub fn take_flow(&mut self) -> Option<Flow> {
        if !self.is_attached() || !self.credit.take_flow_pending() {
            return None;
        }
        let flow = self.credit.flow_state();
        trace!(link = %self.name, ?flow, "flow taken");
        Some(flow)
    }

    /// Hands the next advanced delivery to the transport, if the peer's
    /// credit allows it.
    pub fn take_transfer(&mut self) -> Option<(DeliveryId, Transfer)> {
        if !self.role.is_sender() || !self.is_attached() {
            return None;
        }
        while self.credit.can_send() {
            let id = self.outgoing.pop_front()?;
            let Some(delivery) = self.deliveries.get_mut(id) else {
                continue;
            };
            delivery.queued = false;
            delivery.sent = true;
            if delivery.is_settled() {
                delivery.settlement_reported = true;
            }
            let transfer = Transfer {
                delivery_tag: delivery.tag().clone(),
                state: delivery.local_state().cloned(),
                settled: delivery.is_settled(),
                more: false,
                payload_size: std::mem::take(&mut delivery.writable),
            };
            self.credit.on_sent();
            self.dispositions.remove(id);
            self.statistics.transfers_sent += 1;
            trace!(link = %self.name, ?id, settled = transfer.settled, "transfer taken");
            self.free_if_done(id);
            return Some((id, transfer));
        }
        None
    }

    /// Next disposition to send. Consecutive deliveries sharing the same
    /// state and settlement travel in one Disposition.
    pub fn take_disposition(&mut self) -> Option<Disposition> {
        if !self.is_attached() {
            return None;
        }
        let mut taken: Vec<DeliveryId> = Vec::new();
        let mut disposition: Option<Disposition> = None;

        while let Some(id) = self.dispositions.peek() {
            let Some(delivery) = self.deliveries.get(id) else {
                self.dispositions.pop_front();
                continue;
            };
            let state = delivery.local_state().cloned();
            let settled = delivery.is_settled();
            match &mut disposition {
                None => {
                    disposition = Some(Disposition {
                        role: self.role,
                        delivery_tags: vec![delivery.tag().clone()],
                        state,
                        settled,
                    });
                }
                Some(batch) if batch.state == state && batch.settled == settled => {
                    batch.delivery_tags.push(delivery.tag().clone());
                }
                Some(_) => break,
            }
            self.dispositions.pop_front();
            taken.push(id);
        }

        let disposition = disposition?;
        self.statistics.dispositions_sent += 1;
        for id in taken {
            if let Some(delivery) = self.deliveries.get_mut(id) {
                if delivery.is_settled() {
                    delivery.settlement_reported = true;
                }
            }
            self.free_if_done(id);
        }
        Some(disposition)
    }

    /// Our pending Detach, once.
    pub fn take_detach(&mut self) -> Option<Detach> {
        self.detach_pending.take()
    }
}
