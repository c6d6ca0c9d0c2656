use std::collections::{HashSet, VecDeque};

use crate::delivery::DeliveryId;

/// FIFO of deliveries waiting for the transport, without duplicates.
///
/// Used for advanced deliveries awaiting a Transfer and for deliveries whose
/// disposition still has to be sent.
#[derive(Debug)]
pub struct PendingQueue {
    order: VecDeque<DeliveryId>,
    members: HashSet<DeliveryId>,
}

impl PendingQueue {
    /// Creates a new queue with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self { order: VecDeque::with_capacity(capacity), members: HashSet::with_capacity(capacity) }
    }

    /// Enqueues a delivery. Returns false if it was already queued.
    pub fn enqueue(&mut self, id: DeliveryId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    /// Takes the oldest delivery.
    pub fn pop_front(&mut self) -> Option<DeliveryId> {
        let id = self.order.pop_front()?;
        self.members.remove(&id);
        Some(id)
    }

    /// Oldest delivery without removing it.
    pub fn peek(&self) -> Option<DeliveryId> {
        self.order.front().copied()
    }

    /// Drops a delivery wherever it sits. Returns true if it was queued.
    pub fn remove(&mut self, id: DeliveryId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.order.retain(|queued| *queued != id);
        true
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new(16)
    }
}
