use std::collections::{HashMap, VecDeque};

use sluice_link::WorkEvent;

/// Stale entries tolerated before the queue is compacted.
const COMPACT_SLACK: usize = 32;

/// Ordered, de-duplicated set of pending work for a connection.
///
/// Events keep the order in which they were first reported; reporting the
/// same event again while it is still pending does not move it.
///
/// Every queued entry carries the ticket it was inserted with. Removing an
/// event only forgets its ticket, and entries whose ticket no longer matches
/// are skipped. The queue is compacted once stale entries outnumber live ones.
#[derive(Debug)]
pub struct WorkSet {
    order: VecDeque<(u64, WorkEvent)>,
    members: HashMap<WorkEvent, u64>,
    next_ticket: u64,
}

impl WorkSet {
    /// Creates an empty set with room for `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashMap::with_capacity(capacity),
            next_ticket: 0,
        }
    }

    fn is_live(members: &HashMap<WorkEvent, u64>, ticket: u64, event: &WorkEvent) -> bool {
        members.get(event) == Some(&ticket)
    }

    /// Adds an event. Returns false if it was already pending.
    pub fn insert(&mut self, event: WorkEvent) -> bool {
        if self.members.contains_key(&event) {
            return false;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.members.insert(event, ticket);
        self.order.push_back((ticket, event));
        true
    }

    /// Drops a pending event. Returns false if it was not pending.
    pub fn remove(&mut self, event: WorkEvent) -> bool {
        if self.members.remove(&event).is_none() {
            return false;
        }
        if self.order.len() > 2 * self.members.len() + COMPACT_SLACK {
            let members = &self.members;
            self.order.retain(|(ticket, event)| Self::is_live(members, *ticket, event));
        }
        true
    }

    /// Oldest pending event.
    pub fn head(&self) -> Option<WorkEvent> {
        self.order
            .iter()
            .find(|(ticket, event)| Self::is_live(&self.members, *ticket, event))
            .map(|(_, event)| *event)
    }

    /// Removes and returns the oldest pending event.
    pub fn pop(&mut self) -> Option<WorkEvent> {
        while let Some((ticket, event)) = self.order.pop_front() {
            if Self::is_live(&self.members, ticket, &event) {
                self.members.remove(&event);
                return Some(event);
            }
        }
        None
    }

    /// Removes and returns every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<WorkEvent> {
        let members = std::mem::take(&mut self.members);
        self.order
            .drain(..)
            .filter(|(ticket, event)| Self::is_live(&members, *ticket, event))
            .map(|(_, event)| event)
            .collect()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Default for WorkSet {
    fn default() -> Self {
        Self::new(sluice_core::constants::DEFAULT_WORK_SET_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use sluice_link::{DeliveryId, LinkHandle, SessionHandle, WorkKind};

    use super::*;

    fn event(index: usize, kind: WorkKind) -> WorkEvent {
        WorkEvent { link: LinkHandle::new(SessionHandle::new(0), index), kind }
    }

    #[test]
    fn test_insert_deduplicates_and_keeps_order() {
        let mut work = WorkSet::default();
        assert!(work.insert(event(1, WorkKind::Flow)));
        assert!(work.insert(event(0, WorkKind::State)));
        assert!(!work.insert(event(1, WorkKind::Flow)));

        assert_eq!(work.head(), Some(event(1, WorkKind::Flow)));
        assert_eq!(work.pop(), Some(event(1, WorkKind::Flow)));
        assert!(work.insert(event(1, WorkKind::Flow)));
        assert_eq!(work.drain(), vec![event(0, WorkKind::State), event(1, WorkKind::Flow)]);
        assert!(work.is_empty());
    }

    #[test]
    fn test_removed_event_is_skipped() {
        let mut work = WorkSet::new(4);
        work.insert(event(0, WorkKind::Flow));
        work.insert(event(1, WorkKind::Flow));
        work.insert(event(0, WorkKind::State));

        assert!(work.remove(event(0, WorkKind::Flow)));
        assert!(!work.remove(event(0, WorkKind::Flow)));
        assert_eq!(work.head(), Some(event(1, WorkKind::Flow)));

        // Re-reporting a removed event queues it at the back.
        assert!(work.insert(event(0, WorkKind::Flow)));
        assert_eq!(
            work.drain(),
            vec![event(1, WorkKind::Flow), event(0, WorkKind::State), event(0, WorkKind::Flow)]
        );
    }

    #[test]
    fn test_removals_keep_queue_compact() {
        let mut work = WorkSet::default();
        for _ in 0..10_000 {
            let delivery = event(0, WorkKind::Delivery(DeliveryId::default()));
            work.insert(delivery);
            work.remove(delivery);
        }
        assert!(work.is_empty());
        assert!(work.order.len() <= COMPACT_SLACK + 1);
        assert_eq!(work.pop(), None);
    }
}
