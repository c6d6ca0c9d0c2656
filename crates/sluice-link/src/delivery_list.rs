//! Ordered delivery storage with a cursor.
//!
//! Deliveries live in a slot arena and are threaded into a doubly linked list
//! by index, so append, unlink from any position and cursor moves are O(1).
//! Each slot carries a generation that is bumped when its delivery is removed,
//! which keeps stale [`DeliveryId`]s from resolving to a reused slot.

use sluice_protocol::Role;

use crate::delivery::{Delivery, DeliveryId};

#[derive(Debug)]
struct Node {
    delivery: Delivery,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Outcome of [`DeliveryList::advance_cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    /// There was no current delivery; nothing happened
    NoCurrent,
    /// A receiving cursor already sits on the last delivery and stays there
    AtTail,
    /// The cursor left `from`, landing on its successor or on nothing
    Moved {
        /// The delivery the cursor moved off
        from: DeliveryId,
    },
}

/// Deliveries of one link in creation (or arrival) order, plus the cursor
/// marking the delivery the application is working on.
#[derive(Debug, Default)]
pub struct DeliveryList {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    current: Option<u32>,
    len: usize,
}

impl DeliveryList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a delivery at the tail and returns its identifier.
    ///
    /// The new delivery becomes current if nothing was current.
    pub fn append(&mut self, mut delivery: Delivery) -> DeliveryId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let id = DeliveryId { index, generation: self.slots[index as usize].generation };
        delivery.assign_id(id);

        self.slots[index as usize].node = Some(Node { delivery, prev: self.tail, next: None });
        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        if self.current.is_none() {
            self.current = Some(index);
        }
        self.len += 1;
        id
    }

    /// Number of deliveries held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the list holds no deliveries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest delivery.
    pub fn head(&self) -> Option<&Delivery> {
        self.head.map(|index| &self.node(index).delivery)
    }

    /// Newest delivery.
    pub fn tail(&self) -> Option<&Delivery> {
        self.tail.map(|index| &self.node(index).delivery)
    }

    /// Delivery under the cursor.
    pub fn current(&self) -> Option<&Delivery> {
        self.current.map(|index| &self.node(index).delivery)
    }

    /// Identifier of the delivery under the cursor.
    pub fn current_id(&self) -> Option<DeliveryId> {
        self.current().map(Delivery::id)
    }

    /// Resolves `id`, or `None` if it was freed.
    pub fn get(&self, id: DeliveryId) -> Option<&Delivery> {
        self.resolve(id).map(|index| &self.node(index).delivery)
    }

    pub(crate) fn get_mut(&mut self, id: DeliveryId) -> Option<&mut Delivery> {
        let index = self.resolve(id)?;
        Some(&mut self.node_mut(index).delivery)
    }

    /// Delivery following `id` in list order.
    pub fn next_of(&self, id: DeliveryId) -> Option<&Delivery> {
        let index = self.resolve(id)?;
        self.node(index).next.map(|next| &self.node(next).delivery)
    }

    /// Walks the list from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter { list: self, next: self.head }
    }

    /// Moves the cursor one step.
    ///
    /// A sending cursor always leaves the current delivery, landing on
    /// nothing when it was the tail. A receiving cursor only moves when a
    /// successor exists, so the last arrived delivery stays current.
    pub fn advance_cursor(&mut self, role: Role) -> CursorMove {
        let Some(index) = self.current else {
            return CursorMove::NoCurrent;
        };
        let node = self.node(index);
        let from = node.delivery.id();
        match (node.next, role) {
            (None, Role::Receiver) => CursorMove::AtTail,
            (next, _) => {
                self.current = next;
                CursorMove::Moved { from }
            }
        }
    }

    /// Unlinks and returns the delivery.
    ///
    /// If it was current, the cursor moves to its successor.
    pub fn remove(&mut self, id: DeliveryId) -> Option<Delivery> {
        let index = self.resolve(id)?;
        let slot = &mut self.slots[index as usize];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        if self.current == Some(index) {
            self.current = node.next;
        }

        self.free.push(index);
        self.len -= 1;
        Some(node.delivery)
    }

    fn resolve(&self, id: DeliveryId) -> Option<u32> {
        let slot = self.slots.get(id.index as usize)?;
        (slot.generation == id.generation && slot.node.is_some()).then_some(id.index)
    }

    // Indices handed to these two always come from the list's own links.
    fn node(&self, index: u32) -> &Node {
        match &self.slots[index as usize].node {
            Some(node) => node,
            None => unreachable!("linked slot {} is empty", index),
        }
    }

    fn node_mut(&mut self, index: u32) -> &mut Node {
        match &mut self.slots[index as usize].node {
            Some(node) => node,
            None => unreachable!("linked slot {} is empty", index),
        }
    }
}

/// Head-to-tail iterator over a [`DeliveryList`].
#[derive(Debug)]
pub struct Iter<'a> {
    list: &'a DeliveryList,
    next: Option<u32>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Delivery;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.next?);
        self.next = node.next;
        Some(&node.delivery)
    }
}

#[cfg(test)]
mod tests {
    use sluice_core::tag::DeliveryTag;

    use super::*;
    use crate::handle::LinkHandle;

    fn delivery(tag: &str) -> Delivery {
        Delivery::new(DeliveryTag::from(tag), LinkHandle::default())
    }

    fn tags(list: &DeliveryList) -> Vec<Vec<u8>> {
        list.iter().map(|d| d.tag().as_slice().to_vec()).collect()
    }

    #[test]
    fn test_append_sets_current_once() {
        let mut list = DeliveryList::new();
        let first = list.append(delivery("a"));
        list.append(delivery("b"));

        assert_eq!(list.len(), 2);
        assert_eq!(list.current_id(), Some(first));
        assert_eq!(list.head().map(Delivery::id), Some(first));
        assert_eq!(tags(&list), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_sender_cursor_walks_off_the_tail() {
        let mut list = DeliveryList::new();
        let a = list.append(delivery("a"));
        let b = list.append(delivery("b"));

        assert_eq!(list.advance_cursor(Role::Sender), CursorMove::Moved { from: a });
        assert_eq!(list.current_id(), Some(b));
        assert_eq!(list.advance_cursor(Role::Sender), CursorMove::Moved { from: b });
        assert_eq!(list.current_id(), None);
        assert_eq!(list.advance_cursor(Role::Sender), CursorMove::NoCurrent);

        let c = list.append(delivery("c"));
        assert_eq!(list.current_id(), Some(c));
    }

    #[test]
    fn test_receiver_cursor_stays_on_last() {
        let mut list = DeliveryList::new();
        let a = list.append(delivery("a"));

        assert_eq!(list.advance_cursor(Role::Receiver), CursorMove::AtTail);
        assert_eq!(list.current_id(), Some(a));

        let b = list.append(delivery("b"));
        assert_eq!(list.advance_cursor(Role::Receiver), CursorMove::Moved { from: a });
        assert_eq!(list.current_id(), Some(b));
    }

    #[test]
    fn test_remove_from_middle_relinks() {
        let mut list = DeliveryList::new();
        let a = list.append(delivery("a"));
        let b = list.append(delivery("b"));
        let c = list.append(delivery("c"));

        assert!(list.remove(b).is_some());
        assert_eq!(tags(&list), vec![b"a".to_vec(), b"c".to_vec()]);
        assert_eq!(list.next_of(a).map(Delivery::id), Some(c));

        assert!(list.remove(c).is_some());
        assert_eq!(list.tail().map(Delivery::id), Some(a));
        assert!(list.remove(a).is_some());
        assert!(list.is_empty());
        assert!(list.head().is_none());
    }

    #[test]
    fn test_remove_current_repoints_cursor() {
        let mut list = DeliveryList::new();
        let a = list.append(delivery("a"));
        let b = list.append(delivery("b"));

        list.remove(a);
        assert_eq!(list.current_id(), Some(b));
        list.remove(b);
        assert_eq!(list.current_id(), None);
    }

    #[test]
    fn test_stale_id_does_not_resolve_after_reuse() {
        let mut list = DeliveryList::new();
        let a = list.append(delivery("a"));
        list.remove(a);

        let b = list.append(delivery("b"));
        assert_eq!(a.index, b.index);
        assert!(list.get(a).is_none());
        assert!(list.remove(a).is_none());
        assert_eq!(list.get(b).map(|d| d.tag().as_slice()), Some(&b"b"[..]));
    }
}
