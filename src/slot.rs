//! Named slots.
//!
//! A slot is an ordered holder of child presenters inside a parent. Slots are addressed by
//! [`SlotKey`]s, which are compared by identity: two keys created separately are never equal,
//! even though they carry no other data.

use crate::presenter::PresenterId;
use core::fmt;
use uuid::Uuid;

/// An opaque slot identifier.
///
/// Keys are usually created once, in a presenter’s constructor, and copied wherever the slot is
/// referenced.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey(Uuid);

impl SlotKey {
    /// Creates a new key that is distinct from every other key.
    pub fn new() -> SlotKey {
        SlotKey(Uuid::new_v4())
    }
}

impl fmt::Debug for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SlotKey({})", self.0)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

/// Slot contents of a single presenter.
///
/// Slots are kept in first-use order and children in insertion order; lifecycle propagation
/// visits them in that order.
#[derive(Debug, Default, Clone)]
pub(crate) struct Slots {
    entries: Vec<(SlotKey, Vec<PresenterId>)>,
}

impl Slots {
    pub(crate) fn new() -> Slots {
        Slots::default()
    }

    /// Returns the occupants of a slot. Unknown keys read as empty.
    pub(crate) fn children(&self, key: SlotKey) -> &[PresenterId] {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, children)| children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the occupant list for a key, creating it if this is the first use.
    fn entry(&mut self, key: SlotKey) -> &mut Vec<PresenterId> {
        let pos = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key, Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    pub(crate) fn contains(&self, key: SlotKey, child: PresenterId) -> bool {
        self.children(key).contains(&child)
    }

    /// True if the child is the one and only occupant of the slot.
    pub(crate) fn is_sole_occupant(&self, key: SlotKey, child: PresenterId) -> bool {
        let children = self.children(key);
        children.len() == 1 && children[0] == child
    }

    /// Appends a child to a slot.
    pub(crate) fn push(&mut self, key: SlotKey, child: PresenterId) {
        let children = self.entry(key);
        debug_assert!(!children.contains(&child), "child pushed into a slot twice");
        children.push(child);
    }

    /// Removes a child from a slot. Returns false if it was not there.
    pub(crate) fn remove(&mut self, key: SlotKey, child: PresenterId) -> bool {
        let children = match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, children)) => children,
            None => return false,
        };
        match children.iter().position(|c| *c == child) {
            Some(pos) => {
                children.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Empties a slot and returns its former occupants, in order.
    pub(crate) fn take(&mut self, key: SlotKey) -> Vec<PresenterId> {
        std::mem::replace(self.entry(key), Vec::new())
    }

    /// All keys that have been used, in first-use order.
    pub(crate) fn keys(&self) -> Vec<SlotKey> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    /// All occupants of all slots, in propagation order.
    pub(crate) fn snapshot(&self) -> Vec<PresenterId> {
        self.entries
            .iter()
            .flat_map(|(_, children)| children.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_identities() {
        let a = SlotKey::new();
        let b = SlotKey::new();
        let a2 = a;
        assert_ne!(a, b, "separately created keys must differ");
        assert_eq!(a, a2, "copies of a key must be equal");
    }

    #[test]
    fn unknown_keys_read_empty() {
        let slots = Slots::new();
        assert!(slots.children(SlotKey::new()).is_empty());
        assert!(slots.keys().is_empty());
    }

    #[test]
    fn propagation_order_is_first_use_then_insertion() {
        let (first, second) = (SlotKey::new(), SlotKey::new());
        let (a, b, c) = (PresenterId::new(), PresenterId::new(), PresenterId::new());

        let mut slots = Slots::new();
        slots.push(second, a);
        slots.push(first, b);
        slots.push(second, c);

        assert_eq!(slots.keys(), vec![second, first]);
        assert_eq!(slots.snapshot(), vec![a, c, b]);
        assert!(slots.contains(second, c));
        assert!(!slots.contains(first, c));
        assert!(slots.is_sole_occupant(first, b));
        assert!(!slots.is_sole_occupant(second, a));
    }

    #[test]
    fn remove_and_take() {
        let key = SlotKey::new();
        let (a, b) = (PresenterId::new(), PresenterId::new());

        let mut slots = Slots::new();
        slots.push(key, a);
        slots.push(key, b);

        assert!(slots.remove(key, a));
        assert!(!slots.remove(key, a), "second removal is a miss");
        assert_eq!(slots.children(key), &[b]);

        assert_eq!(slots.take(key), vec![b]);
        assert!(slots.children(key).is_empty());
        // the key stays known so its position in propagation order is stable
        assert_eq!(slots.keys(), vec![key]);
    }

    #[test]
    fn missed_removal_does_not_register_the_key() {
        let (used, unused) = (SlotKey::new(), SlotKey::new());
        let a = PresenterId::new();

        let mut slots = Slots::new();
        assert!(!slots.remove(unused, a));
        slots.push(used, a);
        assert!(!slots.remove(unused, a));

        assert_eq!(slots.keys(), vec![used]);
        assert_eq!(slots.children(used), &[a]);
    }
}
