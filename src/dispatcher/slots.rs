//! Storage for the listeners of a [`CallbackDispatcher`].
//!
//! Listeners live in a hash map keyed by [`SlotId`]s that are never reused,
//! and are doubly linked by id in dispatch order. Invocations refer to their
//! position by id, so the map can change freely while an invocation is
//! suspended inside a listener.
//!
//! A slot that an invocation is positioned on is *pinned*. Unlinking a pinned
//! slot leaves it behind as a tombstone that still knows its successor. When
//! that successor is unlinked as well, every tombstone pointing at it is moved
//! on to the next linked slot. Once the last pin is released the tombstone is
//! removed.
//!
//! Methods that remove slots hand the listeners back instead of dropping them,
//! so the caller can drop them after releasing its borrow.
//!
//! [`CallbackDispatcher`]: super::CallbackDispatcher

use alloc::vec::Vec;

use hashbrown::HashMap;

use super::Listener;

/// Stable identifier of a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(super) struct SlotId(u64);

struct Slot<A: 'static, R: 'static> {
    listener: Listener<A, R>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
    /// Whether the slot is part of the chain. Unlinked slots are tombstones.
    linked: bool,
    /// Number of invocations currently positioned on this slot.
    pins: usize,
}

pub(super) struct Slots<A: 'static, R: 'static> {
    slots: HashMap<SlotId, Slot<A, R>, rustc_hash::FxBuildHasher>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    next_id: u64,
}

impl<A: 'static, R: 'static> Slots<A, R> {
    pub(super) fn new() -> Self {
        Self {
            slots: HashMap::default(),
            head: None,
            tail: None,
            len: 0,
            next_id: 0,
        }
    }

    /// Number of linked slots.
    pub(super) fn len(&self) -> usize {
        self.len
    }

    pub(super) fn head(&self) -> Option<SlotId> {
        self.head
    }

    fn allocate(&mut self, listener: Listener<A, R>) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            id,
            Slot {
                listener,
                prev: None,
                next: None,
                linked: true,
                pins: 0,
            },
        );
        self.len += 1;
        id
    }

    pub(super) fn push_back(&mut self, listener: Listener<A, R>) -> SlotId {
        let id = self.allocate(listener);
        let old_tail = self.tail.replace(id);
        match old_tail.and_then(|tail| self.slots.get_mut(&tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.prev = old_tail;
        }
        id
    }

    pub(super) fn push_front(&mut self, listener: Listener<A, R>) -> SlotId {
        let id = self.allocate(listener);
        let old_head = self.head.replace(id);
        match old_head.and_then(|head| self.slots.get_mut(&head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.next = old_head;
        }
        id
    }

    /// Returns a handle to the listener stored in the slot.
    pub(super) fn listener(&self, id: SlotId) -> Option<Listener<A, R>> {
        self.slots.get(&id).map(|slot| slot.listener.clone())
    }

    /// Returns the slot that comes after `id` in dispatch order.
    ///
    /// For a tombstone this is the first linked slot that followed it.
    pub(super) fn successor(&self, id: SlotId) -> Option<SlotId> {
        self.slots.get(&id)?.next
    }

    pub(super) fn is_linked(&self, id: SlotId) -> bool {
        self.slots.get(&id).is_some_and(|slot| slot.linked)
    }

    pub(super) fn pin(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.pins += 1;
        }
    }

    /// Releases one pin, removing the slot if it was the last pin on a
    /// tombstone.
    pub(super) fn unpin(&mut self, id: SlotId) -> Option<Listener<A, R>> {
        let slot = self.slots.get_mut(&id)?;
        slot.pins = slot.pins.saturating_sub(1);
        if slot.pins == 0 && !slot.linked {
            self.slots.remove(&id).map(|slot| slot.listener)
        } else {
            None
        }
    }

    /// Unlinks the slot from the chain.
    ///
    /// Returns the listener if the slot was freed. A pinned slot stays behind
    /// as a tombstone and nothing is returned.
    pub(super) fn unlink(&mut self, id: SlotId) -> Option<Listener<A, R>> {
        let slot = self.slots.get_mut(&id)?;
        if !slot.linked {
            return None;
        }
        slot.linked = false;
        let prev = slot.prev.take();
        let next = slot.next;
        let pinned = slot.pins > 0;

        match prev.and_then(|prev| self.slots.get_mut(&prev)) {
            Some(prev) => prev.next = next,
            None => self.head = next,
        }
        match next.and_then(|next| self.slots.get_mut(&next)) {
            Some(next) => next.prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;

        for tombstone in self.slots.values_mut() {
            if !tombstone.linked && tombstone.next == Some(id) {
                tombstone.next = next;
            }
        }

        if pinned {
            None
        } else {
            self.slots.remove(&id).map(|slot| slot.listener)
        }
    }

    /// Unlinks every slot. Pinned slots become tombstones without a successor.
    pub(super) fn clear(&mut self) -> Vec<Listener<A, R>> {
        let freed: Vec<SlotId> = self
            .slots
            .iter_mut()
            .filter_map(|(&id, slot)| {
                slot.linked = false;
                slot.prev = None;
                slot.next = None;
                (slot.pins == 0).then_some(id)
            })
            .collect();

        self.head = None;
        self.tail = None;
        self.len = 0;

        freed
            .into_iter()
            .filter_map(|id| self.slots.remove(&id))
            .map(|slot| slot.listener)
            .collect()
    }

    /// Returns the linked listeners from tail to head.
    pub(super) fn linked_from_tail(&self) -> Vec<(SlotId, Listener<A, R>)> {
        let mut linked = Vec::with_capacity(self.len);
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            let Some(slot) = self.slots.get(&id) else {
                break;
            };
            linked.push((id, slot.listener.clone()));
            cursor = slot.prev;
        }
        linked
    }
}
