//! Arena-based native listener storage
//!
//! Listeners live in one `Vec`, addressed by a `u32` id. Event targets map
//! to the ids they own, in registration order.
//!
//! ## Memory Layout
//!
//! ```text
//! slots:   [L0][L1][None][L3]...
//!           ↑ 4-byte ListenerId, freed slots stay empty (ids never reused)
//! targets: NodeKey → (Weak<Node>, [ListenerId...])
//! ```

use crate::types::{node_key, ListenerId, NodeKey};
use ahash::AHashMap;
use kuchikiki::{Node, NodeRef};
use smallvec::SmallVec;
use std::rc::{Rc, Weak};

use crate::events::Listener;

/// One registered listener
struct ListenerSlot {
    event_type: String,
    listener: Listener,
}

/// Listener ids owned by one event target
struct TargetEntry {
    node: Weak<Node>,
    ids: SmallVec<[ListenerId; 4]>,
}

impl TargetEntry {
    fn is_for(&self, node: &NodeRef) -> bool {
        self.node
            .upgrade()
            .map_or(false, |rc| Rc::ptr_eq(&rc, &node.0))
    }
}

/// Arena allocator for native event listeners
///
/// Design:
/// - Single Vec<Option<ListenerSlot>> for sequential allocation
/// - HashMap for node → listener ids lookup
/// - Weak node references: entries die with their node
#[derive(Default)]
pub struct ListenerArena {
    slots: Vec<Option<ListenerSlot>>,
    targets: AHashMap<NodeKey, TargetEntry>,
    live: usize,
}

impl ListenerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on `node`, returns its ID
    pub fn add(&mut self, node: &NodeRef, event_type: &str, listener: Listener) -> ListenerId {
        let id = self.slots.len() as ListenerId;
        self.slots.push(Some(ListenerSlot {
            event_type: event_type.to_string(),
            listener,
        }));
        self.live += 1;

        let key = node_key(node);
        let stale = self
            .targets
            .get(&key)
            .map_or(false, |entry| !entry.is_for(node));
        if stale {
            // Address reused by a new node: the old owner is gone
            self.release(key);
        }

        self.targets
            .entry(key)
            .or_insert_with(|| TargetEntry {
                node: Rc::downgrade(&node.0),
                ids: SmallVec::new(),
            })
            .ids
            .push(id);
        id
    }

    /// Remove listener `id` from `node` if it is registered there for `event_type`
    pub fn remove(&mut self, node: &NodeRef, event_type: &str, id: ListenerId) -> bool {
        let key = node_key(node);
        let Some(entry) = self.targets.get_mut(&key) else {
            return false;
        };
        if !entry.is_for(node) {
            return false;
        }

        let matches = self
            .slots
            .get(id as usize)
            .and_then(|slot| slot.as_ref())
            .map_or(false, |slot| slot.event_type == event_type);
        let Some(pos) = entry.ids.iter().position(|&owned| owned == id) else {
            return false;
        };
        if !matches {
            return false;
        }

        entry.ids.remove(pos);
        if entry.ids.is_empty() {
            self.targets.remove(&key);
        }
        self.slots[id as usize] = None;
        self.live -= 1;
        true
    }

    /// Snapshot of the listeners for `node` and `event_type`, in registration order
    pub fn listeners_for(&self, node: &NodeRef, event_type: &str) -> Vec<Listener> {
        let Some(entry) = self.targets.get(&node_key(node)) else {
            return Vec::new();
        };
        if !entry.is_for(node) {
            return Vec::new();
        }

        entry
            .ids
            .iter()
            .filter_map(|&id| self.slots.get(id as usize).and_then(|slot| slot.as_ref()))
            .filter(|slot| slot.event_type == event_type)
            .map(|slot| Rc::clone(&slot.listener))
            .collect()
    }

    /// Number of listeners registered on `node` for `event_type`
    pub fn count(&self, node: &NodeRef, event_type: &str) -> usize {
        self.listeners_for(node, event_type).len()
    }

    /// Drop every entry whose node no longer exists
    pub fn prune(&mut self) -> usize {
        let dead: Vec<NodeKey> = self
            .targets
            .iter()
            .filter(|(_, entry)| entry.node.strong_count() == 0)
            .map(|(&key, _)| key)
            .collect();
        let mut freed = 0;
        for key in dead {
            freed += self.release(key);
        }
        freed
    }

    /// Total number of live listeners
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn release(&mut self, key: NodeKey) -> usize {
        let Some(entry) = self.targets.remove(&key) else {
            return 0;
        };
        for &id in &entry.ids {
            if let Some(slot) = self.slots.get_mut(id as usize) {
                if slot.take().is_some() {
                    self.live -= 1;
                }
            }
        }
        entry.ids.len()
    }
}
