//! Event delegation
//!
//! ## Design
//!
//! ```text
//! on(types, [selector], handler)
//!   → one native listener per element × type (host ListenerArena)
//!   → ListenerId pushed on Registry[element][type]
//! off(types)
//!   → pop the newest ListenerId per element × type (LIFO), remove natively
//! ```
//!
//! Delegated listeners walk from the event target up to the listening
//! element (exclusive); the nearest match becomes the handler's receiver.
//!
//! The registry is page state (a `Document` extension), not handle state:
//! handlers keep firing after the `Q` that installed them is dropped, and
//! `off` from any handle on the same page reaches them. Native listeners
//! hold the page and the listening element weakly, so a registration never
//! keeps either alive; its record goes away with the element.

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::q::Context;
use ahash::AHashMap;
use qlib_dom::{
    node_key, Event, Listener, ListenerId, Node, NodeKey, NodeRef, Selector, WeakDocument,
};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Handler = dyn Fn(Collection, &Event);

struct Record {
    node: Weak<Node>,
    /// Per event type, oldest first
    handlers: AHashMap<String, SmallVec<[ListenerId; 2]>>,
}

impl Record {
    fn is_for(&self, node: &NodeRef) -> bool {
        self.node
            .upgrade()
            .map_or(false, |live| Rc::ptr_eq(&live, &node.0))
    }
}

/// Installed handlers per listening element, for LIFO teardown
#[derive(Default)]
pub(crate) struct Registry {
    records: AHashMap<NodeKey, Record>,
}

impl Registry {
    pub(crate) fn push(&mut self, node: &NodeRef, event_type: &str, id: ListenerId) {
        self.prune();
        let record = self.records.entry(node_key(node)).or_insert_with(|| Record {
            node: Rc::downgrade(&node.0),
            handlers: AHashMap::new(),
        });
        if !record.is_for(node) {
            // Address reused by a new element after the old one was dropped
            record.node = Rc::downgrade(&node.0);
            record.handlers.clear();
        }
        record
            .handlers
            .entry(event_type.to_string())
            .or_default()
            .push(id);
    }

    /// Newest handler for `event_type` on `node`
    pub(crate) fn pop(&mut self, node: &NodeRef, event_type: &str) -> Option<ListenerId> {
        let key = node_key(node);
        let record = self.records.get_mut(&key).filter(|record| record.is_for(node))?;
        let ids = record.handlers.get_mut(event_type)?;
        let id = ids.pop();
        if ids.is_empty() {
            record.handlers.remove(event_type);
        }
        if record.handlers.is_empty() {
            self.records.remove(&key);
        }
        id
    }

    /// Drop one specific handler (a `one` handler after it fired)
    pub(crate) fn remove_id(&mut self, node: &NodeRef, event_type: &str, id: ListenerId) -> bool {
        let key = node_key(node);
        let Some(record) = self.records.get_mut(&key).filter(|record| record.is_for(node)) else {
            return false;
        };
        let Some(ids) = record.handlers.get_mut(event_type) else {
            return false;
        };
        let before = ids.len();
        ids.retain(|existing| *existing != id);
        let removed = ids.len() != before;
        if ids.is_empty() {
            record.handlers.remove(event_type);
        }
        if record.handlers.is_empty() {
            self.records.remove(&key);
        }
        removed
    }

    pub(crate) fn count(&self, node: &NodeRef, event_type: &str) -> usize {
        self.records
            .get(&node_key(node))
            .filter(|record| record.is_for(node))
            .and_then(|record| record.handlers.get(event_type))
            .map_or(0, |ids| ids.len())
    }

    /// Forget records whose element has been dropped
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.node.strong_count() > 0);
        before - self.records.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Space-separated event types, at least one
fn event_types(types: &str) -> Result<Vec<&str>> {
    let types: Vec<&str> = types.split_whitespace().collect();
    if types.is_empty() {
        return Err(Error::InvalidArgument("no event type given".to_string()));
    }
    Ok(types)
}

/// Nearest element matching `selector` on the path from the event target
/// up to, but excluding, `listening`
fn delegate_target(event: &Event, listening: &NodeRef, selector: &Selector) -> Option<NodeRef> {
    let target = event.target()?;
    for node in target.inclusive_ancestors() {
        if node == *listening {
            return None;
        }
        if selector.matches(&node) {
            return Some(node);
        }
    }
    None
}

impl Collection {
    /// Handle each space-separated event type on every element
    pub fn on<F>(&self, types: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Collection, &Event) + 'static,
    {
        self.listen(types, None, false, Rc::new(handler))
    }

    /// Handle events whose path from the target passes an element matching
    /// `selector`; that element is the receiver
    pub fn on_delegate<F>(&self, types: &str, selector: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Collection, &Event) + 'static,
    {
        self.listen(types, Some(selector), false, Rc::new(handler))
    }

    /// Like `on`, removed after the first call
    pub fn one<F>(&self, types: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Collection, &Event) + 'static,
    {
        self.listen(types, None, true, Rc::new(handler))
    }

    /// Like `on_delegate`, removed after the first call that matched
    pub fn one_delegate<F>(&self, types: &str, selector: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Collection, &Event) + 'static,
    {
        self.listen(types, Some(selector), true, Rc::new(handler))
    }

    fn listen(
        &self,
        types: &str,
        selector: Option<&str>,
        once: bool,
        handler: Rc<Handler>,
    ) -> Result<&Self> {
        let types = event_types(types)?;
        let selector = selector.map(Selector::parse).transpose()?.map(Rc::new);

        for node in self {
            for event_type in &types {
                let slot = Rc::new(Cell::new(None));
                let listener = self.wrap(
                    node,
                    event_type,
                    selector.clone(),
                    once.then(|| slot.clone()),
                    handler.clone(),
                );
                let id = self.document().add_event_listener(node, event_type, listener)?;
                slot.set(Some(id));
                self.ctx.registry.borrow_mut().push(node, event_type, id);
                tracing::debug!(
                    event_type,
                    id,
                    delegated = selector.is_some(),
                    once,
                    "Registered handler"
                );
            }
        }
        Ok(self)
    }

    fn wrap(
        &self,
        node: &NodeRef,
        event_type: &str,
        selector: Option<Rc<Selector>>,
        once: Option<Rc<Cell<Option<ListenerId>>>>,
        handler: Rc<Handler>,
    ) -> Listener {
        let document: WeakDocument = self.document().downgrade();
        let config = self.ctx.config.clone();
        let listening: Weak<Node> = Rc::downgrade(&node.0);
        let event_type = event_type.to_string();

        Rc::new(move |event: &Event| {
            let (Some(document), Some(listening)) = (document.upgrade(), listening.upgrade()) else {
                return;
            };
            let listening = NodeRef(listening);

            let receiver = match &selector {
                None => listening.clone(),
                Some(selector) => match delegate_target(event, &listening, selector) {
                    Some(matched) => matched,
                    None => return,
                },
            };

            if let Some(slot) = &once {
                let Some(id) = slot.take() else {
                    return;
                };
                document.remove_event_listener(&listening, &event_type, id);
                document
                    .extension::<RefCell<Registry>>()
                    .borrow_mut()
                    .remove_id(&listening, &event_type, id);
            }

            let ctx = Context::attach(document, config.clone());
            handler(Collection::new(ctx, vec![receiver]), event);
        })
    }

    /// Remove the newest handler per element × type
    pub fn off(&self, types: &str) -> Result<&Self> {
        let types = event_types(types)?;
        for node in self {
            for event_type in &types {
                let popped = self.ctx.registry.borrow_mut().pop(node, event_type);
                match popped {
                    Some(id) => {
                        self.document().remove_event_listener(node, event_type, id);
                        tracing::debug!(event_type, id, "Removed handler");
                    }
                    None => tracing::trace!(event_type, "No handler to remove"),
                }
            }
        }
        Ok(self)
    }

    /// Dispatch a bubbling, cancelable event on element 0
    pub fn trigger(&self, event_type: &str) -> Result<&Self> {
        let event_type = event_type.trim();
        if event_type.is_empty() {
            return Err(Error::InvalidArgument("no event type given".to_string()));
        }
        if let Some(node) = self.get(0) {
            self.document()
                .dispatch_event(node, &Event::bubbling(event_type));
        }
        Ok(self)
    }

    /// Focus element 0
    pub fn focus(&self) -> &Self {
        if let Some(node) = self.get(0) {
            self.document().focus(node);
        }
        self
    }

    /// Handlers installed through this library on element 0 for `event_type`
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.get(0)
            .map_or(0, |node| self.ctx.registry.borrow().count(node, event_type))
    }
}
