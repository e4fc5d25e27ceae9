//! Native events - what the host page hands to listeners
//!
//! Design: one `Event` value travels the whole propagation path.
//! Dispatch state (current target, stop flags) uses interior mutability
//! so listeners only ever see `&Event`.

use kuchikiki::NodeRef;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Native listener callback
pub type Listener = Rc<dyn Fn(&Event)>;

/// Event construction flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
}

/// A dispatched (or dispatchable) event
pub struct Event {
    event_type: String,
    init: EventInit,
    target: RefCell<Option<NodeRef>>,
    current_target: RefCell<Option<NodeRef>>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl Event {
    /// Non-bubbling, non-cancelable event
    pub fn new(event_type: impl Into<String>) -> Self {
        Self::with_init(event_type, EventInit::default())
    }

    /// Bubbling, cancelable event, as synthesized by `trigger`
    pub fn bubbling(event_type: impl Into<String>) -> Self {
        Self::with_init(
            event_type,
            EventInit {
                bubbles: true,
                cancelable: true,
            },
        )
    }

    pub fn with_init(event_type: impl Into<String>, init: EventInit) -> Self {
        Self {
            event_type: event_type.into(),
            init,
            target: RefCell::new(None),
            current_target: RefCell::new(None),
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.init.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.init.cancelable
    }

    /// The node the event was dispatched on
    pub fn target(&self) -> Option<NodeRef> {
        self.target.borrow().clone()
    }

    /// The node whose listeners are currently running
    pub fn current_target(&self) -> Option<NodeRef> {
        self.current_target.borrow().clone()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// Ignored for non-cancelable events
    pub fn prevent_default(&self) {
        if self.init.cancelable {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub(crate) fn set_target(&self, node: &NodeRef) {
        *self.target.borrow_mut() = Some(node.clone());
    }

    pub(crate) fn set_current_target(&self, node: Option<&NodeRef>) {
        *self.current_target.borrow_mut() = node.cloned();
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("init", &self.init)
            .field("propagation_stopped", &self.propagation_stopped.get())
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default_needs_cancelable() {
        let plain = Event::new("load");
        plain.prevent_default();
        assert!(!plain.default_prevented());

        let click = Event::bubbling("click");
        click.prevent_default();
        assert!(click.default_prevented());
        assert!(click.bubbles());
    }
}
