//! Document - Main entry point for host page operations
//!
//! This handles:
//! - HTML parsing (html5ever through kuchikiki)
//! - Selector queries (delegated to the `selectors` engine)
//! - Native event listeners and bubbling dispatch
//! - Inline style writes
//! - `document.cookie`, window globals, focus

use crate::arena::ListenerArena;
use crate::error::{DomError, Result};
use crate::events::{Event, Listener};
use crate::query::Selector;
use crate::serializer::node_path;
use crate::style::{to_kebab_case, InlineStyle};
use crate::types::{Capabilities, InsertPosition, ListenerId};
use crate::utils::{is_element, tag_name};
use ahash::{AHashMap, AHashSet};
use kuchikiki::traits::TendrilSink;
use kuchikiki::{Node, NodeRef};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Configuration for a host document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub capabilities: Capabilities,
    pub cookies_enabled: bool,
    /// Initial `document.cookie` string
    pub cookie: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            cookies_enabled: true,
            cookie: String::new(),
            viewport_width: 1024.0,
            viewport_height: 768.0,
        }
    }
}

struct DocumentInner {
    id: Uuid,
    config: DocumentConfig,
    root: NodeRef,
    listeners: RefCell<ListenerArena>,
    cookie: RefCell<String>,
    globals: RefCell<AHashSet<String>>,
    focused: RefCell<Option<Weak<Node>>>,
    extensions: RefCell<AHashMap<TypeId, Rc<dyn Any>>>,
}

/// Host page document
///
/// Cheap to clone: all clones share one tree and one listener arena.
/// Single-threaded by construction (`Rc`), like the page's UI thread.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    /// Parse a page with default config
    pub fn parse(html: &str) -> Self {
        Self::with_config(html, DocumentConfig::default())
    }

    /// Parse a page with custom config
    pub fn with_config(html: &str, config: DocumentConfig) -> Self {
        let root = kuchikiki::parse_html().one(html);
        let id = Uuid::now_v7();
        tracing::debug!(document = %id, "Parsed document");

        Self {
            inner: Rc::new(DocumentInner {
                id,
                cookie: RefCell::new(config.cookie.clone()),
                config,
                root,
                listeners: RefCell::new(ListenerArena::new()),
                globals: RefCell::new(AHashSet::new()),
                focused: RefCell::new(None),
                extensions: RefCell::new(AHashMap::new()),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.inner.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.config.capabilities
    }

    /// Same underlying document
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Handle that does not keep the page alive
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Per-page state of type `T`, created on first use and shared by every
    /// handle on this document (the expando slot of a host object)
    pub fn extension<T: Default + 'static>(&self) -> Rc<T> {
        let slot = self
            .inner
            .extensions
            .borrow_mut()
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::trace!(
                    document = %self.inner.id,
                    kind = std::any::type_name::<T>(),
                    "Created extension"
                );
                Rc::new(T::default()) as Rc<dyn Any>
            })
            .clone();
        // keyed by TypeId, the downcast can not fail
        slot.downcast::<T>().unwrap_or_else(|_| Rc::new(T::default()))
    }

    /// The document node (top of every event path)
    pub fn root(&self) -> NodeRef {
        self.inner.root.clone()
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeRef> {
        self.inner.root.children().find(is_element)
    }

    pub fn head(&self) -> Option<NodeRef> {
        self.child_of_html("head")
    }

    pub fn body(&self) -> Option<NodeRef> {
        self.child_of_html("body")
    }

    fn child_of_html(&self, tag: &str) -> Option<NodeRef> {
        self.document_element()?
            .children()
            .find(|node| tag_name(node).as_deref() == Some(tag))
    }

    /// Whether `node` is attached to this document's tree
    pub fn contains(&self, node: &NodeRef) -> bool {
        node.inclusive_ancestors().any(|n| n == self.inner.root)
    }

    /// querySelectorAll on the whole document, document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeRef>> {
        self.require(self.capabilities().query_selector, "querySelectorAll")?;
        let selector = Selector::parse(selector)?;
        Ok(selector.select_descendants(&self.inner.root))
    }

    /// Parse markup inside one temporary container and detach every
    /// resulting child node (elements, text and comments), in order
    pub fn parse_fragment(&self, markup: &str) -> Vec<NodeRef> {
        let container = kuchikiki::parse_html().one(format!("<body>{}", markup));
        let Some(body) = container
            .descendants()
            .find(|node| tag_name(node).as_deref() == Some("body"))
        else {
            return Vec::new();
        };

        let nodes: Vec<NodeRef> = body.children().collect();
        for node in &nodes {
            node.detach();
        }
        nodes
    }

    /// insertAdjacent*: place `nodes`, in order, relative to `target`
    pub fn insert_adjacent(
        &self,
        target: &NodeRef,
        position: InsertPosition,
        nodes: Vec<NodeRef>,
    ) -> Result<()> {
        let new_parent = match position {
            InsertPosition::AfterBegin | InsertPosition::BeforeEnd => target.clone(),
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd => {
                self.require_parent(target)?;
                target.parent().ok_or_else(|| {
                    DomError::HierarchyRequest(format!("{} has no parent", node_path(target)))
                })?
            }
        };
        for node in &nodes {
            if *node == *target || new_parent.inclusive_ancestors().any(|a| a == *node) {
                return Err(DomError::HierarchyRequest(format!(
                    "can't insert {} into its own subtree",
                    node_path(node)
                )));
            }
        }

        match position {
            InsertPosition::BeforeEnd => {
                for node in nodes {
                    target.append(node);
                }
            }
            InsertPosition::AfterBegin => match target.first_child() {
                Some(first) => {
                    for node in nodes {
                        first.insert_before(node);
                    }
                }
                None => {
                    for node in nodes {
                        target.append(node);
                    }
                }
            },
            InsertPosition::BeforeBegin => {
                for node in nodes {
                    target.insert_before(node);
                }
            }
            InsertPosition::AfterEnd => {
                let mut anchor = target.clone();
                for node in nodes {
                    anchor.insert_after(node.clone());
                    anchor = node;
                }
            }
        }
        Ok(())
    }

    /// insertAdjacentHTML
    pub fn insert_adjacent_html(
        &self,
        target: &NodeRef,
        position: InsertPosition,
        markup: &str,
    ) -> Result<()> {
        if matches!(
            position,
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd
        ) {
            self.require_parent(target)?;
        }
        let nodes = self.parse_fragment(markup);
        self.insert_adjacent(target, position, nodes)
    }

    fn require_parent(&self, target: &NodeRef) -> Result<()> {
        match target.parent() {
            Some(parent) if !(crate::utils::is_document(&parent) && is_element(target)) => Ok(()),
            _ => Err(DomError::HierarchyRequest(format!(
                "{} has no parent element to insert into",
                node_path(target)
            ))),
        }
    }

    fn require(&self, available: bool, capability: &'static str) -> Result<()> {
        if available {
            Ok(())
        } else {
            Err(DomError::MissingCapability(capability))
        }
    }

    // ---- Native events ------------------------------------------------

    /// addEventListener (bubble phase)
    pub fn add_event_listener(
        &self,
        node: &NodeRef,
        event_type: &str,
        listener: Listener,
    ) -> Result<ListenerId> {
        self.require(self.capabilities().event_listeners, "addEventListener")?;
        let mut arena = self.inner.listeners.borrow_mut();
        arena.prune();
        let id = arena.add(node, event_type, listener);
        tracing::trace!(document = %self.inner.id, event_type, id, "Added listener");
        Ok(id)
    }

    /// removeEventListener by id; false if it was not registered there
    pub fn remove_event_listener(&self, node: &NodeRef, event_type: &str, id: ListenerId) -> bool {
        let removed = self
            .inner
            .listeners
            .borrow_mut()
            .remove(node, event_type, id);
        tracing::trace!(document = %self.inner.id, event_type, id, removed, "Removed listener");
        removed
    }

    /// Listeners currently registered on `node` for `event_type`
    pub fn listener_count(&self, node: &NodeRef, event_type: &str) -> usize {
        self.inner.listeners.borrow().count(node, event_type)
    }

    /// dispatchEvent: target first, then each ancestor up to the document
    /// node while the event bubbles and propagation is not stopped.
    ///
    /// Returns false if a listener called `prevent_default`.
    pub fn dispatch_event(&self, target: &NodeRef, event: &Event) -> bool {
        event.set_target(target);

        let path: Vec<NodeRef> = if event.bubbles() {
            target.inclusive_ancestors().collect()
        } else {
            vec![target.clone()]
        };
        tracing::trace!(
            document = %self.inner.id,
            event_type = event.event_type(),
            target = %node_path(target),
            "Dispatching event"
        );

        for node in &path {
            // Snapshot: listeners may add/remove listeners while running
            let listeners = self
                .inner
                .listeners
                .borrow()
                .listeners_for(node, event.event_type());
            if listeners.is_empty() {
                continue;
            }

            event.set_current_target(Some(node));
            for listener in listeners {
                listener(event);
            }
            if event.propagation_stopped() {
                break;
            }
        }

        event.set_current_target(None);
        !event.default_prevented()
    }

    /// Fire `DOMContentLoaded` then `load` on the document node
    pub fn finish_loading(&self) {
        let root = self.root();
        self.dispatch_event(&root, &Event::new("DOMContentLoaded"));
        self.dispatch_event(&root, &Event::new("load"));
    }

    // ---- Inline style -------------------------------------------------

    /// element.style[name]; `name` in camel case or hyphenated
    pub fn style(&self, node: &NodeRef, name: &str) -> Option<String> {
        InlineStyle::of(node)
            .get(&to_kebab_case(name))
            .map(String::from)
    }

    /// element.style[name] = value; an empty value removes the declaration
    pub fn set_style(&self, node: &NodeRef, name: &str, value: &str) -> Result<()> {
        let element = node
            .as_element()
            .ok_or_else(|| DomError::NotAnElement(node_path(node)))?;

        let mut style = InlineStyle::of(node);
        let name = to_kebab_case(name);
        if value.trim().is_empty() {
            style.remove(&name);
        } else {
            style.set(&name, value.trim());
        }

        let mut attributes = element.attributes.borrow_mut();
        if style.is_empty() {
            attributes.remove("style");
        } else {
            attributes.insert("style", style.serialize());
        }
        Ok(())
    }

    // ---- Cookies, globals, focus --------------------------------------

    pub fn cookies_enabled(&self) -> bool {
        self.inner.config.cookies_enabled
    }

    /// Raw `document.cookie`
    pub fn cookie(&self) -> String {
        self.inner.cookie.borrow().clone()
    }

    /// Replace `document.cookie`; last writer wins
    pub fn set_cookie(&self, value: &str) {
        *self.inner.cookie.borrow_mut() = value.to_string();
    }

    /// Reserve a name in the window namespace
    pub fn define_global(&self, name: &str) -> bool {
        self.inner.globals.borrow_mut().insert(name.to_string())
    }

    pub fn is_global_defined(&self, name: &str) -> bool {
        self.inner.globals.borrow().contains(name)
    }

    pub fn undefine_global(&self, name: &str) -> bool {
        self.inner.globals.borrow_mut().remove(name)
    }

    /// element.focus(): moves focus and fires a non-bubbling `focus` event
    pub fn focus(&self, node: &NodeRef) {
        *self.inner.focused.borrow_mut() = Some(Rc::downgrade(&node.0));
        self.dispatch_event(node, &Event::new("focus"));
    }

    pub fn active_element(&self) -> Option<NodeRef> {
        self.inner
            .focused
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(NodeRef)
            .or_else(|| self.body())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

/// Weak counterpart of `Document`, for listeners stored inside the page
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<DocumentInner>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::get_attr;
    use std::cell::RefCell as StdRefCell;

    const PAGE: &str = "<html><head><title>t</title></head><body>\
        <ul id='list'><li id='a'><span id='s'>x</span></li><li id='b'></li></ul>\
        </body></html>";

    fn by_id(doc: &Document, id: &str) -> NodeRef {
        doc.query_selector_all(&format!("#{}", id))
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_parse_simple_document() {
        let doc = Document::parse(PAGE);
        assert_eq!(tag_name(&doc.document_element().unwrap()).as_deref(), Some("html"));
        assert!(doc.head().is_some());
        assert_eq!(doc.query_selector_all("li").unwrap().len(), 2);
        assert!(doc.contains(&by_id(&doc, "s")));
    }

    #[test]
    fn test_parse_fragment_detaches_all_nodes() {
        let doc = Document::parse(PAGE);
        let nodes = doc.parse_fragment("<p>1</p> text <p>2</p>");
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|n| n.parent().is_none()));
    }

    #[test]
    fn test_dispatch_bubbles_in_order() {
        let doc = Document::parse(PAGE);
        let seen = Rc::new(StdRefCell::new(Vec::new()));

        for id in ["s", "a", "list"] {
            let node = by_id(&doc, id);
            let seen = seen.clone();
            doc.add_event_listener(
                &node,
                "click",
                Rc::new(move |event: &Event| {
                    let current = event.current_target().unwrap();
                    seen.borrow_mut().push(get_attr(&current, "id").unwrap());
                }),
            )
            .unwrap();
        }

        let target = by_id(&doc, "s");
        assert!(doc.dispatch_event(&target, &Event::bubbling("click")));
        assert_eq!(*seen.borrow(), vec!["s", "a", "list"]);
    }

    #[test]
    fn test_stop_propagation_and_prevent_default() {
        let doc = Document::parse(PAGE);
        let a = by_id(&doc, "a");
        let list = by_id(&doc, "list");
        let reached = Rc::new(StdRefCell::new(false));

        doc.add_event_listener(
            &a,
            "click",
            Rc::new(|event: &Event| {
                event.stop_propagation();
                event.prevent_default();
            }),
        )
        .unwrap();
        let flag = reached.clone();
        doc.add_event_listener(&list, "click", Rc::new(move |_: &Event| *flag.borrow_mut() = true))
            .unwrap();

        assert!(!doc.dispatch_event(&by_id(&doc, "s"), &Event::bubbling("click")));
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_listener_may_remove_itself_during_dispatch() {
        let doc = Document::parse(PAGE);
        let a = by_id(&doc, "a");
        let id_slot = Rc::new(StdRefCell::new(None));

        let slot = id_slot.clone();
        let handle = doc.clone();
        let target = a.clone();
        let id = doc
            .add_event_listener(
                &a,
                "click",
                Rc::new(move |_: &Event| {
                    if let Some(id) = *slot.borrow() {
                        handle.remove_event_listener(&target, "click", id);
                    }
                }),
            )
            .unwrap();
        *id_slot.borrow_mut() = Some(id);

        doc.dispatch_event(&a, &Event::bubbling("click"));
        assert_eq!(doc.listener_count(&a, "click"), 0);
    }

    #[test]
    fn test_missing_capability() {
        let config = DocumentConfig {
            capabilities: Capabilities {
                query_selector: false,
                event_listeners: true,
            },
            ..DocumentConfig::default()
        };
        let doc = Document::with_config(PAGE, config);
        assert!(matches!(
            doc.query_selector_all("li"),
            Err(DomError::MissingCapability(_))
        ));
    }

    #[test]
    fn test_set_style_writes_attribute() {
        let doc = Document::parse(PAGE);
        let a = by_id(&doc, "a");
        doc.set_style(&a, "backgroundColor", "red").unwrap();
        doc.set_style(&a, "marginTop", "4px").unwrap();
        assert_eq!(
            get_attr(&a, "style").as_deref(),
            Some("background-color: red; margin-top: 4px;")
        );
        assert_eq!(doc.style(&a, "background-color").as_deref(), Some("red"));

        doc.set_style(&a, "backgroundColor", "").unwrap();
        doc.set_style(&a, "marginTop", "").unwrap();
        assert_eq!(get_attr(&a, "style"), None);
    }

    #[test]
    fn test_insert_adjacent_requires_parent() {
        let doc = Document::parse(PAGE);
        let detached = doc.parse_fragment("<p></p>").remove(0);
        let err = doc.insert_adjacent_html(&detached, InsertPosition::AfterEnd, "<i></i>");
        assert!(matches!(err, Err(DomError::HierarchyRequest(_))));
    }

    #[test]
    fn test_insert_into_own_subtree_is_rejected() {
        let doc = Document::parse(PAGE);
        let list = by_id(&doc, "list");
        let span = by_id(&doc, "s");
        let err = doc.insert_adjacent(&span, InsertPosition::BeforeEnd, vec![list.clone()]);
        assert!(matches!(err, Err(DomError::HierarchyRequest(_))));
        let err = doc.insert_adjacent(&list, InsertPosition::AfterEnd, vec![list.clone()]);
        assert!(matches!(err, Err(DomError::HierarchyRequest(_))));
        assert!(doc.contains(&list));
    }

    #[test]
    fn test_extension_is_shared_per_document() {
        let doc = Document::parse(PAGE);
        let other = Document::parse(PAGE);

        doc.extension::<StdRefCell<Vec<u32>>>().borrow_mut().push(1);
        doc.clone().extension::<StdRefCell<Vec<u32>>>().borrow_mut().push(2);
        assert_eq!(*doc.extension::<StdRefCell<Vec<u32>>>().borrow(), vec![1, 2]);
        assert!(other.extension::<StdRefCell<Vec<u32>>>().borrow().is_empty());
    }

    #[test]
    fn test_weak_document() {
        let doc = Document::parse(PAGE);
        let weak = doc.downgrade();
        assert!(weak.upgrade().unwrap().ptr_eq(&doc));
        assert!(!doc.ptr_eq(&Document::parse(PAGE)));

        drop(doc);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_config_from_json() {
        let config: DocumentConfig =
            serde_json::from_str(r#"{"cookies_enabled": false, "cookie": "a=1"}"#).unwrap();
        assert!(!config.cookies_enabled);
        assert_eq!(config.viewport_width, 1024.0);
        assert!(config.capabilities.event_listeners);
    }
}
