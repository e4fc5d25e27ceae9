//! Q - the bound API object
//!
//! This is the entry point page code holds on to. It replaces a global
//! `window.Q` with an explicit handle:
//! - Initialization checks the host capabilities and reserves the alias
//! - `select` resolves any `Target` into a `Collection`
//! - `ready`/`load` hook the document lifecycle events

use crate::collection::Collection;
use crate::config::QConfig;
use crate::cookie::CookieStore;
use crate::error::{Error, Result};
use crate::events::Registry;
use qlib_dom::utils::is_element;
use qlib_dom::{Document, Event, NodeRef};
use std::cell::RefCell;
use std::rc::Rc;

/// State shared by a `Q` handle and every Collection it produces
pub(crate) struct Context {
    pub(crate) document: Document,
    pub(crate) config: QConfig,
    /// Handler registry of the page, shared with every other context on it
    pub(crate) registry: Rc<RefCell<Registry>>,
    /// Alias reserved by this context, released on drop
    alias: Option<String>,
}

impl Context {
    /// Context for `document` that reserves no alias (event receivers)
    pub(crate) fn attach(document: Document, config: QConfig) -> Rc<Self> {
        Rc::new(Self {
            registry: document.extension::<RefCell<Registry>>(),
            document,
            config,
            alias: None,
        })
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Some(alias) = &self.alias {
            self.document.undefine_global(alias);
        }
    }
}

/// Construction input for a Collection
#[derive(Debug, Clone)]
pub enum Target<'a> {
    /// Nothing: an empty Collection
    Empty,
    /// A selector, or an HTML fragment when the trimmed text starts with `<`
    Selector(&'a str),
    Node(NodeRef),
    /// The window; resolves to the document node
    Window,
    /// A node list, kept as given
    Nodes(Vec<NodeRef>),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(value: &'a str) -> Self {
        Target::Selector(value)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(value: &'a String) -> Self {
        Target::Selector(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for Target<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Target::Empty, Target::Selector)
    }
}

impl From<NodeRef> for Target<'_> {
    fn from(value: NodeRef) -> Self {
        Target::Node(value)
    }
}

impl From<&NodeRef> for Target<'_> {
    fn from(value: &NodeRef) -> Self {
        Target::Node(value.clone())
    }
}

impl From<Vec<NodeRef>> for Target<'_> {
    fn from(value: Vec<NodeRef>) -> Self {
        Target::Nodes(value)
    }
}

impl From<&[NodeRef]> for Target<'_> {
    fn from(value: &[NodeRef]) -> Self {
        Target::Nodes(value.to_vec())
    }
}

impl From<&Collection> for Target<'_> {
    fn from(value: &Collection) -> Self {
        Target::Nodes(value.nodes().to_vec())
    }
}

/// Bound API handle over one document
#[derive(Clone)]
pub struct Q {
    ctx: Rc<Context>,
}

impl Q {
    /// Initialize against `document` with default config
    pub fn init(document: &Document) -> Result<Self> {
        Self::with_config(document, QConfig::default())
    }

    pub fn with_config(document: &Document, config: QConfig) -> Result<Self> {
        let capabilities = document.capabilities();
        if !capabilities.query_selector || !capabilities.event_listeners {
            return Err(Error::UnsupportedEnvironment(
                "host needs querySelectorAll and addEventListener".to_string(),
            ));
        }

        if config.register_alias && !document.define_global(&config.alias) {
            return Err(Error::UnsupportedEnvironment(format!(
                "global '{}' is already defined",
                config.alias
            )));
        }

        tracing::debug!(document = %document.id(), alias = %config.alias, "Initialized qlib");
        let alias = config.register_alias.then(|| config.alias.clone());
        Ok(Self {
            ctx: Rc::new(Context {
                document: document.clone(),
                registry: document.extension::<RefCell<Registry>>(),
                config,
                alias,
            }),
        })
    }

    pub(crate) fn from_context(ctx: Rc<Context>) -> Self {
        Self { ctx }
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn document(&self) -> &Document {
        &self.ctx.document
    }

    pub fn config(&self) -> &QConfig {
        &self.ctx.config
    }

    /// Q(selector | fragment | node | window | node list)
    pub fn select<'a>(&self, target: impl Into<Target<'a>>) -> Result<Collection> {
        let nodes = self.resolve(target.into())?;
        Ok(Collection::new(self.ctx.clone(), nodes))
    }

    pub fn empty(&self) -> Collection {
        Collection::new(self.ctx.clone(), Vec::new())
    }

    pub fn window(&self) -> Collection {
        Collection::new(self.ctx.clone(), vec![self.ctx.document.root()])
    }

    fn resolve(&self, target: Target<'_>) -> Result<Vec<NodeRef>> {
        let document = &self.ctx.document;
        let nodes = match target {
            Target::Empty => Vec::new(),
            Target::Selector(text) if text.is_empty() => Vec::new(),
            Target::Selector(text) if text.trim_start().starts_with('<') => {
                let nodes: Vec<NodeRef> = document
                    .parse_fragment(text.trim())
                    .into_iter()
                    .filter(is_element)
                    .collect();
                tracing::trace!(count = nodes.len(), "Parsed fragment");
                nodes
            }
            Target::Selector(selector) => document.query_selector_all(selector)?,
            Target::Node(node) => vec![node],
            Target::Window => vec![document.root()],
            Target::Nodes(nodes) => nodes,
        };
        Ok(nodes)
    }

    /// Cookie store over this document
    pub fn cookies(&self) -> Result<CookieStore> {
        CookieStore::load(&self.ctx.document)
    }

    /// Run `callback` on `DOMContentLoaded`
    pub fn ready(&self, callback: impl Fn(&Event) + 'static) -> Result<()> {
        self.on_document("DOMContentLoaded", callback)
    }

    /// Run `callback` on window `load`
    pub fn load(&self, callback: impl Fn(&Event) + 'static) -> Result<()> {
        self.on_document("load", callback)
    }

    fn on_document(&self, event_type: &str, callback: impl Fn(&Event) + 'static) -> Result<()> {
        let root = self.ctx.document.root();
        self.ctx
            .document
            .add_event_listener(&root, event_type, Rc::new(callback))?;
        Ok(())
    }
}

impl std::fmt::Debug for Q {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Q")
            .field("document", &self.ctx.document.id())
            .field("alias", &self.ctx.config.alias)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlib_dom::{Capabilities, DocumentConfig};
    use std::cell::Cell;

    const PAGE: &str = "<html><body><p class='a'>1</p><p class='a b'>2</p></body></html>";

    #[test]
    fn test_alias_is_reserved_once() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        assert!(document.is_global_defined("Q"));
        assert!(matches!(
            Q::init(&document),
            Err(Error::UnsupportedEnvironment(_))
        ));

        drop(q);
        assert!(!document.is_global_defined("Q"));
        assert!(Q::init(&document).is_ok());
    }

    #[test]
    fn test_second_instance_without_alias() {
        let document = Document::parse(PAGE);
        let _q = Q::init(&document).unwrap();
        let config = QConfig {
            register_alias: false,
            ..QConfig::default()
        };
        assert!(Q::with_config(&document, config).is_ok());
    }

    #[test]
    fn test_missing_capability_is_unsupported() {
        let config = DocumentConfig {
            capabilities: Capabilities {
                query_selector: true,
                event_listeners: false,
            },
            ..DocumentConfig::default()
        };
        let document = Document::with_config(PAGE, config);
        assert!(matches!(
            Q::init(&document),
            Err(Error::UnsupportedEnvironment(_))
        ));
    }

    #[test]
    fn test_resolve_targets() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();

        assert_eq!(q.select(Target::Empty).unwrap().len(), 0);
        assert_eq!(q.select("").unwrap().len(), 0);
        assert_eq!(q.select("p.a").unwrap().len(), 2);
        assert_eq!(q.select(Target::Window).unwrap().len(), 1);

        let p = q.select("p.b").unwrap();
        let again = q.select(&p.nodes()[0]).unwrap();
        assert_eq!(again.nodes(), p.nodes());
    }

    #[test]
    fn test_fragment_keeps_detached_elements_only() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let fragment = q.select("  <li>a</li> text <li>b</li>").unwrap();
        assert_eq!(fragment.len(), 2);
        assert!(fragment.iter().all(|node| node.parent().is_none()));
    }

    #[test]
    fn test_invalid_selector() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        assert!(matches!(q.select("p[["), Err(Error::InvalidSelector(_))));
        assert!(matches!(q.select("   "), Err(Error::InvalidSelector(_))));
    }

    #[test]
    fn test_ready_and_load_order() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let order = Rc::new(Cell::new(0));

        let seen = order.clone();
        q.load(move |_| {
            assert_eq!(seen.get(), 1);
            seen.set(2);
        })
        .unwrap();
        let seen = order.clone();
        q.ready(move |_| seen.set(1)).unwrap();

        document.finish_loading();
        assert_eq!(order.get(), 2);
    }
}
