//! qlib host document
//!
//! Everything a browser page gives a DOM library for free, in-memory:
//! tree and parser, selector engine, native listeners, style, geometry,
//! `document.cookie`.
//!
//! ## Core Design
//!
//! ```text
//! HTML → kuchikiki tree (NodeRef) ─┬→ Selector (Servo selectors)
//!                                  ├→ ListenerArena (ListenerId u32) → dispatch_event
//!                                  └→ ComputedStyle → box geometry
//! ```
//!
//! Single-threaded: handles are `Rc`, matching the page's one UI thread.

pub mod arena;
pub mod document;
pub mod error;
pub mod events;
pub mod layout;
pub mod query;
pub mod serializer;
pub mod style;
pub mod types;
pub mod utils;

pub use arena::ListenerArena;
pub use document::{Document, DocumentConfig, WeakDocument};
pub use error::{DomError, Result};
pub use events::{Event, EventInit, Listener};
pub use query::Selector;
pub use style::ComputedStyle;
pub use types::*;

pub use kuchikiki::{Node, NodeRef};
