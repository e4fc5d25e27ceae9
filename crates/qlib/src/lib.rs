//! qlib - chainable element collections
//!
//! jQuery-style ergonomics over the in-memory host document of `qlib-dom`:
//! select elements, walk the tree, mutate content/attributes/style and
//! delegate events, all through one `Collection` type.
//!
//! # Architecture
//!
//! 1. **Explicit binding**: `Q::init(&document)` instead of a global alias
//! 2. **One collection type**: every operator returns a new `Collection`;
//!    extensions are traits implemented for it
//! 3. **The host does the hard parts**: selector matching, listeners and
//!    layout live in `qlib-dom`; this crate never parses selectors
//!
//! ```no_run
//! use qlib::{Document, Q};
//!
//! # fn main() -> qlib::Result<()> {
//! let document = Document::parse("<ul><li>a</li><li>b</li></ul>");
//! let q = Q::init(&document)?;
//! q.select("ul")?
//!     .on_delegate("click", "li", |item, _| {
//!         if let Err(err) = item.add_class("picked") {
//!             tracing::warn!(error = %err, "Could not mark item");
//!         }
//!     })?;
//! q.select("li")?.eq(1, None)?.trigger("click")?;
//! # Ok(())
//! # }
//! ```

pub mod ajax;
mod attributes;
pub mod collection;
pub mod config;
pub mod cookie;
pub mod error;
mod events;
pub mod ext;
pub mod manipulate;
pub mod q;
pub mod style;
mod traverse;
pub mod value;

pub use collection::Collection;
pub use config::QConfig;
pub use cookie::CookieStore;
pub use error::{Error, Result};
pub use manipulate::Content;
pub use q::{Target, Q};
pub use style::{Offset, Position, PositionUpdate};
pub use value::{is_int, is_number, Value};

pub use qlib_dom::{Document, DocumentConfig, Event, NodeRef};
