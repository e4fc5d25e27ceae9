//! Extensions composed onto `Collection` through traits and plain functions
//!
//! Nothing here patches the core types: an extension is a trait
//! implemented for `Collection` (`Animate`) or a function taking `&Q`
//! (`bootstrap::dropdown`).

pub mod animate;
pub mod bootstrap;

pub use animate::{install, Animate, ANIMATE_CSS};
