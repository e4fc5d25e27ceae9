//! Animation classes in the animate.css convention
//!
//! An animation is the class pair `animated <name>`. The current name is
//! remembered in `data-anim` so the next animation can replace it.

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::q::Q;

/// Default stylesheet location
pub const ANIMATE_CSS: &str = "/ext/animate.css";

const ANIM_ATTR: &str = "data-anim";

/// Link the animation stylesheet into `<head>`
pub fn install(q: &Q, href: &str) -> Result<()> {
    if href.is_empty() || href.contains(['\'', '"', '<', '>']) {
        return Err(Error::InvalidArgument(format!("invalid stylesheet href '{}'", href)));
    }
    let head = q.select("head")?;
    if head.is_empty() {
        return Err(Error::UnsupportedEnvironment("document has no <head>".to_string()));
    }
    head.append(format!("<link rel='stylesheet' href='{}'>", href))?;
    tracing::debug!(href, "Installed animation stylesheet");
    Ok(())
}

pub trait Animate {
    /// Replace any running animation class with `name`
    fn animate(&self, name: &str) -> Result<&Self>;

    fn fade_in(&self) -> Result<&Self> {
        self.animate("fadeIn")
    }

    fn fade_out(&self) -> Result<&Self> {
        self.animate("fadeOut")
    }
}

impl Animate for Collection {
    fn animate(&self, name: &str) -> Result<&Self> {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(Error::InvalidArgument(format!("invalid animation name '{}'", name)));
        }

        for node in self {
            let element = self.derive(vec![node.clone()]);
            if let Some(previous) = element.attr(ANIM_ATTR)? {
                element.remove_class(&previous)?;
            }
            element.add_class(&format!("animated {}", name))?;
            element.set_attr(ANIM_ATTR, name)?;
        }
        Ok(self)
    }
}
