//! Bootstrap component behaviors wired through delegation
//!
//! - dropdown: `.dropdown` toggles `open` from its `.dropdown-toggle`
//!   button; picking an `li` marks it `active` and closes the menu
//! - modal: `[data-toggle='modal']` shows the element named by its
//!   `data-target` and adds one shared backdrop to `<body>`

use crate::collection::Collection;
use crate::error::Result;
use crate::q::Q;

const BACKDROP: &str = "<div class='modal-backdrop fade in'></div>";

fn log_failure(component: &str, result: Result<()>) {
    if let Err(err) = result {
        tracing::warn!(component, error = %err, "Handler failed");
    }
}

fn dropdown_click(element: &Collection) -> Result<()> {
    if element.has_class("dropdown-toggle")? {
        let parent = element.parent();
        let open = parent.has_class("open")?;
        if open {
            parent.remove_class("open")?;
        } else {
            parent.add_class("open")?;
        }
        element.set_attr("aria-expanded", !open)?;
        return Ok(());
    }

    element.siblings("li.active")?.remove_class("active")?;
    element.add_class("active")?;
    element
        .parents(".dropdown")?
        .find("button")?
        .trigger("click")?;
    Ok(())
}

/// Wire every `.dropdown` currently in the document
pub fn dropdown(q: &Q) -> Result<()> {
    let dropdowns = q.select(".dropdown")?;
    dropdowns.on_delegate("click", "button, li", |element, _| {
        log_failure("dropdown", dropdown_click(&element));
    })?;
    tracing::debug!(count = dropdowns.len(), "Wired dropdowns");
    Ok(())
}

fn modal_click(trigger: &Collection) -> Result<()> {
    let Some(target) = trigger.attr("data-target")? else {
        return Ok(());
    };
    let q = trigger.q();
    q.select(target.as_str())?
        .add_class("in")?
        .set_css("display", "block")?;

    if q.select(".modal-backdrop")?.is_empty() {
        q.select("body")?.append(BACKDROP)?;
    }
    Ok(())
}

/// Wire every `[data-toggle='modal']` trigger currently in the document
pub fn modal(q: &Q) -> Result<()> {
    q.select("[data-toggle='modal']")?
        .on("click", |trigger, _| log_failure("modal", modal_click(&trigger)))?;
    Ok(())
}
