//! CSS animation driver.

use crate::host::Dom;

const HIDDEN: &str = "hidden";

/// Play the animation class `name` on `el` and wait for it to finish.
///
/// The `hidden` attribute is removed before the class goes on. Once the host reports
/// the animation's end, the class is removed again and, with `hide_after`, `hidden`
/// is put back. Returns `true` once that completion has run; `false` without touching
/// anything when the element or the name is missing.
pub async fn animate<D: Dom>(
    dom: &D,
    el: Option<&D::Element>,
    name: Option<&str>,
    hide_after: bool,
) -> bool {
    let (Some(el), Some(name)) = (el, name.filter(|n| !n.is_empty())) else {
        return false;
    };

    dom.remove_attribute(el, HIDDEN);
    dom.add_class(el, name);
    log::trace!("animation '{name}' started");

    dom.animation_end(el).await;

    dom.remove_class(el, name);
    if hide_after {
        dom.set_attribute(el, HIDDEN, "true");
    }
    log::trace!("animation '{name}' finished");
    true
}
