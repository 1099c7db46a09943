//! Browser event handlers, minus the browser.
//!
//! The host binding forwards raw events here and acts on what comes back
//! (`preventDefault`, spawning the navigation future).

use crate::host::{Host, Selector};
use crate::navigation::NavigationRequest;
use crate::util::{closest, closest_by, same_document_fragment};
use crate::PageFx;

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
}

impl Modifiers {
    /// The user asked for the link somewhere else (new tab or window).
    pub fn opens_elsewhere(&self) -> bool {
        self.meta || self.ctrl
    }
}

/// What the host should do with a click after the engine looked at it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickOutcome {
    pub prevent_default: bool,
    pub navigation: Option<NavigationRequest>,
}

impl ClickOutcome {
    fn prevented() -> Self {
        Self {
            prevent_default: true,
            navigation: None,
        }
    }
}

impl<H: Host> PageFx<H> {
    /// One-time setup of the live page.
    ///
    /// Marks the document as enhanced, replaces the initial history entry so popstate
    /// has something to return to, sets the nav's initial state for the current
    /// breakpoint and starts watching the document's reveal and parallax items.
    pub fn init(&self) {
        if let Some(root) = self.host.document_element() {
            self.host.add_class(&root, &self.config.classes.enhanced);
        }
        let title = self.host.title();
        let location = self.host.location();
        self.host.replace_state(&title, &location);

        self.init_nav_state();
        self.register_viewport_items(None);
        self.on_scroll();
        log::info!("pagefx: enhanced {location}");
    }

    pub fn on_click(&self, target: &H::Element, modifiers: Modifiers) -> ClickOutcome {
        let markers = &self.config.markers;

        if closest(&self.host, target, &markers.nav_toggle).is_some() {
            self.toggle_mobile_nav();
        }

        if let Some(link) = closest(&self.host, target, &markers.page_link) {
            if modifiers.opens_elsewhere() {
                return ClickOutcome::default();
            }
            let Some(url) = self.host.href(&link) else {
                return ClickOutcome::default();
            };
            if url == self.host.location() {
                log::debug!("click: page link to the current page");
                return ClickOutcome::prevented();
            }
            return ClickOutcome {
                prevent_default: true,
                navigation: Some(NavigationRequest::link(url, self.host.now_ms())),
            };
        }

        self.scroll_to_fragment(target)
            .then(ClickOutcome::prevented)
            .unwrap_or_default()
    }

    /// Smooth-scroll for anchors into the current document. `true` if it scrolled.
    fn scroll_to_fragment(&self, target: &H::Element) -> bool {
        let Some(anchor) = closest_by(&self.host, target, |dom, el| dom.href(el).is_some()) else {
            return false;
        };
        let Some(href) = self.host.href(&anchor) else {
            return false;
        };
        let location = self.host.location();
        let Some(dest) = same_document_fragment(&href, &location)
            .and_then(|id| self.host.element_by_id(id))
        else {
            return false;
        };
        self.host.scroll_into_view(&dest);
        true
    }

    /// Request for the entry the browser just moved to.
    pub fn on_popstate(&self) -> NavigationRequest {
        NavigationRequest::popstate(self.host.location(), self.host.now_ms())
    }

    /// Escape (or the legacy `Esc`) closes an open nav at any breakpoint.
    pub fn on_keydown(&self, key: &str) -> bool {
        if (key == "Escape" || key == "Esc") && self.is_nav_open() {
            self.set_nav_open(false);
            return true;
        }
        false
    }

    /// Push the current parallax offset to every parallax item.
    pub fn on_scroll(&self) {
        let parallax = &self.config.parallax;
        let offset = parallax.offset(self.host.scroll_top()).to_string();
        let items = self.ctx.borrow().observer.parallax_items().to_vec();
        for el in &items {
            self.host.set_style_property(el, &parallax.property, &offset);
        }
    }

    /// Intersection callback: reveal every tracked item with a positive ratio.
    pub fn on_intersection<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (H::Element, f64)>,
    {
        for (el, ratio) in entries {
            if ratio <= 0.0 {
                continue;
            }
            let revealed = self.ctx.borrow_mut().observer.take_revealed(&el);
            if revealed {
                self.host.add_class(&el, &self.config.classes.visible);
                self.host.unwatch_reveal(&el);
            }
        }
    }

    /// (Re)build the viewport registrations.
    ///
    /// Reveal items that left the document are unwatched; reveal items under `root`
    /// (the whole document for `None`) are watched unless already tracked or already
    /// revealed. The parallax set is rebuilt from the whole document and every item
    /// gets the parallax transform.
    pub fn register_viewport_items(&self, root: Option<&H::Element>) {
        let markers = &self.config.markers;
        let visible = &self.config.classes.visible;

        let stale = self
            .ctx
            .borrow_mut()
            .observer
            .retain_reveal(|el| self.host.is_connected(el));
        for el in &stale {
            self.host.unwatch_reveal(el);
        }

        let candidates = self.host.query_all(root, &Selector::attr(&markers.reveal));
        let mut fresh = Vec::new();
        {
            let mut ctx = self.ctx.borrow_mut();
            for el in candidates {
                if self.host.has_class(&el, visible) {
                    continue;
                }
                if ctx.observer.observe_reveal(el.clone()) {
                    fresh.push(el);
                }
            }
        }
        for el in &fresh {
            self.host.watch_reveal(el);
        }

        let parallax = self.host.query_all(None, &Selector::attr(&markers.parallax));
        for el in &parallax {
            self.host
                .set_style_property(el, "transform", &self.config.parallax.transform);
        }
        log::debug!(
            "viewport: {} reveal watched ({} new, {} dropped), {} parallax",
            self.ctx.borrow().observer.reveal_items().len(),
            fresh.len(),
            stale.len(),
            parallax.len()
        );
        self.ctx.borrow_mut().observer.set_parallax(parallax);
    }
}
