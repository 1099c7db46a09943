//! Mobile navigation toggle.
//!
//! `aria-hidden` on the nav container is the source of truth; `aria-expanded` on the
//! toggle and the body scroll lock always follow it.

use crate::host::Host;
use crate::PageFx;

const ARIA_HIDDEN: &str = "aria-hidden";
const ARIA_EXPANDED: &str = "aria-expanded";

impl<H: Host> PageFx<H> {
    pub fn is_nav_open(&self) -> bool {
        self.host.attribute(&self.landmarks.nav, ARIA_HIDDEN).as_deref() == Some("false")
    }

    /// Flip the nav between open and closed.
    pub fn toggle_mobile_nav(&self) {
        self.set_nav_open(!self.is_nav_open());
    }

    /// Set both ARIA facets and the body scroll lock in one go.
    pub fn set_nav_open(&self, open: bool) {
        let lm = &self.landmarks;
        let inactive = &self.config.classes.inactive;

        self.host
            .set_attribute(&lm.nav_toggle, ARIA_EXPANDED, bool_attr(open));
        self.host.set_attribute(&lm.nav, ARIA_HIDDEN, bool_attr(!open));
        if open {
            self.host.add_class(&lm.body, inactive);
        } else {
            self.host.remove_class(&lm.body, inactive);
        }
        log::debug!("mobile nav {}", if open { "opened" } else { "closed" });
    }

    /// Close the nav if it is open on a small viewport. Returns whether it closed.
    pub fn collapse_small_nav(&self) -> bool {
        if self.is_nav_open() && self.is_small() {
            self.set_nav_open(false);
            return true;
        }
        false
    }

    /// Initial state: hidden behind the toggle on small viewports, shown otherwise.
    pub fn init_nav_state(&self) {
        self.show_layout_default(self.is_small());
    }

    /// Resize handler body.
    ///
    /// An open nav collapses when the viewport lands on the small breakpoint; on any
    /// other breakpoint the nav is shown again so a nav closed on mobile does not stay
    /// hidden on desktop.
    pub fn on_resize(&self) {
        let small = self.is_small();
        if small {
            self.collapse_small_nav();
        } else if !self.is_nav_open() {
            self.show_layout_default(false);
        }
    }

    fn show_layout_default(&self, small: bool) {
        let lm = &self.landmarks;
        self.host.set_attribute(&lm.nav, ARIA_HIDDEN, bool_attr(small));
        self.host.set_attribute(&lm.nav_toggle, ARIA_EXPANDED, "false");
        self.host.remove_class(&lm.body, &self.config.classes.inactive);
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
