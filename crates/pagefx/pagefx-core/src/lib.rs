//! pagefx-core
//!
//! Host-agnostic engine for a progressive enhancement layer on server-rendered pages:
//! pjax-style page transitions, the mobile navigation toggle, reveal-on-scroll and
//! parallax. The engine talks to its environment only through the traits in
//! [`host`]; `pagefx-wasm` implements them over `web_sys`.

pub mod animation;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod host;
pub mod mobile_nav;
pub mod navigation;
pub mod util;
pub mod viewport;

use std::cell::{Ref, RefCell};

pub use crate::animation::animate;
pub use crate::config::{
    Classes, Config, IntersectionConfig, Markers, ParallaxConfig, Transitions,
};
pub use crate::error::PageError;
pub use crate::events::{ClickOutcome, Modifiers};
pub use crate::fetch::{get_content, PageSnapshot};
pub use crate::host::{
    Clock, Dom, Fetcher, Host, Method, Response, Selector, SessionHistory, Viewport,
};
pub use crate::navigation::{NavOutcome, NavState, NavigationRequest, PipelineContext, Trigger};
pub use crate::util::{closest, closest_by, same_document_fragment, unquote, FrameDebounce};
pub use crate::viewport::ViewportObserver;

/// Elements of the live document the engine holds on to for the page's lifetime.
#[derive(Debug, Clone)]
pub struct Landmarks<E> {
    pub body: E,
    pub nav: E,
    pub nav_toggle: E,
    pub main_wrapper: E,
    /// Every anchor inside the nav container.
    pub nav_links: Vec<E>,
}

impl<E: Clone + PartialEq> Landmarks<E> {
    /// Look up the landmarks; every one except the nav links is required.
    pub fn resolve<D: Dom<Element = E>>(dom: &D, markers: &Markers) -> Result<Self, PageError> {
        let find = |marker: &str| {
            dom.query_first(None, &Selector::attr(marker))
                .ok_or_else(|| PageError::MissingLandmark {
                    marker: marker.to_string(),
                })
        };

        let nav = find(&markers.nav)?;
        let nav_toggle = find(&markers.nav_toggle)?;
        let main_wrapper = find(&markers.main_wrapper)?;
        let body = dom.body().ok_or_else(|| PageError::MissingLandmark {
            marker: "body".to_string(),
        })?;
        let nav_links = dom.query_all(Some(&nav), &Selector::tag("a"));

        Ok(Landmarks {
            body,
            nav,
            nav_toggle,
            main_wrapper,
            nav_links,
        })
    }
}

/// The enhancement layer for one page.
///
/// Owns the host, the resolved landmarks and the pipeline context. All methods take
/// `&self`; the context sits behind a `RefCell` and is never borrowed across an await.
pub struct PageFx<H: Host> {
    host: H,
    config: Config,
    landmarks: Landmarks<H::Element>,
    ctx: RefCell<PipelineContext<H::Element>>,
}

impl<H: Host> PageFx<H> {
    /// Resolve the landmarks of the live document. Does not touch the page; call
    /// [`PageFx::init`] for that.
    pub fn new(host: H, config: Config) -> Result<Self, PageError> {
        let landmarks = Landmarks::resolve(&host, &config.markers)?;
        log::debug!(
            "pagefx: resolved landmarks ({} nav links)",
            landmarks.nav_links.len()
        );
        Ok(Self {
            host,
            config,
            landmarks,
            ctx: RefCell::new(PipelineContext::default()),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn landmarks(&self) -> &Landmarks<H::Element> {
        &self.landmarks
    }

    /// Read-only view of the pipeline context.
    pub fn context(&self) -> Ref<'_, PipelineContext<H::Element>> {
        self.ctx.borrow()
    }

    pub fn state(&self) -> NavState {
        self.ctx.borrow().state
    }

    /// Current breakpoint name with the CSS string quoting removed.
    pub fn breakpoint(&self) -> String {
        unquote(&self.host.breakpoint_content())
    }

    pub fn is_small(&self) -> bool {
        self.breakpoint() == self.config.small_breakpoint
    }
}
