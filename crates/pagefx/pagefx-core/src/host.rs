//! The seam between the engine and the environment it runs in.
//!
//! The browser binding implements these traits over `web_sys`; tests implement them
//! over an in-memory tree. Everything runs on one thread, so none of the futures
//! returned here are required to be `Send`.
#![allow(async_fn_in_trait)]

use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// What to look for when querying the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Elements carrying the given attribute (any value).
    Attr(String),
    /// Elements with the given tag name.
    Tag(String),
}

impl Selector {
    pub fn attr(name: impl Into<String>) -> Self {
        Selector::Attr(name.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Selector::Tag(name.into())
    }

    /// CSS selector text for hosts that query with `querySelectorAll`.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Attr(name) => format!("[{name}]"),
            Selector::Tag(name) => name.clone(),
        }
    }
}

/// Element tree access.
pub trait Dom {
    type Element: Clone + PartialEq;

    fn parent(&self, el: &Self::Element) -> Option<Self::Element>;
    fn has_attribute(&self, el: &Self::Element, name: &str) -> bool;
    fn attribute(&self, el: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, el: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&self, el: &Self::Element, name: &str);
    fn has_class(&self, el: &Self::Element, class: &str) -> bool;
    fn add_class(&self, el: &Self::Element, class: &str);
    fn remove_class(&self, el: &Self::Element, class: &str);
    fn set_style_property(&self, el: &Self::Element, name: &str, value: &str);

    /// All matches below `root` (or the whole document when `None`), in document order.
    fn query_all(&self, root: Option<&Self::Element>, selector: &Selector) -> Vec<Self::Element>;

    fn query_first(
        &self,
        root: Option<&Self::Element>,
        selector: &Selector,
    ) -> Option<Self::Element> {
        self.query_all(root, selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn body(&self) -> Option<Self::Element>;
    fn document_element(&self) -> Option<Self::Element>;
    fn text_content(&self, el: &Self::Element) -> Option<String>;
    /// Fully resolved link target of an anchor.
    fn href(&self, el: &Self::Element) -> Option<String>;
    fn is_connected(&self, el: &Self::Element) -> bool;

    fn detach(&self, el: &Self::Element);
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    fn title(&self) -> String;
    fn set_title(&self, title: &str);

    /// Parse a fetched document; returns its detached root, or `None` if unparseable.
    fn parse_document(&self, body: &str) -> Option<Self::Element>;

    /// Resolves on the next animation completion of `el`.
    ///
    /// Implementations register exactly one listener and remove it once it fires.
    async fn animation_end(&self, el: &Self::Element);
}

/// Browser session history.
pub trait SessionHistory {
    /// Current absolute URL.
    fn location(&self) -> String;
    fn push_state(&self, title: &str, url: &str);
    fn replace_state(&self, title: &str, url: &str);
}

pub trait Viewport: Dom {
    fn scroll_top(&self) -> f64;
    fn scroll_to_top(&self);
    fn scroll_into_view(&self, el: &Self::Element);
    /// Raw computed `content` of `body::after`, quotes included.
    fn breakpoint_content(&self) -> String;
    fn watch_reveal(&self, el: &Self::Element);
    fn unwatch_reveal(&self, el: &Self::Element);
}

/// Request method. Pages are only ever loaded with `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    #[default]
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// Raw response as handed back by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

pub trait Fetcher {
    /// Issue one request. Resolves with whatever the server sent, any status;
    /// transport failures map to `PageError::Fetch` with status 0.
    async fn fetch(&self, url: &str, method: Method) -> Result<Response, PageError>;
}

pub trait Clock {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;
}

/// Everything the engine needs from its environment.
pub trait Host: Dom + SessionHistory + Viewport + Fetcher + Clock {}

impl<T> Host for T where T: Dom + SessionHistory + Viewport + Fetcher + Clock {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_css() {
        assert_eq!(Selector::attr("data-nav").to_css(), "[data-nav]");
        assert_eq!(Selector::tag("title").to_css(), "title");
    }

    #[test]
    fn method_defaults_to_get() {
        assert_eq!(Method::default().as_str(), "GET");
    }
}
