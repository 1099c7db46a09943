//! `pagefx_core` host traits over the browser's `window` and `document`.
//!
//! DOM calls that can throw are logged at warn and otherwise ignored; a failed class
//! toggle should not take the page down.

use std::cell::RefCell;

use js_sys::{Function, Promise};
use pagefx_core::{
    Clock, Dom, Fetcher, IntersectionConfig, Method, PageError, Response, Selector,
    SessionHistory, Viewport,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, Document, DomParser, Element, HtmlAnchorElement, HtmlElement,
    IntersectionObserver, IntersectionObserverInit, Request, RequestInit, ScrollBehavior,
    ScrollIntoViewOptions, SupportedType, Window,
};

/// Best-effort message out of a thrown JS value.
pub(crate) fn js_error(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn warn_on_err<T>(what: &str, result: Result<T, JsValue>) {
    if let Err(err) = result {
        log::warn!("{what} failed: {}", js_error(&err));
    }
}

pub struct WebHost {
    window: Window,
    document: Document,
    parser: DomParser,
    observer: RefCell<Option<IntersectionObserver>>,
}

impl WebHost {
    pub fn new() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or_else(|| PageError::host("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| PageError::host("window has no document"))?;
        let parser = DomParser::new().map_err(|e| PageError::host(js_error(&e)))?;
        Ok(Self {
            window,
            document,
            parser,
            observer: RefCell::new(None),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Create the reveal observer; `callback` receives `(entries, observer)`.
    pub fn connect_observer(
        &self,
        callback: &Function,
        config: &IntersectionConfig,
    ) -> Result<(), PageError> {
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&config.root_margin);
        init.set_threshold(&JsValue::from_f64(config.threshold));
        let observer = IntersectionObserver::new_with_options(callback, &init)
            .map_err(|e| PageError::host(js_error(&e)))?;
        if let Some(previous) = self.observer.replace(Some(observer)) {
            previous.disconnect();
        }
        Ok(())
    }

    pub fn disconnect_observer(&self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }

    fn with_observer(&self, f: impl FnOnce(&IntersectionObserver)) {
        match self.observer.borrow().as_ref() {
            Some(observer) => f(observer),
            None => log::debug!("reveal observer not connected"),
        }
    }
}

impl Dom for WebHost {
    type Element = Element;

    fn parent(&self, el: &Element) -> Option<Element> {
        el.parent_element()
    }

    fn has_attribute(&self, el: &Element, name: &str) -> bool {
        el.has_attribute(name)
    }

    fn attribute(&self, el: &Element, name: &str) -> Option<String> {
        el.get_attribute(name)
    }

    fn set_attribute(&self, el: &Element, name: &str, value: &str) {
        warn_on_err("setAttribute", el.set_attribute(name, value));
    }

    fn remove_attribute(&self, el: &Element, name: &str) {
        warn_on_err("removeAttribute", el.remove_attribute(name));
    }

    fn has_class(&self, el: &Element, class: &str) -> bool {
        el.class_list().contains(class)
    }

    fn add_class(&self, el: &Element, class: &str) {
        warn_on_err("classList.add", el.class_list().add_1(class));
    }

    fn remove_class(&self, el: &Element, class: &str) {
        warn_on_err("classList.remove", el.class_list().remove_1(class));
    }

    fn set_style_property(&self, el: &Element, name: &str, value: &str) {
        match el.dyn_ref::<HtmlElement>() {
            Some(html) => warn_on_err("style.setProperty", html.style().set_property(name, value)),
            None => log::debug!("style.setProperty: <{}> is not an HTML element", el.tag_name()),
        }
    }

    fn query_all(&self, root: Option<&Element>, selector: &Selector) -> Vec<Element> {
        let css = selector.to_css();
        let found = match root {
            Some(root) => root.query_selector_all(&css),
            None => self.document.query_selector_all(&css),
        };
        let list = match found {
            Ok(list) => list,
            Err(err) => {
                log::warn!("querySelectorAll({css}) failed: {}", js_error(&err));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn document_element(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn text_content(&self, el: &Element) -> Option<String> {
        el.text_content()
    }

    fn href(&self, el: &Element) -> Option<String> {
        let anchor = el.dyn_ref::<HtmlAnchorElement>()?;
        if !anchor.has_attribute("href") {
            return None;
        }
        Some(anchor.href())
    }

    fn is_connected(&self, el: &Element) -> bool {
        el.is_connected()
    }

    fn detach(&self, el: &Element) {
        el.remove();
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        warn_on_err("appendChild", parent.append_child(child));
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn parse_document(&self, body: &str) -> Option<Element> {
        match self.parser.parse_from_string(body, SupportedType::TextHtml) {
            Ok(doc) => doc.document_element(),
            Err(err) => {
                log::warn!("DOMParser failed: {}", js_error(&err));
                None
            }
        }
    }

    async fn animation_end(&self, el: &Element) {
        let promise = Promise::new(&mut |resolve, _reject| {
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            let added = el.add_event_listener_with_callback_and_add_event_listener_options(
                "animationend",
                &resolve,
                &options,
            );
            if let Err(err) = added {
                log::warn!("animationend listener failed: {}", js_error(&err));
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });
        if let Err(err) = JsFuture::from(promise).await {
            log::warn!("animationend wait failed: {}", js_error(&err));
        }
    }
}

impl SessionHistory for WebHost {
    fn location(&self) -> String {
        self.window.location().href().unwrap_or_else(|err| {
            log::warn!("location.href failed: {}", js_error(&err));
            String::new()
        })
    }

    fn push_state(&self, title: &str, url: &str) {
        match self.window.history() {
            Ok(history) => warn_on_err(
                "history.pushState",
                history.push_state_with_url(&JsValue::NULL, title, Some(url)),
            ),
            Err(err) => log::warn!("history unavailable: {}", js_error(&err)),
        }
    }

    fn replace_state(&self, title: &str, url: &str) {
        match self.window.history() {
            Ok(history) => warn_on_err(
                "history.replaceState",
                history.replace_state_with_url(&JsValue::NULL, title, Some(url)),
            ),
            Err(err) => log::warn!("history unavailable: {}", js_error(&err)),
        }
    }
}

impl Viewport for WebHost {
    fn scroll_top(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn scroll_into_view(&self, el: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        el.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn breakpoint_content(&self) -> String {
        let Some(body) = self.document.body() else {
            return String::new();
        };
        let style = match self.window.get_computed_style_with_pseudo_elt(&body, ":after") {
            Ok(Some(style)) => style,
            Ok(None) => return String::new(),
            Err(err) => {
                log::warn!("getComputedStyle failed: {}", js_error(&err));
                return String::new();
            }
        };
        style.get_property_value("content").unwrap_or_default()
    }

    fn watch_reveal(&self, el: &Element) {
        self.with_observer(|observer| observer.observe(el));
    }

    fn unwatch_reveal(&self, el: &Element) {
        self.with_observer(|observer| observer.unobserve(el));
    }
}

impl Fetcher for WebHost {
    async fn fetch(&self, url: &str, method: Method) -> Result<Response, PageError> {
        let transport = |err: JsValue| PageError::Fetch {
            status: 0,
            status_text: js_error(&err),
        };

        let init = RequestInit::new();
        init.set_method(method.as_str());
        let request =
            Request::new_with_str_and_init(url, &init).map_err(|e| PageError::host(js_error(&e)))?;

        let value = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .map_err(transport)?;
        let response: web_sys::Response = value
            .dyn_into()
            .map_err(|_| PageError::host("fetch resolved to a non-Response value"))?;

        let text = response.text().map_err(transport)?;
        let body = JsFuture::from(text)
            .await
            .map_err(transport)?
            .as_string()
            .unwrap_or_default();

        Ok(Response {
            status: response.status(),
            status_text: response.status_text(),
            body,
        })
    }
}

impl Clock for WebHost {
    fn now_ms(&self) -> f64 {
        match self.window.performance() {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }
}
