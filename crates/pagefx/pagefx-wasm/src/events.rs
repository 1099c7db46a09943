//! Browser listeners feeding the engine.
//!
//! Every listener registered here is owned by a [`Bindings`]; dropping it removes
//! them all and disconnects the reveal observer.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use pagefx_core::{FrameDebounce, Modifiers, NavigationRequest, PageError, PageFx};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    KeyboardEvent, MouseEvent, Window,
};

use crate::host::{js_error, WebHost};

pub type Engine = PageFx<WebHost>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, PageError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|e| PageError::host(format!("addEventListener({kind}): {}", js_error(&e))))?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        if let Err(err) = removed {
            log::warn!("removeEventListener({}) failed: {}", self.kind, js_error(&err));
        }
    }
}

/// Runs `action` at most once per animation frame, however many events arrive.
struct FrameThrottle {
    window: Window,
    debounce: Rc<RefCell<FrameDebounce<i32>>>,
    frame: Closure<dyn FnMut(f64)>,
}

impl FrameThrottle {
    fn new(window: &Window, mut action: impl FnMut() + 'static) -> Self {
        let debounce = Rc::new(RefCell::new(FrameDebounce::new()));
        let pending = Rc::clone(&debounce);
        let frame = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            let due = pending.borrow_mut().fire();
            if due {
                action();
            }
        });
        Self {
            window: window.clone(),
            debounce,
            frame,
        }
    }

    fn request(&self) {
        let handle = match self
            .window
            .request_animation_frame(self.frame.as_ref().unchecked_ref())
        {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("requestAnimationFrame failed: {}", js_error(&err));
                return;
            }
        };
        let stale = self.debounce.borrow_mut().schedule(handle);
        if let Some(stale) = stale {
            self.cancel_frame(stale);
        }
    }

    fn cancel_frame(&self, handle: i32) {
        if let Err(err) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame failed: {}", js_error(&err));
        }
    }
}

impl Drop for FrameThrottle {
    fn drop(&mut self) {
        let pending = self.debounce.borrow_mut().cancel();
        if let Some(handle) = pending {
            self.cancel_frame(handle);
        }
    }
}

/// Start `request` without waiting for it. Failures were already logged by the engine.
pub fn spawn_navigation(engine: &Rc<Engine>, request: NavigationRequest) {
    let engine = Rc::clone(engine);
    spawn_local(async move {
        if let Err(err) = engine.navigate(request).await {
            log::debug!("navigation not run: {err}");
        }
    });
}

/// Everything one engine registered with the browser.
pub struct Bindings {
    engine: Rc<Engine>,
    listeners: Vec<Listener>,
    _on_intersection: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Bindings {
    /// Register the window listeners and connect the reveal observer.
    pub fn attach(engine: &Rc<Engine>) -> Result<Self, PageError> {
        let on_intersection = {
            let engine = Rc::clone(engine);
            Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
                move |entries: Array, _observer: IntersectionObserver| {
                    let entries: Vec<(Element, f64)> = entries
                        .iter()
                        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                        .map(|entry| (entry.target(), entry.intersection_ratio()))
                        .collect();
                    engine.on_intersection(entries);
                },
            )
        };

        let window = engine.host().window().clone();
        let target: &EventTarget = window.as_ref();
        let mut listeners = Vec::with_capacity(5);

        let click_engine = Rc::clone(engine);
        listeners.push(Listener::add(target, "click", move |event: Event| {
            let Some(el) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
            else {
                return;
            };
            let modifiers = event
                .dyn_ref::<MouseEvent>()
                .map(|m| Modifiers {
                    meta: m.meta_key(),
                    ctrl: m.ctrl_key(),
                })
                .unwrap_or_default();
            let outcome = click_engine.on_click(&el, modifiers);
            if outcome.prevent_default {
                event.prevent_default();
            }
            if let Some(request) = outcome.navigation {
                spawn_navigation(&click_engine, request);
            }
        })?);

        let popstate_engine = Rc::clone(engine);
        listeners.push(Listener::add(target, "popstate", move |_event: Event| {
            let request = popstate_engine.on_popstate();
            spawn_navigation(&popstate_engine, request);
        })?);

        let key_engine = Rc::clone(engine);
        listeners.push(Listener::add(target, "keydown", move |event: Event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
                key_engine.on_keydown(&key);
            }
        })?);

        let scroll = {
            let engine = Rc::clone(engine);
            FrameThrottle::new(&window, move || engine.on_scroll())
        };
        listeners.push(Listener::add(target, "scroll", move |_event: Event| {
            scroll.request();
        })?);

        let resize = {
            let engine = Rc::clone(engine);
            FrameThrottle::new(&window, move || engine.on_resize())
        };
        listeners.push(Listener::add(target, "resize", move |_event: Event| {
            resize.request();
        })?);

        engine.host().connect_observer(
            on_intersection.as_ref().unchecked_ref(),
            &engine.config().intersection,
        )?;

        log::debug!("pagefx: {} window listeners attached", listeners.len());
        Ok(Self {
            engine: Rc::clone(engine),
            listeners,
            _on_intersection: on_intersection,
        })
    }
}

impl Drop for Bindings {
    fn drop(&mut self) {
        self.engine.host().disconnect_observer();
        log::debug!("pagefx: detaching {} window listeners", self.listeners.len());
    }
}
