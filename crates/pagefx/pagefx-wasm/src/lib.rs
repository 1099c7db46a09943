//! Browser binding for `pagefx-core`.
//!
//! ```javascript
//! import init, { PageFx } from "./pkg/pagefx_wasm.js";
//! await init();
//! const fx = new PageFx({ log_level: "debug", parallax: { speed: 0.5 } });
//! await fx.navigate("/about");
//! fx.destroy();
//! ```

use std::rc::Rc;

use js_sys::Promise;
use pagefx_core::{Clock, Config, NavOutcome, NavigationRequest, PageError, PageFx, SessionHistory};
use serde::Deserialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

pub mod events;
pub mod host;
pub mod logger;

use crate::events::{Bindings, Engine};
use crate::host::{js_error, WebHost};

/// Constructor options: the engine config plus binding-only settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    #[serde(flatten)]
    pub config: Config,
    /// `off`, `error`, `warn`, `info` (default), `debug` or `trace`.
    pub log_level: Option<String>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js_error(err: PageError) -> JsError {
    JsError::new(&format!("{} error: {err}", err.category()))
}

fn outcome_name(outcome: NavOutcome) -> &'static str {
    match outcome {
        NavOutcome::Completed => "completed",
        NavOutcome::Unchanged => "unchanged",
        NavOutcome::Deferred => "deferred",
    }
}

/// The enhancement layer attached to the current page.
#[wasm_bindgen(js_name = PageFx)]
pub struct PageFxHandle {
    engine: Rc<Engine>,
    bindings: Option<Bindings>,
}

#[wasm_bindgen(js_class = PageFx)]
impl PageFxHandle {
    /// Enhance the current page. Pass an options object or undefined/null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<PageFxHandle, JsError> {
        #[cfg(feature = "console_error")]
        console_error_panic_hook::set_once();

        let options: Options = if jsvalue_is_undefined_or_null(&options) {
            Options::default()
        } else {
            swb::from_value(options).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let level = logger::parse_level(options.log_level.as_deref().unwrap_or("info"))
            .map_err(|e| JsError::new(&e))?;
        logger::init(level);

        let host = WebHost::new().map_err(to_js_error)?;
        let engine = Rc::new(PageFx::new(host, options.config).map_err(to_js_error)?);
        let bindings = Bindings::attach(&engine).map_err(to_js_error)?;
        engine.init();

        Ok(PageFxHandle {
            engine,
            bindings: Some(bindings),
        })
    }

    /// Run a transition to `url` (resolved against the current location).
    ///
    /// Resolves with `"completed"`, `"unchanged"` or `"deferred"`; rejects when the
    /// page could not be loaded or another navigation is in flight.
    pub fn navigate(&self, url: String) -> Promise {
        let engine = Rc::clone(&self.engine);
        future_to_promise(async move {
            let href = web_sys::Url::new_with_base(&url, &engine.host().location())
                .map(|u| u.href())
                .map_err(|e| JsError::new(&format!("invalid url '{url}': {}", js_error(&e))))?;
            let request = NavigationRequest::link(href, engine.host().now_ms());
            let outcome = engine.navigate(request).await.map_err(to_js_error)?;
            Ok::<JsValue, JsValue>(JsValue::from_str(outcome_name(outcome)))
        })
    }

    /// Current pipeline state, e.g. `"Idle"` or `"Exiting"`.
    pub fn state(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.engine.state()).map_err(|e| JsError::new(&format!("state error: {e}")))
    }

    /// Effective engine config.
    pub fn config(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.engine.config())
            .map_err(|e| JsError::new(&format!("config error: {e}")))
    }

    /// Remove every listener and stop observing reveal items. The page keeps its
    /// current content; in-flight transitions finish.
    pub fn destroy(&mut self) {
        if self.bindings.take().is_some() {
            log::info!("pagefx: destroyed");
        }
    }

    #[wasm_bindgen(getter)]
    pub fn attached(&self) -> bool {
        self.bindings.is_some()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
