#![cfg(target_arch = "wasm32")]
use pagefx_wasm::{abi_version, PageFxHandle};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const MARKUP: &str = r#"
<button id="nav-toggle" data-nav-toggle aria-expanded="false"><span id="icon">Menu</span></button>
<nav id="nav" data-nav aria-hidden="false">
  <a id="nav-a" href="/a" data-page-link>A</a>
</nav>
<main id="main" data-main-wrapper>
  <div id="content" data-main-content>
    <div id="reveal" data-reveal></div>
    <div id="parallax" data-parallax></div>
  </div>
</main>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(markup: &str) {
    document().body().unwrap().set_inner_html(markup);
}

fn by_id(id: &str) -> HtmlElement {
    document()
        .get_element_by_id(id)
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap()
}

fn options(value: serde_json::Value) -> JsValue {
    serde_wasm_bindgen::to_value(&value).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults_enhances_page() {
    mount(MARKUP);
    let mut fx = PageFxHandle::new(JsValue::UNDEFINED).unwrap();

    let root = document().document_element().unwrap();
    assert!(root.class_list().contains("js"));
    assert!(fx.attached());
    assert_eq!(fx.state().unwrap().as_string().as_deref(), Some("Idle"));

    let transform = by_id("parallax").style().get_property_value("transform").unwrap();
    assert!(!transform.is_empty());

    fx.destroy();
    assert!(!fx.attached());
}

#[wasm_bindgen_test]
fn missing_landmarks_fail_construction() {
    mount("<p>plain page</p>");
    assert!(PageFxHandle::new(JsValue::NULL).is_err());
}

#[wasm_bindgen_test]
fn bad_log_level_fails_construction() {
    mount(MARKUP);
    assert!(PageFxHandle::new(options(json!({ "log_level": "loud" }))).is_err());
}

#[wasm_bindgen_test]
fn partial_config_is_merged_with_defaults() {
    mount(MARKUP);
    let mut fx = PageFxHandle::new(options(json!({
        "log_level": "debug",
        "parallax": { "speed": 0.5 }
    })))
    .unwrap();

    let config: serde_json::Value = serde_wasm_bindgen::from_value(fx.config().unwrap()).unwrap();
    assert_eq!(config["parallax"]["speed"], json!(0.5));
    assert_eq!(config["parallax"]["property"], json!("--scrollparallax"));
    assert_eq!(config["markers"]["nav"], json!("data-nav"));

    fx.destroy();
}

#[wasm_bindgen_test]
fn toggle_click_flips_nav() {
    mount(MARKUP);
    let mut fx = PageFxHandle::new(JsValue::UNDEFINED).unwrap();
    let nav = by_id("nav");
    assert_eq!(nav.get_attribute("aria-hidden").as_deref(), Some("false"));

    by_id("icon").click();
    assert_eq!(nav.get_attribute("aria-hidden").as_deref(), Some("true"));
    assert_eq!(
        by_id("nav-toggle").get_attribute("aria-expanded").as_deref(),
        Some("false")
    );

    by_id("icon").click();
    assert_eq!(nav.get_attribute("aria-hidden").as_deref(), Some("false"));
    assert!(document().body().unwrap().class_list().contains("is-inactive"));

    fx.destroy();
}

#[wasm_bindgen_test]
fn destroy_detaches_click_listener() {
    mount(MARKUP);
    let mut fx = PageFxHandle::new(JsValue::UNDEFINED).unwrap();
    fx.destroy();

    by_id("icon").click();

    assert_eq!(
        by_id("nav").get_attribute("aria-hidden").as_deref(),
        Some("false")
    );
}
