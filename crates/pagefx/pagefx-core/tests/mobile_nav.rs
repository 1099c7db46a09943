use pagefx_core::{Config, Dom, Modifiers, PageFx};
use pagefx_test_fixtures::{logging, FakeHost};

fn page_a(breakpoint: &str) -> PageFx<FakeHost> {
    logging::capture();
    let host = FakeHost::from_page("a", "/a").expect("fixture a loads");
    host.set_breakpoint(breakpoint);
    let fx = PageFx::new(host, Config::default()).expect("landmarks resolve");
    fx.init();
    fx
}

struct NavView {
    hidden: Option<String>,
    expanded: Option<String>,
    locked: bool,
}

fn nav_view(fx: &PageFx<FakeHost>) -> NavView {
    let host = fx.host();
    let body = host.body().unwrap();
    NavView {
        hidden: host.attr(host.id("nav"), "aria-hidden"),
        expanded: host.attr(host.id("nav-toggle"), "aria-expanded"),
        locked: host.classes(body).iter().any(|c| c == "is-inactive"),
    }
}

fn assert_open(fx: &PageFx<FakeHost>) {
    let view = nav_view(fx);
    assert!(fx.is_nav_open());
    assert_eq!(view.hidden.as_deref(), Some("false"));
    assert_eq!(view.expanded.as_deref(), Some("true"));
    assert!(view.locked);
}

fn assert_closed(fx: &PageFx<FakeHost>) {
    let view = nav_view(fx);
    assert!(!fx.is_nav_open());
    assert_eq!(view.hidden.as_deref(), Some("true"));
    assert_eq!(view.expanded.as_deref(), Some("false"));
    assert!(!view.locked);
}

#[test]
fn init_hides_nav_on_small_viewport() {
    let fx = page_a("\"small\"");
    assert_closed(&fx);
}

#[test]
fn init_shows_nav_on_large_viewport() {
    let fx = page_a("\"large\"");
    let view = nav_view(&fx);
    assert_eq!(view.hidden.as_deref(), Some("false"));
    assert_eq!(view.expanded.as_deref(), Some("false"));
    assert!(!view.locked);
}

#[test]
fn toggle_flips_all_facets_together() {
    let fx = page_a("\"small\"");

    fx.toggle_mobile_nav();
    assert_open(&fx);

    fx.toggle_mobile_nav();
    assert_closed(&fx);
}

#[test]
fn click_inside_toggle_button_toggles() {
    let fx = page_a("\"small\"");
    let icon = fx.host().id("nav-toggle-icon");

    let outcome = fx.on_click(&icon, Modifiers::default());

    assert!(!outcome.prevent_default);
    assert!(outcome.navigation.is_none());
    assert_open(&fx);
}

#[test]
fn escape_closes_open_nav_on_small_viewport() {
    for key in ["Escape", "Esc"] {
        let fx = page_a("\"small\"");
        fx.toggle_mobile_nav();

        assert!(fx.on_keydown(key), "{key} should close the nav");
        assert_closed(&fx);
    }
}

#[test]
fn escape_is_ignored_when_closed() {
    let fx = page_a("\"small\"");
    assert!(!fx.on_keydown("Escape"));
    assert_closed(&fx);
}

#[test]
fn escape_closes_open_nav_on_large_viewport() {
    let fx = page_a("\"large\"");
    fx.set_nav_open(true);
    assert_open(&fx);

    assert!(fx.on_keydown("Escape"));
    assert_closed(&fx);
    assert!(!fx.on_keydown("Escape"));
}

#[test]
fn other_keys_do_nothing() {
    let fx = page_a("\"small\"");
    fx.toggle_mobile_nav();

    assert!(!fx.on_keydown("Enter"));
    assert!(!fx.on_keydown("escape"));
    assert_open(&fx);
}

#[test]
fn resize_into_small_collapses_open_nav() {
    let fx = page_a("\"large\"");
    fx.set_nav_open(true);

    fx.host().set_breakpoint("\"small\"");
    fx.on_resize();

    assert_closed(&fx);
}

#[test]
fn resize_out_of_small_shows_closed_nav() {
    let fx = page_a("\"small\"");
    assert_closed(&fx);

    fx.host().set_breakpoint("\"large\"");
    fx.on_resize();

    let view = nav_view(&fx);
    assert_eq!(view.hidden.as_deref(), Some("false"));
    assert_eq!(view.expanded.as_deref(), Some("false"));
    assert!(!view.locked);
}

#[test]
fn breakpoint_quoting_is_stripped() {
    for raw in ["\"small\"", "'small'", "small", " small"] {
        let fx = page_a(raw);
        assert!(fx.is_small(), "{raw:?} should read as small");
    }
    let fx = page_a("none");
    assert!(!fx.is_small());
}

#[test]
fn small_breakpoint_name_is_configurable() {
    logging::capture();
    let host = FakeHost::from_page("a", "/a").unwrap();
    host.set_breakpoint("\"mobile\"");
    let config = Config {
        small_breakpoint: "mobile".into(),
        ..Config::default()
    };
    let fx = PageFx::new(host, config).unwrap();
    fx.init();

    assert!(fx.is_small());
    assert_closed(&fx);
}
