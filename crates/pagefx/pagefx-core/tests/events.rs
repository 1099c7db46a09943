use pagefx_core::{ClickOutcome, Config, Dom, Modifiers, PageError, PageFx, Trigger};
use pagefx_test_fixtures::{logging, url, FakeHost, HistoryOp, Op};

fn page_a() -> PageFx<FakeHost> {
    logging::capture();
    let host = FakeHost::from_page("a", "/a").expect("fixture a loads");
    let fx = PageFx::new(host, Config::default()).expect("landmarks resolve");
    fx.init();
    fx.host().clear_journal();
    fx
}

fn click(fx: &PageFx<FakeHost>, id: &str, modifiers: Modifiers) -> ClickOutcome {
    let target = fx.host().id(id);
    fx.on_click(&target, modifiers)
}

#[test]
fn init_enhances_document_and_seeds_history() {
    logging::capture();
    let host = FakeHost::from_page("a", "/a").unwrap();
    let fx = PageFx::new(host, Config::default()).unwrap();
    assert!(fx.host().journal().is_empty());

    fx.init();

    let host = fx.host();
    let root = host.document_element().unwrap();
    assert!(host.classes(root).iter().any(|c| c == "js"));
    assert_eq!(
        host.history(),
        vec![HistoryOp::Replace {
            title: "Page A".into(),
            url: url("/a")
        }]
    );
    assert!(host.fetches().is_empty());
}

#[test]
fn missing_landmark_is_reported() {
    logging::capture();
    let host = FakeHost::from_page("a", "/a").unwrap();
    let mut config = Config::default();
    config.markers.nav = "data-missing".into();

    let err = PageFx::new(host, config).err().expect("nav marker is absent");

    assert_eq!(
        err,
        PageError::MissingLandmark {
            marker: "data-missing".into()
        }
    );
    assert_eq!(err.category(), "markup");
}

#[test]
fn landmarks_collect_nav_links() {
    let fx = page_a();
    let host = fx.host();
    let lm = fx.landmarks();

    assert_eq!(lm.nav, host.id("nav"));
    assert_eq!(lm.main_wrapper, host.id("main"));
    assert_eq!(
        lm.nav_links,
        vec![host.id("nav-a"), host.id("nav-b"), host.id("nav-c")]
    );
}

#[test]
fn click_inside_page_link_starts_navigation() {
    let fx = page_a();
    fx.host().advance_clock(12.5);

    let outcome = click(&fx, "nav-b-label", Modifiers::default());

    assert!(outcome.prevent_default);
    let request = outcome.navigation.expect("navigation requested");
    assert_eq!(request.url, url("/b"));
    assert_eq!(request.trigger, Trigger::Link);
    assert_eq!(request.issued_at, 12.5);
    // the click only produces the request; nothing ran yet
    assert!(fx.host().journal().is_empty());
}

#[test]
fn modified_clicks_are_left_to_the_browser() {
    let fx = page_a();
    for modifiers in [
        Modifiers {
            meta: true,
            ctrl: false,
        },
        Modifiers {
            meta: false,
            ctrl: true,
        },
    ] {
        assert_eq!(
            click(&fx, "nav-b", modifiers),
            ClickOutcome::default(),
            "{modifiers:?}"
        );
    }
}

#[test]
fn click_on_current_page_link_is_swallowed() {
    let fx = page_a();

    let outcome = click(&fx, "nav-a", Modifiers::default());

    assert!(outcome.prevent_default);
    assert!(outcome.navigation.is_none());
}

#[test]
fn fragment_link_scrolls_smoothly() {
    let fx = page_a();
    let team = fx.host().id("team");

    let outcome = click(&fx, "team-link", Modifiers::default());

    assert!(outcome.prevent_default);
    assert!(outcome.navigation.is_none());
    assert_eq!(fx.host().journal(), vec![Op::ScrollIntoView(team)]);
}

#[test]
fn fragment_without_target_is_left_alone() {
    let fx = page_a();

    assert_eq!(
        click(&fx, "missing-link", Modifiers::default()),
        ClickOutcome::default()
    );
    assert!(fx.host().journal().is_empty());
}

#[test]
fn ordinary_links_and_content_are_left_alone() {
    let fx = page_a();

    for id in ["external", "content-a", "team"] {
        assert_eq!(
            click(&fx, id, Modifiers::default()),
            ClickOutcome::default(),
            "{id}"
        );
    }
    assert!(fx.host().journal().is_empty());
}

#[test]
fn popstate_request_uses_current_location() {
    let fx = page_a();
    fx.host().set_location("/c");
    fx.host().advance_clock(40.0);

    let request = fx.on_popstate();

    assert_eq!(request.url, url("/c"));
    assert_eq!(request.trigger, Trigger::Popstate);
    assert_eq!(request.issued_at, 40.0);
}

#[test]
fn page_links_inside_content_are_intercepted() {
    logging::capture();
    let host = FakeHost::from_page("c", "/c").unwrap();
    let fx = PageFx::new(host, Config::default()).unwrap();
    fx.init();

    let outcome = click(&fx, "inline-a", Modifiers::default());

    assert_eq!(outcome.navigation.map(|r| r.url), Some(url("/a")));
}
