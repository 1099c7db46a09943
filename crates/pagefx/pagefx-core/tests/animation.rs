use pagefx_core::{animate, Dom};
use pagefx_test_fixtures::{poll_once, FakeHost, Op};
use pollster::block_on;

fn host() -> FakeHost {
    let host = FakeHost::from_page("a", "/a").expect("fixture a loads");
    host.clear_journal();
    host
}

#[test]
fn missing_element_or_name_is_a_no_op() {
    let host = host();
    let el = host.id("content-a");

    assert!(!block_on(animate(&host, None, Some("fadeInUp"), false)));
    assert!(!block_on(animate(&host, Some(&el), None, false)));
    assert!(!block_on(animate(&host, Some(&el), Some(""), true)));

    assert!(host.journal().is_empty());
    assert_eq!(host.active_listeners(), 0);
}

#[test]
fn class_is_removed_once_animation_ends() {
    let host = host();
    let el = host.id("content-a");

    assert!(block_on(animate(&host, Some(&el), Some("fadeInUp"), false)));

    assert_eq!(
        host.journal(),
        vec![
            Op::RemoveAttr(el, "hidden".into()),
            Op::AddClass(el, "fadeInUp".into()),
            Op::AnimationEnd(el),
            Op::RemoveClass(el, "fadeInUp".into()),
        ]
    );
    assert!(!host.has_class(&el, "fadeInUp"));
    assert_eq!(host.attr(el, "hidden"), None);
}

#[test]
fn hide_after_sets_hidden() {
    let host = host();
    let el = host.id("content-a");

    assert!(block_on(animate(&host, Some(&el), Some("fadeOutUp"), true)));

    assert_eq!(host.attr(el, "hidden").as_deref(), Some("true"));
    assert!(!host.has_class(&el, "fadeOutUp"));
}

#[test]
fn previously_hidden_element_is_shown_for_the_animation() {
    let host = host();
    let el = host.id("content-a");
    host.set_attribute(&el, "hidden", "true");

    block_on(animate(&host, Some(&el), Some("fadeInUp"), false));

    assert_eq!(host.attr(el, "hidden"), None);
}

#[test]
fn completion_waits_for_animation_end() {
    let host = host();
    let el = host.id("content-a");
    let gate = host.gate_animations();

    let mut running = Box::pin(animate(&host, Some(&el), Some("fadeInUp"), false));
    assert!(poll_once(running.as_mut()).is_pending());
    assert!(host.has_class(&el, "fadeInUp"));
    assert_eq!(host.active_listeners(), 1);

    gate.open();
    assert!(block_on(running));
    assert!(!host.has_class(&el, "fadeInUp"));
    assert_eq!(host.active_listeners(), 0);
}
