// Tests de DOM: wasm-pack test --headless --firefox
#![cfg(target_arch = "wasm32")]

use std::rc::Rc;
use js_sys::Promise;
use barcode_scanner_pwa::dom::{append_child, body, create_typed, element_children, has_class, query_selector};
use barcode_scanner_pwa::services::scheduler::{AnimationFrameScheduler, SharedScheduler};
use barcode_scanner_pwa::services::video_surface::settle_playback;
use barcode_scanner_pwa::utils::{DATA_CARD_CLASS, DOT_LOADER_CLASS, NO_SUPPORT_CLASS, NO_SUPPORT_MESSAGE};
use barcode_scanner_pwa::viewmodels::CarouselView;
use barcode_scanner_pwa::views::{
    close_card, remove_dot_loader, render_card, render_dot_loader, render_no_support,
    results_container, show_setup_failure, DomCarouselView,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

fn scheduler() -> SharedScheduler {
    Rc::new(AnimationFrameScheduler)
}

#[wasm_bindgen_test]
fn results_container_is_created_once() {
    let first = results_container().unwrap();
    let second = results_container().unwrap();
    let second: &Node = &second;
    assert!(first.is_same_node(Some(second)));
    assert_eq!(first.id(), "container");
}

#[wasm_bindgen_test]
async fn card_without_fade_is_removed_at_once() {
    let card = render_card("ABC123", 0, scheduler()).unwrap();
    assert!(has_class(&card, DATA_CARD_CLASS));
    assert_eq!(card.text_content().unwrap_or_default(), "ABC123✕");

    let container = results_container().unwrap();
    append_child(&container, &card).unwrap();
    assert!(card.is_connected());

    close_card(&card, 0, &scheduler()).await;
    assert!(!card.is_connected());
}

#[wasm_bindgen_test]
async fn card_fades_out_before_removal() {
    let card = render_card("FADE", 50, scheduler()).unwrap();
    append_child(&body().unwrap(), &card).unwrap();
    close_card(&card, 50, &scheduler()).await;
    assert!(!card.is_connected());
    assert_eq!(card.style().get_property_value("opacity").unwrap(), "0");
}

#[wasm_bindgen_test]
fn no_support_uses_default_message() {
    let card = render_no_support(None).unwrap();
    assert_eq!(card.text_content().unwrap_or_default(), NO_SUPPORT_MESSAGE);
    let custom = render_no_support(Some("No camera")).unwrap();
    assert_eq!(custom.text_content().unwrap_or_default(), "No camera");
}

#[wasm_bindgen_test]
fn dot_loader_is_removed() {
    let loader = render_dot_loader().unwrap();
    assert_eq!(loader.children().length(), 3);
    append_child(&body().unwrap(), &loader).unwrap();
    remove_dot_loader();
    let selector = format!(".{}", DOT_LOADER_CLASS);
    assert!(query_selector(&selector).unwrap().is_none());
}

#[wasm_bindgen_test]
fn carousel_view_wraps_steps_and_marks_buttons() {
    let host: HtmlElement = create_typed("div").unwrap();
    for alt in ["Welcome", "Scan"] {
        let step: HtmlElement = create_typed("div").unwrap();
        step.set_attribute("alt", alt).unwrap();
        append_child(&host, &step).unwrap();
    }
    append_child(&body().unwrap(), &host).unwrap();

    let view = DomCarouselView::new(host.clone(), scheduler()).unwrap();
    assert_eq!(view.step_count(), 2);
    assert_eq!(view.step_alt(1).as_deref(), Some("Scan"));
    assert_eq!(element_children(&host).len(), 2);
    assert_eq!(host.tab_index(), 0);

    view.set_label("Scan");
    assert_eq!(host.get_attribute("aria-label").as_deref(), Some("Scan"));
    host.remove();
}

#[wasm_bindgen_test]
fn setup_failure_swaps_loader_for_no_support() {
    let loader = render_dot_loader().unwrap();
    append_child(&results_container().unwrap(), &loader).unwrap();

    show_setup_failure().unwrap();

    assert!(!loader.is_connected());
    let selector = format!(".{}", NO_SUPPORT_CLASS);
    let card = query_selector(&selector).unwrap().expect("no-support card in body");
    assert_eq!(card.text_content().unwrap_or_default(), NO_SUPPORT_MESSAGE);
    card.remove();
}

#[wasm_bindgen_test]
async fn rejected_playback_is_reported_not_dropped() {
    let rejected = Promise::reject(&JsValue::from_str("NotAllowedError"));
    assert!(!settle_playback(Ok(rejected)).await);
    assert!(!settle_playback(Err(JsValue::from_str("no src"))).await);
    assert!(settle_playback(Ok(Promise::resolve(&JsValue::UNDEFINED))).await);
}
