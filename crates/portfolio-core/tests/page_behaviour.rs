//! End-to-end behaviour of the page components through [`Page`].
//!
//! Every test builds the stock portfolio document in a [`FakeDocument`],
//! starts the page, and drives it the way a browser host would.

use core::time::Duration;

use portfolio_core::config::PageConfig;
use portfolio_core::dom::{
    Dom, DomEvent, IntersectionEntry, ObserverId, ReadyState, ScrollBehavior, Target,
};
use portfolio_core::page::Page;
use portfolio_core::testing::{FakeDocument, NodeId, ScrollCall};
use pretty_assertions::assert_eq;

const KONAMI: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "b",
    "a",
];

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

struct Portfolio {
    preloader: NodeId,
    navbar: NodeId,
    toggle: NodeId,
    menu: NodeId,
    links: [NodeId; 3],
    sections: [NodeId; 3],
    dangling: NodeId,
    form: NodeId,
    cards: [NodeId; 4],
    images: [NodeId; 2],
}

fn portfolio_document(ready: ReadyState) -> (FakeDocument, Portfolio) {
    let mut doc = FakeDocument::new();
    doc.set_ready_state(ready);
    let preloader = doc.add("div", &[("id", "preloader")]);
    let navbar = doc.add("nav", &[("class", "navbar")]);
    let toggle = doc.add("button", &[("id", "menuToggle"), ("class", "navbar__toggle")]);
    let menu = doc.add("ul", &[("id", "navMenu"), ("class", "navbar__menu")]);
    let links = [
        doc.add("a", &[("class", "navbar__link"), ("href", "#home")]),
        doc.add("a", &[("class", "navbar__link"), ("href", "#about")]),
        doc.add("a", &[("class", "navbar__link"), ("href", "#projects")]),
    ];
    let sections = [
        doc.add("section", &[("id", "home")]),
        doc.add("section", &[("id", "about")]),
        doc.add("section", &[("id", "projects")]),
    ];
    for (idx, section) in sections.iter().enumerate() {
        doc.set_offset_top(*section, 800.0 * idx as f64);
    }
    let dangling = doc.add("a", &[("class", "btn"), ("href", "#missing")]);
    doc.add("a", &[("href", "https://github.com/")]);
    let form = doc.add("form", &[("id", "contactForm")]);
    let cards = [
        doc.add("div", &[("class", "project-card")]),
        doc.add("div", &[("class", "project-card")]),
        doc.add("div", &[("class", "about__card")]),
        doc.add("div", &[("class", "evidence-card")]),
    ];
    let images = [
        doc.add("img", &[("data-src", "img/one.webp"), ("alt", "one")]),
        doc.add("img", &[("data-src", "img/two.webp"), ("alt", "two")]),
    ];
    (
        doc,
        Portfolio {
            preloader,
            navbar,
            toggle,
            menu,
            links,
            sections,
            dangling,
            form,
            cards,
            images,
        },
    )
}

fn started(ready: ReadyState) -> (Page<FakeDocument>, Portfolio) {
    let (doc, ids) = portfolio_document(ready);
    let mut page = Page::new(doc, PageConfig::default());
    page.start();
    (page, ids)
}

fn has_class(page: &Page<FakeDocument>, el: NodeId, class: &str) -> bool {
    page.dom().has_class(&el, class)
}

/// The observer currently watching `el`.
fn observer_of(page: &Page<FakeDocument>, el: NodeId) -> ObserverId {
    (0..8)
        .map(ObserverId)
        .find(|id| page.dom().observed(*id).contains(&el))
        .expect("element is observed")
}

fn press_all(page: &mut Page<FakeDocument>, keys: &[&str]) {
    for key in keys {
        page.dispatch(&Target::Document, &DomEvent::key(*key));
    }
}

// ---------------------------------------------------------------------------
// Preloader
// ---------------------------------------------------------------------------

#[test]
fn preloader_hides_after_grace_and_detaches_after_removal() {
    let (mut page, ids) = started(ReadyState::Interactive);
    let body = page.dom().body_id();
    assert!(has_class(&page, body, "loading"));

    page.advance_to(ms(5_000));
    assert!(
        !has_class(&page, ids.preloader, "preloader--hidden"),
        "nothing happens before load"
    );

    let load_at = page.now();
    let outcome = page.dispatch(&Target::Window, &DomEvent::Load);
    assert_eq!(outcome.delivered, 1);

    page.advance_to(load_at + ms(599));
    assert!(!has_class(&page, ids.preloader, "preloader--hidden"));
    assert!(has_class(&page, body, "loading"));

    page.advance_to(load_at + ms(600));
    assert!(has_class(&page, ids.preloader, "preloader--hidden"));
    assert!(!has_class(&page, body, "loading"));
    assert!(page.dom().is_connected(&ids.preloader));

    page.advance_to(load_at + ms(1_099));
    assert!(page.dom().is_connected(&ids.preloader));

    page.advance_to(load_at + ms(1_100));
    assert!(!page.dom().is_connected(&ids.preloader));
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn preloader_load_listener_is_one_shot() {
    let (mut page, _) = started(ReadyState::Interactive);
    assert_eq!(page.listeners_of("preloader"), 1);
    page.dispatch(&Target::Window, &DomEvent::Load);
    assert_eq!(page.listeners_of("preloader"), 0);
    assert_eq!(page.dispatch(&Target::Window, &DomEvent::Load).delivered, 0);
    assert_eq!(page.pending_timers(), 1);
}

#[test]
fn preloader_starts_grace_immediately_when_already_loaded() {
    let (mut page, ids) = started(ReadyState::Complete);
    assert_eq!(page.listeners_of("preloader"), 0);
    page.advance_time(ms(600));
    assert!(has_class(&page, ids.preloader, "preloader--hidden"));
    page.advance_time(ms(500));
    assert!(!page.dom().is_connected(&ids.preloader));
}

#[test]
fn preloader_removal_tolerates_element_already_gone() {
    let (mut page, ids) = started(ReadyState::Complete);
    page.advance_time(ms(600));
    page.dom_mut().remove_element(&ids.preloader);
    page.advance_time(ms(500));
    assert!(!page.dom().is_connected(&ids.preloader));
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn navbar_scrolled_threshold_is_exclusive() {
    let (mut page, ids) = started(ReadyState::Complete);
    for (y, expected) in [(100.0, false), (101.0, true), (50.0, false), (100.5, true)] {
        page.dom_mut().set_scroll_y(y);
        page.dispatch(&Target::Window, &DomEvent::Scroll);
        assert_eq!(
            has_class(&page, ids.navbar, "navbar--scrolled"),
            expected,
            "scroll_y = {y}"
        );
    }
}

#[test]
fn menu_toggle_flips_and_links_close() {
    let (mut page, ids) = started(ReadyState::Complete);
    let click = |page: &mut Page<FakeDocument>, el: NodeId| {
        page.dispatch(&Target::Element(el), &DomEvent::Click)
    };

    click(&mut page, ids.toggle);
    assert!(has_class(&page, ids.menu, "navbar__menu--active"));
    assert!(has_class(&page, ids.toggle, "navbar__toggle--active"));

    click(&mut page, ids.toggle);
    assert!(!has_class(&page, ids.menu, "navbar__menu--active"));
    assert!(!has_class(&page, ids.toggle, "navbar__toggle--active"));

    click(&mut page, ids.toggle);
    let outcome = click(&mut page, ids.links[1]);
    // Navigation closes the menu, smooth scroll handles the jump.
    assert_eq!(outcome.delivered, 2);
    assert!(outcome.default_prevented);
    assert!(!has_class(&page, ids.menu, "navbar__menu--active"));
    assert!(!has_class(&page, ids.toggle, "navbar__toggle--active"));
}

#[test]
fn active_link_follows_visible_section() {
    let (mut page, ids) = started(ReadyState::Complete);
    let observer = observer_of(&page, ids.sections[0]);
    let options = page.dom().observer_options(observer).unwrap();
    assert_eq!(options.threshold, 0.3);
    assert_eq!(options.root_margin.to_string(), "-100px 0px -100px 0px");

    page.deliver_intersections(observer, vec![IntersectionEntry::entering(ids.sections[1])]);
    let active: Vec<bool> = ids
        .links
        .iter()
        .map(|l| has_class(&page, *l, "navbar__link--active"))
        .collect();
    assert_eq!(active, vec![false, true, false]);

    // Last intersecting entry of a batch wins; leaving entries are ignored.
    page.deliver_intersections(
        observer,
        vec![
            IntersectionEntry::entering(ids.sections[0]),
            IntersectionEntry::entering(ids.sections[2]),
            IntersectionEntry::leaving(ids.sections[1]),
        ],
    );
    let active: Vec<bool> = ids
        .links
        .iter()
        .map(|l| has_class(&page, *l, "navbar__link--active"))
        .collect();
    assert_eq!(active, vec![false, false, true]);
}

#[test]
fn navigation_without_anchors_registers_nothing() {
    let mut doc = FakeDocument::new();
    doc.add("a", &[("class", "navbar__link"), ("href", "https://example.com")]);
    let mut page = Page::new(doc, PageConfig::default());
    page.start();
    assert_eq!(page.listeners_of("navigation"), 0);
    assert_eq!(page.observer_count(), 0);
    assert!(page.inert_components().contains(&"navigation"));
}

#[test]
fn menu_toggle_without_panel_still_toggles_control() {
    let mut doc = FakeDocument::new();
    let toggle = doc.add("button", &[("id", "menuToggle")]);
    let mut page = Page::new(doc, PageConfig::default());
    page.start();
    page.dispatch(&Target::Element(toggle), &DomEvent::Click);
    assert!(page.dom().has_class(&toggle, "navbar__toggle--active"));
}

// ---------------------------------------------------------------------------
// SmoothScroll
// ---------------------------------------------------------------------------

#[test]
fn anchor_click_scrolls_with_header_offset() {
    let (mut page, ids) = started(ReadyState::Complete);
    let outcome = page.dispatch(&Target::Element(ids.links[2]), &DomEvent::Click);
    assert!(outcome.default_prevented);
    assert_eq!(
        page.dom().scrolls(),
        &[ScrollCall {
            top: 1600.0 - 80.0,
            behavior: ScrollBehavior::Smooth,
        }]
    );
}

#[test]
fn dangling_fragment_is_suppressed_without_scroll() {
    let (mut page, ids) = started(ReadyState::Complete);
    let outcome = page.dispatch(&Target::Element(ids.dangling), &DomEvent::Click);
    assert_eq!(outcome.delivered, 1);
    assert!(outcome.default_prevented);
    assert!(page.dom().scrolls().is_empty());
}

#[test]
fn bare_hash_anchor_is_suppressed() {
    let mut doc = FakeDocument::new();
    let top = doc.add("a", &[("href", "#")]);
    let mut page = Page::new(doc, PageConfig::default());
    page.start();
    let outcome = page.dispatch(&Target::Element(top), &DomEvent::Click);
    assert!(outcome.default_prevented);
    assert!(page.dom().scrolls().is_empty());
}

// ---------------------------------------------------------------------------
// ContactForm
// ---------------------------------------------------------------------------

#[test]
fn contact_submit_acknowledges_and_resets() {
    let (mut page, ids) = started(ReadyState::Complete);
    let outcome = page.dispatch(&Target::Element(ids.form), &DomEvent::Submit);
    assert!(outcome.default_prevented);
    assert_eq!(page.dom().alerts().len(), 1);
    assert!(page.dom().alerts()[0].contains("not connected"));
    assert_eq!(page.dom().form_resets(), &[ids.form]);
}

// ---------------------------------------------------------------------------
// ScrollAnimations
// ---------------------------------------------------------------------------

#[test]
fn reveal_targets_start_hidden() {
    let (page, ids) = started(ReadyState::Complete);
    for card in ids.cards {
        assert_eq!(page.dom().style(card, "opacity"), Some("0"));
        assert_eq!(page.dom().style(card, "transform"), Some("translateY(30px)"));
        assert_eq!(
            page.dom().style(card, "transition"),
            Some("opacity 0.6s ease, transform 0.6s ease")
        );
    }
    let observer = observer_of(&page, ids.cards[0]);
    let options = page.dom().observer_options(observer).unwrap();
    assert_eq!(options.threshold, 0.1);
    assert_eq!(options.root_margin.bottom, -50);
}

#[test]
fn reveal_is_staggered_by_batch_index_and_one_shot() {
    let (mut page, ids) = started(ReadyState::Complete);
    let observer = observer_of(&page, ids.cards[0]);
    let t0 = page.now();
    let batch: Vec<_> = ids.cards[..3]
        .iter()
        .map(|c| IntersectionEntry::entering(*c))
        .collect();
    assert_eq!(page.deliver_intersections(observer, batch), 3);
    assert_eq!(page.observed_count() - ids.images.len() - ids.sections.len(), 1);

    let shown = |page: &Page<FakeDocument>| -> Vec<bool> {
        ids.cards[..3]
            .iter()
            .map(|c| page.dom().style(*c, "opacity") == Some("1"))
            .collect()
    };

    page.advance_to(t0);
    assert_eq!(shown(&page), vec![true, false, false]);
    page.advance_to(t0 + ms(99));
    assert_eq!(shown(&page), vec![true, false, false]);
    page.advance_to(t0 + ms(100));
    assert_eq!(shown(&page), vec![true, true, false]);
    page.advance_to(t0 + ms(200));
    assert_eq!(shown(&page), vec![true, true, true]);
    assert_eq!(page.dom().style(ids.cards[2], "transform"), Some("translateY(0)"));

    // Scrolling back in later does nothing: the targets are no longer observed.
    page.dom_mut().set_style(&ids.cards[0], "opacity", "0.5");
    let again = page.deliver_intersections(observer, vec![IntersectionEntry::entering(ids.cards[0])]);
    assert_eq!(again, 0);
    page.advance_time(ms(1_000));
    assert_eq!(page.dom().style(ids.cards[0], "opacity"), Some("0.5"));
}

#[test]
fn reveal_index_counts_non_intersecting_entries() {
    let (mut page, ids) = started(ReadyState::Complete);
    let observer = observer_of(&page, ids.cards[0]);
    let t0 = page.now();
    page.deliver_intersections(
        observer,
        vec![
            IntersectionEntry::leaving(ids.cards[0]),
            IntersectionEntry::entering(ids.cards[3]),
        ],
    );
    page.advance_to(t0 + ms(99));
    assert_eq!(page.dom().style(ids.cards[3], "opacity"), Some("0"));
    page.advance_to(t0 + ms(100));
    assert_eq!(page.dom().style(ids.cards[3], "opacity"), Some("1"));
    // The leaving card is still observed.
    assert!(page.dom().observed(observer).contains(&ids.cards[0]));
}

// ---------------------------------------------------------------------------
// LazyLoadImages
// ---------------------------------------------------------------------------

#[test]
fn lazy_image_loads_on_entry_once() {
    let (mut page, ids) = started(ReadyState::Complete);
    let observer = observer_of(&page, ids.images[0]);
    assert_eq!(
        page.dom().observer_options(observer).unwrap().root_margin.to_string(),
        "0px 0px 0px 0px"
    );

    page.deliver_intersections(
        observer,
        vec![
            IntersectionEntry::entering(ids.images[0]),
            IntersectionEntry::leaving(ids.images[1]),
        ],
    );
    assert_eq!(
        page.dom().attribute(&ids.images[0], "src").as_deref(),
        Some("img/one.webp")
    );
    assert!(has_class(&page, ids.images[0], "loaded"));
    assert_eq!(page.dom().attribute(&ids.images[1], "src"), None);
    assert_eq!(page.dom().observed(observer), vec![ids.images[1]]);
}

#[test]
fn lazy_loading_is_inert_without_intersection_observer() {
    let (mut doc, ids) = portfolio_document(ReadyState::Complete);
    doc.set_intersection_observer_support(false);
    let mut page = Page::new(doc, PageConfig::default());
    page.start();
    assert!(page.inert_components().contains(&"lazy_images"));
    for img in ids.images {
        assert!(
            (0..8)
                .map(ObserverId)
                .all(|id| !page.dom().observed(id).contains(&img))
        );
    }
}

// ---------------------------------------------------------------------------
// EasterEgg
// ---------------------------------------------------------------------------

#[test]
fn key_sequence_triggers_flourish_then_message() {
    let (mut page, _) = started(ReadyState::Complete);
    let body = page.dom().body_id();
    press_all(&mut page, &KONAMI);
    assert_eq!(page.dom().style(body, "animation"), Some("rainbow 2s infinite"));
    assert!(page.dom().alerts().is_empty());

    page.advance_time(ms(1_999));
    assert!(page.dom().alerts().is_empty());
    page.advance_time(ms(1));
    assert_eq!(page.dom().alerts().len(), 1);
    assert!(page.dom().alerts()[0].contains("Easter Egg"));
    assert_eq!(page.dom().style(body, "animation"), None);
}

#[test]
fn wrong_final_key_never_activates() {
    let (mut page, _) = started(ReadyState::Complete);
    let body = page.dom().body_id();
    press_all(&mut page, &KONAMI[..9]);
    press_all(&mut page, &["c"]);
    page.advance_time(ms(10_000));
    assert_eq!(page.dom().style(body, "animation"), None);
    assert!(page.dom().alerts().is_empty());

    // Progress went back to zero: "a" alone does not finish the sequence.
    press_all(&mut page, &["a"]);
    page.advance_time(ms(10_000));
    assert!(page.dom().alerts().is_empty());

    press_all(&mut page, &KONAMI);
    page.advance_time(ms(2_000));
    assert_eq!(page.dom().alerts().len(), 1);
}

#[test]
fn key_sequence_twice_activates_twice() {
    let (mut page, _) = started(ReadyState::Complete);
    press_all(&mut page, &KONAMI);
    press_all(&mut page, &KONAMI);
    page.advance_time(ms(2_000));
    assert_eq!(page.dom().alerts().len(), 2);
}

// ---------------------------------------------------------------------------
// ConsoleMessage and absent anchors
// ---------------------------------------------------------------------------

#[test]
fn console_banner_has_three_styled_lines() {
    let (page, _) = started(ReadyState::Complete);
    let lines = page.dom().console_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].1.contains("font-size: 20px"));
    assert!(lines[2].1.contains("#764ba2"));
}

#[test]
fn empty_document_survives_every_event() {
    let mut page = Page::new(FakeDocument::new(), PageConfig::default());
    page.start();
    let body = page.dom().body_id();
    for event in [
        DomEvent::Load,
        DomEvent::Scroll,
        DomEvent::Click,
        DomEvent::Submit,
        DomEvent::key("ArrowUp"),
    ] {
        page.dispatch(&Target::Window, &event);
        page.dispatch(&Target::Document, &event);
        page.dispatch(&Target::Element(body), &event);
    }
    page.deliver_intersections(ObserverId(0), vec![IntersectionEntry::entering(body)]);
    page.advance_time(ms(10_000));
    assert!(page.dom().alerts().is_empty());
    assert!(page.dom().scrolls().is_empty());
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn config_overrides_reach_components() {
    let (doc, ids) = portfolio_document(ReadyState::Complete);
    let config = PageConfig::from_json(
        r#"{
            "timings": { "scrolled_threshold_px": 10, "header_offset_px": 0 },
            "classes": { "navbar_scrolled": "is-scrolled" }
        }"#,
    )
    .unwrap();
    let mut page = Page::new(doc, config);
    page.start();

    page.dom_mut().set_scroll_y(11.0);
    page.dispatch(&Target::Window, &DomEvent::Scroll);
    assert!(has_class(&page, ids.navbar, "is-scrolled"));

    page.dispatch(&Target::Element(ids.links[1]), &DomEvent::Click);
    assert_eq!(page.dom().scrolls()[0].top, 800.0);
}
