#![forbid(unsafe_code)]

//! Content resolution end to end: classification, loads, failures, and
//! inline relocation.

use lmodal_core::{Document, ElementId, MemoryDocument};
use lmodal_harness::{Scenario, strategies};
use lmodal_widgets::modal::{
    Classification, ContentKind, Credentials, FetchOptions, Item, LoadError, LoadKind,
    LoadedContent, ModalEventKind, ModalOptions, NO_FETCH_LOADER, classify,
};
use proptest::prelude::*;

fn content_of(s: &Scenario) -> ElementId {
    s.ctx().get_instance(None).expect("live").content()
}

fn with_class(doc: &MemoryDocument, parent: ElementId, class: &str) -> Vec<ElementId> {
    doc.children(parent)
        .into_iter()
        .filter(|&el| doc.has_class(el, class))
        .collect()
}

// ============================================================================
// Video hosts
// ============================================================================

proptest! {
    #[test]
    fn video_host_links_never_fall_back_to_document(
        (link, service, id) in strategies::video_host_link(),
    ) {
        let classification = classify(&Item::new(link.as_str()));
        prop_assert_eq!(classification, Classification::Service { service, id });
    }

    #[test]
    fn image_locators_classify_as_images(locator in strategies::image_locator()) {
        let classification = classify(&Item::new(locator.as_str()));
        prop_assert!(
            matches!(classification, Classification::Image { .. }),
            "{} classified as {:?}",
            locator,
            classification
        );
    }
}

#[test]
fn youtube_link_renders_embed_frame() {
    let mut s = Scenario::new();
    s.open_with(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        ModalOptions::default().autoplay(true),
    )
    .expect("open");
    let frames = s.page().find_by_tag("iframe");
    assert_eq!(frames.len(), 1);
    assert_eq!(
        s.page().attribute(frames[0], "src").as_deref(),
        Some("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&rel=0")
    );
    assert_eq!(s.count(ModalEventKind::ContentReady), 1);
}

#[test]
fn direct_video_gets_native_player() {
    let mut s = Scenario::new();
    s.open_with(
        "clips/intro.webm?v=2",
        ModalOptions::default().autoplay(false),
    )
    .expect("open");
    let videos = s.page().find_by_tag("video");
    assert_eq!(videos.len(), 1);
    assert!(s.page().attribute(videos[0], "controls").is_some());
    assert!(s.page().attribute(videos[0], "autoplay").is_none());
    assert!(s.page().attribute(videos[0], "muted").is_none());
}

#[test]
fn unknown_locator_embeds_as_document() {
    let mut s = Scenario::new();
    s.open("https://example.com/terms").expect("open");
    let frames = s.page().find_by_tag("iframe");
    assert_eq!(
        s.page().attribute(frames[0], "src").as_deref(),
        Some("https://example.com/terms")
    );
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn photo_loads_without_error_node() {
    let mut s = Scenario::deferred();
    s.open(Item::new("photo.png").caption("Harbor")).expect("open");
    let content = content_of(&s);

    let request = s.requests().pop().expect("request");
    assert_eq!(
        request.kind,
        LoadKind::Image {
            src: "photo.png".into()
        }
    );
    assert_eq!(with_class(s.page(), content, "lm-spinner").len(), 1);
    assert_eq!(s.count(ModalEventKind::ContentReady), 0);

    assert!(s.resolve(Ok(LoadedContent::Image {
        width: Some(800),
        height: Some(600),
    })));
    assert!(s.page().find_by_class("lm-error").is_empty());
    assert!(s.page().find_by_class("lm-spinner").is_empty());
    let images = s.page().find_by_tag("img");
    assert_eq!(images.len(), 1);
    assert_eq!(s.page().attribute(images[0], "alt").as_deref(), Some("Harbor"));
    assert_eq!(s.count(ModalEventKind::ContentReady), 1);
}

#[test]
fn photo_failure_shows_exactly_one_error() {
    let mut s = Scenario::deferred();
    s.open("photo.png").expect("open");
    let content = content_of(&s);
    assert!(s.resolve(Err(LoadError::LoadFailed {
        locator: "photo.png".into(),
        reason: "decode error".into(),
    })));

    assert_eq!(with_class(s.page(), content, "lm-error").len(), 1);
    assert!(s.page().find_by_class("lm-spinner").is_empty());
    assert_eq!(s.ctx().get_instance(None).and_then(|m| m.loader()), None);
    assert_eq!(s.count(ModalEventKind::ContentReady), 0);
    assert!(s.page().find_by_tag("img").is_empty());
}

#[test]
fn failed_item_can_still_be_navigated_away_from() {
    let mut s = Scenario::deferred();
    s.open(vec![Item::new("broken.png"), Item::new("fine.png")])
        .expect("open");
    s.resolve(Err(LoadError::NotFound {
        locator: "broken.png".into(),
    }));
    s.key(lmodal_core::KeyCode::Right);
    assert!(s.page().find_by_class("lm-error").is_empty());
    assert!(s.resolve(Ok(LoadedContent::Image {
        width: None,
        height: None,
    })));
    assert_eq!(s.page().find_by_tag("img").len(), 1);
}

// ============================================================================
// Fetched documents
// ============================================================================

#[test]
fn ajax_request_carries_fetch_options() {
    let mut s = Scenario::deferred();
    let fetch = FetchOptions {
        credentials: Credentials::Include,
        headers: vec![("X-Requested-With".to_owned(), "lmodal".to_owned())],
    };
    s.open_with(
        Item::new("/fragments/card").kind(ContentKind::Ajax),
        ModalOptions::default().fetch(fetch),
    )
    .expect("open");

    let request = s.requests().pop().expect("request");
    match request.kind {
        LoadKind::Fetch {
            url,
            credentials,
            headers,
        } => {
            assert_eq!(url, "/fragments/card");
            assert_eq!(credentials, Credentials::Include);
            assert_eq!(
                headers,
                vec![("X-Requested-With".to_owned(), "lmodal".to_owned())]
            );
        }
        other => panic!("expected fetch, got {other:?}"),
    }

    assert!(s.resolve(Ok(LoadedContent::Markup("<p>card</p>".into()))));
    let holders = s.page().find_by_class("lm-html");
    assert_eq!(holders.len(), 1);
    assert_eq!(s.page().text(holders[0]), "<p>card</p>");
}

#[test]
fn http_error_status_renders_error() {
    let mut s = Scenario::deferred();
    s.open(Item::new("/missing").kind(ContentKind::Ajax))
        .expect("open");
    let status = LoadError::check_status("/missing", 404).expect_err("404 fails");
    assert!(s.resolve(Err(status)));
    let errors = s.page().find_by_class("lm-error");
    assert_eq!(errors.len(), 1);
    assert!(s.page().text(errors[0]).contains("404"));
}

#[test]
fn default_loader_reports_fetches_as_errors() {
    let mut s = Scenario::new();
    s.open(Item::new("/fragments/card").kind(ContentKind::Ajax))
        .expect("open");
    let errors = s.page().find_by_class("lm-error");
    assert_eq!(errors.len(), 1);
    assert!(s.page().text(errors[0]).contains(NO_FETCH_LOADER));
    assert!(s.page().find_by_class("lm-html").is_empty());
    assert!(s.page().find_by_class("lm-spinner").is_empty());
    assert_eq!(s.count(ModalEventKind::ContentReady), 0);
}

// ============================================================================
// Inline content
// ============================================================================

#[test]
fn inline_panel_returns_to_its_exact_position() {
    let mut s = Scenario::new();
    s.add_element("section", "before");
    let panel = s.add_element("div", "panel");
    s.add_element("footer", "after");
    {
        let page = s.page_mut();
        page.add_class(panel, "card");
        page.add_class(panel, "featured");
        page.set_style(panel, "display", Some("none"));
    }
    let parent = s.page().parent(panel);
    let placement = s.page().placement(panel);
    let before = s.fingerprint();

    let id = s.open("#panel").expect("open");
    assert_eq!(s.page().parent(panel), Some(content_of(&s)));
    assert!(s.page().has_class(panel, "lm-inline-active"));
    assert_eq!(s.count(ModalEventKind::ContentReady), 1);

    s.ctx_mut().destroy(id);
    assert_eq!(s.page().parent(panel), parent);
    assert_eq!(s.page().placement(panel), placement);
    assert_eq!(s.page().classes(panel), vec!["card", "featured"]);
    assert_eq!(s.page().style(panel, "display").as_deref(), Some("none"));
    assert_eq!(s.fingerprint(), before);
}

#[test]
fn inline_panel_restores_after_animated_close() {
    let mut s = Scenario::new();
    let panel = s.add_element("div", "panel");
    s.add_element("p", "tail");
    let before = s.fingerprint();
    s.open("#panel").expect("open");
    s.ctx_mut().close();
    assert_ne!(s.page().parent(panel), Some(s.page().body()));
    s.run_timers();
    assert_eq!(s.page().children(s.page().body())[0], panel);
    assert_eq!(s.fingerprint(), before);
}

#[test]
fn stacked_overlays_sharing_an_inline_element_restore_it_once() {
    for bottom_first in [true, false] {
        let mut s = Scenario::new();
        let panel = s.add_element("div", "panel");
        s.add_element("footer", "after");
        let before = s.fingerprint();

        let a = s.open("#panel").expect("a");
        let b = s.open("#panel").expect("b");
        let b_content = content_of(&s);
        assert_eq!(s.page().parent(panel), Some(b_content));

        let (first, second) = if bottom_first { (a, b) } else { (b, a) };
        s.ctx_mut().destroy(first);
        assert!(s.page().is_attached(panel));
        assert!(s.page().has_class(panel, "lm-inline-active"));
        s.ctx_mut().destroy(second);

        assert_eq!(s.page().parent(panel), Some(s.page().body()));
        assert_eq!(s.page().children(s.page().body())[0], panel);
        assert!(s.page().classes(panel).is_empty());
        assert_eq!(s.fingerprint(), before);
    }
}

#[test]
fn closing_the_top_overlay_hands_the_inline_element_back() {
    let mut s = Scenario::new();
    let panel = s.add_element("div", "panel");
    s.open("#panel").expect("a");
    let a_content = content_of(&s);
    let b = s.open("#panel").expect("b");
    s.ctx_mut().close_instance(b);
    s.run_timers();
    assert_eq!(s.page().parent(panel), Some(a_content));
}

#[test]
fn missing_inline_target_renders_not_found() {
    let mut s = Scenario::new();
    s.open("#nope").expect("open");
    let errors = s.page().find_by_class("lm-error");
    assert_eq!(errors.len(), 1);
    assert!(s.page().text(errors[0]).contains("#nope"));
    assert_eq!(s.count(ModalEventKind::ContentReady), 0);
    assert!(s.ctx().get_instance(None).is_some_and(|m| !m.shows_inline()));
}

#[test]
fn gallery_moves_inline_back_before_showing_next_item() {
    let mut s = Scenario::new();
    let panel = s.add_element("div", "panel");
    s.open(vec![Item::new("#panel"), Item::new("a.png")])
        .expect("open");
    s.key(lmodal_core::KeyCode::Right);
    assert_eq!(s.page().parent(panel), Some(s.page().body()));
    assert!(!s.page().has_class(panel, "lm-inline-active"));
}
