#![forbid(unsafe_code)]

//! `proptest` strategies for locators, galleries, and drags.

use lmodal_core::Point;
use lmodal_widgets::modal::{Item, VideoService};
use proptest::prelude::*;

/// A locator for an image file, with an optional query string.
pub fn image_locator() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9_/-]{0,16}",
        prop::sample::select(vec!["png", "jpg", "JPEG", "webp", "gif", "svg", "avif"]),
        prop::option::of("[a-z]{1,4}=[0-9]{1,3}"),
    )
        .prop_map(|(stem, ext, query)| match query {
            Some(q) => format!("{stem}.{ext}?{q}"),
            None => format!("{stem}.{ext}"),
        })
}

/// A video-host link paired with the host and identifier it should resolve to.
pub fn video_host_link() -> impl Strategy<Value = (String, VideoService, String)> {
    prop_oneof![
        "[A-Za-z0-9_-]{11}".prop_flat_map(|id| {
            prop::sample::select(vec![
                "https://www.youtube.com/watch?v=",
                "https://youtu.be/",
                "https://www.youtube.com/embed/",
            ])
            .prop_map(move |prefix| (format!("{prefix}{id}"), VideoService::YouTube, id.clone()))
        }),
        "[1-9][0-9]{5,9}".prop_map(|id| (
            format!("https://vimeo.com/{id}"),
            VideoService::Vimeo,
            id
        )),
        "[a-f0-9]{32}".prop_map(|id| (
            format!("https://rutube.ru/video/{id}/"),
            VideoService::RuTube,
            id
        )),
        ("-?[1-9][0-9]{0,8}", "[1-9][0-9]{0,8}").prop_map(|(owner, video)| {
            let id = format!("{owner}_{video}");
            (format!("https://vk.com/video{id}"), VideoService::Vk, id)
        }),
    ]
}

/// A gallery of 1..=`max` image items.
pub fn gallery(max: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(image_locator().prop_map(Item::new), 1..=max.max(1))
}

/// A straight drag: start point and offset.
pub fn drag() -> impl Strategy<Value = (Point, Point)> {
    (
        -400.0f32..400.0,
        -400.0f32..400.0,
        -300.0f32..300.0,
        -300.0f32..300.0,
    )
        .prop_map(|(x, y, dx, dy)| (Point::new(x, y), Point::new(dx, dy)))
}
