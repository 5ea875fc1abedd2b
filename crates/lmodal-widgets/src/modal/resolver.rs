#![forbid(unsafe_code)]

//! Content classification.
//!
//! [`classify`] decides how an [`Item`] is shown. First match wins:
//!
//! 1. a locator starting with `#` is inline content;
//! 2. an explicit [`ContentKind`] short-circuits sniffing;
//! 3. image and video file extensions (case-insensitive, query ignored);
//! 4. recognized video hosts, in [`VideoService::ALL`] order;
//! 5. anything else is an embeddable document.

use std::sync::LazyLock;

use regex::Regex;

use super::item::{ContentKind, Item};

static IMAGE_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpe?g|webp|avif|gif|svg)(\?.*)?$").expect("valid image extension regex")
});
static VIDEO_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(mp4|webm|ogg|m4v)(\?.*)?$").expect("valid video extension regex")
});
static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|v=|embed/)([\w-]{11})").expect("valid youtube regex")
});
static VIMEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(?:video/)?(\d{6,})").expect("valid vimeo regex"));
static RUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rutube\.ru/(?:video|play/embed)/([a-f0-9-]{16,})").expect("valid rutube regex")
});
static VK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"vk\.com/video(?:_ext\.php)?(-?\d+_\d+)?").expect("valid vk regex")
});

/// First capture group, or empty when the pattern matched without it.
fn capture(re: &Regex, haystack: &str) -> Option<String> {
    let caps = re.captures(haystack)?;
    Some(caps.get(1).map_or("", |m| m.as_str()).to_owned())
}

/// Third-party video hosts with a dedicated embed player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoService {
    YouTube,
    Vimeo,
    RuTube,
    Vk,
}

impl VideoService {
    /// Recognition order.
    pub const ALL: [Self; 4] = [Self::YouTube, Self::Vimeo, Self::RuTube, Self::Vk];

    pub const fn name(self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::Vimeo => "vimeo",
            Self::RuTube => "rutube",
            Self::Vk => "vk",
        }
    }

    /// Extract this host's video identifier from `locator`.
    ///
    /// VK links are embedded as given, so their identifier may be empty.
    pub fn extract(self, locator: &str) -> Option<String> {
        match self {
            Self::YouTube => capture(&YOUTUBE, locator),
            Self::Vimeo => capture(&VIMEO, locator),
            Self::RuTube => capture(&RUTUBE, locator),
            Self::Vk => capture(&VK, locator),
        }
    }

    /// First recognized host and its identifier.
    pub fn detect(locator: &str) -> Option<(Self, String)> {
        Self::ALL
            .into_iter()
            .find_map(|service| service.extract(locator).map(|id| (service, id)))
    }

    /// Player URL with this host's autoplay parameters.
    pub fn embed_url(self, id: &str, locator: &str, autoplay: bool) -> String {
        let flag = u8::from(autoplay);
        match self {
            Self::YouTube => {
                format!("https://www.youtube.com/embed/{id}?autoplay={flag}&rel=0")
            }
            Self::Vimeo => {
                format!("https://player.vimeo.com/video/{id}?autoplay={flag}&title=0&byline=0")
            }
            Self::RuTube => format!("https://rutube.ru/play/embed/{id}?autoplay={flag}"),
            Self::Vk => {
                let sep = if locator.contains('?') { '&' } else { '?' };
                format!("{locator}{sep}autoplay={flag}")
            }
        }
    }
}

/// How an item will be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Relocate the page element with this id.
    Inline { id: String },
    Image { src: String },
    /// Direct video file.
    Video { src: String },
    /// Fetch and insert markup.
    Ajax { url: String },
    /// Third-party player in a frame.
    Service { service: VideoService, id: String },
    /// Generic embeddable document in a frame.
    Document { url: String },
}

impl Classification {
    /// Whether showing this needs a host load.
    pub fn needs_load(&self) -> bool {
        matches!(self, Self::Image { .. } | Self::Ajax { .. })
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Inline { .. } => "inline",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Ajax { .. } => "ajax",
            Self::Service { .. } => "service",
            Self::Document { .. } => "document",
        }
    }
}

/// Classify `item`. Never fails; lookups and loads happen later.
pub fn classify(item: &Item) -> Classification {
    let locator = item.locator.trim();
    if let Some(id) = locator.strip_prefix('#') {
        return Classification::Inline { id: id.to_owned() };
    }
    if let Some(kind) = item.kind {
        let locator = locator.to_owned();
        return match kind {
            ContentKind::Image => Classification::Image { src: locator },
            ContentKind::Video => Classification::Video { src: locator },
            ContentKind::Ajax => Classification::Ajax { url: locator },
            ContentKind::Inline => Classification::Inline { id: locator },
        };
    }
    if IMAGE_EXT.is_match(locator) {
        return Classification::Image {
            src: locator.to_owned(),
        };
    }
    if VIDEO_EXT.is_match(locator) {
        return Classification::Video {
            src: locator.to_owned(),
        };
    }
    if let Some((service, id)) = VideoService::detect(locator) {
        return Classification::Service { service, id };
    }
    Classification::Document {
        url: locator.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn of(locator: &str) -> Classification {
        classify(&Item::new(locator))
    }

    #[test]
    fn hash_locator_is_inline_even_with_explicit_kind() {
        assert_eq!(of("#panel"), Classification::Inline { id: "panel".into() });
        let item = Item::new("#panel").kind(ContentKind::Image);
        assert_eq!(classify(&item), Classification::Inline { id: "panel".into() });
    }

    #[test]
    fn explicit_kind_short_circuits_sniffing() {
        let item = Item::new("https://youtu.be/dQw4w9WgXcQ").kind(ContentKind::Video);
        assert_eq!(
            classify(&item),
            Classification::Video {
                src: "https://youtu.be/dQw4w9WgXcQ".into()
            }
        );
        let item = Item::new("/gallery/photo.png").kind(ContentKind::Ajax);
        assert!(matches!(classify(&item), Classification::Ajax { .. }));
    }

    #[test]
    fn extension_sniffing_ignores_case_and_query() {
        assert!(matches!(of("photo.png"), Classification::Image { .. }));
        assert!(matches!(of("/a/B.JPEG?w=400&h=300"), Classification::Image { .. }));
        assert!(matches!(of("icon.svg"), Classification::Image { .. }));
        assert!(matches!(of("clip.MP4"), Classification::Video { .. }));
        assert!(matches!(of("clip.webm?t=10"), Classification::Video { .. }));
        assert!(matches!(of("photo.png.html"), Classification::Document { .. }));
    }

    #[test]
    fn video_hosts() {
        assert_eq!(
            of("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Classification::Service {
                service: VideoService::YouTube,
                id: "dQw4w9WgXcQ".into()
            }
        );
        assert_eq!(
            of("https://vimeo.com/video/123456789"),
            Classification::Service {
                service: VideoService::Vimeo,
                id: "123456789".into()
            }
        );
        assert_eq!(
            of("https://rutube.ru/video/0123456789abcdef0123/"),
            Classification::Service {
                service: VideoService::RuTube,
                id: "0123456789abcdef0123".into()
            }
        );
        assert_eq!(
            of("https://vk.com/video-12345_456239017"),
            Classification::Service {
                service: VideoService::Vk,
                id: "-12345_456239017".into()
            }
        );
    }

    #[test]
    fn short_vimeo_ids_fall_back_to_document() {
        assert!(matches!(of("https://vimeo.com/123"), Classification::Document { .. }));
        assert!(matches!(of("https://example.com/page"), Classification::Document { .. }));
    }

    #[test]
    fn embed_urls_carry_autoplay() {
        assert_eq!(
            VideoService::YouTube.embed_url("abcdefghijk", "", true),
            "https://www.youtube.com/embed/abcdefghijk?autoplay=1&rel=0"
        );
        assert_eq!(
            VideoService::Vimeo.embed_url("123456", "", false),
            "https://player.vimeo.com/video/123456?autoplay=0&title=0&byline=0"
        );
        assert_eq!(
            VideoService::RuTube.embed_url("abcdef0123456789", "", true),
            "https://rutube.ru/play/embed/abcdef0123456789?autoplay=1"
        );
        assert_eq!(
            VideoService::Vk.embed_url("", "https://vk.com/video_ext.php?oid=1&id=2", true),
            "https://vk.com/video_ext.php?oid=1&id=2&autoplay=1"
        );
        assert_eq!(
            VideoService::Vk.embed_url("1_2", "https://vk.com/video1_2", false),
            "https://vk.com/video1_2?autoplay=0"
        );
    }

    #[test]
    fn needs_load_only_for_images_and_ajax() {
        assert!(of("a.png").needs_load());
        assert!(classify(&Item::new("/doc").kind(ContentKind::Ajax)).needs_load());
        assert!(!of("a.mp4").needs_load());
        assert!(!of("#x").needs_load());
        assert_eq!(of("https://example.com").label(), "document");
    }

    proptest! {
        #[test]
        fn recognized_hosts_never_fall_back(
            id in "[A-Za-z0-9_-]{11}",
            vimeo in 100_000u64..10_000_000_000,
            rutube in "[a-f0-9]{16,32}",
            host in 0usize..5,
        ) {
            let (locator, expected) = match host {
                0 => (format!("https://www.youtube.com/watch?v={id}"), VideoService::YouTube),
                1 => (format!("https://youtu.be/{id}"), VideoService::YouTube),
                2 => (format!("https://vimeo.com/{vimeo}"), VideoService::Vimeo),
                3 => (format!("https://rutube.ru/video/{rutube}/"), VideoService::RuTube),
                _ => (format!("https://vk.com/video-1_{vimeo}"), VideoService::Vk),
            };
            match of(&locator) {
                Classification::Service { service, .. } => prop_assert_eq!(service, expected),
                other => prop_assert!(false, "{locator} classified as {other:?}"),
            }
        }
    }
}
