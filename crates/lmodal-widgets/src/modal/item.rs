#![forbid(unsafe_code)]

//! Items: what a single overlay slide shows.

use std::fmt;
use std::str::FromStr;

use super::error::ParseError;

/// Explicit content kind. When set on an [`Item`] it short-circuits
/// locator sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Image,
    Video,
    Ajax,
    Inline,
}

impl ContentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Ajax => "ajax",
            Self::Inline => "inline",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "ajax" => Ok(Self::Ajax),
            "inline" => Ok(Self::Inline),
            _ => Err(ParseError::new(s, "image, video, ajax or inline")),
        }
    }
}

/// One slide: a locator plus presentation metadata.
///
/// The locator is a URL, a `#id` reference to an element already on the
/// page, or anything the host can load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub locator: String,
    pub kind: Option<ContentKind>,
    pub caption: Option<String>,
    pub alt_text: Option<String>,
    /// Extra class applied to the overlay container while this item shows.
    pub extra_class: Option<String>,
}

impl Item {
    /// Create an item with only a locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    #[must_use]
    pub fn extra_class(mut self, class: impl Into<String>) -> Self {
        self.extra_class = Some(class.into());
        self
    }

    /// Text for an image's `alt`: the alt text, else the caption, else empty.
    pub fn alt_or_caption(&self) -> &str {
        self.alt_text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }

    /// Build an item from trigger attributes (`href`, `data-src`, `data-type`,
    /// `data-caption`, `title`, `data-alt`, `data-class`).
    ///
    /// `data-src` wins over `href` and `data-caption` over `title`. Returns
    /// `None` when no locator is present or it is blank. Unknown
    /// `data-type` values are ignored.
    pub fn from_attributes<'a, I>(attributes: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut href = None;
        let mut src = None;
        let mut title = None;
        let mut item = Self::default();
        for (key, value) in attributes {
            match key {
                "href" => href = Some(value),
                "data-src" => src = Some(value),
                "data-type" => item.kind = value.parse().ok(),
                "data-caption" => item.caption = non_blank(value),
                "title" => title = non_blank(value),
                "data-alt" => item.alt_text = non_blank(value),
                "data-class" => item.extra_class = non_blank(value),
                _ => {}
            }
        }
        if item.caption.is_none() {
            item.caption = title;
        }
        let locator = src.or(href)?.trim();
        if locator.is_empty() {
            return None;
        }
        item.locator = locator.to_owned();
        Some(item)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl From<&str> for Item {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}

impl From<String> for Item {
    fn from(locator: String) -> Self {
        Self::new(locator)
    }
}

/// An ordered, possibly single-element, set of items for one overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemList(pub Vec<Item>);

impl ItemList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Item> {
        self.0
    }
}

impl From<Item> for ItemList {
    fn from(item: Item) -> Self {
        Self(vec![item])
    }
}

impl From<&str> for ItemList {
    fn from(locator: &str) -> Self {
        Self(vec![Item::new(locator)])
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl<const N: usize> From<[Item; N]> for ItemList {
    fn from(items: [Item; N]) -> Self {
        Self(items.into())
    }
}

impl FromIterator<Item> for ItemList {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
