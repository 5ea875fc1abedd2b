#![forbid(unsafe_code)]

//! Lifecycle events emitted by an overlay instance.

use std::fmt;
use std::str::FromStr;

use lmodal_runtime::Keyed;

use super::error::ParseError;
use super::item::Item;

/// An event delivered to handlers registered on an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    /// The surface was built; fires before the overlay is visible.
    Init,
    /// The overlay became visible and interactive.
    Open,
    /// The item's content finished rendering successfully.
    ContentReady(Item),
    /// Navigation moved to a new index.
    Change(usize),
    /// Closing started.
    Close,
    /// The instance was torn down and removed from the registry.
    Destroy,
}

/// Discriminant of [`ModalEvent`], used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModalEventKind {
    Init,
    Open,
    ContentReady,
    Change,
    Close,
    Destroy,
}

impl ModalEventKind {
    pub const ALL: [Self; 6] = [
        Self::Init,
        Self::Open,
        Self::ContentReady,
        Self::Change,
        Self::Close,
        Self::Destroy,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Open => "open",
            Self::ContentReady => "contentReady",
            Self::Change => "change",
            Self::Close => "close",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for ModalEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalEventKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::new(s, "an overlay event name"))
    }
}

impl Keyed for ModalEvent {
    type Kind = ModalEventKind;

    fn kind(&self) -> ModalEventKind {
        match self {
            Self::Init => ModalEventKind::Init,
            Self::Open => ModalEventKind::Open,
            Self::ContentReady(_) => ModalEventKind::ContentReady,
            Self::Change(_) => ModalEventKind::Change,
            Self::Close => ModalEventKind::Close,
            Self::Destroy => ModalEventKind::Destroy,
        }
    }
}
