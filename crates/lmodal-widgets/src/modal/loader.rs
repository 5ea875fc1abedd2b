#![forbid(unsafe_code)]

//! Host-driven content loading.
//!
//! Image decodes and document fetches are I/O the overlay never performs
//! itself. It hands a [`LoadRequest`] to the host's [`ContentLoader`] and
//! waits for [`ModalContext::complete_load`](super::ModalContext::complete_load)
//! with the same [`LoadTicket`]. A loader may also finish synchronously by
//! returning the outcome from [`ContentLoader::begin`].
//!
//! # Failure Modes
//!
//! - A completion for a ticket that is no longer pending (the instance
//!   navigated, closed, or was destroyed) is ignored.
//! - Every failure becomes a [`LoadError`] rendered inside the overlay.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::options::Credentials;
use super::registry::ModalId;

/// Identity of one load. Never reused within a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Monotonic ticket allocator owned by a context.
#[derive(Debug, Default)]
pub(crate) struct TicketSource {
    issued: u64,
}

impl TicketSource {
    pub(crate) fn next(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }
}

/// What to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadKind {
    /// Decode an image.
    Image { src: String },
    /// Fetch a document and return its markup.
    Fetch {
        url: String,
        credentials: Credentials,
        headers: Vec<(String, String)>,
    },
}

impl LoadKind {
    pub fn locator(&self) -> &str {
        match self {
            Self::Image { src } => src,
            Self::Fetch { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub modal: ModalId,
    pub kind: LoadKind,
}

/// Successful load outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedContent {
    /// The image decoded; natural size when known.
    Image {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Markup of a fetched document.
    Markup(String),
}

/// Why content could not be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// An inline `#id` locator has no matching element.
    NotFound { locator: String },
    /// The resource failed to load or decode.
    LoadFailed { locator: String, reason: String },
    /// A fetched document answered with a non-success status.
    Http { locator: String, status: u16 },
}

impl LoadError {
    pub fn locator(&self) -> &str {
        match self {
            Self::NotFound { locator }
            | Self::LoadFailed { locator, .. }
            | Self::Http { locator, .. } => locator,
        }
    }

    /// Map an HTTP status to `Ok(())` for 2xx and [`LoadError::Http`] otherwise.
    pub fn check_status(locator: &str, status: u16) -> Result<(), Self> {
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(Self::Http {
                locator: locator.to_owned(),
                status,
            })
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { locator } => write!(f, "element '{locator}' not found"),
            Self::LoadFailed { locator, reason } => {
                write!(f, "failed to load '{locator}': {reason}")
            }
            Self::Http { locator, status } => {
                write!(f, "failed to load '{locator}': HTTP {status}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Host side of content loading.
pub trait ContentLoader {
    /// Start a load. Return `Some` to finish synchronously, `None` to report
    /// later through `ModalContext::complete_load`.
    fn begin(&mut self, request: LoadRequest) -> Option<Result<LoadedContent, LoadError>>;

    /// The overlay no longer wants `ticket`; the host may abort it.
    fn cancel(&mut self, _ticket: LoadTicket) {}
}

/// Reason reported for fetches when no loader performs network I/O.
pub const NO_FETCH_LOADER: &str = "no loader configured";

/// Completes every request at once. Images are treated as decoded; fetches
/// fail with [`NO_FETCH_LOADER`] because nothing here can perform them.
/// Suits hosts that decode images synchronously and never fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateLoader;

impl ContentLoader for ImmediateLoader {
    fn begin(&mut self, request: LoadRequest) -> Option<Result<LoadedContent, LoadError>> {
        Some(match request.kind {
            LoadKind::Image { .. } => Ok(LoadedContent::Image {
                width: None,
                height: None,
            }),
            LoadKind::Fetch { url, .. } => Err(LoadError::LoadFailed {
                locator: url,
                reason: NO_FETCH_LOADER.to_owned(),
            }),
        })
    }
}

#[derive(Debug, Default)]
struct Recorded {
    requests: Vec<LoadRequest>,
    cancelled: Vec<LoadTicket>,
}

/// Records requests and leaves them pending. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    inner: Rc<RefCell<Recorded>>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<LoadRequest> {
        self.inner.borrow().requests.clone()
    }

    pub fn last(&self) -> Option<LoadRequest> {
        self.inner.borrow().requests.last().cloned()
    }

    pub fn cancelled(&self) -> Vec<LoadTicket> {
        self.inner.borrow().cancelled.clone()
    }
}

impl ContentLoader for RecordingLoader {
    fn begin(&mut self, request: LoadRequest) -> Option<Result<LoadedContent, LoadError>> {
        self.inner.borrow_mut().requests.push(request);
        None
    }

    fn cancel(&mut self, ticket: LoadTicket) {
        self.inner.borrow_mut().cancelled.push(ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ticket: LoadTicket, kind: LoadKind) -> LoadRequest {
        LoadRequest {
            ticket,
            modal: ModalId::new(),
            kind,
        }
    }

    #[test]
    fn tickets_are_monotonic() {
        let mut source = TicketSource::default();
        let a = source.next();
        let b = source.next();
        assert!(b > a);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "load#1");
    }

    #[test]
    fn status_check() {
        assert!(LoadError::check_status("/x", 204).is_ok());
        assert_eq!(
            LoadError::check_status("/x", 404),
            Err(LoadError::Http {
                locator: "/x".into(),
                status: 404
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = LoadError::NotFound {
            locator: "#panel".into(),
        };
        assert_eq!(err.to_string(), "element '#panel' not found");
        assert_eq!(err.locator(), "#panel");
        let err = LoadError::Http {
            locator: "/doc".into(),
            status: 500,
        };
        assert_eq!(err.to_string(), "failed to load '/doc': HTTP 500");
    }

    #[test]
    fn immediate_loader_decodes_images_and_refuses_fetches() {
        let mut source = TicketSource::default();
        let mut loader = ImmediateLoader;
        let image = loader.begin(request(
            source.next(),
            LoadKind::Image { src: "a.png".into() },
        ));
        assert!(matches!(image, Some(Ok(LoadedContent::Image { .. }))));
        let fetch = loader.begin(request(
            source.next(),
            LoadKind::Fetch {
                url: "/doc".into(),
                credentials: Credentials::Omit,
                headers: Vec::new(),
            },
        ));
        assert_eq!(
            fetch,
            Some(Err(LoadError::LoadFailed {
                locator: "/doc".into(),
                reason: NO_FETCH_LOADER.into(),
            }))
        );
    }

    #[test]
    fn recording_loader_shares_state_across_clones() {
        let mut source = TicketSource::default();
        let observer = RecordingLoader::new();
        let mut loader = observer.clone();
        let ticket = source.next();
        assert!(
            loader
                .begin(request(ticket, LoadKind::Image { src: "a.png".into() }))
                .is_none()
        );
        loader.cancel(ticket);
        assert_eq!(observer.requests().len(), 1);
        assert_eq!(observer.last().map(|r| r.kind.locator().to_owned()), Some("a.png".into()));
        assert_eq!(observer.cancelled(), vec![ticket]);
    }
}
