#![forbid(unsafe_code)]

//! Lightbox overlay: lifecycle, content resolution, and page ownership.
//!
//! A [`ModalContext`] owns the page ([`lmodal_core::Document`]) and every
//! overlay opened on it. Each [`ModalContext::open`] call produces one
//! independent [`Modal`] identified by a [`ModalId`]; the context tracks a
//! single "current" instance that receives input.
//!
//! # Submodules
//!
//! - [`item`]: what an overlay shows.
//! - [`options`]: layered configuration and attribute decoding.
//! - [`resolver`] / [`loader`]: content classification and host-driven loads.
//! - [`scroll_lock`]: reference-counted page scroll ownership.
//! - [`focus`]: tab containment inside an overlay.
//! - [`gesture`]: drag-to-dismiss recognition.
//! - [`gallery`]: bounded index navigation.
//! - [`lifecycle`]: the per-instance state machine.
//! - [`registry`]: live instances, z-order, and the current pointer.
//! - [`context`]: the public entry point.
//!
//! # Invariants
//!
//! - An instance moves only forward through
//!   `Init -> Ready -> Closing -> Destroyed`.
//! - `Close` and `Destroy` events fire at most once per instance.
//! - The page scroll is locked iff at least one live instance with
//!   scrollbar hiding enabled is in `Ready` or `Closing`.

pub mod context;
pub mod error;
pub mod events;
pub mod focus;
pub mod gallery;
pub mod gesture;
mod inline;
pub mod item;
pub mod lifecycle;
pub mod loader;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod scroll_lock;
mod surface;

pub use context::{Instance, ModalContext};
pub use error::{AttributeError, ConfigError, NavigationError, OpenError, ParseError};
pub use events::{ModalEvent, ModalEventKind};
pub use focus::FocusTrap;
pub use gallery::Gallery;
pub use gesture::{
    DragFeedback, GestureConfig, GestureEngine, GestureOutcome, GesturePhase, VelocityRule,
};
pub use item::{ContentKind, Item, ItemList};
pub use lifecycle::{Modal, ModalPhase};
pub use loader::{
    ContentLoader, ImmediateLoader, LoadError, LoadKind, LoadRequest, LoadTicket, LoadedContent,
    NO_FETCH_LOADER, RecordingLoader,
};
pub use options::{
    Callbacks, Credentials, Dimension, FetchOptions, IframeOptions, ModalOptions, OptionsOverride,
    Theme,
};
pub use registry::{ModalId, Registry};
pub use resolver::{Classification, VideoService, classify};
pub use scroll_lock::ScrollLock;
