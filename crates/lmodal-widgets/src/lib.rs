#![forbid(unsafe_code)]

//! Media overlay for LightModal.
//!
//! The [`modal`] module implements a lightbox: one overlay per open call,
//! showing an image, a video, an embedded player, a fetched document, or an
//! element relocated from the page, with gallery navigation, drag-to-dismiss,
//! focus trapping, and scroll locking.

pub mod modal;

pub use modal::{
    ContentKind, Instance, Item, ItemList, LoadError, LoadTicket, Modal, ModalContext,
    ModalEvent, ModalEventKind, ModalId, ModalOptions, ModalPhase, OptionsOverride,
};
