#![forbid(unsafe_code)]

//! LightModal: a media overlay (lightbox) with galleries, drag-to-dismiss,
//! focus trapping, and scroll locking.
//!
//! This crate re-exports the workspace under one name. Most hosts only need
//! the [`prelude`]:
//!
//! ```
//! use lmodal::prelude::*;
//!
//! let mut ctx = ModalContext::new(MemoryDocument::new());
//! let id = ctx
//!     .open(
//!         vec![Item::new("a.jpg"), Item::new("b.jpg")],
//!         ModalOptions::default().start_index(1),
//!     )
//!     .expect("non-empty gallery");
//! assert_eq!(ctx.get_instance(Some(id)).map(|m| m.index()), Some(1));
//!
//! ctx.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)));
//! assert_eq!(
//!     ctx.get_instance(Some(id)).map(|m| m.phase()),
//!     Some(ModalPhase::Closing)
//! );
//! ```

pub use lmodal_core;
pub use lmodal_runtime;
pub use lmodal_widgets;

pub use lmodal_widgets::modal;

pub mod prelude {
    pub use lmodal_core::{
        Document, ElementId, Event, HitTarget, KeyCode, KeyEvent, MemoryDocument, Point,
        PointerEvent, PointerEventKind, PointerKind,
    };
    pub use lmodal_runtime::{
        Announcer, Clock, Duration, HandlerId, Instant, ManualClock, SystemClock,
    };
    pub use lmodal_widgets::modal::{
        ContentKind, ContentLoader, GestureConfig, Instance, Item, ItemList, LoadError,
        LoadRequest, LoadTicket, LoadedContent, ModalContext, ModalEvent, ModalEventKind, ModalId,
        ModalOptions, ModalPhase, OpenError, OptionsOverride,
    };
}
