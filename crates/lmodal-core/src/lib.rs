#![forbid(unsafe_code)]

//! Core primitives for LightModal: geometry, input events, and the document
//! surface an overlay mutates.
//!
//! Nothing in this crate knows about modals. Hosts translate their native
//! input (DOM events, winit, a test script) into [`event::Event`] values and
//! expose their page tree through [`document::Document`].

pub mod document;
pub mod event;
pub mod geometry;
pub mod logging;

pub use document::{Document, ElementId, MemoryDocument, Placement};
pub use event::{
    Event, HitTarget, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent, PointerEventKind,
    PointerKind,
};
pub use geometry::{Axis, Point};
