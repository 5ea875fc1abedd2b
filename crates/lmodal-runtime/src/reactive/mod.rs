#![forbid(unsafe_code)]

//! Typed event dispatch.
//!
//! - [`Dispatcher`]: handlers registered per event kind, invoked in
//!   registration order.
//! - [`HandlerId`]: token returned by [`Dispatcher::on`] and accepted by
//!   [`Dispatcher::off`]. Closures have no identity, so removal goes through
//!   the id.
//! - [`Keyed`]: maps an event value to its payload-free kind.
//!
//! # Invariants
//!
//! 1. Handlers for the same kind run in insertion order.
//! 2. Removing a handler during dispatch does not affect the dispatch in
//!    progress; the handler is skipped from the next one on.
//! 3. Handler ids are never reused within a dispatcher.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, Handler, HandlerId, Keyed};
