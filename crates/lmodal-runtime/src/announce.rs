#![forbid(unsafe_code)]

//! Screen-reader announcement sinks.
//!
//! The overlay emits one-line status messages ("Modal opened"). Browser hosts
//! route them to an `aria-live` region; tests collect them.

use std::cell::RefCell;
use std::rc::Rc;

/// A one-line text sink for assistive technology.
pub trait Announcer {
    fn announce(&mut self, message: &str);
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnnouncer;

impl Announcer for NullAnnouncer {
    fn announce(&mut self, _message: &str) {}
}

/// Forwards messages to `tracing` at `info` under the `lmodal::a11y` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&mut self, message: &str) {
        tracing::info!(target: "lmodal::a11y", message);
    }
}

impl Announcer for Vec<String> {
    fn announce(&mut self, message: &str) {
        self.push(message.to_owned());
    }
}

impl<A: Announcer + ?Sized> Announcer for Rc<RefCell<A>> {
    fn announce(&mut self, message: &str) {
        self.borrow_mut().announce(message);
    }
}
