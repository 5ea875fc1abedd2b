#![forbid(unsafe_code)]

//! Single-threaded runtime helpers for LightModal.
//!
//! Everything here runs on the host's UI thread. Time never advances on its
//! own: hosts inject a [`Clock`] and poll [`Timer`]s from their frame or
//! timer loop, which keeps the overlay deterministic under test.

pub mod announce;
pub mod clock;
pub mod reactive;
pub mod timer;

pub use announce::{Announcer, NullAnnouncer, TracingAnnouncer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use reactive::{Dispatcher, Handler, HandlerId, Keyed};
pub use timer::Timer;

pub use web_time::{Duration, Instant};
