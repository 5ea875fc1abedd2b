#![forbid(unsafe_code)]

//! Closed-set event dispatcher.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// An event type with a payload-free discriminant.
pub trait Keyed {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Shared handler callback.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// Token identifying one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

struct Entry<E: Keyed> {
    id: HandlerId,
    kind: E::Kind,
    handler: Handler<E>,
}

/// Handlers keyed by event kind.
pub struct Dispatcher<E: Keyed> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E: Keyed> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Keyed> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.entries.iter().map(|e| (e.id, e.kind)).collect();
        f.debug_struct("Dispatcher")
            .field("handlers", &kinds)
            .finish()
    }
}

impl<E: Keyed> Dispatcher<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Register `handler` for events of `kind`.
    pub fn on(&mut self, kind: E::Kind, handler: impl Fn(&E) + 'static) -> HandlerId {
        self.on_shared(kind, Rc::new(handler))
    }

    /// Register an already shared handler.
    pub fn on_shared(&mut self, kind: E::Kind, handler: Handler<E>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind, handler });
        id
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn off(&mut self, id: HandlerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Number of handlers for `kind`.
    pub fn count(&self, kind: E::Kind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Invoke every handler registered for `event.kind()`. Returns how many ran.
    pub fn emit(&self, event: &E) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler<E>> = self
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| Rc::clone(&e.handler))
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        A(u32),
        B,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum PingKind {
        A,
        B,
    }

    impl Keyed for Ping {
        type Kind = PingKind;

        fn kind(&self) -> PingKind {
            match self {
                Self::A(_) => PingKind::A,
                Self::B => PingKind::B,
            }
        }
    }

    #[test]
    fn handlers_run_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = Dispatcher::<Ping>::new();
        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            d.on(PingKind::A, move |_| log.borrow_mut().push(tag));
        }
        assert_eq!(d.emit(&Ping::A(1)), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn only_matching_kind_runs() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut d = Dispatcher::<Ping>::new();
        let s = Rc::clone(&seen);
        d.on(PingKind::A, move |e| s.borrow_mut().push(e.clone()));

        assert_eq!(d.emit(&Ping::B), 0);
        assert_eq!(d.emit(&Ping::A(7)), 1);
        assert_eq!(*seen.borrow(), vec![Ping::A(7)]);
    }

    #[test]
    fn off_removes_once() {
        let mut d = Dispatcher::<Ping>::new();
        let id = d.on(PingKind::B, |_| {});
        assert_eq!(d.count(PingKind::B), 1);
        assert!(d.off(id));
        assert!(!d.off(id));
        assert!(d.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut d = Dispatcher::<Ping>::new();
        let a = d.on(PingKind::A, |_| {});
        d.off(a);
        let b = d.on(PingKind::A, |_| {});
        assert_ne!(a, b);
    }
}
