#![forbid(unsafe_code)]

//! Tab containment inside an overlay.
//!
//! A [`FocusTrap`] captures the container's focusable descendants once, when
//! installed, and wraps Tab / Shift+Tab at the ends of that list. Restoring
//! the focus that was active before the overlay opened is the lifecycle's
//! job, not the trap's.
//!
//! # Invariants
//!
//! - The focusable list is not recomputed after installation.
//! - [`FocusTrap::release`] is idempotent; a released trap handles nothing.

use lmodal_core::{Document, ElementId, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    container: ElementId,
    focusables: Vec<ElementId>,
    active: bool,
}

impl FocusTrap {
    /// Install on `container`, capturing its focusable descendants.
    pub fn install<D: Document + ?Sized>(doc: &D, container: ElementId) -> Self {
        let focusables = doc.focusable_descendants(container);
        tracing::trace!(container = %container, count = focusables.len(), "focus.trap");
        Self {
            container,
            focusables,
            active: true,
        }
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn focusables(&self) -> &[ElementId] {
        &self.focusables
    }

    pub fn first(&self) -> Option<ElementId> {
        self.focusables.first().copied()
    }

    pub fn last(&self) -> Option<ElementId> {
        self.focusables.last().copied()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle a key. Returns `true` when the key was consumed (its default
    /// tab movement must be suppressed).
    ///
    /// Tab on the last element wraps to the first and Shift+Tab on the first
    /// wraps to the last. Focus found outside the captured list is pulled
    /// back in. With nothing focusable inside, Tab is swallowed.
    pub fn handle_key<D: Document + ?Sized>(&self, doc: &mut D, key: &KeyEvent) -> bool {
        if !self.active || !key.is_press() || !key.is_tab() {
            return false;
        }
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return true;
        };
        let backward = key.is_back_tab();
        let current = doc.active_element();
        let inside = current.is_some_and(|el| self.focusables.contains(&el));
        let target = match (backward, inside) {
            (false, false) => first,
            (true, false) => last,
            (false, true) if current == Some(last) => first,
            (true, true) if current == Some(first) => last,
            _ => return false,
        };
        doc.focus(target);
        true
    }

    /// Stop intercepting. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.active {
            self.active = false;
            tracing::trace!(container = %self.container, "focus.release");
        }
    }
}
