#![forbid(unsafe_code)]

//! Page scroll ownership.
//!
//! Overlays that hide the scrollbar acquire the lock under their [`ModalId`].
//! The first acquisition snapshots the page styles it is about to touch and
//! applies the lock; the last release restores the snapshot verbatim.
//!
//! # Invariants
//!
//! - The page is locked iff the owner set is non-empty.
//! - Acquiring twice under one owner, or releasing an owner that does not
//!   hold the lock, is a no-op.
//! - After the last release every touched style, class, attribute, and
//!   custom property equals its pre-lock value (absent values stay absent).
//! - Fixed page chrome ([`Document::fixed_elements`]) carries
//!   [`FIXED_COMPENSATED_ATTR`] while locked, only when the scrollbar has
//!   width. Stylesheets use it with [`SCROLLBAR_VAR`] to keep pinned headers
//!   from shifting.
//! - The scrollbar width is measured at most once per lock instance.

use ahash::AHashSet;
use lmodal_core::{Document, ElementId};

use super::registry::ModalId;

/// Class added to `html` and `body` while locked.
pub const LOCKED_CLASS: &str = "lm-scroll-locked";
/// Class added to `body` while locked.
pub const BODY_LOCKED_CLASS: &str = "lm-scroll-locked-body";
/// Custom property on `html` carrying the compensation width.
pub const SCROLLBAR_VAR: &str = "--lm-scrollbar-width";
/// Attribute tagging fixed elements that need scrollbar compensation.
pub const FIXED_COMPENSATED_ATTR: &str = "data-lm-fixed-compensated";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    body_overflow: Option<String>,
    body_padding_right: Option<String>,
    html_overflow: Option<String>,
    html_scrollbar_var: Option<String>,
    html_classes: Vec<String>,
    body_classes: Vec<String>,
    /// Tagged fixed elements and their prior attribute value.
    compensated: Vec<(ElementId, Option<String>)>,
}

#[derive(Debug, Default)]
pub struct ScrollLock {
    owners: AHashSet<ModalId>,
    snapshot: Option<Snapshot>,
    scrollbar_width: Option<f32>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        !self.owners.is_empty()
    }

    pub fn holders(&self) -> usize {
        self.owners.len()
    }

    pub fn is_held_by(&self, owner: ModalId) -> bool {
        self.owners.contains(&owner)
    }

    /// Cached scrollbar width, measuring on first use.
    pub fn scrollbar_width<D: Document + ?Sized>(&mut self, doc: &mut D) -> f32 {
        *self
            .scrollbar_width
            .get_or_insert_with(|| doc.scrollbar_width().max(0.0))
    }

    /// Take the lock for `owner`. Returns `true` when `owner` was added.
    pub fn acquire<D: Document + ?Sized>(&mut self, doc: &mut D, owner: ModalId) -> bool {
        if !self.owners.insert(owner) {
            return false;
        }
        if self.owners.len() == 1 {
            self.lock(doc);
        }
        tracing::debug!(owner = owner.id(), holders = self.owners.len(), "scroll_lock.acquire");
        true
    }

    /// Drop `owner`'s hold. Returns `true` when `owner` held the lock.
    pub fn release<D: Document + ?Sized>(&mut self, doc: &mut D, owner: ModalId) -> bool {
        if !self.owners.remove(&owner) {
            return false;
        }
        if self.owners.is_empty() {
            self.unlock(doc);
        }
        tracing::debug!(owner = owner.id(), holders = self.owners.len(), "scroll_lock.release");
        true
    }

    fn lock<D: Document + ?Sized>(&mut self, doc: &mut D) {
        let width = self.scrollbar_width(doc);
        let html = doc.root();
        let body = doc.body();
        self.snapshot = Some(Snapshot {
            body_overflow: doc.style(body, "overflow"),
            body_padding_right: doc.style(body, "padding-right"),
            html_overflow: doc.style(html, "overflow"),
            html_scrollbar_var: doc.style(html, SCROLLBAR_VAR),
            html_classes: doc.classes(html),
            body_classes: doc.classes(body),
            compensated: Vec::new(),
        });

        let px = format!("{width}px");
        doc.set_style(html, SCROLLBAR_VAR, Some(&px));
        doc.set_style(html, "overflow", Some("hidden"));
        doc.set_style(body, "overflow", Some("hidden"));
        if width > 0.0 {
            doc.set_style(body, "padding-right", Some(&px));
        }
        doc.add_class(html, LOCKED_CLASS);
        doc.add_class(body, LOCKED_CLASS);
        doc.add_class(body, BODY_LOCKED_CLASS);
        if width > 0.0 {
            self.compensate_fixed(doc);
        }
    }

    fn compensate_fixed<D: Document + ?Sized>(&mut self, doc: &mut D) {
        let Some(snapshot) = self.snapshot.as_mut() else {
            return;
        };
        for el in doc.fixed_elements() {
            snapshot
                .compensated
                .push((el, doc.attribute(el, FIXED_COMPENSATED_ATTR)));
            doc.set_attribute(el, FIXED_COMPENSATED_ATTR, "true");
        }
        tracing::trace!(count = snapshot.compensated.len(), "scroll_lock.fixed_compensated");
    }

    fn unlock<D: Document + ?Sized>(&mut self, doc: &mut D) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        let html = doc.root();
        let body = doc.body();
        doc.set_style(body, "overflow", snapshot.body_overflow.as_deref());
        doc.set_style(body, "padding-right", snapshot.body_padding_right.as_deref());
        doc.set_style(html, "overflow", snapshot.html_overflow.as_deref());
        doc.set_style(html, SCROLLBAR_VAR, snapshot.html_scrollbar_var.as_deref());
        doc.set_classes(html, &snapshot.html_classes);
        doc.set_classes(body, &snapshot.body_classes);
        for (el, prior) in snapshot.compensated {
            match prior {
                Some(value) => doc.set_attribute(el, FIXED_COMPENSATED_ATTR, &value),
                None => doc.remove_attribute(el, FIXED_COMPENSATED_ATTR),
            }
        }
    }
}
