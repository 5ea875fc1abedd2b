#![forbid(unsafe_code)]

//! Relocation of page elements into an overlay.
//!
//! [`InlineSnapshot::relocate`] moves (never clones) an element into the
//! content area and remembers where it came from. Consuming the snapshot with
//! [`InlineSnapshot::restore`] puts it back, so each relocation is undone at
//! most once.
//!
//! Stacked overlays may show the same element. [`InlineLedger`] keeps the
//! snapshot taken by the first overlay and a stack of holders: the topmost
//! holder displays the element, a release hands it to the holder below, and
//! only the last release restores the page.

use ahash::AHashMap;
use lmodal_core::{Document, ElementId, Placement};

use super::registry::ModalId;

/// Class carried by a relocated element while it is shown in an overlay.
pub(crate) const RELOCATED_CLASS: &str = "lm-inline-active";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineSnapshot {
    element: ElementId,
    placement: Option<Placement>,
    classes: Vec<String>,
    display: Option<String>,
    visibility: Option<String>,
    hidden: Option<String>,
}

impl InlineSnapshot {
    /// Record `element`'s position and presentation, then move it into
    /// `target` and make it visible.
    pub(crate) fn relocate<D: Document + ?Sized>(
        doc: &mut D,
        element: ElementId,
        target: ElementId,
    ) -> Self {
        let snapshot = Self {
            element,
            placement: doc.placement(element),
            classes: doc.classes(element),
            display: doc.style(element, "display"),
            visibility: doc.style(element, "visibility"),
            hidden: doc.attribute(element, "hidden"),
        };
        doc.append_child(target, element);
        doc.remove_attribute(element, "hidden");
        doc.set_style(element, "display", Some("block"));
        doc.set_style(element, "visibility", Some("visible"));
        doc.add_class(element, RELOCATED_CLASS);
        snapshot
    }

    #[cfg(test)]
    pub(crate) fn element(&self) -> ElementId {
        self.element
    }

    /// Put the element back where it was with its original presentation.
    ///
    /// The original next sibling anchors the position when it is still under
    /// the same parent; otherwise the recorded index is used.
    pub(crate) fn restore<D: Document + ?Sized>(self, doc: &mut D) {
        let el = self.element;
        match self.placement {
            Some(Placement {
                parent,
                index,
                next_sibling,
            }) => {
                doc.detach(el);
                let siblings = doc.children(parent);
                let at = next_sibling
                    .and_then(|next| siblings.iter().position(|&c| c == next))
                    .unwrap_or_else(|| index.min(siblings.len()));
                doc.insert_child(parent, at, el);
            }
            None => doc.detach(el),
        }
        doc.set_classes(el, &self.classes);
        doc.set_style(el, "display", self.display.as_deref());
        doc.set_style(el, "visibility", self.visibility.as_deref());
        match self.hidden.as_deref() {
            Some(value) => doc.set_attribute(el, "hidden", value),
            None => doc.remove_attribute(el, "hidden"),
        }
    }
}

#[derive(Debug)]
struct Relocation {
    snapshot: InlineSnapshot,
    /// `(owner, content area)`, bottom to top.
    holders: Vec<(ModalId, ElementId)>,
}

/// Page elements currently relocated into overlays of one context.
#[derive(Debug, Default)]
pub(crate) struct InlineLedger {
    relocations: AHashMap<ElementId, Relocation>,
}

impl InlineLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of elements away from their page position.
    pub(crate) fn len(&self) -> usize {
        self.relocations.len()
    }

    #[cfg(test)]
    pub(crate) fn holders(&self, element: ElementId) -> usize {
        self.relocations.get(&element).map_or(0, |r| r.holders.len())
    }

    /// Show `element` in `owner`'s `content` area.
    ///
    /// The first holder snapshots the page position. Later holders take the
    /// element over without touching that snapshot.
    pub(crate) fn acquire<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        element: ElementId,
        owner: ModalId,
        content: ElementId,
    ) {
        match self.relocations.get_mut(&element) {
            Some(relocation) => {
                relocation.holders.retain(|&(id, _)| id != owner);
                relocation.holders.push((owner, content));
                doc.append_child(content, element);
                tracing::debug!(
                    modal = owner.id(),
                    holders = relocation.holders.len(),
                    "modal.inline_shared"
                );
            }
            None => {
                let snapshot = InlineSnapshot::relocate(doc, element, content);
                self.relocations.insert(
                    element,
                    Relocation {
                        snapshot,
                        holders: vec![(owner, content)],
                    },
                );
            }
        }
    }

    /// Drop `owner`'s hold on `element`. Returns `true` when the element went
    /// back to the page.
    pub(crate) fn release<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        element: ElementId,
        owner: ModalId,
    ) -> bool {
        let Some(relocation) = self.relocations.get_mut(&element) else {
            return false;
        };
        let was_top = relocation.holders.last().is_some_and(|&(id, _)| id == owner);
        relocation.holders.retain(|&(id, _)| id != owner);
        match relocation.holders.last() {
            Some(&(_, content)) => {
                if was_top {
                    doc.append_child(content, element);
                }
                false
            }
            None => {
                if let Some(relocation) = self.relocations.remove(&element) {
                    relocation.snapshot.restore(doc);
                }
                true
            }
        }
    }
}
