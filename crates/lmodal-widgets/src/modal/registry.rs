#![forbid(unsafe_code)]

//! Live overlay instances in z-order.
//!
//! The registry keeps instances bottom to top in opening order and tracks the
//! "current" instance: the one that receives input and answers the
//! argument-less `close()` / `get_instance()` calls. The pointer is a weak
//! reference by id; the registry, not the pointer, owns instances.
//!
//! # Invariants
//!
//! - Z-order is strictly increasing: later instances are always on top.
//! - An id appears at most once and is never reused.
//! - The current pointer, when set, names a registered instance.
//!
//! # Failure Modes
//!
//! - `remove()` / `get()` / `get_mut()` for an unknown id return `None`.

use std::sync::atomic::{AtomicU64, Ordering};

use super::lifecycle::{Modal, ModalPhase};

/// Base z-index for the overlay layer.
const BASE_MODAL_Z: u32 = 1000;

/// Z-index increment between overlays.
const Z_INCREMENT: u32 = 10;

/// Global counter for unique overlay ids.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an overlay instance for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Create a new unique id.
    pub(crate) fn new() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct Registry {
    modals: Vec<Modal>,
    current: Option<ModalId>,
    next_z: u32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            modals: Vec::new(),
            current: None,
            next_z: BASE_MODAL_Z,
        }
    }

    /// Reserve the next z-index.
    pub(crate) fn next_z_index(&mut self) -> u32 {
        let z = self.next_z;
        self.next_z = self.next_z.saturating_add(Z_INCREMENT);
        z
    }

    /// Register on top and make current.
    pub(crate) fn insert(&mut self, modal: Modal) {
        let id = modal.id();
        debug_assert!(!self.contains(id));
        self.modals.push(modal);
        self.current = Some(id);
    }

    /// Unregister. When `id` was current, the topmost remaining instance
    /// that is still open becomes current.
    pub(crate) fn remove(&mut self, id: ModalId) -> Option<Modal> {
        let pos = self.modals.iter().position(|m| m.id() == id)?;
        let modal = self.modals.remove(pos);
        if self.current == Some(id) {
            self.current = self
                .modals
                .iter()
                .rev()
                .find(|m| m.phase() == ModalPhase::Ready)
                .map(Modal::id);
        }
        if self.modals.is_empty() {
            self.next_z = BASE_MODAL_Z;
        }
        Some(modal)
    }

    pub fn get(&self, id: ModalId) -> Option<&Modal> {
        self.modals.iter().find(|m| m.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: ModalId) -> Option<&mut Modal> {
        self.modals.iter_mut().find(|m| m.id() == id)
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.modals.iter().any(|m| m.id() == id)
    }

    pub fn current(&self) -> Option<ModalId> {
        self.current
    }

    /// Ids bottom to top.
    pub fn ids(&self) -> Vec<ModalId> {
        self.modals.iter().map(Modal::id).collect()
    }

    /// Ids of instances in `phase`, bottom to top.
    pub fn ids_in(&self, phase: ModalPhase) -> Vec<ModalId> {
        self.modals
            .iter()
            .filter(|m| m.phase() == phase)
            .map(Modal::id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.modals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = ModalId::new();
        let b = ModalId::new();
        assert!(b.id() > a.id());
    }

    #[test]
    fn z_index_steps_by_increment() {
        let mut registry = Registry::new();
        assert_eq!(registry.next_z_index(), 1000);
        assert_eq!(registry.next_z_index(), 1010);
        assert_eq!(registry.next_z_index(), 1020);
        assert!(registry.is_empty());
        assert!(registry.remove(ModalId::new()).is_none());
        assert_eq!(registry.current(), None);
    }
}
