#![forbid(unsafe_code)]

//! Bounded navigation over an overlay's items.
//!
//! # Invariants
//!
//! - The item list is never empty and `index < len` always holds.
//! - Navigation never wraps: `next` on the last item and `prev` on the first
//!   are no-ops, as are jumps outside `0..len` and jumps to the current index.

use super::error::NavigationError;
use super::item::Item;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    items: Vec<Item>,
    index: usize,
}

impl Gallery {
    /// Returns `None` for an empty list. `start` is clamped to the last item.
    pub fn new(items: Vec<Item>, start: usize) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        let index = start.min(items.len() - 1);
        Some(Self { items, index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_multiple(&self) -> bool {
        self.items.len() > 1
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn current(&self) -> &Item {
        &self.items[self.index]
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.items.len()
    }

    /// Advance one item. Returns the new index, or `None` at the end.
    pub fn next(&mut self) -> Option<usize> {
        if self.is_last() {
            return None;
        }
        self.index += 1;
        Some(self.index)
    }

    /// Step back one item. Returns the new index, or `None` at the start.
    pub fn prev(&mut self) -> Option<usize> {
        if self.is_first() {
            return None;
        }
        self.index -= 1;
        Some(self.index)
    }

    /// Jump to `index`, ignoring out-of-range and same-index requests.
    pub fn go_to(&mut self, index: usize) -> Option<usize> {
        self.try_go_to(index).ok().flatten()
    }

    /// Checked jump. `Ok(None)` means the index was already current.
    pub fn try_go_to(&mut self, index: usize) -> Result<Option<usize>, NavigationError> {
        if index >= self.items.len() {
            return Err(NavigationError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        if index == self.index {
            return Ok(None);
        }
        self.index = index;
        Ok(Some(index))
    }
}
