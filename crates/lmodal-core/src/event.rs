#![forbid(unsafe_code)]

//! Host-neutral input events.
//!
//! Hosts translate whatever they receive (DOM `keydown`/`pointermove`,
//! touch lists, synthetic test input) into [`Event`] values. Pointer events
//! carry a [`HitTarget`] that the host resolved against the overlay's
//! surfaces, so the modal never needs to hit-test itself.

use bitflags::bitflags;

use crate::geometry::Point;

/// An input event delivered to an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Pointer(PointerEvent),
}

impl From<KeyEvent> for Event {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<PointerEvent> for Event {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

bitflags! {
    /// Keyboard modifiers held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Logical key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    /// Shift+Tab as reported by hosts that fold the modifier into the key.
    BackTab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Char(char),
    F(u8),
}

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set the held modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Press or auto-repeat.
    #[inline]
    pub fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Whether this is a backward tab (Shift+Tab or BackTab).
    #[inline]
    pub fn is_back_tab(&self) -> bool {
        self.code == KeyCode::BackTab
            || (self.code == KeyCode::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }

    /// Whether this is any tab key.
    #[inline]
    pub fn is_tab(&self) -> bool {
        matches!(self.code, KeyCode::Tab | KeyCode::BackTab)
    }
}

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// `touchcancel` / `pointercancel`.
    Cancel,
    /// The pointer left the tracking surface.
    Leave,
}

/// What a pointer event landed on, resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitTarget {
    /// The dimmed area behind the content.
    Backdrop,
    /// A non-interactive part of the content surface.
    #[default]
    Content,
    /// A button, link, form control, or embedded frame inside the content.
    Interactive,
    /// The overlay's own close button.
    CloseButton,
    /// Anywhere outside the overlay.
    Outside,
}

/// A pointer (mouse, touch, pen) event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pointer: PointerKind,
    pub position: Point,
    pub target: HitTarget,
}

impl PointerEvent {
    /// A mouse event on the content surface.
    pub const fn new(kind: PointerEventKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            pointer: PointerKind::Mouse,
            position: Point::new(x, y),
            target: HitTarget::Content,
        }
    }

    /// Set the hit target.
    #[must_use]
    pub const fn target(mut self, target: HitTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the pointer device.
    #[must_use]
    pub const fn pointer(mut self, pointer: PointerKind) -> Self {
        self.pointer = pointer;
        self
    }

    /// Release-like events end a gesture.
    #[inline]
    pub fn ends_gesture(&self) -> bool {
        matches!(
            self.kind,
            PointerEventKind::Up | PointerEventKind::Cancel | PointerEventKind::Leave
        )
    }
}
