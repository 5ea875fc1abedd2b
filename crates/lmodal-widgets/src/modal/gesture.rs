#![forbid(unsafe_code)]

//! Drag-to-dismiss recognition.
//!
//! [`GestureEngine`] turns a pointer stream on the content surface into
//! feedback and a single dismiss/settle decision. It owns no page state; the
//! lifecycle applies the [`GestureOutcome`]s it returns.
//!
//! # Invariants
//!
//! - At most one gesture is tracked at a time; a press while a gesture is
//!   active is ignored.
//! - The axis is locked once, when the displacement first leaves the dead
//!   zone, and never changes for the rest of the gesture.
//! - Only displacement along the locked axis counts. Vertical drags dismiss
//!   downward only; horizontal drags dismiss in either direction.
//! - `Cancel` and `Leave` end a gesture exactly like `Up`.
//! - A gesture released before it started dragging ends as
//!   [`GestureOutcome::Discarded`] with no feedback ever emitted.

use lmodal_core::{Axis, HitTarget, Point, PointerEvent, PointerEventKind};
use lmodal_runtime::{Duration, Instant};

/// Alternate dismiss trigger: a fast flick over a short distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityRule {
    /// Pixels per millisecond that must be exceeded.
    pub min_velocity: f32,
    /// Displacement that must be exceeded together with the velocity.
    pub min_distance: f32,
}

impl Default for VelocityRule {
    fn default() -> Self {
        Self {
            min_velocity: 0.3,
            min_distance: 20.0,
        }
    }
}

/// Tunable thresholds for drag-to-dismiss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Displacement that must be exceeded before an axis locks.
    pub dead_zone: f32,
    /// Displacement at which feedback reaches full progress.
    pub progress_distance: f32,
    /// Displacement (inclusive) that dismisses on release.
    pub dismiss_distance: f32,
    /// Optional flick rule for vertical drags.
    pub velocity: Option<VelocityRule>,
    /// Duration of the return-to-rest animation.
    pub return_duration: Duration,
    /// Content opacity lost at full progress.
    pub content_fade: f32,
    /// Backdrop opacity lost at full progress.
    pub backdrop_fade: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dead_zone: 10.0,
            progress_distance: 200.0,
            dismiss_distance: 100.0,
            velocity: None,
            return_duration: Duration::from_millis(200),
            content_fade: 0.3,
            backdrop_fade: 0.5,
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub fn dismiss_distance(mut self, distance: f32) -> Self {
        self.dismiss_distance = distance;
        self
    }

    #[must_use]
    pub fn dead_zone(mut self, distance: f32) -> Self {
        self.dead_zone = distance;
        self
    }

    #[must_use]
    pub fn velocity(mut self, rule: Option<VelocityRule>) -> Self {
        self.velocity = rule;
        self
    }
}

/// Where the engine is in the current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Armed {
        origin: Point,
        started: Instant,
    },
    Dragging {
        origin: Point,
        started: Instant,
        axis: Axis,
        current: Point,
    },
}

/// Visual state proportional to drag progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub axis: Axis,
    /// Translation to apply to the content.
    pub offset: Point,
    /// `min(|displacement| / progress_distance, 1)`.
    pub progress: f32,
    pub content_opacity: f32,
    pub backdrop_opacity: f32,
}

/// What the caller should do after feeding an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Nothing changed.
    Ignored,
    /// A gesture started tracking.
    Armed,
    /// Apply this feedback.
    Feedback(DragFeedback),
    /// Release crossed a threshold: close the overlay.
    Dismiss {
        axis: Axis,
        distance: f32,
        velocity: f32,
    },
    /// Release fell short: animate back to rest and clear feedback.
    Settle,
    /// Released before dragging: no side effects.
    Discarded,
}

/// Drag-to-dismiss state machine for one overlay.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    config: GestureConfig,
    phase: GesturePhase,
}

impl GestureEngine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Idle,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Whether a gesture is being tracked.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, GesturePhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. })
    }

    /// Drop any tracked gesture without producing an outcome.
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> GestureOutcome {
        match event.kind {
            PointerEventKind::Down => self.press(event.position, event.target, now),
            PointerEventKind::Move => self.moved(event.position),
            _ if event.ends_gesture() => self.release(Some(event.position), now),
            _ => GestureOutcome::Ignored,
        }
    }

    /// Start tracking a press on plain content.
    pub fn press(&mut self, position: Point, target: HitTarget, now: Instant) -> GestureOutcome {
        if self.is_active() || target != HitTarget::Content {
            return GestureOutcome::Ignored;
        }
        self.phase = GesturePhase::Armed {
            origin: position,
            started: now,
        };
        tracing::trace!(x = position.x, y = position.y, "gesture.armed");
        GestureOutcome::Armed
    }

    pub fn moved(&mut self, position: Point) -> GestureOutcome {
        match self.phase {
            GesturePhase::Idle => GestureOutcome::Ignored,
            GesturePhase::Armed { origin, started } => {
                let delta = position - origin;
                if delta.magnitude() <= self.config.dead_zone {
                    return GestureOutcome::Ignored;
                }
                let axis = Axis::dominant(delta);
                tracing::trace!(?axis, "gesture.axis_locked");
                self.phase = GesturePhase::Dragging {
                    origin,
                    started,
                    axis,
                    current: position,
                };
                GestureOutcome::Feedback(self.feedback(axis, delta))
            }
            GesturePhase::Dragging {
                origin,
                started,
                axis,
                ..
            } => {
                self.phase = GesturePhase::Dragging {
                    origin,
                    started,
                    axis,
                    current: position,
                };
                GestureOutcome::Feedback(self.feedback(axis, position - origin))
            }
        }
    }

    /// End the gesture. `position` is the release point when known; the last
    /// tracked point is used otherwise.
    pub fn release(&mut self, position: Option<Point>, now: Instant) -> GestureOutcome {
        let phase = std::mem::replace(&mut self.phase, GesturePhase::Idle);
        match phase {
            GesturePhase::Idle => GestureOutcome::Ignored,
            GesturePhase::Armed { .. } => {
                tracing::trace!("gesture.discarded");
                GestureOutcome::Discarded
            }
            GesturePhase::Dragging {
                origin,
                started,
                axis,
                current,
            } => {
                let end = position.unwrap_or(current);
                let displacement = (end - origin).along(axis);
                let elapsed_ms = now
                    .saturating_duration_since(started)
                    .as_secs_f32()
                    .max(0.001)
                    * 1000.0;
                let distance = displacement.abs();
                let velocity = distance / elapsed_ms;
                if self.dismisses(axis, displacement, velocity) {
                    tracing::trace!(?axis, distance, velocity, "gesture.dismiss");
                    GestureOutcome::Dismiss {
                        axis,
                        distance,
                        velocity,
                    }
                } else {
                    tracing::trace!(?axis, distance, velocity, "gesture.settle");
                    GestureOutcome::Settle
                }
            }
        }
    }

    fn dismisses(&self, axis: Axis, displacement: f32, velocity: f32) -> bool {
        match axis {
            Axis::Vertical => {
                displacement >= self.config.dismiss_distance
                    || self.config.velocity.is_some_and(|rule| {
                        velocity > rule.min_velocity && displacement > rule.min_distance
                    })
            }
            Axis::Horizontal => displacement.abs() >= self.config.dismiss_distance,
        }
    }

    fn feedback(&self, axis: Axis, delta: Point) -> DragFeedback {
        let along = delta.along(axis);
        // Upward vertical drags never dismiss, so they show no progress.
        let effective = match axis {
            Axis::Vertical => along.max(0.0),
            Axis::Horizontal => along,
        };
        let progress = if self.config.progress_distance > 0.0 {
            (effective.abs() / self.config.progress_distance).min(1.0)
        } else {
            1.0
        };
        let offset = match axis {
            Axis::Vertical => Point::new(0.0, effective),
            Axis::Horizontal => Point::new(effective, 0.0),
        };
        DragFeedback {
            axis,
            offset,
            progress,
            content_opacity: 1.0 - progress * self.config.content_fade,
            backdrop_opacity: 1.0 - progress * self.config.backdrop_fade,
        }
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
