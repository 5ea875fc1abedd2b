#![forbid(unsafe_code)]

//! Logical-pixel geometry used by pointer tracking.

use std::ops::Sub;

/// A position (or displacement) in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of this point treated as a displacement.
    #[inline]
    pub fn magnitude(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Component of this displacement along `axis`.
    #[inline]
    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Project this displacement onto `axis`, zeroing the other component.
    #[inline]
    pub fn project(self, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::new(self.x, 0.0),
            Axis::Vertical => Self::new(0.0, self.y),
        }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The axis with the larger absolute displacement.
    ///
    /// Ties go to [`Axis::Vertical`], the dismissal axis of the overlay.
    pub fn dominant(delta: Point) -> Self {
        if delta.x.abs() > delta.y.abs() {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtraction_is_displacement() {
        let d = Point::new(15.0, 40.0) - Point::new(10.0, 10.0);
        assert_eq!(d, Point::new(5.0, 30.0));
        assert_eq!(d.along(Axis::Vertical), 30.0);
        assert_eq!(d.project(Axis::Horizontal), Point::new(5.0, 0.0));
    }

    #[test]
    fn dominant_axis() {
        assert_eq!(Axis::dominant(Point::new(12.0, -3.0)), Axis::Horizontal);
        assert_eq!(Axis::dominant(Point::new(-2.0, -30.0)), Axis::Vertical);
        assert_eq!(Axis::dominant(Point::new(7.0, 7.0)), Axis::Vertical);
    }

    #[test]
    fn magnitude() {
        assert_eq!(Point::new(3.0, 4.0).magnitude(), 5.0);
        assert_eq!(Point::ORIGIN.magnitude(), 0.0);
    }
}
