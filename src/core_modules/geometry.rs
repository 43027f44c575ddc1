// THEORY:
// The `geometry` module holds the small value types every other stage shares.
// They are "dumb" data containers: a point in viewport space, the viewport
// rectangle itself, and the integer identity of a region. None of them knows
// anything about sites or sampling.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The stable identity of a site and of the region it owns.
pub type RegionIndex = usize;
pub type Coordinate = f64;

/// A point in viewport space. Queries may lie anywhere, including outside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl Point {
    pub fn new(x: Coordinate, y: Coordinate) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance. Ordering by it is the same as ordering by distance.
    pub fn distance_squared(&self, other: &Point) -> Coordinate {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(Coordinate, Coordinate)> for Point {
    fn from((x, y): (Coordinate, Coordinate)) -> Self {
        Self { x, y }
    }
}

/// The drawable area, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Viewport {
    pub width: Coordinate,
    pub height: Coordinate,
}

impl Viewport {
    pub fn new(width: Coordinate, height: Coordinate) -> Self {
        Self { width, height }
    }

    /// Half-open containment: `[0, width) x [0, height)`.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.height
    }
}
