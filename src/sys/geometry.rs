use serde::{Deserialize, Serialize};

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

/// An axis-aligned rectangle in device pixels, in the host's top/left
/// convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self { top, left, width, height }
    }

    pub fn right(&self) -> i32 { self.left + self.width }

    pub fn bottom(&self) -> i32 { self.top + self.height }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.left, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    /// Inclusive on every edge, so a point on the border of two adjacent
    /// rectangles is contained by both.
    pub fn contains(&self, point: Point) -> bool {
        (self.top..=self.bottom()).contains(&point.y)
            && (self.left..=self.right()).contains(&point.x)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

pub trait SameAs {
    fn same_as(&self, other: Self) -> bool;
}

impl SameAs for Rect {
    fn same_as(&self, other: Self) -> bool {
        self.top == other.top
            && self.left == other.left
            && self.width == other.width
            && self.height == other.height
    }
}
