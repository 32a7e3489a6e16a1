pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Float rectangle in world pixels, origin top left, y grows downward.
///
/// Edge setters move the rectangle, they never resize it:
/// - `set_left(10.0)`   -> x = 10
/// - `set_right(10.0)`  -> x = 10 - width
/// - `set_bottom(10.0)` -> y = 10 - height
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_position(top_left: Vec2, size: Vec2) -> Self {
        Rect::new(top_left.x, top_left.y, size.x, size.y)
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Rect::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.width;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.height;
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.bottom())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    pub fn set_bottom_left(&mut self, bottom_left: Vec2) {
        self.x = bottom_left.x;
        self.set_bottom(bottom_left.y);
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.x += offset.x;
        self.y += offset.y;
    }

    pub fn translated(mut self, offset: Vec2) -> Self {
        self.translate(offset);
        self
    }

    /// Grows (or with negative amounts shrinks) around the center, like an
    /// inset when `dx`/`dy` are negative. Shrinking never goes below zero.
    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        let width = (self.width + dx).max(0.0);
        let height = (self.height + dy).max(0.0);
        Rect::from_center(self.center(), Vec2::new(width, height))
    }

    /// Strict overlap: rectangles that only share an edge do not intersect,
    /// and empty rectangles never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 || other.width <= 0.0 || other.height <= 0.0
        {
            return false;
        }
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn intersects_any<'a>(&self, others: impl IntoIterator<Item = &'a Rect>) -> bool {
        others.into_iter().any(|other| self.intersects(other))
    }

    /// `other` lies fully inside (edges may touch).
    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}
