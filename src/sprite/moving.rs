use super::animation::Animation;
use super::{Behavior, Sprite};
use crate::engine::{Frame, Rect, Vec2};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// A map object wider than it is tall travels horizontally.
    pub fn from_size(size: Vec2) -> Self {
        if size.x > size.y {
            Axis::X
        } else {
            Axis::Y
        }
    }

    pub fn unit(self) -> Vec2 {
        match self {
            Axis::X => Vec2::X,
            Axis::Y => Vec2::Y,
        }
    }

    pub fn component(self, value: Vec2) -> f32 {
        match self {
            Axis::X => value.x,
            Axis::Y => value.y,
        }
    }

    fn with_component(self, mut value: Vec2, component: f32) -> Vec2 {
        match self {
            Axis::X => value.x = component,
            Axis::Y => value.y = component,
        }
        value
    }
}

/// Platform (or saw) bouncing between two anchors. The anchors bound the
/// center of the sprite along its axis.
#[derive(Debug, Clone)]
pub struct MovingPlatform {
    animation: Animation,
    axis: Axis,
    start: f32,
    end: f32,
    direction: f32,
    speed: f32,
    flip: bool,
}

impl MovingPlatform {
    pub fn new(axis: Axis, start: Vec2, end: Vec2, speed: f32, flip: bool, animation: Animation) -> Self {
        let (a, b) = (axis.component(start), axis.component(end));
        MovingPlatform {
            animation,
            axis,
            start: a.min(b),
            end: a.max(b),
            direction: 1.0,
            speed: speed.abs(),
            flip,
        }
    }

    /// Sprite centered on the start anchor.
    #[allow(clippy::too_many_arguments)]
    pub fn sprite(
        start: Vec2,
        end: Vec2,
        frames: Rc<[Frame]>,
        axis: Axis,
        speed: f32,
        flip: bool,
        depth: i32,
        rate: f32,
    ) -> Sprite {
        let first = frames.first().copied().unwrap_or_default();
        let rect = Rect::from_center(start, first.size());
        let platform = MovingPlatform::new(axis, start, end, speed, flip, Animation::new(frames, rate));
        Sprite::new(rect, first, depth, Behavior::Platform(platform))
    }

    /// No speed or a zero length segment: the platform stays put.
    pub fn is_stationary(&self) -> bool {
        self.speed == 0.0 || self.end - self.start <= 0.0
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.start, self.end)
    }

    pub fn velocity(&self) -> Vec2 {
        if self.is_stationary() {
            Vec2::ZERO
        } else {
            self.axis.unit() * self.direction * self.speed
        }
    }

    pub fn update(&mut self, rect: &mut Rect, dt: f32) {
        self.animation.advance(dt);
        if self.is_stationary() {
            return;
        }

        let mut center = rect.center() + self.velocity() * dt;
        let along = self.axis.component(center);
        if self.direction > 0.0 && along >= self.end {
            center = self.axis.with_component(center, self.end);
            self.direction = -1.0;
        } else if self.direction < 0.0 && along <= self.start {
            center = self.axis.with_component(center, self.start);
            self.direction = 1.0;
        }
        rect.set_center(center);
    }

    /// Horizontal movers face their travel direction, vertical ones hang
    /// upside down on the way down.
    pub fn frame(&self) -> Frame {
        let frame = self.animation.frame();
        if !self.flip {
            return frame;
        }
        match self.axis {
            Axis::X => frame.flipped(self.direction < 0.0, false),
            Axis::Y => frame.flipped(false, self.direction > 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frames() -> Rc<[Frame]> {
        vec![Frame::new(Rect::new(0.0, 0.0, 64.0, 16.0))].into()
    }

    fn platform(start: Vec2, end: Vec2, speed: f32) -> (MovingPlatform, Rect) {
        let axis = Axis::from_size((end - start).abs() + Vec2::ONE);
        let rect = Rect::from_center(start, Vec2::new(64.0, 16.0));
        let platform = MovingPlatform::new(axis, start, end, speed, true, Animation::new(frames(), 5.0));
        (platform, rect)
    }

    #[test]
    fn stays_between_anchors_and_flips_only_there() {
        let (mut platform, mut rect) = platform(Vec2::new(100.0, 50.0), Vec2::new(300.0, 50.0), 170.0);
        let mut reversals = 0;
        for _ in 0..2000 {
            let before = platform.direction();
            platform.update(&mut rect, 1.0 / 60.0);
            let x = rect.center().x;
            assert!((100.0..=300.0).contains(&x), "center left the segment: {}", x);
            if platform.direction() != before {
                reversals += 1;
                let anchor = if before > 0.0 { 300.0 } else { 100.0 };
                assert_abs_diff_eq!(x, anchor);
            }
        }
        assert!(reversals > 10);
    }

    #[test]
    fn reversed_anchors_are_normalized() {
        let (mut platform, mut rect) = platform(Vec2::new(40.0, 400.0), Vec2::new(40.0, 100.0), 300.0);
        assert_eq!(platform.axis(), Axis::Y);
        assert_eq!(platform.bounds(), (100.0, 400.0));
        for _ in 0..600 {
            platform.update(&mut rect, 1.0 / 60.0);
            assert!((100.0..=400.0).contains(&rect.center().y));
        }
    }

    #[test]
    fn degenerate_segments_stay_put() {
        let (mut still, mut rect) = platform(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0), 200.0);
        let before = rect;
        still.update(&mut rect, 0.5);
        assert_eq!(rect, before);
        assert_eq!(still.velocity(), Vec2::ZERO);

        let (mut slow, mut rect) = platform(Vec2::new(0.0, 0.0), Vec2::new(90.0, 0.0), 0.0);
        slow.update(&mut rect, 0.5);
        assert_eq!(rect, before.translated(Vec2::new(-10.0, -10.0)));
    }

    #[test]
    fn flip_follows_direction() {
        let (mut platform, mut rect) = platform(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 100.0);
        assert!(!platform.frame().flip_x);
        platform.update(&mut rect, 0.2);
        assert_eq!(platform.direction(), -1.0);
        assert!(platform.frame().flip_x);
    }
}
