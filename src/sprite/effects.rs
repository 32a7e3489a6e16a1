use super::animation::Animation;
use super::{Behavior, Sprite, Status};
use crate::engine::{Frame, Rect, Vec2};
use std::rc::Rc;

/// One shot animation centered on where something popped.
pub fn particle(center: Vec2, frames: Rc<[Frame]>, depth: i32, rate: f32) -> Sprite {
    let first = frames.first().copied().unwrap_or_default();
    Sprite::new(
        Rect::from_center(center, first.size()),
        first,
        depth,
        Behavior::Particle(Animation::new(frames, rate)),
    )
}

/// Small sky cloud drifting left until it leaves the world.
#[derive(Debug, Clone)]
pub struct Cloud {
    speed: f32,
}

impl Cloud {
    pub fn sprite(bottom_left: Vec2, frame: Frame, speed: f32, depth: i32) -> Sprite {
        let mut rect = Rect::from_position(Vec2::ZERO, frame.size());
        rect.set_bottom_left(bottom_left);
        Sprite::new(rect, frame, depth, Behavior::Cloud(Cloud { speed }))
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn update(&mut self, rect: &mut Rect, dt: f32) -> Status {
        rect.x -= self.speed * dt;
        if rect.right() <= 0.0 {
            Status::Dead
        } else {
            Status::Alive
        }
    }
}
