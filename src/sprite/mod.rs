// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                          sprite/ layout                                  │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ mod.rs            │ Sprite (rect + last rect + frame + depth), Behavior  │
// │ animation.rs      │ fractional frame cursor over a shared sequence       │
// │ moving.rs         │ platforms bouncing between two anchors               │
// │ enemies.rs        │ Tooth, SpikeBall, Shell, Pearl                       │
// │ item.rs           │ collectibles and their rewards                       │
// │ effects.rs        │ particles and sky clouds                             │
// │ state.rs          │ player state selection                               │
// │ player.rs         │ player physics, swept collision, damage              │
// └───────────────────┴──────────────────────────────────────────────────────┘
pub mod animation;
pub mod effects;
pub mod enemies;
pub mod item;
pub mod moving;
pub mod player;
pub mod state;

use crate::camera::DrawItem;
use crate::engine::{Effect, Frame, Rect, Tick, Vec2};
use animation::Animation;
use effects::Cloud;
use enemies::{Pearl, Shell, SpikeBall, Tooth};
use item::Item;
use moving::MovingPlatform;
use std::rc::Rc;

/// What a sprite does on every tick. Capabilities (mover, reflectable)
/// are answered by matching on this, never by probing for fields.
#[derive(Debug)]
pub enum Behavior {
    Static,
    Animated(Animation),
    Particle(Animation),
    Platform(MovingPlatform),
    Tooth(Tooth),
    SpikeBall(SpikeBall),
    Shell(Shell),
    Pearl(Pearl),
    Item(Item),
    Cloud(Cloud),
}

/// Read only view of the level handed to every sprite update.
pub struct Surroundings<'a> {
    pub tick: Tick,
    pub solids: &'a [Rect],
    /// Center of the player hitbox.
    pub target: Vec2,
    pub world_width: f32,
}

/// Requests a sprite cannot fulfil itself, applied by the level after
/// every sprite has been updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spawn {
    Pearl { center: Vec2, direction: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Alive,
    Dead,
}

#[derive(Debug)]
pub struct Sprite {
    pub rect: Rect,
    /// Rect as it was before this tick's update, used for swept collision.
    pub last_rect: Rect,
    pub depth: i32,
    frame: Frame,
    behavior: Behavior,
}

impl Sprite {
    pub fn new(rect: Rect, frame: Frame, depth: i32, behavior: Behavior) -> Self {
        Sprite {
            rect,
            last_rect: rect,
            depth,
            frame,
            behavior,
        }
    }

    /// Tile or decoration that never changes.
    pub fn fixed(top_left: Vec2, frame: Frame, depth: i32) -> Self {
        Sprite::new(
            Rect::from_position(top_left, frame.size()),
            frame,
            depth,
            Behavior::Static,
        )
    }

    /// Looping decoration.
    pub fn animated(top_left: Vec2, frames: Rc<[Frame]>, depth: i32, rate: f32) -> Self {
        let first = frames.first().copied().unwrap_or_default();
        Sprite::new(
            Rect::from_position(top_left, first.size()),
            first,
            depth,
            Behavior::Animated(Animation::new(frames, rate)),
        )
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    /// Displacement per second of sprites other things can ride on.
    pub fn velocity(&self) -> Option<Vec2> {
        match &self.behavior {
            Behavior::Platform(platform) => Some(platform.velocity()),
            _ => None,
        }
    }

    pub fn is_mover(&self) -> bool {
        self.velocity().is_some()
    }

    pub fn update(&mut self, env: &Surroundings, spawn: &mut dyn FnMut(Spawn)) -> Status {
        self.last_rect = self.rect;
        let dt = env.tick.dt;
        match &mut self.behavior {
            Behavior::Static => Status::Alive,
            Behavior::Animated(animation) => {
                animation.advance(dt);
                self.frame = animation.frame();
                Status::Alive
            }
            Behavior::Particle(animation) => {
                animation.advance(dt);
                if animation.is_finished() {
                    Status::Dead
                } else {
                    self.frame = animation.frame();
                    Status::Alive
                }
            }
            Behavior::Platform(platform) => {
                platform.update(&mut self.rect, dt);
                self.frame = platform.frame();
                Status::Alive
            }
            Behavior::Tooth(tooth) => {
                tooth.update(&mut self.rect, env);
                self.frame = tooth.frame();
                Status::Alive
            }
            Behavior::SpikeBall(spike) => {
                spike.update(&mut self.rect, dt);
                Status::Alive
            }
            Behavior::Shell(shell) => {
                shell.update(&self.rect, env, spawn);
                self.frame = shell.frame();
                Status::Alive
            }
            Behavior::Pearl(pearl) => pearl.update(&mut self.rect, env),
            Behavior::Item(item) => {
                item.update(dt);
                self.frame = item.frame();
                Status::Alive
            }
            Behavior::Cloud(cloud) => cloud.update(&mut self.rect, dt),
        }
    }

    /// Turns a tooth or a pearl away from `x`. Returns whether it changed
    /// course, anything else ignores the request.
    pub fn face_away_from(&mut self, x: f32) -> bool {
        let own_x = self.rect.center().x;
        match &mut self.behavior {
            Behavior::Tooth(tooth) => {
                let turned = tooth.face_away_from(x, own_x);
                self.frame = tooth.frame();
                turned
            }
            Behavior::Pearl(pearl) => pearl.face_away_from(x, own_x),
            _ => false,
        }
    }

    pub fn draw_item(&self) -> DrawItem {
        DrawItem {
            position: self.rect.top_left(),
            frame: self.frame,
            effect: Effect::None,
            depth: self.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moving::Axis;

    fn env(solids: &[Rect]) -> Surroundings<'_> {
        Surroundings {
            tick: Tick::new(0.1, 100.0),
            solids,
            target: Vec2::ZERO,
            world_width: 1000.0,
        }
    }

    #[test]
    fn update_keeps_the_previous_rect() {
        let frames: Rc<[Frame]> = vec![Frame::new(Rect::new(0.0, 0.0, 32.0, 8.0))].into();
        let mut sprite = MovingPlatform::sprite(
            Vec2::new(0.0, 0.0),
            Vec2::new(500.0, 0.0),
            frames,
            Axis::X,
            100.0,
            false,
            5,
            5.0,
        );
        let before = sprite.rect;
        let status = sprite.update(&env(&[]), &mut |_| {});
        assert_eq!(status, Status::Alive);
        assert_eq!(sprite.last_rect, before);
        assert_eq!(sprite.rect, before.translated(Vec2::new(10.0, 0.0)));
        assert_eq!(sprite.velocity(), Some(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn only_platforms_are_movers() {
        let tile = Sprite::fixed(Vec2::ZERO, Frame::default(), 2);
        assert!(!tile.is_mover());
        let pearl = Pearl::sprite(Vec2::ZERO, Frame::default(), 1.0, 150.0, 5);
        assert!(!pearl.is_mover());
    }

    #[test]
    fn statics_ignore_reflection() {
        let mut tile = Sprite::fixed(Vec2::ZERO, Frame::default(), 2);
        assert!(!tile.face_away_from(100.0));
    }
}
