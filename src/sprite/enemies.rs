use super::animation::Animation;
use super::{Behavior, Spawn, Sprite, Status, Surroundings};
use crate::engine::sheet::mirrored;
use crate::engine::{Frame, Rect, Timer, Vec2};
use crate::settings::EnemySettings;
use std::rc::Rc;

/// Walks back and forth on a floor, turning at ledges and walls.
#[derive(Debug, Clone)]
pub struct Tooth {
    animation: Animation,
    direction: f32,
    speed: f32,
}

impl Tooth {
    pub fn new(animation: Animation, direction: f32, speed: f32) -> Self {
        Tooth {
            animation,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            speed,
        }
    }

    pub fn sprite(top_left: Vec2, frames: Rc<[Frame]>, direction: f32, speed: f32, depth: i32, rate: f32) -> Sprite {
        let first = frames.first().copied().unwrap_or_default();
        let tooth = Tooth::new(Animation::new(frames, rate), direction, speed);
        Sprite::new(
            Rect::from_position(top_left, first.size()),
            tooth.frame(),
            depth,
            Behavior::Tooth(tooth),
        )
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn update(&mut self, rect: &mut Rect, env: &Surroundings) {
        self.animation.advance(env.tick.dt);
        rect.x += self.direction * self.speed * env.tick.dt;

        // 1px slivers under the leading corners, and a line across the top
        let floor_right = Rect::new(rect.right(), rect.bottom(), 1.0, 1.0);
        let floor_left = Rect::new(rect.left() - 1.0, rect.bottom(), 1.0, 1.0);
        let wall = Rect::new(rect.left() - 1.0, rect.top(), rect.width + 2.0, 1.0);

        let ledge_ahead = if self.direction > 0.0 {
            !floor_right.intersects_any(env.solids)
        } else {
            !floor_left.intersects_any(env.solids)
        };
        if ledge_ahead || wall.intersects_any(env.solids) {
            self.direction = -self.direction;
        }
    }

    /// Sends the tooth away from `from_x`, returns whether it turned.
    pub fn face_away_from(&mut self, from_x: f32, own_x: f32) -> bool {
        let direction = if own_x < from_x { -1.0 } else { 1.0 };
        let turned = direction != self.direction;
        self.direction = direction;
        turned
    }

    pub fn frame(&self) -> Frame {
        self.animation.frame().flipped(self.direction < 0.0, false)
    }
}

/// Hazard orbiting a fixed center. Angles are in degrees.
#[derive(Debug, Clone)]
pub struct SpikeBall {
    center: Vec2,
    radius: f32,
    speed: f32,
    start_angle: f32,
    // None for a full, unbounded rotation
    end_angle: Option<f32>,
    angle: f32,
    direction: f32,
}

impl SpikeBall {
    /// End angle written in the map for "keep spinning".
    pub const FULL_ROTATION: f32 = -1.0;

    pub fn new(center: Vec2, radius: f32, speed: f32, start_angle: f32, end_angle: f32) -> Self {
        let end_angle = if end_angle == Self::FULL_ROTATION {
            None
        } else {
            Some(end_angle.max(start_angle))
        };
        SpikeBall {
            center,
            radius: radius.max(0.0),
            speed,
            start_angle,
            end_angle,
            angle: start_angle,
            direction: 1.0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn sprite(
        center: Vec2,
        frame: Frame,
        radius: f32,
        speed: f32,
        start_angle: f32,
        end_angle: f32,
        depth: i32,
    ) -> Sprite {
        let spike = SpikeBall::new(center, radius, speed, start_angle, end_angle);
        let rect = Rect::from_center(spike.position(), frame.size());
        Sprite::new(rect, frame, depth, Behavior::SpikeBall(spike))
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn position(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        self.center + Vec2::new(radians.cos(), radians.sin()) * self.radius
    }

    pub fn update(&mut self, rect: &mut Rect, dt: f32) {
        self.angle += self.direction * self.speed * dt;
        match self.end_angle {
            None => self.angle = self.angle.rem_euclid(360.0),
            Some(end_angle) => {
                if self.direction > 0.0 && self.angle >= end_angle {
                    self.angle = end_angle;
                    self.direction = -1.0;
                } else if self.direction < 0.0 && self.angle <= self.start_angle {
                    self.angle = self.start_angle;
                    self.direction = 1.0;
                }
            }
        }
        rect.set_center(self.position());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    Fire,
}

/// Stationary turret spitting pearls at a target in front of it.
#[derive(Debug)]
pub struct Shell {
    idle: Rc<[Frame]>,
    fire: Rc<[Frame]>,
    animation: Animation,
    state: ShellState,
    facing_left: bool,
    cooldown: Timer,
    has_fired: bool,
    tuning: EnemySettings,
}

impl Shell {
    /// A left facing shell mirrors its frames once, up front.
    pub fn new(idle: Rc<[Frame]>, fire: Rc<[Frame]>, facing_left: bool, tuning: EnemySettings, rate: f32) -> Self {
        let (idle, fire) = if facing_left {
            (mirrored(&idle, true, false), mirrored(&fire, true, false))
        } else {
            (idle, fire)
        };
        Shell {
            animation: Animation::new(Rc::clone(&idle), rate),
            idle,
            fire,
            state: ShellState::Idle,
            facing_left,
            cooldown: Timer::new(tuning.shell_cooldown_ms),
            has_fired: false,
            tuning,
        }
    }

    pub fn sprite(
        top_left: Vec2,
        idle: Rc<[Frame]>,
        fire: Rc<[Frame]>,
        facing_left: bool,
        tuning: EnemySettings,
        depth: i32,
        rate: f32,
    ) -> Sprite {
        let shell = Shell::new(idle, fire, facing_left, tuning, rate);
        let first = shell.frame();
        Sprite::new(
            Rect::from_position(top_left, first.size()),
            first,
            depth,
            Behavior::Shell(shell),
        )
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn direction(&self) -> f32 {
        if self.facing_left {
            -1.0
        } else {
            1.0
        }
    }

    /// Close enough, level with the shell and in front of it.
    pub fn sees(&self, center: Vec2, target: Vec2) -> bool {
        let near = center.distance(target) < self.tuning.shell_range;
        let level = (center.y - target.y).abs() < self.tuning.shell_band;
        let in_front = if self.facing_left {
            target.x < center.x
        } else {
            target.x > center.x
        };
        near && level && in_front
    }

    pub fn update(&mut self, rect: &Rect, env: &Surroundings, spawn: &mut dyn FnMut(Spawn)) {
        let now = env.tick.now;
        self.cooldown.update(now);

        let center = rect.center();
        if !self.cooldown.is_active() && self.sees(center, env.target) {
            self.state = ShellState::Fire;
            self.animation.set_frames(Rc::clone(&self.fire));
            self.animation.reset();
            self.has_fired = false;
            self.cooldown.start(now);
        }

        self.animation.advance(env.tick.dt);
        if !self.animation.is_finished() {
            if self.state == ShellState::Fire
                && self.animation.index() == self.tuning.shell_fire_frame
                && !self.has_fired
            {
                let direction = self.direction();
                spawn(Spawn::Pearl {
                    center: center + Vec2::new(self.tuning.pearl_offset * direction, 0.0),
                    direction,
                });
                self.has_fired = true;
            }
        } else {
            self.animation.reset();
            if self.state == ShellState::Fire {
                self.state = ShellState::Idle;
                self.animation.set_frames(Rc::clone(&self.idle));
                self.has_fired = false;
            }
        }
    }

    pub fn frame(&self) -> Frame {
        self.animation.frame()
    }
}

/// Projectile flying in a straight line.
#[derive(Debug, Clone)]
pub struct Pearl {
    direction: f32,
    speed: f32,
}

impl Pearl {
    pub fn new(direction: f32, speed: f32) -> Self {
        Pearl {
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            speed,
        }
    }

    pub fn sprite(center: Vec2, frame: Frame, direction: f32, speed: f32, depth: i32) -> Sprite {
        Sprite::new(
            Rect::from_center(center, frame.size()),
            frame,
            depth,
            Behavior::Pearl(Pearl::new(direction, speed)),
        )
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.direction * self.speed, 0.0)
    }

    pub fn update(&mut self, rect: &mut Rect, env: &Surroundings) -> Status {
        rect.translate(self.velocity() * env.tick.dt);
        if rect.right() < 0.0 || rect.left() > env.world_width {
            Status::Dead
        } else {
            Status::Alive
        }
    }

    pub fn face_away_from(&mut self, from_x: f32, own_x: f32) -> bool {
        let direction = if own_x < from_x { -1.0 } else { 1.0 };
        let turned = direction != self.direction;
        self.direction = direction;
        turned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Tick;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    fn frames(count: usize) -> Rc<[Frame]> {
        (0..count)
            .map(|i| Frame::new(Rect::new(i as f32 * 40.0, 0.0, 40.0, 40.0)))
            .collect()
    }

    fn env(tick: Tick, solids: &[Rect], target: Vec2) -> Surroundings<'_> {
        Surroundings {
            tick,
            solids,
            target,
            world_width: 2000.0,
        }
    }

    #[test]
    fn tooth_turns_at_both_ledges() {
        let ground = [Rect::new(0.0, 100.0, 200.0, 64.0)];
        let mut tooth = Tooth::new(Animation::new(frames(2), 5.0), 1.0, 200.0);
        let mut rect = Rect::new(100.0, 60.0, 40.0, 40.0);
        let mut tick = Tick::new(DT, 0.0);
        let mut turns = 0;
        for _ in 0..600 {
            tick = tick.next();
            let before = tooth.direction();
            tooth.update(&mut rect, &env(tick, &ground, Vec2::ZERO));
            if tooth.direction() != before {
                turns += 1;
            }
            assert!(rect.right() <= 200.0 + 200.0 * DT + 0.01);
            assert!(rect.left() >= -200.0 * DT - 0.01);
        }
        assert!(turns >= 4);
    }

    #[test]
    fn tooth_turns_at_walls() {
        let solids = [
            Rect::new(0.0, 100.0, 1000.0, 64.0),
            Rect::new(300.0, 0.0, 64.0, 100.0),
        ];
        let mut tooth = Tooth::new(Animation::new(frames(2), 5.0), 1.0, 200.0);
        let mut rect = Rect::new(200.0, 60.0, 40.0, 40.0);
        let mut tick = Tick::new(DT, 0.0);
        for _ in 0..120 {
            tick = tick.next();
            tooth.update(&mut rect, &env(tick, &solids, Vec2::ZERO));
            assert!(rect.right() <= 300.0 + 200.0 * DT);
        }
        assert!(rect.right() < 300.0);
    }

    #[test]
    fn tooth_faces_its_direction() {
        let mut tooth = Tooth::new(Animation::new(frames(2), 5.0), 1.0, 200.0);
        assert!(!tooth.frame().flip_x);
        assert!(tooth.face_away_from(500.0, 100.0));
        assert!(tooth.frame().flip_x);
        assert!(!tooth.face_away_from(500.0, 100.0));
    }

    #[test]
    fn spike_ball_stays_on_its_arc() {
        let mut spike = SpikeBall::new(Vec2::new(500.0, 500.0), 120.0, 100.0, 0.0, 90.0);
        let mut rect = Rect::from_center(spike.position(), Vec2::splat(32.0));
        let mut reversals = 0;
        for _ in 0..2000 {
            let before = spike.direction();
            spike.update(&mut rect, DT);
            assert!((0.0..=90.0).contains(&spike.angle()));
            if spike.direction() != before {
                reversals += 1;
                let bound = if before > 0.0 { 90.0 } else { 0.0 };
                assert_abs_diff_eq!(spike.angle(), bound);
            }
        }
        assert!(reversals >= 10);
        assert_abs_diff_eq!(rect.center().distance(Vec2::new(500.0, 500.0)), 120.0, epsilon = 0.01);
    }

    #[test]
    fn spike_ball_full_rotation_never_reverses() {
        let mut spike = SpikeBall::new(Vec2::ZERO, 50.0, 180.0, 0.0, SpikeBall::FULL_ROTATION);
        let mut rect = Rect::from_center(spike.position(), Vec2::splat(10.0));
        for _ in 0..1000 {
            spike.update(&mut rect, DT);
            assert_eq!(spike.direction(), 1.0);
        }
        assert!((0.0..360.0).contains(&spike.angle()));
    }

    #[test]
    fn spike_ball_with_zero_radius_stays_on_center() {
        let center = Vec2::new(64.0, 64.0);
        let mut spike = SpikeBall::new(center, 0.0, 90.0, 0.0, SpikeBall::FULL_ROTATION);
        let mut rect = Rect::from_center(center, Vec2::splat(10.0));
        for _ in 0..100 {
            spike.update(&mut rect, DT);
            assert_eq!(rect.center(), center);
        }
    }

    fn run_shell(shell: &mut Shell, rect: &Rect, target: Vec2, until_ms: f64) -> Vec<Spawn> {
        let mut spawned = Vec::new();
        let mut tick = Tick::new(DT, 0.0);
        while tick.now < until_ms {
            tick = tick.next();
            shell.update(rect, &env(tick, &[], target), &mut |spawn| spawned.push(spawn));
        }
        spawned
    }

    #[test]
    fn shell_fires_once_per_cooldown() {
        let tuning = EnemySettings::default();
        let mut shell = Shell::new(frames(2), frames(6), false, tuning, 5.0);
        let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
        let target = Vec2::new(450.0, rect.center().y);

        let spawned = run_shell(&mut shell, &rect, target, 2400.0);
        assert_eq!(spawned.len(), 1);
        let Spawn::Pearl { center, direction } = spawned[0];
        assert_eq!(center, Vec2::new(70.0, 20.0));
        assert_eq!(direction, 1.0);
        assert_eq!(shell.state(), ShellState::Idle);

        let mut shell = Shell::new(frames(2), frames(6), false, tuning, 5.0);
        assert_eq!(run_shell(&mut shell, &rect, target, 3500.0).len(), 2);
    }

    #[test]
    fn shell_ignores_targets_outside_its_cone() {
        let tuning = EnemySettings::default();
        let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
        for target in [
            Vec2::new(-450.0, 20.0),
            Vec2::new(450.0, 20.0 + 60.0),
            Vec2::new(600.0, 20.0),
        ] {
            let mut shell = Shell::new(frames(2), frames(6), false, tuning, 5.0);
            assert!(run_shell(&mut shell, &rect, target, 3000.0).is_empty());
            assert_eq!(shell.state(), ShellState::Idle);
        }
    }

    #[test]
    fn left_facing_shell_fires_left_with_mirrored_frames() {
        let tuning = EnemySettings::default();
        let source = frames(6);
        let mut shell = Shell::new(frames(2), Rc::clone(&source), true, tuning, 5.0);
        assert!(shell.frame().flip_x);
        assert!(!source[0].flip_x);

        let rect = Rect::new(1000.0, 0.0, 40.0, 40.0);
        let spawned = run_shell(&mut shell, &rect, Vec2::new(700.0, 20.0), 1000.0);
        let Spawn::Pearl { center, direction } = spawned[0];
        assert_eq!(direction, -1.0);
        assert_eq!(center, Vec2::new(970.0, 20.0));
    }

    #[test]
    fn pearl_dies_outside_the_world() {
        let mut pearl = Pearl::new(-1.0, 150.0);
        let mut rect = Rect::new(10.0, 0.0, 8.0, 8.0);
        let mut tick = Tick::new(DT, 0.0);
        let mut status = Status::Alive;
        let mut steps = 0;
        while status == Status::Alive {
            tick = tick.next();
            status = pearl.update(&mut rect, &env(tick, &[], Vec2::ZERO));
            steps += 1;
        }
        assert!(rect.right() < 0.0);
        assert!(steps < 20);
    }
}
