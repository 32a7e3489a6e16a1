use super::state::{next_state, Contacts, PlayerState};
use crate::camera::DrawItem;
use crate::data::GameData;
use crate::engine::audio::{Sound, SoundSink};
use crate::engine::{Effect, Frame, FrameStore, Rect, Tick, Timer, Vec2};
use crate::settings::{PlayerSettings, Settings};
use crate::world::{Collider, SpriteHandle};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::rc::Rc;

/// Level controls, already mapped from keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
}

/// What the player can bump into this tick.
#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    pub solid: Vec<Collider>,
    pub semi_solid: Vec<Collider>,
}

impl Obstacles {
    fn find(&self, handle: SpriteHandle) -> Option<&Collider> {
        self.solid
            .iter()
            .chain(self.semi_solid.iter())
            .find(|collider| collider.handle == handle)
    }
}

/// One frame sequence per player state, keyed `player/<state>` in the sheet.
#[derive(Debug, Clone)]
pub struct PlayerFrames {
    sequences: HashMap<PlayerState, Rc<[Frame]>>,
}

impl PlayerFrames {
    pub fn load(store: &FrameStore) -> Result<Self> {
        let sequences = PlayerState::ALL
            .iter()
            .map(|state| {
                store
                    .sequence(&format!("player/{}", state.name()))
                    .map(|frames| (*state, frames))
            })
            .collect::<Result<HashMap<_, _>>>()
            .context("Player animations are incomplete")?;
        Ok(PlayerFrames { sequences })
    }

    /// Same frames for every state.
    pub fn uniform(frames: Rc<[Frame]>) -> Self {
        PlayerFrames {
            sequences: PlayerState::ALL
                .iter()
                .map(|state| (*state, Rc::clone(&frames)))
                .collect(),
        }
    }

    // both constructors fill every state
    fn get(&self, state: PlayerState) -> &[Frame] {
        &self.sequences[&state]
    }
}

#[derive(Debug)]
struct PlayerTimers {
    // horizontal input ignored after a wall jump
    wall_jump: Timer,
    // no wall slide/jump right after leaving the ground
    wall_jump_block: Timer,
    platform_skip: Timer,
    attack: Timer,
    hit: Timer,
}

impl PlayerTimers {
    fn new(settings: &PlayerSettings) -> Self {
        PlayerTimers {
            wall_jump: Timer::new(settings.wall_jump_ms),
            wall_jump_block: Timer::new(settings.wall_jump_block_ms),
            platform_skip: Timer::new(settings.platform_skip_ms),
            attack: Timer::new(settings.attack_ms),
            hit: Timer::new(settings.hit_ms),
        }
    }

    fn update(&mut self, now: f64) {
        for timer in [
            &mut self.wall_jump,
            &mut self.wall_jump_block,
            &mut self.platform_skip,
            &mut self.attack,
            &mut self.hit,
        ] {
            timer.update(now);
        }
    }
}

#[derive(Clone, Copy)]
enum Sweep {
    Horizontal,
    Vertical,
}

/// TABLE:
/// ┌──────────────────────── Player::update ────────────────────────────────┐
/// │  1. last_rect = hitbox                                                 │
/// │  2. timers                                                             │
/// │  3. input       → direction, platform skip, attack, jump request       │
/// │  4. x += dir.x * speed * dt          → sweep against solids            │
/// │  5. wall slide (gravity / 10) or half step gravity                     │
/// │  6. jump / wall jump                                                   │
/// │  7. sweep y against solids, then semi solids                           │
/// │  8. ride the platform found last tick                                  │
/// │  9. contact probes (down / left / right)                               │
/// │ 10. visual rect, state, animation, hit flicker                         │
/// └────────────────────────────────────────────────────────────────────────┘
#[derive(Debug)]
pub struct Player {
    rect: Rect,
    hitbox: Rect,
    last_rect: Rect,
    // x is a unit direction, y is the vertical speed in px/s
    velocity: Vec2,
    state: PlayerState,
    facing_left: bool,
    attacking: bool,
    jumping: bool,
    contacts: Contacts,
    timers: PlayerTimers,
    platform: Option<SpriteHandle>,
    frames: PlayerFrames,
    cursor: f32,
    frame: Frame,
    effect: Effect,
    tuning: PlayerSettings,
    animation_speed: f32,
    depth: i32,
}

impl Player {
    pub fn new(top_left: Vec2, frames: PlayerFrames, settings: &Settings) -> Self {
        let frame = frames
            .get(PlayerState::Idle)
            .first()
            .copied()
            .unwrap_or_default();
        let rect = Rect::from_position(top_left, frame.size());
        let tuning = settings.player;
        let hitbox = rect.inflate(-tuning.hitbox_inset.x, -tuning.hitbox_inset.y);
        Player {
            rect,
            hitbox,
            last_rect: hitbox,
            velocity: Vec2::ZERO,
            state: PlayerState::Idle,
            facing_left: false,
            attacking: false,
            jumping: false,
            contacts: Contacts::default(),
            timers: PlayerTimers::new(&tuning),
            platform: None,
            frames,
            cursor: 0.0,
            frame,
            effect: Effect::None,
            tuning,
            animation_speed: settings.animation_speed,
            depth: settings.layers.main,
        }
    }

    pub fn update(&mut self, tick: Tick, input: &Input, obstacles: &Obstacles, sounds: &dyn SoundSink) {
        self.last_rect = self.hitbox;
        self.timers.update(tick.now);
        self.read_input(tick.now, input, sounds);
        self.advance(tick.dt, obstacles, sounds, tick.now);
        self.ride_platform(tick.dt, obstacles);
        self.check_contacts(obstacles);
        self.rect.set_center(self.hitbox.center());
        self.state = next_state(self.contacts, self.attacking, self.velocity.x, self.velocity.y);
        self.animate(tick.dt);
        self.flicker(tick.now);
    }

    fn read_input(&mut self, now: f64, input: &Input, sounds: &dyn SoundSink) {
        if !self.timers.wall_jump.is_active() {
            self.velocity.x = if input.left {
                self.facing_left = true;
                -1.0
            } else if input.right {
                self.facing_left = false;
                1.0
            } else {
                0.0
            };
        }
        if input.down {
            self.timers.platform_skip.start(now);
        }
        if input.attack {
            self.attack(now, sounds);
        }
        if input.jump {
            self.jumping = true;
        }
    }

    fn attack(&mut self, now: f64, sounds: &dyn SoundSink) {
        if self.timers.attack.is_active() {
            return;
        }
        self.attacking = true;
        self.cursor = 0.0;
        self.timers.attack.start(now);
        sounds.play(Sound::Attack);
    }

    fn advance(&mut self, dt: f32, obstacles: &Obstacles, sounds: &dyn SoundSink, now: f64) {
        self.hitbox.x += self.velocity.x * self.tuning.speed * dt;
        self.sweep(Sweep::Horizontal, &obstacles.solid);

        let gravity = self.tuning.gravity;
        if self.contacts.airborne()
            && self.contacts.on_wall()
            && !self.timers.wall_jump_block.is_active()
        {
            // wall slide
            self.velocity.y = 0.0;
            self.hitbox.y += gravity / 10.0 * dt;
        } else {
            self.velocity.y += gravity / 2.0 * dt;
            self.hitbox.y += self.velocity.y * dt;
            self.velocity.y += gravity / 2.0 * dt;
        }

        if self.jumping {
            if self.contacts.down {
                self.velocity.y = -self.tuning.jump_power;
                self.timers.wall_jump_block.start(now);
                // keep an upward moving platform from swallowing the jump
                self.hitbox.y -= 1.0;
                sounds.play(Sound::Jump);
            } else if self.contacts.on_wall() && !self.timers.wall_jump_block.is_active() {
                self.timers.wall_jump.start(now);
                self.velocity.y = -self.tuning.jump_power;
                self.velocity.x = if self.contacts.left { 1.0 } else { -1.0 };
                self.facing_left = self.velocity.x < 0.0;
                sounds.play(Sound::Jump);
            }
            self.jumping = false;
        }

        self.sweep(Sweep::Vertical, &obstacles.solid);
        self.land_on_semi_solids(&obstacles.semi_solid);
    }

    /// Snaps the hitbox flush against whatever it ran into. The approach
    /// side comes from both last rects (truncated to whole pixels), never
    /// from the penetration depth.
    fn sweep(&mut self, sweep: Sweep, solids: &[Collider]) {
        for solid in solids {
            if !solid.rect.intersects(&self.hitbox) {
                continue;
            }
            let last = self.last_rect;
            match sweep {
                Sweep::Horizontal => {
                    if self.hitbox.left() <= solid.rect.right()
                        && last.left() as i32 >= solid.last_rect.right() as i32
                    {
                        self.hitbox.set_left(solid.rect.right());
                    }
                    if self.hitbox.right() >= solid.rect.left()
                        && last.right() as i32 <= solid.last_rect.left() as i32
                    {
                        self.hitbox.set_right(solid.rect.left());
                    }
                }
                Sweep::Vertical => {
                    if self.hitbox.top() <= solid.rect.bottom()
                        && last.top() as i32 >= solid.last_rect.bottom() as i32
                    {
                        self.hitbox.set_top(solid.rect.bottom());
                        if solid.is_mover() {
                            // do not stick under a moving block
                            self.hitbox.y += 6.0;
                        }
                    }
                    if self.hitbox.bottom() >= solid.rect.top()
                        && last.bottom() as i32 <= solid.last_rect.top() as i32
                    {
                        self.hitbox.set_bottom(solid.rect.top());
                    }
                    self.velocity.y = 0.0;
                }
            }
        }
    }

    fn land_on_semi_solids(&mut self, semi_solids: &[Collider]) {
        if self.timers.platform_skip.is_active() {
            return;
        }
        for platform in semi_solids {
            if platform.rect.intersects(&self.hitbox)
                && self.hitbox.bottom() >= platform.rect.top()
                && self.last_rect.bottom() as i32 <= platform.last_rect.top() as i32
            {
                self.hitbox.set_bottom(platform.rect.top());
                if self.velocity.y > 0.0 {
                    self.velocity.y = 0.0;
                }
            }
        }
    }

    fn ride_platform(&mut self, dt: f32, obstacles: &Obstacles) {
        let velocity = self
            .platform
            .and_then(|handle| obstacles.find(handle))
            .and_then(|collider| collider.velocity);
        if let Some(velocity) = velocity {
            self.hitbox.translate(velocity * dt);
        }
    }

    fn check_contacts(&mut self, obstacles: &Obstacles) {
        let hitbox = self.hitbox;
        let down = Rect::new(hitbox.left(), hitbox.bottom(), hitbox.width, 2.0);
        let right = Rect::new(
            hitbox.right(),
            hitbox.top() + hitbox.height / 4.0,
            2.0,
            hitbox.height / 2.0,
        );
        let left = Rect::new(
            hitbox.left() - 2.0,
            hitbox.top() + hitbox.height / 4.0,
            2.0,
            hitbox.height / 2.0,
        );

        let touches = |probe: &Rect, colliders: &[Collider]| {
            colliders.iter().any(|collider| probe.intersects(&collider.rect))
        };

        self.contacts = Contacts {
            down: touches(&down, &obstacles.solid)
                || (touches(&down, &obstacles.semi_solid) && self.velocity.y >= 0.0),
            left: touches(&left, &obstacles.solid),
            right: touches(&right, &obstacles.solid),
        };

        self.platform = obstacles
            .solid
            .iter()
            .chain(obstacles.semi_solid.iter())
            .filter(|collider| collider.is_mover())
            .find(|collider| collider.rect.intersects(&down))
            .map(|collider| collider.handle);
    }

    fn animate(&mut self, dt: f32) {
        self.cursor += self.animation_speed * dt;

        if self.state == PlayerState::Attack
            && self.cursor >= self.frames.get(self.state).len() as f32
        {
            self.state = PlayerState::Idle;
        }

        let frames = self.frames.get(self.state);
        if !frames.is_empty() {
            let index = (self.cursor.max(0.0) as usize) % frames.len();
            self.frame = frames[index].flipped(self.facing_left, false);
        }

        if self.attacking && self.cursor >= frames.len() as f32 {
            self.attacking = false;
        }
    }

    fn flicker(&mut self, now: f64) {
        self.effect = if self.timers.hit.is_active() && (now / 30.0).sin() >= 0.0 {
            Effect::Silhouette
        } else {
            Effect::None
        };
    }

    /// Costs one health unless the player is still blinking from the last
    /// hit. Returns whether the hit landed.
    pub fn handle_damage(&mut self, now: f64, data: &mut GameData, sounds: &dyn SoundSink) -> bool {
        if self.timers.hit.is_active() {
            return false;
        }
        data.change_health(-1);
        self.timers.hit.start(now);
        sounds.play(Sound::Damage);
        true
    }

    /// Keeps the hitbox between the world's side edges.
    pub fn constrain_horizontally(&mut self, left: f32, right: f32) {
        if self.hitbox.left() <= left {
            self.hitbox.set_left(left);
        }
        if self.hitbox.right() >= right {
            self.hitbox.set_right(right);
        }
        self.rect.set_center(self.hitbox.center());
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    pub fn last_rect(&self) -> Rect {
        self.last_rect
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn contacts(&self) -> Contacts {
        self.contacts
    }

    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    pub fn platform(&self) -> Option<SpriteHandle> {
        self.platform
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// The attack only reaches what the player is looking at.
    pub fn faces(&self, x: f32) -> bool {
        let center = self.rect.center().x;
        (center < x && !self.facing_left) || (center > x && self.facing_left)
    }

    pub fn draw_item(&self) -> DrawItem {
        DrawItem {
            position: self.rect.top_left(),
            frame: self.frame,
            effect: self.effect,
            depth: self.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::recording::{HudEvent, RecordingHud};
    use crate::engine::audio::recording::RecordingSounds;
    use crate::engine::audio::Silence;
    use crate::sprite::moving::{Axis, MovingPlatform};
    use crate::sprite::{Sprite, Status, Surroundings};
    use crate::world::{Category, SpriteRegistry};
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    fn player_at(top_left: Vec2) -> Player {
        let frames: Rc<[Frame]> = (0..4)
            .map(|i| Frame::new(Rect::new(i as f32 * 200.0, 0.0, 200.0, 100.0)))
            .collect();
        Player::new(top_left, PlayerFrames::uniform(frames), &Settings::default())
    }

    fn block(registry: &mut SpriteRegistry, rect: Rect, category: Category) -> SpriteHandle {
        let frame = Frame::new(Rect::new(0.0, 0.0, rect.width, rect.height));
        registry.insert(Sprite::fixed(rect.top_left(), frame, 5), &[category])
    }

    fn obstacles(registry: &SpriteRegistry) -> Obstacles {
        Obstacles {
            solid: registry.colliders_in(Category::Solid),
            semi_solid: registry.colliders_in(Category::SemiSolid),
        }
    }

    /// Player first, then the other sprites, like a level tick.
    fn step(player: &mut Player, registry: &mut SpriteRegistry, tick: Tick, input: &Input) {
        let snapshot = obstacles(registry);
        player.update(tick, input, &snapshot, &Silence);
        let env = Surroundings {
            tick,
            solids: &[],
            target: player.hitbox().center(),
            world_width: 10_000.0,
        };
        for handle in registry.handles() {
            if let Some(sprite) = registry.get_mut(handle) {
                if sprite.update(&env, &mut |_| {}) == Status::Dead {
                    registry.remove(handle);
                }
            }
        }
    }

    fn run(player: &mut Player, registry: &mut SpriteRegistry, ticks: usize, input: &Input) -> Tick {
        let mut tick = Tick::new(DT, 0.0);
        for _ in 0..ticks {
            tick = tick.next();
            step(player, registry, tick, input);
        }
        tick
    }

    #[test]
    fn hitbox_is_inset_and_contained() {
        let mut registry = SpriteRegistry::new();
        block(&mut registry, Rect::new(-1000.0, 400.0, 3000.0, 64.0), Category::Solid);
        let mut player = player_at(Vec2::new(0.0, 100.0));
        assert_abs_diff_eq!(player.hitbox().width, 200.0 - 76.0);
        assert_abs_diff_eq!(player.hitbox().height, 100.0 - 36.0);

        let inputs = [
            Input { right: true, ..Input::default() },
            Input { left: true, jump: true, ..Input::default() },
            Input { attack: true, ..Input::default() },
        ];
        let mut tick = Tick::new(DT, 0.0);
        for i in 0..600 {
            tick = tick.next();
            step(&mut player, &mut registry, tick, &inputs[(i / 40) % inputs.len()]);
            assert!(player.rect().contains(&player.hitbox()));
            assert_abs_diff_eq!(player.rect().width - player.hitbox().width, 76.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn lands_on_the_floor_and_idles() {
        let mut registry = SpriteRegistry::new();
        block(&mut registry, Rect::new(0.0, 300.0, 1000.0, 64.0), Category::Solid);
        let mut player = player_at(Vec2::new(100.0, 0.0));

        run(&mut player, &mut registry, 120, &Input::default());

        assert_abs_diff_eq!(player.hitbox().bottom(), 300.0);
        assert!(player.contacts().down);
        assert_eq!(player.state(), PlayerState::Idle);
        assert_abs_diff_eq!(player.velocity().y, 0.0);
    }

    #[test]
    fn does_not_tunnel_through_walls() {
        let mut registry = SpriteRegistry::new();
        block(&mut registry, Rect::new(0.0, 300.0, 2000.0, 64.0), Category::Solid);
        let wall = Rect::new(600.0, 100.0, 64.0, 200.0);
        block(&mut registry, wall, Category::Solid);
        let mut player = player_at(Vec2::new(200.0, 150.0));

        let right = Input { right: true, ..Input::default() };
        let mut tick = Tick::new(DT, 0.0);
        for _ in 0..300 {
            tick = tick.next();
            step(&mut player, &mut registry, tick, &right);
            assert!(player.hitbox().right() <= wall.left() + 1e-3);
        }
        assert_abs_diff_eq!(player.hitbox().right(), wall.left());
        assert!(player.contacts().right);
        assert_eq!(player.state(), PlayerState::Run);
    }

    #[test]
    fn damage_is_idempotent_while_invulnerable() {
        let mut player = player_at(Vec2::ZERO);
        let (hud, events) = RecordingHud::new();
        let mut data = GameData::new(&Settings::default().rules, Box::new(hud));
        let sounds = RecordingSounds::default();

        let landed: Vec<bool> = (0..10)
            .map(|i| player.handle_damage(1000.0 + f64::from(i) * 10.0, &mut data, &sounds))
            .collect();
        assert_eq!(landed.iter().filter(|hit| **hit).count(), 1);
        assert_eq!(data.health(), 4);
        assert_eq!(sounds.count(Sound::Damage), 1);
        assert_eq!(events.borrow().last(), Some(&HudEvent::Health(4)));

        // the window closes once the hit timer expires on an update
        player.update(Tick::new(DT, 1500.0), &Input::default(), &Obstacles::default(), &Silence);
        assert!(player.handle_damage(1500.0, &mut data, &sounds));
        assert_eq!(data.health(), 3);
    }

    #[test]
    fn flickers_only_while_invulnerable() {
        let mut player = player_at(Vec2::ZERO);
        let mut data = GameData::new(&Settings::default().rules, Box::new(RecordingHud::new().0));
        player.handle_damage(0.0, &mut data, &Silence);

        let silhouettes = (1..=20)
            .map(|i| {
                let now = f64::from(i) * 20.0;
                player.update(Tick::new(DT, now), &Input::default(), &Obstacles::default(), &Silence);
                player.effect()
            })
            .filter(|effect| *effect == Effect::Silhouette)
            .count();
        assert!(silhouettes > 0 && silhouettes < 20);

        player.update(Tick::new(DT, 1000.0), &Input::default(), &Obstacles::default(), &Silence);
        assert_eq!(player.effect(), Effect::None);
    }

    fn wall_jump_setup() -> (Player, SpriteRegistry, Tick) {
        let mut registry = SpriteRegistry::new();
        // tall wall on the right, no floor
        block(&mut registry, Rect::new(400.0, -5000.0, 64.0, 10_000.0), Category::Solid);
        let mut player = player_at(Vec2::new(200.0, 0.0));
        let right = Input { right: true, ..Input::default() };
        let tick = run(&mut player, &mut registry, 90, &right);
        (player, registry, tick)
    }

    #[test]
    fn slides_down_walls_slowly() {
        let (mut player, mut registry, tick) = wall_jump_setup();
        assert!(player.contacts().right);
        assert_eq!(player.state(), PlayerState::Wall);

        let top = player.hitbox().top();
        let right = Input { right: true, ..Input::default() };
        let mut tick = tick;
        tick = tick.next();
        step(&mut player, &mut registry, tick, &right);
        assert_abs_diff_eq!(player.hitbox().top() - top, 1350.0 / 10.0 * DT, epsilon = 1e-3);
    }

    #[test]
    fn wall_jump_locks_horizontal_input_for_its_duration() {
        let (mut player, mut registry, mut tick) = wall_jump_setup();
        let wall_jump = Input { right: true, jump: true, ..Input::default() };
        let push_right = Input { right: true, ..Input::default() };

        tick = tick.next();
        let jumped_at = tick.now;
        step(&mut player, &mut registry, tick, &wall_jump);
        assert_eq!(player.velocity().x, -1.0);
        assert!(player.velocity().y < 0.0);
        assert!(player.facing_left());

        // still pushed away from the wall while the lockout runs
        loop {
            tick = tick.next();
            step(&mut player, &mut registry, tick, &push_right);
            if tick.now - jumped_at >= 500.0 {
                break;
            }
            assert_eq!(player.velocity().x, -1.0, "input leaked at {}ms", tick.now - jumped_at);
        }
        // the tick that expires the lockout reads input again
        assert_eq!(player.velocity().x, 1.0);
    }

    #[test]
    fn lands_on_semi_solid_from_above_and_passes_from_below() {
        let mut registry = SpriteRegistry::new();
        block(&mut registry, Rect::new(0.0, 500.0, 1000.0, 16.0), Category::SemiSolid);
        block(&mut registry, Rect::new(0.0, 700.0, 1000.0, 64.0), Category::Solid);

        let mut above = player_at(Vec2::new(100.0, 300.0));
        run(&mut above, &mut registry, 90, &Input::default());
        assert_abs_diff_eq!(above.hitbox().bottom(), 500.0);
        assert!(above.contacts().down);

        // jumps up through the platform from the floor and lands on top of it
        let mut below = player_at(Vec2::new(100.0, 540.0));
        let mut tick = run(&mut below, &mut registry, 30, &Input::default());
        assert_abs_diff_eq!(below.hitbox().bottom(), 700.0);
        let jump = Input { jump: true, ..Input::default() };
        tick = tick.next();
        step(&mut below, &mut registry, tick, &jump);
        for _ in 0..90 {
            tick = tick.next();
            step(&mut below, &mut registry, tick, &Input::default());
        }
        assert_abs_diff_eq!(below.hitbox().bottom(), 500.0);
        assert!(below.contacts().down);
    }

    #[test]
    fn platform_skip_drops_through_semi_solids() {
        let mut registry = SpriteRegistry::new();
        block(&mut registry, Rect::new(0.0, 200.0, 1000.0, 16.0), Category::SemiSolid);
        let mut player = player_at(Vec2::new(100.0, 0.0));
        let tick = run(&mut player, &mut registry, 90, &Input::default());
        assert_abs_diff_eq!(player.hitbox().bottom(), 200.0);

        let down = Input { down: true, ..Input::default() };
        let mut tick = tick;
        for _ in 0..10 {
            tick = tick.next();
            step(&mut player, &mut registry, tick, &down);
        }
        assert!(player.hitbox().bottom() > 216.0);
    }

    #[test]
    fn rides_moving_platforms() {
        let mut registry = SpriteRegistry::new();
        let frames: Rc<[Frame]> = vec![Frame::new(Rect::new(0.0, 0.0, 300.0, 20.0))].into();
        let platform = MovingPlatform::sprite(
            Vec2::new(300.0, 300.0),
            Vec2::new(900.0, 300.0),
            frames,
            Axis::X,
            120.0,
            false,
            5,
            5.0,
        );
        let handle = registry.insert(platform, &[Category::SemiSolid]);
        let mut player = player_at(Vec2::new(200.0, 150.0));

        let mut tick = run(&mut player, &mut registry, 60, &Input::default());
        assert_eq!(player.platform(), Some(handle));
        let offset = player.hitbox().center().x - registry.get(handle).map(|p| p.rect.center().x).unwrap_or_default();

        for _ in 0..120 {
            tick = tick.next();
            step(&mut player, &mut registry, tick, &Input::default());
            let platform = registry.get(handle).map(|p| p.rect).unwrap_or_default();
            assert_abs_diff_eq!(player.hitbox().bottom(), platform.top(), epsilon = 1e-2);
        }
        let platform_x = registry.get(handle).map(|p| p.rect.center().x).unwrap_or_default();
        assert_abs_diff_eq!(player.hitbox().center().x - platform_x, offset, epsilon = 0.5);
        assert!(player.hitbox().center().x > 400.0);
    }

    #[test]
    fn attack_plays_once_then_clears() {
        let mut registry = SpriteRegistry::new();
        block(&mut registry, Rect::new(0.0, 300.0, 1000.0, 64.0), Category::Solid);
        let mut player = player_at(Vec2::new(100.0, 100.0));
        let mut tick = run(&mut player, &mut registry, 60, &Input::default());

        let sounds = RecordingSounds::default();
        let attack = Input { attack: true, ..Input::default() };
        tick = tick.next();
        player.update(tick, &attack, &obstacles(&registry), &sounds);
        assert!(player.is_attacking());
        assert_eq!(player.state(), PlayerState::Attack);

        // four frames at five per second
        for _ in 0..50 {
            tick = tick.next();
            player.update(tick, &Input::default(), &obstacles(&registry), &sounds);
        }
        assert!(!player.is_attacking());
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(sounds.count(Sound::Attack), 1);
    }

    #[test]
    fn frames_need_every_state() {
        let mut store = FrameStore::new();
        for state in PlayerState::ALL.iter().filter(|state| **state != PlayerState::AirAttack) {
            store.insert(
                format!("player/{}", state.name()),
                vec![Frame::new(Rect::new(0.0, 0.0, 200.0, 100.0))],
            );
        }
        let err = PlayerFrames::load(&store).err().map(|err| format!("{:#}", err)).unwrap_or_default();
        assert!(err.contains("player/air_attack"), "{}", err);

        store.insert("player/air_attack", vec![Frame::new(Rect::new(0.0, 0.0, 200.0, 100.0))]);
        let frames = PlayerFrames::load(&store).unwrap();
        assert!(PlayerState::ALL.iter().all(|state| !frames.get(*state).is_empty()));
    }

    #[test]
    fn constrained_to_world_edges() {
        let mut player = player_at(Vec2::new(-100.0, 0.0));
        player.constrain_horizontally(0.0, 500.0);
        assert_abs_diff_eq!(player.hitbox().left(), 0.0);
        assert!(player.rect().contains(&player.hitbox()));
    }
}
