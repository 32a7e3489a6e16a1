//! World to screen translation, depth sorted drawing and the parallax sky.

use crate::engine::{Effect, Frame, Rect, Surface, Tick, Timer, Vec2};
use crate::settings::SkySettings;
use crate::sprite::effects::Cloud;
use crate::sprite::{Sprite, Status, Surroundings};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

/// One blit, in world coordinates, waiting for the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub position: Vec2,
    pub frame: Frame,
    pub effect: Effect,
    pub depth: i32,
}

/// Limits for the camera offset, in offset space (negative goes right/down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Bounds {
    pub fn for_world(world: Vec2, window: Vec2, top_limit: f32) -> Self {
        Bounds {
            left: 0.0,
            right: -(world.x - window.x),
            bottom: -(world.y - window.y),
            top: top_limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    offset: Vec2,
    window: Vec2,
    bounds: Option<Bounds>,
}

impl Camera {
    pub fn new(window: Vec2, bounds: Option<Bounds>) -> Self {
        Camera {
            offset: Vec2::ZERO,
            window,
            bounds,
        }
    }

    /// Centers `target`, then keeps the view inside the bounds. Horizontal
    /// edges apply left then right, vertical ones bottom then top, so a
    /// world smaller than the window pins to its right and top edges.
    pub fn follow(&mut self, target: Vec2) {
        let mut offset = self.window / 2.0 - target;
        if let Some(bounds) = self.bounds {
            offset.x = offset.x.min(bounds.left).max(bounds.right);
            offset.y = offset.y.max(bounds.bottom).min(bounds.top);
        }
        self.offset = offset;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn window(&self) -> Vec2 {
        self.window
    }

    pub fn to_screen(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    /// Back to front by depth, equal depths keep the order they came in.
    pub fn draw(&self, mut items: Vec<DrawItem>, surface: &dyn Surface) {
        items.sort_by_key(|item| item.depth);
        for item in &items {
            surface.blit(&item.frame, self.to_screen(item.position), item.effect);
        }
    }
}

/// ELI5:
/// ┌──────────────────────────── window ────────────────────────────┐
/// │ sky color                                                      │
/// │        ~~ small clouds drift left, new ones every 2.5s ~~      │
/// │ ▒▒▒▒▒▒▒▒▒▒▒▒ large cloud strip, wraps every width ▒▒▒▒▒▒▒▒▒▒▒▒ │
/// │════════════════════════ horizon line ══════════════════════════│
/// │ sea color                                                      │
/// └────────────────────────────────────────────────────────────────┘
/// Everything below the top of the window follows the vertical camera
/// offset, so the horizon stays put in the world.
pub struct Sky {
    settings: SkySettings,
    horizon: f32,
    top_limit: f32,
    world_width: f32,
    large_cloud: Frame,
    large_cloud_x: f32,
    small_clouds: Rc<[Frame]>,
    clouds: Vec<Sprite>,
    spawn: Timer,
    rng: StdRng,
    depth: i32,
}

impl Sky {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: &SkySettings,
        horizon: f32,
        top_limit: f32,
        world_width: f32,
        large_cloud: Frame,
        small_clouds: Rc<[Frame]>,
        depth: i32,
        seed: u64,
    ) -> Self {
        let mut sky = Sky {
            settings: settings.clone(),
            horizon,
            top_limit,
            world_width,
            large_cloud,
            large_cloud_x: 0.0,
            small_clouds,
            clouds: Vec::new(),
            spawn: Timer::repeating(settings.small_cloud_interval_ms),
            rng: StdRng::seed_from_u64(seed),
            depth,
        };
        for _ in 0..settings.initial_small_clouds {
            let x = sky.rng.gen_range(0.0..=world_width.max(0.0));
            sky.add_cloud(x);
        }
        sky
    }

    fn add_cloud(&mut self, x: f32) {
        let Some(frame) = self.small_clouds.choose(&mut self.rng).copied() else {
            return;
        };
        let (low, high) = if self.top_limit <= self.horizon {
            (self.top_limit, self.horizon)
        } else {
            (self.horizon, self.top_limit)
        };
        let y = self.rng.gen_range(low..=high);
        let speed = self
            .rng
            .gen_range(self.settings.small_cloud_min_speed..=self.settings.small_cloud_max_speed);
        self.clouds
            .push(Cloud::sprite(Vec2::new(x, y), frame, speed, self.depth));
    }

    pub fn update(&mut self, tick: Tick) {
        let width = self.large_cloud.size().x;
        self.large_cloud_x -= self.settings.large_cloud_speed * tick.dt;
        if self.large_cloud_x <= -width {
            self.large_cloud_x = 0.0;
        }

        if !self.spawn.is_active() {
            self.spawn.start(tick.now);
        }
        if self.spawn.update(tick.now) {
            let x = self
                .rng
                .gen_range(self.world_width + 500.0..=self.world_width + 600.0);
            self.add_cloud(x);
        }

        let env = Surroundings {
            tick,
            solids: &[],
            target: Vec2::ZERO,
            world_width: self.world_width,
        };
        self.clouds
            .retain_mut(|cloud| cloud.update(&env, &mut |_| {}) == Status::Alive);
    }

    /// Sky, sea, horizon and the large cloud strip. Small clouds go through
    /// the camera with everything else.
    pub fn draw(&self, surface: &dyn Surface, offset: Vec2, window: Vec2) {
        surface.fill(&self.settings.sky_color);

        let horizon = self.horizon + offset.y;
        let sea = Rect::new(0.0, horizon, window.x, (window.y - horizon).max(0.0));
        surface.fill_rect(&sea, &self.settings.sea_color);
        surface.draw_line(
            Vec2::new(0.0, horizon),
            Vec2::new(window.x, horizon),
            &self.settings.horizon_color,
            self.settings.horizon_width,
        );

        let size = self.large_cloud.size();
        if size.x <= 0.0 {
            return;
        }
        let tiles = (self.world_width / size.x) as usize + 2;
        for i in 0..tiles {
            let position = Vec2::new(
                self.large_cloud_x + size.x * i as f32 + offset.x,
                horizon - size.y,
            );
            surface.blit(&self.large_cloud, position, Effect::None);
        }
    }

    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem> + '_ {
        self.clouds.iter().map(Sprite::draw_item)
    }

    pub fn cloud_count(&self) -> usize {
        self.clouds.len()
    }

    pub fn large_cloud_x(&self) -> f32 {
        self.large_cloud_x
    }
}
