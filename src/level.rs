//! One playable stage built from a tile map.
//!
//! TABLE:
//! ┌─────────────────────────── Level::update ───────────────────────────┐
//! │ 1. collider snapshot (solid / semi solid)                           │
//! │ 2. player                                                           │
//! │ 3. every other sprite, from a handle snapshot, spawns queued        │
//! │ 4. queued spawns (pearls)                                           │
//! │ 5. sky                                                              │
//! │ 6. pearl vs solid, damage, items, attack reflection                 │
//! │ 7. keep the player inside the world, check fall out / finish flag   │
//! └─────────────────────────────────────────────────────────────────────┘

use crate::camera::{Bounds, Camera, Sky};
use crate::data::GameData;
use crate::engine::audio::{Sound, SoundSink};
use crate::engine::sheet::mirrored;
#[cfg(debug_assertions)]
use crate::engine::surface::DebugDraw;
use crate::engine::{Frame, FrameStore, Rect, Surface, Tick, Vec2};
use crate::map::{MapObject, TileMap};
use crate::settings::Settings;
use crate::sprite::effects::particle;
use crate::sprite::enemies::{Pearl, Shell, SpikeBall, Tooth};
use crate::sprite::item::{Item, ItemKind, Reward};
use crate::sprite::moving::{Axis, MovingPlatform};
use crate::sprite::player::{Input, Obstacles, Player, PlayerFrames};
use crate::sprite::{Behavior, Spawn, Sprite, Status, Surroundings};
use crate::world::{Category, SpriteHandle, SpriteRegistry};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

// distance between two links of a spike ball chain
const CHAIN_LINK_SPACING: usize = 20;
const CANDLE_LIGHT_OFFSET: Vec2 = Vec2::new(-20.0, -20.0);

/// Where the game goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSwitch {
    /// Back to the map; `unlock` is 0 when the level was lost.
    Overworld { unlock: usize },
    Level,
}

pub struct Level {
    settings: Rc<Settings>,
    registry: SpriteRegistry,
    player: Player,
    camera: Camera,
    sky: Option<Sky>,
    pearl: Frame,
    particle: Rc<[Frame]>,
    finish: Option<Rect>,
    world: Vec2,
    level_bottom: f32,
    level_unlock: usize,
}

impl Level {
    pub fn build(map: &TileMap, frames: &FrameStore, settings: Rc<Settings>, seed: u64) -> Result<Self> {
        let mut builder = LevelBuilder {
            map,
            frames,
            settings: &settings,
            registry: SpriteRegistry::new(),
            rng: StdRng::seed_from_u64(seed),
            spawn: None,
            finish: None,
            horizon: None,
        };
        let properties = &map.properties;
        let background = properties.text("bg");
        let top_limit = properties.f32("top_limit").unwrap_or(0.0);
        let world = map.pixel_size(settings.tile_size);

        if let Some(name) = &background {
            builder.fill_background(name, top_limit)?;
        }
        builder.tile_layers()?;
        builder.background_details()?;
        builder.objects()?;
        builder.moving_objects()?;
        builder.enemies()?;
        builder.items()?;
        builder.data()?;

        let spawn = builder
            .spawn
            .ok_or_else(|| anyhow!("Level has no 'player' object"))?;
        let player = Player::new(
            spawn,
            PlayerFrames::load(frames)?,
            &settings,
        );

        let sky = match background {
            Some(_) => None,
            None => {
                let horizon = builder.horizon.unwrap_or_else(|| {
                    warn!("Level has no horizon, using the bottom of the map");
                    world.y
                });
                Some(Sky::new(
                    &settings.sky,
                    horizon,
                    -top_limit,
                    world.x,
                    frames.frame("clouds/large")?,
                    frames.sequence("clouds/small")?,
                    settings.layers.clouds,
                    builder.rng.gen(),
                ))
            }
        };

        let finish = builder.finish;
        let registry = builder.registry;
        info!(
            "Level built: {} sprites, {}x{} px, finish {}",
            registry.len(),
            world.x,
            world.y,
            if finish.is_some() { "set" } else { "missing" }
        );

        Ok(Level {
            camera: Camera::new(
                settings.window_size(),
                Some(Bounds::for_world(world, settings.window_size(), top_limit)),
            ),
            pearl: frames.frame("pearl")?,
            particle: frames.sequence("particle")?,
            level_bottom: properties.f32("level_bottom").unwrap_or(world.y),
            level_unlock: properties.int("level_unlock").unwrap_or(0).max(0) as usize,
            settings,
            registry,
            player,
            sky,
            finish,
            world,
        })
    }

    pub fn update(
        &mut self,
        tick: Tick,
        input: &Input,
        data: &mut GameData,
        sounds: &dyn SoundSink,
    ) -> Option<StageSwitch> {
        let obstacles = Obstacles {
            solid: self.registry.colliders_in(Category::Solid),
            semi_solid: self.registry.colliders_in(Category::SemiSolid),
        };
        self.player.update(tick, input, &obstacles, sounds);

        self.update_sprites(tick, sounds);
        if let Some(sky) = self.sky.as_mut() {
            sky.update(tick);
        }

        self.pearl_collisions();
        self.hit_collisions(tick.now, data, sounds);
        self.item_collisions(data, sounds);
        self.attack_collisions(sounds);

        self.player.constrain_horizontally(0.0, self.world.x);
        self.check_exit()
    }

    fn update_sprites(&mut self, tick: Tick, sounds: &dyn SoundSink) {
        let solids = self.registry.rects_in(Category::Solid);
        let env = Surroundings {
            tick,
            solids: &solids,
            target: self.player.hitbox().center(),
            world_width: self.world.x,
        };
        let mut spawns = Vec::new();
        for handle in self.registry.handles() {
            let Some(sprite) = self.registry.get_mut(handle) else {
                continue;
            };
            if sprite.update(&env, &mut |spawn| spawns.push(spawn)) == Status::Dead {
                self.registry.remove(handle);
            }
        }

        for spawn in spawns {
            match spawn {
                Spawn::Pearl { center, direction } => {
                    debug!("Pearl fired at {:?}", center);
                    let pearl = Pearl::sprite(
                        center,
                        self.pearl,
                        direction,
                        self.settings.enemies.pearl_speed,
                        self.settings.layers.main,
                    );
                    self.registry
                        .insert(pearl, &[Category::Damaging, Category::Pearl]);
                    sounds.play(Sound::PearlFire);
                }
            }
        }
    }

    fn pop(&mut self, handle: SpriteHandle) {
        if let Some(sprite) = self.registry.remove(handle) {
            let effect = particle(
                sprite.rect.center(),
                Rc::clone(&self.particle),
                self.settings.layers.fg,
                self.settings.animation_speed,
            );
            self.registry.insert(effect, &[]);
        }
    }

    fn pearl_collisions(&mut self) {
        let solids = self.registry.rects_in(Category::Solid);
        for handle in self.registry.handles_in(Category::Pearl) {
            let hit = self
                .registry
                .get(handle)
                .is_some_and(|pearl| pearl.rect.intersects_any(&solids));
            if hit {
                self.pop(handle);
            }
        }
    }

    fn hit_collisions(&mut self, now: f64, data: &mut GameData, sounds: &dyn SoundSink) {
        let hitbox = self.player.hitbox();
        for handle in self.registry.handles_in(Category::Damaging) {
            let touching = self
                .registry
                .get(handle)
                .is_some_and(|sprite| sprite.rect.intersects(&hitbox));
            if !touching {
                continue;
            }
            self.player.handle_damage(now, data, sounds);
            if self.registry.is_in(handle, Category::Pearl) {
                self.pop(handle);
            }
        }
    }

    fn item_collisions(&mut self, data: &mut GameData, sounds: &dyn SoundSink) {
        let hitbox = self.player.hitbox();
        for handle in self.registry.handles_in(Category::Item) {
            let reward = match self.registry.get(handle) {
                Some(sprite) if sprite.rect.intersects(&hitbox) => match sprite.behavior() {
                    Behavior::Item(item) => item.kind().reward(),
                    _ => continue,
                },
                _ => continue,
            };
            match reward {
                Reward::Coins(amount) => data.add_coins(amount),
                Reward::Health(amount) => data.change_health(amount),
            }
            self.pop(handle);
            sounds.play(Sound::Coin);
        }
    }

    /// Pearls and teeth the swing reaches are sent back the way they came.
    fn attack_collisions(&mut self, sounds: &dyn SoundSink) {
        if !self.player.is_attacking() {
            return;
        }
        let reach = self.player.rect();
        let player_x = reach.center().x;
        let targets = self
            .registry
            .handles_in(Category::Pearl)
            .into_iter()
            .chain(self.registry.handles_in(Category::Tooth));
        for handle in targets {
            let Some(sprite) = self.registry.get_mut(handle) else {
                continue;
            };
            if !sprite.rect.intersects(&reach) || !self.player.faces(sprite.rect.center().x) {
                continue;
            }
            if sprite.face_away_from(player_x) {
                sounds.play(Sound::Hit);
            }
        }
    }

    fn check_exit(&self) -> Option<StageSwitch> {
        let hitbox = self.player.hitbox();
        if hitbox.bottom() > self.level_bottom {
            info!("Player fell out of the level");
            return Some(StageSwitch::Overworld { unlock: 0 });
        }
        if self.finish.is_some_and(|flag| flag.intersects(&hitbox)) {
            info!("Level finished, unlocking {}", self.level_unlock);
            return Some(StageSwitch::Overworld {
                unlock: self.level_unlock,
            });
        }
        None
    }

    pub fn draw(&mut self, surface: &dyn Surface) {
        self.camera.follow(self.player.hitbox().center());
        let offset = self.camera.offset();

        let mut items = self.registry.draw_items();
        if let Some(sky) = &self.sky {
            sky.draw(surface, offset, self.camera.window());
            items.extend(sky.draw_items());
        }
        items.push(self.player.draw_item());
        self.camera.draw(items, surface);

        #[cfg(debug_assertions)]
        self.player.hitbox().translated(offset).draw_debug(surface);
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn registry(&self) -> &SpriteRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn world_size(&self) -> Vec2 {
        self.world
    }
}

struct LevelBuilder<'a> {
    map: &'a TileMap,
    frames: &'a FrameStore,
    settings: &'a Settings,
    registry: SpriteRegistry,
    rng: StdRng,
    spawn: Option<Vec2>,
    finish: Option<Rect>,
    horizon: Option<f32>,
}

impl LevelBuilder<'_> {
    fn tile_position(&self, x: i64, y: i64) -> Vec2 {
        Vec2::new(x as f32, y as f32) * self.settings.tile_size
    }

    fn fill_background(&mut self, name: &str, top_limit: f32) -> Result<()> {
        let frame = self
            .frames
            .frame(&format!("bg_tiles/{}", name))
            .context("Background tile")?;
        let rows_above = (top_limit / self.settings.tile_size).ceil().max(0.0) as i64;
        for x in 0..i64::from(self.map.width) {
            for y in -rows_above..i64::from(self.map.height) {
                let tile = Sprite::fixed(self.tile_position(x, y), frame, self.settings.layers.bg);
                self.registry.insert(tile, &[]);
            }
        }
        Ok(())
    }

    fn tile_layers(&mut self) -> Result<()> {
        let layers = self.settings.layers;
        let plan: [(&str, i32, &[Category]); 4] = [
            ("BG", layers.bg_tiles, &[]),
            ("Terrain", layers.main, &[Category::Solid]),
            ("FG", layers.bg_tiles, &[]),
            ("Platforms", layers.main, &[Category::SemiSolid]),
        ];
        for (layer, depth, categories) in plan {
            for tile in self.map.tiles(layer) {
                let frame = self
                    .frames
                    .frame(&tile.image)
                    .with_context(|| format!("Tile in layer '{}'", layer))?;
                let position = self.tile_position(i64::from(tile.x), i64::from(tile.y));
                self.registry
                    .insert(Sprite::fixed(position, frame, depth), categories);
            }
        }
        Ok(())
    }

    fn background_details(&mut self) -> Result<()> {
        let depth = self.settings.layers.bg_details;
        let rate = self.settings.animation_speed;
        for object in self.map.objects("BG details") {
            let sprite = if object.name == "static" {
                let frame = self.frames.frame(object.require_image()?)?;
                Sprite::fixed(object.position(), frame, depth)
            } else {
                let frames = self.frames.sequence(&object.name)?;
                Sprite::animated(object.position(), frames, depth, rate)
            };
            self.registry.insert(sprite, &[]);

            if object.name == "candle" {
                let light = self.frames.sequence("candle_light")?;
                self.registry.insert(
                    Sprite::animated(object.position() + CANDLE_LIGHT_OFFSET, light, depth, rate),
                    &[],
                );
            }
        }
        Ok(())
    }

    fn objects(&mut self) -> Result<()> {
        let layers = self.settings.layers;
        for object in self.map.objects("Objects") {
            let name = object.name.as_str();
            match name {
                "player" => self.spawn = Some(object.position()),
                "barrel" | "crate" => {
                    let frame = self.frames.frame(object.require_image()?)?;
                    self.registry.insert(
                        Sprite::fixed(object.position(), frame, layers.main),
                        &[Category::Solid],
                    );
                }
                _ => {
                    let mut frames = self
                        .frames
                        .sequence(name)
                        .with_context(|| format!("Object '{}'", name))?;
                    if name == "floor_spike" && object.properties.bool("inverted").unwrap_or(false) {
                        frames = mirrored(&frames, false, true);
                    }

                    let categories: &[Category] = match name {
                        "palm_small" | "palm_large" => &[Category::SemiSolid],
                        "saw" | "floor_spike" => &[Category::Damaging],
                        _ => &[],
                    };
                    let depth = if name.contains("bg") {
                        layers.bg_details
                    } else {
                        layers.main
                    };
                    let rate = if name.contains("palm") {
                        self.settings.animation_speed + self.rng.gen_range(-1.0..=1.0)
                    } else {
                        self.settings.animation_speed
                    };

                    let sprite = Sprite::animated(object.position(), frames, depth, rate);
                    if name == "flag" {
                        self.finish = Some(sprite.rect);
                    }
                    self.registry.insert(sprite, categories);
                }
            }
        }
        Ok(())
    }

    fn moving_objects(&mut self) -> Result<()> {
        for object in self.map.objects("Moving Objects") {
            if object.name == "spike" {
                self.spike_ball(object)
                    .with_context(|| format!("Spike ball at {:?}", object.position()))?;
            } else {
                self.moving_platform(object)
                    .with_context(|| format!("Moving object '{}'", object.name))?;
            }
        }
        Ok(())
    }

    fn spike_ball(&mut self, object: &MapObject) -> Result<()> {
        let properties = &object.properties;
        let radius = properties.require_f32("radius")?;
        let speed = properties.require_f32("speed")?;
        let start_angle = properties.require_f32("start_angle")?;
        let end_angle = properties.require_f32("end_angle")?;
        let center = object.rect().center();

        let ball = SpikeBall::sprite(
            center,
            self.frames.frame("spike")?,
            radius,
            speed,
            start_angle,
            end_angle,
            self.settings.layers.main,
        );
        self.registry.insert(ball, &[Category::Damaging]);

        let link = self.frames.frame("spike_chain")?;
        for length in (0..radius.max(0.0) as usize).step_by(CHAIN_LINK_SPACING) {
            let chain = SpikeBall::sprite(
                center,
                link,
                length as f32,
                speed,
                start_angle,
                end_angle,
                self.settings.layers.bg_details,
            );
            self.registry.insert(chain, &[]);
        }
        Ok(())
    }

    fn moving_platform(&mut self, object: &MapObject) -> Result<()> {
        let frames = self.frames.sequence(&object.name)?;
        let rect = object.rect();
        let axis = Axis::from_size(rect.size());
        let (start, end) = match axis {
            Axis::X => (
                Vec2::new(rect.left(), rect.center().y),
                Vec2::new(rect.right(), rect.center().y),
            ),
            Axis::Y => (
                Vec2::new(rect.center().x, rect.top()),
                Vec2::new(rect.center().x, rect.bottom()),
            ),
        };
        let properties = &object.properties;
        let sprite = MovingPlatform::sprite(
            start,
            end,
            frames,
            axis,
            properties.require_f32("speed")?,
            properties.bool("flip").unwrap_or(false),
            self.settings.layers.main,
            self.settings.animation_speed,
        );
        let category = if properties.bool("platform").unwrap_or(false) {
            Category::SemiSolid
        } else {
            Category::Damaging
        };
        self.registry.insert(sprite, &[category]);
        Ok(())
    }

    fn enemies(&mut self) -> Result<()> {
        let depth = self.settings.layers.main;
        let rate = self.settings.animation_speed;
        let tuning = self.settings.enemies;
        for object in self.map.objects("Enemies") {
            match object.name.as_str() {
                "tooth" => {
                    let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    let tooth = Tooth::sprite(
                        object.position(),
                        self.frames.sequence("tooth")?,
                        direction,
                        tuning.tooth_speed,
                        depth,
                        rate,
                    );
                    self.registry
                        .insert(tooth, &[Category::Damaging, Category::Tooth]);
                }
                "shell" => {
                    let shell = Shell::sprite(
                        object.position(),
                        self.frames.sequence("shell/idle")?,
                        self.frames.sequence("shell/fire")?,
                        object.properties.bool("reverse").unwrap_or(false),
                        tuning,
                        depth,
                        rate,
                    );
                    self.registry.insert(shell, &[Category::Solid]);
                }
                other => warn!("Unknown enemy '{}' skipped", other),
            }
        }
        Ok(())
    }

    fn items(&mut self) -> Result<()> {
        let half_tile = Vec2::splat(self.settings.tile_size / 2.0);
        for object in self.map.objects("Items") {
            let kind: ItemKind = object.name.parse()?;
            let item = Item::sprite(
                object.position() + half_tile,
                self.frames.sequence(&format!("items/{}", kind.name()))?,
                kind,
                self.settings.layers.main,
                self.settings.animation_speed,
            );
            self.registry.insert(item, &[Category::Item]);
        }
        Ok(())
    }

    fn data(&mut self) -> Result<()> {
        let layers = self.settings.layers;
        let tile = self.settings.tile_size;
        for object in self.map.objects("Data") {
            match object.name.as_str() {
                "horizon" => self.horizon = Some(object.y),
                "water" => {
                    let rows = (object.height / tile) as i64;
                    let columns = (object.width / tile) as i64;
                    let top = self.frames.sequence("water/top")?;
                    let body = self.frames.frame("water/body")?;
                    for row in 0..rows {
                        for column in 0..columns {
                            let position =
                                object.position() + Vec2::new(column as f32, row as f32) * tile;
                            let sprite = if row == 0 {
                                Sprite::animated(position, Rc::clone(&top), layers.water, self.settings.animation_speed)
                            } else {
                                Sprite::fixed(position, body, layers.water)
                            };
                            self.registry.insert(sprite, &[]);
                        }
                    }
                }
                other => debug!("Data object '{}' ignored", other),
            }
        }
        Ok(())
    }
}
