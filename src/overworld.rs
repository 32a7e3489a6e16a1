//! Level select map: nodes joined by paths, walked by the player icon.

use crate::camera::{Camera, DrawItem};
use crate::data::GameData;
use crate::engine::{Effect, Frame, FrameStore, Surface, Tick, Vec2};
use crate::level::StageSwitch;
use crate::map::TileMap;
use crate::settings::Settings;
use crate::sprite::animation::Animation;
use crate::sprite::{Sprite, Surroundings};
use crate::world::SpriteRegistry;
use anyhow::{anyhow, bail, Context, Error, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Node property naming the path in this direction.
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// `"2"` walks path 2 as drawn, `"2r"` walks it backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRef {
    pub id: usize,
    pub reversed: bool,
}

impl FromStr for PathRef {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (digits, reversed) = match text.strip_suffix('r') {
            Some(digits) => (digits, true),
            None => (text, false),
        };
        let id = digits
            .parse()
            .map_err(|err| anyhow!("Bad path reference '{}' : {}", text, err))?;
        Ok(PathRef { id, reversed })
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    center: Vec2,
    level: usize,
    paths: HashMap<Direction, PathRef>,
}

impl Node {
    pub fn new(center: Vec2, level: usize, paths: HashMap<Direction, PathRef>) -> Self {
        Node {
            center,
            level,
            paths,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// The path leaving in `direction`, if there is one and it is unlocked.
    pub fn can_move(&self, direction: Direction, unlocked: usize) -> Option<PathRef> {
        self.paths
            .get(&direction)
            .copied()
            .filter(|path| path.id <= unlocked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconState {
    #[default]
    Idle,
    Left,
    Right,
    Up,
    Down,
}

impl IconState {
    pub const ALL: [IconState; 5] = [
        IconState::Idle,
        IconState::Left,
        IconState::Right,
        IconState::Up,
        IconState::Down,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IconState::Idle => "idle",
            IconState::Left => "left",
            IconState::Right => "right",
            IconState::Up => "up",
            IconState::Down => "down",
        }
    }
}

/// The player's marker on the map. It walks one axis at a time and snaps
/// onto each waypoint, so it always ends exactly on a node.
#[derive(Debug)]
pub struct Icon {
    center: Vec2,
    path: VecDeque<Vec2>,
    speed: f32,
    state: IconState,
    frames: HashMap<IconState, Rc<[Frame]>>,
    animation: Animation,
    depth: i32,
}

impl Icon {
    pub fn new(center: Vec2, frames: HashMap<IconState, Rc<[Frame]>>, settings: &Settings) -> Self {
        let idle = frames.get(&IconState::Idle).cloned().unwrap_or_else(|| Rc::from([]));
        Icon {
            center,
            path: VecDeque::new(),
            speed: settings.overworld.icon_speed,
            state: IconState::Idle,
            frames,
            animation: Animation::new(idle, settings.animation_speed),
            depth: settings.layers.main,
        }
    }

    pub fn load_frames(store: &FrameStore) -> Result<HashMap<IconState, Rc<[Frame]>>> {
        IconState::ALL
            .iter()
            .map(|state| {
                store
                    .sequence(&format!("icon/{}", state.name()))
                    .map(|frames| (*state, frames))
            })
            .collect::<Result<HashMap<_, _>>>()
            .context("Overworld icon animations are incomplete")
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn state(&self) -> IconState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn follow(&mut self, points: impl IntoIterator<Item = Vec2>) {
        self.path = points.into_iter().collect();
    }

    pub fn update(&mut self, dt: f32) {
        while self.path.front() == Some(&self.center) {
            self.path.pop_front();
        }

        let state = match self.path.front().copied() {
            None => IconState::Idle,
            Some(target) => {
                let step = self.speed * dt;
                let state = if self.center.x != target.x {
                    let dx = target.x - self.center.x;
                    self.center.x = if dx.abs() <= step {
                        target.x
                    } else {
                        self.center.x + step * dx.signum()
                    };
                    if dx < 0.0 {
                        IconState::Left
                    } else {
                        IconState::Right
                    }
                } else {
                    let dy = target.y - self.center.y;
                    self.center.y = if dy.abs() <= step {
                        target.y
                    } else {
                        self.center.y + step * dy.signum()
                    };
                    if dy < 0.0 {
                        IconState::Up
                    } else {
                        IconState::Down
                    }
                };
                if self.center == target {
                    self.path.pop_front();
                }
                if self.path.is_empty() {
                    IconState::Idle
                } else {
                    state
                }
            }
        };

        if state != self.state {
            self.state = state;
            if let Some(frames) = self.frames.get(&state) {
                self.animation.set_frames(Rc::clone(frames));
            }
        }
        self.animation.advance(dt);
    }

    pub fn draw_item(&self) -> DrawItem {
        let frame = self.animation.frame();
        DrawItem {
            position: self.center - frame.size() / 2.0,
            frame,
            effect: Effect::None,
            depth: self.depth,
        }
    }
}

/// Controls on the map, already mapped from keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverworldInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
}

impl OverworldInput {
    fn direction(&self) -> Option<Direction> {
        [
            (self.left, Direction::Left),
            (self.right, Direction::Right),
            (self.up, Direction::Up),
            (self.down, Direction::Down),
        ]
        .into_iter()
        .find_map(|(pressed, direction)| pressed.then_some(direction))
    }
}

pub struct Overworld {
    registry: SpriteRegistry,
    nodes: Vec<Node>,
    paths: HashMap<usize, Vec<Vec2>>,
    icon: Icon,
    camera: Camera,
    world_width: f32,
}

impl Overworld {
    pub fn build(map: &TileMap, frames: &FrameStore, settings: &Settings, data: &GameData, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut registry = SpriteRegistry::new();
        let layers = settings.layers;
        let tile = settings.tile_size;
        let half_tile = Vec2::splat(tile / 2.0);

        let water = frames.sequence("overworld/water")?;
        for x in 0..map.width {
            for y in 0..map.height {
                let position = Vec2::new(x as f32, y as f32) * tile;
                registry.insert(
                    Sprite::animated(position, Rc::clone(&water), layers.bg, settings.animation_speed),
                    &[],
                );
            }
        }

        for layer in ["main", "top"] {
            for tile_entry in map.tiles(layer) {
                let frame = frames
                    .frame(&tile_entry.image)
                    .with_context(|| format!("Overworld tile in layer '{}'", layer))?;
                let position = Vec2::new(tile_entry.x as f32, tile_entry.y as f32) * tile;
                registry.insert(Sprite::fixed(position, frame, layers.bg_tiles), &[]);
            }
        }

        for object in map.objects("Objects") {
            let sprite = if object.name.contains("palm") {
                let rate = rng.gen_range(4.0..=6.0);
                Sprite::animated(object.position(), frames.sequence(&object.name)?, layers.main, rate)
            } else {
                let frame = frames.frame(object.require_image()?)?;
                Sprite::fixed(object.position(), frame, layers.main)
            };
            registry.insert(sprite, &[]);
        }

        let mut paths = HashMap::new();
        for object in map.objects("Paths") {
            let id = object
                .properties
                .require_int("end")
                .with_context(|| format!("Path '{}'", object.name))?;
            let points: Vec<Vec2> = object.points.iter().map(|point| *point + half_tile).collect();
            paths.insert(id.max(0) as usize, points);
        }

        let mut nodes = Vec::new();
        for object in map.objects("Nodes").filter(|object| object.name == "Node") {
            let level = object
                .properties
                .require_int("stage")
                .with_context(|| format!("Node at {:?}", object.position()))?;
            let mut links = HashMap::new();
            for direction in Direction::ALL {
                if let Some(text) = object.properties.text(direction.name()) {
                    links.insert(direction, text.parse::<PathRef>()?);
                }
            }
            nodes.push(Node::new(object.position() + half_tile, level.max(0) as usize, links));
        }

        let Some(start) = nodes.iter().find(|node| node.level == data.current_level) else {
            bail!("No overworld node for level {}", data.current_level);
        };
        let icon = Icon::new(start.center, Icon::load_frames(frames)?, settings);

        info!(
            "Overworld built: {} nodes, {} paths, unlocked {}",
            nodes.len(),
            paths.len(),
            data.unlocked_level
        );
        Ok(Overworld {
            registry,
            nodes,
            paths,
            icon,
            camera: Camera::new(settings.window_size(), None),
            world_width: map.pixel_size(tile).x,
        })
    }

    pub fn update(&mut self, tick: Tick, input: &OverworldInput, data: &mut GameData) -> Option<StageSwitch> {
        let env = Surroundings {
            tick,
            solids: &[],
            target: self.icon.center(),
            world_width: self.world_width,
        };
        for handle in self.registry.handles() {
            if let Some(sprite) = self.registry.get_mut(handle) {
                sprite.update(&env, &mut |_| {});
            }
        }

        self.icon.update(tick.dt);
        if self.icon.is_moving() {
            return None;
        }

        let center = self.icon.center();
        let node = self.nodes.iter().find(|node| node.center == center)?;
        if input.confirm {
            data.current_level = node.level;
            info!("Entering level {}", node.level);
            return Some(StageSwitch::Level);
        }

        let path = input
            .direction()
            .and_then(|direction| node.can_move(direction, data.unlocked_level))?;
        if let Some(points) = self.paths.get(&path.id) {
            if path.reversed {
                self.icon.follow(points.iter().rev().copied());
            } else {
                self.icon.follow(points.iter().copied());
            }
        }
        None
    }

    pub fn draw(&mut self, surface: &dyn Surface) {
        self.camera.follow(self.icon.center());
        let mut items = self.registry.draw_items();
        items.push(self.icon.draw_item());
        self.camera.draw(items, surface);
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
