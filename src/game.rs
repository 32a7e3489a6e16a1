use crate::browser;
use crate::data::{GameData, Hud};
use crate::engine::audio::{AudioCues, Silence, SoundSink};
use crate::engine::{self, FrameStore, Game, KeyState, Rect, Renderer, Sheet, Surface, Tick, Vec2};
use crate::hud::Ui;
use crate::level::{Level, StageSwitch};
use crate::map::TileMap;
use crate::overworld::{Overworld, OverworldInput};
use crate::settings::Settings;
use crate::sprite::player::Input;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::join;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;
use web_sys::HtmlImageElement;

const SETTINGS_PATH: &str = "settings.json";
const GAME_OVER_TEXT: &str = "GAME OVER";
const GAME_OVER_BACKGROUND: &str = "#33323d";
const GAME_OVER_COLOR: &str = "#f5f1de";

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐  update  ┌─────────────┐  update  ┌─────────────┐    │
/// │    │  GameLoop   ├─────────►│ Platformer  ├─────────►│  Adventure  │    │
/// │    │  (engine)   │  Tick    │  Loaded     │  keys    │  Stage      │    │
/// │    └─────────────┘          └─────────────┘          └──────┬──────┘    │
/// │                                                             │           │
/// │                         ┌────────────────┬──────────────────┤           │
/// │                         ▼                ▼                  ▼           │
/// │                   ┌───────────┐    ┌───────────┐     ┌────────────┐     │
/// │                   │ Overworld │    │   Level   │     │  GameOver  │     │
/// │                   └─────┬─────┘    └─────┬─────┘     └────────────┘     │
/// │                         │  StageSwitch   │                              │
/// │                         └───────►────────┘                              │
/// │                                                                         │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │                                                                         │
/// │  1. GameLoop hands a fixed Tick and the KeyState to Platformer          │
/// │  2. Adventure maps keys to the current stage's input                    │
/// │  3. The stage updates and may ask for a StageSwitch                     │
/// │  4. switch() applies unlocks / health loss and builds the next stage    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum Platformer {
    /// Waiting on settings, sprite sheet, atlas and maps
    Loading,

    /// Everything fetched, the adventure is running
    Loaded(Session),
}

pub struct Session {
    adventure: Adventure,
    atlas: HtmlImageElement,
}

impl Platformer {
    pub fn new() -> Self {
        Platformer::Loading
    }

    async fn load_settings() -> Settings {
        browser::fetch_json::<Settings>(SETTINGS_PATH)
            .await
            .unwrap_or_else(|err| {
                warn!("Using default settings, {} not loaded : {:#}", SETTINGS_PATH, err);
                Settings::default()
            })
    }

    async fn load_map(path: &str) -> Result<TileMap> {
        browser::fetch_json::<TileMap>(path)
            .await
            .with_context(|| format!("Failed to load map from : {}", path))
    }
}

impl Default for Platformer {
    fn default() -> Self {
        Platformer::new()
    }
}

#[async_trait(?Send)]
impl Game for Platformer {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Platformer::Loading => {
                let settings = Rc::new(Self::load_settings().await);
                let assets = &settings.assets;

                // every resource is fetched at the same time, the slowest one wins
                let (sheet, atlas, overworld, levels) = join!(
                    browser::fetch_json::<Sheet>(&assets.sheet),
                    engine::load_image(&assets.atlas),
                    Self::load_map(&assets.overworld),
                    try_join_all(assets.levels.iter().map(|path| Self::load_map(path))),
                );
                let sheet = sheet.with_context(|| format!("Failed to load sprite sheet from : {}", assets.sheet))?;
                let atlas = atlas.with_context(|| format!("Failed to load atlas image from : {}", assets.atlas))?;
                let frames = FrameStore::from_sheet(&sheet);

                let sounds: Box<dyn SoundSink> = match AudioCues::load(&assets.audio) {
                    Ok(cues) => Box::new(cues),
                    Err(err) => {
                        warn!("Playing without sound : {:#}", err);
                        Box::new(Silence)
                    }
                };
                let seed = rand::random::<u64>();
                let hud = Ui::new(
                    frames.sequence("ui/heart")?,
                    frames.frame("ui/coin")?,
                    settings.animation_speed,
                    seed,
                );

                let adventure = Adventure::new(
                    Rc::clone(&settings),
                    frames,
                    overworld?,
                    levels?,
                    Box::new(hud),
                    sounds,
                    seed,
                )?;
                Ok(Box::new(Platformer::Loaded(Session { adventure, atlas })))
            }
            Platformer::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState, tick: Tick) {
        if let Platformer::Loaded(session) = self {
            session.adventure.update(keystate, tick);
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let Platformer::Loaded(session) = self {
            let window = session.adventure.settings.window_size();
            renderer.clear(&Rect::new(0.0, 0.0, window.x, window.y));
            let surface = renderer.surface(&session.atlas);
            session.adventure.draw(&surface);
        }
    }
}

pub enum Stage {
    Overworld(Overworld),
    Level(Box<Level>),
    GameOver,
}

/// Everything that survives between stages plus the stage being played.
pub struct Adventure {
    settings: Rc<Settings>,
    frames: FrameStore,
    overworld_map: TileMap,
    levels: Vec<TileMap>,
    data: GameData,
    stage: Stage,
    sounds: Box<dyn SoundSink>,
    rng: StdRng,
}

impl Adventure {
    pub fn new(
        settings: Rc<Settings>,
        frames: FrameStore,
        overworld_map: TileMap,
        levels: Vec<TileMap>,
        hud: Box<dyn Hud>,
        sounds: Box<dyn SoundSink>,
        seed: u64,
    ) -> Result<Self> {
        let data = GameData::new(&settings.rules, hud);
        let mut rng = StdRng::seed_from_u64(seed);
        let overworld = Overworld::build(&overworld_map, &frames, &settings, &data, rng.gen())?;
        info!("Adventure ready with {} levels", levels.len());
        Ok(Adventure {
            settings,
            frames,
            overworld_map,
            levels,
            data,
            stage: Stage::Overworld(overworld),
            sounds,
            rng,
        })
    }

    pub fn update(&mut self, keystate: &KeyState, tick: Tick) {
        let switch = match &mut self.stage {
            Stage::Overworld(overworld) => {
                overworld.update(tick, &overworld_input(keystate), &mut self.data)
            }
            Stage::Level(level) => level.update(
                tick,
                &level_input(keystate),
                &mut self.data,
                self.sounds.as_ref(),
            ),
            Stage::GameOver => return,
        };
        self.data.hud_mut().update(tick);
        if self.data.is_dead() {
            info!("Game over");
            self.stage = Stage::GameOver;
            return;
        }
        if let Some(target) = switch {
            self.switch(target);
        }
    }

    /// Leaves the current stage. Returning from a level with `unlock == 0`
    /// means the level was lost and costs one health.
    pub fn switch(&mut self, target: StageSwitch) {
        match target {
            StageSwitch::Level => match self.build_level() {
                Ok(level) => {
                    info!("Starting level {}", self.data.current_level);
                    self.stage = Stage::Level(Box::new(level));
                }
                Err(err) => error!("Could not start level {} : {:#}", self.data.current_level, err),
            },
            StageSwitch::Overworld { unlock } => {
                if unlock > 0 {
                    self.data.unlock(unlock);
                } else {
                    self.data.change_health(-1);
                }
                if self.data.is_dead() {
                    info!("Game over");
                    self.stage = Stage::GameOver;
                    return;
                }
                let seed = self.rng.gen();
                match Overworld::build(&self.overworld_map, &self.frames, &self.settings, &self.data, seed) {
                    Ok(overworld) => self.stage = Stage::Overworld(overworld),
                    Err(err) => {
                        error!("Could not rebuild the overworld : {:#}", err);
                        self.stage = Stage::GameOver;
                    }
                }
            }
        }
    }

    fn build_level(&mut self) -> Result<Level> {
        let level = self.data.current_level;
        let map = self
            .levels
            .get(level)
            .ok_or_else(|| anyhow!("No map for level {}", level))?;
        Level::build(map, &self.frames, Rc::clone(&self.settings), self.rng.gen())
    }

    pub fn draw(&mut self, surface: &dyn Surface) {
        match &mut self.stage {
            Stage::Overworld(overworld) => overworld.draw(surface),
            Stage::Level(level) => level.draw(surface),
            Stage::GameOver => {
                surface.fill(GAME_OVER_BACKGROUND);
                let window = self.settings.window_size();
                surface.draw_text(GAME_OVER_TEXT, window / 2.0 - Vec2::new(64.0, 12.0), GAME_OVER_COLOR);
                return;
            }
        }
        self.data.hud().draw(surface);
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }
}

fn level_input(keys: &KeyState) -> Input {
    Input {
        left: keys.any_pressed(&["ArrowLeft", "KeyA"]),
        right: keys.any_pressed(&["ArrowRight", "KeyD"]),
        down: keys.any_pressed(&["ArrowDown", "KeyS"]),
        jump: keys.is_pressed("Space"),
        attack: keys.any_pressed(&["KeyK", "KeyX"]),
    }
}

fn overworld_input(keys: &KeyState) -> OverworldInput {
    OverworldInput {
        up: keys.is_pressed("ArrowUp"),
        down: keys.is_pressed("ArrowDown"),
        left: keys.is_pressed("ArrowLeft"),
        right: keys.is_pressed("ArrowRight"),
        confirm: keys.is_pressed("Enter"),
    }
}
