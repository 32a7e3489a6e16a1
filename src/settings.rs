//! Immutable game configuration.
//!
//! Built once at start up (defaults, or `settings.json` fetched by the
//! browser front end) and handed down as `Rc<Settings>`. Every section is
//! `#[serde(default)]`, so a partial JSON file only overrides what it names.

use crate::engine::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub window_width: f32,
    pub window_height: f32,
    pub tile_size: f32,
    /// Animation frames per second.
    pub animation_speed: f32,
    pub layers: Layers,
    pub player: PlayerSettings,
    pub enemies: EnemySettings,
    pub sky: SkySettings,
    pub rules: Rules,
    pub overworld: OverworldSettings,
    pub assets: AssetPaths,
}

impl Settings {
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(self.window_width, self.window_height)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            window_width: 1280.0,
            window_height: 720.0,
            tile_size: 64.0,
            animation_speed: 5.0,
            layers: Layers::default(),
            player: PlayerSettings::default(),
            enemies: EnemySettings::default(),
            sky: SkySettings::default(),
            rules: Rules::default(),
            overworld: OverworldSettings::default(),
            assets: AssetPaths::default(),
        }
    }
}

/// Draw order keys, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Layers {
    pub bg: i32,
    pub clouds: i32,
    pub bg_tiles: i32,
    pub path: i32,
    pub bg_details: i32,
    pub main: i32,
    pub water: i32,
    pub fg: i32,
}

impl Default for Layers {
    fn default() -> Self {
        Layers {
            bg: 0,
            clouds: 1,
            bg_tiles: 2,
            path: 3,
            bg_details: 4,
            main: 5,
            water: 6,
            fg: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub speed: f32,
    pub gravity: f32,
    pub jump_power: f32,
    /// Total shrink of the visual rect, split evenly on both sides.
    pub hitbox_inset: Vec2,
    pub wall_jump_ms: f64,
    pub wall_jump_block_ms: f64,
    pub platform_skip_ms: f64,
    pub attack_ms: f64,
    pub hit_ms: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        PlayerSettings {
            speed: 200.0,
            gravity: 1350.0,
            jump_power: 800.0,
            hitbox_inset: Vec2::new(76.0, 36.0),
            wall_jump_ms: 500.0,
            wall_jump_block_ms: 300.0,
            platform_skip_ms: 100.0,
            attack_ms: 600.0,
            hit_ms: 450.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnemySettings {
    pub tooth_speed: f32,
    pub shell_range: f32,
    pub shell_band: f32,
    pub shell_cooldown_ms: f64,
    pub shell_fire_frame: usize,
    pub pearl_speed: f32,
    /// Horizontal distance from the shell center to the pearl spawn.
    pub pearl_offset: f32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        EnemySettings {
            tooth_speed: 200.0,
            shell_range: 500.0,
            shell_band: 40.0,
            shell_cooldown_ms: 2500.0,
            shell_fire_frame: 3,
            pearl_speed: 150.0,
            pearl_offset: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SkySettings {
    pub sky_color: String,
    pub sea_color: String,
    pub horizon_color: String,
    pub horizon_width: f32,
    pub large_cloud_speed: f32,
    pub small_cloud_interval_ms: f64,
    pub small_cloud_min_speed: f32,
    pub small_cloud_max_speed: f32,
    pub initial_small_clouds: usize,
}

impl Default for SkySettings {
    fn default() -> Self {
        SkySettings {
            sky_color: "#ddc6a1".to_string(),
            sea_color: "#92a9ce".to_string(),
            horizon_color: "#f5f1de".to_string(),
            horizon_width: 4.0,
            large_cloud_speed: 50.0,
            small_cloud_interval_ms: 2500.0,
            small_cloud_min_speed: 50.0,
            small_cloud_max_speed: 120.0,
            initial_small_clouds: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Rules {
    pub starting_health: i32,
    pub coins_per_life: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            starting_health: 5,
            coins_per_life: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverworldSettings {
    pub icon_speed: f32,
}

impl Default for OverworldSettings {
    fn default() -> Self {
        OverworldSettings { icon_speed: 400.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetPaths {
    pub sheet: String,
    pub atlas: String,
    pub overworld: String,
    pub levels: Vec<String>,
    pub audio: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        AssetPaths {
            sheet: "atlas.json".to_string(),
            atlas: "atlas.png".to_string(),
            overworld: "maps/overworld.json".to_string(),
            levels: (0..=5).map(|level| format!("maps/{}.json", level)).collect(),
            audio: "audio".to_string(),
        }
    }
}
