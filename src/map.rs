//! Pre-decoded tile map handed over by the asset pipeline.
//!
//! Layer and object names follow the level editor conventions used by the
//! maps (`Terrain`, `Moving Objects`, `player`, ...). Tile positions are in
//! tiles, object positions and sizes in pixels.

use crate::engine::{Rect, Vec2};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub tile_layers: Vec<TileLayer>,
    #[serde(default)]
    pub object_layers: Vec<ObjectLayer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TileLayer {
    pub name: String,
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MapObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub image: Option<String>,
    /// Polyline points, absolute pixels.
    #[serde(default)]
    pub points: Vec<Vec2>,
    #[serde(default)]
    pub properties: Properties,
}

impl MapObject {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn require_image(&self) -> Result<&str> {
        self.image
            .as_deref()
            .ok_or_else(|| anyhow!("Object '{}' has no image", self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Property {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Free-form key/value properties attached to maps and objects.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Properties(HashMap<String, Property>);

impl Properties {
    pub fn insert(&mut self, key: impl Into<String>, value: Property) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.0.get(key)
    }

    pub fn f32(&self, key: &str) -> Option<f32> {
        match self.0.get(key)? {
            Property::Int(value) => Some(*value as f32),
            Property::Float(value) => Some(*value as f32),
            Property::Text(text) => text.parse().ok(),
            Property::Bool(_) => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Property::Int(value) => Some(*value),
            Property::Float(value) => Some(*value as i64),
            Property::Text(text) => text.parse().ok(),
            Property::Bool(_) => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Property::Bool(value) => Some(*value),
            Property::Int(value) => Some(*value != 0),
            Property::Text(text) => text.parse().ok(),
            Property::Float(_) => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Property::Text(text) => Some(text.clone()),
            Property::Int(value) => Some(value.to_string()),
            Property::Float(value) => Some(value.to_string()),
            Property::Bool(value) => Some(value.to_string()),
        }
    }

    pub fn require_f32(&self, key: &str) -> Result<f32> {
        self.f32(key)
            .ok_or_else(|| anyhow!("Missing numeric property '{}'", key))
    }

    pub fn require_int(&self, key: &str) -> Result<i64> {
        self.int(key)
            .ok_or_else(|| anyhow!("Missing integer property '{}'", key))
    }
}

impl TileMap {
    pub fn tile_layer(&self, name: &str) -> Option<&TileLayer> {
        self.tile_layers.iter().find(|layer| layer.name == name)
    }

    pub fn object_layer(&self, name: &str) -> Option<&ObjectLayer> {
        self.object_layers.iter().find(|layer| layer.name == name)
    }

    /// Tiles of a layer, empty when the map does not have it.
    pub fn tiles(&self, name: &str) -> impl Iterator<Item = &Tile> {
        self.tile_layer(name)
            .into_iter()
            .flat_map(|layer| layer.tiles.iter())
    }

    /// Objects of a layer, empty when the map does not have it.
    pub fn objects(&self, name: &str) -> impl Iterator<Item = &MapObject> {
        self.object_layer(name)
            .into_iter()
            .flat_map(|layer| layer.objects.iter())
    }

    pub fn pixel_size(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "width": 40, "height": 12,
        "properties": { "top_limit": -200, "bg": "sky_tile", "level_unlock": 2 },
        "tile_layers": [ { "name": "Terrain", "tiles": [ { "x": 1, "y": 2, "image": "grass" } ] } ],
        "object_layers": [ { "name": "Moving Objects", "objects": [
            { "name": "spike", "x": 10, "y": 20, "width": 64, "height": 64,
              "properties": { "radius": 120.5, "speed": "90", "end_angle": -1, "inverted": true } }
        ] } ]
    }"#;

    #[test]
    fn reads_layers_and_typed_properties() {
        let map: TileMap = serde_json::from_str(MAP).unwrap();
        assert_eq!(map.pixel_size(64.0), Vec2::new(2560.0, 768.0));
        assert_eq!(map.tiles("Terrain").count(), 1);
        assert_eq!(map.tiles("Platforms").count(), 0);
        assert_eq!(map.properties.f32("top_limit"), Some(-200.0));
        assert_eq!(map.properties.text("bg").as_deref(), Some("sky_tile"));
        assert_eq!(map.properties.int("level_unlock"), Some(2));

        let spike = map.objects("Moving Objects").next().unwrap();
        assert_eq!(spike.properties.f32("radius"), Some(120.5));
        assert_eq!(spike.properties.f32("speed"), Some(90.0));
        assert_eq!(spike.properties.f32("end_angle"), Some(-1.0));
        assert_eq!(spike.properties.bool("inverted"), Some(true));
        assert!(spike.properties.require_f32("start_angle").is_err());
    }
}
