use super::animation::Animation;
use super::{Behavior, Sprite};
use crate::engine::{Frame, Rect, Vec2};
use anyhow::{anyhow, Error};
use std::rc::Rc;
use std::str::FromStr;

/// Collectibles placed on the `Items` map layer.
///
/// ┌──────────┬────────────────┐
/// │ kind     │ reward         │
/// ├──────────┼────────────────┤
/// │ silver   │ 1 coin         │
/// │ gold     │ 5 coins        │
/// │ diamond  │ 20 coins       │
/// │ skull    │ 50 coins       │
/// │ potion   │ 1 health       │
/// └──────────┴────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Gold,
    Silver,
    Diamond,
    Skull,
    Potion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    Coins(u32),
    Health(i32),
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Gold => "gold",
            ItemKind::Silver => "silver",
            ItemKind::Diamond => "diamond",
            ItemKind::Skull => "skull",
            ItemKind::Potion => "potion",
        }
    }

    pub fn reward(&self) -> Reward {
        match self {
            ItemKind::Gold => Reward::Coins(5),
            ItemKind::Silver => Reward::Coins(1),
            ItemKind::Diamond => Reward::Coins(20),
            ItemKind::Skull => Reward::Coins(50),
            ItemKind::Potion => Reward::Health(1),
        }
    }
}

impl FromStr for ItemKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "gold" => Ok(ItemKind::Gold),
            "silver" => Ok(ItemKind::Silver),
            "diamond" => Ok(ItemKind::Diamond),
            "skull" => Ok(ItemKind::Skull),
            "potion" => Ok(ItemKind::Potion),
            other => Err(anyhow!("Unknown item '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    kind: ItemKind,
    animation: Animation,
}

impl Item {
    pub fn sprite(center: Vec2, frames: Rc<[Frame]>, kind: ItemKind, depth: i32, rate: f32) -> Sprite {
        let first = frames.first().copied().unwrap_or_default();
        let item = Item {
            kind,
            animation: Animation::new(frames, rate),
        };
        Sprite::new(
            Rect::from_center(center, first.size()),
            first,
            depth,
            Behavior::Item(item),
        )
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn update(&mut self, dt: f32) {
        self.animation.advance(dt);
    }

    pub fn frame(&self) -> Frame {
        self.animation.frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_map_names() {
        for kind in [
            ItemKind::Gold,
            ItemKind::Silver,
            ItemKind::Diamond,
            ItemKind::Skull,
            ItemKind::Potion,
        ] {
            assert_eq!(kind.name().parse::<ItemKind>().unwrap(), kind);
        }
        assert!("ruby".parse::<ItemKind>().is_err());
    }

    #[test]
    fn rewards() {
        assert_eq!(ItemKind::Diamond.reward(), Reward::Coins(20));
        assert_eq!(ItemKind::Potion.reward(), Reward::Health(1));
    }
}
