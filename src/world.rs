//! Arena of sprites with stable handles and per category membership.
//!
//! ┌──────────────── SpriteRegistry ────────────────┐
//! │ slots      [ s0 | s1 | -- | s3 | ... ]         │  generation per slot
//! │ Solid      { h0, h3 }                          │
//! │ SemiSolid  { h1 }                              │  a sprite may sit in
//! │ Damaging   { h3, ... }                         │  several categories
//! │ Item / Pearl / Tooth ...                       │
//! └────────────────────────────────────────────────┘
//!
//! Removing a sprite bumps its slot generation, so stale handles held in a
//! snapshot simply stop resolving.

use crate::camera::DrawItem;
use crate::engine::{Rect, Vec2};
use crate::sprite::Sprite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Solid,
    SemiSolid,
    Damaging,
    Item,
    Pearl,
    Tooth,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Solid,
        Category::SemiSolid,
        Category::Damaging,
        Category::Item,
        Category::Pearl,
        Category::Tooth,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Collision view of a sprite, copied out before the player moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub handle: SpriteHandle,
    pub rect: Rect,
    pub last_rect: Rect,
    /// Present for sprites that carry whatever stands on them.
    pub velocity: Option<Vec2>,
}

impl Collider {
    pub fn is_mover(&self) -> bool {
        self.velocity.is_some()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<(u64, Sprite)>,
}

#[derive(Debug, Default)]
pub struct SpriteRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_sequence: u64,
    categories: [Vec<SpriteHandle>; 6],
    len: usize,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        SpriteRegistry::default()
    }

    pub fn insert(&mut self, sprite: Sprite, categories: &[Category]) -> SpriteHandle {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some((sequence, sprite));
                SpriteHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some((sequence, sprite)),
                });
                SpriteHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        for category in categories {
            let members = &mut self.categories[category.slot()];
            if !members.contains(&handle) {
                members.push(handle);
            }
        }
        self.len += 1;
        handle
    }

    /// Kills a sprite: it leaves every category at once.
    pub fn remove(&mut self, handle: SpriteHandle) -> Option<Sprite> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let (_, sprite) = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        for members in self.categories.iter_mut() {
            members.retain(|member| *member != handle);
        }
        self.len -= 1;
        Some(sprite)
    }

    fn entry(&self, handle: SpriteHandle) -> Option<&(u64, Sprite)> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub fn get(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.entry(handle).map(|(_, sprite)| sprite)
    }

    pub fn get_mut(&mut self, handle: SpriteHandle) -> Option<&mut Sprite> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
            .map(|(_, sprite)| sprite)
    }

    pub fn contains(&self, handle: SpriteHandle) -> bool {
        self.entry(handle).is_some()
    }

    pub fn is_in(&self, handle: SpriteHandle, category: Category) -> bool {
        self.categories[category.slot()].contains(&handle)
    }

    /// Every live sprite in insertion order. A copy, safe to hold while
    /// sprites are removed.
    pub fn handles(&self) -> Vec<SpriteHandle> {
        let mut live: Vec<(u64, SpriteHandle)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.entry.as_ref().map(|(sequence, _)| {
                    (
                        *sequence,
                        SpriteHandle {
                            index: index as u32,
                            generation: slot.generation,
                        },
                    )
                })
            })
            .collect();
        live.sort_by_key(|(sequence, _)| *sequence);
        live.into_iter().map(|(_, handle)| handle).collect()
    }

    pub fn handles_in(&self, category: Category) -> Vec<SpriteHandle> {
        self.categories[category.slot()].clone()
    }

    pub fn rects_in(&self, category: Category) -> Vec<Rect> {
        self.categories[category.slot()]
            .iter()
            .filter_map(|handle| self.get(*handle))
            .map(|sprite| sprite.rect)
            .collect()
    }

    pub fn colliders_in(&self, category: Category) -> Vec<Collider> {
        self.categories[category.slot()]
            .iter()
            .filter_map(|handle| {
                self.get(*handle).map(|sprite| Collider {
                    handle: *handle,
                    rect: sprite.rect,
                    last_rect: sprite.last_rect,
                    velocity: sprite.velocity(),
                })
            })
            .collect()
    }

    /// Back to front: by depth, ties keep insertion order.
    pub fn draw_items(&self) -> Vec<DrawItem> {
        let mut entries: Vec<&(u64, Sprite)> = self
            .slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .collect();
        entries.sort_by_key(|(sequence, sprite)| (sprite.depth, *sequence));
        entries
            .into_iter()
            .map(|(_, sprite)| sprite.draw_item())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Frame;

    fn tile(x: f32, depth: i32) -> Sprite {
        Sprite::fixed(
            Vec2::new(x, 0.0),
            Frame::new(Rect::new(x, 0.0, 64.0, 64.0)),
            depth,
        )
    }

    #[test]
    fn removal_drops_every_membership() {
        let mut registry = SpriteRegistry::new();
        let spike = registry.insert(tile(0.0, 5), &[Category::Solid, Category::Damaging]);
        let floor = registry.insert(tile(64.0, 5), &[Category::Solid]);

        assert!(registry.is_in(spike, Category::Damaging));
        assert_eq!(registry.rects_in(Category::Solid).len(), 2);

        assert!(registry.remove(spike).is_some());
        assert!(!registry.contains(spike));
        assert!(!registry.is_in(spike, Category::Solid));
        assert!(registry.handles_in(Category::Damaging).is_empty());
        assert_eq!(registry.handles(), vec![floor]);
        assert!(registry.remove(spike).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn stale_handles_do_not_resolve_after_slot_reuse() {
        let mut registry = SpriteRegistry::new();
        let first = registry.insert(tile(0.0, 1), &[]);
        registry.remove(first);
        let second = registry.insert(tile(10.0, 1), &[]);

        assert!(registry.get(first).is_none());
        assert_eq!(registry.get(second).map(|sprite| sprite.rect.x), Some(10.0));
    }

    #[test]
    fn snapshot_survives_removal_during_iteration() {
        let mut registry = SpriteRegistry::new();
        for i in 0..5 {
            registry.insert(tile(i as f32, 1), &[Category::Item]);
        }
        for handle in registry.handles_in(Category::Item) {
            registry.remove(handle);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn draw_items_sort_by_depth_then_insertion() {
        let mut registry = SpriteRegistry::new();
        registry.insert(tile(1.0, 7), &[]);
        registry.insert(tile(2.0, 2), &[]);
        let reused = registry.insert(tile(3.0, 5), &[]);
        registry.insert(tile(4.0, 2), &[]);
        registry.remove(reused);
        registry.insert(tile(5.0, 5), &[]);
        registry.insert(tile(6.0, 5), &[]);

        let xs: Vec<f32> = registry
            .draw_items()
            .iter()
            .map(|item| item.position.x)
            .collect();
        assert_eq!(xs, vec![2.0, 4.0, 5.0, 6.0, 1.0]);
    }

    #[test]
    fn colliders_report_movers() {
        use crate::sprite::moving::{Axis, MovingPlatform};

        let mut registry = SpriteRegistry::new();
        let frames: std::rc::Rc<[Frame]> = vec![Frame::default()].into();
        let platform = MovingPlatform::sprite(
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            frames,
            Axis::X,
            50.0,
            false,
            5,
            5.0,
        );
        registry.insert(platform, &[Category::SemiSolid]);
        registry.insert(tile(0.0, 5), &[Category::SemiSolid]);

        let movers: Vec<bool> = registry
            .colliders_in(Category::SemiSolid)
            .iter()
            .map(Collider::is_mover)
            .collect();
        assert_eq!(movers, vec![true, false]);
    }
}
