use super::geometry::{Rect, Vec2};
use anyhow::{anyhow, ensure, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;

/// Texture-packer style sheet, fetched as JSON next to the atlas image.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Sheet {
    pub frames: HashMap<String, Cell>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Cell {
    pub frame: SheetRect,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct SheetRect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

impl From<SheetRect> for Rect {
    fn from(rect: SheetRect) -> Self {
        Rect::new(
            rect.x.into(),
            rect.y.into(),
            rect.w.into(),
            rect.h.into(),
        )
    }
}

/// One image: a sub rectangle of the atlas plus presentation flips.
/// Flips are applied by the renderer at blit time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub source: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Frame {
    pub fn new(source: Rect) -> Self {
        Frame {
            source,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.source.size()
    }

    /// Mirrored copy, toggling the requested axes.
    pub fn flipped(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_x ^= horizontal;
        self.flip_y ^= vertical;
        self
    }
}

/// Mirrored copy of a whole sequence, the stored frames stay untouched.
pub fn mirrored(frames: &[Frame], horizontal: bool, vertical: bool) -> Rc<[Frame]> {
    frames
        .iter()
        .map(|frame| frame.flipped(horizontal, vertical))
        .collect()
}

/// Ordered frame sequences keyed by symbolic name ("player/idle", "pearl").
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    sequences: HashMap<String, Rc<[Frame]>>,
}

impl FrameStore {
    pub fn new() -> Self {
        FrameStore::default()
    }

    /// Groups `"<sequence>/<index>"` keys into ordered sequences, a key
    /// without a numeric suffix becomes a single frame sequence.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut grouped: HashMap<String, Vec<(usize, Frame)>> = HashMap::new();
        for (key, cell) in &sheet.frames {
            let frame = Frame::new(cell.frame.into());
            let (name, index) = match key.rsplit_once('/') {
                Some((name, index)) => match index.parse::<usize>() {
                    Ok(index) => (name.to_string(), index),
                    Err(_) => (key.clone(), 0),
                },
                None => (key.clone(), 0),
            };
            grouped.entry(name).or_default().push((index, frame));
        }

        let sequences = grouped
            .into_iter()
            .map(|(name, mut frames)| {
                frames.sort_by_key(|(index, _)| *index);
                let frames: Rc<[Frame]> = frames.into_iter().map(|(_, frame)| frame).collect();
                (name, frames)
            })
            .collect();
        FrameStore { sequences }
    }

    pub fn insert(&mut self, name: impl Into<String>, frames: Vec<Frame>) {
        self.sequences.insert(name.into(), frames.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }

    /// Missing or empty sequences are an asset/map mismatch and fail loudly.
    pub fn sequence(&self, name: &str) -> Result<Rc<[Frame]>> {
        let frames = self
            .sequences
            .get(name)
            .ok_or_else(|| anyhow!("No frames named '{}' in the sprite sheet", name))?;
        ensure!(!frames.is_empty(), "Frame sequence '{}' is empty", name);
        Ok(Rc::clone(frames))
    }

    pub fn frame(&self, name: &str) -> Result<Frame> {
        Ok(self.sequence(name)?[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: i16) -> Cell {
        Cell {
            frame: SheetRect {
                x,
                y: 0,
                w: 64,
                h: 32,
            },
        }
    }

    #[test]
    fn groups_numbered_keys_in_order() {
        let mut sheet = Sheet::default();
        for (key, x) in [
            ("player/idle/2", 2),
            ("player/idle/10", 10),
            ("player/idle/0", 0),
            ("pearl", 99),
        ] {
            sheet.frames.insert(key.to_string(), cell(x));
        }

        let store = FrameStore::from_sheet(&sheet);
        let idle = store.sequence("player/idle").unwrap();
        let xs: Vec<f32> = idle.iter().map(|frame| frame.source.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 10.0]);
        assert_eq!(store.frame("pearl").unwrap().size(), Vec2::new(64.0, 32.0));
    }

    #[test]
    fn missing_sequence_is_an_error() {
        let store = FrameStore::new();
        let err = store.sequence("tooth").unwrap_err();
        assert!(err.to_string().contains("tooth"));
    }

    #[test]
    fn mirrored_leaves_source_frames_alone() {
        let frames = vec![Frame::new(Rect::new(0.0, 0.0, 8.0, 8.0))];
        let flipped = mirrored(&frames, true, false);
        assert!(flipped[0].flip_x);
        assert!(!frames[0].flip_x);
        assert!(!flipped[0].flipped(true, false).flip_x);
    }
}
