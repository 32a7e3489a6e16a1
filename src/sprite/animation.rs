use crate::engine::Frame;
use std::rc::Rc;

/// Fractional cursor over a shared frame sequence.
///
/// ┌──────── advance(dt) ────────┐
/// │ cursor += rate * dt         │
/// │ index   = floor(cursor) % n │  looping sprites
/// │ finished: cursor >= n       │  one shot sprites
/// └─────────────────────────────┘
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Rc<[Frame]>,
    cursor: f32,
    rate: f32,
}

impl Animation {
    pub fn new(frames: Rc<[Frame]>, rate: f32) -> Self {
        Animation {
            frames,
            cursor: 0.0,
            rate,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.cursor += self.rate * dt;
    }

    pub fn index(&self) -> usize {
        (self.cursor.max(0.0) as usize)
            .checked_rem(self.frames.len())
            .unwrap_or(0)
    }

    pub fn frame(&self) -> Frame {
        self.frames.get(self.index()).copied().unwrap_or_default()
    }

    /// The cursor ran past the last frame.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len() as f32
    }

    pub fn reset(&mut self) {
        self.cursor = 0.0;
    }

    /// Swaps the sequence, the cursor carries over.
    pub fn set_frames(&mut self, frames: Rc<[Frame]>) {
        self.frames = frames;
    }

    pub fn frames(&self) -> &Rc<[Frame]> {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }
}
