use super::geometry::{Rect, Vec2};
use super::sheet::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    /// White silhouette, used for the hit flash.
    Silhouette,
}

/// Anything the game can draw onto. Positions are screen pixels, the
/// camera has already applied its offset.
pub trait Surface {
    fn fill(&self, color: &str);
    fn fill_rect(&self, rect: &Rect, color: &str);
    fn stroke_rect(&self, rect: &Rect, color: &str);
    fn draw_line(&self, from: Vec2, to: Vec2, color: &str, width: f32);
    fn blit(&self, frame: &Frame, position: Vec2, effect: Effect);
    fn draw_text(&self, text: &str, position: Vec2, color: &str);
}

/// Outline a rectangle in debug builds.
#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, surface: &dyn Surface);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, surface: &dyn Surface) {
        surface.stroke_rect(self, "#ff0000");
    }
}

#[cfg(test)]
pub mod recording {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Fill(String),
        FillRect(Rect, String),
        StrokeRect(Rect),
        Line(Vec2, Vec2),
        Blit(Frame, Vec2, Effect),
        Text(String, Vec2),
    }

    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: RefCell<Vec<DrawCall>>,
    }

    impl RecordingSurface {
        pub fn blits(&self) -> Vec<(Frame, Vec2)> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|call| match call {
                    DrawCall::Blit(frame, position, _) => Some((*frame, *position)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn fill(&self, color: &str) {
            self.calls.borrow_mut().push(DrawCall::Fill(color.to_string()));
        }

        fn fill_rect(&self, rect: &Rect, color: &str) {
            self.calls
                .borrow_mut()
                .push(DrawCall::FillRect(*rect, color.to_string()));
        }

        fn stroke_rect(&self, rect: &Rect, _color: &str) {
            self.calls.borrow_mut().push(DrawCall::StrokeRect(*rect));
        }

        fn draw_line(&self, from: Vec2, to: Vec2, _color: &str, _width: f32) {
            self.calls.borrow_mut().push(DrawCall::Line(from, to));
        }

        fn blit(&self, frame: &Frame, position: Vec2, effect: Effect) {
            self.calls
                .borrow_mut()
                .push(DrawCall::Blit(*frame, position, effect));
        }

        fn draw_text(&self, text: &str, position: Vec2, _color: &str) {
            self.calls
                .borrow_mut()
                .push(DrawCall::Text(text.to_string(), position));
        }
    }
}
