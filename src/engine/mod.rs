pub mod audio;
pub mod geometry;
pub mod input;
pub mod sheet;
pub mod surface;
pub mod timer;

use crate::browser;
use anyhow::{anyhow, Error, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref cast from Javascript type to Rust type, safe here because
    // we create the closures and specify their expected type
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

pub use geometry::{Rect, Vec2};
pub use input::KeyState;
pub use sheet::{Frame, FrameStore, Sheet};
pub use surface::{Effect, Surface};
pub use timer::{Tick, Timer};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState, tick: Tick);
    fn draw(&mut self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
// a backgrounded tab must not replay minutes of simulation
const MAX_ACCUMULATED_DELTA: f32 = FRAME_SIZE * 15.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
    // monotonic simulation clock, one FRAME_SIZE per update
    clock: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let now = browser::now()?;
        let mut game_loop = GameLoop {
            last_frame: now,
            accumulated_delta: 0.0,
            clock: now,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut keystate = KeyState::new();
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut keyevent_receiver);
            game_loop.accumulated_delta = (game_loop.accumulated_delta
                + (perf - game_loop.last_frame) as f32)
                .min(MAX_ACCUMULATED_DELTA);
            while game_loop.accumulated_delta > FRAME_SIZE {
                game_loop.clock += f64::from(FRAME_SIZE);
                game.update(
                    &keystate,
                    Tick::new(FRAME_SIZE / 1000.0, game_loop.clock),
                );
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            if let Some(closure) = f.borrow().as_ref() {
                let _ = browser::request_animation_frame(closure);
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        self.context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x.into(),
                frame.y.into(),
                frame.width.into(),
                frame.height.into(),
                destination.x.into(),
                destination.y.into(),
                destination.width.into(),
                destination.height.into(),
            )
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    /// Binds the atlas every Frame refers to.
    pub fn surface<'a>(&'a self, atlas: &'a HtmlImageElement) -> CanvasSurface<'a> {
        CanvasSurface {
            renderer: self,
            atlas,
        }
    }
}

pub struct CanvasSurface<'a> {
    renderer: &'a Renderer,
    atlas: &'a HtmlImageElement,
}

impl CanvasSurface<'_> {
    fn context(&self) -> &CanvasRenderingContext2d {
        &self.renderer.context
    }
}

#[allow(deprecated)] // set_fill_style / set_stroke_style take JsValue in older web-sys
impl Surface for CanvasSurface<'_> {
    fn fill(&self, color: &str) {
        let canvas = self.context().canvas();
        let (width, height) = canvas
            .map(|canvas| (canvas.width() as f32, canvas.height() as f32))
            .unwrap_or_default();
        self.fill_rect(&Rect::new(0.0, 0.0, width, height), color);
    }

    fn fill_rect(&self, rect: &Rect, color: &str) {
        let context = self.context();
        context.set_fill_style(&JsValue::from_str(color));
        context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    fn stroke_rect(&self, rect: &Rect, color: &str) {
        let context = self.context();
        context.set_stroke_style(&JsValue::from_str(color));
        context.stroke_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    fn draw_line(&self, from: Vec2, to: Vec2, color: &str, width: f32) {
        let context = self.context();
        context.begin_path();
        context.set_stroke_style(&JsValue::from_str(color));
        context.set_line_width(width.into());
        context.move_to(from.x.into(), from.y.into());
        context.line_to(to.x.into(), to.y.into());
        context.stroke();
    }

    fn blit(&self, frame: &Frame, position: Vec2, effect: Effect) {
        let context = self.context();
        let size = frame.size();
        context.save();
        // flip around the destination center
        let _ = context.translate(
            (position.x + size.x / 2.0).into(),
            (position.y + size.y / 2.0).into(),
        );
        let _ = context.scale(
            if frame.flip_x { -1.0 } else { 1.0 },
            if frame.flip_y { -1.0 } else { 1.0 },
        );
        if effect == Effect::Silhouette {
            context.set_filter("brightness(0) invert(1)");
        }
        self.renderer.draw_image(
            self.atlas,
            &frame.source,
            &Rect::new(-size.x / 2.0, -size.y / 2.0, size.x, size.y),
        );
        context.restore();
    }

    fn draw_text(&self, text: &str, position: Vec2, color: &str) {
        let context = self.context();
        context.set_font("24px monospace");
        context.set_text_baseline("top");
        context.set_fill_style(&JsValue::from_str(color));
        context
            .fill_text(text, position.x.into(), position.y.into())
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the image load result
    rx.await??;

    Ok(image)
}
