use crate::data::Hud;
use crate::engine::{Effect, Frame, Surface, Tick, Timer, Vec2};
use crate::sprite::animation::Animation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

const HEART_MARGIN: f32 = 10.0;
const COIN_TEXT: Vec2 = Vec2::new(16.0, 34.0);
const COIN_TEXT_HEIGHT: f32 = 24.0;
const COIN_DISPLAY_MS: f64 = 1000.0;
// one in this many ticks wakes an idle heart up
const HEART_WAKE_ODDS: u32 = 500;
const TEXT_COLOR: &str = "#33323d";

#[derive(Debug, Clone)]
struct Heart {
    position: Vec2,
    animation: Animation,
    active: bool,
}

impl Heart {
    fn update(&mut self, dt: f32, rng: &mut StdRng) {
        if self.active {
            self.animation.advance(dt);
            if self.animation.is_finished() {
                self.animation.reset();
                self.active = false;
            }
        } else if rng.gen_range(0..=HEART_WAKE_ODDS) == 1 {
            self.active = true;
        }
    }
}

/// Hearts in the top left corner plus a coin counter that shows up for a
/// second after every change.
pub struct Ui {
    heart: Rc<[Frame]>,
    hearts: Vec<Heart>,
    coin: Frame,
    coins: u32,
    coin_timer: Timer,
    // coins changed since the last update, the timer starts on the next tick
    coins_pending: bool,
    animation_speed: f32,
    rng: StdRng,
}

impl Ui {
    pub fn new(heart: Rc<[Frame]>, coin: Frame, animation_speed: f32, seed: u64) -> Self {
        Ui {
            heart,
            hearts: Vec::new(),
            coin,
            coins: 0,
            coin_timer: Timer::new(COIN_DISPLAY_MS),
            coins_pending: false,
            animation_speed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn heart_positions(&self) -> Vec<Vec2> {
        self.hearts.iter().map(|heart| heart.position).collect()
    }

    pub fn is_showing_coins(&self) -> bool {
        self.coin_timer.is_active() || self.coins_pending
    }
}

impl Hud for Ui {
    fn on_health_changed(&mut self, health: i32) {
        let width = self.heart.first().map(|frame| frame.size().x).unwrap_or_default();
        self.hearts = (0..health.max(0))
            .map(|i| Heart {
                position: Vec2::new(HEART_MARGIN + i as f32 * (width + HEART_MARGIN), HEART_MARGIN),
                animation: Animation::new(Rc::clone(&self.heart), self.animation_speed),
                active: false,
            })
            .collect();
    }

    fn on_coins_changed(&mut self, coins: u32) {
        self.coins = coins;
        self.coins_pending = true;
    }

    fn update(&mut self, tick: Tick) {
        if self.coins_pending {
            self.coin_timer.start(tick.now);
            self.coins_pending = false;
        }
        self.coin_timer.update(tick.now);
        for heart in self.hearts.iter_mut() {
            heart.update(tick.dt, &mut self.rng);
        }
    }

    fn draw(&self, surface: &dyn Surface) {
        for heart in &self.hearts {
            surface.blit(&heart.animation.frame(), heart.position, Effect::None);
        }
        if self.coin_timer.is_active() {
            surface.draw_text(&self.coins.to_string(), COIN_TEXT, TEXT_COLOR);
            let anchor = COIN_TEXT + Vec2::new(0.0, COIN_TEXT_HEIGHT);
            surface.blit(&self.coin, anchor - self.coin.size() / 2.0, Effect::None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::surface::recording::{DrawCall, RecordingSurface};
    use crate::engine::Rect;

    fn ui() -> Ui {
        let heart: Rc<[Frame]> = (0..4)
            .map(|i| Frame::new(Rect::new(i as f32 * 34.0, 0.0, 34.0, 30.0)))
            .collect();
        Ui::new(heart, Frame::new(Rect::new(0.0, 40.0, 20.0, 20.0)), 5.0, 11)
    }

    #[test]
    fn one_heart_per_health_point() {
        let mut ui = ui();
        ui.on_health_changed(3);
        assert_eq!(
            ui.heart_positions(),
            vec![Vec2::new(10.0, 10.0), Vec2::new(54.0, 10.0), Vec2::new(98.0, 10.0)]
        );
        ui.on_health_changed(-2);
        assert!(ui.heart_positions().is_empty());
    }

    #[test]
    fn coin_counter_shows_for_a_second() {
        let mut ui = ui();
        let surface = RecordingSurface::default();
        ui.on_coins_changed(42);
        ui.update(Tick::new(0.1, 5000.0));
        ui.draw(&surface);
        assert!(surface
            .calls
            .borrow()
            .contains(&DrawCall::Text("42".to_string(), Vec2::new(16.0, 34.0))));
        assert_eq!(surface.blits(), vec![(Frame::new(Rect::new(0.0, 40.0, 20.0, 20.0)), Vec2::new(6.0, 48.0))]);

        ui.update(Tick::new(0.1, 6000.0));
        assert!(!ui.is_showing_coins());
    }

    #[test]
    fn idle_hearts_wake_up_now_and_then() {
        let mut ui = ui();
        ui.on_health_changed(5);
        let mut tick = Tick::new(1.0 / 60.0, 0.0);
        let mut woke = false;
        for _ in 0..10_000 {
            tick = tick.next();
            ui.update(tick);
            woke |= ui.hearts.iter().any(|heart| heart.active);
        }
        assert!(woke);
    }
}
