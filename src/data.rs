use crate::engine::{Surface, Tick};
use crate::settings::Rules;
use log::info;

/// Observer of the values the HUD shows. Notified synchronously on every
/// change, the renderer side gets its own `update`/`draw` hooks.
pub trait Hud {
    fn on_health_changed(&mut self, health: i32);
    fn on_coins_changed(&mut self, coins: u32);
    fn update(&mut self, _tick: Tick) {}
    fn draw(&self, _surface: &dyn Surface) {}
}

/// State that outlives a single level.
pub struct GameData {
    coins: u32,
    health: i32,
    pub current_level: usize,
    pub unlocked_level: usize,
    coins_per_life: u32,
    hud: Box<dyn Hud>,
}

impl GameData {
    pub fn new(rules: &Rules, mut hud: Box<dyn Hud>) -> Self {
        hud.on_health_changed(rules.starting_health);
        hud.on_coins_changed(0);
        GameData {
            coins: 0,
            health: rules.starting_health,
            current_level: 0,
            unlocked_level: 0,
            coins_per_life: rules.coins_per_life.max(1),
            hud,
        }
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Every full hundred (or whatever the rules say) becomes one health.
    pub fn add_coins(&mut self, amount: u32) {
        self.coins += amount;
        while self.coins >= self.coins_per_life {
            self.coins -= self.coins_per_life;
            info!("Coin rollover, extra health");
            self.change_health(1);
        }
        self.hud.on_coins_changed(self.coins);
    }

    pub fn change_health(&mut self, delta: i32) {
        self.health += delta;
        self.hud.on_health_changed(self.health);
    }

    pub fn unlock(&mut self, level: usize) {
        self.unlocked_level = self.unlocked_level.max(level);
    }

    pub fn hud(&self) -> &dyn Hud {
        self.hud.as_ref()
    }

    pub fn hud_mut(&mut self) -> &mut dyn Hud {
        self.hud.as_mut()
    }
}

#[cfg(test)]
pub mod recording {
    use super::Hud;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum HudEvent {
        Health(i32),
        Coins(u32),
    }

    pub type HudLog = Rc<RefCell<Vec<HudEvent>>>;

    /// Hud double that keeps every notification in a shared log.
    pub struct RecordingHud {
        events: HudLog,
    }

    impl RecordingHud {
        pub fn new() -> (Self, HudLog) {
            let events = HudLog::default();
            (
                RecordingHud {
                    events: Rc::clone(&events),
                },
                events,
            )
        }
    }

    impl Hud for RecordingHud {
        fn on_health_changed(&mut self, health: i32) {
            self.events.borrow_mut().push(HudEvent::Health(health));
        }

        fn on_coins_changed(&mut self, coins: u32) {
            self.events.borrow_mut().push(HudEvent::Coins(coins));
        }
    }
}
