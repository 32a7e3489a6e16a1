/// ELI5:
/// ┌──────────────── State Selection (every tick, after physics) ────────────┐
/// │  grounded  + attacking                   →  Attack                      │
/// │  grounded  + no horizontal speed         →  Idle                        │
/// │  grounded  + horizontal speed            →  Run                         │
/// │  airborne  + attacking                   →  AirAttack                   │
/// │  airborne  + touching a side wall        →  Wall                        │
/// │  airborne  + moving up                   →  Jump                        │
/// │  airborne  + moving down (or still)      →  Fall                        │
/// └─────────────────────────────────────────────────────────────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
    Wall,
    Attack,
    AirAttack,
}

impl PlayerState {
    pub const ALL: [PlayerState; 7] = [
        PlayerState::Idle,
        PlayerState::Run,
        PlayerState::Jump,
        PlayerState::Fall,
        PlayerState::Wall,
        PlayerState::Attack,
        PlayerState::AirAttack,
    ];

    /// Animation name inside the sprite sheet.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Run => "run",
            PlayerState::Jump => "jump",
            PlayerState::Fall => "fall",
            PlayerState::Wall => "wall",
            PlayerState::Attack => "attack",
            PlayerState::AirAttack => "air_attack",
        }
    }
}

/// Results of the three probe rectangles around the hitbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contacts {
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Contacts {
    pub fn on_wall(&self) -> bool {
        self.left || self.right
    }

    pub fn airborne(&self) -> bool {
        !self.down
    }
}

pub fn next_state(contacts: Contacts, attacking: bool, horizontal: f32, vertical: f32) -> PlayerState {
    if contacts.down {
        if attacking {
            PlayerState::Attack
        } else if horizontal == 0.0 {
            PlayerState::Idle
        } else {
            PlayerState::Run
        }
    } else if attacking {
        PlayerState::AirAttack
    } else if contacts.on_wall() {
        PlayerState::Wall
    } else if vertical < 0.0 {
        PlayerState::Jump
    } else {
        PlayerState::Fall
    }
}
