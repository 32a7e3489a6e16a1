// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod camera;
pub mod data;
pub mod engine;
pub mod game;
pub mod hud;
pub mod level;
pub mod map;
pub mod overworld;
pub mod settings;
pub mod sprite;
pub mod world;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook and console logger
/// - starts the game loop once every asset is loaded
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    browser::init_logger(log::LevelFilter::Info);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = engine::GameLoop::start(game::Platformer::new()).await {
            log::error!("Could not start the game : {:#}", err);
        }
    });

    Ok(())
}
