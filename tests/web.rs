//! Browser glue, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use pirate_world::engine::audio::{AudioCues, Sound, SoundSink};
use pirate_world::engine::KeyState;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn audio_cues_create_one_element_per_sound() {
    let cues = AudioCues::load("audio").unwrap();
    // autoplay policies may reject the promise, playing must not panic
    for sound in Sound::ALL {
        cues.play(sound);
    }
}

#[wasm_bindgen_test]
fn key_state_tracks_codes() {
    let mut keys = KeyState::new();
    keys.set_pressed("ArrowLeft");
    assert!(keys.any_pressed(&["KeyA", "ArrowLeft"]));
    keys.set_released("ArrowLeft");
    assert!(!keys.is_pressed("ArrowLeft"));
}
