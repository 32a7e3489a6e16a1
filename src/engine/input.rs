use crate::browser;
use anyhow::Result;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use wasm_bindgen::JsCast;

/// Keyboard events travel from the DOM listeners to the game loop through
/// an unbounded channel, drained once per animation frame.
pub enum KeyPress {
    KeyUp(String),
    KeyDown(String),
}

/// Snapshot of held keys, by `KeyboardEvent.code` ("ArrowLeft", "KeyX").
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    pressed_keys: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState::default()
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed_keys.contains(code)
    }

    pub fn any_pressed(&self, codes: &[&str]) -> bool {
        codes.iter().any(|code| self.is_pressed(code))
    }

    pub fn set_pressed(&mut self, code: &str) {
        self.pressed_keys.insert(code.to_string());
    }

    pub fn set_released(&mut self, code: &str) {
        self.pressed_keys.remove(code);
    }
}

pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
    let (keydown_sender, keyevent_receiver) = unbounded();
    let keydown_sender = Rc::new(RefCell::new(keydown_sender));
    let keyup_sender = Rc::clone(&keydown_sender);

    let onkeydown = browser::closure_wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let _ = keydown_sender
            .borrow_mut()
            .start_send(KeyPress::KeyDown(event.code()));
    }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

    let onkeyup = browser::closure_wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let _ = keyup_sender
            .borrow_mut()
            .start_send(KeyPress::KeyUp(event.code()));
    }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

    let window = browser::window()?;
    window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
    window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));

    // listeners live as long as the page
    onkeydown.forget();
    onkeyup.forget();

    Ok(keyevent_receiver)
}

pub fn process_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<KeyPress>) {
    // Ok(None) = channel closed, Err = nothing queued right now
    while let Ok(Some(event)) = receiver.try_next() {
        match event {
            KeyPress::KeyUp(code) => state.set_released(&code),
            KeyPress::KeyDown(code) => state.set_pressed(&code),
        }
    }
}
