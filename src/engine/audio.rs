use crate::browser;
use anyhow::Result;
use std::collections::HashMap;
use web_sys::HtmlAudioElement;

/// Fire and forget sound cues raised by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Coin,
    Attack,
    Damage,
    Hit,
    PearlFire,
    Jump,
}

impl Sound {
    pub const ALL: [Sound; 6] = [
        Sound::Coin,
        Sound::Attack,
        Sound::Damage,
        Sound::Hit,
        Sound::PearlFire,
        Sound::Jump,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sound::Coin => "coin",
            Sound::Attack => "attack",
            Sound::Damage => "damage",
            Sound::Hit => "hit",
            Sound::PearlFire => "pearl",
            Sound::Jump => "jump",
        }
    }
}

pub trait SoundSink {
    fn play(&self, sound: Sound);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silence;

impl SoundSink for Silence {
    fn play(&self, _sound: Sound) {}
}

/// One `<audio>` element per cue, `<folder>/<name>.wav`.
pub struct AudioCues {
    elements: HashMap<Sound, HtmlAudioElement>,
}

impl AudioCues {
    pub fn load(folder: &str) -> Result<Self> {
        let elements = Sound::ALL
            .iter()
            .map(|sound| {
                let source = format!("{}/{}.wav", folder, sound.name());
                browser::new_audio(&source).map(|element| (*sound, element))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(AudioCues { elements })
    }
}

impl SoundSink for AudioCues {
    fn play(&self, sound: Sound) {
        if let Some(element) = self.elements.get(&sound) {
            element.set_current_time(0.0);
            // a rejected play() promise (autoplay policy) only loses this cue
            let _ = element.play();
        }
    }
}

#[cfg(test)]
pub mod recording {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    pub struct RecordingSounds {
        pub played: RefCell<Vec<Sound>>,
    }

    impl RecordingSounds {
        pub fn count(&self, sound: Sound) -> usize {
            self.played.borrow().iter().filter(|s| **s == sound).count()
        }
    }

    impl SoundSink for RecordingSounds {
        fn play(&self, sound: Sound) {
            self.played.borrow_mut().push(sound);
        }
    }
}
