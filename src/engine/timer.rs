use std::fmt;

/// One fixed simulation step.
/// - `dt`  : seconds of simulated time covered by this step
/// - `now` : monotonic clock in milliseconds, what every Timer reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub dt: f32,
    pub now: f64,
}

impl Tick {
    pub fn new(dt: f32, now: f64) -> Self {
        Tick { dt, now }
    }

    /// The step that follows this one with the same `dt`.
    pub fn next(&self) -> Self {
        Tick {
            dt: self.dt,
            now: self.now + f64::from(self.dt) * 1000.0,
        }
    }
}

/// Countdown measured against the `now` of each Tick.
///
/// ┌─────────── start(now) ───────────┐
/// │ active, start_time = now         │
/// └──────────────┬───────────────────┘
///                │ update(now) with now - start_time >= duration
///                ▼
/// ┌─────── expire (exactly once) ─────┐
/// │ callback() -> stop(now)           │
/// │   repeating -> start(now) again   │
/// │   one-shot  -> inactive           │
/// └───────────────────────────────────┘
pub struct Timer {
    duration: f64,
    start_time: f64,
    active: bool,
    repeating: bool,
    callback: Option<Box<dyn FnMut()>>,
}

impl Timer {
    pub fn new(duration: f64) -> Self {
        Timer {
            duration,
            start_time: 0.0,
            active: false,
            repeating: false,
            callback: None,
        }
    }

    pub fn repeating(duration: f64) -> Self {
        Timer {
            repeating: true,
            ..Timer::new(duration)
        }
    }

    pub fn with_callback(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn start(&mut self, now: f64) {
        self.active = true;
        self.start_time = now;
    }

    pub fn stop(&mut self, now: f64) {
        self.active = false;
        if self.repeating {
            self.start(now);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns true on the update that observed the expiry.
    pub fn update(&mut self, now: f64) -> bool {
        if !self.active || now - self.start_time < self.duration {
            return false;
        }
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
        self.stop(now);
        true
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("duration", &self.duration)
            .field("start_time", &self.start_time)
            .field("active", &self.active)
            .field("repeating", &self.repeating)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
