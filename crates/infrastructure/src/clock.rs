use std::sync::Mutex;
use std::time::Instant;

use chrono::Utc;
use domain::Clock;

use crate::config::ClockKind;

/// Milliseconds since the clock was created, never going backwards
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Unix epoch milliseconds; may jump if the system time changes
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_ms(&self) -> f64 {
        Utc::now().timestamp_millis() as f64
    }
}

/// Clock moved by hand, for replays and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Mutex::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now = ms;
        }
    }

    pub fn advance(&self, ms: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now += ms;
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

impl ClockKind {
    pub fn build(&self) -> std::sync::Arc<dyn Clock> {
        match self {
            Self::Monotonic => std::sync::Arc::new(MonotonicClock::new()),
            Self::Wall => std::sync::Arc::new(WallClock),
        }
    }
}
