use chrono::Duration;
use std::sync::Mutex;
use vigil_core::Timestamp;
use vigil_ports::Clock;

/// Manually driven clock for deterministic tests
///
/// Time only moves when the test says so, which makes cooldown windows
/// and trading-window boundaries exactly reproducible.
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, to: Timestamp) {
        *self.now.lock().expect("manual clock poisoned") = to;
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().expect("manual clock poisoned");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().expect("manual clock poisoned")
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
