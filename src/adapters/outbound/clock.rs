use chrono::Utc;

use crate::core::ports::Clock;

#[derive(Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock pinned to a single instant, used by `once --at`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now_ms: i64,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self { now_ms }
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }
}
