use std::sync::Arc;

use tracing::debug;

use crate::core::{
    Snapshot, Target,
    error::Result,
    evaluate,
    ports::{Clock, DisplaySink},
};

/// Samples the clock, evaluates the countdown, and writes the four slots.
pub struct CountdownUpdater {
    target: Target,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DisplaySink>,
}

impl CountdownUpdater {
    pub fn new(target: Target, clock: Arc<dyn Clock>, sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            target,
            clock,
            sink,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Runs one update. A slot the sink rejects aborts the remaining writes
    /// for this invocation.
    pub fn update(&self) -> Result<Snapshot> {
        let now_ms = self.clock.now_ms();
        let snapshot = evaluate(self.target, now_ms);
        for (slot, value) in snapshot.fields.iter() {
            self.sink.set_field(slot.as_str(), value)?;
        }
        self.sink.commit()?;
        debug!(
            now_ms,
            remaining_ms = snapshot.remaining_ms,
            expired = snapshot.expired,
            "countdown updated"
        );
        Ok(snapshot)
    }

    /// Hands the display back so log output does not land mid-row.
    pub fn release(&self) -> Result<()> {
        self.sink.release()
    }
}
