use crate::core::error::Result;

/// Abstraction for getting the current time.
pub trait Clock: Send + Sync {
    /// Current instant as milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Externally-owned presentation surface addressed by slot identifier.
pub trait DisplaySink: Send + Sync {
    /// Replace the text content of `slot`.
    fn set_field(&self, slot: &str, value: &str) -> Result<()>;

    /// Present the writes of one update. Sinks that show writes immediately
    /// keep the default.
    fn commit(&self) -> Result<()> {
        Ok(())
    }

    /// Leave the surface where unrelated output can follow, e.g. end a row
    /// that is being redrawn in place.
    fn release(&self) -> Result<()> {
        Ok(())
    }
}
