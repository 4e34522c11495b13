//! Use cases driving the countdown core: a single update and the schedule
//! that repeats it.

pub mod ticker;
pub mod updater;

pub use ticker::{StopReason, TickReport, Ticker, TickerOptions};
pub use updater::CountdownUpdater;
