//! Outbound adapters implement the core ports against the host: the system
//! clock and terminal or in-memory displays.

pub mod clock;
pub mod display;
