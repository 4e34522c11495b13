pub mod inbound;
pub mod outbound;

// Re-export commonly used outbound adapters at the adapters level
pub use outbound::clock;
pub use outbound::display;
