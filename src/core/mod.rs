pub mod countdown;
pub mod error;
pub mod ports;

pub use countdown::*;
pub use error::{Error, Result};
