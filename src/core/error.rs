use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The display sink has no slot registered under this identifier.
    MissingSlot(String),
    /// The display sink owns the slot but could not present the write.
    Display(String),
    /// A target instant could not be parsed or resolved.
    InvalidTarget(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingSlot(slot) => write!(f, "Display slot '{slot}' does not exist"),
            Error::Display(msg) => write!(f, "Display error: {msg}"),
            Error::InvalidTarget(msg) => write!(f, "Invalid target: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
