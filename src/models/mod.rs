pub mod account;
pub mod conversation;
pub mod enums;
pub mod profile;
pub mod records;

pub use account::*;
pub use conversation::*;
pub use profile::*;
pub use records::*;

use thiserror::Error;

/// A record rejected at the storage boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
