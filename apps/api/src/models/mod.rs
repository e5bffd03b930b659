pub mod post;
pub mod publication;
pub mod social;
pub mod topic;

use thiserror::Error;

/// A status column held a value outside its enumerated set.
#[derive(Debug, Error, PartialEq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
