//! Error types for model parsing

use thiserror::Error;

/// Failure to parse an identity from its string form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid application: {0:?}")]
    InvalidApplication(String),

    #[error("invalid zone: {0:?}")]
    InvalidZone(String),

    #[error("unknown system: {0:?}")]
    UnknownSystem(String),
}
