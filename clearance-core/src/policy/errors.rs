use thiserror::Error;

/// Errors that can occur while building, parsing or evaluating policies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The security level is outside the configured hierarchy
    #[error("unknown security level {level}: the hierarchy has {count} levels")]
    UnknownLevel { level: u32, count: u8 },

    /// The hierarchy itself is misconfigured
    #[error("invalid level hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The boolean expression is invalid or malformed
    #[error("invalid boolean expression: {0}")]
    InvalidBooleanExpression(String),

    /// The attribute format is invalid
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),
}
