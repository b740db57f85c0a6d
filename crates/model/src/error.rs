//! Errors for the instruction model.

use thiserror::Error;

/// Errors raised by stream resolution and descriptor parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A branch or dispatch references a label that does not occur in its
    /// stream. Always a malformed stream, never recoverable.
    #[error("branch target L{0} not found in stream")]
    TargetNotFound(u32),

    /// A method descriptor could not be parsed.
    #[error("malformed method descriptor '{desc}'")]
    BadDescriptor { desc: String },
}
