//! Rewriting errors.

use retread_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    /// The rewriter was invoked on a method with no qualifying self-call.
    ///
    /// This is a caller error: a silent no-op here would hide the logic
    /// bug that led the caller to request the rewrite.
    #[error("method '{name}{desc}' is not tail recursive")]
    NotTailRecursive { name: String, desc: String },

    /// Descriptor parsing or label resolution failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}
