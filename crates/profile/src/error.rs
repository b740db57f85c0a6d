//! Recorder errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// An exit event arrived while the recorder was at the tree root,
    /// meaning enter/exit events were unbalanced.
    #[error("cannot exit the root node")]
    ExitAtRoot,
}
