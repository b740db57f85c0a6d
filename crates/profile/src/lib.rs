//! Calling-context-tree recorder for instrumented programs.
//!
//! Instrumented methods call the hook identified by [`HOOK_OWNER`] /
//! [`ON_ENTER_NAME`] / [`ON_EXIT_NAME`]; an execution environment maps
//! those calls onto a [`Recorder`] (or a [`SharedRecorder`] when the
//! program runs on several threads). The recorder builds a [`CallTree`]:
//! every enter descends into a fresh child node, every exit ascends to
//! the parent, and the finished tree renders as an indented listing.

pub mod error;

mod recorder;
mod tree;

pub use error::ProfileError;
pub use recorder::{Recorder, SharedRecorder};
pub use tree::{CallTree, NodeId};

/// Internal name of the class instrumented call sites invoke.
pub const HOOK_OWNER: &str = "retread/profile/Recorder";

/// Entry hook: receives owner, name, and descriptor of the entered method.
pub const ON_ENTER_NAME: &str = "onEnter";
pub const ON_ENTER_DESC: &str = "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V";

/// Exit hook: no operands, one call per method exit.
pub const ON_EXIT_NAME: &str = "onExit";
pub const ON_EXIT_DESC: &str = "()V";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_identity_is_stable() {
        assert_eq!(HOOK_OWNER, "retread/profile/Recorder");
        assert_eq!(ON_ENTER_NAME, "onEnter");
        assert_eq!(
            ON_ENTER_DESC,
            "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V"
        );
        assert_eq!(ON_EXIT_NAME, "onExit");
        assert_eq!(ON_EXIT_DESC, "()V");
    }
}
