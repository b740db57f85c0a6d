//! Reference interpreter for retread instruction streams.
//!
//! The interpreter exists to show that stream rewrites preserve
//! observable behavior: a method is run before and after a transform and
//! the results compared. It covers the integer, array, branch, and
//! self-call subset that the rewriting passes produce; anything outside
//! that subset fails with an explicit [`RuntimeError::UnsupportedOpcode`]
//! rather than a guess.
//!
//! Calls whose owner is the `retread_profile` hook class are routed to
//! an attached [`retread_profile::Recorder`] (see
//! [`run_with_recorder`]), so instrumented programs can be profiled
//! without any real class loading.

pub mod error;

mod machine;
mod value;

pub use error::RuntimeError;
pub use machine::{run_method, run_with_recorder, MAX_CALL_DEPTH};
pub use value::Value;
