//! Runtime errors for the reference interpreter.
//!
//! Every per-instruction error carries the 0-based stream entry index
//! (`at`) of the instruction that raised it.

use retread_model::ModelError;
use retread_profile::ProfileError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// The interpreter met an opcode outside its supported subset.
    #[error("unsupported opcode {mnemonic} at entry {at}")]
    UnsupportedOpcode { at: usize, mnemonic: &'static str },

    /// A call whose owner is neither the running class nor the profile
    /// hook.
    #[error("unsupported call to {owner}.{name} at entry {at}")]
    UnsupportedCall {
        at: usize,
        owner: String,
        name: String,
    },

    /// Pop on an empty operand stack.
    #[error("operand stack underflow at entry {at}")]
    StackUnderflow { at: usize },

    /// An operand had the wrong value category.
    #[error("operand type mismatch at entry {at}")]
    TypeMismatch { at: usize },

    /// A local-variable slot was read before any store reached it.
    #[error("local slot {slot} read before write at entry {at}")]
    UninitializedLocal { at: usize, slot: u16 },

    /// Integer division or remainder by zero.
    #[error("division by zero at entry {at}")]
    DivisionByZero { at: usize },

    /// Array access outside the array's bounds.
    #[error("array index {index} out of bounds (length {length}) at entry {at}")]
    IndexOutOfBounds {
        at: usize,
        index: i32,
        length: usize,
    },

    /// Execution ran off the end of the stream without returning.
    #[error("execution fell off the end of the stream")]
    FellOffEnd,

    /// ATHROW was executed.
    #[error("exception thrown at entry {at}")]
    Thrown { at: usize },

    /// Nested self-calls exceeded the interpreter's depth cap.
    #[error("call depth exceeded limit {limit}")]
    CallDepthExceeded { limit: usize },

    /// The requested method does not exist in the class.
    #[error("no method '{name}{desc}' in class")]
    NoSuchMethod { name: String, desc: String },

    /// Invocation received the wrong number of arguments.
    #[error("method '{name}' expects {expected} arguments, got {got}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Descriptor parsing or branch resolution failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An instrumented hook call arrived unbalanced.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}
