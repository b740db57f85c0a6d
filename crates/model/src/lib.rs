//! Core instruction model for the retread toolkit.
//!
//! This crate provides the foundational data structures every other
//! retread crate consumes:
//!
//! - [`Opcode`] — the closed opcode set, with mnemonics and operand-shape
//!   kinds
//! - [`JType`] / [`MethodSig`] — value-type categories and method
//!   descriptor parsing
//! - [`Insn`] / [`Label`] / [`Literal`] — the instruction variant set
//! - [`InsnStream`] — the ordered, mutable stream with symbolic label
//!   resolution
//! - [`Method`] / [`Class`] — ownership containers
//! - [`ModelError`] — resolution and descriptor errors
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime
//! cost) and has no other dependencies.

pub mod class;
pub mod error;
pub mod insn;
pub mod method;
pub mod opcode;
pub mod stream;
pub mod ty;

// Re-export commonly used types at the crate root.
pub use class::Class;
pub use error::ModelError;
pub use insn::{Insn, Label, Literal};
pub use method::Method;
pub use opcode::{Opcode, OpKind};
pub use stream::InsnStream;
pub use ty::{JType, MethodSig};
