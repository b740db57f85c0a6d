//! retread assembler — text ↔ instruction-stream translation.
//!
//! The assembler reads a line-oriented text format into a
//! [`retread_model::Class`]; the disassembler prints a numbered listing
//! of a stream, resolving branch operands to entry ids.
//!
//! # Usage
//!
//! ```
//! use retread_asm::{assemble, disassemble_class};
//!
//! let class = assemble(
//!     "
//!     .class lab/Example
//!     .method answer ()I static
//!         bipush 42
//!         ireturn
//!     .end method
//!     ",
//! )
//! .unwrap();
//! let listing = disassemble_class(&class).unwrap();
//! assert_eq!(
//!     listing,
//!     "Class: lab/Example\n  Method: answer()I\n0:\tBIPUSH 42\n1:\tIRETURN\n"
//! );
//! ```

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::{disassemble_class, disassemble_insn, disassemble_method};
pub use error::AsmError;
pub use parser::assemble;
