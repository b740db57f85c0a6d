//! Error types for the retread assembler.

use thiserror::Error;

/// Errors produced while assembling text into a class.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An instruction or directive is missing an operand.
    #[error("line {line}: {mnemonic} expects {expected}")]
    MissingArgument {
        line: usize,
        mnemonic: String,
        expected: &'static str,
    },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// A string literal ran to end of line without a closing quote.
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    /// A method descriptor failed to parse.
    #[error("line {line}: malformed descriptor '{desc}'")]
    BadDescriptor { line: usize, desc: String },

    /// The same label name was defined twice in one method.
    #[error("line {line}: duplicate label '{label}'")]
    DuplicateLabel { line: usize, label: String },

    /// A referenced label was never defined in its method.
    #[error("line {line}: undefined label '{label}' in method '{method}'")]
    UndefinedLabel {
        line: usize,
        label: String,
        method: String,
    },

    /// A directive appeared in the wrong context (e.g. an instruction
    /// outside a `.method` block).
    #[error("line {line}: misplaced '{what}'")]
    Misplaced { line: usize, what: String },

    /// Input ended inside an unterminated `.method` block.
    #[error("missing '.end method' for method '{method}'")]
    UnclosedMethod { method: String },

    /// Input contained no `.class` directive.
    #[error("no .class directive found")]
    MissingClass,
}
