//! The instruction variant set.
//!
//! One variant per operand shape. Three of the variants — `Label`,
//! `Frame`, and `Line` — are non-executable markers: they occupy a
//! position in the stream (and get an id in disassembly) but have no
//! runtime effect and are never call sites.

use std::fmt;

use crate::opcode::Opcode;

/// A zero-width position marker, used only as a branch/dispatch target.
///
/// The id is symbolic: a `Label` is *defined* by the `Insn::Label` entry
/// carrying it, and resolving it to an index is the stream's job. Branch
/// instructions hold non-owning copies of the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A loadable constant literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    /// A class reference, by internal name.
    Class(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v:?}"),
            Literal::Str(s) => write!(f, "{s:?}"),
            Literal::Class(name) => write!(f, "class {name}"),
        }
    }
}

/// A single instruction (or marker) in a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Insn {
    /// Pure position marker; a branch or exception target.
    Label(Label),
    /// Verification-metadata marker. The payload belongs to the external
    /// decoder/encoder and is stale after any structural rewrite.
    Frame,
    /// Source-line marker.
    Line(u32),
    /// Opcode with no operands.
    Simple(Opcode),
    /// Opcode with one immediate integer (BIPUSH, SIPUSH, NEWARRAY).
    Imm { op: Opcode, value: i32 },
    /// Branch to a label.
    Jump { op: Opcode, target: Label },
    /// Load a constant literal.
    Ldc(Literal),
    /// Typed local load/store, or RET.
    Var { op: Opcode, slot: u16 },
    /// Increment local `slot` by `delta`.
    Iinc { slot: u16, delta: i16 },
    /// Opcode with a type-name operand.
    Type { op: Opcode, ty: String },
    /// Field access.
    Field {
        op: Opcode,
        owner: String,
        name: String,
        desc: String,
    },
    /// Method invocation.
    MethodRef {
        op: Opcode,
        owner: String,
        name: String,
        desc: String,
    },
    /// Multi-dimensional array creation.
    MultiANewArray { desc: String, dims: u8 },
    /// Sparse branch table: (key, target) pairs plus a default.
    LookupSwitch {
        pairs: Vec<(i32, Label)>,
        default: Label,
    },
    /// Dense branch table: keys `low..low+targets.len()` in order.
    TableSwitch {
        low: i32,
        targets: Vec<Label>,
        default: Label,
    },
}

impl Insn {
    /// True for the non-executable marker variants.
    pub fn is_marker(&self) -> bool {
        matches!(self, Insn::Label(_) | Insn::Frame | Insn::Line(_))
    }

    /// The opcode of an executable instruction, if it has a single one.
    ///
    /// Markers have none; LDC, IINC, switches, and MULTIANEWARRAY have a
    /// fixed opcode implied by the variant.
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Insn::Label(_) | Insn::Frame | Insn::Line(_) => None,
            Insn::Simple(op)
            | Insn::Imm { op, .. }
            | Insn::Jump { op, .. }
            | Insn::Var { op, .. }
            | Insn::Type { op, .. }
            | Insn::Field { op, .. }
            | Insn::MethodRef { op, .. } => Some(*op),
            Insn::Ldc(_) => Some(Opcode::Ldc),
            Insn::Iinc { .. } => Some(Opcode::Iinc),
            Insn::MultiANewArray { .. } => Some(Opcode::Multianewarray),
            Insn::LookupSwitch { .. } => Some(Opcode::Lookupswitch),
            Insn::TableSwitch { .. } => Some(Opcode::Tableswitch),
        }
    }
}
