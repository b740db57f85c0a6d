//! Value-type categories and method descriptor parsing.
//!
//! Descriptors use the standard JVM grammar: `(I[JLjava/lang/String;)V`
//! is a method taking an int, a long array, and a string, returning void.
//! The model only cares about the category of each type — which typed
//! load/store/return opcode applies and how many local slots it occupies —
//! so boolean/byte/char/short all collapse into [`JType::Int`] and every
//! reference or array type into [`JType::Ref`].

use crate::error::ModelError;
use crate::opcode::Opcode;

/// Semantic category of a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JType {
    /// int, and the sub-int types (boolean, byte, char, short).
    Int,
    Long,
    Float,
    Double,
    /// Any object or array reference.
    Ref,
    /// Return type only; never a valid argument type.
    Void,
}

impl JType {
    /// Local-variable slots this type occupies.
    pub fn size(&self) -> u16 {
        match self {
            JType::Long | JType::Double => 2,
            _ => 1,
        }
    }

    /// The typed load opcode for this category.
    pub fn load_opcode(&self) -> Opcode {
        match self {
            JType::Int => Opcode::Iload,
            JType::Long => Opcode::Lload,
            JType::Float => Opcode::Fload,
            JType::Double => Opcode::Dload,
            JType::Ref | JType::Void => Opcode::Aload,
        }
    }

    /// The typed store opcode for this category.
    pub fn store_opcode(&self) -> Opcode {
        match self {
            JType::Int => Opcode::Istore,
            JType::Long => Opcode::Lstore,
            JType::Float => Opcode::Fstore,
            JType::Double => Opcode::Dstore,
            JType::Ref | JType::Void => Opcode::Astore,
        }
    }

    /// The return opcode matching this category as a declared return type.
    pub fn return_opcode(&self) -> Opcode {
        match self {
            JType::Int => Opcode::Ireturn,
            JType::Long => Opcode::Lreturn,
            JType::Float => Opcode::Freturn,
            JType::Double => Opcode::Dreturn,
            JType::Ref => Opcode::Areturn,
            JType::Void => Opcode::Return,
        }
    }
}

/// Parsed method signature: argument categories plus the return category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub args: Vec<JType>,
    pub ret: JType,
}

impl MethodSig {
    /// Parse a JVM method descriptor.
    pub fn parse(desc: &str) -> Result<MethodSig, ModelError> {
        let bad = || ModelError::BadDescriptor {
            desc: desc.to_string(),
        };

        let rest = desc.strip_prefix('(').ok_or_else(bad)?;
        let close = rest.find(')').ok_or_else(bad)?;
        let (arg_str, ret_str) = (&rest[..close], &rest[close + 1..]);

        let mut args = Vec::new();
        let mut chars = arg_str.chars();
        while let Some(c) = chars.next() {
            args.push(consume_type(c, &mut chars, false).ok_or_else(bad)?);
        }

        let mut ret_chars = ret_str.chars();
        let first = ret_chars.next().ok_or_else(bad)?;
        let ret = consume_type(first, &mut ret_chars, true).ok_or_else(bad)?;
        if ret_chars.next().is_some() {
            return Err(bad());
        }

        Ok(MethodSig { args, ret })
    }

    /// Local-variable slot occupied by argument `index`.
    ///
    /// Instance methods reserve slot 0 for the receiver; arguments are then
    /// packed in declaration order, wide types taking two slots each.
    pub fn arg_slot(&self, index: usize, is_static: bool) -> u16 {
        let base = if is_static { 0 } else { 1 };
        base + self.args[..index].iter().map(JType::size).sum::<u16>()
    }
}

/// Consume one type starting at `c`, advancing `chars` past any remainder.
fn consume_type(c: char, chars: &mut std::str::Chars<'_>, allow_void: bool) -> Option<JType> {
    match c {
        'Z' | 'B' | 'C' | 'S' | 'I' => Some(JType::Int),
        'J' => Some(JType::Long),
        'F' => Some(JType::Float),
        'D' => Some(JType::Double),
        'V' if allow_void => Some(JType::Void),
        'L' => {
            // Class name runs to the ';'.
            chars.by_ref().find(|&c| c == ';').map(|_| JType::Ref)
        }
        '[' => {
            let next = chars.next()?;
            // Element type validates recursively; the whole thing is a Ref.
            consume_type(next, chars, false).map(|_| JType::Ref)
        }
        _ => None,
    }
}
