//! The instruction stream: an ordered, index-addressable, mutable
//! sequence of instructions.
//!
//! Entry order defines execution order and the 0-based ids used in
//! disassembly (markers included). Rewriting components mutate a stream
//! in place with [`InsnStream::insert`] and [`InsnStream::remove`];
//! indices of untouched entries shift predictably, and label resolution
//! is a fresh linear scan each time, so there is no cache to invalidate.

use crate::error::ModelError;
use crate::insn::{Insn, Label};

/// An ordered sequence of instructions owned by one method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsnStream {
    insns: Vec<Insn>,
}

impl InsnStream {
    pub fn new(insns: Vec<Insn>) -> Self {
        Self { insns }
    }

    pub fn len(&self) -> usize {
        self.insns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Insn> {
        self.insns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Insn> {
        self.insns.iter()
    }

    pub fn push(&mut self, insn: Insn) {
        self.insns.push(insn);
    }

    /// Insert before `index`; entries at `index` and beyond shift up by one.
    pub fn insert(&mut self, index: usize, insn: Insn) {
        self.insns.insert(index, insn);
    }

    /// Remove and return the entry at `index`; later entries shift down.
    pub fn remove(&mut self, index: usize) -> Insn {
        self.insns.remove(index)
    }

    /// Resolve a label to the 0-based position of its defining entry.
    ///
    /// A label that does not occur in the stream means the stream is
    /// malformed; the error must be propagated, never guessed around.
    pub fn resolve(&self, label: Label) -> Result<usize, ModelError> {
        self.insns
            .iter()
            .position(|insn| matches!(insn, Insn::Label(l) if *l == label))
            .ok_or(ModelError::TargetNotFound(label.0))
    }

    /// First label definition in the stream, with its position.
    pub fn first_label(&self) -> Option<(usize, Label)> {
        self.insns.iter().enumerate().find_map(|(i, insn)| match insn {
            Insn::Label(l) => Some((i, *l)),
            _ => None,
        })
    }

    /// A label id unused anywhere in this stream, as a definition or as a
    /// branch/dispatch target.
    pub fn fresh_label(&self) -> Label {
        let next = self
            .insns
            .iter()
            .flat_map(mentioned_labels)
            .map(|l| l.0 + 1)
            .max()
            .unwrap_or(0);
        Label(next)
    }
}

impl<'a> IntoIterator for &'a InsnStream {
    type Item = &'a Insn;
    type IntoIter = std::slice::Iter<'a, Insn>;

    fn into_iter(self) -> Self::IntoIter {
        self.insns.iter()
    }
}

/// Every label an entry defines or references.
fn mentioned_labels(insn: &Insn) -> Vec<Label> {
    match insn {
        Insn::Label(l) => vec![*l],
        Insn::Jump { target, .. } => vec![*target],
        Insn::LookupSwitch { pairs, default } => {
            let mut ls: Vec<Label> = pairs.iter().map(|(_, l)| *l).collect();
            ls.push(*default);
            ls
        }
        Insn::TableSwitch {
            targets, default, ..
        } => {
            let mut ls = targets.clone();
            ls.push(*default);
            ls
        }
        _ => vec![],
    }
}
