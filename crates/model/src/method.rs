//! Methods: a name, a descriptor, and exactly one owned instruction stream.

use crate::error::ModelError;
use crate::stream::InsnStream;
use crate::ty::MethodSig;

/// One method of a class.
///
/// The stream is exclusively owned; rewriting components mutate it in
/// place and never share it across methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Simple name, e.g. `sum`.
    pub name: String,
    /// JVM method descriptor, e.g. `([III)I`.
    pub desc: String,
    pub is_static: bool,
    pub stream: InsnStream,
}

impl Method {
    pub fn new(name: impl Into<String>, desc: impl Into<String>, is_static: bool) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            is_static,
            stream: InsnStream::default(),
        }
    }

    /// Parse this method's descriptor into a signature.
    pub fn sig(&self) -> Result<MethodSig, ModelError> {
        MethodSig::parse(&self.desc)
    }
}
