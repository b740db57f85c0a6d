//! Recorders consume enter/exit events and maintain the current
//! position in the call tree.

use std::sync::{Arc, Mutex};

use crate::error::ProfileError;
use crate::tree::{CallTree, NodeId};

/// Single-threaded recorder: explicit context, no global state.
#[derive(Debug, Clone)]
pub struct Recorder {
    tree: CallTree,
    visiting: NodeId,
}

impl Recorder {
    pub fn new() -> Self {
        let tree = CallTree::new();
        let visiting = tree.root();
        Self { tree, visiting }
    }

    /// Record entry into a method: descend into a fresh child node.
    pub fn on_enter(&mut self, owner: &str, name: &str, desc: &str) {
        self.visiting = self.tree.add_child(self.visiting, owner, name, desc);
    }

    /// Record exit from the current method: ascend to the parent.
    pub fn on_exit(&mut self) -> Result<(), ProfileError> {
        self.visiting = self
            .tree
            .parent(self.visiting)
            .ok_or(ProfileError::ExitAtRoot)?;
        Ok(())
    }

    /// True when every enter has been matched by an exit.
    pub fn is_balanced(&self) -> bool {
        self.visiting == self.tree.root()
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn into_tree(self) -> CallTree {
        self.tree
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// A recorder shared across threads.
///
/// Hook calls arriving from concurrently running instrumented code
/// serialize on the mutex; a panic while holding the lock still leaves
/// the tree readable.
#[derive(Debug, Clone, Default)]
pub struct SharedRecorder {
    inner: Arc<Mutex<Recorder>>,
}

impl SharedRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(&self, owner: &str, name: &str, desc: &str) {
        self.lock().on_enter(owner, name, desc);
    }

    pub fn on_exit(&self) -> Result<(), ProfileError> {
        self.lock().on_exit()
    }

    /// Snapshot of the tree rendered as text.
    pub fn render(&self) -> String {
        self.lock().tree().to_string()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorder> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
