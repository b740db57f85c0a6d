//! The calling context tree.
//!
//! Every enter event appends a fresh child node; sibling calls to the
//! same method are distinct nodes, so the tree records the full calling
//! history, not aggregated counts.

use std::fmt;

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    /// `owner.name desc` for call nodes, `root` for the root.
    value: String,
    depth: usize,
    children: Vec<NodeId>,
}

/// Arena-backed call tree with a synthetic root.
#[derive(Debug, Clone)]
pub struct CallTree {
    nodes: Vec<Node>,
}

impl CallTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                value: "root".to_string(),
                depth: 0,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, owner: &str, name: &str, desc: &str) -> NodeId {
        let depth = self.nodes[parent.0].depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            value: format!("{owner}.{name}{desc}"),
            depth,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Total node count, root included (never zero).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn write_subtree(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[id.0];
        for _ in 0..node.depth {
            f.write_str("  ")?;
        }
        writeln!(f, "{}", node.value)?;
        for child in &node.children {
            self.write_subtree(*child, f)?;
        }
        Ok(())
    }
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Preorder, two spaces of indent per depth level, one line per node.
impl fmt::Display for CallTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(self.root(), f)
    }
}
