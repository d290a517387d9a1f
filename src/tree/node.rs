//! Node identifiers and per-node adjacency records
//!
//! Nodes are plain integers in [1, N]; node 1 is the root.
//! Index 0 doubles as the "no parent" / "no switch" sentinel.

use std::fmt;

/// Node identifier (1-based, 0 is the sentinel)
pub type NodeId = usize;

/// Fixed root of every tree
pub const ROOT: NodeId = 1;

/// Sentinel stored in `parent[v]` when `v` has no parent
pub const NO_PARENT: NodeId = 0;

/// Sentinel stored in `switch[p]` when `p` has no switch
pub const NO_SWITCH: NodeId = 0;

/// Adjacency record for a single node, as supplied by the input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeSpec {
    /// Initial switch target (only meaningful when `children` is non-empty)
    pub switch_target: Option<NodeId>,

    /// Declared children, in input order
    pub children: Vec<NodeId>,
}

impl NodeSpec {
    /// Node without children
    pub fn leaf() -> Self {
        Self::default()
    }

    /// Node with an explicitly designated switch target
    pub fn new(switch_target: NodeId, children: Vec<NodeId>) -> Self {
        Self {
            switch_target: Some(switch_target),
            children,
        }
    }

    /// Node whose switch initially points at its first declared child
    pub fn first_child(children: Vec<NodeId>) -> Self {
        Self {
            switch_target: children.first().copied(),
            children,
        }
    }

    /// Check if leaf (no declared children)
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parent-child step taken while walking toward the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Node whose switch decides the step
    pub parent: NodeId,

    /// Child we arrived from
    pub child: NodeId,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}
