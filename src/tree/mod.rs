//! Rail tree: fixed topology plus mutable switch latches
//!
//! The topology (parent links, declared children) is built once and never
//! changes. The switch state is the only thing queries mutate, so the two
//! live in separate structs and can be borrowed independently.
//!
//! Node ids are indices into plain arrays of size N+1 (index 0 unused).

mod node;
mod traversal;

pub use node::{Edge, NodeId, NodeSpec, NO_PARENT, NO_SWITCH, ROOT};
pub use traversal::{Ancestors, WalkEnd};

use bitvec::prelude::*;
use std::fmt;
use thiserror::Error;

/// How much the builder trusts its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Reject anything that is not a well-formed rooted tree
    #[default]
    Strict,

    /// Accept malformed shapes: last parent assignment wins and any
    /// switch value is stored as given
    Permissive,
}

/// Errors raised while building a tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No nodes at all
    #[error("tree must contain at least one node")]
    Empty,

    /// Child id that cannot be stored
    #[error("node {node} declares child {child} outside [1, {node_count}]")]
    ChildOutOfRange {
        /// Declaring node
        node: NodeId,
        /// Offending child id
        child: NodeId,
        /// Number of nodes in the tree
        node_count: usize,
    },

    /// Node 1 listed as somebody's child
    #[error("root node 1 is declared as a child of node {parent}")]
    RootDeclaredAsChild {
        /// Declaring node
        parent: NodeId,
    },

    /// Child declared more than once
    #[error("node {child} is declared as a child of both {first} and {second}")]
    DuplicateParent {
        /// Child with two declarations
        child: NodeId,
        /// Earlier declaring node
        first: NodeId,
        /// Later declaring node
        second: NodeId,
    },

    /// Switch points somewhere other than a declared child
    #[error("node {node} has switch target {target}, which is not one of its children")]
    SwitchTargetNotChild {
        /// Node owning the switch
        node: NodeId,
        /// Declared target
        target: NodeId,
    },

    /// Node with children but no initial switch target
    #[error("node {node} has children but no switch target")]
    MissingSwitch {
        /// Node owning the children
        node: NodeId,
    },

    /// Leaf carrying a switch target
    #[error("node {node} has no children but a switch target {target}")]
    SwitchOnLeaf {
        /// Leaf node
        node: NodeId,
        /// Declared target
        target: NodeId,
    },
}

/// Immutable tree shape
#[derive(Debug, Clone)]
pub struct Topology {
    /// `parents[v]` = parent of v, `NO_PARENT` for the root and orphans
    parents: Vec<NodeId>,

    /// Declared children per node, in input order
    children: Vec<Vec<NodeId>>,
}

impl Topology {
    /// Number of nodes N
    pub fn len(&self) -> usize {
        self.parents.len() - 1
    }

    /// Always false for a built tree (N >= 1)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if `node` lies in [1, N]
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node >= ROOT && node <= self.len()
    }

    /// Parent of `node`, `None` for the root, orphans and unknown ids
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        match self.parents[node] {
            NO_PARENT => None,
            parent => Some(parent),
        }
    }

    /// Declared children of `node`
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if `node` declares no children
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.children(node).is_empty()
    }

    /// Walk from `node` toward the root
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors::new(&self.parents, node)
    }

    /// Distance from `node` to the root, `None` if the chain never gets there
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        let mut walk = self.ancestors(node);
        let steps = walk.by_ref().count();
        walk.reached_root().then_some(steps)
    }

    /// Depth of every node in one pass (`None` where the chain never
    /// reaches the root); index 0 is unused
    ///
    /// Each node is resolved once, so this is linear in N even for long
    /// chains. Nodes on the current chain are marked to detect cycles.
    pub fn depths(&self) -> Vec<Option<usize>> {
        let node_count = self.len();
        let mut depths: Vec<Option<usize>> = vec![None; node_count + 1];
        let mut resolved = bitvec![0; node_count + 1];
        let mut on_chain = bitvec![0; node_count + 1];
        let mut chain = Vec::new();

        for start in ROOT..=node_count {
            let mut current = start;
            let base = loop {
                if resolved[current] {
                    break depths[current];
                }
                if current == ROOT {
                    depths[ROOT] = Some(0);
                    resolved.set(ROOT, true);
                    break Some(0);
                }
                if on_chain[current] {
                    break None;
                }
                on_chain.set(current, true);
                chain.push(current);

                match self.parents[current] {
                    NO_PARENT => break None,
                    parent => current = parent,
                }
            };

            let mut depth = base;
            while let Some(node) = chain.pop() {
                depth = depth.map(|d| d + 1);
                depths[node] = depth;
                resolved.set(node, true);
                on_chain.set(node, false);
            }
        }

        depths
    }

    /// Nodes whose parent chain does not reach the root
    pub fn unreachable(&self) -> Vec<NodeId> {
        self.depths()
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, depth)| depth.is_none())
            .map(|(node, _)| node)
            .collect()
    }

    /// Largest depth among nodes connected to the root
    pub fn max_depth(&self) -> usize {
        self.depths().into_iter().flatten().max().unwrap_or(0)
    }
}

/// Mutable switch latches, one per node
#[derive(Debug, Clone)]
pub struct SwitchState {
    /// `targets[p]` = child currently aligned at p (`NO_SWITCH` for leaves)
    targets: Vec<NodeId>,

    /// Nodes a walk has passed through at least once
    primed: BitVec,
}

impl SwitchState {
    fn new(targets: Vec<NodeId>) -> Self {
        let len = targets.len();
        Self {
            targets,
            primed: bitvec![0; len],
        }
    }

    /// Child currently aligned at `node` (`NO_SWITCH` if none)
    pub fn get(&self, node: NodeId) -> NodeId {
        self.targets.get(node).copied().unwrap_or(NO_SWITCH)
    }

    /// Point the switch at `node` toward `child`
    ///
    /// Returns true when the switch had to flip.
    pub fn align(&mut self, node: NodeId, child: NodeId) -> bool {
        self.primed.set(node, true);
        if self.targets[node] == child {
            return false;
        }
        self.targets[node] = child;
        true
    }

    /// Whether any walk has passed through `node`
    ///
    /// Once primed, the switch points at a real child even if the
    /// input-declared target did not.
    pub fn is_primed(&self, node: NodeId) -> bool {
        self.primed.get(node).map(|bit| *bit).unwrap_or(false)
    }

    /// Number of primed switches
    pub fn primed_count(&self) -> usize {
        self.primed.count_ones()
    }

    /// Digest of the full latch array
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for target in &self.targets {
            hasher.update(&(*target as u64).to_le_bytes());
        }
        hasher.finalize()
    }
}

/// Topology plus switch state, ready to serve queries
#[derive(Debug, Clone)]
pub struct SwitchTree {
    topology: Topology,
    switches: SwitchState,
}

impl SwitchTree {
    /// Build from per-node records; `nodes[i]` describes node `i + 1`
    pub fn build(nodes: Vec<NodeSpec>, validation: Validation) -> Result<Self, TreeError> {
        let node_count = nodes.len();
        if node_count == 0 {
            return Err(TreeError::Empty);
        }

        let strict = validation == Validation::Strict;
        let mut parents = vec![NO_PARENT; node_count + 1];
        let mut targets = vec![NO_SWITCH; node_count + 1];
        let mut children = vec![Vec::new(); node_count + 1];

        for (idx, spec) in nodes.into_iter().enumerate() {
            let node = idx + 1;

            for &child in &spec.children {
                if child < ROOT || child > node_count {
                    return Err(TreeError::ChildOutOfRange {
                        node,
                        child,
                        node_count,
                    });
                }
                if strict {
                    if child == ROOT {
                        return Err(TreeError::RootDeclaredAsChild { parent: node });
                    }
                    if parents[child] != NO_PARENT {
                        return Err(TreeError::DuplicateParent {
                            child,
                            first: parents[child],
                            second: node,
                        });
                    }
                }
                parents[child] = node;
            }

            match (spec.switch_target, spec.is_leaf()) {
                (Some(target), true) if strict => {
                    return Err(TreeError::SwitchOnLeaf { node, target });
                }
                (None, false) if strict => {
                    return Err(TreeError::MissingSwitch { node });
                }
                (Some(target), false) => {
                    if strict && !spec.children.contains(&target) {
                        return Err(TreeError::SwitchTargetNotChild { node, target });
                    }
                    targets[node] = target;
                }
                _ => {}
            }

            children[node] = spec.children;
        }

        if !strict && parents[ROOT] != NO_PARENT {
            tracing::warn!(
                parent = parents[ROOT],
                "root declared as a child of another node"
            );
        }

        tracing::debug!(node_count, ?validation, "built switch tree");

        Ok(Self {
            topology: Topology { parents, children },
            switches: SwitchState::new(targets),
        })
    }

    /// Number of nodes N
    pub fn node_count(&self) -> usize {
        self.topology.len()
    }

    /// Immutable shape
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Current switch latches
    pub fn switches(&self) -> &SwitchState {
        &self.switches
    }

    /// Split borrow: read the shape while mutating the latches
    pub(crate) fn parts_mut(&mut self) -> (&Topology, &mut SwitchState) {
        (&self.topology, &mut self.switches)
    }
}

impl fmt::Display for SwitchTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in ROOT..=self.node_count() {
            write!(f, "node {}: ", node)?;
            let children = self.topology.children(node);
            if children.is_empty() {
                write!(f, "no children")?;
            } else {
                let list: Vec<String> = children.iter().map(|c| c.to_string()).collect();
                write!(
                    f,
                    "children [{}] switch -> {}",
                    list.join(" "),
                    self.switches.get(node)
                )?;
            }
            match self.topology.parent(node) {
                Some(parent) => writeln!(f, ", parent {}", parent)?,
                None => writeln!(f, ", parent -")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<NodeSpec> {
        // 1 -> 2 -> {3, 4}
        vec![
            NodeSpec::new(2, vec![2]),
            NodeSpec::new(3, vec![3, 4]),
            NodeSpec::leaf(),
            NodeSpec::leaf(),
        ]
    }

    #[test]
    fn test_build_parent_and_switch_arrays() {
        let tree = SwitchTree::build(sample(), Validation::Strict).unwrap();
        let topo = tree.topology();

        assert_eq!(tree.node_count(), 4);
        assert_eq!(topo.parent(ROOT), None);
        assert_eq!(topo.parent(2), Some(1));
        assert_eq!(topo.parent(3), Some(2));
        assert_eq!(topo.parent(4), Some(2));
        assert_eq!(tree.switches().get(1), 2);
        assert_eq!(tree.switches().get(2), 3);
        assert_eq!(tree.switches().get(3), NO_SWITCH);
        assert_eq!(tree.switches().get(4), NO_SWITCH);
    }

    #[test]
    fn test_depth_and_max_depth() {
        let tree = SwitchTree::build(sample(), Validation::Strict).unwrap();
        let topo = tree.topology();

        assert_eq!(topo.depth(1), Some(0));
        assert_eq!(topo.depth(2), Some(1));
        assert_eq!(topo.depth(4), Some(2));
        assert_eq!(topo.depth(9), None);
        assert_eq!(topo.max_depth(), 2);
        assert!(topo.unreachable().is_empty());
    }

    #[test]
    fn test_strict_rejects_empty() {
        assert_eq!(
            SwitchTree::build(Vec::new(), Validation::Permissive).unwrap_err(),
            TreeError::Empty
        );
    }

    #[test]
    fn test_child_out_of_range_rejected_in_both_modes() {
        let nodes = vec![NodeSpec::new(5, vec![5]), NodeSpec::leaf()];
        for validation in [Validation::Strict, Validation::Permissive] {
            assert_eq!(
                SwitchTree::build(nodes.clone(), validation).unwrap_err(),
                TreeError::ChildOutOfRange {
                    node: 1,
                    child: 5,
                    node_count: 2
                }
            );
        }
    }

    #[test]
    fn test_strict_rejects_root_as_child() {
        let nodes = vec![NodeSpec::new(2, vec![2]), NodeSpec::new(1, vec![1])];
        assert_eq!(
            SwitchTree::build(nodes, Validation::Strict).unwrap_err(),
            TreeError::RootDeclaredAsChild { parent: 2 }
        );
    }

    #[test]
    fn test_duplicate_parent_strict_vs_permissive() {
        let nodes = vec![
            NodeSpec::new(2, vec![2, 3]),
            NodeSpec::new(3, vec![3]),
            NodeSpec::leaf(),
        ];

        assert_eq!(
            SwitchTree::build(nodes.clone(), Validation::Strict).unwrap_err(),
            TreeError::DuplicateParent {
                child: 3,
                first: 1,
                second: 2
            }
        );

        // Last assignment wins
        let tree = SwitchTree::build(nodes, Validation::Permissive).unwrap();
        assert_eq!(tree.topology().parent(3), Some(2));
    }

    #[test]
    fn test_switch_target_must_be_child_when_strict() {
        let nodes = vec![
            NodeSpec::new(3, vec![2]),
            NodeSpec::leaf(),
            NodeSpec::leaf(),
        ];
        assert_eq!(
            SwitchTree::build(nodes.clone(), Validation::Strict).unwrap_err(),
            TreeError::SwitchTargetNotChild { node: 1, target: 3 }
        );

        let tree = SwitchTree::build(nodes, Validation::Permissive).unwrap();
        assert_eq!(tree.switches().get(1), 3);
    }

    #[test]
    fn test_switch_presence_checks() {
        let missing = vec![
            NodeSpec {
                switch_target: None,
                children: vec![2],
            },
            NodeSpec::leaf(),
        ];
        assert_eq!(
            SwitchTree::build(missing, Validation::Strict).unwrap_err(),
            TreeError::MissingSwitch { node: 1 }
        );

        let on_leaf = vec![NodeSpec::new(2, vec![2]), NodeSpec::new(1, Vec::new())];
        assert_eq!(
            SwitchTree::build(on_leaf, Validation::Strict).unwrap_err(),
            TreeError::SwitchOnLeaf { node: 2, target: 1 }
        );
    }

    #[test]
    fn test_align_and_priming() {
        let mut tree = SwitchTree::build(sample(), Validation::Strict).unwrap();
        let before = tree.switches().fingerprint();
        let (_, switches) = tree.parts_mut();

        assert!(!switches.is_primed(2));
        assert!(!switches.align(2, 3));
        assert!(switches.is_primed(2));
        assert_eq!(tree.switches().fingerprint(), before);

        let (_, switches) = tree.parts_mut();
        assert!(switches.align(2, 4));
        assert_eq!(switches.get(2), 4);
        assert_eq!(switches.primed_count(), 1);
        assert_ne!(tree.switches().fingerprint(), before);
    }

    #[test]
    fn test_unreachable_nodes_reported() {
        // node 3 hangs off node 2, which nobody claims
        let nodes = vec![
            NodeSpec::leaf(),
            NodeSpec::new(3, vec![3]),
            NodeSpec::leaf(),
        ];
        let tree = SwitchTree::build(nodes, Validation::Strict).unwrap();
        assert_eq!(tree.topology().unreachable(), vec![2, 3]);
        assert_eq!(tree.topology().max_depth(), 0);
    }

    #[test]
    fn test_depths_match_single_walks_with_cycles() {
        // 1 -> 2 -> 3, 4 <-> 5 claim each other, 6 hangs off 5, 7 self loop
        let nodes = vec![
            NodeSpec::new(2, vec![2]),
            NodeSpec::new(3, vec![3]),
            NodeSpec::leaf(),
            NodeSpec::new(5, vec![5]),
            NodeSpec::new(4, vec![4, 6]),
            NodeSpec::leaf(),
            NodeSpec::new(7, vec![7]),
        ];
        let tree = SwitchTree::build(nodes, Validation::Permissive).unwrap();
        let topo = tree.topology();
        let depths = topo.depths();

        assert_eq!(
            depths,
            vec![None, Some(0), Some(1), Some(2), None, None, None, None]
        );
        for node in ROOT..=topo.len() {
            assert_eq!(depths[node], topo.depth(node), "node {}", node);
        }
        assert_eq!(topo.unreachable(), vec![4, 5, 6, 7]);
        assert_eq!(topo.max_depth(), 2);
    }

    #[test]
    fn test_display_lists_structure() {
        let tree = SwitchTree::build(sample(), Validation::Strict).unwrap();
        let rendered = tree.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "node 1: children [2] switch -> 2, parent -");
        assert_eq!(lines[1], "node 2: children [3 4] switch -> 3, parent 1");
        assert_eq!(lines[3], "node 4: no children, parent 2");
    }
}
