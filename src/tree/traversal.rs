//! Upward walk from a node to the root
//!
//! Yields one `Edge` per ancestor level. Parent links are never mutated,
//! so the walk only borrows the parent array and leaves the switch
//! state free for the caller to update while iterating.

use super::node::{Edge, NodeId, NO_PARENT, ROOT};

/// How an upward walk terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum WalkEnd {
    /// Still yielding edges
    InProgress,

    /// Reached node 1
    Root,

    /// Hit a `NO_PARENT` sentinel before the root
    Detached,

    /// Took more steps than there are nodes (cyclic parent chain)
    Cyclic,
}

/// Iterator over the edges from a node up to the root
///
/// Bounded by the node count, so it terminates on any parent array.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    parents: &'a [NodeId],
    current: NodeId,
    steps_left: usize,
    end: WalkEnd,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(parents: &'a [NodeId], start: NodeId) -> Self {
        let node_count = parents.len().saturating_sub(1);
        let in_range = start >= ROOT && start <= node_count;

        Self {
            parents,
            current: if in_range { start } else { NO_PARENT },
            steps_left: node_count,
            end: if in_range {
                WalkEnd::InProgress
            } else {
                WalkEnd::Detached
            },
        }
    }

    /// Node the walk is currently standing on
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Termination reason (`InProgress` until the iterator returns `None`)
    pub fn end(&self) -> WalkEnd {
        self.end
    }

    /// Whether the walk finished at node 1
    pub fn reached_root(&self) -> bool {
        self.end == WalkEnd::Root
    }
}

impl Iterator for Ancestors<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        if self.end != WalkEnd::InProgress {
            return None;
        }

        if self.current == ROOT {
            self.end = WalkEnd::Root;
            return None;
        }

        if self.steps_left == 0 {
            self.end = WalkEnd::Cyclic;
            return None;
        }

        let parent = self.parents[self.current];
        if parent == NO_PARENT {
            self.end = WalkEnd::Detached;
            return None;
        }

        self.steps_left -= 1;
        let edge = Edge {
            parent,
            child: self.current,
        };
        self.current = parent;
        Some(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_reaches_root() {
        // 1 <- 2 <- 3 <- 4
        let parents = [0, 0, 1, 2, 3];
        let mut walk = Ancestors::new(&parents, 4);
        let edges: Vec<Edge> = walk.by_ref().collect();

        assert_eq!(
            edges,
            vec![
                Edge { parent: 3, child: 4 },
                Edge { parent: 2, child: 3 },
                Edge { parent: 1, child: 2 },
            ]
        );
        assert!(walk.reached_root());
        assert_eq!(walk.current(), ROOT);
    }

    #[test]
    fn test_walk_from_root_is_empty() {
        let parents = [0, 0, 1];
        let mut walk = Ancestors::new(&parents, ROOT);
        assert_eq!(walk.next(), None);
        assert_eq!(walk.end(), WalkEnd::Root);
    }

    #[test]
    fn test_walk_stops_at_detached_fragment() {
        // 3 has parent 2, but 2 was never attached to anything
        let parents = [0, 0, 0, 2];
        let mut walk = Ancestors::new(&parents, 3);
        assert_eq!(walk.by_ref().count(), 1);
        assert_eq!(walk.end(), WalkEnd::Detached);
        assert_eq!(walk.current(), 2);
    }

    #[test]
    fn test_walk_terminates_on_cycle() {
        // 2 and 3 point at each other
        let parents = [0, 0, 3, 2];
        let mut walk = Ancestors::new(&parents, 2);
        let steps = walk.by_ref().count();
        assert_eq!(steps, 3);
        assert_eq!(walk.end(), WalkEnd::Cyclic);
    }

    #[test]
    fn test_walk_out_of_range_start() {
        let parents = [0, 0, 1];
        let mut walk = Ancestors::new(&parents, 7);
        assert_eq!(walk.next(), None);
        assert_eq!(walk.end(), WalkEnd::Detached);
    }
}
