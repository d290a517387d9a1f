//! Switch-path query engine
//!
//! Answers "how many switches must flip to route this node to the root"
//! for a stream of targets. Every answer leaves the switches along the
//! walked path aligned with it, so later queries see the new state.
//!
//! Queries must be applied strictly in order: the cost of query i depends
//! on the exact switch configuration left by queries 0..i.

mod outcome;

pub use outcome::{EngineStats, RouteOutcome, INVALID_ANSWER};

use crate::tree::{NodeId, SwitchTree, ROOT};

/// Owns the tree and serves queries against it
#[derive(Debug, Clone)]
pub struct QueryEngine {
    tree: SwitchTree,
    stats: EngineStats,
}

impl QueryEngine {
    /// Create engine over a freshly built tree
    pub fn new(tree: SwitchTree) -> Self {
        Self {
            tree,
            stats: EngineStats::default(),
        }
    }

    /// Route `target` to the root, flipping every misaligned switch on the way
    pub fn route(&mut self, target: i64) -> RouteOutcome {
        let outcome = match self.resolve(target) {
            None => {
                tracing::debug!(query = target, "target out of range");
                RouteOutcome::OutOfRange
            }
            Some(ROOT) => RouteOutcome::Root,
            Some(node) => self.walk(node),
        };

        self.stats.record(&outcome);
        outcome
    }

    /// Route `target` and return the wire answer (`-1` when out of range)
    pub fn answer(&mut self, target: i64) -> i64 {
        self.route(target).answer()
    }

    /// Answer a batch in order
    pub fn answer_all<I>(&mut self, targets: I) -> Vec<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        targets
            .into_iter()
            .map(|target| self.answer(target))
            .collect()
    }

    /// What `route(target)` would cost right now, without flipping anything
    ///
    /// Exact for any parent chain without cycles. `None` when out of range.
    pub fn cost(&self, target: i64) -> Option<u32> {
        let node = self.resolve(target)?;
        let switches = self.tree.switches();
        let misaligned = self
            .tree
            .topology()
            .ancestors(node)
            .filter(|edge| switches.get(edge.parent) != edge.child)
            .fold(0u32, |count, _| count + 1);
        Some(misaligned)
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Current tree (topology and switch state)
    pub fn tree(&self) -> &SwitchTree {
        &self.tree
    }

    /// Release the tree with its accumulated switch state
    pub fn into_tree(self) -> SwitchTree {
        self.tree
    }

    fn resolve(&self, target: i64) -> Option<NodeId> {
        usize::try_from(target)
            .ok()
            .filter(|&node| self.tree.topology().contains(node))
    }

    fn walk(&mut self, target: NodeId) -> RouteOutcome {
        let (topology, switches) = self.tree.parts_mut();
        let mut walk = topology.ancestors(target);
        let mut flips = 0u32;

        for edge in walk.by_ref() {
            if switches.align(edge.parent, edge.child) {
                flips += 1;
                tracing::trace!(parent = edge.parent, child = edge.child, "switch flipped");
            }
        }

        let reached_root = walk.reached_root();
        if reached_root {
            tracing::debug!(query = target, flips, "routed to root");
        } else {
            tracing::debug!(
                query = target,
                flips,
                stopped_at = walk.current(),
                end = ?walk.end(),
                "parent chain broke off before the root"
            );
        }

        RouteOutcome::Routed {
            flips,
            reached_root,
        }
    }
}
