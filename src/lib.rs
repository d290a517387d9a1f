//! # Rail switch path queries
//!
//! A fixed rooted tree where every node with children carries a switch
//! pointing at exactly one child. Routing a node to the root costs one
//! flip for every ancestor whose switch points elsewhere, and each flip
//! sticks: later queries through the same ancestor from the same child
//! ride for free.
//!
//! ## Components
//!
//! 1. **Tree builder** ([`tree`]): per-node child lists in, parent array
//!    and initial switch latches out
//! 2. **Query engine** ([`engine`]): walks target → root, flipping and
//!    counting misaligned switches
//! 3. **Token I/O** ([`io`]): flat whitespace input, one answer per line out
//!
//! ## Usage Example
//!
//! ```
//! use railswitch::{NodeSpec, QueryEngine, SwitchTree, Validation};
//!
//! // 1 -> 2 -> {3, 4}, switch at 2 starts on 3
//! let nodes = vec![
//!     NodeSpec::new(2, vec![2]),
//!     NodeSpec::new(3, vec![3, 4]),
//!     NodeSpec::leaf(),
//!     NodeSpec::leaf(),
//! ];
//! let tree = SwitchTree::build(nodes, Validation::Strict)?;
//! let mut engine = QueryEngine::new(tree);
//! assert_eq!(engine.answer_all([4, 4, 3]), vec![1, 0, 1]);
//! # Ok::<(), railswitch::TreeError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;  // Run parameters
pub mod engine;  // Switch-path query engine
pub mod io;      // Token stream parsing and answer rendering
pub mod logging; // Subscriber setup for the binary
pub mod tree;    // Topology and switch latches

// Re-exports for convenience
pub use config::{InputLayout, RunConfig};
pub use engine::{EngineStats, QueryEngine, RouteOutcome, INVALID_ANSWER};
pub use io::{check, run, CheckReport, ParseError, RunReport};
pub use tree::{NodeId, NodeSpec, SwitchTree, TreeError, Validation, ROOT};
