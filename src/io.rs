//! Whitespace token stream in and newline-delimited answers out
//!
//! Input shape:
//! ```text
//! N
//! <node record for 1>
//! ...
//! <node record for N>
//! Q
//! t1 .. tQ
//! ```
//! Line breaks carry no meaning; only token order matters.

use std::fmt::{self, Write as _};
use std::num::IntErrorKind;
use std::str::{FromStr, SplitAsciiWhitespace};

use thiserror::Error;

use crate::config::{InputLayout, RunConfig};
use crate::engine::{EngineStats, QueryEngine};
use crate::tree::{NodeId, NodeSpec, SwitchTree, TreeError};

/// Upper bound on up-front allocation driven by counts in the input
const MAX_PREALLOC: usize = 1 << 20;

/// Errors raised while reading input
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input ended while a token was still required
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEof {
        /// What was being read
        expected: &'static str,
    },

    /// Token did not parse as the expected type
    #[error("invalid {expected} '{token}' at token {position}")]
    InvalidToken {
        /// What was being read
        expected: &'static str,
        /// Offending token text
        token: String,
        /// 1-based token index
        position: usize,
    },

    /// Tree construction rejected the records
    #[error("invalid tree: {0}")]
    Tree(#[from] TreeError),
}

/// Typed reader over whitespace-separated tokens
#[derive(Debug)]
pub struct TokenStream<'a> {
    tokens: SplitAsciiWhitespace<'a>,
    position: usize,
}

impl<'a> TokenStream<'a> {
    /// Wrap raw input text
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_ascii_whitespace(),
            position: 0,
        }
    }

    /// Read the next token as `T`
    pub fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ParseError> {
        let token = self.next_raw(expected)?;
        token.parse().map_err(|_| self.invalid(expected, token))
    }

    /// Read the next token as a query target
    ///
    /// Integers too large for `i64` saturate, so they still land outside
    /// [1, N] and get answered instead of aborting the stream.
    pub fn next_target(&mut self, expected: &'static str) -> Result<i64, ParseError> {
        let token = self.next_raw(expected)?;
        match token.parse::<i64>() {
            Ok(target) => Ok(target),
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(self.invalid(expected, token)),
            },
        }
    }

    fn next_raw(&mut self, expected: &'static str) -> Result<&'a str, ParseError> {
        let token = self
            .tokens
            .next()
            .ok_or(ParseError::UnexpectedEof { expected })?;
        self.position += 1;
        Ok(token)
    }

    fn invalid(&self, expected: &'static str, token: &str) -> ParseError {
        ParseError::InvalidToken {
            expected,
            token: token.to_string(),
            position: self.position,
        }
    }

    /// Tokens consumed so far
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Read N followed by N node records
pub fn read_tree(
    stream: &mut TokenStream<'_>,
    layout: InputLayout,
) -> Result<Vec<NodeSpec>, ParseError> {
    let node_count: usize = stream.next("node count")?;
    let mut nodes = Vec::with_capacity(node_count.min(MAX_PREALLOC));

    for _ in 0..node_count {
        let child_count: usize = stream.next("child count")?;
        if child_count == 0 {
            nodes.push(NodeSpec::leaf());
            continue;
        }

        let switch_target = match layout {
            InputLayout::ExplicitSwitch => Some(stream.next("switch target")?),
            InputLayout::FirstChild => None,
        };

        let mut children = Vec::with_capacity(child_count.min(MAX_PREALLOC));
        for _ in 0..child_count {
            children.push(stream.next("child id")?);
        }

        nodes.push(match switch_target {
            Some(target) => NodeSpec::new(target, children),
            None => NodeSpec::first_child(children),
        });
    }

    Ok(nodes)
}

/// Read Q followed by Q target ids
pub fn read_queries(stream: &mut TokenStream<'_>) -> Result<Vec<i64>, ParseError> {
    let query_count: usize = stream.next("query count")?;
    let mut targets = Vec::with_capacity(query_count.min(MAX_PREALLOC));
    for _ in 0..query_count {
        targets.push(stream.next_target("query target")?);
    }
    Ok(targets)
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One answer per query, in input order
    pub answers: Vec<i64>,

    /// Engine counters after the last query
    pub stats: EngineStats,

    /// Initial tree rendering, when requested
    pub tree_dump: Option<String>,
}

impl RunReport {
    /// Answers as newline-terminated lines
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.answers.len() * 4);
        for answer in &self.answers {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{}", answer);
        }
        out
    }
}

/// Parse the whole input, build the tree and answer every query in order
pub fn run(input: &str, config: &RunConfig) -> Result<RunReport, ParseError> {
    let mut stream = TokenStream::new(input);
    let nodes = read_tree(&mut stream, config.layout)?;
    let tree = SwitchTree::build(nodes, config.validation)?;
    let tree_dump = config.dump_tree.then(|| tree.to_string());

    let targets = read_queries(&mut stream)?;
    tracing::debug!(
        nodes = tree.node_count(),
        queries = targets.len(),
        tokens = stream.position(),
        "input parsed"
    );

    let mut engine = QueryEngine::new(tree);
    let answers = engine.answer_all(targets);

    Ok(RunReport {
        answers,
        stats: engine.stats().clone(),
        tree_dump,
    })
}

/// Shape summary of a tree, without answering any queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of nodes N
    pub nodes: usize,

    /// Largest depth among nodes connected to the root
    pub max_depth: usize,

    /// Nodes whose parent chain does not reach the root
    pub unreachable: Vec<NodeId>,
}

impl CheckReport {
    /// Summarize a built tree
    pub fn from_tree(tree: &SwitchTree) -> Self {
        let topology = tree.topology();
        let depths = topology.depths();
        Self {
            nodes: tree.node_count(),
            max_depth: depths.iter().flatten().copied().max().unwrap_or(0),
            unreachable: depths
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, depth)| depth.is_none())
                .map(|(node, _)| node)
                .collect(),
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes: {}", self.nodes)?;
        writeln!(f, "max depth: {}", self.max_depth)?;
        if self.unreachable.is_empty() {
            writeln!(f, "all nodes reach the root")
        } else {
            let list: Vec<String> = self.unreachable.iter().map(|n| n.to_string()).collect();
            writeln!(f, "unreachable: {}", list.join(" "))
        }
    }
}

/// Parse and build the tree part of the input, ignoring any queries
pub fn check(input: &str, config: &RunConfig) -> Result<CheckReport, ParseError> {
    let mut stream = TokenStream::new(input);
    let nodes = read_tree(&mut stream, config.layout)?;
    let tree = SwitchTree::build(nodes, config.validation)?;
    Ok(CheckReport::from_tree(&tree))
}
