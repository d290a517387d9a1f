//! Per-query results and running counters

use std::fmt;

/// Sentinel answer for targets outside [1, N]
pub const INVALID_ANSWER: i64 = -1;

/// Result of routing one target to the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum RouteOutcome {
    /// Target outside [1, N]; nothing was touched
    OutOfRange,

    /// Target is the root; nothing to route
    Root,

    /// Walk performed
    Routed {
        /// Switches that had to flip
        flips: u32,
        /// False when the parent chain broke off before node 1
        reached_root: bool,
    },
}

impl RouteOutcome {
    /// Wire value: `-1` for invalid targets, otherwise the flip count
    pub fn answer(&self) -> i64 {
        match *self {
            RouteOutcome::OutOfRange => INVALID_ANSWER,
            RouteOutcome::Root => 0,
            RouteOutcome::Routed { flips, .. } => i64::from(flips),
        }
    }

    /// Flip count, if the target was valid
    pub fn flips(&self) -> Option<u32> {
        match *self {
            RouteOutcome::OutOfRange => None,
            RouteOutcome::Root => Some(0),
            RouteOutcome::Routed { flips, .. } => Some(flips),
        }
    }
}

/// Counters accumulated across the query stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct EngineStats {
    /// Queries answered, valid or not
    pub queries: u64,

    /// Queries rejected as out of range
    pub invalid: u64,

    /// Sum of all flips performed
    pub total_flips: u64,

    /// Walks that stopped before reaching the root
    pub broken_walks: u64,
}

impl EngineStats {
    pub(crate) fn record(&mut self, outcome: &RouteOutcome) {
        self.queries += 1;
        match *outcome {
            RouteOutcome::OutOfRange => self.invalid += 1,
            RouteOutcome::Root => {}
            RouteOutcome::Routed {
                flips,
                reached_root,
            } => {
                self.total_flips += u64::from(flips);
                if !reached_root {
                    self.broken_walks += 1;
                }
            }
        }
    }

    /// Mean flips per valid query
    pub fn mean_flips(&self) -> f64 {
        let valid = self.queries - self.invalid;
        if valid == 0 {
            0.0
        } else {
            self.total_flips as f64 / valid as f64
        }
    }
}

impl fmt::Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries={}\tinvalid={}\tflips={}\tbroken={}\tmean={:.3}",
            self.queries,
            self.invalid,
            self.total_flips,
            self.broken_walks,
            self.mean_flips()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_values() {
        assert_eq!(RouteOutcome::OutOfRange.answer(), -1);
        assert_eq!(RouteOutcome::Root.answer(), 0);
        let routed = RouteOutcome::Routed {
            flips: 3,
            reached_root: false,
        };
        assert_eq!(routed.answer(), 3);
        assert_eq!(routed.flips(), Some(3));
        assert_eq!(RouteOutcome::OutOfRange.flips(), None);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = EngineStats::default();
        stats.record(&RouteOutcome::OutOfRange);
        stats.record(&RouteOutcome::Root);
        stats.record(&RouteOutcome::Routed {
            flips: 2,
            reached_root: true,
        });
        stats.record(&RouteOutcome::Routed {
            flips: 1,
            reached_root: false,
        });

        assert_eq!(stats.queries, 4);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.total_flips, 3);
        assert_eq!(stats.broken_walks, 1);
        assert!((stats.mean_flips() - 1.0).abs() < 1e-12);
        assert_eq!(
            stats.to_string(),
            "queries=4\tinvalid=1\tflips=3\tbroken=1\tmean=1.000"
        );
    }
}
