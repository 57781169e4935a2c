//! Shared search plumbing: outcomes and the per-call budget.

use std::time::Instant;

use super::SearchLimits;

/// Output levels found by a search, parallel to the merit-ordered units.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub levels: Vec<f64>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found { allocation: Allocation, nodes: usize },
    /// Every branch was explored without a feasible allocation.
    Exhausted { nodes: usize },
    /// The node or time budget ran out first.
    BudgetExceeded { nodes: usize, incumbent: Option<Allocation> },
}

/// How often the wall clock is consulted, in expanded nodes.
const CLOCK_CHECK_INTERVAL: usize = 256;

/// Node and wall-clock accounting for one solve.
#[derive(Debug)]
pub struct SearchBudget {
    limits: SearchLimits,
    started: Instant,
    nodes: usize,
}

impl SearchBudget {
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            limits,
            started: Instant::now(),
            nodes: 0,
        }
    }

    /// Count one expanded node; `false` once either budget is spent.
    pub fn expand(&mut self) -> bool {
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return false;
        }
        self.nodes % CLOCK_CHECK_INTERVAL != 0 || self.started.elapsed() <= self.limits.time_budget
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_node_budget() {
        let mut budget = SearchBudget::new(SearchLimits::new(3, Duration::from_secs(60)));
        assert!(budget.expand());
        assert!(budget.expand());
        assert!(budget.expand());
        assert!(!budget.expand());
        assert_eq!(budget.nodes(), 4);
    }

    #[test]
    fn test_time_budget() {
        let mut budget = SearchBudget::new(SearchLimits::new(usize::MAX, Duration::ZERO));
        std::thread::sleep(Duration::from_millis(1));
        let spent = (0..CLOCK_CHECK_INTERVAL).all(|_| budget.expand());
        assert!(!spent);
    }
}
