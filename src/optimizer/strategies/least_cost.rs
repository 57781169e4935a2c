use crate::optimizer::{
    AnnotatedUnit, CommitmentSearch, DispatchStrategy, SearchLimits, SearchOutcome,
};

/// Branch and bound over the commitment tree. Subtrees are cut when their
/// cost lower bound cannot beat the best plan found so far.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastCostStrategy;

impl DispatchStrategy for LeastCostStrategy {
    fn name(&self) -> &'static str {
        "least_cost"
    }

    fn search(&self, units: &[AnnotatedUnit], demand_mw: f64, limits: &SearchLimits) -> SearchOutcome {
        CommitmentSearch::new(units, demand_mw, *limits).run()
    }
}
