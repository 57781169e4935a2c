use crate::optimizer::{
    AnnotatedUnit, DispatchStrategy, MeritBacktracking, SearchLimits, SearchOutcome,
};

/// Fills units cheapest-first and returns the first plan that covers the
/// load. Optimal whenever minimum outputs do not force a cheap unit to be
/// curtailed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFeasibleStrategy;

impl DispatchStrategy for FirstFeasibleStrategy {
    fn name(&self) -> &'static str {
        "first_feasible"
    }

    fn search(&self, units: &[AnnotatedUnit], demand_mw: f64, limits: &SearchLimits) -> SearchOutcome {
        MeritBacktracking::new(units, demand_mw, *limits).run()
    }
}
