//! Branch and bound over unit commitments.
//!
//! Each node decides whether the next merit-ordered unit is committed. A node
//! whose committed floors and ceilings bracket the demand is a candidate plan,
//! priced by [`dispatch_committed`]. Committing further units below it only
//! adds output from units at least as expensive, so the subtree is closed
//! there.
//!
//! Zero-cost units are first pinned at `min(effective_max, remaining)` and
//! always committed; the unrestricted tree is searched only when no plan
//! exists around them.

use tracing::debug;

use super::{
    dispatch_committed, plan_cost, Allocation, AnnotatedUnit, SearchBudget, SearchLimits,
    SearchOutcome, SEARCH_EPSILON_MW,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Evaluate,
    Commit,
    Skip,
    Done,
}

#[derive(Debug, Clone)]
struct Node {
    index: usize,
    committed: Vec<bool>,
    floor: f64,
    ceiling: f64,
    floor_cost: f64,
    cheapest_committed: f64,
    next: Branch,
}

pub struct CommitmentSearch<'a> {
    units: &'a [AnnotatedUnit],
    demand_mw: f64,
    limits: SearchLimits,
}

impl<'a> CommitmentSearch<'a> {
    /// `units` must already be in merit order.
    pub fn new(units: &'a [AnnotatedUnit], demand_mw: f64, limits: SearchLimits) -> Self {
        Self {
            units,
            demand_mw,
            limits,
        }
    }

    /// Cheapest allocation over every commitment. Both passes share one budget.
    pub fn run(&self) -> SearchOutcome {
        let mut budget = SearchBudget::new(self.limits);

        if let Some((pinned, forced)) = self.pin_zero_cost() {
            match self.solve(&pinned, &forced, &mut budget) {
                SearchOutcome::Exhausted { nodes } => {
                    debug!(nodes, "no commitment with zero-cost units at full output");
                }
                outcome => return outcome,
            }
        }

        self.solve(self.units, &vec![false; self.units.len()], &mut budget)
    }

    /// Zero-cost units narrowed to a single level each, taken in merit order
    /// against the demand. `None` when there are none, or one cannot run at
    /// its pinned level.
    fn pin_zero_cost(&self) -> Option<(Vec<AnnotatedUnit>, Vec<bool>)> {
        if !self.units.iter().any(AnnotatedUnit::is_zero_cost) {
            return None;
        }

        let mut pinned = self.units.to_vec();
        let mut forced = vec![false; pinned.len()];
        let mut remaining = self.demand_mw;
        for (unit, held) in pinned.iter_mut().zip(forced.iter_mut()) {
            if !unit.is_zero_cost() {
                continue;
            }
            let level = unit.effective_max.min(remaining.max(0.0));
            if level > SEARCH_EPSILON_MW && level + SEARCH_EPSILON_MW < unit.effective_min {
                return None;
            }
            unit.effective_min = level;
            unit.effective_max = level;
            *held = true;
            remaining -= level;
        }
        Some((pinned, forced))
    }

    /// Tree walk over `units`; `forced` units are never skipped.
    fn solve(
        &self,
        units: &[AnnotatedUnit],
        forced: &[bool],
        budget: &mut SearchBudget,
    ) -> SearchOutcome {
        let n = units.len();
        let mut suffix_ceiling = vec![0.0; n + 1];
        for i in (0..n).rev() {
            suffix_ceiling[i] = suffix_ceiling[i + 1] + units[i].effective_max;
        }
        let mut best: Option<Allocation> = None;

        let mut stack = vec![Node {
            index: 0,
            committed: vec![false; n],
            floor: 0.0,
            ceiling: 0.0,
            floor_cost: 0.0,
            cheapest_committed: f64::INFINITY,
            next: Branch::Evaluate,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            let node = &stack[top];

            match node.next {
                Branch::Evaluate => {
                    if !budget.expand() {
                        return SearchOutcome::BudgetExceeded {
                            nodes: budget.nodes(),
                            incumbent: best,
                        };
                    }
                    if node.floor > self.demand_mw + SEARCH_EPSILON_MW {
                        stack.pop();
                        continue;
                    }
                    if self.covers_demand(node) {
                        let levels = dispatch_committed(units, &node.committed, self.demand_mw);
                        let cost = plan_cost(units, &levels);
                        if best.as_ref().map_or(true, |b| cost < b.cost - SEARCH_EPSILON_MW) {
                            best = Some(Allocation { levels, cost });
                        }
                        stack.pop();
                        continue;
                    }
                    let reachable = node.ceiling + suffix_ceiling[node.index] + SEARCH_EPSILON_MW
                        >= self.demand_mw;
                    let bounded_out = best.as_ref().is_some_and(|b| {
                        self.lower_bound(units, node) >= b.cost - SEARCH_EPSILON_MW
                    });
                    if node.index == n || !reachable || bounded_out {
                        stack.pop();
                        continue;
                    }
                    stack[top].next = Branch::Commit;
                }
                Branch::Commit => {
                    let unit = &units[node.index];
                    let mut child = node.clone();
                    child.committed[node.index] = true;
                    child.index += 1;
                    child.floor += unit.effective_min;
                    child.ceiling += unit.effective_max;
                    child.floor_cost += unit.effective_min * unit.marginal_cost;
                    if unit.headroom() > SEARCH_EPSILON_MW {
                        child.cheapest_committed = child.cheapest_committed.min(unit.marginal_cost);
                    }
                    child.next = Branch::Evaluate;
                    stack[top].next = Branch::Skip;
                    stack.push(child);
                }
                Branch::Skip => {
                    let child = (!forced[node.index]).then(|| {
                        let mut child = node.clone();
                        child.index += 1;
                        child.next = Branch::Evaluate;
                        child
                    });
                    stack[top].next = Branch::Done;
                    stack.extend(child);
                }
                Branch::Done => {
                    stack.pop();
                }
            }
        }

        match best {
            Some(allocation) => SearchOutcome::Found {
                allocation,
                nodes: budget.nodes(),
            },
            None => SearchOutcome::Exhausted {
                nodes: budget.nodes(),
            },
        }
    }

    fn covers_demand(&self, node: &Node) -> bool {
        node.floor <= self.demand_mw + SEARCH_EPSILON_MW
            && node.ceiling + SEARCH_EPSILON_MW >= self.demand_mw
    }

    /// Floors at their own cost, the rest at the cheapest price still
    /// available below this node.
    fn lower_bound(&self, units: &[AnnotatedUnit], node: &Node) -> f64 {
        let next_cost = units
            .get(node.index)
            .map_or(f64::INFINITY, |u| u.marginal_cost);
        let cheapest = node.cheapest_committed.min(next_cost);
        node.floor_cost + (self.demand_mw - node.floor).max(0.0) * cheapest
    }
}
