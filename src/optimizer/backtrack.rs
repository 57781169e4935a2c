//! Merit-order backtracking
//!
//! Walks the ranked units keeping track of the demand still uncovered. Each
//! unit is tried, in order:
//! 1. at full fill, `min(effective_max, remaining)`, when that reaches its floor
//! 2. at its floor, when the floor is below the full-fill amount
//! 3. at its floor after earlier units give back the overshoot
//! 4. not at all
//!
//! Give-back draws from the most expensive earlier units first. The first pass
//! holds zero-cost units at full fill: they are neither skipped nor asked to
//! give back. A second, relaxed pass lifts that only when the first found
//! nothing, so wind keeps its full availability whenever the rest of the fleet
//! can cover the remainder.

use tracing::debug;

use super::{
    plan_cost, Allocation, AnnotatedUnit, SearchBudget, SearchLimits, SearchOutcome,
    SEARCH_EPSILON_MW,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    ZeroCostFixed,
    Relaxed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Evaluate,
    Fill,
    Floor,
    Rebalance,
    Skip,
    Done,
}

#[derive(Debug, Clone)]
struct Frame {
    index: usize,
    remaining: f64,
    levels: Vec<f64>,
    next: Branch,
}

impl Frame {
    fn child(&self, levels: Vec<f64>, remaining: f64) -> Frame {
        Frame {
            index: self.index + 1,
            remaining,
            levels,
            next: Branch::Evaluate,
        }
    }

    fn commit(&self, level: f64) -> Frame {
        let mut levels = self.levels.clone();
        levels[self.index] = level;
        self.child(levels, self.remaining - level)
    }
}

enum Walk {
    Found(Vec<f64>),
    Exhausted,
    OutOfBudget,
}

pub struct MeritBacktracking<'a> {
    units: &'a [AnnotatedUnit],
    demand_mw: f64,
    limits: SearchLimits,
    /// `suffix_ceiling[i]` = Σ effective_max of `units[i..]`
    suffix_ceiling: Vec<f64>,
}

impl<'a> MeritBacktracking<'a> {
    /// `units` must already be in merit order.
    pub fn new(units: &'a [AnnotatedUnit], demand_mw: f64, limits: SearchLimits) -> Self {
        let mut suffix_ceiling = vec![0.0; units.len() + 1];
        for i in (0..units.len()).rev() {
            suffix_ceiling[i] = suffix_ceiling[i + 1] + units[i].effective_max;
        }
        Self {
            units,
            demand_mw,
            limits,
            suffix_ceiling,
        }
    }

    pub fn run(&self) -> SearchOutcome {
        let mut budget = SearchBudget::new(self.limits);

        let passes: &[Pass] = if self.units.iter().any(AnnotatedUnit::is_zero_cost) {
            &[Pass::ZeroCostFixed, Pass::Relaxed]
        } else {
            &[Pass::Relaxed]
        };

        for &pass in passes {
            match self.walk(pass, &mut budget) {
                Walk::Found(levels) => {
                    let cost = plan_cost(self.units, &levels);
                    return SearchOutcome::Found {
                        allocation: Allocation { levels, cost },
                        nodes: budget.nodes(),
                    };
                }
                Walk::OutOfBudget => {
                    return SearchOutcome::BudgetExceeded {
                        nodes: budget.nodes(),
                        incumbent: None,
                    }
                }
                Walk::Exhausted => {
                    debug!(nodes = budget.nodes(), ?pass, "backtracking pass found no plan");
                }
            }
        }

        SearchOutcome::Exhausted {
            nodes: budget.nodes(),
        }
    }

    fn walk(&self, pass: Pass, budget: &mut SearchBudget) -> Walk {
        let n = self.units.len();
        let mut stack = vec![Frame {
            index: 0,
            remaining: self.demand_mw,
            levels: vec![0.0; n],
            next: Branch::Evaluate,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            let frame = &stack[top];
            let next = frame.next;

            match next {
                Branch::Evaluate => {
                    if !budget.expand() {
                        return Walk::OutOfBudget;
                    }
                    if frame.remaining <= SEARCH_EPSILON_MW {
                        return Walk::Found(frame.levels.clone());
                    }
                    if frame.index == n
                        || frame.remaining > self.suffix_ceiling[frame.index] + SEARCH_EPSILON_MW
                    {
                        stack.pop();
                        continue;
                    }
                    stack[top].next = Branch::Fill;
                }
                Branch::Fill => {
                    let unit = &self.units[frame.index];
                    let fill = unit.effective_max.min(frame.remaining);
                    let child = (fill > SEARCH_EPSILON_MW
                        && fill + SEARCH_EPSILON_MW >= unit.effective_min)
                        .then(|| frame.commit(fill));
                    stack[top].next = Branch::Floor;
                    stack.extend(child);
                }
                Branch::Floor => {
                    let unit = &self.units[frame.index];
                    let fill = unit.effective_max.min(frame.remaining);
                    let floor = unit.effective_min;
                    let child = (floor > SEARCH_EPSILON_MW
                        && floor + SEARCH_EPSILON_MW < fill
                        && floor <= frame.remaining + SEARCH_EPSILON_MW)
                        .then(|| frame.commit(floor));
                    stack[top].next = Branch::Rebalance;
                    stack.extend(child);
                }
                Branch::Rebalance => {
                    let child = self
                        .rebalance(frame, pass)
                        .map(|levels| frame.child(levels, 0.0));
                    stack[top].next = Branch::Skip;
                    stack.extend(child);
                }
                Branch::Skip => {
                    let held = pass == Pass::ZeroCostFixed && self.units[frame.index].is_zero_cost();
                    let child = (!held).then(|| frame.child(frame.levels.clone(), frame.remaining));
                    stack[top].next = Branch::Done;
                    stack.extend(child);
                }
                Branch::Done => {
                    stack.pop();
                }
            }
        }

        Walk::Exhausted
    }

    /// Levels with the current unit at its floor and the overshoot taken
    /// back from earlier units, most expensive first. `None` when the floor
    /// already fits or the earlier units cannot give back enough.
    fn rebalance(&self, frame: &Frame, pass: Pass) -> Option<Vec<f64>> {
        let unit = &self.units[frame.index];
        let mut needed = unit.effective_min - frame.remaining;
        if needed <= SEARCH_EPSILON_MW {
            return None;
        }

        let mut levels = frame.levels.clone();
        for (donor, level) in self.units.iter().zip(levels[..frame.index].iter_mut()).rev() {
            if needed <= SEARCH_EPSILON_MW {
                break;
            }
            if *level <= 0.0 || (pass == Pass::ZeroCostFixed && donor.is_zero_cost()) {
                continue;
            }
            let spare = (*level - donor.effective_min).max(0.0);
            let taken = spare.min(needed);
            *level -= taken;
            needed -= taken;
        }

        if needed > SEARCH_EPSILON_MW {
            return None;
        }
        levels[frame.index] = unit.effective_min;
        Some(levels)
    }
}
