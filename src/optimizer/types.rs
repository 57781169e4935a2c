use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::{
    annotate_all, merit_order, reportable_bounds, round_output, round_within, AnnotatedUnit,
    FirstFeasibleStrategy, LeastCostStrategy, SearchLimits, SearchOutcome, DISPATCH_TOLERANCE_MW,
    SEARCH_EPSILON_MW,
};
use crate::domain::{DispatchResult, GeneratingUnit, MarketSnapshot, UnitOutput};

/// Why a demand could not be met.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InfeasibleReason {
    /// Demand is negative or not a number
    InvalidDemand,
    /// Demand exceeds Σ effective maximum of the whole fleet
    ExceedsCapacity { capacity_mw: f64 },
    /// No commitment satisfies every floor and ceiling
    NoFeasibleCommitment,
    /// The search ran out of nodes or time
    BudgetExhausted { nodes: usize },
    /// Rounded outputs drifted away from the demand
    RoundingDrift { produced_mw: f64 },
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibleReason::InvalidDemand => write!(f, "demand must be a non-negative number"),
            InfeasibleReason::ExceedsCapacity { capacity_mw } => {
                write!(f, "available capacity is only {:.1} MW", capacity_mw)
            }
            InfeasibleReason::NoFeasibleCommitment => {
                write!(f, "no combination of units satisfies their minimum and maximum outputs")
            }
            InfeasibleReason::BudgetExhausted { nodes } => {
                write!(f, "search budget exhausted after {} nodes", nodes)
            }
            InfeasibleReason::RoundingDrift { produced_mw } => {
                write!(f, "rounded plan produces {:.1} MW", produced_mw)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("unknown type '{kind}' for power plant '{unit}'")]
    UnknownUnitKind { unit: String, kind: String },

    #[error("cannot meet a load of {demand_mw} MW: {reason}")]
    InfeasibleDemand { demand_mw: f64, reason: InfeasibleReason },
}

impl DispatchError {
    fn infeasible(demand_mw: f64, reason: InfeasibleReason) -> Self {
        DispatchError::InfeasibleDemand { demand_mw, reason }
    }
}

/// Search over merit-ordered units.
///
/// Implementations receive only contributing units, already in merit order,
/// and return output levels parallel to that slice.
pub trait DispatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn search(&self, units: &[AnnotatedUnit], demand_mw: f64, limits: &SearchLimits) -> SearchOutcome;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    FirstFeasible,
    LeastCost,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn DispatchStrategy> {
        match self {
            StrategyKind::FirstFeasible => Box::new(FirstFeasibleStrategy),
            StrategyKind::LeastCost => Box::new(LeastCostStrategy),
        }
    }
}

/// Stateless entry point: annotate, rank, search, round, verify.
pub struct ProductionOptimizer {
    pub strategy: Box<dyn DispatchStrategy>,
    pub limits: SearchLimits,
}

impl Default for ProductionOptimizer {
    fn default() -> Self {
        Self::new(StrategyKind::default(), SearchLimits::default())
    }
}

impl ProductionOptimizer {
    pub fn new(kind: StrategyKind, limits: SearchLimits) -> Self {
        Self {
            strategy: kind.build(),
            limits,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    #[instrument(skip_all, fields(demand_mw = demand_mw, units = units.len(), strategy = self.strategy.name()))]
    pub fn optimize(
        &self,
        demand_mw: f64,
        market: &MarketSnapshot,
        units: &[GeneratingUnit],
    ) -> Result<DispatchResult, DispatchError> {
        let started = Instant::now();
        let annotated = annotate_all(units, market)?;

        if !demand_mw.is_finite() || demand_mw < 0.0 {
            return Err(DispatchError::infeasible(demand_mw, InfeasibleReason::InvalidDemand));
        }

        let capacity_mw: f64 = annotated.iter().map(|u| u.effective_max).sum();
        if demand_mw > capacity_mw + SEARCH_EPSILON_MW {
            warn!(capacity_mw, "load exceeds fleet capacity");
            return Err(DispatchError::infeasible(
                demand_mw,
                InfeasibleReason::ExceedsCapacity { capacity_mw },
            ));
        }

        let ranked = merit_order(&annotated);
        debug!(
            merit_order = ?ranked.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            "ranked units"
        );

        let levels = match self.strategy.search(&ranked, demand_mw, &self.limits) {
            SearchOutcome::Found { allocation, nodes } => {
                debug!(nodes, cost = allocation.cost, "plan found");
                allocation.levels
            }
            SearchOutcome::BudgetExceeded {
                nodes,
                incumbent: Some(allocation),
            } => {
                warn!(nodes, "search budget exhausted, keeping best plan so far");
                allocation.levels
            }
            SearchOutcome::BudgetExceeded { nodes, incumbent: None } => {
                warn!(nodes, "search budget exhausted");
                return Err(DispatchError::infeasible(
                    demand_mw,
                    InfeasibleReason::BudgetExhausted { nodes },
                ));
            }
            SearchOutcome::Exhausted { nodes } => {
                warn!(nodes, "no feasible commitment");
                return Err(DispatchError::infeasible(
                    demand_mw,
                    InfeasibleReason::NoFeasibleCommitment,
                ));
            }
        };

        let mut outputs = vec![0.0; annotated.len()];
        for (unit, level) in ranked.iter().zip(&levels) {
            if *level > 0.0 {
                outputs[unit.index] = round_within(*level, unit.effective_min, unit.effective_max);
            }
        }
        absorb_rounding_drift(&ranked, &mut outputs, demand_mw);

        let produced_mw: f64 = outputs.iter().sum();
        if (produced_mw - demand_mw).abs() > DISPATCH_TOLERANCE_MW + SEARCH_EPSILON_MW {
            warn!(produced_mw, "rounded plan misses the load");
            return Err(DispatchError::infeasible(
                demand_mw,
                InfeasibleReason::RoundingDrift { produced_mw },
            ));
        }

        let total_cost_eur_per_h: f64 = annotated
            .iter()
            .zip(&outputs)
            .map(|(u, p)| u.marginal_cost * p)
            .sum();

        let result = DispatchResult {
            outputs: units
                .iter()
                .zip(outputs)
                .map(|(unit, output_mw)| UnitOutput {
                    name: unit.name.clone(),
                    output_mw,
                })
                .collect(),
            total_cost_eur_per_h,
            strategy: self.strategy.name().to_string(),
        };

        info!(
            committed = result.committed_units(),
            total_cost_eur_per_h,
            elapsed_us = started.elapsed().as_micros() as u64,
            "production plan computed"
        );
        Ok(result)
    }
}

/// Spread the gap between the rounded demand and the rounded total over
/// committed units, most expensive first, keeping each inside its bounds.
fn absorb_rounding_drift(ranked: &[AnnotatedUnit], outputs: &mut [f64], demand_mw: f64) {
    let mut drift = round_output(round_output(demand_mw) - outputs.iter().sum::<f64>());

    for unit in ranked.iter().rev() {
        if drift == 0.0 {
            return;
        }
        let current = outputs[unit.index];
        if current <= 0.0 {
            continue;
        }
        let (low, high) = reportable_bounds(unit.effective_min, unit.effective_max);
        if low > high {
            continue;
        }
        let corrected = round_output((current + drift).max(low).min(high));
        drift = round_output(drift - (corrected - current));
        outputs[unit.index] = corrected;
    }
}

/// Dispatch with the default strategy and limits.
pub fn optimize(
    demand_mw: f64,
    market: &MarketSnapshot,
    units: &[GeneratingUnit],
) -> Result<DispatchResult, DispatchError> {
    ProductionOptimizer::default().optimize(demand_mw, market, units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotated(index: usize, min: f64, max: f64) -> AnnotatedUnit {
        AnnotatedUnit {
            index,
            name: format!("u{}", index),
            efficiency: 0.5,
            marginal_cost: index as f64,
            effective_min: min,
            effective_max: max,
        }
    }

    #[test]
    fn test_drift_goes_to_marginal_unit() {
        let ranked = vec![annotated(0, 0.0, 33.3), annotated(1, 0.0, 100.0)];
        // independent rounding left the total 0.1 MW short
        let mut outputs = vec![33.3, 66.7];
        absorb_rounding_drift(&ranked, &mut outputs, 100.1);
        assert_eq!(outputs, vec![33.3, 66.8]);
    }

    #[test]
    fn test_drift_skips_units_at_their_bound() {
        let ranked = vec![annotated(0, 0.0, 50.0), annotated(1, 40.0, 40.0)];
        let mut outputs = vec![49.9, 40.0];
        absorb_rounding_drift(&ranked, &mut outputs, 90.0);
        assert_eq!(outputs, vec![50.0, 40.0]);
    }

    #[test]
    fn test_drift_passes_over_units_rounded_onto_their_ceiling() {
        let ranked = vec![
            annotated(0, 0.0, 100.0),
            annotated(1, 0.0, 30.05),
            annotated(2, 0.0, 20.05),
        ];
        let mut outputs = vec![49.8, 30.0, 20.0];
        absorb_rounding_drift(&ranked, &mut outputs, 100.0);
        assert_eq!(outputs, vec![50.0, 30.0, 20.0]);
    }

    #[test]
    fn test_drift_spread_over_several_units() {
        let ranked = vec![
            annotated(0, 0.0, 100.0),
            annotated(1, 0.0, 30.15),
            annotated(2, 0.0, 20.15),
        ];
        // each dearer unit only has 0.1 MW of reportable room left
        let mut outputs = vec![49.7, 30.0, 20.0];
        absorb_rounding_drift(&ranked, &mut outputs, 100.0);
        assert_eq!(outputs, vec![49.8, 30.1, 20.1]);
    }

    #[test]
    fn test_error_messages() {
        let err = DispatchError::UnknownUnitKind {
            unit: "pv1".into(),
            kind: "solar".into(),
        };
        assert_eq!(err.to_string(), "unknown type 'solar' for power plant 'pv1'");

        let err = DispatchError::infeasible(
            1000.0,
            InfeasibleReason::ExceedsCapacity { capacity_mw: 500.0 },
        );
        assert_eq!(
            err.to_string(),
            "cannot meet a load of 1000 MW: available capacity is only 500.0 MW"
        );
    }

    #[test]
    fn test_strategy_kind_builds_named_strategy() {
        assert_eq!(StrategyKind::FirstFeasible.build().name(), "first_feasible");
        assert_eq!(StrategyKind::LeastCost.build().name(), "least_cost");
        let kind: StrategyKind = serde_json::from_str("\"least_cost\"").unwrap();
        assert_eq!(kind, StrategyKind::LeastCost);
    }
}
