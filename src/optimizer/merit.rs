//! Merit order ranking and economic dispatch of a committed unit set.

use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use super::AnnotatedUnit;

/// Rank contributing units by ascending marginal cost.
///
/// Ties go to the more efficient unit, then to the earlier input position,
/// so the ranking never depends on sort stability. Units whose effective
/// maximum is zero are dropped.
pub fn merit_order(units: &[AnnotatedUnit]) -> Vec<AnnotatedUnit> {
    units
        .iter()
        .filter(|u| u.can_contribute())
        .sorted_by_key(|u| {
            (
                OrderedFloat(u.marginal_cost),
                Reverse(OrderedFloat(u.efficiency)),
                u.index,
            )
        })
        .cloned()
        .collect()
}

/// Cheapest output levels for a fixed commitment.
///
/// Every committed unit starts at its floor; the residual demand is then
/// filled cheapest-first up to each unit's effective maximum. `units` must be
/// in merit order and `committed` parallel to it. Uncommitted units get 0.
pub fn dispatch_committed(units: &[AnnotatedUnit], committed: &[bool], demand_mw: f64) -> Vec<f64> {
    let mut levels: Vec<f64> = units
        .iter()
        .zip(committed)
        .map(|(u, &on)| if on { u.effective_min } else { 0.0 })
        .collect();

    let mut residual = demand_mw - levels.iter().sum::<f64>();
    for ((unit, &on), level) in units.iter().zip(committed).zip(levels.iter_mut()) {
        if !on || residual <= 0.0 {
            continue;
        }
        let extra = unit.headroom().min(residual);
        *level += extra;
        residual -= extra;
    }

    levels
}

/// Σ marginal cost × output, EUR/h.
pub fn plan_cost(units: &[AnnotatedUnit], levels: &[f64]) -> f64 {
    units
        .iter()
        .zip(levels)
        .map(|(u, level)| u.marginal_cost * level)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(index: usize, cost: f64, efficiency: f64, min: f64, max: f64) -> AnnotatedUnit {
        AnnotatedUnit {
            index,
            name: format!("u{}", index),
            efficiency,
            marginal_cost: cost,
            effective_min: min,
            effective_max: max,
        }
    }

    #[test]
    fn test_merit_order_ranks_by_cost_then_efficiency_then_input() {
        let units = vec![
            unit(0, 30.0, 0.5, 0.0, 10.0),
            unit(1, 10.0, 0.4, 0.0, 10.0),
            unit(2, 10.0, 0.6, 0.0, 10.0),
            unit(3, 0.0, 1.0, 0.0, 10.0),
            unit(4, 10.0, 0.6, 0.0, 10.0),
        ];
        let order: Vec<usize> = merit_order(&units).iter().map(|u| u.index).collect();
        assert_eq!(order, vec![3, 2, 4, 1, 0]);
    }

    #[test]
    fn test_merit_order_drops_units_without_capacity() {
        let units = vec![unit(0, 0.0, 1.0, 0.0, 0.0), unit(1, 20.0, 0.5, 10.0, 50.0)];
        let ranked = merit_order(&units);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn test_merit_order_drops_units_with_negligible_capacity() {
        // what a near-zero wind availability leaves of a park
        let units = vec![unit(0, 0.0, 1.0, 0.0, 1e-9), unit(1, 20.0, 0.5, 0.0, 50.0)];
        let ranked = merit_order(&units);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn test_dispatch_fills_cheapest_after_floors() {
        let units = vec![
            unit(0, 0.0, 1.0, 0.0, 90.0),
            unit(1, 25.0, 0.53, 100.0, 460.0),
            unit(2, 25.0, 0.53, 100.0, 460.0),
        ];
        let levels = dispatch_committed(&units, &[true, true, true], 910.0);
        assert_eq!(levels, vec![90.0, 460.0, 360.0]);
    }

    #[test]
    fn test_dispatch_leaves_uncommitted_at_zero() {
        let units = vec![unit(0, 10.0, 0.5, 50.0, 100.0), unit(1, 20.0, 0.5, 0.0, 100.0)];
        let levels = dispatch_committed(&units, &[false, true], 60.0);
        assert_eq!(levels, vec![0.0, 60.0]);
    }

    #[test]
    fn test_plan_cost() {
        let units = vec![unit(0, 10.0, 0.5, 0.0, 100.0), unit(1, 20.0, 0.5, 0.0, 100.0)];
        assert_eq!(plan_cost(&units, &[5.0, 2.0]), 90.0);
    }
}
