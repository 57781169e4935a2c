//! Cost & capacity model
//!
//! Pure functions turning a generating unit plus the current market snapshot
//! into a marginal cost (EUR/MWh) and the output bounds that apply at this
//! dispatch instant.

use serde::Serialize;

use super::{DispatchError, SEARCH_EPSILON_MW};
use crate::domain::{GeneratingUnit, MarketSnapshot, PlantKind};

/// Tons of CO2 emitted per MWh produced by a gas-fired plant.
pub const CO2_TONS_PER_MWH: f64 = 0.3;

/// Marginal cost of one MWh delivered by `unit`, in EUR/MWh.
///
/// Fuel cost is divided by efficiency since a less efficient plant burns
/// proportionally more fuel per delivered MWh.
pub fn marginal_cost(unit: &GeneratingUnit, market: &MarketSnapshot) -> Result<f64, DispatchError> {
    match &unit.kind {
        PlantKind::WindTurbine => Ok(0.0),
        PlantKind::GasFired => {
            Ok(market.gas_price / unit.efficiency + CO2_TONS_PER_MWH * market.co2_price)
        }
        PlantKind::Turbojet => Ok(market.distillate_price / unit.efficiency),
        PlantKind::Unknown(kind) => Err(DispatchError::UnknownUnitKind {
            unit: unit.name.clone(),
            kind: kind.clone(),
        }),
    }
}

/// Achievable `(min, max)` output in MW for this dispatch instant.
///
/// Wind cannot be held at a non-zero floor and is capped by availability,
/// not by its nameplate maximum.
pub fn effective_capacity(
    unit: &GeneratingUnit,
    market: &MarketSnapshot,
) -> Result<(f64, f64), DispatchError> {
    match &unit.kind {
        PlantKind::WindTurbine => Ok((0.0, unit.max_output_mw * market.wind_availability)),
        PlantKind::GasFired | PlantKind::Turbojet => Ok((unit.min_output_mw, unit.max_output_mw)),
        PlantKind::Unknown(kind) => Err(DispatchError::UnknownUnitKind {
            unit: unit.name.clone(),
            kind: kind.clone(),
        }),
    }
}

/// A unit joined with its cost and bounds for the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedUnit {
    /// Position of the unit in the caller's input
    pub index: usize,
    pub name: String,
    pub efficiency: f64,
    pub marginal_cost: f64,
    pub effective_min: f64,
    pub effective_max: f64,
}

impl AnnotatedUnit {
    pub fn annotate(
        index: usize,
        unit: &GeneratingUnit,
        market: &MarketSnapshot,
    ) -> Result<Self, DispatchError> {
        let marginal_cost = marginal_cost(unit, market)?;
        let (effective_min, effective_max) = effective_capacity(unit, market)?;

        Ok(Self {
            index,
            name: unit.name.clone(),
            efficiency: unit.efficiency,
            marginal_cost,
            effective_min: effective_min.min(effective_max),
            effective_max,
        })
    }

    /// Units that cannot produce anything are left out of the search.
    pub fn can_contribute(&self) -> bool {
        self.effective_max > SEARCH_EPSILON_MW
    }

    /// Wind and anything else that produces for free.
    pub fn is_zero_cost(&self) -> bool {
        self.marginal_cost <= 0.0
    }

    pub fn headroom(&self) -> f64 {
        self.effective_max - self.effective_min
    }
}

/// Annotate every unit, failing on the first unknown kind.
pub fn annotate_all(
    units: &[GeneratingUnit],
    market: &MarketSnapshot,
) -> Result<Vec<AnnotatedUnit>, DispatchError> {
    units
        .iter()
        .enumerate()
        .map(|(index, unit)| AnnotatedUnit::annotate(index, unit, market))
        .collect()
}
