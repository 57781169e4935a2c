//! `POST /productionplan`

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use crate::{
    api::{error::ApiError, AppState},
    domain::{GeneratingUnit, MarketSnapshot, PlantKind, UnitOutput},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_unique_names"))]
pub struct ProductionPlanRequest {
    /// MW to produce
    #[validate(range(exclusive_min = 0.0))]
    pub load: f64,
    #[validate(nested)]
    pub fuels: FuelsPayload,
    #[validate(length(min = 1), nested)]
    pub powerplants: Vec<PowerPlantPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FuelsPayload {
    #[serde(rename = "gas(euro/MWh)")]
    #[validate(range(min = 0.0))]
    pub gas: f64,
    #[serde(rename = "kerosine(euro/MWh)")]
    #[validate(range(min = 0.0))]
    pub kerosine: f64,
    #[serde(rename = "co2(euro/ton)")]
    #[validate(range(min = 0.0))]
    pub co2: f64,
    #[serde(rename = "wind(%)")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub wind: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_output_range"))]
pub struct PowerPlantPayload {
    #[validate(length(min = 1))]
    pub name: String,
    /// Unrecognised types are accepted here and rejected by the cost model.
    #[serde(rename = "type")]
    pub kind: PlantKind,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency: f64,
    #[validate(range(min = 0.0))]
    pub pmin: f64,
    #[validate(range(min = 0.0))]
    pub pmax: f64,
}

fn validate_output_range(plant: &PowerPlantPayload) -> Result<(), ValidationError> {
    if plant.pmin > plant.pmax {
        let mut err = ValidationError::new("pmin_above_pmax");
        err.message = Some(format!("{}: pmin must not exceed pmax", plant.name).into());
        return Err(err);
    }
    Ok(())
}

fn validate_unique_names(request: &ProductionPlanRequest) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = request
        .powerplants
        .iter()
        .find(|p| !seen.insert(p.name.as_str()))
    {
        let mut err = ValidationError::new("duplicate_name");
        err.message = Some(format!("power plant '{}' appears more than once", duplicate.name).into());
        return Err(err);
    }
    Ok(())
}

impl From<&PowerPlantPayload> for GeneratingUnit {
    fn from(plant: &PowerPlantPayload) -> Self {
        GeneratingUnit::new(
            plant.name.clone(),
            plant.kind.clone(),
            plant.efficiency,
            plant.pmin,
            plant.pmax,
        )
    }
}

impl From<&FuelsPayload> for MarketSnapshot {
    fn from(fuels: &FuelsPayload) -> Self {
        MarketSnapshot::with_wind_percent(fuels.gas, fuels.kerosine, fuels.co2, fuels.wind)
    }
}

/// POST /productionplan - Compute the production plan for a load
pub async fn production_plan(
    State(state): State<AppState>,
    payload: Result<Json<ProductionPlanRequest>, JsonRejection>,
) -> Result<Json<Vec<UnitOutput>>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let load = request.load;
    let market = MarketSnapshot::from(&request.fuels);
    let units: Vec<GeneratingUnit> = request.powerplants.iter().map(GeneratingUnit::from).collect();
    tracing::info!(load, plants = units.len(), "Production plan requested");

    let optimizer = state.optimizer.clone();
    let plan = tokio::task::spawn_blocking(move || optimizer.optimize(load, &market, &units)).await??;

    Ok(Json(plan.outputs))
}
