use serde::{Deserialize, Serialize};

/// Instantaneous prices and wind availability for one dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// EUR/MWh of natural gas
    pub gas_price: f64,
    /// EUR/MWh of kerosine burnt by turbojets
    pub distillate_price: f64,
    /// EUR per ton of CO2 emitted
    pub co2_price: f64,
    /// Share of nameplate wind capacity deliverable right now, in [0, 1]
    pub wind_availability: f64,
}

impl MarketSnapshot {
    pub fn new(gas_price: f64, distillate_price: f64, co2_price: f64, wind_availability: f64) -> Self {
        Self {
            gas_price,
            distillate_price,
            co2_price,
            wind_availability,
        }
    }

    /// Build a snapshot from a wind availability expressed in percent.
    pub fn with_wind_percent(
        gas_price: f64,
        distillate_price: f64,
        co2_price: f64,
        wind_percent: f64,
    ) -> Self {
        Self::new(gas_price, distillate_price, co2_price, wind_percent / 100.0)
    }
}
