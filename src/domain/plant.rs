use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumString;

/// Technology class of a generating unit.
///
/// Parsing never fails: a type string that is not recognised is kept in
/// [`PlantKind::Unknown`] so the cost model can reject it with the unit name
/// attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlantKind {
    #[strum(serialize = "gasfired", serialize = "gas", ascii_case_insensitive)]
    GasFired,
    #[strum(serialize = "turbojet", ascii_case_insensitive)]
    Turbojet,
    #[strum(serialize = "windturbine", serialize = "wind", ascii_case_insensitive)]
    WindTurbine,
    #[strum(default)]
    Unknown(String),
}

impl PlantKind {
    pub fn is_wind(&self) -> bool {
        matches!(self, PlantKind::WindTurbine)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlantKind::GasFired => "gasfired",
            PlantKind::Turbojet => "turbojet",
            PlantKind::WindTurbine => "windturbine",
            PlantKind::Unknown(kind) => kind,
        }
    }
}

impl From<String> for PlantKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(_) => PlantKind::Unknown(s),
        }
    }
}

impl From<PlantKind> for String {
    fn from(kind: PlantKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PlantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatchable resource and its physical envelope, in MW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratingUnit {
    pub name: String,
    pub kind: PlantKind,
    /// Fraction of fuel energy delivered as electricity. Irrelevant for wind.
    pub efficiency: f64,
    pub min_output_mw: f64,
    pub max_output_mw: f64,
}

impl GeneratingUnit {
    pub fn new(
        name: impl Into<String>,
        kind: PlantKind,
        efficiency: f64,
        min_output_mw: f64,
        max_output_mw: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            efficiency,
            min_output_mw,
            max_output_mw,
        }
    }

    pub fn gas(name: impl Into<String>, efficiency: f64, min_mw: f64, max_mw: f64) -> Self {
        Self::new(name, PlantKind::GasFired, efficiency, min_mw, max_mw)
    }

    pub fn turbojet(name: impl Into<String>, efficiency: f64, min_mw: f64, max_mw: f64) -> Self {
        Self::new(name, PlantKind::Turbojet, efficiency, min_mw, max_mw)
    }

    pub fn wind(name: impl Into<String>, max_mw: f64) -> Self {
        Self::new(name, PlantKind::WindTurbine, 1.0, 0.0, max_mw)
    }
}
