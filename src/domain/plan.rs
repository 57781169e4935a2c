use serde::{Deserialize, Serialize};

/// Output assigned to a single unit, serialized as `{"name": .., "p": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOutput {
    pub name: String,
    #[serde(rename = "p")]
    pub output_mw: f64,
}

/// Per-unit allocation in the same order the units were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub outputs: Vec<UnitOutput>,
    /// Σ marginal cost × output of the rounded plan, EUR/h
    pub total_cost_eur_per_h: f64,
    pub strategy: String,
}

impl DispatchResult {
    pub fn total_output_mw(&self) -> f64 {
        self.outputs.iter().map(|o| o.output_mw).sum()
    }

    pub fn output_of(&self, name: &str) -> Option<f64> {
        self.outputs.iter().find(|o| o.name == name).map(|o| o.output_mw)
    }

    pub fn committed_units(&self) -> usize {
        self.outputs.iter().filter(|o| o.output_mw > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_output_wire_format() {
        let output = UnitOutput {
            name: "windpark1".to_string(),
            output_mw: 90.0,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json, serde_json::json!({"name": "windpark1", "p": 90.0}));
    }

    #[test]
    fn test_totals() {
        let result = DispatchResult {
            outputs: vec![
                UnitOutput { name: "a".into(), output_mw: 100.5 },
                UnitOutput { name: "b".into(), output_mw: 0.0 },
                UnitOutput { name: "c".into(), output_mw: 20.0 },
            ],
            total_cost_eur_per_h: 0.0,
            strategy: "test".into(),
        };
        assert!((result.total_output_mw() - 120.5).abs() < 1e-9);
        assert_eq!(result.output_of("c"), Some(20.0));
        assert_eq!(result.output_of("missing"), None);
        assert_eq!(result.committed_units(), 2);
    }
}
