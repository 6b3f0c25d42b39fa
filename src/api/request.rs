//! Request types for the payroll API.

use serde::{Deserialize, Serialize};

use crate::models::{FamilyInput, Jurisdiction, SectorOptions, WorkerInput};

/// Request body for `POST /payroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// The worker.
    pub worker: WorkerInput,
    /// Family data; no children when omitted.
    #[serde(default)]
    pub family: FamilyInput,
    /// Region id.
    pub region: String,
    /// Sector id; the engine's default sector when omitted.
    #[serde(default)]
    pub sector: Option<String>,
    /// Monthly hours and holidays for the sector checks.
    #[serde(default)]
    pub options: SectorOptions,
}

impl PayrollRequest {
    /// The region/sector selector of this request.
    pub fn jurisdiction(&self) -> Jurisdiction {
        Jurisdiction {
            region: self.region.clone(),
            sector: self.sector.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_request_uses_defaults() {
        let request: PayrollRequest = serde_json::from_value(json!({
            "worker": {"category": "cocinero", "wage_table": "TABLA_I", "level": "LEVEL_III"},
            "region": "valencia"
        }))
        .unwrap();
        assert_eq!(request.family.children, 0);
        assert_eq!(request.options, SectorOptions::default());
        assert_eq!(request.jurisdiction(), Jurisdiction::region("valencia"));
    }

    #[test]
    fn test_full_request() {
        let request: PayrollRequest = serde_json::from_value(json!({
            "worker": {
                "category": "limpiador",
                "wage_table": "TABLA_I",
                "level": "LEVEL_II",
                "urban_zone": true,
                "applies_transport": true,
                "uniform_items": ["guantes_latex"]
            },
            "family": {"children": 2},
            "region": "madrid",
            "sector": "limpieza_nacional",
            "options": {"night_hours": 12}
        }))
        .unwrap();
        assert!(request.worker.urban_zone);
        assert_eq!(request.worker.uniform_items, vec!["guantes_latex"]);
        assert_eq!(request.options.night_hours, 12);
        assert_eq!(
            request.jurisdiction(),
            Jurisdiction::new("madrid", "limpieza_nacional")
        );
    }
}
