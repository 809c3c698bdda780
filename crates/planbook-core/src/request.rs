//! JSON request boundary
//!
//! Wire format for export requests as sent by the planning client:
//!
//! ```json
//! {
//!   "projection": { "scenarioId": "...", "years": [ ... ], ... },
//!   "scenarioName": "Retire at 62",
//!   "assets": [ { "id": "a1", "runtimeType": "Cash" } ]
//! }
//! ```
//!
//! A comparison request wraps 2 to 5 of these in `{"scenarios": [...]}`.
//! Everything here is validated on deserialization; the renderer only ever
//! receives well-formed [`Scenario`] values.

use crate::{parse_timestamp, Asset, ModelError, Projection, Scenario, YearlyProjection};
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

/// Fewest scenarios a comparison accepts
pub const MIN_COMPARISON_SCENARIOS: usize = 2;

/// Most scenarios a comparison accepts
pub const MAX_COMPARISON_SCENARIOS: usize = 5;

/// Request-level error
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid JSON in request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Comparison requires between 2 and 5 scenarios, got {0}")]
    ScenarioCount(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-scenario export request
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub projection: Projection,
    #[serde(default = "default_scenario_name")]
    pub scenario_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

fn default_scenario_name() -> String {
    "unknown".to_string()
}

impl ExportRequest {
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn into_scenario(self) -> Scenario {
        Scenario::new(self.projection, self.scenario_name, self.assets)
    }
}

/// Multi-scenario comparison request
#[derive(Clone, Debug, Deserialize)]
pub struct ComparisonRequest {
    pub scenarios: Vec<ExportRequest>,
}

impl ComparisonRequest {
    /// Parse and check the scenario count
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        let request: Self = serde_json::from_str(body)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let count = self.scenarios.len();
        if (MIN_COMPARISON_SCENARIOS..=MAX_COMPARISON_SCENARIOS).contains(&count) {
            Ok(())
        } else {
            Err(RequestError::ScenarioCount(count))
        }
    }

    /// Scenarios in request order; the first is the baseline
    pub fn into_scenarios(self) -> Vec<Scenario> {
        self.scenarios
            .into_iter()
            .map(ExportRequest::into_scenario)
            .collect()
    }
}

/// Suggested download name for a single-scenario workbook
pub fn export_filename(label: &str) -> String {
    format!("projection_{}.xlsx", sanitize_label(label))
}

/// Suggested download name for a comparison workbook
pub fn comparison_filename(scenario_count: usize) -> String {
    format!("comparison_{scenario_count}_scenarios.xlsx")
}

/// Reduce a label to a filename-safe slug
pub fn sanitize_label(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    if slug.is_empty() {
        "scenario".to_string()
    } else {
        slug
    }
}

// ============================================================================
// Wire records
// ============================================================================

/// Asset as sent by the client (`runtimeType` carries the type label)
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssetRecord {
    id: String,
    #[serde(default)]
    runtime_type: String,
}

impl From<AssetRecord> for Asset {
    fn from(record: AssetRecord) -> Self {
        Asset::new(record.id, &record.runtime_type)
    }
}

/// Projection as sent by the client, before timestamp parsing and validation
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectionRecord {
    scenario_id: String,
    project_id: String,
    start_year: i32,
    end_year: i32,
    use_constant_dollars: bool,
    inflation_rate: f64,
    years: Vec<YearlyProjection>,
    calculated_at: serde_json::Value,
}

impl TryFrom<ProjectionRecord> for Projection {
    type Error = ModelError;

    fn try_from(record: ProjectionRecord) -> Result<Self, Self::Error> {
        let calculated_at = match &record.calculated_at {
            serde_json::Value::String(raw) => parse_timestamp(raw)?,
            _ => Utc::now(),
        };
        let projection = Projection {
            scenario_id: record.scenario_id,
            project_id: record.project_id,
            start_year: record.start_year,
            end_year: record.end_year,
            use_constant_dollars: record.use_constant_dollars,
            inflation_rate: record.inflation_rate,
            years: record.years,
            calculated_at,
        };
        projection.validate()?;
        Ok(projection)
    }
}
