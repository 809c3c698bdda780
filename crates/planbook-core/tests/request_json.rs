//! Integration tests for the JSON request boundary

use planbook_core::request::{ComparisonRequest, ExportRequest, RequestError};
use planbook_core::AccountType;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn year_json(year: i32) -> Value {
    json!({
        "year": year,
        "yearsFromStart": year - 2025,
        "primaryAge": 65 + (year - 2025),
        "spouseAge": null,
        "incomeByIndividual": {
            "p1": { "employment": 0.0, "rrq": 12000.0, "psv": 8000.0 }
        },
        "totalIncome": 20000.0,
        "totalExpenses": 18000.0,
        "expensesByCategory": { "housing": 9000.0, "dailyLiving": 9000.0 },
        "netCashFlow": 2000.0,
        "assetsStartOfYear": { "a1": 100000.0 },
        "assetsEndOfYear": { "a1": 102000.0 },
        "netWorthStartOfYear": 100000.0,
        "netWorthEndOfYear": 102000.0
    })
}

fn request_json(years: Vec<Value>) -> Value {
    json!({
        "projection": {
            "scenarioId": "s1",
            "projectId": "p1",
            "startYear": 2025,
            "endYear": 2027,
            "useConstantDollars": true,
            "inflationRate": 0.021,
            "years": years,
            "calculatedAt": "2025-06-01T09:30:00.000Z"
        },
        "scenarioName": "Retire at 65",
        "assets": [
            { "id": "a1", "runtimeType": "Cash" },
            { "id": "h1", "runtimeType": "realEstate" }
        ]
    })
}

#[test]
fn parses_complete_request() {
    let body = request_json(vec![year_json(2025), year_json(2026)]).to_string();
    let request = ExportRequest::from_json(&body).unwrap();

    assert_eq!(request.scenario_name, "Retire at 65");
    assert_eq!(request.projection.years.len(), 2);
    assert!(request.projection.use_constant_dollars);
    assert_eq!(request.assets[1].account_type(), Some(AccountType::RealEstate));

    let first = &request.projection.years[0];
    assert_eq!(first.primary_age, Some(65));
    assert_eq!(first.spouse_age, None);
    assert_eq!(first.income_by_individual["p1"].total(), 20000.0);
    assert_eq!(first.federal_tax, 0.0);
    assert!(!first.has_shortfall);
}

#[test]
fn missing_required_year_field_fails() {
    let mut year = year_json(2025);
    year.as_object_mut().unwrap().remove("totalIncome");
    let body = request_json(vec![year]).to_string();

    let err = ExportRequest::from_json(&body).unwrap_err();
    assert!(matches!(err, RequestError::Json(_)));
    assert!(err.to_string().contains("totalIncome"));
}

#[test]
fn malformed_timestamp_fails() {
    let mut body = request_json(vec![year_json(2025)]);
    body["projection"]["calculatedAt"] = json!("not a date");

    let err = ExportRequest::from_json(&body.to_string()).unwrap_err();
    assert!(err.to_string().contains("Invalid timestamp"));
}

#[test]
fn non_string_timestamp_is_accepted() {
    let mut body = request_json(vec![year_json(2025)]);
    body["projection"]["calculatedAt"] = json!({ "_seconds": 1700000000 });

    assert!(ExportRequest::from_json(&body.to_string()).is_ok());
}

#[test]
fn unordered_years_fail() {
    let body = request_json(vec![year_json(2026), year_json(2025)]).to_string();
    let err = ExportRequest::from_json(&body).unwrap_err();
    assert!(err.to_string().contains("strictly increasing"));
}

#[test]
fn scenario_name_defaults_to_unknown() {
    let mut body = request_json(vec![year_json(2025)]);
    body.as_object_mut().unwrap().remove("scenarioName");

    let request = ExportRequest::from_json(&body.to_string()).unwrap();
    assert_eq!(request.scenario_name, "unknown");
}

#[test]
fn comparison_scenario_bounds() {
    let one = request_json(vec![year_json(2025)]);

    let single = json!({ "scenarios": [one.clone()] }).to_string();
    assert!(matches!(
        ComparisonRequest::from_json(&single),
        Err(RequestError::ScenarioCount(1))
    ));

    let six = json!({ "scenarios": vec![one.clone(); 6] }).to_string();
    assert!(matches!(
        ComparisonRequest::from_json(&six),
        Err(RequestError::ScenarioCount(6))
    ));

    let three = json!({ "scenarios": vec![one; 3] }).to_string();
    let scenarios = ComparisonRequest::from_json(&three).unwrap().into_scenarios();
    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[0].label, "Retire at 65");
}
