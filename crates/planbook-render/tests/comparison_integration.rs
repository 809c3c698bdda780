//! Integration tests for comparison workbooks

use planbook_core::{Projection, Scenario, YearlyProjection};
use planbook_render::{CellStyle, CellValue, ExcelRenderer, RecordingSink, Trend};
use pretty_assertions::assert_eq;

fn scenario(label: &str, income: f64, first_year: i32, count: u32) -> Scenario {
    let years: Vec<YearlyProjection> = (0..count)
        .map(|i| {
            let net_worth = 500000.0 + 1000.0 * f64::from(i);
            let mut year = YearlyProjection::new(first_year + i as i32, i)
                .net_worth(net_worth, net_worth + 1000.0);
            year.total_income = income;
            year
        })
        .collect();
    let last_year = first_year + count as i32 - 1;
    let projection = Projection::new(label, "p1", first_year, last_year, years).unwrap();
    Scenario::new(projection, label, Vec::new())
}

fn three_scenarios() -> Vec<Scenario> {
    vec![
        scenario("Base", 50000.0, 2025, 3),
        scenario("Work longer", 60000.0, 2025, 3),
        scenario("Retire early", 40000.0, 2025, 3),
    ]
}

fn record(scenarios: &[Scenario]) -> RecordingSink {
    let mut sink = RecordingSink::new();
    ExcelRenderer::new().compare_into(scenarios, &mut sink).unwrap();
    sink
}

#[test]
fn comparison_sheets() {
    let sink = record(&three_scenarios());
    assert_eq!(
        sink.sheet_names(),
        vec!["Comparison", "Net Worth by Year", "Comparison Charts"]
    );
}

#[test]
fn income_deltas_are_colored_against_baseline() {
    let sink = record(&three_scenarios());
    let sheet = sink.sheet("Comparison").unwrap();
    let row = sheet.find_in_column(0, "Total Income (All Years)").unwrap();

    let base = sheet.find_in_row(2, "Base").unwrap();
    let higher = sheet.find_in_row(2, "Work longer").unwrap();
    let lower = sheet.find_in_row(2, "Retire early").unwrap();

    // Baseline carries no comparison coloring
    assert_eq!(sheet.value(row, base), Some(&CellValue::Number(150000.0)));
    assert!(matches!(sheet.style(row, base), Some(CellStyle::Currency(_))));
    assert_eq!(sheet.value(row, base + 1), Some(&CellValue::Number(180000.0)));

    // Delta columns follow each non-baseline value column
    assert_eq!(higher, base + 1);
    assert_eq!(sheet.value(row, higher + 1), Some(&CellValue::Number(30000.0)));
    assert_eq!(
        sheet.style(row, higher + 1),
        Some(CellStyle::Delta(Trend::Improvement))
    );
    assert_eq!(sheet.value(row, lower + 1), Some(&CellValue::Number(-30000.0)));
    assert_eq!(
        sheet.style(row, lower + 1),
        Some(CellStyle::Delta(Trend::Regression))
    );
}

#[test]
fn equal_values_are_neutral() {
    let sink = record(&three_scenarios());
    let sheet = sink.sheet("Comparison").unwrap();
    let row = sheet.find_in_column(0, "Final Net Worth").unwrap();
    let higher = sheet.find_in_row(2, "Work longer").unwrap();

    assert_eq!(sheet.value(row, higher + 1), Some(&CellValue::Number(0.0)));
    assert_eq!(
        sheet.style(row, higher + 1),
        Some(CellStyle::Delta(Trend::Unchanged))
    );
}

#[test]
fn net_worth_by_year_leaves_gaps_blank() {
    let scenarios = vec![
        scenario("Base", 50000.0, 2025, 2),
        scenario("Later", 50000.0, 2026, 2),
    ];
    let sink = record(&scenarios);
    let sheet = sink.sheet("Net Worth by Year").unwrap();

    assert_eq!(sheet.value(1, 0), Some(&CellValue::Integer(2025)));
    assert_eq!(sheet.value(3, 0), Some(&CellValue::Integer(2027)));
    assert_eq!(sheet.value(1, 1), Some(&CellValue::Number(501000.0)));
    assert_eq!(sheet.value(1, 2), Some(&CellValue::Blank));
    assert_eq!(sheet.value(3, 1), Some(&CellValue::Blank));
    assert_eq!(sheet.value(3, 2), Some(&CellValue::Number(502000.0)));

    let chart = &sink.sheet("Comparison Charts").unwrap().charts[0].chart;
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[1].values, "'Net Worth by Year'!$C$2:$C$4");
}

#[test]
fn scenario_count_outside_bounds_is_rejected() {
    let one = vec![scenario("Only", 1.0, 2025, 1)];
    let mut sink = RecordingSink::new();
    assert!(ExcelRenderer::new().compare_into(&one, &mut sink).is_err());
    assert!(sink.sheets().is_empty());

    let six: Vec<Scenario> = (0..6).map(|i| scenario(&format!("S{i}"), 1.0, 2025, 1)).collect();
    assert!(ExcelRenderer::new().compare_to_bytes(&six).is_err());
}

#[test]
fn comparison_bytes_are_a_zip() {
    let bytes = ExcelRenderer::new().compare_to_bytes(&three_scenarios()).unwrap();
    assert_eq!(&bytes[0..2], b"PK");
}
