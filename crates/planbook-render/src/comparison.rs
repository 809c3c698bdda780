//! Multi-scenario comparison
//!
//! Computes seven KPIs per scenario and a signed delta of every non-baseline
//! scenario against the first one. Delta coloring follows the sign alone:
//! a positive delta is an improvement for every KPI, including expenses, tax
//! and shortfall.
//!
//! ```text
//! Sheet: Comparison
//! | Metric           | Base plan | Early retirement | Change vs Base plan | ...
//! | Final Net Worth  | 1,250,000 | 980,000          | -270,000            |
//! ```

use crate::chart::{column_range, ChartKind, ChartSpec, PlacedChart, SeriesFill, SeriesSpec, PALETTE};
use crate::sink::{CellValue, SheetId, WorkbookSink};
use crate::style::CellStyle;
use planbook_core::request::{MAX_COMPARISON_SCENARIOS, MIN_COMPARISON_SCENARIOS};
use planbook_core::{Projection, RenderError, Scenario};
use std::collections::{BTreeMap, BTreeSet};

pub const COMPARISON_SHEET: &str = "Comparison";
pub const NET_WORTH_SHEET: &str = "Net Worth by Year";
pub const COMPARISON_CHARTS_SHEET: &str = "Comparison Charts";

const KPI_HEADER_ROW: u32 = 2;
const LABEL_WIDTH: f64 = 24.0;
const VALUE_WIDTH: f64 = 18.0;

/// Direction of a delta against the baseline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trend {
    Improvement,
    Regression,
    Unchanged,
}

impl Trend {
    /// `diff > 0` is an improvement, `diff < 0` a regression
    pub fn of(diff: f64) -> Self {
        if diff > 0.0 {
            Trend::Improvement
        } else if diff < 0.0 {
            Trend::Regression
        } else {
            Trend::Unchanged
        }
    }
}

/// Compared indicators, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kpi {
    InitialNetWorth,
    FinalNetWorth,
    TotalIncome,
    TotalExpenses,
    TotalTax,
    ShortfallYears,
    TotalShortfall,
}

impl Kpi {
    pub const ALL: [Kpi; 7] = [
        Kpi::InitialNetWorth,
        Kpi::FinalNetWorth,
        Kpi::TotalIncome,
        Kpi::TotalExpenses,
        Kpi::TotalTax,
        Kpi::ShortfallYears,
        Kpi::TotalShortfall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Kpi::InitialNetWorth => "Initial Net Worth",
            Kpi::FinalNetWorth => "Final Net Worth",
            Kpi::TotalIncome => "Total Income (All Years)",
            Kpi::TotalExpenses => "Total Expenses (All Years)",
            Kpi::TotalTax => "Total Tax (All Years)",
            Kpi::ShortfallYears => "Shortfall Years",
            Kpi::TotalShortfall => "Total Shortfall",
        }
    }

    /// Counted rather than summed
    pub fn is_count(self) -> bool {
        matches!(self, Kpi::ShortfallYears)
    }
}

/// KPI summary of one scenario
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioKpis {
    pub label: String,
    /// `None` when the projection has no years
    pub initial_net_worth: Option<f64>,
    pub final_net_worth: Option<f64>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_tax: f64,
    pub shortfall_years: u32,
    pub total_shortfall: f64,
}

impl ScenarioKpis {
    pub fn from_projection(label: impl Into<String>, projection: &Projection) -> Self {
        let years = &projection.years;
        let shortfalls: Vec<f64> = years.iter().filter_map(|y| y.shortfall_value()).collect();
        Self {
            label: label.into(),
            initial_net_worth: projection.first_year().map(|y| y.net_worth_start_of_year),
            final_net_worth: projection.last_year().map(|y| y.net_worth_end_of_year),
            total_income: years.iter().map(|y| y.total_income).sum(),
            total_expenses: years.iter().map(|y| y.total_expenses).sum(),
            total_tax: years.iter().map(|y| y.total_tax).sum(),
            shortfall_years: shortfalls.len() as u32,
            total_shortfall: shortfalls.iter().sum(),
        }
    }

    pub fn get(&self, kpi: Kpi) -> Option<f64> {
        match kpi {
            Kpi::InitialNetWorth => self.initial_net_worth,
            Kpi::FinalNetWorth => self.final_net_worth,
            Kpi::TotalIncome => Some(self.total_income),
            Kpi::TotalExpenses => Some(self.total_expenses),
            Kpi::TotalTax => Some(self.total_tax),
            Kpi::ShortfallYears => Some(f64::from(self.shortfall_years)),
            Kpi::TotalShortfall => Some(self.total_shortfall),
        }
    }
}

/// Signed difference against the baseline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KpiDelta {
    pub value: f64,
    pub trend: Trend,
}

/// KPIs and year-by-year net worth of 2 to 5 scenarios
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonTable {
    scenarios: Vec<ScenarioKpis>,
    years: Vec<i32>,
    net_worth: Vec<BTreeMap<i32, f64>>,
}

impl ComparisonTable {
    /// Compare scenarios; the first one is the baseline
    pub fn compare(scenarios: &[Scenario]) -> Result<Self, RenderError> {
        let count = scenarios.len();
        if !(MIN_COMPARISON_SCENARIOS..=MAX_COMPARISON_SCENARIOS).contains(&count) {
            return Err(RenderError::InvalidData(format!(
                "Comparison requires between 2 and 5 scenarios, got {count}"
            )));
        }

        let kpis = scenarios
            .iter()
            .map(|s| ScenarioKpis::from_projection(&s.label, &s.projection))
            .collect();

        let net_worth: Vec<BTreeMap<i32, f64>> = scenarios
            .iter()
            .map(|s| {
                s.projection
                    .years
                    .iter()
                    .map(|y| (y.year, y.net_worth_end_of_year))
                    .collect()
            })
            .collect();

        let years: BTreeSet<i32> = net_worth.iter().flat_map(|m| m.keys().copied()).collect();

        Ok(Self {
            scenarios: kpis,
            years: years.into_iter().collect(),
            net_worth,
        })
    }

    pub fn scenarios(&self) -> &[ScenarioKpis] {
        &self.scenarios
    }

    pub fn baseline(&self) -> &ScenarioKpis {
        &self.scenarios[0]
    }

    /// Union of all scenarios' years, ascending
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// End-of-year net worth of a scenario, if it covers the year
    pub fn net_worth_at(&self, scenario: usize, year: i32) -> Option<f64> {
        self.net_worth.get(scenario)?.get(&year).copied()
    }

    /// Delta of a scenario against the baseline.
    ///
    /// `None` for the baseline itself and when either value is absent.
    pub fn delta(&self, scenario: usize, kpi: Kpi) -> Option<KpiDelta> {
        if scenario == 0 {
            return None;
        }
        let value = self.scenarios.get(scenario)?.get(kpi)?;
        let base = self.baseline().get(kpi)?;
        let diff = value - base;
        Some(KpiDelta {
            value: diff,
            trend: Trend::of(diff),
        })
    }
}

// ============================================================================
// Sheet writers
// ============================================================================

/// Write the KPI table
pub fn write_kpi_sheet<S: WorkbookSink>(
    sink: &mut S,
    sheet: SheetId,
    table: &ComparisonTable,
) -> Result<(), RenderError> {
    sink.write_text(sheet, 0, 0, "Scenario Comparison", CellStyle::Title)?;
    sink.write_text(sheet, KPI_HEADER_ROW, 0, "Metric", CellStyle::Header)?;
    sink.set_column_width(sheet, 0, LABEL_WIDTH)?;

    // (scenario index, value column, delta column)
    let mut columns = Vec::with_capacity(table.scenarios().len());
    let mut col: u16 = 1;
    for (index, scenario) in table.scenarios().iter().enumerate() {
        sink.write_text(sheet, KPI_HEADER_ROW, col, &scenario.label, CellStyle::Header)?;
        sink.set_column_width(sheet, col, VALUE_WIDTH)?;
        let value_col = col;
        col += 1;

        let delta_col = if index == 0 {
            None
        } else {
            let header = format!("Change vs {}", table.baseline().label);
            sink.write_text(sheet, KPI_HEADER_ROW, col, &header, CellStyle::Header)?;
            sink.set_column_width(sheet, col, VALUE_WIDTH)?;
            col += 1;
            Some(col - 1)
        };
        columns.push((index, value_col, delta_col));
    }

    for (offset, kpi) in Kpi::ALL.into_iter().enumerate() {
        let row = KPI_HEADER_ROW + 1 + offset as u32;
        let alt = offset % 2 == 1;
        sink.write_text(sheet, row, 0, kpi.label(), CellStyle::Label)?;

        for &(index, value_col, delta_col) in &columns {
            let value = table.scenarios()[index].get(kpi);
            let (cell, style) = kpi_cell(kpi, value, alt);
            sink.write(sheet, row, value_col, &cell, style)?;

            if let Some(delta_col) = delta_col {
                match table.delta(index, kpi) {
                    Some(delta) => sink.write_number(
                        sheet,
                        row,
                        delta_col,
                        delta.value,
                        CellStyle::Delta(delta.trend),
                    )?,
                    None => sink.write(
                        sheet,
                        row,
                        delta_col,
                        &CellValue::Blank,
                        CellStyle::Delta(Trend::Unchanged),
                    )?,
                }
            }
        }
    }

    sink.freeze_panes(sheet, KPI_HEADER_ROW + 1, 1)
}

fn kpi_cell(kpi: Kpi, value: Option<f64>, alt: bool) -> (CellValue, CellStyle) {
    match value {
        Some(v) if kpi.is_count() => (CellValue::Integer(v as i64), CellStyle::Integer { alt }),
        Some(v) => (CellValue::Number(v), CellStyle::currency(v, alt, false)),
        None => (CellValue::Blank, CellStyle::currency(0.0, alt, false)),
    }
}

/// Write the year-by-year net worth table (header row 0, years from row 1)
pub fn write_net_worth_sheet<S: WorkbookSink>(
    sink: &mut S,
    sheet: SheetId,
    table: &ComparisonTable,
) -> Result<(), RenderError> {
    sink.write_text(sheet, 0, 0, "Year", CellStyle::Header)?;
    sink.set_column_width(sheet, 0, 8.0)?;
    for (index, scenario) in table.scenarios().iter().enumerate() {
        let col = index as u16 + 1;
        sink.write_text(sheet, 0, col, &scenario.label, CellStyle::Header)?;
        sink.set_column_width(sheet, col, VALUE_WIDTH)?;
    }

    for (offset, &year) in table.years().iter().enumerate() {
        let row = offset as u32 + 1;
        let alt = offset % 2 == 1;
        sink.write(sheet, row, 0, &CellValue::Integer(year.into()), CellStyle::Integer { alt })?;
        for index in 0..table.scenarios().len() {
            let col = index as u16 + 1;
            match table.net_worth_at(index, year) {
                Some(v) => sink.write_number(sheet, row, col, v, CellStyle::currency(v, alt, false))?,
                None => sink.write(
                    sheet,
                    row,
                    col,
                    &CellValue::Blank,
                    CellStyle::currency(0.0, alt, false),
                )?,
            }
        }
    }

    sink.freeze_panes(sheet, 1, 1)
}

/// Net worth line chart with one series per scenario, `None` without years
pub fn net_worth_chart(
    table: &ComparisonTable,
    data_sheet: &str,
    amount_format: &str,
) -> Option<PlacedChart> {
    let count = table.years().len() as u32;
    if count == 0 {
        return None;
    }
    let mut chart = ChartSpec::new(ChartKind::Line, "Net Worth Comparison");
    chart.x_axis = Some("Year".into());
    chart.y_axis = Some("Net Worth".into());
    chart.y_num_format = Some(amount_format.into());

    let categories = column_range(data_sheet, 0, 1, count);
    for (index, scenario) in table.scenarios().iter().enumerate() {
        let col = index as u16 + 1;
        chart.series.push(SeriesSpec {
            name: scenario.label.clone(),
            categories: categories.clone(),
            values: column_range(data_sheet, col, 1, count),
            fill: SeriesFill::Line {
                color: PALETTE[index % PALETTE.len()],
                width: 2.25,
            },
        });
    }

    Some(PlacedChart {
        row: 1,
        col: 1,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbook_core::YearlyProjection;
    use pretty_assertions::assert_eq;

    fn scenario(label: &str, years: Vec<YearlyProjection>) -> Scenario {
        let start = years.first().map_or(2025, |y| y.year);
        let end = years.last().map_or(2025, |y| y.year);
        let projection = Projection::new(label, "p", start, end, years).unwrap();
        Scenario::new(projection, label, Vec::new())
    }

    fn year(y: i32, income: f64, net_worth: f64) -> YearlyProjection {
        let mut year = YearlyProjection::new(y, (y - 2025) as u32).net_worth(net_worth - 1000.0, net_worth);
        year.total_income = income;
        year.total_expenses = income * 0.8;
        year.total_tax = income * 0.1;
        year
    }

    #[test]
    fn trend_follows_sign() {
        assert_eq!(Trend::of(0.5), Trend::Improvement);
        assert_eq!(Trend::of(-0.5), Trend::Regression);
        assert_eq!(Trend::of(0.0), Trend::Unchanged);
    }

    #[test]
    fn kpis_sum_across_years() {
        let s = scenario(
            "A",
            vec![
                year(2025, 50000.0, 500000.0),
                year(2026, 52000.0, 510000.0).shortfall(1500.0),
                year(2027, 0.0, 505000.0).shortfall(700.0),
            ],
        );
        let kpis = ScenarioKpis::from_projection("A", &s.projection);
        assert_eq!(kpis.initial_net_worth, Some(499000.0));
        assert_eq!(kpis.final_net_worth, Some(505000.0));
        assert_eq!(kpis.total_income, 102000.0);
        assert_eq!(kpis.shortfall_years, 2);
        assert_eq!(kpis.total_shortfall, 2200.0);
    }

    #[test]
    fn empty_projection_has_absent_endpoints() {
        let s = scenario("Empty", Vec::new());
        let kpis = ScenarioKpis::from_projection("Empty", &s.projection);
        assert_eq!(kpis.get(Kpi::InitialNetWorth), None);
        assert_eq!(kpis.get(Kpi::FinalNetWorth), None);
        assert_eq!(kpis.get(Kpi::TotalIncome), Some(0.0));
    }

    #[test]
    fn scenario_count_is_bounded() {
        let one = vec![scenario("A", vec![year(2025, 1.0, 1.0)])];
        assert!(ComparisonTable::compare(&one).is_err());

        let six: Vec<Scenario> = (0..6)
            .map(|i| scenario(&format!("S{i}"), vec![year(2025, 1.0, 1.0)]))
            .collect();
        assert!(matches!(
            ComparisonTable::compare(&six),
            Err(RenderError::InvalidData(_))
        ));
    }

    #[test]
    fn deltas_against_baseline() {
        let scenarios = vec![
            scenario("Base", vec![year(2025, 50000.0, 500000.0)]),
            scenario("Higher", vec![year(2025, 60000.0, 520000.0)]),
            scenario("Lower", vec![year(2025, 40000.0, 480000.0)]),
        ];
        let table = ComparisonTable::compare(&scenarios).unwrap();

        assert_eq!(table.delta(0, Kpi::TotalIncome), None);
        assert_eq!(
            table.delta(1, Kpi::TotalIncome),
            Some(KpiDelta {
                value: 10000.0,
                trend: Trend::Improvement
            })
        );
        assert_eq!(table.delta(2, Kpi::TotalIncome).unwrap().trend, Trend::Regression);
    }

    #[test]
    fn higher_expenses_still_count_as_improvement() {
        let scenarios = vec![
            scenario("Base", vec![year(2025, 50000.0, 500000.0)]),
            scenario("Spender", vec![year(2025, 60000.0, 500000.0)]),
        ];
        let table = ComparisonTable::compare(&scenarios).unwrap();
        let delta = table.delta(1, Kpi::TotalExpenses).unwrap();
        assert!(delta.value > 0.0);
        assert_eq!(delta.trend, Trend::Improvement);
    }

    #[test]
    fn absent_values_give_no_delta() {
        let scenarios = vec![
            scenario("Base", vec![year(2025, 50000.0, 500000.0)]),
            scenario("Empty", Vec::new()),
        ];
        let table = ComparisonTable::compare(&scenarios).unwrap();
        assert_eq!(table.delta(1, Kpi::FinalNetWorth), None);
        assert!(table.delta(1, Kpi::TotalIncome).is_some());
    }

    #[test]
    fn years_are_the_union() {
        let scenarios = vec![
            scenario("A", vec![year(2025, 1.0, 10.0), year(2026, 1.0, 11.0)]),
            scenario("B", vec![year(2026, 1.0, 20.0), year(2027, 1.0, 21.0)]),
        ];
        let table = ComparisonTable::compare(&scenarios).unwrap();
        assert_eq!(table.years(), &[2025, 2026, 2027]);
        assert_eq!(table.net_worth_at(0, 2027), None);
        assert_eq!(table.net_worth_at(1, 2027), Some(21.0));
    }

    #[test]
    fn chart_has_one_series_per_scenario() {
        let scenarios = vec![
            scenario("A", vec![year(2025, 1.0, 10.0), year(2026, 1.0, 11.0)]),
            scenario("B", vec![year(2025, 1.0, 20.0), year(2026, 1.0, 21.0)]),
        ];
        let table = ComparisonTable::compare(&scenarios).unwrap();
        let placed = net_worth_chart(&table, NET_WORTH_SHEET, "#,##0 \"€\"").unwrap();
        let values: Vec<&str> = placed.chart.series.iter().map(|s| s.values.as_str()).collect();
        assert_eq!(
            values,
            vec!["'Net Worth by Year'!$B$2:$B$3", "'Net Worth by Year'!$C$2:$C$3"]
        );
        assert_eq!(placed.chart.series[0].categories, "'Net Worth by Year'!$A$2:$A$3");
        assert_eq!(placed.chart.y_num_format.as_deref(), Some("#,##0 \"€\""));
    }
}
