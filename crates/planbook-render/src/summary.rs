//! Summary sheet
//!
//! Label/value pairs in four sections, written top to bottom through a row
//! cursor:
//!
//! ```text
//! Retirement Projection: Base plan
//!
//! Parameters            Key Metrics            Assets by Type         Income by Individual
//! | Scenario | Base |   | Final Net Worth | .. | CELI | 2 |           | p1 | 1,250,000 |
//! ```

use crate::comparison::{Kpi, ScenarioKpis};
use crate::sink::{CellRange, CellValue, SheetId, WorkbookSink};
use crate::style::CellStyle;
use planbook_core::{AccountType, RenderError, Scenario};
use std::collections::BTreeMap;

const LABEL_WIDTH: f64 = 28.0;
const VALUE_WIDTH: f64 = 22.0;

/// Sequential writer of label/value rows
struct RowCursor<'a, S: WorkbookSink> {
    sink: &'a mut S,
    sheet: SheetId,
    row: u32,
}

impl<'a, S: WorkbookSink> RowCursor<'a, S> {
    fn new(sink: &'a mut S, sheet: SheetId) -> Self {
        Self { sink, sheet, row: 0 }
    }

    fn title(&mut self, text: &str) -> Result<(), RenderError> {
        self.sink
            .write_text(self.sheet, self.row, 0, text, CellStyle::Title)?;
        self.row += 2;
        Ok(())
    }

    fn section(&mut self, text: &str) -> Result<(), RenderError> {
        self.sink.write_span(
            self.sheet,
            CellRange::row_span(self.row, 0, 1),
            text,
            CellStyle::Section,
        )?;
        self.row += 1;
        Ok(())
    }

    fn pair(&mut self, label: &str, value: CellValue, style: CellStyle) -> Result<(), RenderError> {
        self.sink
            .write_text(self.sheet, self.row, 0, label, CellStyle::Label)?;
        self.sink.write(self.sheet, self.row, 1, &value, style)?;
        self.row += 1;
        Ok(())
    }

    fn text(&mut self, label: &str, value: &str) -> Result<(), RenderError> {
        self.pair(label, CellValue::text(value), CellStyle::Text)
    }

    fn count(&mut self, label: &str, value: usize) -> Result<(), RenderError> {
        self.pair(
            label,
            CellValue::Integer(value as i64),
            CellStyle::Integer { alt: false },
        )
    }

    fn amount(&mut self, label: &str, value: Option<f64>) -> Result<(), RenderError> {
        match value {
            Some(v) => self.pair(label, CellValue::Number(v), CellStyle::currency(v, false, false)),
            None => self.pair(label, CellValue::Blank, CellStyle::currency(0.0, false, false)),
        }
    }

    fn gap(&mut self) {
        self.row += 1;
    }
}

/// Write the Summary sheet; returns the number of rows used
pub fn write_summary<S: WorkbookSink>(
    sink: &mut S,
    sheet: SheetId,
    scenario: &Scenario,
) -> Result<u32, RenderError> {
    let projection = &scenario.projection;
    sink.set_column_width(sheet, 0, LABEL_WIDTH)?;
    sink.set_column_width(sheet, 1, VALUE_WIDTH)?;

    let mut cursor = RowCursor::new(sink, sheet);
    cursor.title(&format!("Retirement Projection: {}", scenario.label))?;

    cursor.section("Parameters")?;
    cursor.text("Scenario", &scenario.label)?;
    cursor.text("Scenario ID", &projection.scenario_id)?;
    cursor.text("Project ID", &projection.project_id)?;
    cursor.pair(
        "Start Year",
        CellValue::Integer(projection.start_year.into()),
        CellStyle::Integer { alt: false },
    )?;
    cursor.pair(
        "End Year",
        CellValue::Integer(projection.end_year.into()),
        CellStyle::Integer { alt: false },
    )?;
    cursor.text("Dollar Basis", projection.dollar_basis())?;
    cursor.pair(
        "Inflation Rate",
        CellValue::Number(projection.inflation_rate),
        CellStyle::Percent,
    )?;
    cursor.text(
        "Calculated At",
        &projection.calculated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    )?;
    cursor.count("Years Projected", projection.years.len())?;
    cursor.gap();

    let kpis = ScenarioKpis::from_projection(&scenario.label, projection);
    cursor.section("Key Metrics")?;
    for kpi in Kpi::ALL {
        if kpi.is_count() {
            cursor.count(kpi.label(), kpis.shortfall_years as usize)?;
        } else {
            cursor.amount(kpi.label(), kpis.get(kpi))?;
        }
    }
    cursor.gap();

    cursor.section("Assets by Type")?;
    for account_type in AccountType::ALL {
        let count = scenario
            .assets
            .iter()
            .filter(|a| a.account_type() == Some(account_type))
            .count();
        cursor.count(account_type.label(), count)?;
    }
    let other = scenario
        .assets
        .iter()
        .filter(|a| a.account_type().is_none())
        .count();
    if other > 0 {
        cursor.count("Other", other)?;
    }
    cursor.count("Total Assets", scenario.assets.len())?;

    let by_individual = income_by_individual(scenario);
    if !by_individual.is_empty() {
        cursor.gap();
        cursor.section("Income by Individual")?;
        for (individual, total) in &by_individual {
            cursor.amount(individual, Some(*total))?;
        }
    }

    Ok(cursor.row)
}

/// All-year income totals per individual, sorted by id
fn income_by_individual(scenario: &Scenario) -> BTreeMap<&str, f64> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for year in &scenario.projection.years {
        for (individual, income) in &year.income_by_individual {
            *totals.entry(individual.as_str()).or_default() += income.total();
        }
    }
    totals
}
