//! Excel projection workbook renderer
//!
//! Generates XLSX files with one sheet per view of a scenario:
//! - Summary: parameters, key metrics, asset counts, income per individual
//! - Projection: one row per year, aggregate columns only
//! - Detailed: every column, grouped under a merged band, details collapsible
//! - Charts: net worth, income sources, final-year expenses, net cash flow
//!
//! Comparison workbooks hold a KPI table with deltas against the first
//! scenario, net worth per year for every scenario, and a net worth chart.
//!
//! ## Example
//!
//! ```rust
//! use planbook_core::{Projection, Scenario, YearlyProjection};
//! use planbook_render::ExcelRenderer;
//!
//! let years = vec![YearlyProjection::new(2025, 0).net_worth(500_000.0, 502_000.0)];
//! let projection = Projection::new("s1", "p1", 2025, 2025, years).unwrap();
//! let scenario = Scenario::new(projection, "Base plan", Vec::new());
//!
//! let bytes = ExcelRenderer::new().currency("$").render_to_bytes(&scenario).unwrap();
//! assert_eq!(&bytes[0..2], b"PK");
//! ```

use crate::aggregate::{aggregate, AssetTypeMap};
use crate::chart::projection_charts;
use crate::comparison::{
    net_worth_chart, write_kpi_sheet, write_net_worth_sheet, ComparisonTable, COMPARISON_CHARTS_SHEET,
    COMPARISON_SHEET, NET_WORTH_SHEET,
};
use crate::layout::LayoutPlan;
use crate::sink::WorkbookSink;
use crate::style::DEFAULT_CURRENCY_FORMAT;
use crate::summary::write_summary;
use crate::table::{write_table, TableVariant};
use crate::xlsx::XlsxSink;
use planbook_core::{RenderError, Renderer, Scenario};
use tracing::debug;

pub const SUMMARY_SHEET: &str = "Summary";
pub const PROJECTION_SHEET: &str = "Projection";
pub const DETAILED_SHEET: &str = "Detailed";
pub const CHARTS_SHEET: &str = "Charts";

/// Excel projection workbook renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Currency symbol appended to amounts (none by default)
    pub currency: Option<String>,
    /// Whether detail column groups start collapsed
    pub collapse_details: bool,
    /// Whether to include the Summary sheet
    pub include_summary: bool,
    /// Whether to include the Base (Projection) sheet
    pub include_base: bool,
    /// Whether to include chart sheets
    pub include_charts: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            currency: None,
            collapse_details: true,
            include_summary: true,
            include_base: true,
            include_charts: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set currency symbol
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Start detail column groups expanded
    pub fn expanded_details(mut self) -> Self {
        self.collapse_details = false;
        self
    }

    /// Disable Summary sheet
    pub fn no_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }

    /// Disable Base (Projection) sheet
    pub fn no_base(mut self) -> Self {
        self.include_base = false;
        self
    }

    /// Disable chart sheets
    pub fn no_charts(mut self) -> Self {
        self.include_charts = false;
        self
    }

    /// Number format of currency cells
    pub fn currency_format(&self) -> String {
        match &self.currency {
            Some(symbol) if !symbol.is_empty() => {
                format!("{DEFAULT_CURRENCY_FORMAT} \"{}\"", symbol.replace('"', ""))
            }
            _ => DEFAULT_CURRENCY_FORMAT.to_string(),
        }
    }

    /// Generate Excel workbook bytes for one scenario
    pub fn render_to_bytes(&self, scenario: &Scenario) -> Result<Vec<u8>, RenderError> {
        let mut sink = XlsxSink::new(&self.currency_format());
        self.render_into(scenario, &mut sink)?;
        sink.finish()
    }

    /// Write one scenario's sheets into any sink
    pub fn render_into<S: WorkbookSink>(
        &self,
        scenario: &Scenario,
        sink: &mut S,
    ) -> Result<(), RenderError> {
        let projection = &scenario.projection;
        let has_couple = projection.has_couple();
        let types = AssetTypeMap::new(&scenario.assets);
        let rows: Vec<_> = projection
            .years
            .iter()
            .map(|year| aggregate(year, &types))
            .collect();

        debug!(
            scenario = %scenario.label,
            years = rows.len(),
            has_couple,
            "Rendering projection workbook"
        );

        if self.include_summary {
            let sheet = sink.add_sheet(SUMMARY_SHEET)?;
            let used = write_summary(sink, sheet, scenario)?;
            debug!(sheet = SUMMARY_SHEET, rows = used, "Wrote sheet");
        }

        if self.include_base {
            let plan = LayoutPlan::base(has_couple);
            let sheet = sink.add_sheet(PROJECTION_SHEET)?;
            let written = write_table(sink, sheet, &plan, TableVariant::Base, &rows)?;
            debug!(
                sheet = PROJECTION_SHEET,
                rows = written,
                columns = plan.column_count(),
                "Wrote sheet"
            );
        }

        let detailed = LayoutPlan::detailed(has_couple);
        let sheet = sink.add_sheet(DETAILED_SHEET)?;
        let variant = TableVariant::Detailed {
            collapse_details: self.collapse_details,
        };
        let written = write_table(sink, sheet, &detailed, variant, &rows)?;
        debug!(
            sheet = DETAILED_SHEET,
            rows = written,
            columns = detailed.column_count(),
            "Wrote sheet"
        );

        if self.include_charts {
            let charts =
                projection_charts(&detailed, DETAILED_SHEET, written, &self.currency_format());
            if !charts.is_empty() {
                let sheet = sink.add_sheet(CHARTS_SHEET)?;
                for placed in &charts {
                    sink.insert_chart(sheet, placed.row, placed.col, &placed.chart)?;
                }
                debug!(sheet = CHARTS_SHEET, charts = charts.len(), "Wrote sheet");
            }
        }

        Ok(())
    }

    /// Generate a comparison workbook for 2 to 5 scenarios
    pub fn compare_to_bytes(&self, scenarios: &[Scenario]) -> Result<Vec<u8>, RenderError> {
        let mut sink = XlsxSink::new(&self.currency_format());
        self.compare_into(scenarios, &mut sink)?;
        sink.finish()
    }

    /// Write comparison sheets into any sink; the first scenario is the baseline
    pub fn compare_into<S: WorkbookSink>(
        &self,
        scenarios: &[Scenario],
        sink: &mut S,
    ) -> Result<(), RenderError> {
        let table = ComparisonTable::compare(scenarios)?;
        debug!(
            scenarios = table.scenarios().len(),
            baseline = %table.baseline().label,
            years = table.years().len(),
            "Rendering comparison workbook"
        );

        let sheet = sink.add_sheet(COMPARISON_SHEET)?;
        write_kpi_sheet(sink, sheet, &table)?;
        debug!(sheet = COMPARISON_SHEET, "Wrote sheet");

        let sheet = sink.add_sheet(NET_WORTH_SHEET)?;
        write_net_worth_sheet(sink, sheet, &table)?;
        debug!(sheet = NET_WORTH_SHEET, rows = table.years().len(), "Wrote sheet");

        if self.include_charts {
            let amount_format = self.currency_format();
            if let Some(placed) = net_worth_chart(&table, NET_WORTH_SHEET, &amount_format) {
                let sheet = sink.add_sheet(COMPARISON_CHARTS_SHEET)?;
                sink.insert_chart(sheet, placed.row, placed.col, &placed.chart)?;
                debug!(sheet = COMPARISON_CHARTS_SHEET, "Wrote sheet");
            }
        }

        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, scenario: &Scenario) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordingSink;
    use planbook_core::{Projection, YearlyProjection};
    use pretty_assertions::assert_eq;

    fn scenario(years: Vec<YearlyProjection>) -> Scenario {
        let start = years.first().map_or(2025, |y| y.year);
        let end = years.last().map_or(2025, |y| y.year);
        let projection = Projection::new("s1", "p1", start, end, years).unwrap();
        Scenario::new(projection, "Test", Vec::new())
    }

    #[test]
    fn excel_renderer_creation() {
        let renderer = ExcelRenderer::new();
        assert_eq!(renderer.currency, None);
        assert!(renderer.collapse_details);
        assert!(renderer.include_summary);
        assert_eq!(renderer.currency_format(), "#,##0");
    }

    #[test]
    fn excel_renderer_with_options() {
        let renderer = ExcelRenderer::new()
            .currency("$")
            .expanded_details()
            .no_summary()
            .no_base()
            .no_charts();

        assert_eq!(renderer.currency_format(), "#,##0 \"$\"");
        assert!(!renderer.collapse_details);
        assert!(!renderer.include_summary);
        assert!(!renderer.include_base);
        assert!(!renderer.include_charts);
    }

    #[test]
    fn sheet_order() {
        let mut sink = RecordingSink::new();
        let s = scenario(vec![YearlyProjection::new(2025, 0)]);
        ExcelRenderer::new().render_into(&s, &mut sink).unwrap();
        assert_eq!(
            sink.sheet_names(),
            vec!["Summary", "Projection", "Detailed", "Charts"]
        );
    }

    #[test]
    fn optional_sheets_can_be_dropped() {
        let mut sink = RecordingSink::new();
        let s = scenario(vec![YearlyProjection::new(2025, 0)]);
        ExcelRenderer::new()
            .no_summary()
            .no_base()
            .no_charts()
            .render_into(&s, &mut sink)
            .unwrap();
        assert_eq!(sink.sheet_names(), vec!["Detailed"]);
    }

    #[test]
    fn no_chart_sheet_without_years() {
        let mut sink = RecordingSink::new();
        let s = scenario(Vec::new());
        ExcelRenderer::new().render_into(&s, &mut sink).unwrap();
        assert_eq!(sink.sheet_names(), vec!["Summary", "Projection", "Detailed"]);
    }

    #[test]
    fn excel_produces_valid_output() {
        let s = scenario(vec![YearlyProjection::new(2025, 0)]);
        let bytes = ExcelRenderer::new().render(&s).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn comparison_needs_two_scenarios() {
        let s = scenario(vec![YearlyProjection::new(2025, 0)]);
        let result = ExcelRenderer::new().compare_to_bytes(&[s]);
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }
}
