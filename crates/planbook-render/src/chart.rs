//! Chart definitions and cell-range derivation
//!
//! Charts reference the Detailed table by A1-style ranges. Column offsets come
//! from the Detailed [`LayoutPlan`]; row offsets from the table's header height
//! (`Detailed!$A$3` is the first data row).
//!
//! ```text
//! Sheet: Charts
//!   B2  Net Worth (line)            N2  Income Sources (stacked area)
//!   B24 Final-Year Expenses (pie)   N24 Net Cash Flow (column)
//! ```

use crate::layout::{GroupId, LayoutPlan, Metric};
use crate::table::DETAILED_HEADER_ROWS;
use planbook_core::{ExpenseCategory, IncomeSource};

pub const CHART_WIDTH: u32 = 720;
pub const CHART_HEIGHT: u32 = 400;

/// Shared palette for series and pie points
pub const PALETTE: [u32; 6] = [0x4472C4, 0xED7D31, 0xA5A5A5, 0xFFC000, 0x5B9BD5, 0x70AD47];

const NET_WORTH_ANCHOR: (u32, u16) = (1, 1);
const INCOME_ANCHOR: (u32, u16) = (1, 13);
const EXPENSE_ANCHOR: (u32, u16) = (23, 1);
const CASH_FLOW_ANCHOR: (u32, u16) = (23, 13);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    StackedArea,
    Pie,
    Column,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPosition {
    Bottom,
    Right,
    Hidden,
}

/// How a series is painted
#[derive(Clone, Debug, PartialEq)]
pub enum SeriesFill {
    Line { color: u32, width: f64 },
    Solid(u32),
    /// One fill color per data point (pie slices)
    Points(Vec<u32>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub categories: String,
    pub values: String,
    pub fill: SeriesFill,
}

/// Encoder-independent chart description
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub y_num_format: Option<String>,
    pub width: u32,
    pub height: u32,
    pub legend: LegendPosition,
    /// Plot data from hidden (collapsed) source columns
    pub show_hidden_data: bool,
    pub series: Vec<SeriesSpec>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_axis: None,
            y_axis: None,
            y_num_format: None,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            legend: LegendPosition::Bottom,
            show_hidden_data: true,
            series: Vec::new(),
        }
    }

    /// Year axis and amount axis labels
    fn with_axes(mut self, y_axis: &str, num_format: &str) -> Self {
        self.x_axis = Some("Year".into());
        self.y_axis = Some(y_axis.into());
        self.y_num_format = Some(num_format.into());
        self
    }
}

/// A chart anchored at a cell
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedChart {
    pub row: u32,
    pub col: u16,
    pub chart: ChartSpec,
}

/// Convert a 0-based column index to letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_letter(col: u16) -> String {
    let mut result = String::new();
    let mut n = u32::from(col);
    loop {
        result.insert(0, char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Absolute A1 range on a sheet, from 0-based bounds
pub fn cell_range(sheet: &str, first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> String {
    format!(
        "{}!${}${}:${}${}",
        quote_sheet(sheet),
        column_letter(first_col),
        first_row + 1,
        column_letter(last_col),
        last_row + 1
    )
}

/// Range covering one column over the data rows
pub fn column_range(sheet: &str, col: u16, first_row: u32, last_row: u32) -> String {
    cell_range(sheet, first_row, col, last_row, col)
}

fn quote_sheet(sheet: &str) -> String {
    if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Charts over a Detailed table holding `year_count` data rows.
///
/// Returns nothing for an empty table. Amount axes use `amount_format`, the
/// number format of the table's currency cells.
pub fn projection_charts(
    plan: &LayoutPlan,
    sheet: &str,
    year_count: u32,
    amount_format: &str,
) -> Vec<PlacedChart> {
    if year_count == 0 {
        return Vec::new();
    }
    let first_row = DETAILED_HEADER_ROWS;
    let last_row = DETAILED_HEADER_ROWS + year_count - 1;
    let Some(year_col) = plan.column_of(Metric::Year) else {
        return Vec::new();
    };
    let years = column_range(sheet, year_col, first_row, last_row);
    let series = |metric: Metric, name: &str, fill: SeriesFill| {
        plan.column_of(metric).map(|col| SeriesSpec {
            name: name.to_string(),
            categories: years.clone(),
            values: column_range(sheet, col, first_row, last_row),
            fill,
        })
    };

    let mut charts = Vec::new();

    let mut net_worth =
        ChartSpec::new(ChartKind::Line, "Net Worth").with_axes("Amount", amount_format);
    net_worth.legend = LegendPosition::Hidden;
    net_worth.series.extend(series(
        Metric::NetWorthEnd,
        "Net Worth (End)",
        SeriesFill::Line {
            color: PALETTE[0],
            width: 2.25,
        },
    ));
    charts.push(place(NET_WORTH_ANCHOR, net_worth));

    let mut income = ChartSpec::new(ChartKind::StackedArea, "Income Sources")
        .with_axes("Amount", amount_format);
    for (source, color) in IncomeSource::ALL.iter().zip(PALETTE) {
        income.series.extend(series(
            Metric::Income(*source),
            source.label(),
            SeriesFill::Solid(color),
        ));
    }
    charts.push(place(INCOME_ANCHOR, income));

    if let Some(expenses) = final_year_expenses(plan, sheet, last_row) {
        charts.push(place(EXPENSE_ANCHOR, expenses));
    }

    let mut cash_flow =
        ChartSpec::new(ChartKind::Column, "Net Cash Flow").with_axes("Amount", amount_format);
    cash_flow.legend = LegendPosition::Hidden;
    cash_flow.series.extend(series(
        Metric::NetCashFlow,
        "Net Cash Flow",
        SeriesFill::Solid(PALETTE[5]),
    ));
    charts.push(place(CASH_FLOW_ANCHOR, cash_flow));

    charts
}

/// Pie over the final row's expense detail columns, labelled by their headers
fn final_year_expenses(plan: &LayoutPlan, sheet: &str, last_row: u32) -> Option<ChartSpec> {
    let (first_col, last_col) = plan.group(GroupId::Expenses)?.detail?;
    let header_row = DETAILED_HEADER_ROWS - 1;

    let mut pie = ChartSpec::new(ChartKind::Pie, "Expenses (Final Year)");
    pie.legend = LegendPosition::Right;
    pie.series.push(SeriesSpec {
        name: "Expenses".into(),
        categories: cell_range(sheet, header_row, first_col, header_row, last_col),
        values: cell_range(sheet, last_row, first_col, last_row, last_col),
        fill: SeriesFill::Points(
            ExpenseCategory::ALL
                .iter()
                .zip(PALETTE)
                .map(|(_, color)| color)
                .collect(),
        ),
    });
    Some(pie)
}

fn place(anchor: (u32, u16), chart: ChartSpec) -> PlacedChart {
    PlacedChart {
        row: anchor.0,
        col: anchor.1,
        chart,
    }
}
