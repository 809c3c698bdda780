//! Year tables (Base and Detailed)
//!
//! Both variants are driven by a [`LayoutPlan`]; every cell of a data row is
//! looked up by the column's [`Metric`], so adding a metric to the catalog
//! never renumbers a write call.
//!
//! A [`TableWriter`] walks `begin -> push_row* -> finish`. Rows must arrive in
//! strictly ascending year order; `finish` consumes the writer, so nothing can
//! be written after the panes are frozen and the groups are applied.
//!
//! ```text
//! Sheet: Detailed
//! |      |       |            Income            |       |            Expenses ...
//! | Year | Age 1 | Employment Income | ... | Total Income | Housing Expenses | ...
//! | 2025 | 65    | 40,000            | ... | 50,000       | 12,000           | ...
//! ```

use crate::aggregate::RowValues;
use crate::layout::{ColumnKind, GroupId, LayoutPlan, Metric};
use crate::sink::{CellRange, CellValue, SheetId, WorkbookSink};
use crate::style::CellStyle;
use planbook_core::RenderError;

/// Header height of the Base table
pub const BASE_HEADER_ROWS: u32 = 1;
/// Header height of the Detailed table (group band + labels)
pub const DETAILED_HEADER_ROWS: u32 = 2;

/// Table shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableVariant {
    Base,
    Detailed { collapse_details: bool },
}

impl TableVariant {
    pub fn header_rows(self) -> u32 {
        match self {
            TableVariant::Base => BASE_HEADER_ROWS,
            TableVariant::Detailed { .. } => DETAILED_HEADER_ROWS,
        }
    }
}

/// Writer for one year table
pub struct TableWriter<'a, S: WorkbookSink> {
    sink: &'a mut S,
    sheet: SheetId,
    plan: &'a LayoutPlan,
    variant: TableVariant,
    rows: u32,
    last_year: Option<i32>,
}

impl<'a, S: WorkbookSink> TableWriter<'a, S> {
    /// Write the header rows and column widths
    pub fn begin(
        sink: &'a mut S,
        sheet: SheetId,
        plan: &'a LayoutPlan,
        variant: TableVariant,
    ) -> Result<Self, RenderError> {
        let label_row = variant.header_rows() - 1;
        if let TableVariant::Detailed { .. } = variant {
            write_group_band(sink, sheet, plan)?;
        }
        for column in plan.columns() {
            sink.write_text(sheet, label_row, column.index, &column.label, CellStyle::Header)?;
            sink.set_column_width(sheet, column.index, column.width)?;
        }

        Ok(Self {
            sink,
            sheet,
            plan,
            variant,
            rows: 0,
            last_year: None,
        })
    }

    /// Append the next year's row
    pub fn push_row(&mut self, values: &RowValues<'_>) -> Result<(), RenderError> {
        let year = values.year();
        if let Some(previous) = self.last_year {
            if year <= previous {
                return Err(RenderError::InvalidData(format!(
                    "Rows must be written in ascending year order: {previous} followed by {year}"
                )));
            }
        }

        let row = self.variant.header_rows() + self.rows;
        let alt = row % 2 == 1;
        for column in self.plan.columns() {
            let value = values.value(column.metric);
            let style = cell_style(column.metric, column.kind, &value, alt);
            self.sink.write(self.sheet, row, column.index, &value, style)?;
        }

        self.rows += 1;
        self.last_year = Some(year);
        Ok(())
    }

    /// Freeze the header and key columns, then group detail columns.
    ///
    /// Returns the number of data rows written.
    pub fn finish(self) -> Result<u32, RenderError> {
        let header_rows = self.variant.header_rows();
        self.sink
            .freeze_panes(self.sheet, header_rows, self.plan.key_columns())?;

        if let TableVariant::Detailed { collapse_details } = self.variant {
            for group in self.plan.groups() {
                if let Some((first, last)) = group.detail {
                    self.sink
                        .group_columns(self.sheet, first, last, collapse_details)?;
                }
            }
        }
        Ok(self.rows)
    }
}

/// Write a whole table in one call
pub fn write_table<S: WorkbookSink>(
    sink: &mut S,
    sheet: SheetId,
    plan: &LayoutPlan,
    variant: TableVariant,
    rows: &[RowValues<'_>],
) -> Result<u32, RenderError> {
    let mut writer = TableWriter::begin(sink, sheet, plan, variant)?;
    for row in rows {
        writer.push_row(row)?;
    }
    writer.finish()
}

/// Row 0 of the Detailed table: one merged label per group over its detail
/// columns (or the whole group when it has none); blanks elsewhere
fn write_group_band<S: WorkbookSink>(
    sink: &mut S,
    sheet: SheetId,
    plan: &LayoutPlan,
) -> Result<(), RenderError> {
    for group in plan.groups() {
        if group.id == GroupId::Identity {
            for col in group.start..=group.end {
                sink.write(sheet, 0, col, &CellValue::Blank, CellStyle::GroupHeader)?;
            }
            continue;
        }

        let (first, last) = group.detail.unwrap_or((group.start, group.end));
        sink.write_span(
            sheet,
            CellRange::row_span(0, first, last),
            group.id.label(),
            CellStyle::GroupHeader,
        )?;
        for col in (group.start..=group.end).filter(|c| *c < first || *c > last) {
            sink.write(sheet, 0, col, &CellValue::Blank, CellStyle::GroupHeader)?;
        }
    }
    Ok(())
}

fn cell_style(metric: Metric, kind: ColumnKind, value: &CellValue, alt: bool) -> CellStyle {
    if metric.is_integer() {
        return CellStyle::Integer { alt };
    }
    let total = kind == ColumnKind::Aggregate;
    // Blank cells (unflagged shortfall) keep the non-negative style
    CellStyle::currency(value.as_f64().unwrap_or(0.0), alt, total)
}
