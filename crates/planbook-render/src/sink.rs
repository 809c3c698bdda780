//! Encoder seam
//!
//! Table, summary and chart writers talk to the spreadsheet encoder only
//! through [`WorkbookSink`]. [`crate::xlsx::XlsxSink`] produces XLSX bytes;
//! [`crate::record::RecordingSink`] keeps everything in memory for inspection.

use crate::chart::ChartSpec;
use crate::style::CellStyle;
use planbook_core::RenderError;

/// Index of a sheet within the workbook being written
pub type SheetId = usize;

/// A cell value
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Blank,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Numeric content, `None` for text and blanks
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(_) | CellValue::Blank => None,
        }
    }
}

/// Inclusive rectangular cell range (0-based)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    /// A range within a single row
    pub fn row_span(row: u32, first_col: u16, last_col: u16) -> Self {
        Self {
            first_row: row,
            first_col,
            last_row: row,
            last_col,
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }
}

/// Minimal capability set required from a spreadsheet encoder
pub trait WorkbookSink {
    /// Add a named sheet; sheets appear in creation order
    fn add_sheet(&mut self, name: &str) -> Result<SheetId, RenderError>;

    /// Write a value into a cell under a style
    fn write(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        value: &CellValue,
        style: CellStyle,
    ) -> Result<(), RenderError>;

    /// Merge a multi-cell range and write one string across it
    fn merge(
        &mut self,
        sheet: SheetId,
        range: CellRange,
        text: &str,
        style: CellStyle,
    ) -> Result<(), RenderError>;

    fn set_column_width(&mut self, sheet: SheetId, col: u16, width: f64)
        -> Result<(), RenderError>;

    /// Put columns on outline level 1, optionally starting collapsed (hidden)
    fn group_columns(
        &mut self,
        sheet: SheetId,
        first_col: u16,
        last_col: u16,
        collapsed: bool,
    ) -> Result<(), RenderError>;

    fn freeze_panes(&mut self, sheet: SheetId, row: u32, col: u16) -> Result<(), RenderError>;

    /// Insert a chart with its top-left corner at (row, col)
    fn insert_chart(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        chart: &ChartSpec,
    ) -> Result<(), RenderError>;

    fn write_text(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        text: &str,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        self.write(sheet, row, col, &CellValue::text(text), style)
    }

    fn write_number(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        value: f64,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        self.write(sheet, row, col, &CellValue::Number(value), style)
    }

    /// Write a label across a range, falling back to a plain cell when the
    /// range is a single cell (encoders reject single-cell merges)
    fn write_span(
        &mut self,
        sheet: SheetId,
        range: CellRange,
        text: &str,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        if range.is_single_cell() {
            self.write_text(sheet, range.first_row, range.first_col, text, style)
        } else {
            self.merge(sheet, range, text, style)
        }
    }
}
