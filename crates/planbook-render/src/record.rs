//! In-memory workbook recorder
//!
//! [`RecordingSink`] implements [`WorkbookSink`] by storing every operation as
//! data. Two renders of the same input compare equal cell for cell, which is
//! how idempotence and styling are checked without decoding XLSX bytes.

use crate::chart::{ChartSpec, PlacedChart};
use crate::sink::{CellRange, CellValue, SheetId, WorkbookSink};
use crate::style::CellStyle;
use planbook_core::RenderError;
use std::collections::BTreeMap;

/// A written cell
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// Everything written to one sheet
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedSheet {
    pub name: String,
    /// Cells keyed by (row, col)
    pub cells: BTreeMap<(u32, u16), RecordedCell>,
    pub merges: Vec<(CellRange, String)>,
    pub widths: BTreeMap<u16, f64>,
    /// (first col, last col, collapsed)
    pub groups: Vec<(u16, u16, bool)>,
    pub freeze: Option<(u32, u16)>,
    pub charts: Vec<PlacedChart>,
}

impl RecordedSheet {
    pub fn cell(&self, row: u32, col: u16) -> Option<&RecordedCell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cell(row, col).map(|c| &c.value)
    }

    pub fn style(&self, row: u32, col: u16) -> Option<CellStyle> {
        self.cell(row, col).map(|c| c.style)
    }

    /// Column of the first cell in `row` holding `text`
    pub fn find_in_row(&self, row: u32, text: &str) -> Option<u16> {
        self.cells
            .range((row, 0)..=(row, u16::MAX))
            .find(|(_, cell)| matches!(&cell.value, CellValue::Text(t) if t == text))
            .map(|((_, col), _)| *col)
    }

    /// Row of the first cell in `col` holding `text`
    pub fn find_in_column(&self, col: u16, text: &str) -> Option<u32> {
        self.cells
            .iter()
            .find(|((_, c), cell)| {
                *c == col && matches!(&cell.value, CellValue::Text(t) if t == text)
            })
            .map(|((row, _), _)| *row)
    }

    /// Whether a column starts hidden inside a collapsed group
    pub fn is_hidden(&self, col: u16) -> bool {
        self.groups
            .iter()
            .any(|&(first, last, collapsed)| collapsed && (first..=last).contains(&col))
    }

    /// Whether a column belongs to any outline group
    pub fn is_grouped(&self, col: u16) -> bool {
        self.groups
            .iter()
            .any(|&(first, last, _)| (first..=last).contains(&col))
    }

    /// Highest row holding a cell
    pub fn last_row(&self) -> Option<u32> {
        self.cells.keys().map(|(row, _)| *row).max()
    }
}

/// Workbook sink that records instead of encoding
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSink {
    sheets: Vec<RecordedSheet>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[RecordedSheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&RecordedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn sheet_mut(&mut self, sheet: SheetId) -> Result<&mut RecordedSheet, RenderError> {
        self.sheets
            .get_mut(sheet)
            .ok_or_else(|| RenderError::Format(format!("Unknown sheet index {sheet}")))
    }
}

impl WorkbookSink for RecordingSink {
    fn add_sheet(&mut self, name: &str) -> Result<SheetId, RenderError> {
        if self.sheets.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(RenderError::Format(format!("Duplicate sheet name: {name}")));
        }
        self.sheets.push(RecordedSheet {
            name: name.to_string(),
            ..RecordedSheet::default()
        });
        Ok(self.sheets.len() - 1)
    }

    fn write(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        value: &CellValue,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        self.sheet_mut(sheet)?.cells.insert(
            (row, col),
            RecordedCell {
                value: value.clone(),
                style,
            },
        );
        Ok(())
    }

    fn merge(
        &mut self,
        sheet: SheetId,
        range: CellRange,
        text: &str,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        if range.is_single_cell() {
            return Err(RenderError::Format(
                "Can't merge single cell range".to_string(),
            ));
        }
        let recorded = self.sheet_mut(sheet)?;
        recorded.merges.push((range, text.to_string()));
        recorded.cells.insert(
            (range.first_row, range.first_col),
            RecordedCell {
                value: CellValue::text(text),
                style,
            },
        );
        Ok(())
    }

    fn set_column_width(
        &mut self,
        sheet: SheetId,
        col: u16,
        width: f64,
    ) -> Result<(), RenderError> {
        self.sheet_mut(sheet)?.widths.insert(col, width);
        Ok(())
    }

    fn group_columns(
        &mut self,
        sheet: SheetId,
        first_col: u16,
        last_col: u16,
        collapsed: bool,
    ) -> Result<(), RenderError> {
        self.sheet_mut(sheet)?
            .groups
            .push((first_col, last_col, collapsed));
        Ok(())
    }

    fn freeze_panes(&mut self, sheet: SheetId, row: u32, col: u16) -> Result<(), RenderError> {
        self.sheet_mut(sheet)?.freeze = Some((row, col));
        Ok(())
    }

    fn insert_chart(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        chart: &ChartSpec,
    ) -> Result<(), RenderError> {
        self.sheet_mut(sheet)?.charts.push(PlacedChart {
            row,
            col,
            chart: chart.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_sheet_names_fail() {
        let mut sink = RecordingSink::new();
        sink.add_sheet("Summary").unwrap();
        assert!(matches!(
            sink.add_sheet("summary"),
            Err(RenderError::Format(_))
        ));
    }

    #[test]
    fn span_falls_back_to_plain_write() {
        let mut sink = RecordingSink::new();
        let sheet = sink.add_sheet("S").unwrap();
        sink.write_span(sheet, CellRange::row_span(0, 3, 3), "One", CellStyle::GroupHeader)
            .unwrap();
        sink.write_span(sheet, CellRange::row_span(0, 4, 6), "Many", CellStyle::GroupHeader)
            .unwrap();

        let recorded = sink.sheet("S").unwrap();
        assert_eq!(recorded.merges.len(), 1);
        assert_eq!(recorded.find_in_row(0, "One"), Some(3));
        assert_eq!(recorded.find_in_row(0, "Many"), Some(4));
    }

    #[test]
    fn collapsed_groups_hide_columns() {
        let mut sink = RecordingSink::new();
        let sheet = sink.add_sheet("S").unwrap();
        sink.group_columns(sheet, 2, 6, true).unwrap();
        sink.group_columns(sheet, 8, 9, false).unwrap();

        let recorded = sink.sheet("S").unwrap();
        assert!(recorded.is_hidden(2));
        assert!(!recorded.is_hidden(7));
        assert!(!recorded.is_hidden(8));
        assert!(recorded.is_grouped(8));
    }
}
