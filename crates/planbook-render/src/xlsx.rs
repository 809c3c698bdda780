//! XLSX encoder
//!
//! [`XlsxSink`] maps [`WorkbookSink`] calls onto `rust_xlsxwriter`. Every
//! encoder error is surfaced as [`RenderError::Format`].

use crate::chart::{ChartKind, ChartSpec, LegendPosition, SeriesFill};
use crate::sink::{CellRange, CellValue, SheetId, WorkbookSink};
use crate::style::{CellStyle, StyleRegistry};
use planbook_core::RenderError;
use rust_xlsxwriter::{
    Chart, ChartFormat, ChartLegendPosition, ChartLine, ChartPoint, ChartSolidFill, ChartType,
    Workbook, Worksheet, XlsxError,
};

fn format_err(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

/// Workbook sink producing XLSX bytes
pub struct XlsxSink {
    workbook: Workbook,
    styles: StyleRegistry,
    sheet_names: Vec<String>,
}

impl XlsxSink {
    /// New empty workbook whose currency cells use `currency_format`
    pub fn new(currency_format: &str) -> Self {
        Self {
            workbook: Workbook::new(),
            styles: StyleRegistry::new(currency_format),
            sheet_names: Vec::new(),
        }
    }

    /// Close the workbook and return its bytes
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        self.workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Number of distinct cell formats used so far
    pub fn format_count(&self) -> usize {
        self.styles.len()
    }
}

impl WorkbookSink for XlsxSink {
    fn add_sheet(&mut self, name: &str) -> Result<SheetId, RenderError> {
        // The encoder only checks reused names when saving
        if self.sheet_names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Err(RenderError::Format(format!("Duplicate sheet name: {name}")));
        }
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name).map_err(format_err)?;
        self.workbook.push_worksheet(worksheet);
        self.sheet_names.push(name.to_string());
        Ok(self.sheet_names.len() - 1)
    }

    fn write(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        value: &CellValue,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        let format = self.styles.format(style);
        let worksheet = self
            .workbook
            .worksheet_from_index(sheet)
            .map_err(format_err)?;
        match value {
            CellValue::Number(n) => worksheet.write_number_with_format(row, col, *n, format),
            CellValue::Integer(i) => {
                worksheet.write_number_with_format(row, col, *i as f64, format)
            }
            CellValue::Text(text) => worksheet.write_string_with_format(row, col, text, format),
            CellValue::Blank => worksheet.write_blank(row, col, format),
        }
        .map_err(format_err)?;
        Ok(())
    }

    fn merge(
        &mut self,
        sheet: SheetId,
        range: CellRange,
        text: &str,
        style: CellStyle,
    ) -> Result<(), RenderError> {
        let format = self.styles.format(style);
        self.workbook
            .worksheet_from_index(sheet)
            .map_err(format_err)?
            .merge_range(
                range.first_row,
                range.first_col,
                range.last_row,
                range.last_col,
                text,
                format,
            )
            .map_err(format_err)?;
        Ok(())
    }

    fn set_column_width(
        &mut self,
        sheet: SheetId,
        col: u16,
        width: f64,
    ) -> Result<(), RenderError> {
        self.workbook
            .worksheet_from_index(sheet)
            .map_err(format_err)?
            .set_column_width(col, width)
            .map_err(format_err)?;
        Ok(())
    }

    fn group_columns(
        &mut self,
        sheet: SheetId,
        first_col: u16,
        last_col: u16,
        collapsed: bool,
    ) -> Result<(), RenderError> {
        let worksheet = self
            .workbook
            .worksheet_from_index(sheet)
            .map_err(format_err)?;
        if collapsed {
            worksheet.group_columns_collapsed(first_col, last_col)
        } else {
            worksheet.group_columns(first_col, last_col)
        }
        .map_err(format_err)?;
        Ok(())
    }

    fn freeze_panes(&mut self, sheet: SheetId, row: u32, col: u16) -> Result<(), RenderError> {
        self.workbook
            .worksheet_from_index(sheet)
            .map_err(format_err)?
            .set_freeze_panes(row, col)
            .map_err(format_err)?;
        Ok(())
    }

    fn insert_chart(
        &mut self,
        sheet: SheetId,
        row: u32,
        col: u16,
        spec: &ChartSpec,
    ) -> Result<(), RenderError> {
        let chart = build_chart(spec);
        self.workbook
            .worksheet_from_index(sheet)
            .map_err(format_err)?
            .insert_chart(row, col, &chart)
            .map_err(format_err)?;
        Ok(())
    }
}

fn build_chart(spec: &ChartSpec) -> Chart {
    let mut chart = Chart::new(match spec.kind {
        ChartKind::Line => ChartType::Line,
        ChartKind::StackedArea => ChartType::AreaStacked,
        ChartKind::Pie => ChartType::Pie,
        ChartKind::Column => ChartType::Column,
    });

    for series in &spec.series {
        let added = chart
            .add_series()
            .set_name(series.name.as_str())
            .set_categories(series.categories.as_str())
            .set_values(series.values.as_str());
        match &series.fill {
            SeriesFill::Line { color, width } => {
                added.set_format(
                    ChartFormat::new().set_line(ChartLine::new().set_color(*color).set_width(*width)),
                );
            }
            SeriesFill::Solid(color) => {
                added.set_format(
                    ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(*color)),
                );
            }
            SeriesFill::Points(colors) => {
                let points: Vec<ChartPoint> = colors
                    .iter()
                    .map(|color| {
                        ChartPoint::new().set_format(
                            ChartFormat::new()
                                .set_solid_fill(ChartSolidFill::new().set_color(*color)),
                        )
                    })
                    .collect();
                added.set_points(&points);
            }
        }
    }

    chart.title().set_name(spec.title.as_str());
    if let Some(name) = &spec.x_axis {
        chart.x_axis().set_name(name.as_str());
    }
    if let Some(name) = &spec.y_axis {
        chart.y_axis().set_name(name.as_str());
    }
    if let Some(num_format) = &spec.y_num_format {
        chart.y_axis().set_num_format(num_format.as_str());
    }
    match spec.legend {
        LegendPosition::Bottom => {
            chart.legend().set_position(ChartLegendPosition::Bottom);
        }
        LegendPosition::Right => {
            chart.legend().set_position(ChartLegendPosition::Right);
        }
        LegendPosition::Hidden => {
            chart.legend().set_hidden();
        }
    }
    chart.set_width(spec.width).set_height(spec.height);
    if spec.show_hidden_data {
        chart.show_hidden_data();
    }
    chart
}
