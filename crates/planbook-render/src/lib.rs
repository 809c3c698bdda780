//! # planbook-render
//!
//! Workbook rendering for planbook projections.
//!
//! This crate provides:
//! - A single column layout plan shared by tables and charts (`layout`)
//! - Per-year rollups of per-individual and per-account maps (`aggregate`)
//! - Base and Detailed year tables with collapsible detail groups (`table`)
//! - The Summary sheet (`summary`)
//! - Chart range derivation from the layout plan (`chart`)
//! - Multi-scenario KPI comparison (`comparison`)
//! - An encoder seam (`sink`) with an XLSX encoder (`xlsx`) and an in-memory
//!   recorder (`record`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use planbook_core::Renderer;
//! use planbook_render::{ExcelRenderer, RecordingSink};
//!
//! // XLSX bytes
//! let xlsx_bytes = ExcelRenderer::new().currency("$").render(&scenario)?;
//! std::fs::write("projection.xlsx", xlsx_bytes)?;
//!
//! // Decoded cells, for inspection
//! let mut sink = RecordingSink::new();
//! ExcelRenderer::new().render_into(&scenario, &mut sink)?;
//! let detailed = sink.sheet("Detailed").unwrap();
//! ```

pub mod aggregate;
pub mod chart;
pub mod comparison;
pub mod excel;
pub mod layout;
pub mod record;
pub mod sink;
pub mod style;
pub mod summary;
pub mod table;
pub mod xlsx;

pub use aggregate::{aggregate, AssetTypeMap, RowValues, TypeTotals};
pub use chart::{column_letter, projection_charts, ChartKind, ChartSpec, PlacedChart, SeriesFill};
pub use comparison::{ComparisonTable, Kpi, KpiDelta, ScenarioKpis, Trend};
pub use excel::{ExcelRenderer, CHARTS_SHEET, DETAILED_SHEET, PROJECTION_SHEET, SUMMARY_SHEET};
pub use layout::{Column, ColumnGroup, ColumnKind, GroupId, LayoutPlan, Metric};
pub use record::{RecordedCell, RecordedSheet, RecordingSink};
pub use sink::{CellRange, CellValue, SheetId, WorkbookSink};
pub use style::{CellStyle, CurrencyStyle, StyleRegistry};
pub use table::{TableVariant, TableWriter};
pub use xlsx::XlsxSink;
