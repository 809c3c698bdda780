//! Cell styles
//!
//! Writers pick a [`CellStyle`] per cell; the XLSX encoder turns each distinct
//! style into a `rust_xlsxwriter::Format` through a [`StyleRegistry`] owned by
//! the render call.
//!
//! Currency cells combine three independent flags: alternating row band,
//! negative value (red font) and total column (bold, green shading), giving
//! eight combinations.

use crate::comparison::Trend;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};
use std::collections::HashMap;

const HEADER_BLUE: u32 = 0x4472C4;
const GROUP_BLUE: u32 = 0x1F4E78;
const SECTION_BLUE: u32 = 0xD9E1F2;
const BAND_BLUE: u32 = 0xDDEBF7;
const TOTAL_GREEN: u32 = 0xE2EFDA;
const TOTAL_GREEN_BAND: u32 = 0xC6E0B4;
const NEGATIVE_RED: u32 = 0xFF0000;
const WHITE: u32 = 0xFFFFFF;
const GOOD_FONT: u32 = 0x006100;
const GOOD_FILL: u32 = 0xC6EFCE;
const BAD_FONT: u32 = 0x9C0006;
const BAD_FILL: u32 = 0xFFC7CE;

/// Default amount display format (whole units, thousands separator)
pub const DEFAULT_CURRENCY_FORMAT: &str = "#,##0";

/// Flags of a currency cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyStyle {
    /// Odd data row (banded background)
    pub alt: bool,
    pub negative: bool,
    /// Aggregate column
    pub total: bool,
}

/// Semantic style of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellStyle {
    Title,
    Section,
    Header,
    GroupHeader,
    Label,
    Text,
    Percent,
    Integer { alt: bool },
    Currency(CurrencyStyle),
    Delta(Trend),
}

impl CellStyle {
    /// Currency style for a value; the sign alone decides the negative flag
    pub fn currency(value: f64, alt: bool, total: bool) -> Self {
        CellStyle::Currency(CurrencyStyle {
            alt,
            negative: value < 0.0,
            total,
        })
    }

    pub fn is_negative(self) -> bool {
        matches!(self, CellStyle::Currency(CurrencyStyle { negative: true, .. }))
    }

    pub fn is_total(self) -> bool {
        matches!(self, CellStyle::Currency(CurrencyStyle { total: true, .. }))
    }
}

/// Per-render cache of encoder formats
#[derive(Debug)]
pub struct StyleRegistry {
    currency_format: String,
    formats: HashMap<CellStyle, Format>,
}

impl StyleRegistry {
    pub fn new(currency_format: impl Into<String>) -> Self {
        Self {
            currency_format: currency_format.into(),
            formats: HashMap::new(),
        }
    }

    /// Format for a style, built on first use
    pub fn format(&mut self, style: CellStyle) -> &Format {
        let currency_format = &self.currency_format;
        self.formats
            .entry(style)
            .or_insert_with(|| build_format(style, currency_format))
    }

    /// Number of distinct formats created so far
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_FORMAT)
    }
}

fn build_format(style: CellStyle, currency_format: &str) -> Format {
    match style {
        CellStyle::Title => Format::new().set_bold().set_font_size(14),
        CellStyle::Section => Format::new()
            .set_bold()
            .set_background_color(SECTION_BLUE)
            .set_border(FormatBorder::Thin),
        CellStyle::Header => Format::new()
            .set_bold()
            .set_background_color(HEADER_BLUE)
            .set_font_color(WHITE)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin),
        CellStyle::GroupHeader => Format::new()
            .set_bold()
            .set_background_color(GROUP_BLUE)
            .set_font_color(WHITE)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin),
        CellStyle::Label => Format::new().set_border(FormatBorder::Thin),
        CellStyle::Text => Format::new()
            .set_align(FormatAlign::Right)
            .set_border(FormatBorder::Thin),
        CellStyle::Percent => Format::new()
            .set_num_format("0.00%")
            .set_border(FormatBorder::Thin),
        CellStyle::Integer { alt } => {
            let format = Format::new().set_num_format("0").set_align(FormatAlign::Center);
            if alt {
                format.set_background_color(BAND_BLUE)
            } else {
                format
            }
        }
        CellStyle::Currency(flags) => currency_format_for(flags, currency_format),
        CellStyle::Delta(trend) => {
            let signed = format!("+{0};-{0};{0}", currency_format);
            let format = Format::new()
                .set_num_format(&signed)
                .set_align(FormatAlign::Right)
                .set_border(FormatBorder::Thin);
            match trend {
                Trend::Improvement => format
                    .set_font_color(GOOD_FONT)
                    .set_background_color(GOOD_FILL),
                Trend::Regression => format
                    .set_font_color(BAD_FONT)
                    .set_background_color(BAD_FILL),
                Trend::Unchanged => format,
            }
        }
    }
}

fn currency_format_for(flags: CurrencyStyle, currency_format: &str) -> Format {
    let mut format = Format::new()
        .set_num_format(currency_format)
        .set_align(FormatAlign::Right);

    let background = match (flags.total, flags.alt) {
        (true, true) => Some(TOTAL_GREEN_BAND),
        (true, false) => Some(TOTAL_GREEN),
        (false, true) => Some(BAND_BLUE),
        (false, false) => None,
    };
    if let Some(color) = background {
        format = format.set_background_color(color);
    }
    if flags.total {
        format = format.set_bold();
    }
    if flags.negative {
        format = format.set_font_color(NEGATIVE_RED);
    }
    format
}
