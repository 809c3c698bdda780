//! # planbook-core
//!
//! Core domain model and traits for the planbook workbook renderer.
//!
//! This crate provides:
//! - Domain types: `Projection`, `YearlyProjection`, `AnnualIncome`, `Asset`, `Scenario`
//! - Closed vocabularies: `AccountType`, `ExpenseCategory`, `IncomeSource`
//! - The `Renderer` trait implemented by output backends
//! - Error types and the JSON request boundary (`request`)
//!
//! All records are read-only snapshots: a render call borrows them and never
//! mutates them.
//!
//! ## Example
//!
//! ```rust
//! use planbook_core::{AnnualIncome, Asset, Projection, Scenario, YearlyProjection};
//!
//! let year = YearlyProjection::new(2025, 0)
//!     .ages(Some(65), None)
//!     .income("p1", AnnualIncome { employment: 50_000.0, ..Default::default() })
//!     .balance_end("a1", 502_000.0);
//! let projection = Projection::new("s1", "p1", 2025, 2025, vec![year]).unwrap();
//! let scenario = Scenario::new(projection, "Base plan", vec![Asset::new("a1", "Cash")]);
//! assert!(!scenario.projection.has_couple());
//! ```

pub mod request;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Identifier of an account (asset) in a scenario
pub type AccountId = String;

/// Identifier of an individual (primary or spouse)
pub type IndividualId = String;

// ============================================================================
// Vocabularies
// ============================================================================

/// Account classification used for per-type rollups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "realEstate")]
    RealEstate,
    #[serde(rename = "rrsp")]
    Rrsp,
    #[serde(rename = "celi")]
    Celi,
    #[serde(rename = "cri")]
    Cri,
    #[serde(rename = "cash")]
    Cash,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::RealEstate,
        AccountType::Rrsp,
        AccountType::Celi,
        AccountType::Cri,
        AccountType::Cash,
    ];

    /// Normalized tag as it appears in asset records
    pub fn tag(self) -> &'static str {
        match self {
            AccountType::RealEstate => "realEstate",
            AccountType::Rrsp => "rrsp",
            AccountType::Celi => "celi",
            AccountType::Cri => "cri",
            AccountType::Cash => "cash",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            AccountType::RealEstate => "Real Estate",
            AccountType::Rrsp => "REER",
            AccountType::Celi => "CELI",
            AccountType::Cri => "CRI",
            AccountType::Cash => "Cash",
        }
    }

    /// Resolve a normalized tag; `None` for anything outside the closed set
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

/// Expense categories, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Housing,
    Transport,
    DailyLiving,
    Recreation,
    Health,
    Family,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Housing,
        ExpenseCategory::Transport,
        ExpenseCategory::DailyLiving,
        ExpenseCategory::Recreation,
        ExpenseCategory::Health,
        ExpenseCategory::Family,
    ];

    /// Key used in `expensesByCategory`
    pub fn key(self) -> &'static str {
        match self {
            ExpenseCategory::Housing => "housing",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::DailyLiving => "dailyLiving",
            ExpenseCategory::Recreation => "recreation",
            ExpenseCategory::Health => "health",
            ExpenseCategory::Family => "family",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Housing => "Housing",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::DailyLiving => "Daily Living",
            ExpenseCategory::Recreation => "Recreation",
            ExpenseCategory::Health => "Health",
            ExpenseCategory::Family => "Family",
        }
    }
}

/// Income sources shown as separate columns.
///
/// RRIF income is part of [`AnnualIncome::total`] but has no column of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IncomeSource {
    Employment,
    Rrq,
    Psv,
    Rrpe,
    Other,
}

impl IncomeSource {
    pub const ALL: [IncomeSource; 5] = [
        IncomeSource::Employment,
        IncomeSource::Rrq,
        IncomeSource::Psv,
        IncomeSource::Rrpe,
        IncomeSource::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IncomeSource::Employment => "Employment",
            IncomeSource::Rrq => "RRQ",
            IncomeSource::Psv => "PSV",
            IncomeSource::Rrpe => "RRPE",
            IncomeSource::Other => "Other",
        }
    }

    /// Amount of this source in one individual's breakdown
    pub fn amount(self, income: &AnnualIncome) -> f64 {
        match self {
            IncomeSource::Employment => income.employment,
            IncomeSource::Rrq => income.rrq,
            IncomeSource::Psv => income.psv,
            IncomeSource::Rrpe => income.rrpe,
            IncomeSource::Other => income.other,
        }
    }
}

// ============================================================================
// Assets
// ============================================================================

/// An account of the scenario, classified for rollups
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "request::AssetRecord")]
pub struct Asset {
    pub id: AccountId,
    /// Normalized type tag; unrecognized labels are kept lower-cased
    pub type_tag: String,
}

impl Asset {
    /// Create an asset from a raw type label (e.g. a `runtimeType` value)
    pub fn new(id: impl Into<String>, raw_type: &str) -> Self {
        Self {
            id: id.into(),
            type_tag: normalize_type_label(raw_type),
        }
    }

    /// Resolved account type, `None` for unrecognized labels
    pub fn account_type(&self) -> Option<AccountType> {
        AccountType::from_tag(&self.type_tag)
    }
}

/// Lower-case a raw type label and pass it through the rename table.
///
/// Labels outside the table are returned lower-cased, not rejected.
pub fn normalize_type_label(raw: &str) -> String {
    const RENAMES: [(&str, &str); 5] = [
        ("realestate", "realEstate"),
        ("rrsp", "rrsp"),
        ("celi", "celi"),
        ("cri", "cri"),
        ("cash", "cash"),
    ];
    let lowered = raw.to_lowercase();
    RENAMES
        .iter()
        .find(|(from, _)| *from == lowered)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(lowered)
}

// ============================================================================
// Yearly Projection
// ============================================================================

/// Per-individual income breakdown for one year
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnualIncome {
    pub employment: f64,
    pub rrq: f64,
    pub psv: f64,
    pub rrif: f64,
    pub rrpe: f64,
    pub other: f64,
}

impl AnnualIncome {
    /// Sum of all six sources
    pub fn total(&self) -> f64 {
        self.employment + self.rrq + self.psv + self.rrif + self.rrpe + self.other
    }
}

/// Outcome of one calendar year
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjection {
    pub year: i32,
    pub years_from_start: u32,
    #[serde(default)]
    pub primary_age: Option<u32>,
    #[serde(default)]
    pub spouse_age: Option<u32>,
    #[serde(default)]
    pub income_by_individual: BTreeMap<IndividualId, AnnualIncome>,
    pub total_income: f64,
    #[serde(default)]
    pub taxable_income: f64,
    #[serde(default)]
    pub federal_tax: f64,
    #[serde(default)]
    pub quebec_tax: f64,
    #[serde(default)]
    pub total_tax: f64,
    #[serde(default)]
    pub after_tax_income: f64,
    pub total_expenses: f64,
    #[serde(default)]
    pub expenses_by_category: HashMap<String, f64>,
    #[serde(default)]
    pub withdrawals_by_account: BTreeMap<AccountId, f64>,
    #[serde(default)]
    pub contributions_by_account: BTreeMap<AccountId, f64>,
    #[serde(default)]
    pub total_withdrawals: f64,
    #[serde(default)]
    pub total_contributions: f64,
    #[serde(default)]
    pub celi_contribution_room: f64,
    pub net_cash_flow: f64,
    pub assets_start_of_year: BTreeMap<AccountId, f64>,
    pub assets_end_of_year: BTreeMap<AccountId, f64>,
    #[serde(default)]
    pub asset_returns: BTreeMap<AccountId, f64>,
    pub net_worth_start_of_year: f64,
    pub net_worth_end_of_year: f64,
    #[serde(default)]
    pub events_occurred: Vec<String>,
    #[serde(default)]
    pub has_shortfall: bool,
    #[serde(default)]
    pub shortfall_amount: f64,
}

impl YearlyProjection {
    /// Create an empty year (all amounts zero)
    pub fn new(year: i32, years_from_start: u32) -> Self {
        Self {
            year,
            years_from_start,
            primary_age: None,
            spouse_age: None,
            income_by_individual: BTreeMap::new(),
            total_income: 0.0,
            taxable_income: 0.0,
            federal_tax: 0.0,
            quebec_tax: 0.0,
            total_tax: 0.0,
            after_tax_income: 0.0,
            total_expenses: 0.0,
            expenses_by_category: HashMap::new(),
            withdrawals_by_account: BTreeMap::new(),
            contributions_by_account: BTreeMap::new(),
            total_withdrawals: 0.0,
            total_contributions: 0.0,
            celi_contribution_room: 0.0,
            net_cash_flow: 0.0,
            assets_start_of_year: BTreeMap::new(),
            assets_end_of_year: BTreeMap::new(),
            asset_returns: BTreeMap::new(),
            net_worth_start_of_year: 0.0,
            net_worth_end_of_year: 0.0,
            events_occurred: Vec::new(),
            has_shortfall: false,
            shortfall_amount: 0.0,
        }
    }

    /// Set primary and spouse ages
    pub fn ages(mut self, primary: Option<u32>, spouse: Option<u32>) -> Self {
        self.primary_age = primary;
        self.spouse_age = spouse;
        self
    }

    /// Add an individual's income breakdown
    pub fn income(mut self, individual: impl Into<String>, income: AnnualIncome) -> Self {
        self.income_by_individual.insert(individual.into(), income);
        self
    }

    /// Set an expense category amount
    pub fn expense(mut self, category: ExpenseCategory, amount: f64) -> Self {
        self.expenses_by_category
            .insert(category.key().to_string(), amount);
        self
    }

    /// Record a withdrawal from an account
    pub fn withdrawal(mut self, account: impl Into<String>, amount: f64) -> Self {
        self.withdrawals_by_account.insert(account.into(), amount);
        self
    }

    /// Record a contribution to an account
    pub fn contribution(mut self, account: impl Into<String>, amount: f64) -> Self {
        self.contributions_by_account.insert(account.into(), amount);
        self
    }

    /// Set an account's end-of-year balance
    pub fn balance_end(mut self, account: impl Into<String>, amount: f64) -> Self {
        self.assets_end_of_year.insert(account.into(), amount);
        self
    }

    /// Set an account's realized return
    pub fn asset_return(mut self, account: impl Into<String>, amount: f64) -> Self {
        self.asset_returns.insert(account.into(), amount);
        self
    }

    /// Set start and end net worth
    pub fn net_worth(mut self, start: f64, end: f64) -> Self {
        self.net_worth_start_of_year = start;
        self.net_worth_end_of_year = end;
        self
    }

    /// Mark the year as a shortfall year
    pub fn shortfall(mut self, amount: f64) -> Self {
        self.has_shortfall = true;
        self.shortfall_amount = amount;
        self
    }

    /// Amount for an expense category (0 when absent)
    pub fn expense_amount(&self, category: ExpenseCategory) -> f64 {
        self.expenses_by_category
            .get(category.key())
            .copied()
            .unwrap_or(0.0)
    }

    /// Shortfall amount, present only when the year is flagged
    pub fn shortfall_value(&self) -> Option<f64> {
        self.has_shortfall.then_some(self.shortfall_amount)
    }
}

// ============================================================================
// Projection
// ============================================================================

/// One scenario's complete multi-year result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "request::ProjectionRecord")]
pub struct Projection {
    pub scenario_id: String,
    pub project_id: String,
    pub start_year: i32,
    pub end_year: i32,
    pub use_constant_dollars: bool,
    pub inflation_rate: f64,
    pub years: Vec<YearlyProjection>,
    pub calculated_at: DateTime<Utc>,
}

impl Projection {
    /// Create a validated projection
    pub fn new(
        scenario_id: impl Into<String>,
        project_id: impl Into<String>,
        start_year: i32,
        end_year: i32,
        years: Vec<YearlyProjection>,
    ) -> Result<Self, ModelError> {
        let projection = Self {
            scenario_id: scenario_id.into(),
            project_id: project_id.into(),
            start_year,
            end_year,
            use_constant_dollars: false,
            inflation_rate: 0.0,
            years,
            calculated_at: Utc::now(),
        };
        projection.validate()?;
        Ok(projection)
    }

    /// Set the dollar basis
    pub fn constant_dollars(mut self, constant: bool) -> Self {
        self.use_constant_dollars = constant;
        self
    }

    /// Set the inflation rate (fraction, e.g. 0.02)
    pub fn inflation(mut self, rate: f64) -> Self {
        self.inflation_rate = rate;
        self
    }

    /// Set the computation timestamp
    pub fn calculated_at(mut self, at: DateTime<Utc>) -> Self {
        self.calculated_at = at;
        self
    }

    /// Check year ordering and horizon bounds
    pub fn validate(&self) -> Result<(), ModelError> {
        for year in &self.years {
            if year.year < self.start_year || year.year > self.end_year {
                return Err(ModelError::YearOutOfRange {
                    year: year.year,
                    start: self.start_year,
                    end: self.end_year,
                });
            }
        }
        for pair in self.years.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(ModelError::YearOrder {
                    previous: pair[0].year,
                    next: pair[1].year,
                });
            }
        }
        Ok(())
    }

    /// A spouse age in any year switches the whole workbook to the couple layout
    pub fn has_couple(&self) -> bool {
        self.years.iter().any(|y| y.spouse_age.is_some())
    }

    pub fn first_year(&self) -> Option<&YearlyProjection> {
        self.years.first()
    }

    pub fn last_year(&self) -> Option<&YearlyProjection> {
        self.years.last()
    }

    /// "Constant" or "Current" dollar accounting
    pub fn dollar_basis(&self) -> &'static str {
        if self.use_constant_dollars {
            "Constant"
        } else {
            "Current"
        }
    }
}

/// Parse a `calculatedAt` timestamp.
///
/// Accepts RFC 3339 (including a trailing `Z`) and naive ISO 8601 date-times,
/// which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ModelError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ModelError::Timestamp(raw.to_string()))
}

// ============================================================================
// Scenario
// ============================================================================

/// A projection with its display label and account list
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub projection: Projection,
    pub label: String,
    pub assets: Vec<Asset>,
}

impl Scenario {
    pub fn new(projection: Projection, label: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            projection,
            label: label.into(),
            assets,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render one scenario to the output format
    fn render(&self, scenario: &Scenario) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Model construction error
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Years must be strictly increasing: {previous} followed by {next}")]
    YearOrder { previous: i32, next: i32 },

    #[error("Year {year} outside planning horizon {start}-{end}")]
    YearOutOfRange { year: i32, start: i32, end: i32 },
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
