//! Row aggregation
//!
//! Derives every scalar a year row displays from the nested per-individual
//! and per-account maps of a [`YearlyProjection`].
//!
//! Account rollups resolve each account id through an [`AssetTypeMap`]. Ids
//! that are not in the asset list, or whose type label is outside the known
//! set, land in no bucket. The year's own grand totals (`total_withdrawals`,
//! `total_contributions`) are displayed as given, so bucket sums may fall short
//! of them when such accounts exist.

use crate::layout::Metric;
use crate::sink::CellValue;
use planbook_core::{AccountType, Asset, IncomeSource, YearlyProjection};
use std::collections::{BTreeMap, HashMap};

/// Account id to account type lookup for one scenario
#[derive(Clone, Debug, Default)]
pub struct AssetTypeMap {
    types: HashMap<String, AccountType>,
}

impl AssetTypeMap {
    pub fn new(assets: &[Asset]) -> Self {
        let types = assets
            .iter()
            .filter_map(|a| a.account_type().map(|t| (a.id.clone(), t)))
            .collect();
        Self { types }
    }

    pub fn resolve(&self, account: &str) -> Option<AccountType> {
        self.types.get(account).copied()
    }
}

/// Per-type sums of an account map
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TypeTotals {
    sums: [f64; AccountType::ALL.len()],
}

impl TypeTotals {
    /// Sum map entries into their resolved type buckets
    pub fn from_accounts(amounts: &BTreeMap<String, f64>, types: &AssetTypeMap) -> Self {
        let mut totals = Self::default();
        for (account, amount) in amounts {
            if let Some(account_type) = types.resolve(account) {
                totals.sums[slot(account_type)] += amount;
            }
        }
        totals
    }

    pub fn get(&self, account_type: AccountType) -> f64 {
        self.sums[slot(account_type)]
    }

    /// Sum over all buckets (excludes unresolved accounts)
    pub fn bucketed_total(&self) -> f64 {
        self.sums.iter().sum()
    }
}

fn slot(account_type: AccountType) -> usize {
    match account_type {
        AccountType::RealEstate => 0,
        AccountType::Rrsp => 1,
        AccountType::Celi => 2,
        AccountType::Cri => 3,
        AccountType::Cash => 4,
    }
}

/// All derived values of one year row
#[derive(Clone, Debug, PartialEq)]
pub struct RowValues<'a> {
    year: &'a YearlyProjection,
    income: [f64; IncomeSource::ALL.len()],
    pub withdrawals: TypeTotals,
    pub contributions: TypeTotals,
    pub balances: TypeTotals,
    pub returns: TypeTotals,
    /// Sum of every realized return, resolved or not
    pub total_returns: f64,
}

/// Aggregate one year against the scenario's asset types
pub fn aggregate<'a>(year: &'a YearlyProjection, types: &AssetTypeMap) -> RowValues<'a> {
    let mut income = [0.0; IncomeSource::ALL.len()];
    for breakdown in year.income_by_individual.values() {
        for (sum, source) in income.iter_mut().zip(IncomeSource::ALL) {
            *sum += source.amount(breakdown);
        }
    }

    RowValues {
        year,
        income,
        withdrawals: TypeTotals::from_accounts(&year.withdrawals_by_account, types),
        contributions: TypeTotals::from_accounts(&year.contributions_by_account, types),
        balances: TypeTotals::from_accounts(&year.assets_end_of_year, types),
        returns: TypeTotals::from_accounts(&year.asset_returns, types),
        total_returns: year.asset_returns.values().sum(),
    }
}

impl RowValues<'_> {
    pub fn year(&self) -> i32 {
        self.year.year
    }

    /// Income from one source, summed across individuals
    pub fn income(&self, source: IncomeSource) -> f64 {
        IncomeSource::ALL
            .iter()
            .position(|s| *s == source)
            .map_or(0.0, |i| self.income[i])
    }

    /// Cell value for a planned metric
    pub fn value(&self, metric: Metric) -> CellValue {
        let year = self.year;
        let age = |age: Option<u32>| age.map_or(CellValue::Blank, |a| CellValue::Integer(a.into()));
        let amount = match metric {
            Metric::Year => return CellValue::Integer(year.year.into()),
            Metric::PrimaryAge => return age(year.primary_age),
            Metric::SpouseAge => return age(year.spouse_age),
            Metric::Shortfall => {
                return year
                    .shortfall_value()
                    .map_or(CellValue::Blank, CellValue::Number)
            }
            Metric::Income(source) => self.income(source),
            Metric::TotalIncome => year.total_income,
            Metric::Expense(category) => year.expense_amount(category),
            Metric::TotalExpenses => year.total_expenses,
            Metric::FederalTax => year.federal_tax,
            Metric::QuebecTax => year.quebec_tax,
            Metric::TotalTax => year.total_tax,
            Metric::AfterTaxIncome => year.after_tax_income,
            Metric::NetCashFlow => year.net_cash_flow,
            Metric::Withdrawals(account) => self.withdrawals.get(account),
            Metric::TotalWithdrawals => year.total_withdrawals,
            Metric::Contributions(account) => self.contributions.get(account),
            Metric::TotalContributions => year.total_contributions,
            Metric::Balance(account) => self.balances.get(account),
            Metric::TotalAssetReturns => self.total_returns,
            Metric::NetWorthStart => year.net_worth_start_of_year,
            Metric::NetWorthEnd => year.net_worth_end_of_year,
        };
        CellValue::Number(amount)
    }
}
