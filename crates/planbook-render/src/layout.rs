//! Column layout planning
//!
//! A single catalog of metric groups defines every projection table. The
//! planner turns it into absolute 0-based column indices:
//!
//! ```text
//! | Year | Age 1 | [Age 2] | Income (5 + Total) | Expenses (6 + Total) | Taxes (2 + Total) |
//! | Cash Flow (2) | Withdrawals (4 + Total) | Contributions (2 + Total) |
//! | Asset Balances (5 + Total Asset Returns) | Net Worth (2) | Shortfall (1) |
//! ```
//!
//! The Detailed table uses the full plan; the Base table uses the same catalog
//! with detail columns dropped. Charts look up their source columns in the
//! Detailed plan, so tables and charts never disagree on an offset.

use planbook_core::{AccountType, ExpenseCategory, IncomeSource};
use std::collections::HashMap;

/// Width of the Year column
const YEAR_WIDTH: f64 = 6.0;
/// Width of age columns
const AGE_WIDTH: f64 = 8.0;
/// Width of every amount column
const AMOUNT_WIDTH: f64 = 16.0;

/// One displayable value of a year row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Year,
    PrimaryAge,
    SpouseAge,
    Income(IncomeSource),
    TotalIncome,
    Expense(ExpenseCategory),
    TotalExpenses,
    FederalTax,
    QuebecTax,
    TotalTax,
    AfterTaxIncome,
    NetCashFlow,
    Withdrawals(AccountType),
    TotalWithdrawals,
    Contributions(AccountType),
    TotalContributions,
    Balance(AccountType),
    TotalAssetReturns,
    NetWorthStart,
    NetWorthEnd,
    Shortfall,
}

impl Metric {
    /// Column header label
    pub fn label(self) -> String {
        match self {
            Metric::Year => "Year".into(),
            Metric::PrimaryAge => "Age 1".into(),
            Metric::SpouseAge => "Age 2".into(),
            Metric::Income(source) => format!("{} Income", source.label()),
            Metric::TotalIncome => "Total Income".into(),
            Metric::Expense(category) => format!("{} Expenses", category.label()),
            Metric::TotalExpenses => "Total Expenses".into(),
            Metric::FederalTax => "Federal Tax".into(),
            Metric::QuebecTax => "Quebec Tax".into(),
            Metric::TotalTax => "Total Tax".into(),
            Metric::AfterTaxIncome => "After-Tax Income".into(),
            Metric::NetCashFlow => "Net Cash Flow".into(),
            Metric::Withdrawals(account) => format!("{} Withdrawals", account.label()),
            Metric::TotalWithdrawals => "Total Withdrawals".into(),
            Metric::Contributions(account) => format!("{} Contributions", account.label()),
            Metric::TotalContributions => "Total Contributions".into(),
            Metric::Balance(account) => format!("{} Balance", account.label()),
            Metric::TotalAssetReturns => "Total Asset Returns".into(),
            Metric::NetWorthStart => "Net Worth (Start)".into(),
            Metric::NetWorthEnd => "Net Worth (End)".into(),
            Metric::Shortfall => "Shortfall Amount".into(),
        }
    }

    /// Whether the metric is displayed as a plain integer (years, ages)
    pub fn is_integer(self) -> bool {
        matches!(self, Metric::Year | Metric::PrimaryAge | Metric::SpouseAge)
    }

    fn width(self) -> f64 {
        match self {
            Metric::Year => YEAR_WIDTH,
            Metric::PrimaryAge | Metric::SpouseAge => AGE_WIDTH,
            _ => AMOUNT_WIDTH,
        }
    }
}

/// Semantic role of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Row identity (year, ages); frozen, never grouped
    Key,
    /// Component of a group; collapsible
    Detail,
    /// Subtotal or standalone aggregate; total-styled and always visible
    Aggregate,
}

/// Logical column groups, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupId {
    Identity,
    Income,
    Expenses,
    Taxes,
    CashFlow,
    Withdrawals,
    Contributions,
    Balances,
    NetWorth,
    Shortfall,
}

impl GroupId {
    /// Label shown in the Detailed table's group band
    pub fn label(self) -> &'static str {
        match self {
            GroupId::Identity => "",
            GroupId::Income => "Income",
            GroupId::Expenses => "Expenses",
            GroupId::Taxes => "Taxes",
            GroupId::CashFlow => "Cash Flow",
            GroupId::Withdrawals => "Withdrawals",
            GroupId::Contributions => "Contributions",
            GroupId::Balances => "Asset Balances",
            GroupId::NetWorth => "Net Worth",
            GroupId::Shortfall => "Shortfall",
        }
    }
}

/// A planned column
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub index: u16,
    pub metric: Metric,
    pub kind: ColumnKind,
    pub label: String,
    pub width: f64,
}

/// A contiguous run of columns belonging to one group (inclusive bounds)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnGroup {
    pub id: GroupId,
    pub start: u16,
    pub end: u16,
    /// Detail columns, always a prefix of the group
    pub detail: Option<(u16, u16)>,
}

/// Column plan of one table
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    columns: Vec<Column>,
    groups: Vec<ColumnGroup>,
    index: HashMap<Metric, u16>,
}

impl LayoutPlan {
    /// Full plan with every detail column (Detailed table)
    pub fn detailed(has_couple: bool) -> Self {
        Self::build(has_couple, true)
    }

    /// Plan with key and aggregate columns only (Base table)
    pub fn base(has_couple: bool) -> Self {
        Self::build(has_couple, false)
    }

    fn build(has_couple: bool, include_details: bool) -> Self {
        let mut columns = Vec::new();
        let mut groups = Vec::new();
        let mut index = HashMap::new();
        let mut next: u16 = 0;

        for (id, entries) in catalog(has_couple) {
            let start = next;
            let mut detail: Option<(u16, u16)> = None;
            for (metric, kind) in entries {
                if kind == ColumnKind::Detail && !include_details {
                    continue;
                }
                if kind == ColumnKind::Detail {
                    detail = Some(detail.map_or((next, next), |(first, _)| (first, next)));
                }
                index.insert(metric, next);
                columns.push(Column {
                    index: next,
                    metric,
                    kind,
                    label: metric.label(),
                    width: metric.width(),
                });
                next += 1;
            }
            if next > start {
                groups.push(ColumnGroup {
                    id,
                    start,
                    end: next - 1,
                    detail,
                });
            }
        }

        Self {
            columns,
            groups,
            index,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    /// Total number of columns
    pub fn column_count(&self) -> u16 {
        self.columns.len() as u16
    }

    /// Number of leading key columns (frozen pane width)
    pub fn key_columns(&self) -> u16 {
        self.columns
            .iter()
            .take_while(|c| c.kind == ColumnKind::Key)
            .count() as u16
    }

    /// Column index of a metric, if the plan contains it
    pub fn column_of(&self, metric: Metric) -> Option<u16> {
        self.index.get(&metric).copied()
    }

    pub fn group(&self, id: GroupId) -> Option<&ColumnGroup> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// Ordered metric catalog
fn catalog(has_couple: bool) -> Vec<(GroupId, Vec<(Metric, ColumnKind)>)> {
    use ColumnKind::{Aggregate, Detail, Key};

    let mut identity = vec![(Metric::Year, Key), (Metric::PrimaryAge, Key)];
    if has_couple {
        identity.push((Metric::SpouseAge, Key));
    }

    let mut income: Vec<_> = IncomeSource::ALL
        .iter()
        .map(|s| (Metric::Income(*s), Detail))
        .collect();
    income.push((Metric::TotalIncome, Aggregate));

    let mut expenses: Vec<_> = ExpenseCategory::ALL
        .iter()
        .map(|c| (Metric::Expense(*c), Detail))
        .collect();
    expenses.push((Metric::TotalExpenses, Aggregate));

    let withdrawal_accounts = [
        AccountType::Celi,
        AccountType::Cash,
        AccountType::Cri,
        AccountType::Rrsp,
    ];
    let mut withdrawals: Vec<_> = withdrawal_accounts
        .iter()
        .map(|a| (Metric::Withdrawals(*a), Detail))
        .collect();
    withdrawals.push((Metric::TotalWithdrawals, Aggregate));

    let balance_accounts = [
        AccountType::RealEstate,
        AccountType::Rrsp,
        AccountType::Celi,
        AccountType::Cri,
        AccountType::Cash,
    ];
    let mut balances: Vec<_> = balance_accounts
        .iter()
        .map(|a| (Metric::Balance(*a), Detail))
        .collect();
    balances.push((Metric::TotalAssetReturns, Aggregate));

    vec![
        (GroupId::Identity, identity),
        (GroupId::Income, income),
        (GroupId::Expenses, expenses),
        (
            GroupId::Taxes,
            vec![
                (Metric::FederalTax, Detail),
                (Metric::QuebecTax, Detail),
                (Metric::TotalTax, Aggregate),
            ],
        ),
        (
            GroupId::CashFlow,
            vec![
                (Metric::AfterTaxIncome, Aggregate),
                (Metric::NetCashFlow, Aggregate),
            ],
        ),
        (GroupId::Withdrawals, withdrawals),
        (
            GroupId::Contributions,
            vec![
                (Metric::Contributions(AccountType::Celi), Detail),
                (Metric::Contributions(AccountType::Cash), Detail),
                (Metric::TotalContributions, Aggregate),
            ],
        ),
        (GroupId::Balances, balances),
        (
            GroupId::NetWorth,
            vec![
                (Metric::NetWorthStart, Aggregate),
                (Metric::NetWorthEnd, Aggregate),
            ],
        ),
        (GroupId::Shortfall, vec![(Metric::Shortfall, Aggregate)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bounds(plan: &LayoutPlan) -> Vec<(GroupId, u16, u16)> {
        plan.groups().iter().map(|g| (g.id, g.start, g.end)).collect()
    }

    #[test]
    fn single_layout_has_37_columns() {
        let plan = LayoutPlan::detailed(false);
        assert_eq!(plan.column_count(), 37);
        assert_eq!(plan.key_columns(), 2);
        assert_eq!(plan.column_of(Metric::SpouseAge), None);
    }

    #[test]
    fn couple_layout_shifts_everything_by_one() {
        let single = LayoutPlan::detailed(false);
        let couple = LayoutPlan::detailed(true);
        assert_eq!(couple.column_count(), 38);
        assert_eq!(couple.column_of(Metric::SpouseAge), Some(2));
        for column in single.columns().iter().skip(2) {
            assert_eq!(couple.column_of(column.metric), Some(column.index + 1));
        }
    }

    #[test]
    fn group_bounds_single() {
        let plan = LayoutPlan::detailed(false);
        assert_eq!(
            bounds(&plan),
            vec![
                (GroupId::Identity, 0, 1),
                (GroupId::Income, 2, 7),
                (GroupId::Expenses, 8, 14),
                (GroupId::Taxes, 15, 17),
                (GroupId::CashFlow, 18, 19),
                (GroupId::Withdrawals, 20, 24),
                (GroupId::Contributions, 25, 27),
                (GroupId::Balances, 28, 33),
                (GroupId::NetWorth, 34, 35),
                (GroupId::Shortfall, 36, 36),
            ]
        );
    }

    #[test]
    fn detail_ranges_precede_subtotals() {
        let plan = LayoutPlan::detailed(false);
        let income = plan.group(GroupId::Income).unwrap();
        assert_eq!(income.detail, Some((2, 6)));
        assert_eq!(plan.column_of(Metric::TotalIncome), Some(7));

        let cash_flow = plan.group(GroupId::CashFlow).unwrap();
        assert_eq!(cash_flow.detail, None);
    }

    #[test]
    fn plans_are_deterministic() {
        for couple in [false, true] {
            assert_eq!(LayoutPlan::detailed(couple), LayoutPlan::detailed(couple));
            assert_eq!(LayoutPlan::base(couple), LayoutPlan::base(couple));
        }
    }

    #[test]
    fn base_plan_keeps_only_key_and_aggregate_columns() {
        let plan = LayoutPlan::base(false);
        let labels: Vec<&str> = plan.columns().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Year",
                "Age 1",
                "Total Income",
                "Total Expenses",
                "Total Tax",
                "After-Tax Income",
                "Net Cash Flow",
                "Total Withdrawals",
                "Total Contributions",
                "Total Asset Returns",
                "Net Worth (Start)",
                "Net Worth (End)",
                "Shortfall Amount",
            ]
        );
        assert!(plan.groups().iter().all(|g| g.detail.is_none()));
        assert_eq!(LayoutPlan::base(true).column_count(), 14);
    }

    #[test]
    fn catalog_labels() {
        let plan = LayoutPlan::detailed(false);
        let label = |m| plan.columns()[plan.column_of(m).unwrap() as usize].label.clone();
        assert_eq!(label(Metric::Income(IncomeSource::Rrq)), "RRQ Income");
        assert_eq!(
            label(Metric::Expense(ExpenseCategory::DailyLiving)),
            "Daily Living Expenses"
        );
        assert_eq!(label(Metric::Withdrawals(AccountType::Rrsp)), "REER Withdrawals");
        assert_eq!(label(Metric::Balance(AccountType::RealEstate)), "Real Estate Balance");
    }

    /// Labels naming an aggregate ("Total", "Net Worth", "After-Tax") are
    /// always planned as aggregates.
    #[test]
    fn aggregate_labels_are_aggregate_columns() {
        let markers = ["Total", "Net Worth", "After-Tax"];
        for couple in [false, true] {
            for column in LayoutPlan::detailed(couple).columns() {
                if markers.iter().any(|m| column.label.contains(m)) {
                    assert_eq!(column.kind, ColumnKind::Aggregate, "{}", column.label);
                }
            }
        }
    }

    #[test]
    fn cash_flow_and_shortfall_are_aggregates() {
        let plan = LayoutPlan::detailed(false);
        for metric in [Metric::NetCashFlow, Metric::Shortfall] {
            let column = &plan.columns()[plan.column_of(metric).unwrap() as usize];
            assert_eq!(column.kind, ColumnKind::Aggregate);
        }
    }
}
