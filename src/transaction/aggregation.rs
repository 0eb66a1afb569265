//! Transaction data aggregation for the financial summary.
//!
//! The functions here are pure: the database layer selects the rows and
//! [summarize] turns them into totals, per-category breakdowns and a monthly trend.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    TransactionType,
    amount::{cents_to_decimal, cents_to_f64},
    category::CategoryId,
};

/// A half-open range of dates, `[start, end)`. A missing bound is unbounded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

/// The parts of a transaction the summary needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub transaction_type: TransactionType,
    pub category_id: CategoryId,
    pub category_name: String,
    pub date: Date,
    pub amount_cents: i64,
}

/// The total of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    pub category_id: CategoryId,
    pub amount: f64,
}

/// The income and expenses of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// The month formatted as "YYYY-MM".
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// Totals, breakdowns and the monthly trend of a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Income minus expenses, may be negative.
    pub balance: Decimal,
    /// Sorted by amount, largest first.
    pub expense_by_category: Vec<CategoryTotal>,
    /// Sorted by amount, largest first.
    pub income_by_category: Vec<CategoryTotal>,
    /// Sorted by month, oldest first.
    pub monthly_trend: Vec<MonthlyTotal>,
}

/// Sum the rows of one type per category, largest total first.
///
/// Ties are broken by category ID so the order is stable.
fn totals_by_category(rows: &[SummaryRow], transaction_type: TransactionType) -> Vec<CategoryTotal> {
    let mut totals: HashMap<CategoryId, (&str, i64)> = HashMap::new();

    for row in rows.iter().filter(|row| row.transaction_type == transaction_type) {
        let entry = totals
            .entry(row.category_id)
            .or_insert((row.category_name.as_str(), 0));
        entry.1 += row.amount_cents;
    }

    let mut totals: Vec<(CategoryId, &str, i64)> = totals
        .into_iter()
        .map(|(id, (name, cents))| (id, name, cents))
        .collect();
    totals.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    totals
        .into_iter()
        .map(|(category_id, name, cents)| CategoryTotal {
            category: name.to_owned(),
            category_id,
            amount: cents_to_f64(cents),
        })
        .collect()
}

fn format_month(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// Sum income and expenses per calendar month, oldest month first.
///
/// Only months with at least one transaction are included.
fn monthly_trend(rows: &[SummaryRow]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<String, (i64, i64)> = BTreeMap::new();

    for row in rows {
        let (income, expense) = months.entry(format_month(row.date)).or_insert((0, 0));

        match row.transaction_type {
            TransactionType::Income => *income += row.amount_cents,
            TransactionType::Expense => *expense += row.amount_cents,
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotal {
            month,
            income: cents_to_f64(income),
            expense: cents_to_f64(expense),
        })
        .collect()
}

/// Compute the financial summary of `rows`.
///
/// An empty slice produces zero totals and empty lists.
pub fn summarize(rows: &[SummaryRow]) -> FinancialSummary {
    let sum_of = |transaction_type: TransactionType| -> i64 {
        rows.iter()
            .filter(|row| row.transaction_type == transaction_type)
            .map(|row| row.amount_cents)
            .sum()
    };

    let income_cents = sum_of(TransactionType::Income);
    let expense_cents = sum_of(TransactionType::Expense);

    FinancialSummary {
        total_income: cents_to_decimal(income_cents),
        total_expenses: cents_to_decimal(expense_cents),
        balance: cents_to_decimal(income_cents - expense_cents),
        expense_by_category: totals_by_category(rows, TransactionType::Expense),
        income_by_category: totals_by_category(rows, TransactionType::Income),
        monthly_trend: monthly_trend(rows),
    }
}
