use chrono::{Datelike, NaiveDate};

use crate::models::{ExpenseEntry, IncomeEntry, LedgerEntry};

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Net income over a list of entries.
pub fn total_income(entries: &[IncomeEntry]) -> f64 {
    entries.iter().map(|e| e.net_income).sum()
}

/// Net expenses over a list of entries.
pub fn total_expenses(entries: &[ExpenseEntry]) -> f64 {
    entries.iter().map(|e| e.net_expense).sum()
}

pub fn profit(income: f64, expenses: f64) -> f64 {
    income - expenses
}

/// Profit margin in percent; zero when there is no income.
pub fn profit_margin(profit: f64, income: f64) -> f64 {
    if income > 0.0 {
        profit / income * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
}

/// Net totals grouped by category name, largest first.
pub fn category_totals<E: LedgerEntry>(entries: &[E]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for entry in entries {
        match totals.iter_mut().find(|t| t.name == entry.category()) {
            Some(t) => {
                t.total += entry.net();
                t.count += 1;
            }
            None => totals.push(CategoryTotal {
                name: entry.category().to_string(),
                total: entry.net(),
                count: 1,
            }),
        }
    }
    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    totals
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Entries whose parsed date matches the year and 0-based month exactly.
/// Unparseable dates never match.
pub fn filter_by_month<'a, E: LedgerEntry>(entries: &'a [E], year: i32, month: u32) -> Vec<&'a E> {
    entries
        .iter()
        .filter(|e| {
            parse_date(e.date())
                .is_some_and(|d| d.year() == year && d.month0() == month)
        })
        .collect()
}

pub struct MonthTotals {
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
}

/// Twelve rows of net income/expense/profit for the annual overview.
pub fn monthly_totals(income: &[IncomeEntry], expenses: &[ExpenseEntry], year: i32) -> Vec<MonthTotals> {
    (0..12)
        .map(|month| {
            let inc: f64 = filter_by_month(income, year, month)
                .iter()
                .map(|e| e.net_income)
                .sum();
            let exp: f64 = filter_by_month(expenses, year, month)
                .iter()
                .map(|e| e.net_expense)
                .sum();
            MonthTotals {
                month,
                income: inc,
                expenses: exp,
                profit: profit(inc, exp),
            }
        })
        .collect()
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short month name by 0-based index.
pub fn month_name(month: u32) -> &'static str {
    MONTHS[month as usize % 12]
}
