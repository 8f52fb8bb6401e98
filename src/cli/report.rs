use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::reports;

use super::{parse_month, Ctx};

pub fn summary(year: Option<i32>) -> Result<()> {
    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let currency = &data.settings.currency;
    let year = year.unwrap_or_else(|| chrono::Local::now().year());

    let rows = reports::monthly_totals(&data.income, &data.expenses, year);
    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expenses", "Profit"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(reports::month_name(row.month)),
            Cell::new(money(row.income, currency)),
            Cell::new(money(row.expenses, currency)),
            Cell::new(money(row.profit, currency)),
        ]);
    }

    let income: f64 = rows.iter().map(|r| r.income).sum();
    let expenses: f64 = rows.iter().map(|r| r.expenses).sum();
    let profit = reports::profit(income, expenses);
    let margin = reports::profit_margin(profit, income);

    println!("{} — {}\n{table}", ctx.registry.active().name.bold(), year);
    println!();
    println!("Income:   {}", money(income, currency).green());
    println!("Expenses: {}", money(expenses, currency).red());
    println!("Profit:   {} ({margin:.1}% margin)", money(profit, currency).bold());
    Ok(())
}

pub fn monthly(month: &str) -> Result<()> {
    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let currency = &data.settings.currency;
    let (year, m) = parse_month(month)?;

    let income: Vec<_> = reports::filter_by_month(&data.income, year, m)
        .into_iter()
        .cloned()
        .collect();
    let expenses: Vec<_> = reports::filter_by_month(&data.expenses, year, m)
        .into_iter()
        .cloned()
        .collect();

    println!("{} — {} {}", ctx.registry.active().name.bold(), reports::month_name(m), year);
    println!();
    print_breakdown("INCOME", &reports::category_totals(&income), currency);
    print_breakdown("EXPENSES", &reports::category_totals(&expenses), currency);

    let total_income = reports::total_income(&income);
    let total_expenses = reports::total_expenses(&expenses);
    let profit = reports::profit(total_income, total_expenses);
    println!("Income:   {}", money(total_income, currency).green());
    println!("Expenses: {}", money(total_expenses, currency).red());
    println!("Profit:   {}", money(profit, currency).bold());
    Ok(())
}

fn print_breakdown(title: &str, totals: &[reports::CategoryTotal], currency: &str) {
    if totals.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Entries", "Net"]);
    for row in totals {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.count),
            Cell::new(money(row.total, currency)),
        ]);
    }
    println!("{title}\n{table}\n");
}
