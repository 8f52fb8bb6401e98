use crate::config::{get_data_dir, store_path};
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::reports;

use super::Ctx;

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    let db_path = store_path();

    println!("Data dir:   {}", data_dir.display());
    println!("Store:      {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("No data yet. Run `auditthis init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("Store size: {}", format_bytes(size));

    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let currency = &data.settings.currency;
    let income = reports::total_income(&data.income);
    let expenses = reports::total_expenses(&data.expenses);

    println!("Company:    {}", ctx.registry.active().name);
    if ctx.registry.is_first_time() {
        println!("            (demo books — add your own company to get started)");
    }
    println!();
    println!("Companies:        {}", ctx.registry.companies().len());
    println!("Income entries:   {}", data.income.len());
    println!("Expense entries:  {}", data.expenses.len());
    println!("Net income:       {}", money(income, currency));
    println!("Net expenses:     {}", money(expenses, currency));
    println!("Profit:           {}", money(reports::profit(income, expenses), currency));
    Ok(())
}
