use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::models::Tag;

use super::{Ctx, TagCommands};

#[derive(Clone, Copy)]
pub enum TagList {
    Stream,
    Category,
    Vendor,
}

impl TagList {
    fn label(&self) -> &'static str {
        match self {
            Self::Stream => "income stream",
            Self::Category => "expense category",
            Self::Vendor => "vendor",
        }
    }
}

pub fn show() -> Result<()> {
    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let settings = &data.settings;

    println!("Company:     {}", ctx.registry.active().name);
    println!("Currency:    {}", settings.currency);
    println!("Start date:  {}", settings.start_date);
    match &settings.last_reconciliation_date {
        Some(date) => println!("Reconciled:  through {date}"),
        None => println!("Reconciled:  never"),
    }
    if let Some(balance) = settings.opening_balance {
        println!("Opening bal: {}", money(balance, &settings.currency));
    }
    println!();
    print_tags("Income streams", &settings.income_streams);
    print_tags("Expense categories", &settings.expense_categories);
    print_tags("Vendors", &settings.vendors);
    Ok(())
}

fn print_tags(title: &str, tags: &[Tag]) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Active"]);
    for tag in tags {
        table.add_row(vec![
            Cell::new(&tag.id),
            Cell::new(&tag.name),
            Cell::new(if tag.is_active { "yes" } else { "no" }),
        ]);
    }
    println!("{title}\n{table}\n");
}

pub fn set_currency(symbol: &str) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    data.settings.currency = symbol.to_string();
    ctx.store.save_settings(&company_id, &data.settings);
    println!("Currency set to {symbol}");
    Ok(())
}

pub fn set_start_date(date: &str) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    data.settings.start_date = date.to_string();
    ctx.store.save_settings(&company_id, &data.settings);
    println!("Start date set to {date}");
    Ok(())
}

pub fn tag(list: TagList, command: TagCommands) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();

    match command {
        TagCommands::Add { name } => {
            let added = match list {
                TagList::Stream => data.settings.add_income_stream(&name)?,
                TagList::Category => data.settings.add_expense_category(&name)?,
                TagList::Vendor => data.settings.add_vendor(&name)?,
            };
            let message = format!("Added {} {} ({})", list.label(), added.name, added.id);
            ctx.store.save_settings(&company_id, &data.settings);
            println!("{message}");
        }
        TagCommands::Disable { id } => {
            match list {
                TagList::Stream => data.settings.disable_income_stream(&id)?,
                TagList::Category => data.settings.disable_expense_category(&id)?,
                TagList::Vendor => data.settings.disable_vendor(&id)?,
            }
            ctx.store.save_settings(&company_id, &data.settings);
            println!("Disabled {} {id}; existing entries are unchanged", list.label());
        }
        TagCommands::List => {
            let tags = match list {
                TagList::Stream => &data.settings.income_streams,
                TagList::Category => &data.settings.expense_categories,
                TagList::Vendor => &data.settings.vendors,
            };
            print_tags("Items", tags);
        }
    }
    Ok(())
}
