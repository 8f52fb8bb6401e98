use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::ledger::{self, EntryPatch, NewEntry, SplitPart};
use crate::models::{EntryKind, LedgerEntry};
use crate::reports;

use super::{parse_month, Ctx};

fn parse_part(raw: &str) -> Result<SplitPart> {
    if let Some((category, amount)) = raw.rsplit_once('=') {
        if let Ok(amount) = amount.trim().parse::<f64>() {
            return Ok(SplitPart {
                category: category.trim().to_string(),
                amount,
            });
        }
    }
    Err(crate::error::AuditError::Invalid(format!(
        "invalid split part: {raw} (expected 'Category=amount')"
    )))
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    kind: EntryKind,
    date: &str,
    category: &str,
    amount: f64,
    tax: f64,
    vendor: Option<String>,
    notes: &str,
) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    let new = NewEntry {
        date: date.to_string(),
        category: category.to_string(),
        gross: amount,
        tax,
        vendor,
        notes: notes.to_string(),
    };
    let id = match kind {
        EntryKind::Income => {
            let id = ledger::add_entry(&mut data.income, new)?;
            ctx.store.save_income(&company_id, &data.income);
            id
        }
        EntryKind::Expense => {
            let id = ledger::add_entry(&mut data.expenses, new)?;
            ctx.store.save_expenses(&company_id, &data.expenses);
            id
        }
    };
    println!("Added {kind} entry {id}");
    Ok(())
}

fn print_entries<E: LedgerEntry>(entries: &[E], currency: &str, month: Option<(i32, u32)>) {
    let filtered: Vec<&E> = match month {
        Some((year, m)) => reports::filter_by_month(entries, year, m),
        None => entries.iter().collect(),
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Vendor", "Gross", "Tax", "Net", "Rec"]);
    for entry in &filtered {
        let reconciled = entry.reconciliation().is_some_and(|r| r.is_reconciled);
        table.add_row(vec![
            Cell::new(entry.id()),
            Cell::new(entry.date()),
            Cell::new(entry.category()),
            Cell::new(entry.vendor().unwrap_or_default()),
            Cell::new(money(entry.gross(), currency)),
            Cell::new(money(entry.tax(), currency)),
            Cell::new(money(entry.net(), currency)),
            Cell::new(if reconciled { "x" } else { "" }),
        ]);
    }
    let total: f64 = filtered.iter().map(|e| e.net()).sum();
    println!("{table}");
    println!("Net total: {}", money(total, currency));
}

pub fn list(kind: EntryKind, month: Option<String>) -> Result<()> {
    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let month = month.as_deref().map(parse_month).transpose()?;
    match kind {
        EntryKind::Income => print_entries(&data.income, &data.settings.currency, month),
        EntryKind::Expense => print_entries(&data.expenses, &data.settings.currency, month),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    kind: EntryKind,
    id: &str,
    date: Option<String>,
    category: Option<String>,
    amount: Option<f64>,
    tax: Option<f64>,
    vendor: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let mut patches = Vec::new();
    if let Some(date) = date {
        patches.push(EntryPatch::Date(date));
    }
    if let Some(category) = category {
        patches.push(EntryPatch::Category(category));
    }
    if let Some(amount) = amount {
        patches.push(EntryPatch::Gross(amount));
    }
    if let Some(tax) = tax {
        patches.push(EntryPatch::Tax(tax));
    }
    if let Some(vendor) = vendor {
        patches.push(EntryPatch::Vendor(Some(vendor)));
    }
    if let Some(notes) = notes {
        patches.push(EntryPatch::Notes(notes));
    }
    if patches.is_empty() {
        return Err(crate::error::AuditError::Invalid(
            "nothing to change; pass at least one field option".to_string(),
        ));
    }

    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    match kind {
        EntryKind::Income => {
            for patch in patches {
                ledger::update_entry(&mut data.income, id, patch)?;
            }
            ctx.store.save_income(&company_id, &data.income);
        }
        EntryKind::Expense => {
            for patch in patches {
                ledger::update_entry(&mut data.expenses, id, patch)?;
            }
            ctx.store.save_expenses(&company_id, &data.expenses);
        }
    }
    println!("Updated {kind} entry {id}");
    Ok(())
}

pub fn remove(kind: EntryKind, id: &str) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    match kind {
        EntryKind::Income => {
            ledger::remove_entry(&mut data.income, id)?;
            ctx.store.save_income(&company_id, &data.income);
        }
        EntryKind::Expense => {
            ledger::remove_entry(&mut data.expenses, id)?;
            ctx.store.save_expenses(&company_id, &data.expenses);
        }
    }
    println!("Removed {kind} entry {id}");
    Ok(())
}

pub fn split(
    kind: EntryKind,
    id: Option<String>,
    total: f64,
    tax: f64,
    date: &str,
    raw_parts: &[String],
) -> Result<()> {
    let parts = raw_parts
        .iter()
        .map(|raw| parse_part(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    let ids = match kind {
        EntryKind::Income => {
            let ids = ledger::split_entry(&mut data.income, id.as_deref(), total, tax, date, &parts)?;
            ctx.store.save_income(&company_id, &data.income);
            ids
        }
        EntryKind::Expense => {
            let ids =
                ledger::split_entry(&mut data.expenses, id.as_deref(), total, tax, date, &parts)?;
            ctx.store.save_expenses(&company_id, &data.expenses);
            ids
        }
    };
    println!("Split into {} {kind} entries", ids.len());
    Ok(())
}
