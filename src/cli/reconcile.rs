use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::models::{AppSettings, EntryKind};
use crate::reconciler::{ReconcileSession, ReconcileSummary, Transaction, TxnFilter};

use super::{today, Ctx};

/// One transient session per invocation: defaults chained from settings,
/// then the caller's period and balance overrides, then started.
fn build_session(
    settings: &AppSettings,
    from: Option<&str>,
    to: Option<&str>,
    opening: Option<f64>,
    ending: Option<f64>,
) -> Result<ReconcileSession> {
    let mut session = ReconcileSession::from_settings(settings, &today());
    let start = from.unwrap_or(&session.start_date).to_string();
    let end = to.unwrap_or(&session.end_date).to_string();
    session.set_period(&start, &end)?;
    session.set_balances(
        opening.unwrap_or(session.opening_balance),
        ending.unwrap_or(session.ending_balance),
    )?;
    session.start();
    Ok(session)
}

fn print_summary(summary: &ReconcileSummary, currency: &str) {
    println!("Opening balance:       {}", money(summary.opening_balance, currency));
    println!("Reconciled income:     {}", money(summary.reconciled_income, currency).green());
    println!("Reconciled expenses:   {}", money(summary.reconciled_expenses, currency).red());
    println!("Unreconciled income:   {}", money(summary.unreconciled_income, currency));
    println!("Unreconciled expenses: {}", money(summary.unreconciled_expenses, currency));
    println!("Calculated balance:    {}", money(summary.calculated_balance, currency));
    println!("Statement balance:     {}", money(summary.ending_balance, currency));
    let difference = money(summary.difference, currency);
    if summary.is_balanced {
        println!("Difference:            {} {}", difference.green(), "Balanced".green().bold());
    } else {
        println!(
            "Difference:            {} {}",
            difference.red(),
            "Out of balance".red().bold()
        );
    }
}

fn print_transactions(txns: &[Transaction], currency: &str) {
    let mut table = Table::new();
    table.set_header(vec!["Rec", "Date", "Type", "ID", "Description", "Amount", "Bank Ref"]);
    for txn in txns {
        let bank_ref = txn
            .reconciliation
            .as_ref()
            .and_then(|r| r.bank_reference.clone())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(if txn.is_reconciled() { "x" } else { "" }),
            Cell::new(&txn.date),
            Cell::new(txn.kind.label()),
            Cell::new(&txn.id),
            Cell::new(&txn.description),
            Cell::new(money(txn.amount, currency)),
            Cell::new(bank_ref),
        ]);
    }
    println!("{table}");
}

pub fn status(
    from: Option<String>,
    to: Option<String>,
    opening: Option<f64>,
    ending: Option<f64>,
    unreconciled_only: bool,
    search: Option<String>,
) -> Result<()> {
    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let session = build_session(
        &data.settings,
        from.as_deref(),
        to.as_deref(),
        opening,
        ending,
    )?;

    println!(
        "Reconciliation {} to {}\n",
        session.start_date, session.end_date
    );
    print_summary(&session.summary(&data.income, &data.expenses), &data.settings.currency);
    println!();

    let filter = TxnFilter {
        show_reconciled: !unreconciled_only,
        show_unreconciled: true,
        search: search.unwrap_or_default(),
    };
    let txns = filter.apply(&session.candidates(&data.income, &data.expenses));
    if txns.is_empty() {
        println!("No transactions in this period.");
    } else {
        print_transactions(&txns, &data.settings.currency);
    }
    Ok(())
}

pub fn mark(
    from: Option<String>,
    to: Option<String>,
    income_ids: &[String],
    expense_ids: &[String],
) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    let session = build_session(&data.settings, from.as_deref(), to.as_deref(), None, None)?;

    let stamp = today();
    for id in income_ids {
        let on = session.toggle(&mut data.income, &mut data.expenses, id, EntryKind::Income, &stamp)?;
        println!("{} income {id}", if on { "Marked" } else { "Unmarked" });
    }
    for id in expense_ids {
        let on = session.toggle(&mut data.income, &mut data.expenses, id, EntryKind::Expense, &stamp)?;
        println!("{} expense {id}", if on { "Marked" } else { "Unmarked" });
    }

    ctx.store.save_income(&company_id, &data.income);
    ctx.store.save_expenses(&company_id, &data.expenses);
    println!();
    print_summary(&session.summary(&data.income, &data.expenses), &data.settings.currency);
    Ok(())
}

pub fn finish(
    from: Option<String>,
    to: Option<String>,
    opening: Option<f64>,
    ending: f64,
) -> Result<()> {
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    let mut session = build_session(
        &data.settings,
        from.as_deref(),
        to.as_deref(),
        opening,
        Some(ending),
    )?;

    let summary = session.finish(&mut data.settings, &mut data.income, &mut data.expenses, &today())?;
    ctx.store.save_settings(&company_id, &data.settings);
    ctx.store.save_income(&company_id, &data.income);
    ctx.store.save_expenses(&company_id, &data.expenses);

    println!(
        "{} Period {} to {} reconciled.",
        "Done.".green().bold(),
        session.start_date,
        session.end_date
    );
    println!(
        "Next period opens at {}",
        money(summary.ending_balance, &data.settings.currency)
    );
    Ok(())
}

pub fn note(
    kind: &str,
    id: &str,
    bank_ref: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let kind: EntryKind = kind.parse()?;
    let mut ctx = Ctx::open()?;
    let company_id = ctx.company_id();
    let mut data = ctx.load_data();
    crate::reconciler::update_details(&mut data.income, &mut data.expenses, id, kind, bank_ref, notes)?;
    match kind {
        EntryKind::Income => ctx.store.save_income(&company_id, &data.income),
        EntryKind::Expense => ctx.store.save_expenses(&company_id, &data.expenses),
    }
    println!("Updated {kind} entry {id}");
    Ok(())
}

#[cfg(feature = "pdf")]
pub fn report(
    from: Option<String>,
    to: Option<String>,
    opening: Option<f64>,
    ending: Option<f64>,
    output: Option<String>,
) -> Result<()> {
    use std::path::PathBuf;

    let ctx = Ctx::open()?;
    let data = ctx.load_data();
    let session = build_session(
        &data.settings,
        from.as_deref(),
        to.as_deref(),
        opening,
        ending,
    )?;

    let report = session.report(&data.income, &data.expenses);
    let bytes = crate::pdf::render_reconciliation(
        &report,
        &ctx.registry.active().name,
        &data.settings.currency,
    )?;

    let path = match output {
        Some(p) => PathBuf::from(p),
        None => crate::config::get_data_dir().join("exports").join(format!(
            "reconciliation-{}-to-{}.pdf",
            report.start_date, report.end_date
        )),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}
