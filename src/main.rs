mod backup;
mod cli;
mod config;
mod demo;
mod error;
mod fmt;
mod invoice;
mod ledger;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reconciler;
mod registry;
mod reports;
mod store;

use clap::Parser;

use cli::{
    BackupCommands, Cli, Commands, CompanyCommands, EntryCommands, ReconcileCommands,
    ReportCommands, SetupCommands,
};
use models::EntryKind;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Company { command } => match command {
            CompanyCommands::Add { name } => cli::company::add(&name),
            CompanyCommands::List => cli::company::list(),
            CompanyCommands::Switch { company } => cli::company::switch(&company),
            CompanyCommands::Delete { company } => cli::company::delete(&company),
        },
        Commands::Income { command } => run_entry(EntryKind::Income, command),
        Commands::Expense { command } => run_entry(EntryKind::Expense, command),
        Commands::Setup { command } => match command {
            SetupCommands::Show => cli::setup::show(),
            SetupCommands::Currency { symbol } => cli::setup::set_currency(&symbol),
            SetupCommands::StartDate { date } => cli::setup::set_start_date(&date),
            SetupCommands::Stream { command } => {
                cli::setup::tag(cli::setup::TagList::Stream, command)
            }
            SetupCommands::Category { command } => {
                cli::setup::tag(cli::setup::TagList::Category, command)
            }
            SetupCommands::Vendor { command } => {
                cli::setup::tag(cli::setup::TagList::Vendor, command)
            }
        },
        Commands::Report { command } => match command {
            ReportCommands::Summary { year } => cli::report::summary(year),
            ReportCommands::Monthly { month } => cli::report::monthly(&month),
        },
        Commands::Reconcile { command } => match command {
            ReconcileCommands::Status {
                from,
                to,
                opening,
                ending,
                unreconciled,
                search,
            } => cli::reconcile::status(from, to, opening, ending, unreconciled, search),
            ReconcileCommands::Mark {
                from,
                to,
                income,
                expense,
            } => cli::reconcile::mark(from, to, &income, &expense),
            ReconcileCommands::Finish {
                from,
                to,
                opening,
                ending,
            } => cli::reconcile::finish(from, to, opening, ending),
            ReconcileCommands::Note {
                kind,
                id,
                bank_ref,
                notes,
            } => cli::reconcile::note(&kind, &id, bank_ref, notes),
            #[cfg(feature = "pdf")]
            ReconcileCommands::Report {
                from,
                to,
                opening,
                ending,
                output,
            } => cli::reconcile::report(from, to, opening, ending, output),
        },
        Commands::Backup { command } => match command {
            BackupCommands::Export { output } => cli::backup::export(output),
            BackupCommands::Import {
                file,
                as_new,
                overwrite,
            } => cli::backup::import(&file, as_new, overwrite),
        },
        #[cfg(feature = "pdf")]
        Commands::Invoice { file, output } => cli::invoice::render(&file, output),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_entry(kind: EntryKind, command: EntryCommands) -> error::Result<()> {
    match command {
        EntryCommands::Add {
            date,
            category,
            amount,
            tax,
            vendor,
            notes,
        } => cli::entry::add(kind, &date, &category, amount, tax, vendor, &notes),
        EntryCommands::List { month } => cli::entry::list(kind, month),
        EntryCommands::Edit {
            id,
            date,
            category,
            amount,
            tax,
            vendor,
            notes,
        } => cli::entry::edit(kind, &id, date, category, amount, tax, vendor, notes),
        EntryCommands::Remove { id } => cli::entry::remove(kind, &id),
        EntryCommands::Split {
            id,
            total,
            tax,
            date,
            parts,
        } => cli::entry::split(kind, id, total, tax, &date, &parts),
    }
}
