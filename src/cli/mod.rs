pub mod backup;
pub mod company;
pub mod entry;
pub mod init;
#[cfg(feature = "pdf")]
pub mod invoice;
pub mod reconcile;
pub mod report;
pub mod setup;
pub mod status;

use clap::{Parser, Subcommand};

use crate::config;
use crate::error::{AuditError, Result};
use crate::models::AppData;
use crate::registry::CompanyRegistry;
use crate::store::Store;

/// Shared per-invocation context: the opened store plus the bootstrapped
/// registry. Handlers resolve the active company id once and pass it into
/// every data access explicitly.
pub(crate) struct Ctx {
    pub store: Store,
    pub registry: CompanyRegistry,
}

impl Ctx {
    pub fn open() -> Result<Ctx> {
        let path = config::store_path();
        if !path.exists() {
            return Err(AuditError::Config(
                "no data directory set up yet; run `auditthis init` first".to_string(),
            ));
        }
        let mut store = Store::open(&path)?;
        let registry = CompanyRegistry::bootstrap(&mut store);
        Ok(Ctx { store, registry })
    }

    pub fn company_id(&self) -> String {
        self.registry.active().id.clone()
    }

    pub fn load_data(&self) -> AppData {
        self.store.load_app_data(&self.registry.active().id)
    }
}

pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// `YYYY-MM` into (year, 0-based month).
pub(crate) fn parse_month(month: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = month.split('-').collect();
    if parts.len() == 2 {
        if let (Ok(year), Ok(m)) = (parts[0].parse::<i32>(), parts[1].parse::<u32>()) {
            if (1..=12).contains(&m) {
                return Ok((year, m - 1));
            }
        }
    }
    Err(AuditError::Invalid(format!(
        "invalid month: {month} (expected YYYY-MM)"
    )))
}

#[derive(Parser)]
#[command(
    name = "auditthis",
    about = "Small-business bookkeeping with company workspaces and bank reconciliation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up auditthis: choose a data directory and bootstrap the books.
    Init {
        /// Path for auditthis data (default: ~/Documents/auditthis)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage companies (each company is an isolated set of books).
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },
    /// Record and manage income entries.
    Income {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Record and manage expense entries.
    Expense {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Per-company settings: currency, start date, tag lists.
    Setup {
        #[command(subcommand)]
        command: SetupCommands,
    },
    /// Overview reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Reconcile the books against a bank statement period.
    Reconcile {
        #[command(subcommand)]
        command: ReconcileCommands,
    },
    /// Export and restore backup files.
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Render an invoice JSON file to PDF.
    #[cfg(feature = "pdf")]
    Invoice {
        /// Path to an invoice JSON file
        file: String,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the data directory, active company and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum CompanyCommands {
    /// Create a company and make it active.
    Add {
        /// Company name, e.g. 'Salon Nine'
        name: String,
    },
    /// List all companies.
    List,
    /// Make another company active.
    Switch {
        /// Company id or name
        company: String,
    },
    /// Delete a company and all of its data. Irreversible.
    Delete {
        /// Company id or name
        company: String,
    },
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Add an entry.
    Add {
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Category name (an income stream or expense category)
        #[arg(long)]
        category: String,
        /// Gross amount
        #[arg(long)]
        amount: f64,
        /// Tax portion of the gross amount
        #[arg(long, default_value = "0")]
        tax: f64,
        /// Vendor name (expenses only)
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List entries.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Edit one field of an entry.
    Edit {
        /// Entry id (shown in `list`)
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        tax: Option<f64>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove an entry.
    Remove {
        /// Entry id
        id: String,
    },
    /// Split an amount across categories, or split an existing entry.
    Split {
        /// Entry to replace (omit to record a fresh multi-category amount)
        #[arg(long)]
        id: Option<String>,
        /// Total gross amount being split
        #[arg(long)]
        total: f64,
        /// Total tax, apportioned proportionally across the parts
        #[arg(long, default_value = "0")]
        tax: f64,
        /// Date for all resulting entries: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Part as 'Category=amount'; repeat for each part
        #[arg(long = "part")]
        parts: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum SetupCommands {
    /// Show the active company's settings.
    Show,
    /// Set the currency symbol.
    Currency { symbol: String },
    /// Set the bookkeeping start date: YYYY-MM-DD.
    StartDate { date: String },
    /// Manage income streams.
    Stream {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Manage expense categories.
    Category {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Manage vendors.
    Vendor {
        #[command(subcommand)]
        command: TagCommands,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Add a new item.
    Add { name: String },
    /// Deactivate an item. Past entries keep the name they recorded.
    Disable { id: String },
    /// List items.
    List,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Annual overview with monthly income, expenses and profit.
    Summary {
        /// Year: YYYY (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Category breakdown for one month.
    Monthly {
        /// Month: YYYY-MM
        #[arg(long)]
        month: String,
    },
}

#[derive(Subcommand)]
pub enum ReconcileCommands {
    /// Show the reconciliation state for a statement period.
    Status {
        /// Period start: YYYY-MM-DD (default: last reconciliation date)
        #[arg(long = "from")]
        from: Option<String>,
        /// Period end: YYYY-MM-DD (default: today)
        #[arg(long = "to")]
        to: Option<String>,
        /// Opening balance (default: carried from the last reconciliation)
        #[arg(long)]
        opening: Option<f64>,
        /// Statement ending balance
        #[arg(long)]
        ending: Option<f64>,
        /// Show only unreconciled transactions
        #[arg(long)]
        unreconciled: bool,
        /// Case-insensitive search over description, notes and bank reference
        #[arg(long)]
        search: Option<String>,
    },
    /// Toggle entries as reconciled against the statement.
    Mark {
        #[arg(long = "from")]
        from: Option<String>,
        #[arg(long = "to")]
        to: Option<String>,
        /// Income entry id; repeatable
        #[arg(long)]
        income: Vec<String>,
        /// Expense entry id; repeatable
        #[arg(long)]
        expense: Vec<String>,
    },
    /// Finish the period. Requires a zero difference.
    Finish {
        #[arg(long = "from")]
        from: Option<String>,
        #[arg(long = "to")]
        to: Option<String>,
        #[arg(long)]
        opening: Option<f64>,
        /// Statement ending balance
        #[arg(long)]
        ending: f64,
    },
    /// Attach a bank reference or note to an entry.
    Note {
        /// Entry kind: income or expense
        #[arg(long)]
        kind: String,
        /// Entry id
        id: String,
        #[arg(long = "bank-ref")]
        bank_ref: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Export a reconciliation report PDF for a period.
    #[cfg(feature = "pdf")]
    Report {
        #[arg(long = "from")]
        from: Option<String>,
        #[arg(long = "to")]
        to: Option<String>,
        #[arg(long)]
        opening: Option<f64>,
        #[arg(long)]
        ending: Option<f64>,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write the active company's data to a backup file.
    Export {
        /// Output path (default: <data_dir>/backups/<company>-backup-<date>.dawg)
        #[arg(long)]
        output: Option<String>,
    },
    /// Restore a backup file.
    Import {
        /// Path to a .dawg or .json backup file
        file: String,
        /// Create a new company seeded with the backup's data
        #[arg(long = "as-new")]
        as_new: bool,
        /// Overwrite the active company's data in place
        #[arg(long)]
        overwrite: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-01").unwrap(), (2025, 0));
        assert_eq!(parse_month("2024-12").unwrap(), (2024, 11));
        assert!(parse_month("2025").is_err());
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("not-a-month").is_err());
    }
}
