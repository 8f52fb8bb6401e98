use crate::error::{AuditError, Result};
use crate::models::{
    AppSettings, EntryKind, ExpenseEntry, IncomeEntry, LedgerEntry, ReconciliationStatus,
};

pub const BALANCE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Dates and balances are editable; no entry may be toggled.
    Setup,
    Active,
}

/// A bounded-period reconciliation workflow. The session itself is never
/// persisted; only the per-entry reconciliation state and, on a successful
/// finish, the settings it chains into the next period.
#[derive(Debug, Clone)]
pub struct ReconcileSession {
    pub start_date: String,
    pub end_date: String,
    pub opening_balance: f64,
    pub ending_balance: f64,
    state: SessionState,
}

/// A ledger entry viewed through the reconciliation window: uniform over
/// kind, carrying the net amount and the category as description.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: String,
    pub kind: EntryKind,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub notes: String,
    pub reconciliation: Option<ReconciliationStatus>,
}

impl Transaction {
    pub fn is_reconciled(&self) -> bool {
        self.reconciliation.as_ref().is_some_and(|r| r.is_reconciled)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileSummary {
    pub opening_balance: f64,
    pub reconciled_income: f64,
    pub reconciled_expenses: f64,
    pub unreconciled_income: f64,
    pub unreconciled_expenses: f64,
    pub calculated_balance: f64,
    pub ending_balance: f64,
    pub difference: f64,
    pub is_balanced: bool,
}

/// Presentation-layer filtering; never affects the balance math.
#[derive(Debug, Clone)]
pub struct TxnFilter {
    pub show_reconciled: bool,
    pub show_unreconciled: bool,
    pub search: String,
}

impl Default for TxnFilter {
    fn default() -> Self {
        Self {
            show_reconciled: true,
            show_unreconciled: true,
            search: String::new(),
        }
    }
}

impl TxnFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        let reconciled = txn.is_reconciled();
        if reconciled && !self.show_reconciled {
            return false;
        }
        if !reconciled && !self.show_unreconciled {
            return false;
        }
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let in_description = txn.description.to_lowercase().contains(&needle);
            let in_notes = txn.notes.to_lowercase().contains(&needle);
            let in_bank_ref = txn
                .reconciliation
                .as_ref()
                .and_then(|r| r.bank_reference.as_ref())
                .is_some_and(|b| b.to_lowercase().contains(&needle));
            if !in_description && !in_notes && !in_bank_ref {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, txns: &[Transaction]) -> Vec<Transaction> {
        txns.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

/// Read-only export of a reconciliation period, independent of session
/// state.
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub start_date: String,
    pub end_date: String,
    pub summary: ReconcileSummary,
    pub unreconciled: Vec<Transaction>,
}

impl ReconcileSession {
    /// Defaults chain from the previous period: start where the last
    /// reconciliation ended, opening balance from its ending balance.
    pub fn from_settings(settings: &AppSettings, today: &str) -> Self {
        Self {
            start_date: settings
                .last_reconciliation_date
                .clone()
                .unwrap_or_else(|| settings.start_date.clone()),
            end_date: today.to_string(),
            opening_balance: settings.opening_balance.unwrap_or(0.0),
            ending_balance: 0.0,
            state: SessionState::Setup,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn start(&mut self) {
        self.state = SessionState::Active;
    }

    /// Returns to setup. Entry reconciliation statuses toggled so far are
    /// deliberately left as they are.
    pub fn cancel(&mut self) {
        self.state = SessionState::Setup;
    }

    pub fn set_period(&mut self, start_date: &str, end_date: &str) -> Result<()> {
        if self.is_active() {
            return Err(AuditError::Invalid(
                "the period cannot change while a session is active".to_string(),
            ));
        }
        self.start_date = start_date.to_string();
        self.end_date = end_date.to_string();
        Ok(())
    }

    pub fn set_balances(&mut self, opening: f64, ending: f64) -> Result<()> {
        if self.is_active() {
            return Err(AuditError::Invalid(
                "balances cannot change while a session is active".to_string(),
            ));
        }
        self.opening_balance = opening;
        self.ending_balance = ending;
        Ok(())
    }

    fn in_window(&self, date: &str) -> bool {
        // Inclusive on both ends; ISO dates order correctly as strings.
        self.start_date.as_str() <= date && date <= self.end_date.as_str()
    }

    fn window_txns<E: LedgerEntry>(&self, entries: &[E]) -> Vec<Transaction> {
        entries
            .iter()
            .filter(|e| self.in_window(e.date()))
            .map(|e| Transaction {
                id: e.id().to_string(),
                kind: E::KIND,
                date: e.date().to_string(),
                description: e.category().to_string(),
                amount: e.net(),
                notes: e.notes().to_string(),
                reconciliation: e.reconciliation().cloned(),
            })
            .collect()
    }

    /// All income and expense entries dated within the period, sorted by
    /// date.
    pub fn candidates(
        &self,
        income: &[IncomeEntry],
        expenses: &[ExpenseEntry],
    ) -> Vec<Transaction> {
        let mut txns = self.window_txns(income);
        txns.extend(self.window_txns(expenses));
        txns.sort_by(|a, b| a.date.cmp(&b.date));
        txns
    }

    pub fn summary(&self, income: &[IncomeEntry], expenses: &[ExpenseEntry]) -> ReconcileSummary {
        let mut reconciled_income = 0.0;
        let mut reconciled_expenses = 0.0;
        let mut unreconciled_income = 0.0;
        let mut unreconciled_expenses = 0.0;

        for txn in self.candidates(income, expenses) {
            match (txn.kind, txn.is_reconciled()) {
                (EntryKind::Income, true) => reconciled_income += txn.amount,
                (EntryKind::Income, false) => unreconciled_income += txn.amount,
                (EntryKind::Expense, true) => reconciled_expenses += txn.amount,
                (EntryKind::Expense, false) => unreconciled_expenses += txn.amount,
            }
        }

        let calculated_balance = self.opening_balance + reconciled_income - reconciled_expenses;
        let difference = self.ending_balance - calculated_balance;
        ReconcileSummary {
            opening_balance: self.opening_balance,
            reconciled_income,
            reconciled_expenses,
            unreconciled_income,
            unreconciled_expenses,
            calculated_balance,
            ending_balance: self.ending_balance,
            difference,
            is_balanced: difference.abs() < BALANCE_TOLERANCE,
        }
    }

    /// Flips an entry's reconciled bit. Only legal while the session is
    /// active and the entry is dated inside the period. Returns the new
    /// state.
    pub fn toggle(
        &self,
        income: &mut [IncomeEntry],
        expenses: &mut [ExpenseEntry],
        id: &str,
        kind: EntryKind,
        today: &str,
    ) -> Result<bool> {
        if !self.is_active() {
            return Err(AuditError::SessionInactive);
        }
        match kind {
            EntryKind::Income => self.toggle_in(income, id, today),
            EntryKind::Expense => self.toggle_in(expenses, id, today),
        }
    }

    fn toggle_in<E: LedgerEntry>(&self, entries: &mut [E], id: &str, today: &str) -> Result<bool> {
        let entry = entries
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| AuditError::UnknownEntry(id.to_string()))?;
        if !self.in_window(entry.date()) {
            return Err(AuditError::Invalid(format!(
                "entry {id} is outside the reconciliation period"
            )));
        }
        let status = entry.reconciliation_mut();
        status.is_reconciled = !status.is_reconciled;
        status.reconciled_date = if status.is_reconciled {
            Some(today.to_string())
        } else {
            None
        };
        Ok(status.is_reconciled)
    }

    /// Completes the period. Rejected, with no mutation at all, unless the
    /// calculated balance matches the statement. On success the settings
    /// carry the period forward and every reconciled entry in the window
    /// gets its cleared date (re-)stamped.
    pub fn finish(
        &mut self,
        settings: &mut AppSettings,
        income: &mut [IncomeEntry],
        expenses: &mut [ExpenseEntry],
        today: &str,
    ) -> Result<ReconcileSummary> {
        if !self.is_active() {
            return Err(AuditError::SessionInactive);
        }
        let summary = self.summary(income, expenses);
        if !summary.is_balanced {
            return Err(AuditError::OutOfBalance(summary.difference.abs()));
        }

        settings.last_reconciliation_date = Some(self.end_date.clone());
        settings.opening_balance = Some(self.ending_balance);
        self.stamp_cleared(income, today);
        self.stamp_cleared(expenses, today);
        self.state = SessionState::Setup;
        Ok(summary)
    }

    fn stamp_cleared<E: LedgerEntry>(&self, entries: &mut [E], today: &str) {
        for entry in entries.iter_mut() {
            if !self.in_window(entry.date()) {
                continue;
            }
            if entry.reconciliation().is_some_and(|r| r.is_reconciled) {
                entry.reconciliation_mut().cleared_date = Some(today.to_string());
            }
        }
    }

    pub fn report(&self, income: &[IncomeEntry], expenses: &[ExpenseEntry]) -> ReconcileReport {
        let unreconciled = self
            .candidates(income, expenses)
            .into_iter()
            .filter(|t| !t.is_reconciled())
            .collect();
        ReconcileReport {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            summary: self.summary(income, expenses),
            unreconciled,
        }
    }
}

/// Bank reference and notes may be edited at any time, session or not.
pub fn update_details(
    income: &mut [IncomeEntry],
    expenses: &mut [ExpenseEntry],
    id: &str,
    kind: EntryKind,
    bank_reference: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    fn apply<E: LedgerEntry>(
        entries: &mut [E],
        id: &str,
        bank_reference: Option<String>,
        notes: Option<String>,
    ) -> Result<()> {
        let entry = entries
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| AuditError::UnknownEntry(id.to_string()))?;
        let status = entry.reconciliation_mut();
        if let Some(bank_reference) = bank_reference {
            status.bank_reference = Some(bank_reference);
        }
        if let Some(notes) = notes {
            status.notes = Some(notes);
        }
        Ok(())
    }

    match kind {
        EntryKind::Income => apply(income, id, bank_reference, notes),
        EntryKind::Expense => apply(expenses, id, bank_reference, notes),
    }
}
