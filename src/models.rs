use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// An isolated workspace of financial data representing one business entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub is_active: bool,
}

/// Named, soft-activatable list item backing income streams, expense
/// categories and vendors. Ledger entries store the tag *name*, not the id,
/// so disabling a tag never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciliation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<f64>,
    #[serde(default)]
    pub income_streams: Vec<Tag>,
    #[serde(default)]
    pub expense_categories: Vec<Tag>,
    #[serde(default)]
    pub vendors: Vec<Tag>,
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_start_date() -> String {
    "2025-01-01".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            start_date: default_start_date(),
            last_reconciliation_date: None,
            opening_balance: None,
            income_streams: Vec::new(),
            expense_categories: Vec::new(),
            vendors: Vec::new(),
        }
    }
}

fn add_tag<'a>(list: &'a mut Vec<Tag>, name: &str) -> Result<&'a Tag> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuditError::Invalid("name must not be empty".to_string()));
    }
    let tag = Tag {
        id: next_tag_id(list),
        name: name.to_string(),
        is_active: true,
    };
    list.push(tag);
    Ok(list.last().unwrap())
}

fn next_tag_id(list: &[Tag]) -> String {
    let max = list
        .iter()
        .filter_map(|t| t.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

fn disable_tag(list: &mut [Tag], id: &str) -> Result<()> {
    match list.iter_mut().find(|t| t.id == id) {
        Some(tag) => {
            tag.is_active = false;
            Ok(())
        }
        None => Err(AuditError::Invalid(format!("no such item: {id}"))),
    }
}

impl AppSettings {
    pub fn add_income_stream(&mut self, name: &str) -> Result<&Tag> {
        add_tag(&mut self.income_streams, name)
    }

    pub fn add_expense_category(&mut self, name: &str) -> Result<&Tag> {
        add_tag(&mut self.expense_categories, name)
    }

    pub fn add_vendor(&mut self, name: &str) -> Result<&Tag> {
        add_tag(&mut self.vendors, name)
    }

    pub fn disable_income_stream(&mut self, id: &str) -> Result<()> {
        disable_tag(&mut self.income_streams, id)
    }

    pub fn disable_expense_category(&mut self, id: &str) -> Result<()> {
        disable_tag(&mut self.expense_categories, id)
    }

    pub fn disable_vendor(&mut self, id: &str) -> Result<()> {
        disable_tag(&mut self.vendors, id)
    }
}

/// Per-entry reconciliation state. `reconciled_date` tracks the checkbox;
/// `cleared_date` is stamped only when a reconciliation period finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationStatus {
    #[serde(default)]
    pub is_reconciled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEntry {
    pub id: String,
    pub date: String,
    pub category: String,
    pub total_income: f64,
    pub sales_tax: f64,
    pub net_income: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntry {
    pub id: String,
    pub date: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub total_expense: f64,
    pub tax: f64,
    pub net_expense: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(AuditError::Invalid(format!(
                "unknown entry kind: {other} (expected income or expense)"
            ))),
        }
    }
}

/// Uniform `{gross, tax, net}` view over income and expense entries. The
/// two wire types keep their distinct field names for storage and backup
/// compatibility; all CRUD, split and reconciliation logic goes through
/// this trait instead of being written twice.
pub trait LedgerEntry: Clone {
    const KIND: EntryKind;

    fn new(id: String, date: String, category: String, gross: f64, tax: f64) -> Self;
    fn id(&self) -> &str;
    fn date(&self) -> &str;
    fn set_date(&mut self, date: String);
    fn category(&self) -> &str;
    fn set_category(&mut self, category: String);
    fn gross(&self) -> f64;
    fn set_gross(&mut self, gross: f64);
    fn tax(&self) -> f64;
    fn set_tax(&mut self, tax: f64);
    fn net(&self) -> f64;
    fn recompute_net(&mut self);
    fn notes(&self) -> &str;
    fn set_notes(&mut self, notes: String);
    fn vendor(&self) -> Option<&str> {
        None
    }
    fn set_vendor(&mut self, _vendor: Option<String>) {}
    fn reconciliation(&self) -> Option<&ReconciliationStatus>;
    /// Returns the reconciliation block, creating an empty one if absent.
    fn reconciliation_mut(&mut self) -> &mut ReconciliationStatus;
}

impl LedgerEntry for IncomeEntry {
    const KIND: EntryKind = EntryKind::Income;

    fn new(id: String, date: String, category: String, gross: f64, tax: f64) -> Self {
        Self {
            id,
            date,
            category,
            total_income: gross,
            sales_tax: tax,
            net_income: gross - tax,
            notes: String::new(),
            reconciliation: None,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn set_date(&mut self, date: String) {
        self.date = date;
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn set_category(&mut self, category: String) {
        self.category = category;
    }

    fn gross(&self) -> f64 {
        self.total_income
    }

    fn set_gross(&mut self, gross: f64) {
        self.total_income = gross;
    }

    fn tax(&self) -> f64 {
        self.sales_tax
    }

    fn set_tax(&mut self, tax: f64) {
        self.sales_tax = tax;
    }

    fn net(&self) -> f64 {
        self.net_income
    }

    fn recompute_net(&mut self) {
        self.net_income = self.total_income - self.sales_tax;
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    fn reconciliation(&self) -> Option<&ReconciliationStatus> {
        self.reconciliation.as_ref()
    }

    fn reconciliation_mut(&mut self) -> &mut ReconciliationStatus {
        self.reconciliation.get_or_insert_with(Default::default)
    }
}

impl LedgerEntry for ExpenseEntry {
    const KIND: EntryKind = EntryKind::Expense;

    fn new(id: String, date: String, category: String, gross: f64, tax: f64) -> Self {
        Self {
            id,
            date,
            category,
            vendor: None,
            total_expense: gross,
            tax,
            net_expense: gross - tax,
            notes: String::new(),
            reconciliation: None,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn set_date(&mut self, date: String) {
        self.date = date;
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn set_category(&mut self, category: String) {
        self.category = category;
    }

    fn gross(&self) -> f64 {
        self.total_expense
    }

    fn set_gross(&mut self, gross: f64) {
        self.total_expense = gross;
    }

    fn tax(&self) -> f64 {
        self.tax
    }

    fn set_tax(&mut self, tax: f64) {
        self.tax = tax;
    }

    fn net(&self) -> f64 {
        self.net_expense
    }

    fn recompute_net(&mut self) {
        self.net_expense = self.total_expense - self.tax;
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    fn set_vendor(&mut self, vendor: Option<String>) {
        self.vendor = vendor;
    }

    fn reconciliation(&self) -> Option<&ReconciliationStatus> {
        self.reconciliation.as_ref()
    }

    fn reconciliation_mut(&mut self) -> &mut ReconciliationStatus {
        self.reconciliation.get_or_insert_with(Default::default)
    }
}

/// The full data set of one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub settings: AppSettings,
    pub income: Vec<IncomeEntry>,
    pub expenses: Vec<ExpenseEntry>,
}
