use rand::Rng;

use crate::error::{AuditError, Result};
use crate::models::LedgerEntry;

/// Input for a new ledger entry. `vendor` is only meaningful for expense
/// entries and is ignored by income.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub date: String,
    pub category: String,
    pub gross: f64,
    pub tax: f64,
    pub vendor: Option<String>,
    pub notes: String,
}

/// Single-field update, mirroring how entries are edited in place.
#[derive(Debug, Clone)]
pub enum EntryPatch {
    Date(String),
    Category(String),
    Gross(f64),
    Tax(f64),
    Vendor(Option<String>),
    Notes(String),
}

#[derive(Debug, Clone)]
pub struct SplitPart {
    pub category: String,
    pub amount: f64,
}

pub const SPLIT_TOLERANCE: f64 = 0.01;

pub fn new_entry_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| {
            let n = rng.gen_range(0..36u32);
            std::char::from_digit(n, 36).unwrap()
        })
        .collect();
    format!("{}{}", chrono::Local::now().timestamp_millis(), suffix)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sort_by_date<E: LedgerEntry>(entries: &mut [E]) {
    // ISO dates compare correctly as strings; stable sort keeps insertion
    // order within a day.
    entries.sort_by(|a, b| a.date().cmp(b.date()));
}

/// Validates, inserts and re-sorts. Returns the new entry's id.
pub fn add_entry<E: LedgerEntry>(entries: &mut Vec<E>, new: NewEntry) -> Result<String> {
    if new.date.trim().is_empty() {
        return Err(AuditError::Invalid("date is required".to_string()));
    }
    if new.category.trim().is_empty() {
        return Err(AuditError::Invalid("category is required".to_string()));
    }
    if !(new.gross > 0.0) {
        return Err(AuditError::Invalid("amount must be greater than zero".to_string()));
    }

    let id = new_entry_id();
    let mut entry = E::new(id.clone(), new.date, new.category, new.gross, new.tax);
    entry.set_vendor(new.vendor);
    entry.set_notes(new.notes);
    entries.push(entry);
    sort_by_date(entries);
    Ok(id)
}

/// Applies one field change; amount changes recompute the net from the
/// entry's post-update gross and tax, and date changes re-position the
/// entry in the list.
pub fn update_entry<E: LedgerEntry>(entries: &mut [E], id: &str, patch: EntryPatch) -> Result<()> {
    let entry = entries
        .iter_mut()
        .find(|e| e.id() == id)
        .ok_or_else(|| AuditError::UnknownEntry(id.to_string()))?;

    match patch {
        EntryPatch::Date(date) => entry.set_date(date),
        EntryPatch::Category(category) => entry.set_category(category),
        EntryPatch::Gross(gross) => {
            entry.set_gross(gross);
            entry.recompute_net();
        }
        EntryPatch::Tax(tax) => {
            entry.set_tax(tax);
            entry.recompute_net();
        }
        EntryPatch::Vendor(vendor) => entry.set_vendor(vendor),
        EntryPatch::Notes(notes) => entry.set_notes(notes),
    }
    sort_by_date(entries);
    Ok(())
}

pub fn remove_entry<E: LedgerEntry>(entries: &mut Vec<E>, id: &str) -> Result<()> {
    let pos = entries
        .iter()
        .position(|e| e.id() == id)
        .ok_or_else(|| AuditError::UnknownEntry(id.to_string()))?;
    entries.remove(pos);
    Ok(())
}

/// Replaces one entry (or none, for a fresh multi-category entry) with one
/// entry per part. The tax is apportioned proportionally to each part's
/// share of the total, rounded to cents, with the final part absorbing the
/// rounding remainder so the parts still sum exactly to the original tax.
pub fn split_entry<E: LedgerEntry>(
    entries: &mut Vec<E>,
    source_id: Option<&str>,
    total: f64,
    tax: f64,
    date: &str,
    parts: &[SplitPart],
) -> Result<Vec<String>> {
    if date.trim().is_empty() {
        return Err(AuditError::Invalid("date is required".to_string()));
    }
    let sum: f64 = parts.iter().map(|p| p.amount).sum();
    if !(sum > 0.0) {
        return Err(AuditError::Invalid(
            "split amounts must sum to a positive total".to_string(),
        ));
    }
    if (sum - total).abs() >= SPLIT_TOLERANCE {
        return Err(AuditError::Invalid(format!(
            "split amounts sum to {sum:.2}, expected {total:.2}"
        )));
    }
    if let Some(id) = source_id {
        remove_entry(entries, id)?;
    }

    let mut ids = Vec::with_capacity(parts.len());
    let mut allocated = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let share = if i + 1 == parts.len() {
            round_cents(tax - allocated)
        } else {
            round_cents(tax * part.amount / total)
        };
        allocated += share;

        let id = new_entry_id();
        let entry = E::new(
            id.clone(),
            date.to_string(),
            part.category.clone(),
            part.amount,
            share,
        );
        ids.push(id);
        entries.push(entry);
    }
    sort_by_date(entries);
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseEntry, IncomeEntry, LedgerEntry};

    fn income(date: &str, gross: f64, tax: f64) -> NewEntry {
        NewEntry {
            date: date.to_string(),
            category: "Hair Services".to_string(),
            gross,
            tax,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_computes_net() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        add_entry(&mut entries, income("2025-01-17", 2800.0, 170.0)).unwrap();
        assert_eq!(entries[0].net_income, 2630.0);
    }

    #[test]
    fn test_add_requires_date_category_and_positive_amount() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        assert!(add_entry(&mut entries, income("", 100.0, 0.0)).is_err());
        let mut blank_category = income("2025-01-01", 100.0, 0.0);
        blank_category.category = "  ".to_string();
        assert!(add_entry(&mut entries, blank_category).is_err());
        assert!(add_entry(&mut entries, income("2025-01-01", 0.0, 0.0)).is_err());
        assert!(add_entry(&mut entries, income("2025-01-01", -5.0, 0.0)).is_err());
        assert!(entries.is_empty(), "rejected adds leave the list untouched");
    }

    #[test]
    fn test_add_keeps_list_sorted() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        add_entry(&mut entries, income("2025-03-01", 10.0, 0.0)).unwrap();
        add_entry(&mut entries, income("2025-01-01", 10.0, 0.0)).unwrap();
        add_entry(&mut entries, income("2025-02-01", 10.0, 0.0)).unwrap();
        let dates: Vec<&str> = entries.iter().map(|e| e.date()).collect();
        assert_eq!(dates, vec!["2025-01-01", "2025-02-01", "2025-03-01"]);
    }

    #[test]
    fn test_update_gross_recomputes_net_from_updated_values() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        let id = add_entry(&mut entries, income("2025-01-17", 2800.0, 170.0)).unwrap();
        update_entry(&mut entries, &id, EntryPatch::Gross(3000.0)).unwrap();
        assert_eq!(entries[0].net_income, 2830.0);
        update_entry(&mut entries, &id, EntryPatch::Tax(200.0)).unwrap();
        assert_eq!(entries[0].net_income, 2800.0);
    }

    #[test]
    fn test_update_date_moves_entry() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        let first = add_entry(&mut entries, income("2025-01-01", 10.0, 0.0)).unwrap();
        add_entry(&mut entries, income("2025-02-01", 20.0, 0.0)).unwrap();
        update_entry(&mut entries, &first, EntryPatch::Date("2025-03-01".to_string())).unwrap();
        assert_eq!(entries[1].id, first);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        let err = update_entry(&mut entries, "missing", EntryPatch::Gross(1.0)).unwrap_err();
        assert!(matches!(err, AuditError::UnknownEntry(_)));
    }

    #[test]
    fn test_remove_entry() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        let id = add_entry(&mut entries, income("2025-01-01", 10.0, 0.0)).unwrap();
        remove_entry(&mut entries, &id).unwrap();
        assert!(entries.is_empty());
        assert!(remove_entry(&mut entries, &id).is_err());
    }

    #[test]
    fn test_split_apportions_tax_proportionally() {
        let mut entries: Vec<ExpenseEntry> = Vec::new();
        let source = add_entry(
            &mut entries,
            NewEntry {
                date: "2025-01-06".to_string(),
                category: "Other".to_string(),
                gross: 200.0,
                tax: 10.0,
                ..Default::default()
            },
        )
        .unwrap();

        split_entry(
            &mut entries,
            Some(&source),
            200.0,
            10.0,
            "2025-01-06",
            &[
                SplitPart { category: "A".to_string(), amount: 150.0 },
                SplitPart { category: "B".to_string(), amount: 50.0 },
            ],
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        let a = entries.iter().find(|e| e.category == "A").unwrap();
        let b = entries.iter().find(|e| e.category == "B").unwrap();
        assert_eq!(a.tax, 7.5);
        assert_eq!(a.net_expense, 142.5);
        assert_eq!(b.tax, 2.5);
        assert_eq!(b.net_expense, 47.5);
    }

    #[test]
    fn test_split_conserves_gross_and_tax() {
        let mut entries: Vec<ExpenseEntry> = Vec::new();
        split_entry(
            &mut entries,
            None,
            100.0,
            10.0,
            "2025-04-01",
            &[
                SplitPart { category: "A".to_string(), amount: 33.33 },
                SplitPart { category: "B".to_string(), amount: 33.33 },
                SplitPart { category: "C".to_string(), amount: 33.34 },
            ],
        )
        .unwrap();

        let gross: f64 = entries.iter().map(|e| e.total_expense).sum();
        let tax: f64 = entries.iter().map(|e| e.tax).sum();
        assert!((gross - 100.0).abs() < SPLIT_TOLERANCE);
        assert_eq!(tax, 10.0, "last part absorbs the rounding remainder");
        assert_eq!(entries[2].tax, 3.34);
    }

    #[test]
    fn test_split_rejects_mismatched_total() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        let err = split_entry(
            &mut entries,
            None,
            200.0,
            10.0,
            "2025-01-06",
            &[SplitPart { category: "A".to_string(), amount: 150.0 }],
        )
        .unwrap_err();
        assert!(matches!(err, AuditError::Invalid(_)));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_split_rejects_empty_parts() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        assert!(split_entry(&mut entries, None, 0.0, 0.0, "2025-01-06", &[]).is_err());
    }

    #[test]
    fn test_split_removes_source_and_sorts() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        add_entry(&mut entries, income("2025-01-01", 10.0, 0.0)).unwrap();
        let source = add_entry(&mut entries, income("2025-02-10", 300.0, 0.0)).unwrap();
        add_entry(&mut entries, income("2025-03-01", 10.0, 0.0)).unwrap();

        split_entry(
            &mut entries,
            Some(&source),
            300.0,
            0.0,
            "2025-01-15",
            &[
                SplitPart { category: "A".to_string(), amount: 100.0 },
                SplitPart { category: "B".to_string(), amount: 200.0 },
            ],
        )
        .unwrap();

        assert_eq!(entries.len(), 4);
        assert!(!entries.iter().any(|e| e.id == source));
        let dates: Vec<&str> = entries.iter().map(|e| e.date()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let mut entries: Vec<IncomeEntry> = Vec::new();
        for _ in 0..50 {
            add_entry(&mut entries, income("2025-01-01", 10.0, 0.0)).unwrap();
        }
        let mut ids: Vec<&str> = entries.iter().map(|e| e.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }
}
