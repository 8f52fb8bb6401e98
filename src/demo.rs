use crate::models::{AppSettings, ExpenseEntry, IncomeEntry, Tag};
use crate::store::Store;

struct SampleEntry {
    id: &'static str,
    date: &'static str,
    category: &'static str,
    total: f64,
    tax: f64,
    net: f64,
}

const SAMPLE_STREAMS: &[&str] = &["Hair Services", "Product Sales"];

const SAMPLE_CATEGORIES: &[&str] = &[
    "Color Tubes",
    "Shear Sharpening",
    "Hair Tools",
    "Advertising",
    "IT equipment",
    "Office supplies",
    "Other",
];

const SAMPLE_VENDORS: &[&str] = &["BCS Beauty", "CosmoProf", "Sally Beauty"];

const SAMPLE_INCOME: &[SampleEntry] = &[
    SampleEntry { id: "1", date: "2025-01-17", category: "Hair Services", total: 2800.0, tax: 170.0, net: 2630.0 },
    SampleEntry { id: "2", date: "2025-01-30", category: "Product Sales", total: 3045.0, tax: 185.0, net: 2860.0 },
];

const SAMPLE_EXPENSES: &[SampleEntry] = &[
    SampleEntry { id: "1", date: "2025-01-06", category: "Color Tubes", total: 120.0, tax: 7.8, net: 112.2 },
    SampleEntry { id: "2", date: "2025-01-06", category: "Hair Tools", total: 240.0, tax: 9.1, net: 230.9 },
    SampleEntry { id: "3", date: "2025-01-06", category: "Office supplies", total: 80.0, tax: 5.2, net: 74.8 },
    SampleEntry { id: "4", date: "2025-01-07", category: "Color Tubes", total: 75.0, tax: 4.875, net: 70.13 },
    SampleEntry { id: "5", date: "2025-01-07", category: "IT equipment", total: 175.0, tax: 4.875, net: 170.13 },
    SampleEntry { id: "6", date: "2025-01-09", category: "Shear Sharpening", total: 155.0, tax: 3.575, net: 151.43 },
];

fn tags(names: &[&str]) -> Vec<Tag> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Tag {
            id: (i + 1).to_string(),
            name: name.to_string(),
            is_active: true,
        })
        .collect()
}

pub fn demo_settings() -> AppSettings {
    AppSettings {
        income_streams: tags(SAMPLE_STREAMS),
        expense_categories: tags(SAMPLE_CATEGORIES),
        vendors: tags(SAMPLE_VENDORS),
        ..Default::default()
    }
}

pub fn demo_income() -> Vec<IncomeEntry> {
    SAMPLE_INCOME
        .iter()
        .map(|s| IncomeEntry {
            id: s.id.to_string(),
            date: s.date.to_string(),
            category: s.category.to_string(),
            total_income: s.total,
            sales_tax: s.tax,
            net_income: s.net,
            notes: String::new(),
            reconciliation: None,
        })
        .collect()
}

pub fn demo_expenses() -> Vec<ExpenseEntry> {
    SAMPLE_EXPENSES
        .iter()
        .map(|s| ExpenseEntry {
            id: s.id.to_string(),
            date: s.date.to_string(),
            category: s.category.to_string(),
            vendor: None,
            total_expense: s.total,
            tax: s.tax,
            net_expense: s.net,
            notes: String::new(),
            reconciliation: None,
        })
        .collect()
}

/// Populate a freshly created demo company so the first run has something
/// to explore.
pub fn seed_demo_data(store: &mut Store, company_id: &str) {
    store.save_settings(company_id, &demo_settings());
    store.save_income(company_id, &demo_income());
    store.save_expenses(company_id, &demo_expenses());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_lists_are_date_sorted() {
        let income = demo_income();
        let expenses = demo_expenses();
        assert!(income.windows(2).all(|w| w[0].date <= w[1].date));
        assert!(expenses.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_sample_categories_reference_settings_tags() {
        let settings = demo_settings();
        let stream_names: Vec<&str> =
            settings.income_streams.iter().map(|t| t.name.as_str()).collect();
        for entry in demo_income() {
            assert!(stream_names.contains(&entry.category.as_str()));
        }
        let category_names: Vec<&str> =
            settings.expense_categories.iter().map(|t| t.name.as_str()).collect();
        for entry in demo_expenses() {
            assert!(category_names.contains(&entry.category.as_str()));
        }
    }

    #[test]
    fn test_seed_writes_all_three_documents() {
        let mut store = Store::in_memory().unwrap();
        seed_demo_data(&mut store, "demo-company");
        let data = store.load_app_data("demo-company");
        assert_eq!(data.income.len(), 2);
        assert_eq!(data.expenses.len(), 6);
        assert_eq!(data.settings.vendors.len(), 3);
    }
}
