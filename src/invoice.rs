use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub amount: f64,
}

/// Standalone billing document; completely independent of the ledger.
/// Derived amounts are stored alongside the inputs and recomputed after
/// every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_address: String,
    #[serde(default)]
    pub business_email: String,
    #[serde(default)]
    pub business_phone: String,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone)]
pub enum ItemPatch {
    Description(String),
    Quantity(f64),
    Rate(f64),
}

impl Invoice {
    /// Re-derives every item amount and the subtotal/tax/total trio.
    pub fn recompute(&mut self) {
        for item in &mut self.items {
            item.amount = item.quantity * item.rate;
        }
        self.subtotal = self.items.iter().map(|i| i.amount).sum();
        self.tax_amount = self.subtotal * self.tax_rate / 100.0;
        self.total = self.subtotal + self.tax_amount;
    }

    pub fn add_item(&mut self) -> &InvoiceItem {
        let id = crate::ledger::new_entry_id();
        self.items.push(InvoiceItem {
            id,
            description: String::new(),
            quantity: 1.0,
            rate: 0.0,
            amount: 0.0,
        });
        self.recompute();
        self.items.last().unwrap()
    }

    pub fn update_item(&mut self, id: &str, patch: ItemPatch) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AuditError::Invalid(format!("no invoice item with id {id}")))?;
        match patch {
            ItemPatch::Description(description) => item.description = description,
            ItemPatch::Quantity(quantity) => item.quantity = quantity,
            ItemPatch::Rate(rate) => item.rate = rate,
        }
        self.recompute();
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<()> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AuditError::Invalid(format!("no invoice item with id {id}")))?;
        self.items.remove(pos);
        self.recompute();
        Ok(())
    }

    pub fn set_tax_rate(&mut self, tax_rate: f64) {
        self.tax_rate = tax_rate;
        self.recompute();
    }
}
