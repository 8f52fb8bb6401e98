use std::path::PathBuf;

use crate::error::{AuditError, Result};
use crate::invoice::Invoice;

use super::Ctx;

pub fn render(file: &str, output: Option<String>) -> Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let mut invoice: Invoice = serde_json::from_str(&raw)
        .map_err(|e| AuditError::Invalid(format!("invalid invoice file: {e}")))?;
    // Derived fields in the file are untrusted; recompute before rendering.
    invoice.recompute();

    let ctx = Ctx::open()?;
    let currency = ctx.load_data().settings.currency;
    let bytes = crate::pdf::render_invoice(&invoice, &currency)?;

    let path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let name = if invoice.invoice_number.is_empty() {
                "invoice".to_string()
            } else {
                format!("invoice-{}", invoice.invoice_number.to_lowercase())
            };
            crate::config::get_data_dir()
                .join("exports")
                .join(format!("{name}.pdf"))
        }
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}
