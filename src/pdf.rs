use std::io::BufWriter;

use printpdf::*;

use crate::error::{AuditError, Result};
use crate::fmt::money;
use crate::invoice::Invoice;
use crate::models::EntryKind;
use crate::reconciler::ReconcileReport;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 25.0;
const MARGIN_BOTTOM: f32 = 25.0;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_RIGHT: f32 = 20.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AuditError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AuditError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn centered_text(&self, s: &str, size: f32, bold: bool) {
        let x = (PAGE_W - approx_text_width(s, size)) / 2.0;
        self.text(s, x, size, bold);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn title_block(&mut self, title: &str, lines: &[&str]) {
        self.centered_text(title, TITLE_SIZE, true);
        self.y += 10.0;
        for line in lines {
            self.centered_text(line, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        self.y += 5.0;
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H * 2.0);
        self.text(label, MARGIN_LEFT, 13.0, true);
        self.y += ROW_H + 2.0;
    }

    fn label_value(&mut self, label: &str, value: &str, bold: bool) {
        self.ensure_space(ROW_H);
        self.text(&format!("{label}:"), MARGIN_LEFT + 5.0, FONT_SIZE, false);
        self.text(value, MARGIN_LEFT + 85.0, FONT_SIZE, bold);
        self.y += ROW_H;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => self.text(headers[i], x, FONT_SIZE, true),
                    Align::Right => {
                        let tw = approx_text_width(headers[i], FONT_SIZE);
                        self.text(headers[i], x + col.width - tw, FONT_SIZE, true);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H * 0.8;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 3.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < values.len() {
                match col.align {
                    Align::Left => self.text(values[i], x, FONT_SIZE, bold),
                    Align::Right => {
                        let tw = approx_text_width(values[i], FONT_SIZE);
                        self.text(values[i], x + col.width - tw, FONT_SIZE, bold);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 3.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| AuditError::Pdf(format!("{e:?}")))?;
        Ok(buf.into_inner().map_err(|e| AuditError::Pdf(e.to_string()))?)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

pub fn render_reconciliation(
    report: &ReconcileReport,
    company: &str,
    currency: &str,
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Bank Reconciliation Report")?;
    let generated = chrono::Local::now().format("Generated %Y-%m-%d").to_string();
    let period = format!("Period: {} to {}", report.start_date, report.end_date);
    let mut lines = vec![period.as_str(), generated.as_str()];
    if !company.is_empty() {
        lines.insert(0, company);
    }
    pdf.title_block("Bank Reconciliation Report", &lines);

    pdf.section_label("Reconciliation Summary");
    let s = &report.summary;
    pdf.label_value("Opening Balance", &money(s.opening_balance, currency), false);
    pdf.label_value("Reconciled Income", &money(s.reconciled_income, currency), false);
    pdf.label_value("Reconciled Expenses", &money(s.reconciled_expenses, currency), false);
    pdf.label_value("Calculated Balance", &money(s.calculated_balance, currency), false);
    pdf.label_value(
        "Statement Ending Balance",
        &money(s.ending_balance, currency),
        false,
    );
    pdf.label_value("Difference", &money(s.difference, currency), true);
    pdf.blank_row();

    if !report.unreconciled.is_empty() {
        pdf.section_label("Unreconciled Transactions");
        let cols = &[
            Col { width: 28.0, align: Align::Left },
            Col { width: 18.0, align: Align::Left },
            Col { width: 62.0, align: Align::Left },
            Col { width: 32.0, align: Align::Right },
            Col { width: 30.0, align: Align::Left },
        ];
        pdf.table_header(cols, &["Date", "Type", "Description", "Amount", "Notes"]);
        for txn in &report.unreconciled {
            let kind = match txn.kind {
                EntryKind::Income => "Inc",
                EntryKind::Expense => "Exp",
            };
            let amount = money(txn.amount, currency);
            let description = truncate(&txn.description, 30);
            let notes = truncate(&txn.notes, 16);
            pdf.table_row(cols, &[&txn.date, kind, &description, &amount, &notes], false);
        }
    }

    pdf.to_bytes()
}

pub fn render_invoice(invoice: &Invoice, currency: &str) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Invoice")?;
    let number = format!("Invoice #{}", invoice.invoice_number);
    let dates = format!("Date: {}    Due: {}", invoice.date, invoice.due_date);
    pdf.title_block("INVOICE", &[number.as_str(), dates.as_str()]);

    if !invoice.business_name.is_empty() {
        pdf.section_label("From");
        for line in [
            invoice.business_name.as_str(),
            invoice.business_address.as_str(),
            invoice.business_email.as_str(),
            invoice.business_phone.as_str(),
        ] {
            if !line.is_empty() {
                pdf.text(line, MARGIN_LEFT + 5.0, FONT_SIZE, false);
                pdf.y += 5.0;
            }
        }
        pdf.blank_row();
    }

    if !invoice.client_name.is_empty() {
        pdf.section_label("Bill To");
        for line in [
            invoice.client_name.as_str(),
            invoice.client_address.as_str(),
            invoice.client_email.as_str(),
        ] {
            if !line.is_empty() {
                pdf.text(line, MARGIN_LEFT + 5.0, FONT_SIZE, false);
                pdf.y += 5.0;
            }
        }
        pdf.blank_row();
    }

    let cols = &[
        Col { width: 90.0, align: Align::Left },
        Col { width: 20.0, align: Align::Right },
        Col { width: 30.0, align: Align::Right },
        Col { width: 30.0, align: Align::Right },
    ];
    pdf.table_header(cols, &["Description", "Qty", "Rate", "Amount"]);
    for item in &invoice.items {
        let qty = format!("{}", item.quantity);
        let rate = money(item.rate, currency);
        let amount = money(item.amount, currency);
        let description = truncate(&item.description, 48);
        pdf.table_row(cols, &[&description, &qty, &rate, &amount], false);
    }
    pdf.separator();

    let subtotal = money(invoice.subtotal, currency);
    pdf.table_row(cols, &["", "", "Subtotal", &subtotal], false);
    if invoice.tax_rate > 0.0 {
        let tax_label = format!("Tax ({}%)", invoice.tax_rate);
        let tax = money(invoice.tax_amount, currency);
        pdf.table_row(cols, &["", "", &tax_label, &tax], false);
    }
    let total = money(invoice.total, currency);
    pdf.table_row(cols, &["", "", "Total", &total], true);

    if !invoice.notes.is_empty() {
        pdf.blank_row();
        pdf.section_label("Notes");
        pdf.text(&invoice.notes, MARGIN_LEFT + 5.0, FONT_SIZE, false);
        pdf.y += ROW_H;
    }

    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppSettings;
    use crate::reconciler::ReconcileSession;

    #[test]
    fn test_render_reconciliation_produces_pdf_bytes() {
        let mut session = ReconcileSession::from_settings(&AppSettings::default(), "2025-02-01");
        session.set_balances(1000.0, 1300.0).unwrap();
        let report = session.report(&[], &[]);
        let bytes = render_reconciliation(&report, "Demo Company", "$").unwrap();
        assert!(bytes.starts_with(b"%PDF"), "output should be a PDF document");
    }

    #[test]
    fn test_render_invoice_produces_pdf_bytes() {
        let mut invoice = Invoice {
            invoice_number: "INV-001".to_string(),
            date: "2025-02-01".to_string(),
            due_date: "2025-03-01".to_string(),
            client_name: "Acme".to_string(),
            business_name: "Salon Nine".to_string(),
            tax_rate: 8.0,
            ..Default::default()
        };
        invoice.add_item();
        let id = invoice.items[0].id.clone();
        invoice
            .update_item(&id, crate::invoice::ItemPatch::Rate(150.0))
            .unwrap();
        let bytes = render_invoice(&invoice, "$").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
