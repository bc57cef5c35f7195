//! Invoices – turns an invoice record into a markup body so it flows through
//! the same pagination and rendering path as any other document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dom::escape_text;
use crate::error::{Error, Result};

/// One billed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub unit_price_cents: u64,
}

impl InvoiceItem {
    /// `None` when the line total does not fit in a `u64`.
    pub fn line_total_cents(&self) -> Option<u64> {
        self.unit_price_cents.checked_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub issued_on: NaiveDate,
    /// ISO 4217 code printed in front of every amount.
    pub currency: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Invoice {
    pub fn title(&self) -> String {
        format!("Invoice {}", self.number)
    }

    /// `None` when any line total, or their sum, overflows.
    pub fn total_cents(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |acc, item| acc.checked_add(item.line_total_cents()?))
    }

    pub fn validate(&self) -> Result<()> {
        if self.number.trim().is_empty() {
            return Err(Error::InvalidInvoice("missing invoice number".into()));
        }
        if self.items.is_empty() {
            return Err(Error::InvalidInvoice(format!("invoice {} has no items", self.number)));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(Error::InvalidInvoice(format!(
                "item {:?} has zero quantity",
                item.description
            )));
        }
        self.checked_total()?;
        Ok(())
    }

    fn checked_total(&self) -> Result<u64> {
        self.total_cents().ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> Error {
        Error::InvalidInvoice(format!("invoice {} amounts overflow", self.number))
    }

    /// Markup body: issue date, billing party, one list item per line, the
    /// total as an emphasised paragraph, then any notes.
    ///
    /// Fails with [`Error::InvalidInvoice`] when the amounts overflow.
    pub fn to_markup(&self) -> Result<String> {
        let total = self.checked_total()?;
        let mut html = String::new();
        html.push_str(&format!("<p>Issued: {}</p>", self.issued_on.format("%d %B %Y")));

        html.push_str("<p>Billed to: ");
        html.push_str(&escape_text(&self.customer_name));
        if let Some(email) = &self.customer_email {
            html.push_str("<br>");
            html.push_str(&escape_text(email));
        }
        html.push_str("</p>");

        html.push_str("<h3>Items</h3><ul>");
        for item in &self.items {
            let line_total = item.line_total_cents().ok_or_else(|| self.overflow())?;
            html.push_str(&format!(
                "<li>{} \u{2013} {} \u{00D7} {} = {}</li>",
                escape_text(&item.description),
                item.quantity,
                format_amount(&self.currency, item.unit_price_cents),
                format_amount(&self.currency, line_total),
            ));
        }
        html.push_str("</ul>");

        html.push_str(&format!(
            "<p><strong>Total: {}</strong></p>",
            format_amount(&self.currency, total)
        ));

        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            html.push_str("<h4>Notes</h4><p>");
            html.push_str(&escape_text(notes).replace('\n', "<br>"));
            html.push_str("</p>");
        }
        Ok(html)
    }
}

/// `"GBP 1234.05"` for 123405 cents.
pub fn format_amount(currency: &str, cents: u64) -> String {
    format!("{} {}.{:02}", escape_text(currency), cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Document};
    use crate::style::BlockKind;

    fn sample() -> Invoice {
        Invoice {
            number: "INV-0042".into(),
            issued_on: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            currency: "GBP".into(),
            customer_name: "Jo & Sam Driver".into(),
            customer_email: Some("jo@example.com".into()),
            items: vec![
                InvoiceItem {
                    description: "Temporary cover <7 days>".into(),
                    quantity: 1,
                    unit_price_cents: 4599,
                },
                InvoiceItem {
                    description: "Breakdown add-on".into(),
                    quantity: 2,
                    unit_price_cents: 350,
                },
            ],
            notes: None,
        }
    }

    #[test]
    fn totals_and_formatting() {
        let inv = sample();
        assert_eq!(inv.total_cents(), Some(5299));
        assert_eq!(format_amount("GBP", 5299), "GBP 52.99");
        assert_eq!(format_amount("EUR", 5), "EUR 0.05");
    }

    #[test]
    fn markup_classifies_into_expected_blocks() {
        let inv = sample();
        let doc = Document::from_markup(&inv.title(), &inv.to_markup().unwrap());
        assert_eq!(doc.blocks[0], Block::new(BlockKind::Body, "Issued: 05 March 2024"));
        assert_eq!(
            doc.blocks[1],
            Block::new(BlockKind::Body, "Billed to: Jo & Sam Driver\njo@example.com")
        );
        assert_eq!(doc.blocks[2].kind, BlockKind::Heading3);
        assert_eq!(
            doc.blocks[3].text,
            "Temporary cover <7 days> \u{2013} 1 \u{00D7} GBP 45.99 = GBP 45.99"
        );
        assert_eq!(doc.blocks[4].kind, BlockKind::ListItem);
        assert_eq!(doc.blocks[5], Block::new(BlockKind::Emphasis, "Total: GBP 52.99"));
        assert_eq!(doc.blocks.len(), 6);
    }

    #[test]
    fn notes_are_appended() {
        let mut inv = sample();
        inv.notes = Some("Paid by card.\nThank you!".into());
        let doc = Document::from_markup(&inv.title(), &inv.to_markup().unwrap());
        let last = doc.blocks.last().unwrap();
        assert_eq!(last.text, "Paid by card.\nThank you!");
    }

    #[test]
    fn validation() {
        assert!(sample().validate().is_ok());

        let mut empty = sample();
        empty.items.clear();
        assert!(matches!(empty.validate(), Err(Error::InvalidInvoice(_))));

        let mut zero = sample();
        zero.items[1].quantity = 0;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn overflowing_line_total_is_rejected() {
        let mut inv = sample();
        inv.items[0].quantity = 3;
        inv.items[0].unit_price_cents = u64::MAX / 2;
        assert_eq!(inv.items[0].line_total_cents(), None);
        assert_eq!(inv.total_cents(), None);
        assert!(matches!(inv.validate(), Err(Error::InvalidInvoice(_))));
        assert!(matches!(inv.to_markup(), Err(Error::InvalidInvoice(_))));
    }

    #[test]
    fn overflowing_sum_is_rejected() {
        let mut inv = sample();
        inv.items[0].unit_price_cents = u64::MAX;
        // Each line fits on its own; the sum does not.
        assert_eq!(inv.items[0].line_total_cents(), Some(u64::MAX));
        assert_eq!(inv.total_cents(), None);
        assert!(matches!(inv.validate(), Err(Error::InvalidInvoice(_))));
    }

    #[test]
    fn deserialises_from_json() {
        let json = r#"{
            "number": "INV-1",
            "issued_on": "2024-01-31",
            "currency": "USD",
            "customer_name": "Pat",
            "items": [{"description": "Cover", "quantity": 3, "unit_price_cents": 1000}]
        }"#;
        let inv: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(inv.total_cents(), Some(3000));
        assert!(inv.customer_email.is_none());
    }
}
