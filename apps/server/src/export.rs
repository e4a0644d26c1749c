//! # Exports
//!
//! CSV rendering for the back-office reports and the printable text
//! receipt. Everything here is pure formatting; handlers fetch the data.
//!
//! CSV files are semicolon-delimited (spreadsheet locale convention of the
//! business). Currency cells use plain 2-decimal formatting; the printable
//! receipt uses thousands-grouped formatting.

use quincho_core::{InventoryItem, Money, Order, OrderLine, Receipt};
use quincho_db::SalesRow;

/// Renders the sales report as semicolon-delimited CSV.
///
/// An empty report yields just the header row.
pub fn sales_csv(rows: &[SalesRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record([
        "Folio",
        "Emission date",
        "Customer",
        "Origin",
        "Payment method",
        "Total",
    ])?;

    for row in rows {
        writer.write_record([
            row.folio.to_string(),
            row.emitted_at.format("%Y-%m-%d %H:%M").to_string(),
            row.customer_name.clone().unwrap_or_default(),
            row.origin.label().to_string(),
            row.payment_method.clone(),
            Money::from_cents(row.total_cents).format_plain(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// Renders the inventory listing as semicolon-delimited CSV.
pub fn inventory_csv(items: &[InventoryItem]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record([
        "SKU",
        "Name",
        "Stock",
        "Cost price",
        "Sale price",
        "Valuation",
    ])?;

    for item in items {
        writer.write_record([
            item.sku.clone().unwrap_or_default(),
            item.name.clone(),
            item.stock.to_string(),
            item.cost_price().format_plain(),
            item.sale_price().format_plain(),
            item.valuation().format_plain(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// Renders a receipt as printable plain text.
///
/// Layout mirrors the thermal-printer ticket: header, folio and date,
/// customer, one row per line item, grand total. The total printed is the
/// receipt's snapshot, not the order's live total.
pub fn receipt_text(receipt: &Receipt, order: &Order, lines: &[OrderLine]) -> String {
    let mut out = String::new();

    out.push_str("        EL QUINCHO\n");
    out.push_str("==============================\n");
    out.push_str(&format!("Folio: {}\n", receipt.folio));
    out.push_str(&format!(
        "Date:  {}\n",
        receipt.emitted_at.format("%Y-%m-%d %H:%M")
    ));
    if let Some(name) = order.customer_name.as_deref().filter(|n| !n.is_empty()) {
        out.push_str(&format!("Customer: {}\n", name));
    }
    out.push_str(&format!("Payment:  {}\n", receipt.payment_method));
    out.push_str("------------------------------\n");

    if lines.is_empty() {
        out.push_str("(no itemized lines)\n");
    }
    for line in lines {
        out.push_str(&format!(
            "{:>3}x {:<18} {:>10}\n",
            line.quantity,
            truncate(&line.product_name, 18),
            format!("${}", line.subtotal().format_grouped())
        ));
    }

    out.push_str("------------------------------\n");
    out.push_str(&format!(
        "TOTAL {:>23}\n",
        format!("${}", receipt.total().format_grouped())
    ));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quincho_core::{OrderOrigin, OrderStatus};

    fn receipt() -> Receipt {
        Receipt {
            id: 1,
            order_id: 42,
            folio: 7,
            total_cents: 1_500_000,
            payment_method: "cash".to_string(),
            emitted_at: Utc.with_ymd_and_hms(2026, 8, 29, 13, 30, 0).unwrap(),
        }
    }

    fn order() -> Order {
        Order {
            id: 42,
            origin: OrderOrigin::Counter,
            channel: "counter".to_string(),
            status: OrderStatus::Delivered,
            customer_name: Some("Ana".to_string()),
            customer_phone: None,
            customer_address: None,
            payment_method: None,
            delivery_type: None,
            manual_total_cents: 0,
            kitchen_visible: false,
            note: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sales_csv_header_only_when_empty() {
        let bytes = sales_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.trim(),
            "Folio;Emission date;Customer;Origin;Payment method;Total"
        );
    }

    #[test]
    fn test_sales_csv_row_formatting() {
        let rows = vec![SalesRow {
            folio: 7,
            emitted_at: Utc.with_ymd_and_hms(2026, 8, 29, 13, 30, 0).unwrap(),
            customer_name: Some("Ana".to_string()),
            origin: OrderOrigin::Web,
            payment_method: "cash".to_string(),
            total_cents: 1_500_000,
        }];
        let text = String::from_utf8(sales_csv(&rows).unwrap()).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(line, "7;2026-08-29 13:30;Ana;Web;cash;15000.00");
    }

    #[test]
    fn test_inventory_csv_valuation_column() {
        let items = vec![InventoryItem {
            id: 1,
            name: "Servilletas".to_string(),
            sku: Some("SERV-01".to_string()),
            stock: 12,
            cost_price_cents: 250,
            sale_price_cents: 400,
        }];
        let text = String::from_utf8(inventory_csv(&items).unwrap()).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(line, "SERV-01;Servilletas;12;2.50;4.00;30.00");
    }

    #[test]
    fn test_receipt_text_uses_snapshot_total() {
        let lines = vec![OrderLine {
            id: 1,
            order_id: 42,
            product_id: Some(12),
            product_name: "Completo Italiano".to_string(),
            quantity: 2,
            unit_price_cents: 350_000,
            subtotal_cents: 700_000,
        }];
        let text = receipt_text(&receipt(), &order(), &lines);

        assert!(text.contains("Folio: 7"));
        assert!(text.contains("Customer: Ana"));
        assert!(text.contains("Completo Italiano"));
        // Grand total comes from the receipt, not the line sum
        assert!(text.contains("$15,000.00"));
    }

    #[test]
    fn test_receipt_text_without_lines() {
        let text = receipt_text(&receipt(), &order(), &[]);
        assert!(text.contains("(no itemized lines)"));
        assert!(text.contains("$15,000.00"));
    }
}
