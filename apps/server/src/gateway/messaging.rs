//! # Messaging Gateway
//!
//! Formats an order summary into a WhatsApp deep link
//! (`https://wa.me/<number>?text=…`). No network calls: the link is handed
//! to the client, the shopper opens it themselves.

use quincho_core::{CartItem, Money};

/// WhatsApp deep-link builder. Unconfigured means no links, never errors.
#[derive(Debug, Clone)]
pub struct MessagingGateway {
    number: Option<String>,
}

impl MessagingGateway {
    pub fn new(number: Option<String>) -> Self {
        MessagingGateway { number }
    }

    pub fn is_configured(&self) -> bool {
        self.number.is_some()
    }

    /// Builds the deep link for a placed order, or `None` when no number
    /// is configured.
    pub fn order_link(
        &self,
        order_id: i64,
        customer_name: &str,
        items: &[CartItem],
        total: Money,
    ) -> Option<String> {
        let number = self.number.as_deref()?;

        let mut text = format!("Nuevo pedido #{order_id}\n");
        if !customer_name.is_empty() {
            text.push_str(&format!("Cliente: {customer_name}\n"));
        }
        for item in items {
            text.push_str(&format!(
                "{}x {} - ${}\n",
                item.quantity,
                item.name,
                Money::from_cents(item.subtotal_cents).format_grouped()
            ));
        }
        text.push_str(&format!("Total: ${}", total.format_grouped()));

        Some(format!(
            "https://wa.me/{}?text={}",
            number,
            urlencoding::encode(&text)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<CartItem> {
        vec![CartItem {
            id: 12,
            name: "Completo".to_string(),
            price_cents: 350_000,
            quantity: 2,
            subtotal_cents: 700_000,
        }]
    }

    #[test]
    fn test_unconfigured_yields_no_link() {
        let gateway = MessagingGateway::new(None);
        let link = gateway.order_link(1, "Ana", &items(), Money::from_cents(700_000));
        assert_eq!(link, None);
    }

    #[test]
    fn test_link_contains_number_and_encoded_summary() {
        let gateway = MessagingGateway::new(Some("56912345678".to_string()));
        let link = gateway
            .order_link(7, "Ana", &items(), Money::from_cents(700_000))
            .unwrap();

        assert!(link.starts_with("https://wa.me/56912345678?text="));
        // Newlines and spaces must be percent-encoded
        assert!(!link.contains(' '));
        assert!(link.contains("%23") || link.contains("pedido"));
    }
}
