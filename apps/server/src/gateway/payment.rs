//! # Payment Gateway
//!
//! Builds a hosted-checkout preference for an order and returns the
//! redirect URL the shopper should be sent to.
//!
//! ## Degrade-Silently Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout_link(order)                                                   │
//! │       │                                                                 │
//! │       ├── no access token configured ──────────► None                  │
//! │       ├── HTTP request fails ──────────────────► warn + None           │
//! │       ├── non-success status / bad body ───────► warn + None           │
//! │       └── preference created ──────────────────► Some(redirect_url)    │
//! │                                                                         │
//! │  The order is already recorded either way. Payment is an upsell,       │
//! │  never a gate.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use quincho_core::Money;

const PREFERENCES_URL: &str = "https://api.mercadopago.com/checkout/preferences";

#[derive(Debug, Serialize)]
struct PreferenceItem {
    title: String,
    quantity: i64,
    unit_price: f64,
    currency_id: String,
}

#[derive(Debug, Serialize)]
struct BackUrls {
    success: String,
    failure: String,
    pending: String,
}

#[derive(Debug, Serialize)]
struct PreferenceRequest {
    items: Vec<PreferenceItem>,
    external_reference: String,
    back_urls: BackUrls,
    auto_return: String,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    init_point: String,
}

/// Hosted-checkout gateway handle.
#[derive(Debug, Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    access_token: Option<String>,
    site_url: String,
}

impl PaymentGateway {
    pub fn new(access_token: Option<String>, site_url: String) -> Self {
        PaymentGateway {
            client: reqwest::Client::new(),
            access_token,
            site_url,
        }
    }

    /// Whether a token is configured at all.
    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    /// Creates a checkout preference for an order and returns the redirect
    /// URL, or `None` when unconfigured or on any failure.
    pub async fn checkout_link(&self, order_id: i64, total: Money) -> Option<String> {
        let token = self.access_token.as_deref()?;

        let request = PreferenceRequest {
            items: vec![PreferenceItem {
                title: format!("Pedido #{order_id}"),
                quantity: 1,
                // Gateway wire format wants a decimal amount
                unit_price: total.cents() as f64 / 100.0,
                currency_id: "CLP".to_string(),
            }],
            external_reference: order_id.to_string(),
            back_urls: BackUrls {
                success: format!("{}/checkout/success", self.site_url),
                failure: format!("{}/checkout/failure", self.site_url),
                pending: format!("{}/checkout/pending", self.site_url),
            },
            auto_return: "approved".to_string(),
        };

        let response = match self
            .client
            .post(PREFERENCES_URL)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(order_id, %err, "Payment gateway unreachable, continuing without link");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                order_id,
                status = %response.status(),
                "Payment gateway rejected preference, continuing without link"
            );
            return None;
        }

        match response.json::<PreferenceResponse>().await {
            Ok(body) => Some(body.init_point),
            Err(err) => {
                warn!(order_id, %err, "Unexpected payment gateway response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_gateway_yields_no_link() {
        let gateway = PaymentGateway::new(None, "http://localhost".to_string());
        assert!(!gateway.is_configured());
        assert_eq!(
            gateway.checkout_link(1, Money::from_cents(350_000)).await,
            None
        );
    }
}
