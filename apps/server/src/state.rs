//! Shared application state handed to every handler.

use std::sync::Arc;

use quincho_db::Database;

use crate::config::ServerConfig;
use crate::gateway::messaging::MessagingGateway;
use crate::gateway::payment::PaymentGateway;

/// Application state. Cheap to clone: the pool and gateways are handles.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub payment: PaymentGateway,
    pub messaging: MessagingGateway,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let payment = PaymentGateway::new(
            config.payment_access_token.clone(),
            config.site_url.clone(),
        );
        let messaging = MessagingGateway::new(config.whatsapp_number.clone());
        AppState {
            db,
            config: Arc::new(config),
            payment,
            messaging,
        }
    }
}
