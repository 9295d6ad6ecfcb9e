use std::sync::Arc;

use stockpile_core::Locale;
use stockpile_infra::{
    AppConfig, InMemoryStore, InventoryLedger, PostgresStore, Store, StoreBackend, StoreError,
};

/// Ledger over whichever store the configuration selected.
pub type Ledger = InventoryLedger<Arc<dyn Store>>;

/// Shared application services, handed to handlers via `Extension`.
pub struct AppServices {
    ledger: Ledger,
}

impl AppServices {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// In-memory services (dev/test).
    pub fn in_memory(locale: Locale) -> Self {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        Self::new(InventoryLedger::new(store, locale))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn locale(&self) -> Locale {
        self.ledger.locale()
    }
}

/// Wire services according to `config`.
///
/// Persistent mode connects to Postgres and applies the schema before serving.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match &config.backend {
        StoreBackend::InMemory => {
            tracing::info!(module = "services", "using in-memory store");
            Ok(AppServices::in_memory(config.locale))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresStore::connect(database_url, *max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(module = "services", max_connections, "using postgres store");
            let store: Arc<dyn Store> = Arc::new(store);
            Ok(AppServices::new(InventoryLedger::new(store, config.locale)))
        }
    }
}
