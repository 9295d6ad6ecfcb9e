//! Infrastructure layer: stores, the inventory ledger service, config.

pub mod config;
pub mod ledger;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use ledger::{AccountsFilter, InventoryLedger, LedgerError, ProductsFilter};
pub use store::{InMemoryStore, PostgresStore, Store, StoreError};
