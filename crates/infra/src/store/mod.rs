//! Account/product persistence boundary.
//!
//! Two backends share the same traits: an in-memory store for tests and dev,
//! and a Postgres store for persistent deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{AccountStore, ProductStore, StockDecrement, Store, StoreError, UniqueIndex};
