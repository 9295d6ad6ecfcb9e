//! Products domain module.
//!
//! This crate contains business rules for products and their stock, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod sku;

pub use product::{CreateProduct, NewProduct, Product};
pub use sku::Sku;
