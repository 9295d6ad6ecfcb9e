//! Inventory domain module: purchase rules against product stock.
//!
//! This crate decides whether a purchase may proceed and how its outcome is
//! reported, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage). Applying the stock decrement atomically is the store's job.

pub mod purchase;

pub use purchase::{
    Purchase, PurchaseRejection, PurchaseRequest, PurchaseResult, check_purchase,
};
